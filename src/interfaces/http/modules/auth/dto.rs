//! Authentication DTOs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::domain::UserType;
use crate::interfaces::http::dto::UserDto;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserDto,
}

fn validate_user_type(value: &str) -> Result<(), ValidationError> {
    match UserType::from_str(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("user_type")
            .with_message("userType must be Admin, Buyer or Seller".into())),
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "password must be 6-128 characters"))]
    pub password: String,
    pub confirm_password: String,
    #[validate(length(min = 1, max = 100, message = "fullName is required"))]
    pub full_name: String,
    pub birth_date: NaiveDate,
    #[validate(length(min = 1, max = 200, message = "address is required"))]
    pub address: String,
    /// `Buyer` or `Seller`
    #[validate(custom(function = "validate_user_type"))]
    pub user_type: String,
}

/// Google ID token obtained by the client
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,
}
