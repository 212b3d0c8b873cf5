//! Profile DTOs

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::application::identity::ProfileUpdate;

/// Profile edit; the password fields are only needed to change the password
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "fullName is required"))]
    pub full_name: String,
    pub birth_date: NaiveDate,
    #[validate(length(min = 1, max = 200, message = "address is required"))]
    pub address: String,
    pub current_password: Option<String>,
    #[validate(length(min = 6, max = 128, message = "newPassword must be 6-128 characters"))]
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(r: UpdateProfileRequest) -> Self {
        Self {
            username: r.username,
            email: r.email,
            full_name: r.full_name,
            birth_date: r.birth_date,
            address: r.address,
            current_password: r.current_password,
            new_password: r.new_password,
            confirm_password: r.confirm_password,
        }
    }
}
