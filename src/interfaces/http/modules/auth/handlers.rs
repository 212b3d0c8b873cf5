//! Authentication API handlers
//!
//! Delegates to `AuthService` from the application/identity layer.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use super::dto::{GoogleLoginRequest, LoginRequest, LoginResponse, RegisterRequest};
use crate::application::identity::{AuthService, AuthToken, Registration};
use crate::domain::UserType;
use crate::interfaces::http::common::{api_error, domain_error, ApiError, ApiResponse, ValidatedJson};
use crate::interfaces::http::dto::UserDto;

#[derive(Clone)]
pub struct AuthHandlerState {
    pub auth_service: Arc<AuthService>,
}

impl From<AuthToken> for LoginResponse {
    fn from(auth: AuthToken) -> Self {
        Self {
            token: auth.token,
            token_type: "Bearer".to_string(),
            expires_in: auth.expires_in,
            user: UserDto::from(auth.user),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Wrong password or seller not verified"),
        (status = 404, description = "Unknown email")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    info!(user = %request.email, "Login requested");

    let auth = state
        .auth_service
        .login(&request.email, &request.password)
        .await
        .map_err(domain_error)?;

    info!(user = %request.email, "Login completed");
    Ok(Json(ApiResponse::success(auth.into())))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Admin registration attempted")
    )
)]
pub async fn register(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    info!(user = %request.email, user_type = %request.user_type, "Registration requested");

    let user_type = UserType::from_str(&request.user_type)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Unknown user type"))?;
    let email = request.email.clone();

    let user = state
        .auth_service
        .register(Registration {
            username: request.username,
            email: request.email,
            password: request.password,
            confirm_password: request.confirm_password,
            full_name: request.full_name,
            birth_date: request.birth_date,
            address: request.address,
            user_type,
        })
        .await
        .map_err(domain_error)?;

    info!(user = %email, "Registration completed");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user.into()))))
}

#[utoipa::path(
    post,
    path = "/api/auth/register-via-google",
    tag = "Authentication",
    request_body = GoogleLoginRequest,
    responses(
        (status = 200, description = "Signed in with Google", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid token or Google sign-in disabled")
    )
)]
pub async fn register_via_google(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<GoogleLoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    info!("Google sign-in requested");

    let auth = state
        .auth_service
        .register_via_google(&request.token)
        .await
        .map_err(domain_error)?;

    info!(user = %auth.user.email, "Google sign-in completed");
    Ok(Json(ApiResponse::success(auth.into())))
}
