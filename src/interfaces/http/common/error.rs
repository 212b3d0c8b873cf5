//! Domain error to HTTP response mapping

use axum::http::StatusCode;
use axum::Json;
use tracing::error;

use super::ApiResponse;
use crate::domain::DomainError;

/// Error half of every handler's `Result`
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ApiResponse::error(message)))
}

/// Rejections keep their message; storage and internal failures are logged
/// and answered with a generic one.
pub fn domain_error(e: DomainError) -> ApiError {
    match e {
        DomainError::NotFound(msg) => api_error(StatusCode::NOT_FOUND, msg),
        DomainError::Validation(msg) => api_error(StatusCode::BAD_REQUEST, msg),
        DomainError::Unauthorized(msg) => api_error(StatusCode::UNAUTHORIZED, msg),
        DomainError::Storage(_) | DomainError::Internal(_) => {
            error!(error = %e, "Request failed");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong. Please try again later.",
            )
        }
    }
}
