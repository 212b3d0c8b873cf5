//! Authentication and role middleware for Axum

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use super::common::ApiResponse;
use crate::domain::UserType;
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig, TokenClaims};

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    InvalidUserId,
    InsufficientPermissions,
}

/// Authentication state containing the JWT config
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Caller identity taken from a verified bearer token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub email: String,
    pub role: UserType,
    pub claims: TokenClaims,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserType::Admin
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Bearer token authentication middleware.
///
/// Inserts [`AuthenticatedUser`] into the request extensions.
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(auth_header) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return auth_error_response(AuthError::MissingToken);
    };

    let Some(token) = extract_token(auth_header) else {
        return auth_error_response(AuthError::InvalidToken);
    };

    let claims = match verify_token(token, &auth_state.jwt_config) {
        Ok(claims) => claims,
        Err(e) => {
            return match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    auth_error_response(AuthError::ExpiredToken)
                }
                _ => auth_error_response(AuthError::InvalidToken),
            };
        }
    };

    let Some(user_id) = claims.user_id() else {
        warn!(sub = %claims.sub, "Token carries a non numeric user id");
        return auth_error_response(AuthError::InvalidUserId);
    };
    let Some(role) = claims.user_type() else {
        warn!(role = %claims.role, "Token carries an unknown role");
        return auth_error_response(AuthError::InvalidToken);
    };

    request.extensions_mut().insert(AuthenticatedUser {
        user_id,
        email: claims.email.clone(),
        role,
        claims,
    });
    next.run(request).await
}

/// Role guard; layer it inside [`auth_middleware`].
///
/// ```ignore
/// Router::new()
///     .route("/orders", get(orders))
///     .layer(middleware::from_fn_with_state(UserType::Buyer, require_role))
///     .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
/// ```
pub async fn require_role(
    State(required): State<UserType>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(user) = request.extensions().get::<AuthenticatedUser>() else {
        return auth_error_response(AuthError::MissingToken);
    };
    if user.role != required {
        warn!(
            user = %user.email,
            role = user.role.as_str(),
            required = required.as_str(),
            "Access to a route of another role"
        );
        return auth_error_response(AuthError::InsufficientPermissions);
    }
    next.run(request).await
}

fn auth_error_response(error: AuthError) -> Response {
    let (status, message) = match error {
        AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid authentication token"),
        AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Token has expired"),
        AuthError::InvalidUserId => (StatusCode::BAD_REQUEST, "Error with ID. Please try again."),
        AuthError::InsufficientPermissions => (StatusCode::UNAUTHORIZED, "You are not authorized!"),
    };

    (status, Json(ApiResponse::<()>::error(message))).into_response()
}
