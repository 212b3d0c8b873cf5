//! Admin handlers: seller verification and oversight

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use tracing::info;

use super::dto::VerifyUserRequest;
use crate::application::marketplace::AdminService;
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse, ValidatedJson};
use crate::interfaces::http::dto::{to_dtos, OrderDto, UserDto};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct AdminHandlerState {
    pub admin_service: Arc<AdminService>,
}

#[utoipa::path(
    get,
    path = "/api/admin/verified-users",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Accepted sellers", body = ApiResponse<Vec<UserDto>>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_verified_users(
    State(state): State<AdminHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    info!(user = %user.email, "Verified sellers requested");
    let users = state.admin_service.get_all_verified().await.map_err(domain_error)?;
    info!(user = %user.email, count = users.len(), "Verified sellers returned");
    Ok(Json(ApiResponse::success(to_dtos(users))))
}

#[utoipa::path(
    get,
    path = "/api/admin/unverified-users",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sellers waiting for verification", body = ApiResponse<Vec<UserDto>>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_unverified_users(
    State(state): State<AdminHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    info!(user = %user.email, "Unverified sellers requested");
    let users = state.admin_service.get_all_unverified().await.map_err(domain_error)?;
    info!(user = %user.email, count = users.len(), "Unverified sellers returned");
    Ok(Json(ApiResponse::success(to_dtos(users))))
}

#[utoipa::path(
    get,
    path = "/api/admin/declined-users",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Denied sellers", body = ApiResponse<Vec<UserDto>>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_declined_users(
    State(state): State<AdminHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    info!(user = %user.email, "Declined sellers requested");
    let users = state.admin_service.get_all_declined().await.map_err(domain_error)?;
    info!(user = %user.email, count = users.len(), "Declined sellers returned");
    Ok(Json(ApiResponse::success(to_dtos(users))))
}

#[utoipa::path(
    get,
    path = "/api/admin/buyers",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All buyers", body = ApiResponse<Vec<UserDto>>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_buyers(
    State(state): State<AdminHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    info!(user = %user.email, "Buyers requested");
    let users = state.admin_service.get_all_buyers().await.map_err(domain_error)?;
    info!(user = %user.email, count = users.len(), "Buyers returned");
    Ok(Json(ApiResponse::success(to_dtos(users))))
}

#[utoipa::path(
    post,
    path = "/api/admin/verify-user",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = VerifyUserRequest,
    responses(
        (status = 200, description = "Verification stored", body = ApiResponse<UserDto>),
        (status = 400, description = "User is not a seller"),
        (status = 404, description = "User not found")
    )
)]
pub async fn verify_user(
    State(state): State<AdminHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<VerifyUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    info!(
        user = %user.email,
        target = request.user_id,
        accepted = request.is_accepted,
        "Seller verification requested"
    );

    let verified = state
        .admin_service
        .verify_user(request.user_id, request.is_accepted)
        .await
        .map_err(domain_error)?;

    info!(user = %user.email, target = verified.id, "Seller verification completed");
    Ok(Json(ApiResponse::success(verified.into())))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All orders", body = ApiResponse<Vec<OrderDto>>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_all_orders(
    State(state): State<AdminHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<OrderDto>>>, ApiError> {
    info!(user = %user.email, "All orders requested");
    let orders = state.admin_service.get_all_orders().await.map_err(domain_error)?;
    info!(user = %user.email, count = orders.len(), "All orders returned");
    Ok(Json(ApiResponse::success(to_dtos(orders))))
}
