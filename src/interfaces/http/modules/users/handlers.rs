//! Profile handlers for any signed-in user

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;

use super::dto::UpdateProfileRequest;
use crate::application::identity::ProfileService;
use crate::interfaces::http::common::multipart::read_form;
use crate::interfaces::http::common::{
    api_error, domain_error, ApiError, ApiResponse, EmptyData, ValidatedJson,
};
use crate::interfaces::http::dto::UserDto;
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct UserHandlerState {
    pub profile_service: Arc<ProfileService>,
}

#[utoipa::path(
    get,
    path = "/api/user",
    tag = "User",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's profile", body = ApiResponse<UserDto>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_profile(
    State(state): State<UserHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    info!(user = %user.email, "Profile requested");

    let profile = state
        .profile_service
        .get_profile(user.user_id)
        .await
        .map_err(domain_error)?;

    info!(user = %user.email, "Profile returned");
    Ok(Json(ApiResponse::success(profile.into())))
}

#[utoipa::path(
    put,
    path = "/api/user",
    tag = "User",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn edit_profile(
    State(state): State<UserHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    info!(user = %user.email, "Profile edit requested");

    let profile = state
        .profile_service
        .edit_profile(user.user_id, request.into())
        .await
        .map_err(domain_error)?;

    info!(user = %user.email, "Profile edit completed");
    Ok(Json(ApiResponse::success(profile.into())))
}

#[utoipa::path(
    put,
    path = "/api/user/add-picture",
    tag = "User",
    security(("bearer_auth" = [])),
    request_body(content = String, content_type = "multipart/form-data", description = "`image` file part"),
    responses(
        (status = 200, description = "Picture stored", body = ApiResponse<EmptyData>),
        (status = 400, description = "Missing or non-image upload"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn add_picture(
    State(state): State<UserHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError> {
    info!(user = %user.email, "Profile picture upload requested");

    let mut form = read_form(multipart).await?;
    let image = form
        .take_image()
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Image is required."))?;

    state
        .profile_service
        .add_picture(user.user_id, image)
        .await
        .map_err(domain_error)?;

    info!(user = %user.email, "Profile picture upload completed");
    Ok(Json(ApiResponse::success(EmptyData {})))
}
