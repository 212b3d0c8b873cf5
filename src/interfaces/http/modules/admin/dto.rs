//! Admin DTOs

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Accept or deny a seller account
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyUserRequest {
    #[validate(range(min = 1, message = "userId must be positive"))]
    pub user_id: i32,
    pub is_accepted: bool,
}
