//! Building blocks shared by the HTTP modules

mod error;
pub mod multipart;
mod response;
mod validated_json;

pub use error::{api_error, domain_error, ApiError};
pub use response::{ApiResponse, EmptyData};
pub use validated_json::ValidatedJson;
