//! JSON body extractor that also runs the DTO's `validator` rules
//!
//! Every way a body can be refused ends up as a 400 in the usual
//! `ApiResponse` envelope, so clients never see axum's plain-text rejections.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::{Validate, ValidationErrors};

use super::{api_error, ApiError};

/// `Json<T>` whose value has passed `T::validate()`
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(body_rejected)?;

        value
            .validate()
            .map_err(|errors| api_error(StatusCode::BAD_REQUEST, describe(&errors)))?;

        Ok(ValidatedJson(value))
    }
}

fn body_rejected(rejection: JsonRejection) -> ApiError {
    debug!(error = %rejection.body_text(), "Request body rejected");
    let message = match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Request body must be sent as application/json.".to_string()
        }
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON.".to_string(),
        JsonRejection::JsonDataError(e) => {
            // Drop axum's generic prefix and keep serde's own message
            let detail = e.body_text();
            let detail = detail
                .split_once(": ")
                .map(|(_, rest)| rest.to_string())
                .unwrap_or(detail);
            format!("Request body has missing or invalid fields: {}", detail)
        }
        JsonRejection::BytesRejection(_) => "Request body could not be read.".to_string(),
        other => other.body_text(),
    };
    api_error(StatusCode::BAD_REQUEST, message)
}

/// One sorted `; `-joined line out of all field messages
fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    messages.sort();
    messages.dedup();

    if messages.is_empty() {
        "Request body failed validation.".to_string()
    } else {
        messages.join("; ")
    }
}
