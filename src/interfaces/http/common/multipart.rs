//! Multipart form reading for product and profile picture uploads

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::Multipart;
use axum::http::StatusCode;

use super::{api_error, ApiError};

/// Form part carrying the uploaded picture
pub const IMAGE_FIELD: &str = "image";

/// Text fields plus the optional image of a multipart request
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    image: Option<Vec<u8>>,
}

impl FormData {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn required(&self, name: &str) -> Result<&str, ApiError> {
        self.text(name)
            .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, format!("Missing field: {}", name)))
    }

    pub fn parse<T: FromStr>(&self, name: &str) -> Result<T, ApiError> {
        self.required(name)?.trim().parse().map_err(|_| {
            api_error(StatusCode::BAD_REQUEST, format!("Invalid value for field: {}", name))
        })
    }

    pub fn take_image(&mut self) -> Option<Vec<u8>> {
        self.image.take()
    }
}

/// Reads every part. An empty file part counts as no image; a non-empty
/// one must declare an `image/*` content type.
pub async fn read_form(mut multipart: Multipart) -> Result<FormData, ApiError> {
    let mut form = FormData::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Invalid form data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGE_FIELD {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(|e| {
                api_error(StatusCode::BAD_REQUEST, format!("Invalid image upload: {}", e))
            })?;
            if bytes.is_empty() {
                continue;
            }
            if !content_type.starts_with("image/") {
                return Err(api_error(
                    StatusCode::BAD_REQUEST,
                    "Uploaded file must be an image.",
                ));
            }
            form.image = Some(bytes.to_vec());
        } else {
            let value = field.text().await.map_err(|e| {
                api_error(StatusCode::BAD_REQUEST, format!("Invalid form field {}: {}", name, e))
            })?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}
