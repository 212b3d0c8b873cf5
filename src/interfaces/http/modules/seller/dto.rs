//! Seller form parsing
//!
//! Product create and update are multipart forms with the text fields
//! `name`, `price`, `amount`, `description`, `category` and an optional
//! `image` file part.

use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::application::marketplace::ProductForm;
use crate::domain::ProductCategory;
use crate::interfaces::http::common::multipart::FormData;
use crate::interfaces::http::common::{api_error, ApiError};
use crate::shared::Money;

/// Documentation shape of the product form
#[derive(Debug, Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct ProductFormSchema {
    pub name: String,
    #[schema(value_type = f64, example = 4.99)]
    pub price: Decimal,
    pub amount: i32,
    pub description: Option<String>,
    /// `Food`, `Drinks`, `Alcohol` or `Cigarettes`
    pub category: String,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}

pub fn product_form(mut form: FormData) -> Result<ProductForm, ApiError> {
    let price: Decimal = form.parse("price")?;
    let price = Money::from_decimal(price)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Invalid value for field: price"))?;

    let category = ProductCategory::from_str(form.required("category")?.trim())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Unknown product category"))?;

    Ok(ProductForm {
        name: form.required("name")?.to_string(),
        price,
        amount: form.parse("amount")?,
        description: form
            .text("description")
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        category,
        image: form.take_image(),
    })
}
