//! Buyer DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::marketplace::OrderRequest;
use crate::domain::order::LineRequest;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: i32,
    pub product_amount: i32,
}

impl From<&OrderLineRequest> for LineRequest {
    fn from(line: &OrderLineRequest) -> Self {
        Self {
            product_id: line.product_id,
            amount: line.product_amount,
        }
    }
}

fn lines(items: &[OrderLineRequest]) -> Vec<LineRequest> {
    items.iter().map(LineRequest::from).collect()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLineRequest>,
    #[validate(length(min = 1, max = 200, message = "deliveryAddress is required"))]
    pub delivery_address: String,
    #[validate(length(max = 500, message = "comment is too long"))]
    pub comment: Option<String>,
}

impl From<CreateOrderRequest> for OrderRequest {
    fn from(r: CreateOrderRequest) -> Self {
        Self {
            items: lines(&r.items),
            delivery_address: r.delivery_address,
            comment: r.comment.filter(|c| !c.trim().is_empty()),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceRequest {
    pub items: Vec<OrderLineRequest>,
}

impl PriceRequest {
    pub fn lines(&self) -> Vec<LineRequest> {
        lines(&self.items)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    /// Item total plus delivery fees
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 12.97)]
    pub total_price: Decimal,
}
