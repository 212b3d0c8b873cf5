//! Response DTOs shared by the role modules
//!
//! Field names are camelCase, prices are decimals and images are base64.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Order, OrderItem, Product, User};

fn encode_image(image: &Option<Vec<u8>>) -> Option<String> {
    image.as_ref().map(|bytes| BASE64.encode(bytes))
}

/// Public view of an account; never carries the password hash
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub address: String,
    /// `Admin`, `Buyer` or `Seller`
    pub user_type: String,
    /// `Accepted`, `Waiting` or `Denied`
    pub verification_state: String,
    pub has_full_access: bool,
    /// Base64 encoded picture
    pub image: Option<String>,
    pub registration_time: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            image: encode_image(&u.image),
            id: u.id,
            username: u.username,
            email: u.email,
            full_name: u.full_name,
            birth_date: u.birth_date,
            address: u.address,
            user_type: u.user_type.as_str().to_string(),
            verification_state: u.verification_state.as_str().to_string(),
            has_full_access: u.has_full_access,
            registration_time: u.registration_time,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i32,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 4.99)]
    pub price: Decimal,
    pub amount: i32,
    pub description: Option<String>,
    /// Base64 encoded picture
    pub image: Option<String>,
    /// `Food`, `Drinks`, `Alcohol` or `Cigarettes`
    pub category: String,
    pub seller_id: i32,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        Self {
            image: encode_image(&p.image),
            id: p.id,
            name: p.name,
            price: p.price.to_decimal(),
            amount: p.amount,
            description: p.description,
            category: p.category.as_str().to_string(),
            seller_id: p.seller_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub id: i32,
    pub product_id: i32,
    pub name: String,
    /// Unit price when the order was placed
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 4.99)]
    pub current_price: Decimal,
    pub product_amount: i32,
}

impl From<OrderItem> for OrderItemDto {
    fn from(i: OrderItem) -> Self {
        Self {
            id: i.id,
            product_id: i.product_id,
            name: i.name,
            current_price: i.current_price.to_decimal(),
            product_amount: i.product_amount,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: i32,
    pub buyer_id: i32,
    pub comment: Option<String>,
    pub delivery_address: String,
    /// Item total plus delivery fees
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 12.97)]
    pub total_price: Decimal,
    /// `Preparing`, `Delivered` or `Canceled`
    pub state: String,
    pub is_accepted: bool,
    pub start_time: DateTime<Utc>,
    pub delivery_time: Option<DateTime<Utc>>,
    pub items: Vec<OrderItemDto>,
}

impl From<Order> for OrderDto {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            buyer_id: o.buyer_id,
            comment: o.comment,
            delivery_address: o.delivery_address,
            total_price: o.total_price.to_decimal(),
            state: o.state.as_str().to_string(),
            is_accepted: o.is_accepted,
            start_time: o.start_time,
            delivery_time: o.delivery_time,
            items: o.items.into_iter().map(OrderItemDto::from).collect(),
        }
    }
}

/// Maps a list of domain values into DTOs
pub fn to_dtos<T, D: From<T>>(items: Vec<T>) -> Vec<D> {
    items.into_iter().map(D::from).collect()
}
