//! Seller module: product management and order acceptance

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
