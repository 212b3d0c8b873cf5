//! Buyer module: catalog, orders, cancellation and price preview

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
