//! Admin module: seller verification, user and order listings

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
