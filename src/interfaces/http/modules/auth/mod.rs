//! Authentication module: login, registration, Google sign-in

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
