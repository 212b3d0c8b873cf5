//! Profile module for every authenticated role

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
