//! HTTP REST API interfaces
//!
//! - `middleware`: bearer authentication and role guards
//! - `modules`: one module per role with DTOs and handlers
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod dto;
pub mod middleware;
pub mod modules;
pub mod router;


pub use router::{create_api_router, ApiContext, ApiDoc};
