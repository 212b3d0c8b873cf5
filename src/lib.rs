//! # Marketplace
//!
//! REST backend of an online marketplace. Buyers order products, sellers
//! manage their catalog and accept orders, administrators verify sellers.
//!
//! ## Architecture
//!
//! - **domain**: entities, order rules and repository traits
//! - **application**: use cases per role
//! - **infrastructure**: SQLite storage, crypto, mail and Google sign-in
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: runtime wiring and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};
pub use interfaces::http::create_api_router;
