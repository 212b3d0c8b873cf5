//! HTTP modules, one per role plus the operational endpoints

pub mod admin;
pub mod auth;
pub mod buyer;
pub mod health;
pub mod metrics;
pub mod seller;
pub mod users;
