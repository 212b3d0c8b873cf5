//! Identity use cases: authentication, registration and profiles

pub mod auth_service;
pub mod profile_service;

pub use auth_service::{AuthService, AuthToken, Registration};
pub use profile_service::{ProfileService, ProfileUpdate};
