//! User aggregate

pub mod model;
pub mod repository;

pub use model::{is_adult, NewUser, User, UserType, VerificationState};
pub use repository::UserRepository;
