//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod google;
pub mod mail;
#[cfg(test)]
pub mod storage;

pub use database::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};
pub use google::GoogleTokenVerifier;
pub use mail::{LogMailer, SmtpMailer};
