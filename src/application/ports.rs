//! Outbound ports used by the application services
//!
//! Concrete adapters live in `infrastructure::mail` and
//! `infrastructure::google`.

use async_trait::async_trait;

use crate::domain::DomainResult;

/// Sends plain-text notification e-mails.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> DomainResult<()>;
}

/// Identity asserted by an external sign-in provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub email: String,
    pub given_name: String,
    pub full_name: String,
}

/// Verifies ID tokens issued by an external sign-in provider.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Returns the identity carried by `id_token`, or `Unauthorized` when the
    /// token is invalid, expired or issued for another client.
    async fn verify(&self, id_token: &str) -> DomainResult<ExternalIdentity>;
}
