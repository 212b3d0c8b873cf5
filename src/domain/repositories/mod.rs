//! Repository traits for the domain layer

use async_trait::async_trait;

use super::order::OrderRepository;
use super::product::ProductRepository;
use super::user::UserRepository;
pub use crate::shared::errors::DomainResult;

/// Provides access to all domain repositories.
///
/// Services hold an `Arc<dyn RepositoryProvider>` and ask for the
/// repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) -> DomainResult<()> {
///     let buyer = repos.users().find_by_id(1).await?;
///     let open = repos.orders().has_preparing_order(1).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait RepositoryProvider: Send + Sync {
    fn users(&self) -> &dyn UserRepository;
    fn products(&self) -> &dyn ProductRepository;
    fn orders(&self) -> &dyn OrderRepository;

    /// Checks that the backing store is reachable.
    async fn health_check(&self) -> DomainResult<()>;
}
