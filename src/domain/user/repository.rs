//! User repository interface

use async_trait::async_trait;

use super::model::{NewUser, User, UserType, VerificationState};
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> DomainResult<User>;
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>>;
    async fn find_by_type(&self, user_type: UserType) -> DomainResult<Vec<User>>;
    async fn find_sellers_by_state(&self, state: VerificationState) -> DomainResult<Vec<User>>;
    /// Persists every mutable field of `user`.
    async fn update(&self, user: &User) -> DomainResult<()>;
}
