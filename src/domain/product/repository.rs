//! Product repository interface

use async_trait::async_trait;

use super::model::{NewProduct, Product};
use crate::domain::DomainResult;

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: NewProduct) -> DomainResult<Product>;
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Product>>;
    async fn find_by_ids(&self, ids: &[i32]) -> DomainResult<Vec<Product>>;
    async fn find_by_seller(&self, seller_id: i32) -> DomainResult<Vec<Product>>;
    /// Products with at least one unit in stock
    async fn find_in_stock(&self) -> DomainResult<Vec<Product>>;
    async fn update(&self, product: &Product) -> DomainResult<()>;
    async fn delete(&self, id: i32) -> DomainResult<()>;
}
