//! SeaORM implementation of RepositoryProvider

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::domain::order::OrderRepository;
use crate::domain::product::ProductRepository;
use crate::domain::repositories::{DomainResult, RepositoryProvider};
use crate::domain::user::UserRepository;

use super::order_repository::SeaOrmOrderRepository;
use super::product_repository::SeaOrmProductRepository;
use super::user_repository::SeaOrmUserRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
pub struct SeaOrmRepositoryProvider {
    db: DatabaseConnection,
    users: SeaOrmUserRepository,
    products: SeaOrmProductRepository,
    orders: SeaOrmOrderRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: SeaOrmUserRepository::new(db.clone()),
            products: SeaOrmProductRepository::new(db.clone()),
            orders: SeaOrmOrderRepository::new(db.clone()),
            db,
        }
    }
}

#[async_trait]
impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn products(&self) -> &dyn ProductRepository {
        &self.products
    }

    fn orders(&self) -> &dyn OrderRepository {
        &self.orders
    }

    async fn health_check(&self) -> DomainResult<()> {
        self.db.ping().await?;
        Ok(())
    }
}
