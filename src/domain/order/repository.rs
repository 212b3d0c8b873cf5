//! Order repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{NewOrder, Order, OrderState};
use crate::domain::DomainResult;

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts the order with its items and takes the ordered units out of
    /// stock in one transaction. Fails without side effects when any product
    /// no longer has enough units, or when `single_open_order` is set and the
    /// buyer already has a `Preparing` order.
    async fn place(&self, order: NewOrder) -> DomainResult<Order>;

    /// Sets the order to `Canceled` and returns its units to stock for
    /// products that still exist, in one transaction.
    async fn cancel(&self, order_id: i32) -> DomainResult<()>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Order>>;
    async fn find_by_buyer(&self, buyer_id: i32) -> DomainResult<Vec<Order>>;
    async fn find_by_state(&self, state: OrderState) -> DomainResult<Vec<Order>>;
    async fn find_all(&self) -> DomainResult<Vec<Order>>;
    async fn has_preparing_order(&self, buyer_id: i32) -> DomainResult<bool>;

    /// Marks a `Preparing`, not yet accepted order as accepted and sets its
    /// timing. Fails when the order is gone, canceled, delivered or already
    /// accepted at the time of the write.
    async fn accept(
        &self,
        order_id: i32,
        start_time: DateTime<Utc>,
        delivery_time: DateTime<Utc>,
    ) -> DomainResult<()>;

    /// Moves accepted `Preparing` orders whose delivery time is at or before
    /// `now` to `Delivered`. Returns how many orders changed.
    async fn mark_delivered(&self, now: DateTime<Utc>) -> DomainResult<u64>;
}
