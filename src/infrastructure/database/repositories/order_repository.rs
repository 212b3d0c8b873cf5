use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Select, Set, TransactionTrait,
};
use tracing::debug;

use crate::domain::order::order_not_acceptable;
use crate::domain::{
    DomainError, DomainResult, NewOrder, Order, OrderItem, OrderRepository, OrderState,
};
use crate::infrastructure::database::entities::{order, order_item, product};
use crate::shared::Money;

pub struct SeaOrmOrderRepository {
    db: DatabaseConnection,
}

impl SeaOrmOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load(&self, query: Select<order::Entity>) -> DomainResult<Vec<Order>> {
        let rows = query
            .order_by_asc(order::Column::Id)
            .find_with_related(order_item::Entity)
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(o, items)| order_model_to_domain(o, items))
            .collect())
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_state_to_domain(state: order::OrderState) -> OrderState {
    match state {
        order::OrderState::Preparing => OrderState::Preparing,
        order::OrderState::Delivered => OrderState::Delivered,
        order::OrderState::Canceled => OrderState::Canceled,
    }
}

fn domain_state_to_entity(state: OrderState) -> order::OrderState {
    match state {
        OrderState::Preparing => order::OrderState::Preparing,
        OrderState::Delivered => order::OrderState::Delivered,
        OrderState::Canceled => order::OrderState::Canceled,
    }
}

fn item_model_to_domain(model: order_item::Model) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        name: model.name,
        current_price: Money::from_cents(model.current_price),
        product_amount: model.product_amount,
    }
}

fn order_model_to_domain(model: order::Model, mut items: Vec<order_item::Model>) -> Order {
    items.sort_by_key(|i| i.id);
    Order {
        id: model.id,
        buyer_id: model.buyer_id,
        comment: model.comment,
        delivery_address: model.delivery_address,
        total_price: Money::from_cents(model.total_price),
        state: entity_state_to_domain(model.state),
        is_accepted: model.is_accepted,
        start_time: model.start_time,
        delivery_time: model.delivery_time,
        items: items.into_iter().map(item_model_to_domain).collect(),
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl OrderRepository for SeaOrmOrderRepository {
    async fn place(&self, new_order: NewOrder) -> DomainResult<Order> {
        let txn = self.db.begin().await?;

        for item in &new_order.items {
            // Conditional decrement: never lets stock go negative, even when
            // another order raced us since the quote was computed.
            let result = product::Entity::update_many()
                .col_expr(
                    product::Column::Amount,
                    Expr::col(product::Column::Amount).sub(item.product_amount),
                )
                .filter(product::Column::Id.eq(item.product_id))
                .filter(product::Column::Amount.gte(item.product_amount))
                .exec(&txn)
                .await?;

            if result.rows_affected == 0 {
                let current = product::Entity::find_by_id(item.product_id).one(&txn).await?;
                txn.rollback().await?;
                return Err(match current {
                    Some(p) => DomainError::validation(format!(
                        "Currently there is only {} {}s in stock.",
                        p.amount, p.name
                    )),
                    None => DomainError::not_found("Product is non existent."),
                });
            }
        }

        // Checked after the stock writes so the transaction already holds
        // the write lock and a concurrent placement cannot slip in between.
        if new_order.single_open_order {
            let open = order::Entity::find()
                .filter(order::Column::BuyerId.eq(new_order.buyer_id))
                .filter(order::Column::State.eq(order::OrderState::Preparing))
                .count(&txn)
                .await?;
            if open > 0 {
                txn.rollback().await?;
                return Err(DomainError::validation("You can have only 1 order at time."));
            }
        }

        let order_model = order::ActiveModel {
            buyer_id: Set(new_order.buyer_id),
            comment: Set(new_order.comment),
            delivery_address: Set(new_order.delivery_address),
            total_price: Set(new_order.total_price.cents()),
            state: Set(order::OrderState::Preparing),
            is_accepted: Set(false),
            start_time: Set(new_order.start_time),
            delivery_time: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(new_order.items.len());
        for item in new_order.items {
            let model = order_item::ActiveModel {
                order_id: Set(order_model.id),
                product_id: Set(item.product_id),
                name: Set(item.name),
                current_price: Set(item.current_price.cents()),
                product_amount: Set(item.product_amount),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            items.push(model);
        }

        txn.commit().await?;
        debug!(order_id = order_model.id, "Order persisted");

        Ok(order_model_to_domain(order_model, items))
    }

    async fn cancel(&self, order_id: i32) -> DomainResult<()> {
        let txn = self.db.begin().await?;

        // Only a Preparing order can move to Canceled; guards against
        // restoring stock twice.
        let result = order::Entity::update_many()
            .col_expr(
                order::Column::State,
                Expr::value(order::OrderState::Canceled),
            )
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::State.eq(order::OrderState::Preparing))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(DomainError::validation("Order is already canceled."));
        }

        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(&txn)
            .await?;

        for item in items {
            // Products deleted since the order was placed are skipped
            product::Entity::update_many()
                .col_expr(
                    product::Column::Amount,
                    Expr::col(product::Column::Amount).add(item.product_amount),
                )
                .filter(product::Column::Id.eq(item.product_id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Order>> {
        let mut orders = self
            .load(order::Entity::find().filter(order::Column::Id.eq(id)))
            .await?;
        Ok(orders.pop())
    }

    async fn find_by_buyer(&self, buyer_id: i32) -> DomainResult<Vec<Order>> {
        self.load(order::Entity::find().filter(order::Column::BuyerId.eq(buyer_id)))
            .await
    }

    async fn find_by_state(&self, state: OrderState) -> DomainResult<Vec<Order>> {
        self.load(
            order::Entity::find().filter(order::Column::State.eq(domain_state_to_entity(state))),
        )
        .await
    }

    async fn find_all(&self) -> DomainResult<Vec<Order>> {
        self.load(order::Entity::find()).await
    }

    async fn has_preparing_order(&self, buyer_id: i32) -> DomainResult<bool> {
        let count = order::Entity::find()
            .filter(order::Column::BuyerId.eq(buyer_id))
            .filter(order::Column::State.eq(order::OrderState::Preparing))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn accept(
        &self,
        order_id: i32,
        start_time: DateTime<Utc>,
        delivery_time: DateTime<Utc>,
    ) -> DomainResult<()> {
        let result = order::Entity::update_many()
            .col_expr(order::Column::IsAccepted, Expr::value(true))
            .col_expr(order::Column::StartTime, Expr::value(start_time))
            .col_expr(order::Column::DeliveryTime, Expr::value(Some(delivery_time)))
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::State.eq(order::OrderState::Preparing))
            .filter(order::Column::IsAccepted.eq(false))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(order_not_acceptable(order_id));
        }
        Ok(())
    }

    async fn mark_delivered(&self, now: DateTime<Utc>) -> DomainResult<u64> {
        let result = order::Entity::update_many()
            .col_expr(
                order::Column::State,
                Expr::value(order::OrderState::Delivered),
            )
            .filter(order::Column::State.eq(order::OrderState::Preparing))
            .filter(order::Column::IsAccepted.eq(true))
            .filter(order::Column::DeliveryTime.lte(now))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
