//! Order domain entity

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use crate::shared::{DomainError, DomainResult, Money};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderState {
    Preparing,
    Delivered,
    Canceled,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preparing => "Preparing",
            Self::Delivered => "Delivered",
            Self::Canceled => "Canceled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Preparing" => Some(Self::Preparing),
            "Delivered" => Some(Self::Delivered),
            "Canceled" => Some(Self::Canceled),
            _ => None,
        }
    }
}

/// Line of an order. Name and price are copied from the product when the
/// order is placed, so the line outlives later product edits or deletion.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub name: String,
    pub current_price: Money,
    pub product_amount: i32,
}

impl OrderItem {
    /// `None` when the amount times the price does not fit into `Money`.
    pub fn line_total(&self) -> Option<Money> {
        self.current_price.checked_mul(self.product_amount as i64)
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: i32,
    pub buyer_id: i32,
    pub comment: Option<String>,
    pub delivery_address: String,
    /// Items plus delivery fees
    pub total_price: Money,
    pub state: OrderState,
    pub is_accepted: bool,
    /// Placement time, reset when a seller accepts the order
    pub start_time: DateTime<Utc>,
    pub delivery_time: Option<DateTime<Utc>>,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Checks that the buyer may still cancel the order at `now`.
    pub fn ensure_cancellable(&self, now: DateTime<Utc>, window: Duration) -> DomainResult<()> {
        match self.state {
            OrderState::Delivered => Err(DomainError::validation(
                "Can't cancel already delivered order.",
            )),
            OrderState::Canceled => Err(DomainError::validation("Order is already canceled.")),
            OrderState::Preparing if self.start_time + window < now => {
                Err(DomainError::validation(format!(
                    "{} already passed, you can't cancel your order.",
                    describe_window(window)
                )))
            }
            OrderState::Preparing => Ok(()),
        }
    }

    pub fn ensure_acceptable(&self) -> DomainResult<()> {
        if self.state == OrderState::Preparing && !self.is_accepted {
            Ok(())
        } else {
            Err(order_not_acceptable(self.id))
        }
    }

    /// Marks the order accepted; delivery is expected `delivery_delay` from now.
    pub fn accept(&mut self, now: DateTime<Utc>, delivery_delay: Duration) {
        self.is_accepted = true;
        self.start_time = now;
        self.delivery_time = Some(now + delivery_delay);
    }

    pub fn is_due_for_delivery(&self, now: DateTime<Utc>) -> bool {
        self.state == OrderState::Preparing
            && self.is_accepted
            && self.delivery_time.is_some_and(|t| t <= now)
    }

    pub fn contains_any(&self, product_ids: &HashSet<i32>) -> bool {
        self.items.iter().any(|i| product_ids.contains(&i.product_id))
    }

    /// Keeps only the lines for `product_ids`.
    pub fn retain_products(&mut self, product_ids: &HashSet<i32>) {
        self.items.retain(|i| product_ids.contains(&i.product_id));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub product_id: i32,
    pub name: String,
    pub current_price: Money,
    pub product_amount: i32,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub buyer_id: i32,
    pub comment: Option<String>,
    pub delivery_address: String,
    pub total_price: Money,
    pub start_time: DateTime<Utc>,
    pub items: Vec<NewOrderItem>,
    /// Refuse the order while the buyer still has one in `Preparing`
    pub single_open_order: bool,
}

/// Error for an order that is missing or no longer waiting for a seller
pub fn order_not_acceptable(order_id: i32) -> DomainError {
    DomainError::validation(format!(
        "Unable to find unaccepted order with ID: {}.",
        order_id
    ))
}

fn describe_window(window: Duration) -> String {
    let minutes = window.num_minutes();
    match minutes {
        60 => "1 hour".to_string(),
        m if m > 0 && m % 60 == 0 => format!("{} hours", m / 60),
        1 => "1 minute".to_string(),
        m => format!("{} minutes", m),
    }
}
