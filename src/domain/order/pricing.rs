//! Order pricing and purchase limits
//!
//! Turns requested lines into priced item snapshots and applies the limits
//! that depend on the buyer: age-restricted categories and, for accounts
//! without full access, the order total cap.

use std::collections::{BTreeSet, HashMap};

use chrono::Duration;

use super::model::NewOrderItem;
use crate::domain::product::Product;
use crate::shared::{DomainError, DomainResult, Money};

/// A requested order line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRequest {
    pub product_id: i32,
    pub amount: i32,
}

/// Result of pricing a set of lines against the current catalog
#[derive(Debug, Clone)]
pub struct Quote {
    pub items: Vec<NewOrderItem>,
    /// Distinct sellers, each charged one delivery fee
    pub sellers: BTreeSet<i32>,
    /// First line whose product is age-restricted, if any
    pub restricted_product: Option<i32>,
    pub total: Money,
}

#[derive(Debug, Clone)]
pub struct OrderPolicy {
    pub delivery_fee: Money,
    /// Totals at or above this are refused for accounts without full access
    pub order_total_limit: Money,
    pub cancellation_window: Duration,
    pub adult_age: u32,
}

impl Default for OrderPolicy {
    fn default() -> Self {
        Self {
            delivery_fee: Money::from_cents(299),
            order_total_limit: Money::from_cents(50_000),
            cancellation_window: Duration::minutes(60),
            adult_age: 18,
        }
    }
}

impl OrderPolicy {
    /// Prices `lines` against `catalog`.
    ///
    /// Lines for the same product are checked against its stock
    /// cumulatively. `catalog` may contain unrelated products.
    pub fn quote(&self, lines: &[LineRequest], catalog: &[Product]) -> DomainResult<Quote> {
        if lines.is_empty() {
            return Err(DomainError::validation(
                "Order must contain at least one product.",
            ));
        }

        let by_id: HashMap<i32, &Product> = catalog.iter().map(|p| (p.id, p)).collect();
        let mut requested: HashMap<i32, i64> = HashMap::new();
        let mut items = Vec::with_capacity(lines.len());
        let mut sellers = BTreeSet::new();
        let mut restricted_product = None;
        let mut total = Money::zero();

        for line in lines {
            let product = by_id
                .get(&line.product_id)
                .ok_or_else(|| DomainError::not_found("Product is non existent."))?;

            if line.amount < 1 {
                return Err(DomainError::validation(
                    "Product amount must be higher then 0!",
                ));
            }

            let wanted = requested.entry(product.id).or_insert(0);
            *wanted += i64::from(line.amount);
            if *wanted > i64::from(product.amount) {
                return Err(DomainError::validation(format!(
                    "Currently there is only {} {}s in stock.",
                    product.amount, product.name
                )));
            }

            if restricted_product.is_none() && product.category.is_age_restricted() {
                restricted_product = Some(product.id);
            }

            total = product
                .price
                .checked_mul(line.amount as i64)
                .and_then(|line_total| total.checked_add(line_total))
                .ok_or_else(total_too_large)?;
            sellers.insert(product.seller_id);
            items.push(NewOrderItem {
                product_id: product.id,
                name: product.name.clone(),
                current_price: product.price,
                product_amount: line.amount,
            });
        }

        total = self
            .delivery_fee
            .checked_mul(sellers.len() as i64)
            .and_then(|fees| total.checked_add(fees))
            .ok_or_else(total_too_large)?;

        Ok(Quote {
            items,
            sellers,
            restricted_product,
            total,
        })
    }

    pub fn check_age(&self, quote: &Quote, buyer_is_adult: bool) -> DomainResult<()> {
        if quote.restricted_product.is_some() && !buyer_is_adult {
            return Err(DomainError::validation(
                "You can't buy alcohol/cigarettes until you turn 18.",
            ));
        }
        Ok(())
    }

    pub fn check_total(&self, total: Money, has_full_access: bool) -> DomainResult<()> {
        if !has_full_access && total >= self.order_total_limit {
            let max_allowed = Money::from_cents(self.order_total_limit.cents() - 1);
            return Err(DomainError::validation(format!(
                "You can't purchase order bigger then {}$.",
                max_allowed
            )));
        }
        Ok(())
    }
}

fn total_too_large() -> DomainError {
    DomainError::validation("Order total is too large.")
}
