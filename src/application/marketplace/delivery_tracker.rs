//! Delivery tracking
//!
//! An accepted order becomes `Delivered` once its delivery time has passed.
//! Listings call [`refresh_deliveries`] first so they never show stale
//! state, and a background task sweeps periodically.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::{DomainResult, RepositoryProvider};
use crate::shared::shutdown::ShutdownSignal;

/// Marks every due order as delivered. Returns how many changed.
pub async fn refresh_deliveries(repos: &dyn RepositoryProvider) -> DomainResult<u64> {
    let delivered = repos.orders().mark_delivered(Utc::now()).await?;
    if delivered > 0 {
        debug!(count = delivered, "Orders marked as delivered");
    }
    Ok(delivered)
}

/// Start the delivery background task.
///
/// Sweeps every `check_interval_secs` until `shutdown` fires.
pub fn start_delivery_task(
    repos: Arc<dyn RepositoryProvider>,
    shutdown: ShutdownSignal,
    check_interval_secs: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            check_interval = check_interval_secs,
            "🚚 Delivery tracking task started"
        );

        let mut interval = tokio::time::interval(Duration::from_secs(check_interval_secs.max(1)));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match refresh_deliveries(repos.as_ref()).await {
                        Ok(0) => {}
                        Ok(count) => info!(count, "Orders delivered"),
                        Err(e) => warn!(error = %e, "Delivery check error"),
                    }
                }
                _ = shutdown.notified().wait() => {
                    info!("🚚 Delivery tracking task shutting down");
                    break;
                }
            }
        }

        info!("🚚 Delivery tracking task stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{fixture, seed_product, seed_user};
    use crate::domain::{OrderState, ProductCategory, UserType};
    use crate::domain::order::LineRequest;
    use crate::application::marketplace::OrderRequest;

    #[tokio::test]
    async fn test_task_delivers_due_orders_and_stops() {
        let f = fixture();
        let buyer = seed_user(&f.repos, "buyer", UserType::Buyer, 1990).await;
        let seller = seed_user(&f.repos, "seller", UserType::Seller, 1980).await;
        let product = seed_product(&f.repos, seller.id, "Bread", 200, 5, ProductCategory::Food).await;

        let order = f
            .buyer
            .create_order(
                buyer.id,
                OrderRequest {
                    items: vec![LineRequest { product_id: product.id, amount: 1 }],
                    delivery_address: "Main Street 1".to_string(),
                    comment: None,
                },
            )
            .await
            .unwrap();
        let start = Utc::now() - chrono::Duration::hours(3);
        f.repos
            .orders()
            .accept(order.id, start, start + chrono::Duration::hours(1))
            .await
            .unwrap();

        let shutdown = ShutdownSignal::new();
        let handle = start_delivery_task(f.repos.clone(), shutdown.clone(), 1);

        // First tick fires immediately
        tokio::time::sleep(Duration::from_millis(50)).await;
        let reloaded = f.repos.orders().find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(reloaded.state, OrderState::Delivered);

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("task should stop on shutdown")
            .unwrap();
    }
}
