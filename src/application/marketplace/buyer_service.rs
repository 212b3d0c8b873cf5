//! Buyer use cases: browsing, ordering and cancelling

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use super::delivery_tracker::refresh_deliveries;
use crate::domain::order::LineRequest;
use crate::domain::{
    DomainError, DomainResult, NewOrder, Order, OrderPolicy, OrderState, Product,
    RepositoryProvider, User,
};
use crate::shared::Money;

#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub items: Vec<LineRequest>,
    pub delivery_address: String,
    pub comment: Option<String>,
}

pub struct BuyerService {
    repos: Arc<dyn RepositoryProvider>,
    policy: OrderPolicy,
}

impl BuyerService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, policy: OrderPolicy) -> Self {
        Self { repos, policy }
    }

    /// Products that are currently in stock
    pub async fn get_all_products(&self, buyer_id: i32) -> DomainResult<Vec<Product>> {
        self.load_buyer(buyer_id).await?;
        self.repos.products().find_in_stock().await
    }

    /// The buyer's open and delivered orders
    pub async fn get_my_orders(&self, buyer_id: i32) -> DomainResult<Vec<Order>> {
        self.load_buyer(buyer_id).await?;
        refresh_deliveries(self.repos.as_ref()).await?;

        let orders = self.repos.orders().find_by_buyer(buyer_id).await?;
        Ok(orders
            .into_iter()
            .filter(|o| matches!(o.state, OrderState::Preparing | OrderState::Delivered))
            .collect())
    }

    pub async fn create_order(&self, buyer_id: i32, request: OrderRequest) -> DomainResult<Order> {
        let buyer = self.load_buyer(buyer_id).await?;
        refresh_deliveries(self.repos.as_ref()).await?;

        let quote = self.quote(&buyer, &request.items).await?;

        let is_adult = buyer.is_adult(Utc::now().date_naive(), self.policy.adult_age);
        if let Err(e) = self.policy.check_age(&quote, is_adult) {
            error!(
                user = %buyer.email,
                product_id = quote.restricted_product,
                "Underage buyer attempted to buy alcohol/cigarettes"
            );
            return Err(e);
        }

        if let Err(e) = self.policy.check_total(quote.total, buyer.has_full_access) {
            error!(
                user = %buyer.email,
                total = %quote.total,
                "User without full access trying to exceed the order total limit"
            );
            return Err(e);
        }

        let placed = self
            .repos
            .orders()
            .place(NewOrder {
                buyer_id: buyer.id,
                comment: request.comment.filter(|c| !c.trim().is_empty()),
                delivery_address: request.delivery_address,
                total_price: quote.total,
                start_time: Utc::now(),
                single_open_order: !buyer.has_full_access,
                items: quote.items,
            })
            .await;
        let order = match placed {
            Ok(order) => order,
            Err(e) => {
                error!(user = %buyer.email, error = %e, "Order could not be placed");
                return Err(e);
            }
        };

        metrics::counter!("marketplace_orders_created_total").increment(1);
        info!(
            user = %buyer.email,
            order_id = order.id,
            total = %order.total_price,
            "Order created"
        );
        Ok(order)
    }

    pub async fn decline_order(&self, buyer_id: i32, order_id: i32) -> DomainResult<()> {
        let buyer = self.load_buyer(buyer_id).await?;
        refresh_deliveries(self.repos.as_ref()).await?;

        let order = match self.repos.orders().find_by_id(order_id).await? {
            Some(o) if o.buyer_id == buyer.id => o,
            _ => {
                error!(user = %buyer.email, order_id, "Attempted to decline invalid order");
                return Err(DomainError::not_found("Order doesn't exist within this user."));
            }
        };

        if let Err(e) = order.ensure_cancellable(Utc::now(), self.policy.cancellation_window) {
            error!(user = %buyer.email, order_id, error = %e, "Order cannot be declined");
            return Err(e);
        }

        self.repos.orders().cancel(order.id).await?;

        metrics::counter!("marketplace_orders_canceled_total").increment(1);
        info!(user = %buyer.email, order_id, "Order declined");
        Ok(())
    }

    /// Total including delivery fees, without placing the order
    pub async fn get_total_price(&self, buyer_id: i32, items: &[LineRequest]) -> DomainResult<Money> {
        let buyer = self.load_buyer(buyer_id).await?;
        Ok(self.quote(&buyer, items).await?.total)
    }

    async fn quote(
        &self,
        buyer: &User,
        items: &[LineRequest],
    ) -> DomainResult<crate::domain::order::Quote> {
        let mut ids: Vec<i32> = items.iter().map(|i| i.product_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let catalog = self.repos.products().find_by_ids(&ids).await?;

        self.policy.quote(items, &catalog).map_err(|e| {
            error!(user = %buyer.email, error = %e, "Order items rejected");
            e
        })
    }

    async fn load_buyer(&self, buyer_id: i32) -> DomainResult<User> {
        self.repos
            .users()
            .find_by_id(buyer_id)
            .await?
            .ok_or_else(|| {
                DomainError::unauthorized(format!("Unable to find user with ID: {}.", buyer_id))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{fixture, seed_product, seed_user, Fixture};
    use crate::domain::{ProductCategory, UserType};
    use chrono::Duration;

    fn request(lines: &[(i32, i32)]) -> OrderRequest {
        OrderRequest {
            items: lines
                .iter()
                .map(|&(product_id, amount)| LineRequest { product_id, amount })
                .collect(),
            delivery_address: "Main Street 1".to_string(),
            comment: Some("Ring twice".to_string()),
        }
    }

    async fn setup() -> (Fixture, User, User) {
        let f = fixture();
        let buyer = seed_user(&f.repos, "buyer", UserType::Buyer, 1990).await;
        let seller = seed_user(&f.repos, "seller", UserType::Seller, 1980).await;
        (f, buyer, seller)
    }

    #[tokio::test]
    async fn test_create_order_decrements_stock_and_adds_fee() {
        let (f, buyer, seller) = setup().await;
        let p = seed_product(&f.repos, seller.id, "Bread", 250, 10, ProductCategory::Food).await;

        let order = f.buyer.create_order(buyer.id, request(&[(p.id, 4)])).await.unwrap();
        assert_eq!(order.total_price, Money::from_cents(4 * 250 + 299));
        assert_eq!(order.state, OrderState::Preparing);
        assert_eq!(order.comment.as_deref(), Some("Ring twice"));

        let reloaded = f.repos.products().find_by_id(p.id).await.unwrap().unwrap();
        assert_eq!(reloaded.amount, 6);
    }

    #[tokio::test]
    async fn test_over_stock_rejected_and_stock_unchanged() {
        let (f, buyer, seller) = setup().await;
        let p = seed_product(&f.repos, seller.id, "Bread", 250, 3, ProductCategory::Food).await;

        let err = f.buyer.create_order(buyer.id, request(&[(p.id, 4)])).await.unwrap_err();
        assert_eq!(err.to_string(), "Currently there is only 3 Breads in stock.");

        let reloaded = f.repos.products().find_by_id(p.id).await.unwrap().unwrap();
        assert_eq!(reloaded.amount, 3);
        assert!(f.buyer.get_my_orders(buyer.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_underage_cannot_buy_alcohol() {
        let (f, _buyer, seller) = setup().await;
        let teen = seed_user(&f.repos, "teen", UserType::Buyer, 2015).await;
        let beer = seed_product(&f.repos, seller.id, "Beer", 300, 10, ProductCategory::Alcohol).await;
        let juice = seed_product(&f.repos, seller.id, "Juice", 300, 10, ProductCategory::Drinks).await;

        let err = f.buyer.create_order(teen.id, request(&[(beer.id, 1)])).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "You can't buy alcohol/cigarettes until you turn 18."
        );
        assert!(f.buyer.create_order(teen.id, request(&[(juice.id, 1)])).await.is_ok());
    }

    #[tokio::test]
    async fn test_delivery_fee_once_per_seller() {
        let (f, buyer, seller) = setup().await;
        let other = seed_user(&f.repos, "other", UserType::Seller, 1980).await;
        let a = seed_product(&f.repos, seller.id, "Apple", 100, 10, ProductCategory::Food).await;
        let b = seed_product(&f.repos, seller.id, "Pear", 100, 10, ProductCategory::Food).await;
        let c = seed_product(&f.repos, other.id, "Milk", 100, 10, ProductCategory::Drinks).await;

        let total = f
            .buyer
            .get_total_price(buyer.id, &request(&[(a.id, 1), (b.id, 1), (c.id, 1)]).items)
            .await
            .unwrap();
        assert_eq!(total, Money::from_cents(300 + 2 * 299));

        // Quoting has no side effects
        let reloaded = f.repos.products().find_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(reloaded.amount, 10);
    }

    #[tokio::test]
    async fn test_limited_buyer_single_open_order() {
        let (f, buyer, seller) = setup().await;
        let p = seed_product(&f.repos, seller.id, "Bread", 250, 10, ProductCategory::Food).await;

        f.buyer.create_order(buyer.id, request(&[(p.id, 1)])).await.unwrap();
        let err = f.buyer.create_order(buyer.id, request(&[(p.id, 1)])).await.unwrap_err();
        assert_eq!(err.to_string(), "You can have only 1 order at time.");
    }

    #[tokio::test]
    async fn test_limited_buyer_concurrent_orders_place_one() {
        let (f, buyer, seller) = setup().await;
        let p = seed_product(&f.repos, seller.id, "Bread", 250, 10, ProductCategory::Food).await;

        let (first, second) = tokio::join!(
            f.buyer.create_order(buyer.id, request(&[(p.id, 2)])),
            f.buyer.create_order(buyer.id, request(&[(p.id, 2)]))
        );
        assert_eq!(u8::from(first.is_ok()) + u8::from(second.is_ok()), 1);

        let reloaded = f.repos.products().find_by_id(p.id).await.unwrap().unwrap();
        assert_eq!(reloaded.amount, 8);
        assert_eq!(f.buyer.get_my_orders(buyer.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_overflowing_total_rejected_and_stock_unchanged() {
        let (f, buyer, seller) = setup().await;
        let p = seed_product(&f.repos, seller.id, "Gold", 1 << 62, 10, ProductCategory::Food).await;

        let err = f.buyer.create_order(buyer.id, request(&[(p.id, 2)])).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(err.to_string(), "Order total is too large.");

        let reloaded = f.repos.products().find_by_id(p.id).await.unwrap().unwrap();
        assert_eq!(reloaded.amount, 10);
        assert!(f.buyer.get_my_orders(buyer.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_full_access_buyer_not_limited() {
        let (f, mut buyer, seller) = setup().await;
        buyer.has_full_access = true;
        f.repos.users().update(&buyer).await.unwrap();
        let p = seed_product(&f.repos, seller.id, "Tv", 60_000, 10, ProductCategory::Food).await;

        f.buyer.create_order(buyer.id, request(&[(p.id, 1)])).await.unwrap();
        f.buyer.create_order(buyer.id, request(&[(p.id, 1)])).await.unwrap();
    }

    #[tokio::test]
    async fn test_limited_buyer_total_cap() {
        let (f, buyer, seller) = setup().await;
        // 497.01 + 2.99 delivery = 500.00
        let p = seed_product(&f.repos, seller.id, "Tv", 49_701, 10, ProductCategory::Food).await;
        let err = f.buyer.create_order(buyer.id, request(&[(p.id, 1)])).await.unwrap_err();
        assert_eq!(err.to_string(), "You can't purchase order bigger then 499.99$.");

        let cheaper = seed_product(&f.repos, seller.id, "Radio", 49_700, 10, ProductCategory::Food).await;
        assert!(f.buyer.create_order(buyer.id, request(&[(cheaper.id, 1)])).await.is_ok());
    }

    #[tokio::test]
    async fn test_decline_restores_stock() {
        let (f, buyer, seller) = setup().await;
        let p = seed_product(&f.repos, seller.id, "Bread", 250, 10, ProductCategory::Food).await;
        let order = f.buyer.create_order(buyer.id, request(&[(p.id, 7)])).await.unwrap();

        f.buyer.decline_order(buyer.id, order.id).await.unwrap();

        let reloaded = f.repos.products().find_by_id(p.id).await.unwrap().unwrap();
        assert_eq!(reloaded.amount, 10);
        assert!(f.buyer.get_my_orders(buyer.id).await.unwrap().is_empty());

        // A canceled order frees the single open order slot
        assert!(f.buyer.create_order(buyer.id, request(&[(p.id, 1)])).await.is_ok());
    }

    #[tokio::test]
    async fn test_decline_after_window_fails() {
        let (f, buyer, seller) = setup().await;
        let p = seed_product(&f.repos, seller.id, "Bread", 250, 10, ProductCategory::Food).await;
        let order = f.buyer.create_order(buyer.id, request(&[(p.id, 1)])).await.unwrap();

        f.repos.backdate_order(order.id, Utc::now() - Duration::minutes(61));

        let err = f.buyer.decline_order(buyer.id, order.id).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "1 hour already passed, you can't cancel your order."
        );
    }

    #[tokio::test]
    async fn test_decline_delivered_order_fails() {
        let (f, buyer, seller) = setup().await;
        let p = seed_product(&f.repos, seller.id, "Bread", 250, 10, ProductCategory::Food).await;
        let order = f.buyer.create_order(buyer.id, request(&[(p.id, 1)])).await.unwrap();

        let start = Utc::now() - Duration::minutes(90);
        f.repos
            .orders()
            .accept(order.id, start, start + Duration::minutes(60))
            .await
            .unwrap();

        let err = f.buyer.decline_order(buyer.id, order.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Can't cancel already delivered order.");

        let orders = f.buyer.get_my_orders(buyer.id).await.unwrap();
        assert_eq!(orders[0].state, OrderState::Delivered);
    }

    #[tokio::test]
    async fn test_decline_someone_elses_order() {
        let (f, buyer, seller) = setup().await;
        let intruder = seed_user(&f.repos, "intruder", UserType::Buyer, 1990).await;
        let p = seed_product(&f.repos, seller.id, "Bread", 250, 10, ProductCategory::Food).await;
        let order = f.buyer.create_order(buyer.id, request(&[(p.id, 1)])).await.unwrap();

        let err = f.buyer.decline_order(intruder.id, order.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_products_in_stock_only() {
        let (f, buyer, seller) = setup().await;
        seed_product(&f.repos, seller.id, "Bread", 250, 10, ProductCategory::Food).await;
        seed_product(&f.repos, seller.id, "Gone", 250, 0, ProductCategory::Food).await;

        let products = f.buyer.get_all_products(buyer.id).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Bread");
    }

    #[tokio::test]
    async fn test_unknown_buyer() {
        let f = fixture();
        assert!(matches!(
            f.buyer.get_all_products(404).await,
            Err(DomainError::Unauthorized(_))
        ));
    }
}
