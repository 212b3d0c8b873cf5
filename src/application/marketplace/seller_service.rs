//! Seller use cases: catalog management and order acceptance

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;
use tracing::{error, info};

use super::delivery_tracker::refresh_deliveries;
use crate::domain::order::order_not_acceptable;
use crate::domain::product::{MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH, MAX_PRICE};
use crate::domain::{
    DomainError, DomainResult, NewProduct, Order, OrderState, Product, ProductCategory,
    RepositoryProvider, User,
};
use crate::shared::Money;

/// Product fields submitted by a seller
#[derive(Debug, Clone)]
pub struct ProductForm {
    pub name: String,
    pub price: Money,
    pub amount: i32,
    pub description: Option<String>,
    pub category: ProductCategory,
    /// New image; `None` keeps the current one on update
    pub image: Option<Vec<u8>>,
}

impl ProductForm {
    fn validate(&self) -> DomainResult<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("Product name is empty!"));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "Product name can't be longer than {} characters!",
                MAX_NAME_LENGTH
            )));
        }
        if self.amount <= 0 {
            return Err(DomainError::validation("Product amount must be higher then 0!"));
        }
        if !self.price.is_positive() {
            return Err(DomainError::validation("Product price must be higher then 0!"));
        }
        if self.price > MAX_PRICE {
            return Err(DomainError::validation(format!(
                "Product price can't be higher than {}$!",
                MAX_PRICE
            )));
        }
        if self
            .description
            .as_deref()
            .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH)
        {
            return Err(DomainError::validation(format!(
                "Product description can't be longer than {} characters!",
                MAX_DESCRIPTION_LENGTH
            )));
        }
        Ok(())
    }
}

pub struct SellerService {
    repos: Arc<dyn RepositoryProvider>,
}

impl SellerService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn get_product(&self, seller_id: i32, product_id: i32) -> DomainResult<Product> {
        let seller = self.load_seller(seller_id).await?;
        self.owned_product(&seller, product_id).await
    }

    pub async fn get_all_products(&self, seller_id: i32) -> DomainResult<Vec<Product>> {
        self.load_seller(seller_id).await?;
        self.repos.products().find_by_seller(seller_id).await
    }

    /// Delivered orders with the seller's lines
    pub async fn get_all_orders(&self, seller_id: i32) -> DomainResult<Vec<Order>> {
        self.orders_in_state(seller_id, OrderState::Delivered).await
    }

    /// Orders still being prepared with the seller's lines
    pub async fn get_new_orders(&self, seller_id: i32) -> DomainResult<Vec<Order>> {
        self.orders_in_state(seller_id, OrderState::Preparing).await
    }

    pub async fn create_product(&self, seller_id: i32, form: ProductForm) -> DomainResult<Product> {
        let seller = self.load_seller(seller_id).await?;
        if let Err(e) = form.validate() {
            error!(user = %seller.email, error = %e, "Invalid product submitted");
            return Err(e);
        }

        let product = self
            .repos
            .products()
            .create(NewProduct {
                name: form.name.trim().to_string(),
                price: form.price,
                amount: form.amount,
                description: form.description,
                image: form.image,
                category: form.category,
                seller_id: seller.id,
            })
            .await?;

        info!(user = %seller.email, product_id = product.id, "Product created");
        Ok(product)
    }

    pub async fn update_product(
        &self,
        seller_id: i32,
        product_id: i32,
        form: ProductForm,
    ) -> DomainResult<Product> {
        let seller = self.load_seller(seller_id).await?;
        let mut product = self.owned_product(&seller, product_id).await?;
        if let Err(e) = form.validate() {
            error!(user = %seller.email, product_id, error = %e, "Invalid product update");
            return Err(e);
        }

        product.name = form.name.trim().to_string();
        product.price = form.price;
        product.amount = form.amount;
        product.description = form.description;
        product.category = form.category;
        if let Some(image) = form.image {
            product.image = Some(image);
        }

        self.repos.products().update(&product).await?;
        info!(user = %seller.email, product_id, "Product updated");
        Ok(product)
    }

    pub async fn delete_product(&self, seller_id: i32, product_id: i32) -> DomainResult<()> {
        let seller = self.load_seller(seller_id).await?;
        self.owned_product(&seller, product_id).await?;
        self.repos.products().delete(product_id).await?;
        info!(user = %seller.email, product_id, "Product deleted");
        Ok(())
    }

    /// Accepts an order that contains at least one of the seller's products.
    /// Delivery is scheduled between one and two hours from now.
    pub async fn accept_order(&self, seller_id: i32, order_id: i32) -> DomainResult<Order> {
        let seller = self.load_seller(seller_id).await?;
        refresh_deliveries(self.repos.as_ref()).await?;

        let mut order = self
            .repos
            .orders()
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| order_not_acceptable(order_id))?;
        if let Err(e) = order.ensure_acceptable() {
            error!(user = %seller.email, order_id, "Attempted to accept an unavailable order");
            return Err(e);
        }

        let mine = self.product_ids(seller.id).await?;
        if !order.contains_any(&mine) {
            error!(user = %seller.email, order_id, "Attempted to accept order without own products");
            return Err(DomainError::validation(format!(
                "You dont have any products on order with ID: {}.",
                order_id
            )));
        }

        // The read above may be stale by now; the store only flips orders
        // that are still preparing and unaccepted.
        let now = Utc::now();
        let delay = Duration::minutes(60 + rand::thread_rng().gen_range(0..60));
        if let Err(e) = self.repos.orders().accept(order.id, now, now + delay).await {
            error!(user = %seller.email, order_id, error = %e, "Order changed before it was accepted");
            return Err(e);
        }
        order.accept(now, delay);

        metrics::counter!("marketplace_orders_accepted_total").increment(1);
        info!(
            user = %seller.email,
            order_id,
            delivery_time = ?order.delivery_time,
            "Order accepted"
        );
        Ok(order)
    }

    async fn orders_in_state(&self, seller_id: i32, state: OrderState) -> DomainResult<Vec<Order>> {
        self.load_seller(seller_id).await?;
        refresh_deliveries(self.repos.as_ref()).await?;

        let mine = self.product_ids(seller_id).await?;
        let orders = self.repos.orders().find_by_state(state).await?;
        Ok(orders
            .into_iter()
            .filter(|o| o.contains_any(&mine))
            .map(|mut o| {
                o.retain_products(&mine);
                o
            })
            .collect())
    }

    async fn product_ids(&self, seller_id: i32) -> DomainResult<HashSet<i32>> {
        Ok(self
            .repos
            .products()
            .find_by_seller(seller_id)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect())
    }

    async fn owned_product(&self, seller: &User, product_id: i32) -> DomainResult<Product> {
        match self.repos.products().find_by_id(product_id).await? {
            Some(p) if p.is_owned_by(seller.id) => Ok(p),
            _ => {
                error!(user = %seller.email, product_id, "Product not found for seller");
                Err(DomainError::not_found(format!(
                    "Unable to find product with ID: {}.",
                    product_id
                )))
            }
        }
    }

    async fn load_seller(&self, seller_id: i32) -> DomainResult<User> {
        self.repos
            .users()
            .find_by_id(seller_id)
            .await?
            .ok_or_else(|| {
                DomainError::unauthorized(format!("Unable to find user with ID: {}.", seller_id))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::marketplace::OrderRequest;
    use crate::application::test_support::{fixture, seed_product, seed_user};
    use crate::domain::order::LineRequest;
    use crate::domain::UserType;

    fn form(name: &str) -> ProductForm {
        ProductForm {
            name: name.to_string(),
            price: Money::from_cents(199),
            amount: 5,
            description: Some("Fresh".to_string()),
            category: ProductCategory::Food,
            image: Some(vec![1, 2, 3]),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_products() {
        let f = fixture();
        let seller = seed_user(&f.repos, "seller", UserType::Seller, 1980).await;
        let other = seed_user(&f.repos, "other", UserType::Seller, 1980).await;

        let created = f.seller.create_product(seller.id, form("  Cheese ")).await.unwrap();
        assert_eq!(created.name, "Cheese");
        f.seller.create_product(other.id, form("Milk")).await.unwrap();

        let mine = f.seller.get_all_products(seller.id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, created.id);
    }

    #[tokio::test]
    async fn test_product_validation() {
        let f = fixture();
        let seller = seed_user(&f.repos, "seller", UserType::Seller, 1980).await;

        let err = f.seller.create_product(seller.id, form(" ")).await.unwrap_err();
        assert_eq!(err.to_string(), "Product name is empty!");

        let too_long = "x".repeat(31);
        assert!(f.seller.create_product(seller.id, form(&too_long)).await.is_err());

        let mut zero_amount = form("Cheese");
        zero_amount.amount = 0;
        let err = f.seller.create_product(seller.id, zero_amount).await.unwrap_err();
        assert_eq!(err.to_string(), "Product amount must be higher then 0!");

        let mut free = form("Cheese");
        free.price = Money::zero();
        let err = f.seller.create_product(seller.id, free).await.unwrap_err();
        assert_eq!(err.to_string(), "Product price must be higher then 0!");

        let mut pricey = form("Cheese");
        pricey.price = Money::from_cents(4_611_686_018_427_387_904);
        let err = f.seller.create_product(seller.id, pricey).await.unwrap_err();
        assert_eq!(err.to_string(), "Product price can't be higher than 1000000.00$!");

        let mut wordy = form("Cheese");
        wordy.description = Some("d".repeat(201));
        assert!(f.seller.create_product(seller.id, wordy).await.is_err());
    }

    #[tokio::test]
    async fn test_only_owner_can_modify() {
        let f = fixture();
        let seller = seed_user(&f.repos, "seller", UserType::Seller, 1980).await;
        let other = seed_user(&f.repos, "other", UserType::Seller, 1980).await;
        let p = seed_product(&f.repos, seller.id, "Cheese", 500, 5, ProductCategory::Food).await;

        assert!(matches!(
            f.seller.get_product(other.id, p.id).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(f.seller.update_product(other.id, p.id, form("Stolen")).await.is_err());
        assert!(f.seller.delete_product(other.id, p.id).await.is_err());

        assert!(f.seller.get_product(seller.id, p.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_keeps_image_when_none_sent() {
        let f = fixture();
        let seller = seed_user(&f.repos, "seller", UserType::Seller, 1980).await;
        let created = f.seller.create_product(seller.id, form("Cheese")).await.unwrap();

        let mut update = form("Gouda");
        update.image = None;
        update.amount = 9;
        let updated = f.seller.update_product(seller.id, created.id, update).await.unwrap();
        assert_eq!(updated.name, "Gouda");
        assert_eq!(updated.amount, 9);
        assert_eq!(updated.image, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_delete_product() {
        let f = fixture();
        let seller = seed_user(&f.repos, "seller", UserType::Seller, 1980).await;
        let p = seed_product(&f.repos, seller.id, "Cheese", 500, 5, ProductCategory::Food).await;

        f.seller.delete_product(seller.id, p.id).await.unwrap();
        assert!(f.seller.get_product(seller.id, p.id).await.is_err());
    }

    #[tokio::test]
    async fn test_accept_order_flow() {
        let f = fixture();
        let buyer = seed_user(&f.repos, "buyer", UserType::Buyer, 1990).await;
        let seller = seed_user(&f.repos, "seller", UserType::Seller, 1980).await;
        let other = seed_user(&f.repos, "other", UserType::Seller, 1980).await;
        let mine = seed_product(&f.repos, seller.id, "Cheese", 500, 5, ProductCategory::Food).await;
        let theirs = seed_product(&f.repos, other.id, "Milk", 100, 5, ProductCategory::Drinks).await;

        let order = f
            .buyer
            .create_order(
                buyer.id,
                OrderRequest {
                    items: vec![
                        LineRequest { product_id: mine.id, amount: 1 },
                        LineRequest { product_id: theirs.id, amount: 2 },
                    ],
                    delivery_address: "Main Street 1".to_string(),
                    comment: None,
                },
            )
            .await
            .unwrap();

        // New orders only carry the seller's own lines
        let new_orders = f.seller.get_new_orders(seller.id).await.unwrap();
        assert_eq!(new_orders.len(), 1);
        assert_eq!(new_orders[0].items.len(), 1);
        assert_eq!(new_orders[0].items[0].product_id, mine.id);

        let before = Utc::now();
        let accepted = f.seller.accept_order(seller.id, order.id).await.unwrap();
        assert!(accepted.is_accepted);
        let delivery = accepted.delivery_time.unwrap();
        assert!(delivery >= before + Duration::minutes(60));
        assert!(delivery <= Utc::now() + Duration::minutes(120));

        let err = f.seller.accept_order(other.id, order.id).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Unable to find unaccepted order with ID: {}.", order.id)
        );
        assert!(f.seller.get_all_orders(seller.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_accept_requires_own_product() {
        let f = fixture();
        let buyer = seed_user(&f.repos, "buyer", UserType::Buyer, 1990).await;
        let seller = seed_user(&f.repos, "seller", UserType::Seller, 1980).await;
        let other = seed_user(&f.repos, "other", UserType::Seller, 1980).await;
        let theirs = seed_product(&f.repos, other.id, "Milk", 100, 5, ProductCategory::Drinks).await;

        let order = f
            .buyer
            .create_order(
                buyer.id,
                OrderRequest {
                    items: vec![LineRequest { product_id: theirs.id, amount: 1 }],
                    delivery_address: "Main Street 1".to_string(),
                    comment: None,
                },
            )
            .await
            .unwrap();

        let err = f.seller.accept_order(seller.id, order.id).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("You dont have any products on order with ID: {}.", order.id)
        );

        assert!(f.seller.accept_order(seller.id, 9999).await.is_err());
    }

    #[tokio::test]
    async fn test_accept_after_decline_keeps_order_canceled() {
        let f = fixture();
        let buyer = seed_user(&f.repos, "buyer", UserType::Buyer, 1990).await;
        let seller = seed_user(&f.repos, "seller", UserType::Seller, 1980).await;
        let product = seed_product(&f.repos, seller.id, "Bread", 250, 10, ProductCategory::Food).await;

        let order = f
            .buyer
            .create_order(
                buyer.id,
                OrderRequest {
                    items: vec![LineRequest { product_id: product.id, amount: 3 }],
                    delivery_address: "Main Street 1".to_string(),
                    comment: None,
                },
            )
            .await
            .unwrap();

        // Seller read the order before the buyer declined it
        let stale = f.repos.orders().find_by_id(order.id).await.unwrap().unwrap();
        assert!(stale.ensure_acceptable().is_ok());
        f.buyer.decline_order(buyer.id, order.id).await.unwrap();

        let now = Utc::now();
        let err = f
            .repos
            .orders()
            .accept(stale.id, now, now + Duration::minutes(60))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Unable to find unaccepted order with ID: {}.", order.id)
        );
        assert!(f.seller.accept_order(seller.id, order.id).await.is_err());

        let reloaded = f.repos.orders().find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(reloaded.state, OrderState::Canceled);
        assert!(!reloaded.is_accepted);
        assert!(reloaded.delivery_time.is_none());
        let stock = f.repos.products().find_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(stock.amount, 10);
    }

    #[tokio::test]
    async fn test_order_is_accepted_only_once() {
        let f = fixture();
        let buyer = seed_user(&f.repos, "buyer", UserType::Buyer, 1990).await;
        let seller = seed_user(&f.repos, "seller", UserType::Seller, 1980).await;
        let product = seed_product(&f.repos, seller.id, "Bread", 250, 10, ProductCategory::Food).await;
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

        let (first, second) = tokio::join!(
            f.seller.accept_order(seller.id, order.id),
            f.seller.accept_order(seller.id, order.id)
        );
        assert_eq!(u8::from(first.is_ok()) + u8::from(second.is_ok()), 1);
    }
}
