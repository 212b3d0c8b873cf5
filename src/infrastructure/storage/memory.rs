//! In-memory repository implementation
//!
//! Mirrors the SeaORM repositories, including all-or-nothing stock updates
//! and conditional order transitions, so services can be tested without a
//! database. Only compiled for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::domain::order::order_not_acceptable;
use crate::domain::{
    DomainError, DomainResult, NewOrder, NewProduct, NewUser, Order, OrderItem, OrderRepository,
    OrderState, Product, ProductRepository, RepositoryProvider, User, UserRepository, UserType,
    VerificationState,
};

/// In-memory storage for tests
pub struct InMemoryRepositoryProvider {
    users: DashMap<i32, User>,
    products: DashMap<i32, Product>,
    orders: DashMap<i32, Order>,
    user_counter: AtomicI32,
    product_counter: AtomicI32,
    order_counter: AtomicI32,
    item_counter: AtomicI32,
    /// Serializes writes that touch stock of several products
    stock_lock: Mutex<()>,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            products: DashMap::new(),
            orders: DashMap::new(),
            user_counter: AtomicI32::new(1),
            product_counter: AtomicI32::new(1),
            order_counter: AtomicI32::new(1),
            item_counter: AtomicI32::new(1),
            stock_lock: Mutex::new(()),
        }
    }

    /// Moves an order's start time, for cancellation window tests
    pub fn backdate_order(&self, order_id: i32, start_time: DateTime<Utc>) {
        if let Some(mut order) = self.orders.get_mut(&order_id) {
            order.start_time = start_time;
        }
    }

    fn lock_stock(&self) -> DomainResult<MutexGuard<'_, ()>> {
        self.stock_lock
            .lock()
            .map_err(|_| DomainError::Internal("stock lock poisoned".to_string()))
    }

    fn sorted<T: Clone>(map: &DashMap<i32, T>, keep: impl Fn(&T) -> bool) -> Vec<T> {
        let mut rows: Vec<(i32, T)> = map
            .iter()
            .filter(|e| keep(e.value()))
            .map(|e| (*e.key(), e.value().clone()))
            .collect();
        rows.sort_by_key(|(id, _)| *id);
        rows.into_iter().map(|(_, v)| v).collect()
    }
}

impl Default for InMemoryRepositoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RepositoryProvider for InMemoryRepositoryProvider {
    fn users(&self) -> &dyn UserRepository {
        self
    }

    fn products(&self) -> &dyn ProductRepository {
        self
    }

    fn orders(&self) -> &dyn OrderRepository {
        self
    }

    async fn health_check(&self) -> DomainResult<()> {
        Ok(())
    }
}

// ── Users ───────────────────────────────────────────────────────

#[async_trait]
impl UserRepository for InMemoryRepositoryProvider {
    async fn create(&self, new_user: NewUser) -> DomainResult<User> {
        let taken = self
            .users
            .iter()
            .any(|u| u.email == new_user.email || u.username == new_user.username);
        if taken {
            return Err(DomainError::validation("Username or email already exists"));
        }

        let id = self.user_counter.fetch_add(1, Ordering::SeqCst);
        let user = User {
            id,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            full_name: new_user.full_name,
            birth_date: new_user.birth_date,
            address: new_user.address,
            user_type: new_user.user_type,
            verification_state: new_user.verification_state,
            has_full_access: new_user.has_full_access,
            image: new_user.image,
            registration_time: Utc::now(),
        };
        self.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.clone()))
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.clone()))
    }

    async fn find_by_type(&self, user_type: UserType) -> DomainResult<Vec<User>> {
        Ok(Self::sorted(&self.users, |u| u.user_type == user_type))
    }

    async fn find_sellers_by_state(&self, state: VerificationState) -> DomainResult<Vec<User>> {
        Ok(Self::sorted(&self.users, |u| {
            u.user_type == UserType::Seller && u.verification_state == state
        }))
    }

    async fn update(&self, user: &User) -> DomainResult<()> {
        let clash = self.users.iter().any(|u| {
            u.id != user.id && (u.email == user.email || u.username == user.username)
        });
        if clash {
            return Err(DomainError::validation("Username or email already exists"));
        }

        match self.users.get_mut(&user.id) {
            Some(mut existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(DomainError::not_found(format!(
                "Unable to find user with ID: {}.",
                user.id
            ))),
        }
    }
}

// ── Products ────────────────────────────────────────────────────

#[async_trait]
impl ProductRepository for InMemoryRepositoryProvider {
    async fn create(&self, p: NewProduct) -> DomainResult<Product> {
        let id = self.product_counter.fetch_add(1, Ordering::SeqCst);
        let product = Product {
            id,
            name: p.name,
            price: p.price,
            amount: p.amount,
            description: p.description,
            image: p.image,
            category: p.category,
            seller_id: p.seller_id,
        };
        self.products.insert(id, product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Product>> {
        Ok(self.products.get(&id).map(|p| p.clone()))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> DomainResult<Vec<Product>> {
        Ok(Self::sorted(&self.products, |p| ids.contains(&p.id)))
    }

    async fn find_by_seller(&self, seller_id: i32) -> DomainResult<Vec<Product>> {
        Ok(Self::sorted(&self.products, |p| p.seller_id == seller_id))
    }

    async fn find_in_stock(&self) -> DomainResult<Vec<Product>> {
        Ok(Self::sorted(&self.products, |p| p.in_stock()))
    }

    async fn update(&self, product: &Product) -> DomainResult<()> {
        match self.products.get_mut(&product.id) {
            Some(mut existing) => {
                *existing = product.clone();
                Ok(())
            }
            None => Err(DomainError::not_found(format!(
                "Unable to find product with ID: {}.",
                product.id
            ))),
        }
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        self.products
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found(format!("Unable to find product with ID: {}.", id)))
    }
}

// ── Orders ──────────────────────────────────────────────────────

#[async_trait]
impl OrderRepository for InMemoryRepositoryProvider {
    async fn place(&self, new_order: NewOrder) -> DomainResult<Order> {
        let _guard = self.lock_stock()?;

        if new_order.single_open_order
            && self
                .orders
                .iter()
                .any(|o| o.buyer_id == new_order.buyer_id && o.state == OrderState::Preparing)
        {
            return Err(DomainError::validation("You can have only 1 order at time."));
        }

        // Validate every line before touching stock
        let mut wanted: HashMap<i32, i64> = HashMap::new();
        for item in &new_order.items {
            *wanted.entry(item.product_id).or_insert(0) += i64::from(item.product_amount);
        }
        for (product_id, amount) in &wanted {
            let product = self
                .products
                .get(product_id)
                .ok_or_else(|| DomainError::not_found("Product is non existent."))?;
            if i64::from(product.amount) < *amount {
                return Err(DomainError::validation(format!(
                    "Currently there is only {} {}s in stock.",
                    product.amount, product.name
                )));
            }
        }
        for (product_id, amount) in &wanted {
            if let Some(mut product) = self.products.get_mut(product_id) {
                // Bounded by the stock check above
                product.amount -= *amount as i32;
            }
        }

        let id = self.order_counter.fetch_add(1, Ordering::SeqCst);
        let items = new_order
            .items
            .into_iter()
            .map(|i| OrderItem {
                id: self.item_counter.fetch_add(1, Ordering::SeqCst),
                order_id: id,
                product_id: i.product_id,
                name: i.name,
                current_price: i.current_price,
                product_amount: i.product_amount,
            })
            .collect();

        let order = Order {
            id,
            buyer_id: new_order.buyer_id,
            comment: new_order.comment,
            delivery_address: new_order.delivery_address,
            total_price: new_order.total_price,
            state: OrderState::Preparing,
            is_accepted: false,
            start_time: new_order.start_time,
            delivery_time: None,
            items,
        };
        self.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn cancel(&self, order_id: i32) -> DomainResult<()> {
        let _guard = self.lock_stock()?;

        let items = {
            let mut order = self
                .orders
                .get_mut(&order_id)
                .ok_or_else(|| DomainError::not_found("Order doesn't exist within this user."))?;
            if order.state != OrderState::Preparing {
                return Err(DomainError::validation("Order is already canceled."));
            }
            order.state = OrderState::Canceled;
            order.items.clone()
        };

        for item in items {
            if let Some(mut product) = self.products.get_mut(&item.product_id) {
                product.amount += item.product_amount;
            }
        }
        Ok(())
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Order>> {
        Ok(self.orders.get(&id).map(|o| o.clone()))
    }

    async fn find_by_buyer(&self, buyer_id: i32) -> DomainResult<Vec<Order>> {
        Ok(Self::sorted(&self.orders, |o| o.buyer_id == buyer_id))
    }

    async fn find_by_state(&self, state: OrderState) -> DomainResult<Vec<Order>> {
        Ok(Self::sorted(&self.orders, |o| o.state == state))
    }

    async fn find_all(&self) -> DomainResult<Vec<Order>> {
        Ok(Self::sorted(&self.orders, |_| true))
    }

    async fn has_preparing_order(&self, buyer_id: i32) -> DomainResult<bool> {
        Ok(self
            .orders
            .iter()
            .any(|o| o.buyer_id == buyer_id && o.state == OrderState::Preparing))
    }

    async fn accept(
        &self,
        order_id: i32,
        start_time: DateTime<Utc>,
        delivery_time: DateTime<Utc>,
    ) -> DomainResult<()> {
        match self.orders.get_mut(&order_id) {
            Some(mut order) if order.state == OrderState::Preparing && !order.is_accepted => {
                order.is_accepted = true;
                order.start_time = start_time;
                order.delivery_time = Some(delivery_time);
                Ok(())
            }
            _ => Err(order_not_acceptable(order_id)),
        }
    }

    async fn mark_delivered(&self, now: DateTime<Utc>) -> DomainResult<u64> {
        let mut changed = 0;
        for mut order in self.orders.iter_mut() {
            if order.is_due_for_delivery(now) {
                order.state = OrderState::Delivered;
                changed += 1;
            }
        }
        Ok(changed)
    }
}
