//! Order aggregate

pub mod model;
pub mod pricing;
pub mod repository;

pub use model::{order_not_acceptable, NewOrder, NewOrderItem, Order, OrderItem, OrderState};
pub use pricing::{LineRequest, OrderPolicy, Quote};
pub use repository::OrderRepository;
