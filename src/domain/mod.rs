pub mod order;
pub mod product;
pub mod repositories;
pub mod user;

pub use order::{NewOrder, NewOrderItem, Order, OrderItem, OrderPolicy, OrderRepository, OrderState};
pub use product::{NewProduct, Product, ProductCategory, ProductRepository};
pub use repositories::{DomainResult, RepositoryProvider};
pub use user::{NewUser, User, UserRepository, UserType, VerificationState};

pub use crate::shared::errors::DomainError;
