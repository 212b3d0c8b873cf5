//! Product aggregate

pub mod model;
pub mod repository;

pub use model::{NewProduct, Product, ProductCategory, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH, MAX_PRICE};
pub use repository::ProductRepository;
