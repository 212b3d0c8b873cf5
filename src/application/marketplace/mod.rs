//! Marketplace use cases by role

mod admin_service;
mod buyer_service;
mod delivery_tracker;
mod seller_service;

pub use admin_service::AdminService;
pub use buyer_service::{BuyerService, OrderRequest};
pub use delivery_tracker::{refresh_deliveries, start_delivery_task};
pub use seller_service::{ProductForm, SellerService};
