//! Application layer: use cases on top of the domain repositories

pub mod identity;
pub mod marketplace;
pub mod ports;

#[cfg(test)]
pub(crate) mod test_support;

pub use identity::{AuthService, AuthToken, ProfileService, ProfileUpdate, Registration};
pub use marketplace::{
    refresh_deliveries, start_delivery_task, AdminService, BuyerService, OrderRequest,
    ProductForm, SellerService,
};
pub use ports::{ExternalIdentity, IdentityVerifier, Mailer};
