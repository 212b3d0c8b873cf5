//! Administrator use cases: seller verification and oversight

use std::sync::Arc;

use tracing::{error, info, warn};

use super::delivery_tracker::refresh_deliveries;
use crate::application::ports::Mailer;
use crate::domain::{
    DomainError, DomainResult, Order, RepositoryProvider, User, UserType, VerificationState,
};

pub struct AdminService {
    repos: Arc<dyn RepositoryProvider>,
    mailer: Arc<dyn Mailer>,
}

impl AdminService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, mailer: Arc<dyn Mailer>) -> Self {
        Self { repos, mailer }
    }

    pub async fn get_all_verified(&self) -> DomainResult<Vec<User>> {
        self.sellers_in(VerificationState::Accepted).await
    }

    pub async fn get_all_unverified(&self) -> DomainResult<Vec<User>> {
        self.sellers_in(VerificationState::Waiting).await
    }

    pub async fn get_all_declined(&self) -> DomainResult<Vec<User>> {
        self.sellers_in(VerificationState::Denied).await
    }

    pub async fn get_all_buyers(&self) -> DomainResult<Vec<User>> {
        self.repos.users().find_by_type(UserType::Buyer).await
    }

    /// Accepts or denies a seller and notifies them by e-mail.
    pub async fn verify_user(&self, user_id: i32, is_accepted: bool) -> DomainResult<User> {
        let Some(mut user) = self.repos.users().find_by_id(user_id).await? else {
            error!(user_id, "Attempted to verify non existent user");
            return Err(DomainError::not_found(format!(
                "Unable to find user with ID: {}.",
                user_id
            )));
        };

        if !user.is_seller() {
            error!(user = %user.email, "Attempted to verify a user that is not a seller");
            return Err(DomainError::validation("Only sellers can be verified."));
        }

        user.verification_state = if is_accepted {
            VerificationState::Accepted
        } else {
            VerificationState::Denied
        };
        self.repos.users().update(&user).await?;

        let body = if is_accepted {
            "Your account is verified by administrator. You can now log in."
        } else {
            "Your account is denied by administrator."
        };
        if let Err(e) = self.mailer.send(&user.email, "Verification", body).await {
            warn!(user = %user.email, error = %e, "Failed to send verification e-mail");
        }

        info!(
            user = %user.email,
            state = user.verification_state.as_str(),
            "Seller verification changed"
        );
        Ok(user)
    }

    /// Every order in the system, in any state
    pub async fn get_all_orders(&self) -> DomainResult<Vec<Order>> {
        refresh_deliveries(self.repos.as_ref()).await?;
        self.repos.orders().find_all().await
    }

    async fn sellers_in(&self, state: VerificationState) -> DomainResult<Vec<User>> {
        self.repos.users().find_sellers_by_state(state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::marketplace::OrderRequest;
    use crate::application::test_support::{fixture, seed_product, seed_user};
    use crate::domain::order::LineRequest;
    use crate::domain::ProductCategory;

    #[tokio::test]
    async fn test_seller_lists_follow_verification() {
        let f = fixture();
        let waiting = seed_user(&f.repos, "waiting", UserType::Seller, 1980).await;
        let denied = seed_user(&f.repos, "denied", UserType::Seller, 1980).await;
        seed_user(&f.repos, "buyer", UserType::Buyer, 1990).await;

        f.admin.verify_user(denied.id, false).await.unwrap();

        let unverified = f.admin.get_all_unverified().await.unwrap();
        assert_eq!(unverified.len(), 1);
        assert_eq!(unverified[0].id, waiting.id);

        let declined = f.admin.get_all_declined().await.unwrap();
        assert_eq!(declined.len(), 1);
        assert_eq!(declined[0].id, denied.id);

        f.admin.verify_user(waiting.id, true).await.unwrap();
        let verified = f.admin.get_all_verified().await.unwrap();
        assert_eq!(verified.len(), 1);
        assert_eq!(verified[0].id, waiting.id);

        assert_eq!(f.admin.get_all_buyers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_verify_sends_mail() {
        let f = fixture();
        let seller = seed_user(&f.repos, "seller", UserType::Seller, 1980).await;

        let user = f.admin.verify_user(seller.id, true).await.unwrap();
        assert_eq!(user.verification_state, VerificationState::Accepted);

        let sent = f.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "seller@example.com");
        assert_eq!(sent[0].1, "Verification");
    }

    #[tokio::test]
    async fn test_verify_rejects_missing_and_non_sellers() {
        let f = fixture();
        let buyer = seed_user(&f.repos, "buyer", UserType::Buyer, 1990).await;

        assert!(matches!(
            f.admin.verify_user(9999, true).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            f.admin.verify_user(buyer.id, true).await,
            Err(DomainError::Validation(_))
        ));
        assert!(f.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_get_all_orders() {
        let f = fixture();
        let buyer = seed_user(&f.repos, "buyer", UserType::Buyer, 1990).await;
        let seller = seed_user(&f.repos, "seller", UserType::Seller, 1980).await;
        let p = seed_product(&f.repos, seller.id, "Bread", 200, 5, ProductCategory::Food).await;

        let order = f
            .buyer
            .create_order(
                buyer.id,
                OrderRequest {
                    items: vec![LineRequest { product_id: p.id, amount: 2 }],
                    delivery_address: "Main Street 1".to_string(),
                    comment: Some("Ring twice".to_string()),
                },
            )
            .await
            .unwrap();
        f.buyer.decline_order(buyer.id, order.id).await.unwrap();

        let all = f.admin.get_all_orders().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].items.len(), 1);
    }
}
