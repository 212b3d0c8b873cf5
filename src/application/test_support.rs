//! Shared fixtures for service tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::application::identity::{AuthService, ProfileService};
use crate::application::marketplace::{AdminService, BuyerService, SellerService};
use crate::application::ports::{ExternalIdentity, IdentityVerifier, Mailer};
use crate::domain::{
    DomainError, DomainResult, NewProduct, NewUser, OrderPolicy, Product, ProductCategory,
    RepositoryProvider, User, UserType, VerificationState,
};
use crate::infrastructure::crypto::JwtConfig;
use crate::infrastructure::storage::InMemoryRepositoryProvider;
use crate::shared::Money;

/// Keeps every message instead of sending it
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingMailer {
    /// `(to, subject, body)` of every message so far
    pub fn sent(&self) -> Vec<(String, String, String)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> DomainResult<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((to.to_string(), subject.to_string(), body.to_string()));
        }
        Ok(())
    }
}

pub struct FakeIdentityVerifier {
    identity: Option<ExternalIdentity>,
}

impl FakeIdentityVerifier {
    pub fn accepting(email: &str, given_name: &str, full_name: &str) -> Self {
        Self {
            identity: Some(ExternalIdentity {
                email: email.to_string(),
                given_name: given_name.to_string(),
                full_name: full_name.to_string(),
            }),
        }
    }

    pub fn rejecting() -> Self {
        Self { identity: None }
    }
}

#[async_trait]
impl IdentityVerifier for FakeIdentityVerifier {
    async fn verify(&self, _id_token: &str) -> DomainResult<ExternalIdentity> {
        self.identity
            .clone()
            .ok_or_else(|| DomainError::unauthorized("Invalid Google token."))
    }
}

pub struct Fixture {
    pub repos: Arc<InMemoryRepositoryProvider>,
    pub mailer: Arc<RecordingMailer>,
    pub auth: AuthService,
    pub profile: ProfileService,
    pub buyer: BuyerService,
    pub seller: SellerService,
    pub admin: AdminService,
}

impl Fixture {
    pub fn auth_with_google(&self, verifier: impl IdentityVerifier + 'static) -> AuthService {
        AuthService::new(
            self.repos.clone(),
            jwt_config(),
            self.mailer.clone(),
            Some(Arc::new(verifier)),
            18,
        )
    }
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret".to_string(),
        expiration_hours: 24,
        issuer: "marketplace".to_string(),
    }
}

pub fn fixture() -> Fixture {
    let repos = Arc::new(InMemoryRepositoryProvider::new());
    let mailer = Arc::new(RecordingMailer::default());
    let provider: Arc<dyn RepositoryProvider> = repos.clone();

    Fixture {
        auth: AuthService::new(provider.clone(), jwt_config(), mailer.clone(), None, 18),
        profile: ProfileService::new(provider.clone(), 18),
        buyer: BuyerService::new(provider.clone(), OrderPolicy::default()),
        seller: SellerService::new(provider.clone()),
        admin: AdminService::new(provider, mailer.clone()),
        repos,
        mailer,
    }
}

/// Creates `{name}@example.com` with password `password1`.
/// Sellers start out waiting for verification.
pub async fn seed_user(
    repos: &InMemoryRepositoryProvider,
    name: &str,
    user_type: UserType,
    birth_year: i32,
) -> User {
    let new_user = NewUser {
        username: name.to_string(),
        email: format!("{}@example.com", name),
        password_hash: bcrypt::hash("password1", 4).unwrap(),
        full_name: format!("{} Tester", name),
        birth_date: NaiveDate::from_ymd_opt(birth_year, 1, 1).unwrap(),
        address: "Main Street 1".to_string(),
        user_type,
        verification_state: VerificationState::Accepted,
        has_full_access: false,
        image: None,
    }
    .with_defaults_for(user_type);

    repos.users().create(new_user).await.unwrap()
}

pub async fn seed_product(
    repos: &InMemoryRepositoryProvider,
    seller_id: i32,
    name: &str,
    price_cents: i64,
    amount: i32,
    category: ProductCategory,
) -> Product {
    repos
        .products()
        .create(NewProduct {
            name: name.to_string(),
            price: Money::from_cents(price_cents),
            amount,
            description: None,
            image: None,
            category,
            seller_id,
        })
        .await
        .unwrap()
}
