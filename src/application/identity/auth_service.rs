//! Authentication and registration
//!
//! HTTP handlers stay thin and delegate here.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{error, info, warn};

use crate::application::ports::{IdentityVerifier, Mailer};
use crate::domain::{
    DomainError, DomainResult, NewUser, RepositoryProvider, User, UserType, VerificationState,
};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig, TokenClaims};
use crate::infrastructure::crypto::password::{hash_password, random_password, verify_password};

/// Issued after a successful login
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub address: String,
    pub user_type: UserType,
}

pub struct AuthService {
    repos: Arc<dyn RepositoryProvider>,
    jwt_config: JwtConfig,
    mailer: Arc<dyn Mailer>,
    identity_verifier: Option<Arc<dyn IdentityVerifier>>,
    adult_age: u32,
}

impl AuthService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        jwt_config: JwtConfig,
        mailer: Arc<dyn Mailer>,
        identity_verifier: Option<Arc<dyn IdentityVerifier>>,
        adult_age: u32,
    ) -> Self {
        Self {
            repos,
            jwt_config,
            mailer,
            identity_verifier,
            adult_age,
        }
    }

    // ── Authentication ──────────────────────────────────────────

    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthToken> {
        let Some(user) = self.repos.users().find_by_email(email).await? else {
            error!(user = %email, "Attempted login with not registered email");
            return Err(DomainError::not_found(format!(
                "User with email: {} could not be found.",
                email
            )));
        };

        if !verify_password(password, &user.password_hash).unwrap_or(false) {
            error!(user = %email, "Attempted login with incorrect password");
            return Err(DomainError::validation("Invalid Password"));
        }

        if user.is_seller() {
            match user.verification_state {
                VerificationState::Denied => {
                    error!(user = %email, "Denied seller attempted login");
                    return Err(DomainError::validation(
                        "You are denied by administrator as a seller!",
                    ));
                }
                VerificationState::Waiting => {
                    error!(user = %email, "Waiting seller attempted login");
                    return Err(DomainError::validation(
                        "You are still not accepted by administrator. Please wait!",
                    ));
                }
                VerificationState::Accepted => {}
            }
        }

        info!(user = %email, role = user.user_type.as_str(), "User logged in");
        self.issue_token(user)
    }

    // ── Registration ────────────────────────────────────────────

    pub async fn register(&self, reg: Registration) -> DomainResult<User> {
        let users = self.repos.users();

        if users.find_by_email(&reg.email).await?.is_some() {
            error!(user = %reg.email, "Attempted register with existing email address");
            return Err(DomainError::validation(
                "User with this email is already registered",
            ));
        }
        if users.find_by_username(&reg.username).await?.is_some() {
            error!(user = %reg.email, "Attempted register with existing username");
            return Err(DomainError::validation(
                "User with this username is already registered",
            ));
        }
        if reg.password != reg.confirm_password {
            error!(user = %reg.email, "Failed to confirm password");
            return Err(DomainError::validation(
                "Password are not matching. Please try again",
            ));
        }

        match reg.user_type {
            UserType::Admin => {
                warn!(user = %reg.email, "Tried to register as Admin");
                return Err(DomainError::unauthorized("Admin can't be registered!"));
            }
            UserType::Seller => {
                let today = Utc::now().date_naive();
                if !crate::domain::user::is_adult(reg.birth_date, today, self.adult_age) {
                    error!(user = %reg.email, "Attempted underage register as a seller");
                    return Err(DomainError::validation(format!(
                        "You have to be {} years old to register as seller!",
                        self.adult_age
                    )));
                }
            }
            UserType::Buyer => {}
        }

        let password_hash = hash_password(&reg.password)
            .map_err(|e| DomainError::Internal(format!("Failed to hash password: {}", e)))?;

        let user = users
            .create(
                NewUser {
                    username: reg.username,
                    email: reg.email,
                    password_hash,
                    full_name: reg.full_name,
                    birth_date: reg.birth_date,
                    address: reg.address,
                    user_type: reg.user_type,
                    verification_state: VerificationState::Accepted,
                    has_full_access: false,
                    image: None,
                }
                .with_defaults_for(reg.user_type),
            )
            .await?;

        if user.is_seller() {
            self.notify(
                &user.email,
                "Verification",
                "Your account is successfully registered and is currently waiting for administrator to approve",
            )
            .await;
        }

        metrics::counter!("marketplace_users_registered_total", "role" => user.user_type.as_str())
            .increment(1);
        info!(user = %user.email, role = user.user_type.as_str(), "User registered");
        Ok(user)
    }

    /// Signs in with a Google ID token, creating a buyer account on first use.
    pub async fn register_via_google(&self, id_token: &str) -> DomainResult<AuthToken> {
        let Some(verifier) = &self.identity_verifier else {
            warn!("Google sign-in attempted but no client id is configured");
            return Err(DomainError::unauthorized("Google sign-in is not enabled."));
        };

        let identity = verifier.verify(id_token).await?;
        let users = self.repos.users();

        if let Some(user) = users.find_by_email(&identity.email).await? {
            info!(user = %user.email, "Existing user signed in with Google");
            return self.issue_token(user);
        }

        let username = self.free_username(&format!("{}123", identity.given_name)).await?;
        let password_hash = hash_password(&random_password())
            .map_err(|e| DomainError::Internal(format!("Failed to hash password: {}", e)))?;

        let user = users
            .create(
                NewUser {
                    username,
                    email: identity.email,
                    password_hash,
                    full_name: identity.full_name,
                    birth_date: NaiveDate::from_ymd_opt(2005, 1, 1)
                        .ok_or_else(|| DomainError::Internal("invalid default birth date".into()))?,
                    address: "Default Address".to_string(),
                    user_type: UserType::Buyer,
                    verification_state: VerificationState::Accepted,
                    has_full_access: false,
                    image: None,
                }
                .with_defaults_for(UserType::Buyer),
            )
            .await?;

        metrics::counter!("marketplace_users_registered_total", "role" => "Buyer").increment(1);
        info!(user = %user.email, "User registered with Google");
        self.issue_token(user)
    }

    // ── Helpers ─────────────────────────────────────────────────

    fn issue_token(&self, user: User) -> DomainResult<AuthToken> {
        let is_adult = user.is_adult(Utc::now().date_naive(), self.adult_age);
        let claims = TokenClaims::for_user(&user, is_adult, &self.jwt_config);
        let token = create_token(&claims, &self.jwt_config)
            .map_err(|e| DomainError::Internal(format!("Failed to create token: {}", e)))?;

        Ok(AuthToken {
            token,
            expires_in: self.jwt_config.expiration_hours * 3600,
            user,
        })
    }

    /// `base`, or `base` with the first free numeric suffix.
    async fn free_username(&self, base: &str) -> DomainResult<String> {
        let users = self.repos.users();
        if users.find_by_username(base).await?.is_none() {
            return Ok(base.to_string());
        }
        for n in 1..1000 {
            let candidate = format!("{}{}", base, n);
            if users.find_by_username(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }
        Err(DomainError::validation(
            "User with this username is already registered",
        ))
    }

    async fn notify(&self, to: &str, subject: &str, body: &str) {
        if let Err(e) = self.mailer.send(to, subject, body).await {
            warn!(user = %to, error = %e, "Failed to send notification e-mail");
        }
    }
}
