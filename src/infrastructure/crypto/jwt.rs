//! JWT Token handling

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{User, UserType};

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: i64,
    /// Issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "super-secret-key-change-in-production".to_string()),
            expiration_hours: 24,
            issuer: "marketplace".to_string(),
        }
    }
}

/// JWT TokenClaims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    pub email: String,
    /// `Admin`, `Buyer` or `Seller`
    pub role: String,
    pub has_full_access: bool,
    pub is_adult: bool,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl TokenClaims {
    pub fn for_user(user: &User, is_adult: bool, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(config.expiration_hours);

        Self {
            sub: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.user_type.as_str().to_string(),
            has_full_access: user.has_full_access,
            is_adult,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }

    pub fn user_type(&self) -> Option<UserType> {
        UserType::from_str(&self.role)
    }

    /// Numeric user id carried in `sub`
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// Create a signed JWT token from claims
pub fn create_token(
    claims: &TokenClaims,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify and decode a JWT token
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VerificationState;
    use chrono::NaiveDate;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 1,
            issuer: "marketplace-test".to_string(),
        }
    }

    fn user() -> User {
        User {
            id: 42,
            username: "jane".to_string(),
            email: "jane@example.com".to_string(),
            password_hash: String::new(),
            full_name: "Jane Doe".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            address: "Main Street 1".to_string(),
            user_type: UserType::Seller,
            verification_state: VerificationState::Accepted,
            has_full_access: true,
            image: None,
            registration_time: Utc::now(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let config = config();
        let claims = TokenClaims::for_user(&user(), true, &config);
        let token = create_token(&claims, &config).unwrap();

        let decoded = verify_token(&token, &config).unwrap();
        assert_eq!(decoded.user_id(), Some(42));
        assert_eq!(decoded.user_type(), Some(UserType::Seller));
        assert_eq!(decoded.email, "jane@example.com");
        assert!(decoded.has_full_access);
        assert!(decoded.is_adult);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = config();
        let token = create_token(&TokenClaims::for_user(&user(), true, &config), &config).unwrap();

        let other = JwtConfig {
            secret: "other".to_string(),
            ..config
        };
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let config = config();
        let token = create_token(&TokenClaims::for_user(&user(), true, &config), &config).unwrap();

        let other = JwtConfig {
            issuer: "someone-else".to_string(),
            ..config
        };
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = config();
        let mut claims = TokenClaims::for_user(&user(), true, &config);
        claims.exp = Utc::now().timestamp() - 3600;
        let token = create_token(&claims, &config).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }
}
