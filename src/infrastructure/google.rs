//! Google ID token verification
//!
//! Tokens are checked with Google's `tokeninfo` endpoint, which validates
//! the signature and expiry. The audience, issuer and e-mail verification
//! are checked here.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, warn};

use crate::application::ports::{ExternalIdentity, IdentityVerifier};
use crate::domain::{DomainError, DomainResult};

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Claims returned by the tokeninfo endpoint. Booleans arrive as strings.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    iss: String,
    email: Option<String>,
    email_verified: Option<String>,
    given_name: Option<String>,
    name: Option<String>,
}

impl TokenInfo {
    fn into_identity(self, client_id: &str) -> DomainResult<ExternalIdentity> {
        if self.aud != client_id {
            warn!(aud = %self.aud, "Google token issued for another client");
            return Err(invalid_token());
        }
        if !ISSUERS.contains(&self.iss.as_str()) {
            warn!(iss = %self.iss, "Google token with unexpected issuer");
            return Err(invalid_token());
        }
        if self.email_verified.as_deref() != Some("true") {
            return Err(DomainError::unauthorized("Google account e-mail is not verified."));
        }
        let email = self.email.ok_or_else(invalid_token)?;

        let given_name = self
            .given_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or("user").to_string());
        let full_name = self.name.unwrap_or_else(|| given_name.clone());

        Ok(ExternalIdentity {
            email,
            given_name,
            full_name,
        })
    }
}

fn invalid_token() -> DomainError {
    DomainError::unauthorized("Invalid Google token.")
}

pub struct GoogleTokenVerifier {
    client: reqwest::Client,
    client_id: String,
}

impl GoogleTokenVerifier {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: client_id.into(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for GoogleTokenVerifier {
    async fn verify(&self, id_token: &str) -> DomainResult<ExternalIdentity> {
        let response = self
            .client
            .get(TOKENINFO_URL)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Google tokeninfo request failed");
                DomainError::Internal(format!("Google tokeninfo request failed: {}", e))
            })?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Google rejected ID token");
            return Err(invalid_token());
        }

        let info: TokenInfo = response.json().await.map_err(|e| {
            error!(error = %e, "Unreadable Google tokeninfo response");
            invalid_token()
        })?;
        info.into_identity(&self.client_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> TokenInfo {
        TokenInfo {
            aud: "client-1".to_string(),
            iss: "https://accounts.google.com".to_string(),
            email: Some("ana@gmail.com".to_string()),
            email_verified: Some("true".to_string()),
            given_name: Some("Ana".to_string()),
            name: Some("Ana Lee".to_string()),
        }
    }

    #[test]
    fn test_valid_token_info() {
        let identity = info().into_identity("client-1").unwrap();
        assert_eq!(identity.email, "ana@gmail.com");
        assert_eq!(identity.given_name, "Ana");
        assert_eq!(identity.full_name, "Ana Lee");
    }

    #[test]
    fn test_wrong_audience_or_issuer() {
        assert!(info().into_identity("client-2").is_err());

        let mut bad_iss = info();
        bad_iss.iss = "evil.example.com".to_string();
        assert!(bad_iss.into_identity("client-1").is_err());
    }

    #[test]
    fn test_unverified_email() {
        let mut unverified = info();
        unverified.email_verified = Some("false".to_string());
        assert!(unverified.into_identity("client-1").is_err());
    }

    #[test]
    fn test_missing_names_fall_back_to_email() {
        let mut nameless = info();
        nameless.given_name = None;
        nameless.name = None;
        let identity = nameless.into_identity("client-1").unwrap();
        assert_eq!(identity.given_name, "ana");
        assert_eq!(identity.full_name, "ana");
    }

    #[test]
    fn test_parses_tokeninfo_json() {
        let parsed: TokenInfo = serde_json::from_str(
            r#"{"aud":"client-1","iss":"accounts.google.com","email":"a@b.c",
                "email_verified":"true","exp":"1700000000","sub":"42"}"#,
        )
        .unwrap();
        assert_eq!(parsed.aud, "client-1");
        assert!(parsed.given_name.is_none());
    }
}
