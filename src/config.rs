//! Application configuration
//!
//! Loaded from a TOML file; every section and field falls back to its
//! default, so an absent or partial file is valid.
//!
//! ```toml
//! [server]
//! api_host = "0.0.0.0"
//! api_port = 8080
//!
//! [marketplace]
//! delivery_fee = 2.99
//! order_total_limit = 500.0
//!
//! [google]
//! client_id = "1234.apps.googleusercontent.com"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::OrderPolicy;
use crate::infrastructure::crypto::JwtConfig;
use crate::infrastructure::database::DatabaseConfig;
use crate::shared::Money;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// `~/.config/marketplace/config.toml`, or `./config.toml` when there is no
/// config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("marketplace").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub security: SecurityConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
    pub marketplace: MarketplaceConfig,
    pub google: GoogleConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("security.jwt_secret is empty".into()));
        }
        if self.security.jwt_expiration_hours <= 0 {
            return Err(ConfigError::Invalid(
                "security.jwt_expiration_hours must be positive".into(),
            ));
        }
        self.marketplace.order_policy()?;
        if self.mail.enabled && self.mail.smtp_host.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "mail.smtp_host is required when mail is enabled".into(),
            ));
        }
        Ok(())
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.security.jwt_secret.clone(),
            expiration_hours: self.security.jwt_expiration_hours,
            issuer: self.security.jwt_issuer.clone(),
        }
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for background work on shutdown
    pub shutdown_timeout: u64,
    /// Request body cap, covers multipart image uploads
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        let db = DatabaseConfig::default();
        Self {
            url: db.url,
            max_connections: db.max_connections,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub jwt_issuer: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        let jwt = JwtConfig::default();
        Self {
            jwt_secret: jwt.secret,
            jwt_expiration_hours: jwt.expiration_hours,
            jwt_issuer: jwt.issuer,
        }
    }
}

/// Account seeded on startup when no admin exists
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            email: "admin@marketplace.local".to_string(),
            password: "admin123".to_string(),
            full_name: "Administrator".to_string(),
            address: "Marketplace HQ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceConfig {
    /// Charged once per distinct seller in an order
    pub delivery_fee: f64,
    /// Exclusive order total cap for accounts without full access
    pub order_total_limit: f64,
    pub cancellation_window_minutes: i64,
    pub adult_age: u32,
    pub delivery_check_interval_secs: u64,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            delivery_fee: 2.99,
            order_total_limit: 500.0,
            cancellation_window_minutes: 60,
            adult_age: 18,
            delivery_check_interval_secs: 30,
        }
    }
}

impl MarketplaceConfig {
    pub fn order_policy(&self) -> Result<OrderPolicy, ConfigError> {
        let money = |name: &str, value: f64| {
            Money::from_f64(value)
                .filter(|m| m.cents() >= 0)
                .ok_or_else(|| ConfigError::Invalid(format!("marketplace.{} is invalid", name)))
        };
        if self.cancellation_window_minutes < 0 {
            return Err(ConfigError::Invalid(
                "marketplace.cancellation_window_minutes must not be negative".into(),
            ));
        }

        Ok(OrderPolicy {
            delivery_fee: money("delivery_fee", self.delivery_fee)?,
            order_total_limit: money("order_total_limit", self.order_total_limit)?,
            cancellation_window: chrono::Duration::minutes(self.cancellation_window_minutes),
            adult_age: self.adult_age,
        })
    }
}

/// Google sign-in is disabled unless `client_id` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// When off, messages are only logged
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: "Marketplace <no-reply@marketplace.local>".to_string(),
        }
    }
}
