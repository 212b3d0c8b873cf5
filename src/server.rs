//! Marketplace server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: database init, migrations,
//! default admin, the delivery task, the REST API, metrics and graceful
//! shutdown.

use std::sync::{Arc, OnceLock};

use chrono::NaiveDate;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::{
    start_delivery_task, AdminService, AuthService, BuyerService, IdentityVerifier, Mailer,
    ProfileService, SellerService,
};
use crate::config::{AdminConfig, AppConfig};
use crate::domain::{
    DomainError, DomainResult, NewUser, RepositoryProvider, User, UserType, VerificationState,
};
use crate::infrastructure::crypto::hash_password;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{
    init_database, GoogleTokenVerifier, LogMailer, SeaOrmRepositoryProvider, SmtpMailer,
};
use crate::interfaces::http::{create_api_router, ApiContext};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the marketplace service.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Create the configured admin if no admin exists (default: true).
    pub create_default_admin: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            create_default_admin: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running marketplace service.
///
/// ```rust,no_run
/// use marketplace::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub repos: Arc<dyn RepositoryProvider>,
    pub config: AppConfig,
    pub api_port: u16,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: JoinHandle<()>,
    delivery_task: JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        info!("Starting marketplace service...");

        // The global recorder can only be installed once per process.
        static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
        let prometheus = match PROM_HANDLE.get() {
            Some(handle) => handle.clone(),
            None => {
                let handle = PrometheusBuilder::new().install_recorder()?;
                info!("📊 Prometheus metrics recorder installed");
                PROM_HANDLE.get_or_init(|| handle).clone()
            }
        };

        // ── Database ───────────────────────────────────────────
        let db_config = app_cfg.database_config();
        info!("Database: {}", db_config.url);
        let db = init_database(&db_config).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

        if opts.create_default_admin {
            match create_default_admin(repos.as_ref(), &app_cfg.admin).await {
                Ok(Some(admin)) => {
                    info!("Default admin created: {}", admin.email);
                    info!("⚠️  Please change the admin password immediately!");
                }
                Ok(None) => {}
                Err(e) => error!("Failed to create default admin: {}", e),
            }
        }

        // ── Services ───────────────────────────────────────────
        let jwt_config = app_cfg.jwt_config();
        let policy = app_cfg.marketplace.order_policy()?;
        let adult_age = app_cfg.marketplace.adult_age;

        let mailer: Arc<dyn Mailer> = if app_cfg.mail.enabled {
            info!(host = %app_cfg.mail.smtp_host, "📧 SMTP mail enabled");
            Arc::new(SmtpMailer::new(&app_cfg.mail)?)
        } else {
            info!("📧 Mail disabled, messages are only logged");
            Arc::new(LogMailer)
        };

        let identity_verifier: Option<Arc<dyn IdentityVerifier>> =
            match app_cfg.google.client_id.as_deref() {
                Some(client_id) if !client_id.trim().is_empty() => {
                    info!("Google sign-in enabled");
                    Some(Arc::new(GoogleTokenVerifier::new(client_id)))
                }
                _ => None,
            };

        let ctx = ApiContext {
            repos: repos.clone(),
            auth_service: Arc::new(AuthService::new(
                repos.clone(),
                jwt_config.clone(),
                mailer.clone(),
                identity_verifier,
                adult_age,
            )),
            profile_service: Arc::new(ProfileService::new(repos.clone(), adult_age)),
            buyer_service: Arc::new(BuyerService::new(repos.clone(), policy)),
            seller_service: Arc::new(SellerService::new(repos.clone())),
            admin_service: Arc::new(AdminService::new(repos.clone(), mailer)),
            jwt_config,
            prometheus,
            max_upload_bytes: app_cfg.server.max_upload_bytes,
        };

        // ── Shutdown coordinator ───────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        // ── Background tasks ───────────────────────────────────
        let delivery_task = start_delivery_task(
            repos.clone(),
            shutdown_signal.clone(),
            app_cfg.marketplace.delivery_check_interval_secs,
        );

        // ── REST API server ────────────────────────────────────
        let api_port = app_cfg.server.api_port;
        let api_addr = format!("{}:{}", app_cfg.server.api_host, api_port);
        let listener = tokio::net::TcpListener::bind(&api_addr).await?;
        info!("REST API server listening on http://{}", api_addr);
        info!("Swagger UI available at http://{}/docs/", api_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(listener, create_api_router(ctx)).with_graceful_shutdown(
            async move {
                api_shutdown.wait().await;
                info!("🛑 REST API server received shutdown signal");
            },
        );

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        info!("🚀 Marketplace service started.");

        Ok(Self {
            repos,
            config: app_cfg,
            api_port,
            db,
            shutdown,
            api_task,
            delivery_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown without waiting.
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the server to stop after shutdown has been triggered.
    pub async fn wait(self) {
        info!("⏳ Waiting for server tasks to complete...");

        let api_task = self.api_task;
        let delivery_task = self.delivery_task;
        let finished = self
            .shutdown
            .shutdown_with_cleanup(|| async move {
                match api_task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!("REST API server task panicked: {}", e),
                }
                if let Err(e) = delivery_task.await {
                    error!("Delivery task panicked: {}", e);
                }
            })
            .await;
        if !finished {
            warn!("Server tasks did not stop in time");
        }

        if let Err(e) = self.db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("✅ Database connection closed");
        }

        info!("👋 Marketplace service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down marketplace service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Creates the configured admin account unless an admin already exists.
/// Returns the new account, or `None` when seeding was skipped.
pub async fn create_default_admin(
    repos: &dyn RepositoryProvider,
    admin: &AdminConfig,
) -> DomainResult<Option<User>> {
    let users = repos.users();
    if !users.find_by_type(UserType::Admin).await?.is_empty() {
        return Ok(None);
    }

    info!("Creating default admin user...");
    let password_hash = hash_password(&admin.password)
        .map_err(|e| DomainError::Internal(format!("Failed to hash admin password: {}", e)))?;

    let new_admin = NewUser {
        username: admin.username.clone(),
        email: admin.email.clone(),
        password_hash,
        full_name: admin.full_name.clone(),
        birth_date: NaiveDate::default(),
        address: admin.address.clone(),
        user_type: UserType::Admin,
        verification_state: VerificationState::Accepted,
        has_full_access: true,
        image: None,
    }
    .with_defaults_for(UserType::Admin);

    users.create(new_admin).await.map(Some)
}

/// Initialize tracing from the application config.
///
/// Call this once at process startup, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::seed_user;
    use crate::infrastructure::crypto::verify_password;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    fn admin_config() -> AdminConfig {
        AdminConfig {
            username: "root".to_string(),
            email: "root@example.com".to_string(),
            password: "s3cret-admin".to_string(),
            ..AdminConfig::default()
        }
    }

    #[tokio::test]
    async fn test_default_admin_seeded_once() {
        let repos = InMemoryRepositoryProvider::new();

        let admin = create_default_admin(&repos, &admin_config())
            .await
            .unwrap()
            .expect("admin should be created");
        assert_eq!(admin.user_type, UserType::Admin);
        assert_eq!(admin.verification_state, VerificationState::Accepted);
        assert!(admin.has_full_access);
        assert!(verify_password("s3cret-admin", &admin.password_hash).unwrap());

        let stored = repos.users().find_by_email("root@example.com").await.unwrap();
        assert_eq!(stored.map(|u| u.id), Some(admin.id));

        assert!(create_default_admin(&repos, &admin_config())
            .await
            .unwrap()
            .is_none());
        assert_eq!(repos.users().find_by_type(UserType::Admin).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_default_admin_skipped_when_admin_exists() {
        let repos = InMemoryRepositoryProvider::new();
        let existing = seed_user(&repos, "boss", UserType::Admin, 1970).await;

        assert!(create_default_admin(&repos, &admin_config())
            .await
            .unwrap()
            .is_none());

        let admins = repos.users().find_by_type(UserType::Admin).await.unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].id, existing.id);
        assert!(repos
            .users()
            .find_by_email("root@example.com")
            .await
            .unwrap()
            .is_none());
    }
}
