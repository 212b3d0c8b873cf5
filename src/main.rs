//! Marketplace service
//!
//! ```sh
//! # Run with default config (~/.config/marketplace/config.toml)
//! marketplace-service
//!
//! # Custom config path
//! marketplace-service --config /etc/marketplace/config.toml
//!
//! # Validate config without starting
//! marketplace-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use marketplace::config::{default_config_path, AppConfig};
use marketplace::server::{init_tracing, ServerHandle, ServerOptions};

/// REST backend of an online marketplace for buyers, sellers and administrators.
#[derive(Parser, Debug)]
#[command(
    name = "marketplace-service",
    version,
    about = "Online marketplace REST API",
    long_about = "Marketplace REST API with buyer, seller and admin roles.\n\n\
                  Default config: ~/.config/marketplace/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "MARKETPLACE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Skip creating the default admin user.
    #[arg(long)]
    no_admin: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(mut cfg) => {
            if let Some(ref level) = cli.log_level {
                cfg.logging.level = level.clone();
            }
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            if cli.check {
                eprintln!("❌ Invalid configuration in {}: {}", config_path.display(), e);
                std::process::exit(1);
            }
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
            AppConfig::default()
        }
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.api_port {
        info!("CLI override: api_port = {}", port);
        config.server.api_port = port;
    }

    if cli.check {
        println!("✅ Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}:{}", config.server.api_host, config.server.api_port);
        println!("   Database    : {}", config.database.url);
        println!("   Log level   : {}", config.logging.level);
        println!("   Mail        : {}", if config.mail.enabled { "smtp" } else { "log only" });
        println!(
            "   Google      : {}",
            if config.google.client_id.is_some() { "enabled" } else { "disabled" }
        );
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        create_default_admin: !cli.no_admin,
    })
    .await?;

    handle.install_signal_handler();
    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
