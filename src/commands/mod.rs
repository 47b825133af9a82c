//! CLI command definitions and dispatch.

pub mod access;
pub mod reset;
pub mod session;
pub mod system;

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{Span, info, warn};

use warden_auth::AccessService;
use warden_cache::CacheManager;
use warden_core::config::AppConfig;
use warden_core::error::AppError;
use warden_core::traits::PrincipalStore;
use warden_database::{DatabasePool, MemoryPrincipalStore, PgPrincipalStore};

use crate::output::OutputFormat;

/// Warden: session and access control
#[derive(Debug, Parser)]
#[command(name = "warden", version, about, long_about = None)]
pub struct Cli {
    /// Configuration overlay to apply on top of config/default (config/<env>)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Principal store backend
    #[arg(long, value_enum, default_value = "postgres")]
    pub store: StoreKind,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Where principals are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// PostgreSQL from `[database]`
    Postgres,
    /// Empty in-process store, for local smoke runs
    Memory,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Verify a credential and print a new token pair
    Login(session::LoginArgs),
    /// Validate an access token
    Authorize(session::AuthorizeArgs),
    /// Exchange a refresh token for a new access token
    Refresh(session::RefreshArgs),
    /// Revoke the current session
    Logout(session::LogoutArgs),
    /// Send a password reset link
    RequestReset(reset::RequestResetArgs),
    /// Complete a password reset
    ResetPassword(reset::ResetPasswordArgs),
    /// Check whether a principal holds a permission
    CheckPermission(access::CheckPermissionArgs),
    /// Check whether a username is taken
    HandleExists(access::HandleExistsArgs),
    /// Scan every username into the existence filter and report the count
    WarmUp,
    /// Probe the cache and the principal store
    Health,
    /// Apply pending database migrations
    Migrate,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig, root: Span) -> Result<(), AppError> {
        if let Commands::Migrate = self.command {
            return system::migrate(config).await;
        }

        let service = build_service(config, self.store, root).await?;
        match &self.command {
            Commands::Login(args) => session::login(&service, args, self.format).await,
            Commands::Authorize(args) => session::authorize(&service, args, self.format).await,
            Commands::Refresh(args) => session::refresh(&service, args, self.format).await,
            Commands::Logout(args) => session::logout(&service, args).await,
            Commands::RequestReset(args) => reset::request(&service, args, self.format).await,
            Commands::ResetPassword(args) => reset::consume(&service, args).await,
            Commands::CheckPermission(args) => access::check_permission(&service, args).await,
            Commands::HandleExists(args) => access::handle_exists(&service, args).await,
            Commands::WarmUp => access::warm_up(&service).await,
            Commands::Health => system::health(&service, self.format).await,
            Commands::Migrate => Ok(()),
        }
    }
}

/// Helper: wire the access service over the configured collaborators
pub async fn build_service(
    config: &AppConfig,
    store: StoreKind,
    root: Span,
) -> Result<AccessService, AppError> {
    let cache = Arc::new(CacheManager::new(&config.cache).await?);

    let store: Arc<dyn PrincipalStore> = match store {
        StoreKind::Postgres => {
            let db = DatabasePool::connect(&config.database).await?;
            Arc::new(PgPrincipalStore::new(db))
        }
        StoreKind::Memory => {
            warn!("Using an empty in-memory principal store");
            Arc::new(MemoryPrincipalStore::new())
        }
    };

    let notifier = warden_notify::build_publisher(&config.notifications).await?;

    info!(
        cache = %config.cache.provider,
        notifications = %config.notifications.provider,
        "Access service wired"
    );
    AccessService::new(config, cache, store, notifier, root)
}
