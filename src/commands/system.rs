//! Health and migration commands.

use warden_auth::AccessService;
use warden_core::config::AppConfig;
use warden_core::error::AppError;
use warden_database::DatabasePool;
use warden_database::migration::run_migrations;

use crate::output::{self, OutputFormat};

/// Execute `health`
pub async fn health(service: &AccessService, format: OutputFormat) -> Result<(), AppError> {
    let status = service.health().await;
    output::print_item(&status, format);
    if status.is_healthy() {
        Ok(())
    } else {
        Err(AppError::dependency("One or more dependencies are unreachable"))
    }
}

/// Execute `migrate`
pub async fn migrate(config: &AppConfig) -> Result<(), AppError> {
    let db = DatabasePool::connect(&config.database).await?;
    run_migrations(db.pool()).await?;
    db.close().await;
    output::print_success("Migrations applied");
    Ok(())
}
