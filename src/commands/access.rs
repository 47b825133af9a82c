//! Permission and handle existence commands.

use clap::Args;

use warden_auth::AccessService;
use warden_core::error::AppError;
use warden_core::types::PrincipalId;

use crate::output;

/// Arguments for `check-permission`
#[derive(Debug, Args)]
pub struct CheckPermissionArgs {
    /// Principal ID
    pub principal_id: PrincipalId,
    /// Permission name, matched exactly
    pub permission: String,
}

/// Arguments for `handle-exists`
#[derive(Debug, Args)]
pub struct HandleExistsArgs {
    /// Username to look up
    pub handle: String,
}

/// Execute `check-permission`
pub async fn check_permission(
    service: &AccessService,
    args: &CheckPermissionArgs,
) -> Result<(), AppError> {
    if service
        .check_permission(args.principal_id, &args.permission)
        .await?
    {
        output::print_success(&format!("{} holds '{}'", args.principal_id, args.permission));
    } else {
        output::print_denied(&format!("{} lacks '{}'", args.principal_id, args.permission));
    }
    Ok(())
}

/// Execute `handle-exists`
///
/// The filter lives in this process only, so it is warmed before the lookup.
pub async fn handle_exists(service: &AccessService, args: &HandleExistsArgs) -> Result<(), AppError> {
    service.warm_up().await?;
    if service.handle_exists(&args.handle).await? {
        output::print_success(&format!("'{}' is taken", args.handle));
    } else {
        output::print_denied(&format!("'{}' is available", args.handle));
    }
    Ok(())
}

/// Execute `warm-up`
pub async fn warm_up(service: &AccessService) -> Result<(), AppError> {
    let scanned = service.warm_up().await?;
    output::print_success(&format!("Existence filter warmed with {scanned} usernames"));
    Ok(())
}
