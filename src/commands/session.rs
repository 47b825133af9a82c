//! Login and session lifecycle commands.

use clap::Args;
use serde::Serialize;

use warden_auth::AccessService;
use warden_core::error::AppError;
use warden_core::types::PrincipalId;

use crate::output::{self, OutputFormat};

/// Arguments for `login`
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username or email
    pub handle: String,
    /// Password
    #[arg(long)]
    pub password: String,
}

/// Arguments for `authorize`
#[derive(Debug, Args)]
pub struct AuthorizeArgs {
    /// Access token
    pub token: String,
}

/// Arguments for `refresh`
#[derive(Debug, Args)]
pub struct RefreshArgs {
    /// Refresh token
    pub token: String,
}

/// Arguments for `logout`
#[derive(Debug, Args)]
pub struct LogoutArgs {
    /// Current access token
    #[arg(long)]
    pub access: String,
    /// Current refresh token
    #[arg(long)]
    pub refresh: String,
}

#[derive(Debug, Serialize)]
struct AuthorizedPrincipal {
    id: PrincipalId,
    username: String,
    email: String,
}

/// Execute `login`
pub async fn login(
    service: &AccessService,
    args: &LoginArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let outcome = service.login(&args.handle, &args.password).await?;
    output::print_item(&outcome, format);
    Ok(())
}

/// Execute `authorize`
pub async fn authorize(
    service: &AccessService,
    args: &AuthorizeArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let header = format!("Bearer {}", args.token);
    let principal = service.authorize(Some(&header)).await?;
    output::print_item(
        &AuthorizedPrincipal {
            id: principal.id,
            username: principal.username,
            email: principal.email,
        },
        format,
    );
    Ok(())
}

/// Execute `refresh`
pub async fn refresh(
    service: &AccessService,
    args: &RefreshArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let access = service.refresh(&args.token).await?;
    output::print_item(&access, format);
    Ok(())
}

/// Execute `logout`
pub async fn logout(service: &AccessService, args: &LogoutArgs) -> Result<(), AppError> {
    service.logout(&args.access, &args.refresh).await?;
    output::print_success("Session revoked");
    Ok(())
}
