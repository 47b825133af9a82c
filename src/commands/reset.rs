//! Password reset commands.

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use warden_auth::AccessService;
use warden_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for `request-reset`
#[derive(Debug, Args)]
pub struct RequestResetArgs {
    /// Registered email address
    pub email: String,
}

/// Arguments for `reset-password`
#[derive(Debug, Args)]
pub struct ResetPasswordArgs {
    /// Token from the reset link
    pub token: String,
    /// New password
    #[arg(long)]
    pub password: String,
}

/// What the operator sees; the token itself only travels in the link.
#[derive(Debug, Serialize)]
struct ResetIssued {
    username: String,
    expires_at: DateTime<Utc>,
}

/// Execute `request-reset`
pub async fn request(
    service: &AccessService,
    args: &RequestResetArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let state = service.request_reset(&args.email).await?;
    output::print_item(
        &ResetIssued {
            username: state.principal_handle,
            expires_at: state.expires_at,
        },
        format,
    );
    Ok(())
}

/// Execute `reset-password`
pub async fn consume(service: &AccessService, args: &ResetPasswordArgs) -> Result<(), AppError> {
    service.reset_password(&args.token, &args.password).await?;
    output::print_success("Password updated; all sessions must log in again");
    Ok(())
}
