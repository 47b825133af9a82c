//! `Authorization: Bearer <token>` header parsing.

use warden_core::error::AppError;

const SCHEME: &str = "Bearer";

/// Extract the token from an `Authorization` header value.
///
/// A missing header, another scheme, or an empty token is an
/// authentication failure.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AppError> {
    let header = header
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| AppError::authentication("Missing authorization header"))?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or_else(|| AppError::authentication("Invalid authorization header"))?;

    if !scheme.eq_ignore_ascii_case(SCHEME) {
        return Err(AppError::authentication("Unsupported authorization scheme"));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::authentication("Empty bearer token"));
    }
    Ok(token)
}
