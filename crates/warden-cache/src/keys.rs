//! Cache key builders for all Warden cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses. Keys follow the
//! `<purpose>:<principal-handle-or-token>` shape shared with other
//! services reading the same cache.

use warden_core::types::{PrincipalId, TokenKind};

// ── Rate counters ──────────────────────────────────────────

/// Failed-login counter for a principal's canonical handle.
pub fn login_failures(handle: &str) -> String {
    format!("login_failures:{handle}")
}

/// API call counter for a principal.
pub fn api_calls(id: PrincipalId) -> String {
    format!("api_calls:{id}")
}

// ── Token keys ─────────────────────────────────────────────

/// The single currently-valid token of `kind` for a handle.
pub fn token(kind: TokenKind, handle: &str) -> String {
    match kind {
        TokenKind::Access => access_token(handle),
        TokenKind::Refresh => refresh_token(handle),
    }
}

/// The currently-valid access token for a handle.
pub fn access_token(handle: &str) -> String {
    format!("access_token:{handle}")
}

/// The currently-valid refresh token for a handle.
pub fn refresh_token(handle: &str) -> String {
    format!("refresh_token:{handle}")
}

// ── Password reset keys ────────────────────────────────────

/// Maps a reset token to the handle it was issued for.
pub fn reset_token(token: &str) -> String {
    format!("reset_token:{token}")
}

/// Marker holding the active reset token of a handle.
pub fn reset_active(handle: &str) -> String {
    format!("reset:active:{handle}")
}

/// Invalid-submission counter of the active reset.
pub fn reset_invalid(handle: &str) -> String {
    format!("reset:invalid:{handle}")
}

// ── Access keys ────────────────────────────────────────────

/// Cached effective permission set of a principal.
pub fn permissions(id: PrincipalId) -> String {
    format!("permissions:{id}")
}

/// Confirmed-existence marker for a handle.
pub fn handle_exists(handle: &str) -> String {
    format!("handle:{handle}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_shapes() {
        assert_eq!(login_failures("alice"), "login_failures:alice");
        assert_eq!(api_calls(PrincipalId(9)), "api_calls:9");
        assert_eq!(token(TokenKind::Access, "alice"), "access_token:alice");
        assert_eq!(token(TokenKind::Refresh, "alice"), "refresh_token:alice");
        assert_eq!(reset_active("alice"), "reset:active:alice");
        assert_eq!(reset_invalid("alice"), "reset:invalid:alice");
        assert_eq!(permissions(PrincipalId(3)), "permissions:3");
    }
}
