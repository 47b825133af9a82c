//! Token decoding failures.

use thiserror::Error;

use warden_core::error::{AppError, ErrorKind};
use warden_core::types::TokenKind;

/// Why a presented token was rejected.
///
/// Every variant is reported to callers as `ErrorKind::Authentication`; the
/// variant itself is only logged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Not a structurally valid JWT.
    #[error("malformed token")]
    Malformed,
    /// Signature or algorithm does not verify under the server secret.
    #[error("invalid token signature")]
    InvalidSignature,
    /// The `exp` claim has passed.
    #[error("token has expired")]
    Expired,
    /// A token of the other kind was presented.
    #[error("expected {expected} token, got {found}")]
    WrongKind {
        /// Kind the operation requires.
        expected: TokenKind,
        /// Kind the token carries.
        found: TokenKind,
    },
    /// The payload does not match the typed claims (e.g. non-numeric subject).
    #[error("token claims could not be decoded: {0}")]
    ClaimDecode(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind as JwtKind;
        match err.kind() {
            JwtKind::ExpiredSignature => Self::Expired,
            JwtKind::InvalidSignature | JwtKind::InvalidAlgorithm => Self::InvalidSignature,
            JwtKind::Json(e) => Self::ClaimDecode(e.to_string()),
            JwtKind::MissingRequiredClaim(claim) => {
                Self::ClaimDecode(format!("missing claim '{claim}'"))
            }
            _ => Self::Malformed,
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::with_source(ErrorKind::Authentication, "Invalid or expired token", err)
    }
}
