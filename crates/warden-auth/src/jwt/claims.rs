//! JWT claims structure used in access and refresh tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::types::{PrincipalId, TokenKind};

/// JWT claims payload embedded in every bearer token.
///
/// Decoding is typed: a subject that is not an integer fails with
/// [`TokenError::ClaimDecode`](super::TokenError::ClaimDecode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal ID.
    pub sub: i64,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token ID; two tokens issued in the same second still differ.
    pub jti: String,
    /// Token kind: "access" or "refresh".
    pub typ: TokenKind,
}

impl Claims {
    /// Returns the principal ID from the subject claim.
    pub fn principal_id(&self) -> PrincipalId {
        PrincipalId(self.sub)
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}
