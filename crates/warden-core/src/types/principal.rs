//! The principal (user) identity record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::PrincipalId;

/// An identity record owned by the durable store.
///
/// This subsystem only reads principals, except for replacing
/// `password_hash` at the end of a password reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Primary key.
    pub id: PrincipalId,
    /// Canonical handle (username). Cache keys are derived from it.
    pub username: String,
    /// Registered email; also accepted as a login handle.
    pub email: String,
    /// Stored credential representation (Argon2id PHC string).
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the principal was created.
    pub created_at: DateTime<Utc>,
}

impl Principal {
    /// Returns `true` when `handle` names this principal by username or email.
    pub fn matches_handle(&self, handle: &str) -> bool {
        self.username == handle || self.email.eq_ignore_ascii_case(handle)
    }
}
