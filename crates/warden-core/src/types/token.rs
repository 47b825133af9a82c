//! Bearer token kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two kinds of bearer token a principal holds at any one time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived token presented on every request.
    Access,
    /// Longer-lived token exchanged for a new access token.
    Refresh,
}

impl TokenKind {
    /// Lowercase name used in claims and cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
