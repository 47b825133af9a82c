//! Authentication and password-reset configuration.

use serde::{Deserialize, Serialize};

/// Credential verification and token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret used to MAC bearer tokens.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token TTL in hours.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_hours: u64,
    /// Failed logins tolerated before every attempt is rejected.
    #[serde(default = "default_max_failed")]
    pub max_failed_attempts: i64,
    /// Failure window (and lockout extension) in minutes.
    #[serde(default = "default_lockout")]
    pub lockout_minutes: u64,
    /// Report an unknown handle as a bad credential instead of "not found".
    #[serde(default = "default_true")]
    pub conceal_unknown_handles: bool,
    /// Clear the failure counter after a successful login.
    #[serde(default)]
    pub reset_failures_on_success: bool,
    /// Minimum length of a new password.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Argon2id memory cost in KiB for newly hashed credentials.
    #[serde(default = "default_hash_memory")]
    pub hash_memory_kib: u32,
    /// Argon2id iteration count.
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
    /// Argon2id lanes.
    #[serde(default = "default_hash_parallelism")]
    pub hash_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_hours: default_refresh_ttl(),
            max_failed_attempts: default_max_failed(),
            lockout_minutes: default_lockout(),
            conceal_unknown_handles: true,
            reset_failures_on_success: false,
            password_min_length: default_password_min(),
            hash_memory_kib: default_hash_memory(),
            hash_iterations: default_hash_iterations(),
            hash_parallelism: default_hash_parallelism(),
        }
    }
}

/// Password reset protocol configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetConfig {
    /// Lifetime of a reset token and its companion keys, in minutes.
    #[serde(default = "default_reset_ttl")]
    pub ttl_minutes: u64,
    /// Failed submissions tolerated per reset token.
    #[serde(default = "default_max_invalid")]
    pub max_invalid_attempts: i64,
    /// Base URL of the reset page; the token is appended as `?token=`.
    #[serde(default = "default_link_base")]
    pub link_base_url: String,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_reset_ttl(),
            max_invalid_attempts: default_max_invalid(),
            link_base_url: default_link_base(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    4
}

fn default_max_failed() -> i64 {
    5
}

fn default_lockout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_password_min() -> usize {
    8
}

fn default_hash_memory() -> u32 {
    19 * 1024
}

fn default_hash_iterations() -> u32 {
    2
}

fn default_hash_parallelism() -> u32 {
    1
}

fn default_reset_ttl() -> u64 {
    10
}

fn default_max_invalid() -> i64 {
    1
}

fn default_link_base() -> String {
    "http://localhost:8083/api/v1/auth/reset-password".to_string()
}
