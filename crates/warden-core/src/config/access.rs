//! Rate limiting, permission cache and existence index configuration.

use serde::{Deserialize, Serialize};

/// Per-principal API rate limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Calls allowed per window.
    #[serde(default = "default_api_max")]
    pub api_max_requests: i64,
    /// Window length in seconds, started by the first call.
    #[serde(default = "default_api_window")]
    pub api_window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            api_max_requests: default_api_max(),
            api_window_seconds: default_api_window(),
        }
    }
}

/// Permission set cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionConfig {
    /// How long a resolved permission set stays cached, in seconds.
    #[serde(default = "default_permission_ttl")]
    pub cache_ttl_seconds: u64,
}

impl Default for PermissionConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: default_permission_ttl(),
        }
    }
}

/// Handle existence index (probabilistic filter + confirming cache).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistenceConfig {
    /// Number of handles the filter is sized for.
    #[serde(default = "default_expected_items")]
    pub expected_items: u64,
    /// Target false-positive rate at `expected_items`.
    #[serde(default = "default_fpr")]
    pub false_positive_rate: f64,
    /// TTL of a confirming cache entry, in seconds.
    #[serde(default = "default_existence_ttl")]
    pub cache_ttl_seconds: u64,
    /// Handles fetched per page during warm-up.
    #[serde(default = "default_batch")]
    pub warmup_batch_size: u32,
}

impl Default for ExistenceConfig {
    fn default() -> Self {
        Self {
            expected_items: default_expected_items(),
            false_positive_rate: default_fpr(),
            cache_ttl_seconds: default_existence_ttl(),
            warmup_batch_size: default_batch(),
        }
    }
}

fn default_api_max() -> i64 {
    100
}

fn default_api_window() -> u64 {
    120
}

fn default_permission_ttl() -> u64 {
    100
}

fn default_expected_items() -> u64 {
    1_000_000
}

fn default_fpr() -> f64 {
    0.01
}

fn default_existence_ttl() -> u64 {
    600
}

fn default_batch() -> u32 {
    1000
}
