//! Counter/window primitive shared by login lockout and API rate limiting.
//!
//! A counter is created by its first increment, which also starts its
//! window. It only ever goes up and disappears when the window expires.
//! All atomicity comes from the cache's `INCR`; nothing is locked here.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use warden_cache::CacheManager;
use warden_core::config::{AuthConfig, RateLimitConfig};
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::CacheProvider;

/// A threshold and the window it is counted over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    /// Counts strictly greater than this are over the limit.
    pub limit: i64,
    /// Lifetime of a counter, started by its first increment.
    pub window: Duration,
}

impl RatePolicy {
    /// Failed-login policy.
    pub fn login(config: &AuthConfig) -> Self {
        Self {
            limit: config.max_failed_attempts,
            window: Duration::from_secs(config.lockout_minutes * 60),
        }
    }

    /// Per-principal API call policy.
    pub fn api(config: &RateLimitConfig) -> Self {
        Self {
            limit: config.api_max_requests,
            window: Duration::from_secs(config.api_window_seconds),
        }
    }

    /// Whether `count` exceeds this policy.
    pub fn exceeded_by(&self, count: i64) -> bool {
        count > self.limit
    }
}

/// Counter operations over the shared cache.
#[derive(Debug, Clone)]
pub struct RateGuard {
    cache: Arc<CacheManager>,
}

impl RateGuard {
    /// Create a guard over the shared cache.
    pub fn new(cache: Arc<CacheManager>) -> Self {
        Self { cache }
    }

    /// Current count for `key`; a missing counter reads as zero.
    pub async fn count(&self, key: &str) -> AppResult<i64> {
        match self.cache.get(key).await? {
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
                AppError::internal(format!("Rate counter '{key}' holds a non-integer value"))
            }),
            None => Ok(0),
        }
    }

    /// Whether the counter is already over the policy, without counting.
    pub async fn is_exceeded(&self, key: &str, policy: &RatePolicy) -> AppResult<bool> {
        Ok(policy.exceeded_by(self.count(key).await?))
    }

    /// Increment the counter, starting its window on the first hit.
    pub async fn record(&self, key: &str, policy: &RatePolicy) -> AppResult<i64> {
        let count = self.cache.incr(key).await?;
        if count == 1 {
            self.cache.expire(key, policy.window).await?;
        }
        debug!(key, count, limit = policy.limit, "Rate counter incremented");
        Ok(count)
    }

    /// Count one hit and fail with `Throttled` once the policy is exceeded.
    pub async fn hit(&self, key: &str, policy: &RatePolicy) -> AppResult<i64> {
        let count = self.record(key, policy).await?;
        if policy.exceeded_by(count) {
            return Err(AppError::throttled("Too many requests"));
        }
        Ok(count)
    }

    /// Restart the counter's window from now.
    pub async fn extend(&self, key: &str, window: Duration) -> AppResult<bool> {
        self.cache.expire(key, window).await
    }

    /// Drop the counter.
    pub async fn clear(&self, key: &str) -> AppResult<()> {
        self.cache.delete(key).await
    }
}
