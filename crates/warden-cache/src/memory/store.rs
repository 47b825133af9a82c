//! In-memory cache implementation using the moka crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use tracing::debug;

use warden_core::config::MemoryCacheConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::CacheProvider;

/// A cached value with its absolute deadline.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: String, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| deadline > now)
    }

    fn remaining(&self, now: Instant) -> Option<Duration> {
        self.expires_at
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

/// Derives each entry's moka lifetime from its own deadline.
struct EntryDeadline;

impl Expiry<String, CacheEntry> for EntryDeadline {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        created_at: Instant,
    ) -> Option<Duration> {
        value.remaining(created_at)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.remaining(updated_at)
    }
}

/// In-memory cache provider using moka with per-entry TTLs.
///
/// Counter updates and TTL changes go through moka's per-key compute API, so
/// concurrent `incr`/`expire` calls on one key never lose an update.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// The underlying moka cache.
    cache: Cache<String, CacheEntry>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(EntryDeadline)
            .build();

        Self { cache }
    }

    async fn live_entry(&self, key: &str) -> Option<CacheEntry> {
        self.cache
            .get(key)
            .await
            .filter(|entry| entry.is_live(Instant::now()))
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.live_entry(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.cache
            .insert(key.to_string(), CacheEntry::new(value.to_string(), Some(ttl)))
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.live_entry(key).await.is_some())
    }

    async fn incr(&self, key: &str) -> AppResult<i64> {
        let result = self
            .cache
            .entry(key.to_string())
            .and_compute_with(|current| {
                let now = Instant::now();
                let op = match current.map(|entry| entry.into_value()) {
                    Some(entry) if entry.is_live(now) => match entry.value.parse::<i64>() {
                        Ok(count) => Op::Put(CacheEntry {
                            value: (count + 1).to_string(),
                            expires_at: entry.expires_at,
                        }),
                        Err(_) => Op::Nop,
                    },
                    _ => Op::Put(CacheEntry::new("1".to_string(), None)),
                };
                std::future::ready(op)
            })
            .await;

        match result {
            CompResult::Inserted(entry) | CompResult::ReplacedWith(entry) => {
                entry.value().value.parse::<i64>().map_err(|_| {
                    AppError::internal(format!("Counter '{key}' holds a non-integer value"))
                })
            }
            _ => Err(AppError::internal(format!(
                "Counter '{key}' holds a non-integer value"
            ))),
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        let result = self
            .cache
            .entry(key.to_string())
            .and_compute_with(|current| {
                let now = Instant::now();
                let op = match current.map(|entry| entry.into_value()) {
                    Some(entry) if entry.is_live(now) => Op::Put(CacheEntry {
                        value: entry.value,
                        expires_at: Some(now + ttl),
                    }),
                    _ => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;

        let applied = matches!(result, CompResult::ReplacedWith(_));
        debug!(key, applied, ttl_ms = ttl.as_millis() as u64, "Set expiry");
        Ok(applied)
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>> {
        Ok(self
            .live_entry(key)
            .await
            .and_then(|entry| entry.remaining(Instant::now())))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
