//! Three-tier handle existence check.
//!
//! 1. The in-process [`MembershipFilter`]. A negative answer is final.
//! 2. The confirming cache entry `handle:<handle>`.
//! 3. The durable store. A confirmed handle is written back to both tiers
//!    above; an absent one mutates nothing.
//!
//! The filter is populated at start-up by [`ExistenceIndex::warm_up`]. Until
//! that finishes it can miss handles that already exist in the store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, warn};

use warden_cache::{CacheManager, keys};
use warden_core::config::ExistenceConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::{CacheProvider, PrincipalStore};

use super::bloom::{BloomFilter, MembershipFilter};

const PRESENT: &str = "1";

/// Probabilistic handle existence backed by a cache and the durable store.
pub struct ExistenceIndex {
    filter: Arc<dyn MembershipFilter>,
    cache: Arc<CacheManager>,
    store: Arc<dyn PrincipalStore>,
    ttl: Duration,
    batch_size: u32,
    expected_items: u64,
    warm: AtomicBool,
}

impl std::fmt::Debug for ExistenceIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExistenceIndex")
            .field("filter", &self.filter)
            .field("ttl", &self.ttl)
            .field("warm", &self.is_warm())
            .finish_non_exhaustive()
    }
}

impl ExistenceIndex {
    /// Creates an index with a [`BloomFilter`] sized from `config`.
    pub fn new(
        config: &ExistenceConfig,
        cache: Arc<CacheManager>,
        store: Arc<dyn PrincipalStore>,
    ) -> Self {
        let filter = BloomFilter::new(config.expected_items, config.false_positive_rate);
        Self::with_filter(config, Arc::new(filter), cache, store)
    }

    /// Creates an index over a caller-supplied membership filter.
    pub fn with_filter(
        config: &ExistenceConfig,
        filter: Arc<dyn MembershipFilter>,
        cache: Arc<CacheManager>,
        store: Arc<dyn PrincipalStore>,
    ) -> Self {
        Self {
            filter,
            cache,
            store,
            ttl: Duration::from_secs(config.cache_ttl_seconds),
            batch_size: config.warmup_batch_size,
            expected_items: config.expected_items,
            warm: AtomicBool::new(false),
        }
    }

    /// Whether the start-up scan has completed.
    pub fn is_warm(&self) -> bool {
        self.warm.load(Ordering::Acquire)
    }

    /// Whether `handle` exists.
    pub async fn maybe_exists(&self, handle: &str) -> AppResult<bool> {
        let handle = handle.trim();
        if handle.is_empty() {
            return Err(AppError::validation("Username is required"));
        }

        if !self.filter.contains(handle) {
            debug!(handle, "Existence filter negative");
            return Ok(false);
        }

        let key = keys::handle_exists(handle);
        match self.cache.exists(&key).await {
            Ok(true) => return Ok(true),
            Ok(false) => {}
            Err(e) => warn!(handle, error = %e, "Existence cache read failed, querying store"),
        }

        if !self.store.handle_exists(handle).await? {
            debug!(handle, "Existence filter false positive");
            return Ok(false);
        }

        self.filter.insert(handle);
        self.cache.set(&key, PRESENT, self.ttl).await?;
        Ok(true)
    }

    /// Register a handle that was just created in the store.
    pub async fn record_created(&self, handle: &str) -> AppResult<()> {
        let handle = handle.trim();
        if handle.is_empty() {
            return Err(AppError::validation("Username is required"));
        }
        self.filter.insert(handle);
        self.cache
            .set(&keys::handle_exists(handle), PRESENT, self.ttl)
            .await?;
        debug!(handle, "Handle registered in existence index");
        Ok(())
    }

    /// Scan every stored handle into the filter. Returns the number scanned.
    pub async fn warm_up(&self) -> AppResult<u64> {
        let started = Instant::now();
        let total = self.store.count_handles().await?;
        if total > self.expected_items {
            warn!(
                total,
                expected_items = self.expected_items,
                "Handle population exceeds filter sizing; false-positive rate will rise"
            );
        }
        info!(total, batch_size = self.batch_size, "Existence warm-up started");

        let mut scanned = 0u64;
        let mut after: Option<String> = None;
        loop {
            let batch = self
                .store
                .list_handles(after.as_deref(), self.batch_size)
                .await?;
            for handle in &batch {
                self.filter.insert(handle);
            }
            scanned += batch.len() as u64;

            let exhausted = batch.len() < self.batch_size as usize;
            after = batch.into_iter().last();
            if exhausted || after.is_none() {
                break;
            }
            debug!(scanned, total, "Existence warm-up progress");
        }

        self.warm.store(true, Ordering::Release);
        info!(
            scanned,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Existence warm-up completed"
        );
        Ok(scanned)
    }

    /// Run [`warm_up`](Self::warm_up) on a background task.
    pub fn spawn_warm_up(self: &Arc<Self>) -> JoinHandle<AppResult<u64>> {
        let index = Arc::clone(self);
        tokio::spawn(
            async move {
                let result = index.warm_up().await;
                if let Err(e) = &result {
                    warn!(error = %e, "Existence warm-up failed");
                }
                result
            }
            .instrument(info_span!("existence_warm_up")),
        )
    }
}
