//! Cached effective-permission resolution.
//!
//! The durable store is authoritative; the cache entry is a pure view that
//! lives for the configured TTL. Matching is exact string equality with no
//! wildcard or hierarchy semantics.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use warden_cache::{CacheManager, keys};
use warden_core::config::PermissionConfig;
use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::traits::{CacheProvider, PrincipalStore};
use warden_core::types::PrincipalId;

/// Resolves and caches a principal's permission set.
#[derive(Clone)]
pub struct PermissionAuthorizer {
    cache: Arc<CacheManager>,
    store: Arc<dyn PrincipalStore>,
    ttl: Duration,
}

impl std::fmt::Debug for PermissionAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionAuthorizer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl PermissionAuthorizer {
    /// Creates an authorizer.
    pub fn new(
        config: &PermissionConfig,
        cache: Arc<CacheManager>,
        store: Arc<dyn PrincipalStore>,
    ) -> Self {
        Self {
            cache,
            store,
            ttl: Duration::from_secs(config.cache_ttl_seconds),
        }
    }

    /// The principal's effective permissions, from cache or the store.
    ///
    /// A malformed cache payload is treated as a miss and overwritten.
    pub async fn permissions(&self, id: PrincipalId) -> AppResult<Vec<String>> {
        let key = keys::permissions(id);
        match self.cache.get_json::<Vec<String>>(&key).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) if e.kind == ErrorKind::Serialization => {
                warn!(principal_id = %id, "Malformed permission cache entry, reloading");
            }
            Err(e) => return Err(e),
        }

        let permissions = self.store.list_permissions(id).await?;
        self.cache.set_json(&key, &permissions, self.ttl).await?;
        debug!(principal_id = %id, count = permissions.len(), "Permission cache populated");
        Ok(permissions)
    }

    /// Whether the principal holds `required`.
    pub async fn check(&self, id: PrincipalId, required: &str) -> AppResult<bool> {
        if required.trim().is_empty() {
            return Err(AppError::validation("Required permission must not be empty"));
        }
        let permissions = self.permissions(id).await?;
        Ok(permissions.iter().any(|p| p == required))
    }

    /// Like [`check`](Self::check), failing with `Authorization` when denied.
    pub async fn require(&self, id: PrincipalId, required: &str) -> AppResult<()> {
        if self.check(id, required).await? {
            Ok(())
        } else {
            debug!(principal_id = %id, required, "Permission denied");
            Err(AppError::authorization("Forbidden"))
        }
    }

    /// Drop the cached view so the next check reads the store.
    pub async fn invalidate(&self, id: PrincipalId) -> AppResult<()> {
        self.cache.delete(&keys::permissions(id)).await
    }
}
