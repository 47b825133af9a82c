//! In-process principal store.
//!
//! Backs local runs of the CLI and the test suites. Every read path is
//! counted so callers can assert that a lookup never reached the store,
//! and failures can be injected to exercise dependency-error handling.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::PrincipalStore;
use warden_core::types::{Principal, PrincipalId};

/// Read counters exposed for assertions.
#[derive(Debug, Default)]
pub struct StoreCounters {
    /// `handle_exists` calls.
    pub existence_queries: AtomicU64,
    /// `list_permissions` calls.
    pub permission_queries: AtomicU64,
    /// `update_credential` calls.
    pub credential_updates: AtomicU64,
    /// Principal lookups by handle, email or id.
    pub principal_lookups: AtomicU64,
}

/// In-memory principal store with a role to permission graph.
#[derive(Debug, Clone, Default)]
pub struct MemoryPrincipalStore {
    principals: Arc<DashMap<i64, Principal>>,
    roles: Arc<DashMap<String, BTreeSet<String>>>,
    assignments: Arc<DashMap<i64, BTreeSet<String>>>,
    next_id: Arc<AtomicI64>,
    counters: Arc<StoreCounters>,
    fail_reads: Arc<AtomicBool>,
    fail_updates: Arc<AtomicBool>,
}

impl MemoryPrincipalStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a principal and return it with its assigned id.
    pub fn insert(&self, username: &str, email: &str, password_hash: &str) -> Principal {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let principal = Principal {
            id: PrincipalId(id),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        self.principals.insert(id, principal.clone());
        principal
    }

    /// Define (or replace) a role's permission set.
    pub fn define_role(&self, role: &str, permissions: &[&str]) {
        self.roles.insert(
            role.to_string(),
            permissions.iter().map(|p| (*p).to_string()).collect(),
        );
    }

    /// Assign a role to a principal.
    pub fn assign_role(&self, id: PrincipalId, role: &str) {
        self.assignments
            .entry(id.0)
            .or_default()
            .insert(role.to_string());
    }

    /// Remove a role from a principal.
    pub fn revoke_role(&self, id: PrincipalId, role: &str) {
        if let Some(mut roles) = self.assignments.get_mut(&id.0) {
            roles.remove(role);
        }
    }

    /// Current stored credential representation for a username.
    pub fn password_hash(&self, username: &str) -> Option<String> {
        self.principals
            .iter()
            .find(|entry| entry.username == username)
            .map(|entry| entry.password_hash.clone())
    }

    /// Access the read counters.
    pub fn counters(&self) -> &StoreCounters {
        &self.counters
    }

    /// Make every subsequent read fail with a dependency error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent credential update fail with a dependency error.
    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    fn check_reads(&self) -> AppResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::dependency("principal store unavailable"));
        }
        Ok(())
    }

    fn find_where(&self, predicate: impl Fn(&Principal) -> bool) -> Option<Principal> {
        self.principals
            .iter()
            .find(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl PrincipalStore for MemoryPrincipalStore {
    async fn find_by_handle_or_email(&self, handle: &str) -> AppResult<Option<Principal>> {
        self.counters.principal_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        Ok(self.find_where(|p| p.matches_handle(handle)))
    }

    async fn find_by_id(&self, id: PrincipalId) -> AppResult<Option<Principal>> {
        self.counters.principal_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        Ok(self.principals.get(&id.0).map(|entry| entry.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Principal>> {
        self.counters.principal_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        Ok(self.find_where(|p| p.email.eq_ignore_ascii_case(email)))
    }

    async fn update_credential(&self, username: &str, password_hash: &str) -> AppResult<u64> {
        self.counters.credential_updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::dependency("principal store rejected the update"));
        }
        let mut rows = 0;
        for mut entry in self.principals.iter_mut() {
            if entry.username == username {
                entry.password_hash = password_hash.to_string();
                rows += 1;
            }
        }
        Ok(rows)
    }

    async fn list_permissions(&self, id: PrincipalId) -> AppResult<Vec<String>> {
        self.counters.permission_queries.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        let role_names: Vec<String> = self
            .assignments
            .get(&id.0)
            .map(|roles| roles.iter().cloned().collect())
            .unwrap_or_default();

        let mut names = BTreeSet::new();
        for role in role_names {
            if let Some(perms) = self.roles.get(&role) {
                names.extend(perms.iter().cloned());
            }
        }
        Ok(names.into_iter().collect())
    }

    async fn handle_exists(&self, username: &str) -> AppResult<bool> {
        self.counters.existence_queries.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        Ok(self.find_where(|p| p.username == username).is_some())
    }

    async fn count_handles(&self) -> AppResult<u64> {
        self.check_reads()?;
        Ok(self.principals.len() as u64)
    }

    async fn list_handles(&self, after: Option<&str>, limit: u32) -> AppResult<Vec<String>> {
        self.check_reads()?;
        let mut usernames: Vec<String> = self
            .principals
            .iter()
            .map(|entry| entry.username.clone())
            .filter(|name| after.is_none_or(|cursor| name.as_str() > cursor))
            .collect();
        usernames.sort();
        usernames.truncate(limit as usize);
        Ok(usernames)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.fail_reads.load(Ordering::SeqCst))
    }
}
