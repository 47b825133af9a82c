//! Durable principal store trait.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{Principal, PrincipalId};

/// Read (and credential-update) access to the authoritative principal store.
///
/// The store owns principals and the role to permission graph; this
/// subsystem never creates or deletes either.
#[async_trait]
pub trait PrincipalStore: Send + Sync + 'static {
    /// Resolve a principal by username or email.
    async fn find_by_handle_or_email(&self, handle: &str) -> AppResult<Option<Principal>>;

    /// Resolve a principal by primary key.
    async fn find_by_id(&self, id: PrincipalId) -> AppResult<Option<Principal>>;

    /// Resolve a principal by registered email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Principal>>;

    /// Replace the stored credential representation. Returns rows affected.
    async fn update_credential(&self, username: &str, password_hash: &str) -> AppResult<u64>;

    /// Distinct permission names reachable through the principal's roles.
    async fn list_permissions(&self, id: PrincipalId) -> AppResult<Vec<String>>;

    /// Whether a principal with this username exists.
    async fn handle_exists(&self, username: &str) -> AppResult<bool>;

    /// Total number of principals.
    async fn count_handles(&self) -> AppResult<u64>;

    /// Usernames in ascending order strictly after `after`, at most `limit` of them.
    async fn list_handles(&self, after: Option<&str>, limit: u32) -> AppResult<Vec<String>>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
