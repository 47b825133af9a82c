//! PostgreSQL-backed principal store.

use async_trait::async_trait;
use tracing::debug;

use warden_core::result::AppResult;
use warden_core::traits::PrincipalStore;
use warden_core::types::{Principal, PrincipalId};

use crate::connection::DatabasePool;
use crate::repositories::{PermissionRepository, PrincipalRepository};

/// Principal store delegating to the sqlx repositories.
#[derive(Debug, Clone)]
pub struct PgPrincipalStore {
    db: DatabasePool,
    principals: PrincipalRepository,
    permissions: PermissionRepository,
}

impl PgPrincipalStore {
    /// Build the store over an open pool.
    pub fn new(db: DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            principals: PrincipalRepository::new(pool.clone()),
            permissions: PermissionRepository::new(pool),
            db,
        }
    }
}

#[async_trait]
impl PrincipalStore for PgPrincipalStore {
    async fn find_by_handle_or_email(&self, handle: &str) -> AppResult<Option<Principal>> {
        self.principals.find_by_handle_or_email(handle).await
    }

    async fn find_by_id(&self, id: PrincipalId) -> AppResult<Option<Principal>> {
        self.principals.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Principal>> {
        self.principals.find_by_email(email).await
    }

    async fn update_credential(&self, username: &str, password_hash: &str) -> AppResult<u64> {
        let rows = self
            .principals
            .update_password_hash(username, password_hash)
            .await?;
        debug!(username, rows, "Credential updated");
        Ok(rows)
    }

    async fn list_permissions(&self, id: PrincipalId) -> AppResult<Vec<String>> {
        self.permissions.find_names_for_principal(id).await
    }

    async fn handle_exists(&self, username: &str) -> AppResult<bool> {
        self.principals.username_exists(username).await
    }

    async fn count_handles(&self) -> AppResult<u64> {
        self.principals.count().await
    }

    async fn list_handles(&self, after: Option<&str>, limit: u32) -> AppResult<Vec<String>> {
        self.principals.list_usernames(after, limit).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.db.health_check().await
    }
}
