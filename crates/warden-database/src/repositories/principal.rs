//! Principal repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::types::{Principal, PrincipalId};

/// Row shape of the `users` columns this subsystem reads.
#[derive(Debug, sqlx::FromRow)]
struct PrincipalRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<PrincipalRow> for Principal {
    fn from(row: PrincipalRow) -> Self {
        Self {
            id: PrincipalId(row.id),
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

const SELECT_PRINCIPAL: &str =
    "SELECT id, username, email, password_hash, created_at FROM users";

/// Emails compare case-insensitively on every lookup path.
const EMAIL_MATCHES: &str = "LOWER(email) = LOWER($1)";

/// Login handle: exact username or case-insensitive email.
const HANDLE_MATCHES: &str = "username = $1 OR LOWER(email) = LOWER($1)";

/// Repository for principal lookups and credential updates.
#[derive(Debug, Clone)]
pub struct PrincipalRepository {
    pool: PgPool,
}

impl PrincipalRepository {
    /// Create a new principal repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a principal by primary key.
    pub async fn find_by_id(&self, id: PrincipalId) -> AppResult<Option<Principal>> {
        sqlx::query_as::<_, PrincipalRow>(&format!("{SELECT_PRINCIPAL} WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(Principal::from))
            .map_err(|e| {
                AppError::with_source(ErrorKind::Dependency, "Failed to find principal by id", e)
            })
    }

    /// Find a principal whose username equals `handle` or whose email matches it ignoring case.
    pub async fn find_by_handle_or_email(&self, handle: &str) -> AppResult<Option<Principal>> {
        sqlx::query_as::<_, PrincipalRow>(&format!(
            "{SELECT_PRINCIPAL} WHERE {HANDLE_MATCHES} LIMIT 1"
        ))
        .bind(handle)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(Principal::from))
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Dependency,
                "Failed to find principal by handle",
                e,
            )
        })
    }

    /// Find a principal by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Principal>> {
        sqlx::query_as::<_, PrincipalRow>(&format!(
            "{SELECT_PRINCIPAL} WHERE {EMAIL_MATCHES}"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(Principal::from))
        .map_err(|e| {
            AppError::with_source(ErrorKind::Dependency, "Failed to find principal by email", e)
        })
    }

    /// Replace the stored credential representation for a username.
    pub async fn update_password_hash(&self, username: &str, password_hash: &str) -> AppResult<u64> {
        sqlx::query("UPDATE users SET password_hash = $1 WHERE username = $2")
            .bind(password_hash)
            .bind(username)
            .execute(&self.pool)
            .await
            .map(|result| result.rows_affected())
            .map_err(|e| {
                AppError::with_source(ErrorKind::Dependency, "Failed to update credential", e)
            })
    }

    /// Whether a username is taken.
    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Dependency, "Failed to check username", e)
            })
    }

    /// Count all principals.
    pub async fn count(&self) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Dependency, "Failed to count principals", e)
            })?;
        Ok(total.max(0) as u64)
    }

    /// Usernames after `after` in ascending order (keyset pagination).
    pub async fn list_usernames(&self, after: Option<&str>, limit: u32) -> AppResult<Vec<String>> {
        let query = match after {
            Some(cursor) => sqlx::query_scalar::<_, String>(
                "SELECT username FROM users WHERE username > $1 ORDER BY username LIMIT $2",
            )
            .bind(cursor.to_string())
            .bind(i64::from(limit)),
            None => {
                sqlx::query_scalar::<_, String>("SELECT username FROM users ORDER BY username LIMIT $1")
                    .bind(i64::from(limit))
            }
        };

        query.fetch_all(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Dependency, "Failed to list usernames", e)
        })
    }
}
