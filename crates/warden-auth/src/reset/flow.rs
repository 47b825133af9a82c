//! Password reset: `NoActiveReset -> ResetIssued -> {Consumed, Expired}`.
//!
//! A reset is three cache entries sharing one TTL:
//! `reset_token:<token> -> username`, `reset:active:<username> -> token`
//! and `reset:invalid:<username> -> count`. They are written one after the
//! other without a transaction; a partial write simply expires with its TTL.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use warden_cache::{CacheManager, keys};
use warden_core::config::ResetConfig;
use warden_core::error::AppError;
use warden_core::events::NotificationEvent;
use warden_core::result::AppResult;
use warden_core::traits::{CacheProvider, NotificationPublisher, PrincipalStore};

use crate::password::{PasswordHasher, PasswordPolicy};

/// Random bytes per reset token.
const TOKEN_BYTES: usize = 32;

/// An issued, not yet consumed reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetState {
    /// Canonical handle of the principal being reset.
    pub principal_handle: String,
    /// The opaque single-use token.
    pub token: String,
    /// Failed submissions so far.
    pub invalid_attempts: i64,
    /// Whether this reset is the principal's active one.
    pub active: bool,
    /// When the reset expires.
    pub expires_at: DateTime<Utc>,
}

/// Issues and consumes password reset tokens.
#[derive(Clone)]
pub struct PasswordResetFlow {
    cache: Arc<CacheManager>,
    store: Arc<dyn PrincipalStore>,
    notifier: Arc<dyn NotificationPublisher>,
    hasher: PasswordHasher,
    policy: PasswordPolicy,
    ttl: Duration,
    max_invalid_attempts: i64,
    link_base_url: String,
}

impl std::fmt::Debug for PasswordResetFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordResetFlow")
            .field("ttl", &self.ttl)
            .field("max_invalid_attempts", &self.max_invalid_attempts)
            .finish_non_exhaustive()
    }
}

impl PasswordResetFlow {
    /// Creates the reset flow.
    pub fn new(
        config: &ResetConfig,
        cache: Arc<CacheManager>,
        store: Arc<dyn PrincipalStore>,
        notifier: Arc<dyn NotificationPublisher>,
        hasher: PasswordHasher,
        policy: PasswordPolicy,
    ) -> Self {
        Self {
            cache,
            store,
            notifier,
            hasher,
            policy,
            ttl: Duration::from_secs(config.ttl_minutes * 60),
            max_invalid_attempts: config.max_invalid_attempts,
            link_base_url: config.link_base_url.clone(),
        }
    }

    fn generate_token() -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    fn reset_link(&self, token: &str) -> String {
        format!("{}?token={token}", self.link_base_url)
    }

    /// Start a reset for the principal registered under `email`.
    ///
    /// Fails with `Conflict` while an unexpired reset is active; nothing is
    /// reissued and no second link is sent.
    pub async fn request_reset(&self, email: &str) -> AppResult<ResetState> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::validation("Email is required"));
        }

        let principal = self
            .store
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        let handle = principal.username.clone();

        if self.cache.exists(&keys::reset_active(&handle)).await? {
            info!(username = %handle, "Reset already active");
            return Err(AppError::conflict("A password reset link was already sent"));
        }

        let token = Self::generate_token();
        let expires_at = Utc::now()
            + chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::minutes(10));

        self.cache
            .set(&keys::reset_token(&token), &handle, self.ttl)
            .await?;
        self.cache
            .set(&keys::reset_active(&handle), &token, self.ttl)
            .await?;
        self.cache
            .set(&keys::reset_invalid(&handle), "0", self.ttl)
            .await?;

        let event = NotificationEvent::reset_link(&principal, self.reset_link(&token));
        if let Err(e) = self.notifier.publish(&event).await {
            // The link never left; let the principal ask again.
            self.discard(&token, &handle).await;
            return Err(e);
        }

        info!(username = %handle, "Password reset issued");
        Ok(ResetState {
            principal_handle: handle,
            token,
            invalid_attempts: 0,
            active: true,
            expires_at,
        })
    }

    /// Best-effort removal of a reset's entries.
    async fn discard(&self, token: &str, handle: &str) {
        for key in [
            keys::reset_token(token),
            keys::reset_active(handle),
            keys::reset_invalid(handle),
        ] {
            if let Err(e) = self.cache.delete(&key).await {
                warn!(key = %key, error = %e, "Failed to discard reset entry");
            }
        }
    }

    async fn count_invalid(&self, handle: &str) -> AppResult<i64> {
        self.cache.incr(&keys::reset_invalid(handle)).await
    }

    /// Current invalid-attempt count; a missing counter reads as zero.
    async fn invalid_attempts(&self, handle: &str) -> AppResult<i64> {
        match self.cache.get(&keys::reset_invalid(handle)).await? {
            Some(raw) => Ok(raw.trim().parse::<i64>().unwrap_or(self.max_invalid_attempts)),
            None => Ok(0),
        }
    }

    /// Consume `token`, replacing the principal's credential with `new_secret`.
    ///
    /// On success the reset entries and the principal's current access token
    /// are deleted, forcing re-authentication everywhere.
    pub async fn consume(&self, token: &str, new_secret: &str) -> AppResult<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::validation("Reset token is required"));
        }

        let handle = self
            .cache
            .get(&keys::reset_token(token))
            .await?
            .ok_or_else(|| AppError::authentication("Invalid or expired reset token"))?;

        let active = self.cache.get(&keys::reset_active(&handle)).await?;
        if active.as_deref() != Some(token) {
            return Err(AppError::authentication("Invalid or expired reset token"));
        }

        if self.invalid_attempts(&handle).await? >= self.max_invalid_attempts {
            warn!(username = %handle, "Reset attempts exhausted");
            return Err(AppError::throttled("Too many invalid reset attempts"));
        }

        if let Err(e) = self.policy.validate(new_secret) {
            self.count_invalid(&handle).await?;
            return Err(e);
        }

        let representation = self.hasher.hash_password_blocking(new_secret).await?;
        match self.store.update_credential(&handle, &representation).await {
            Ok(0) => {
                self.count_invalid(&handle).await?;
                return Err(AppError::dependency("Credential update affected no principal"));
            }
            Ok(_) => {}
            Err(e) => {
                self.count_invalid(&handle).await?;
                return Err(e);
            }
        }

        self.cache.delete(&keys::reset_token(token)).await?;
        self.cache.delete(&keys::reset_active(&handle)).await?;
        self.cache.delete(&keys::reset_invalid(&handle)).await?;
        self.cache.delete(&keys::access_token(&handle)).await?;

        info!(username = %handle, "Password reset completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use warden_core::error::ErrorKind;
    use warden_core::events::notification::ACTION_PASSWORD_RESET;

    fn flow(fx: &Fixture) -> PasswordResetFlow {
        PasswordResetFlow::new(
            &fx.config.reset,
            fx.cache.clone(),
            fx.store(),
            fx.notifier(),
            fx.hasher.clone(),
            PasswordPolicy::new(&fx.config.auth),
        )
    }

    #[tokio::test]
    async fn test_request_writes_three_keys_and_sends_link() {
        let fx = Fixture::new();
        fx.add_principal("alice", "alice@example.com", "CorrectPass1!");
        let state = flow(&fx).request_reset("alice@example.com").await.unwrap();

        assert_eq!(state.principal_handle, "alice");
        assert_eq!(state.invalid_attempts, 0);
        assert!(state.active);
        assert_eq!(
            fx.cache.get(&keys::reset_token(&state.token)).await.unwrap().as_deref(),
            Some("alice")
        );
        assert_eq!(
            fx.cache.get("reset:active:alice").await.unwrap(),
            Some(state.token.clone())
        );
        assert_eq!(fx.cache.get("reset:invalid:alice").await.unwrap().as_deref(), Some("0"));
        let ttl = fx.cache.ttl("reset:active:alice").await.unwrap().unwrap();
        assert!(ttl > Duration::from_secs(590) && ttl <= Duration::from_secs(600));

        let sent = fx.notifier.with_action(ACTION_PASSWORD_RESET).await;
        assert_eq!(sent.len(), 1);
        let link = sent[0].metadata.get("link").unwrap();
        assert!(link.ends_with(&format!("?token={}", state.token)));
    }

    #[test]
    fn test_tokens_are_url_safe_and_unique() {
        let a = PasswordResetFlow::generate_token();
        let b = PasswordResetFlow::generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[tokio::test]
    async fn test_unknown_email_not_found() {
        let fx = Fixture::new();
        let err = flow(&fx).request_reset("nobody@example.com").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_failed_delivery_rolls_back() {
        let fx = Fixture::new();
        fx.add_principal("alice", "alice@example.com", "CorrectPass1!");
        fx.notifier.set_failing(true);
        let f = flow(&fx);
        let err = f.request_reset("alice@example.com").await.unwrap_err();
        assert!(err.is_dependency());
        assert!(!fx.cache.exists("reset:active:alice").await.unwrap());

        fx.notifier.set_failing(false);
        assert!(f.request_reset("alice@example.com").await.is_ok());
    }

    #[tokio::test]
    async fn test_policy_violation_counts_as_invalid_attempt() {
        let fx = Fixture::new();
        fx.add_principal("alice", "alice@example.com", "CorrectPass1!");
        let f = flow(&fx);
        let state = f.request_reset("alice@example.com").await.unwrap();

        let err = f.consume(&state.token, "weak").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let err = f.consume(&state.token, "ValidPass1!").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Throttled);
    }

    #[tokio::test]
    async fn test_store_failure_counts_as_invalid_attempt() {
        let fx = Fixture::new();
        fx.add_principal("alice", "alice@example.com", "CorrectPass1!");
        let f = flow(&fx);
        let state = f.request_reset("alice@example.com").await.unwrap();

        fx.store.set_fail_updates(true);
        let err = f.consume(&state.token, "ValidPass1!").await.unwrap_err();
        assert!(err.is_dependency());
        assert_eq!(fx.cache.get("reset:invalid:alice").await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_unknown_token_is_authentication_error() {
        let fx = Fixture::new();
        let f = flow(&fx);
        assert_eq!(
            f.consume("no-such-token", "ValidPass1!").await.unwrap_err().kind,
            ErrorKind::Authentication
        );
        assert_eq!(
            f.consume("  ", "ValidPass1!").await.unwrap_err().kind,
            ErrorKind::Validation
        );
    }

    #[tokio::test]
    async fn test_consume_updates_credential() {
        let fx = Fixture::new();
        fx.add_principal("alice", "alice@example.com", "CorrectPass1!");
        let f = flow(&fx);
        let state = f.request_reset("alice@example.com").await.unwrap();
        f.consume(&state.token, "ValidPass1!").await.unwrap();

        let stored = fx.store.password_hash("alice").unwrap();
        assert!(fx.hasher.verify_password("ValidPass1!", &stored).unwrap());
        // single use
        assert_eq!(
            f.consume(&state.token, "OtherPass1!").await.unwrap_err().kind,
            ErrorKind::Authentication
        );
    }
}
