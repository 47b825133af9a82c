//! Login credential checks.
//!
//! Failures are counted under `login_failures:<username>`, keyed by the
//! resolved principal's canonical username so that alternating between
//! email and username cannot split the budget. Once the count is over the
//! threshold every attempt is rejected, whatever the secret, and each such
//! attempt re-sends the security alert and restarts the lockout window.

use std::sync::Arc;

use tracing::{info, warn};

use warden_cache::keys;
use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::events::NotificationEvent;
use warden_core::result::AppResult;
use warden_core::traits::{NotificationPublisher, PrincipalStore};
use warden_core::types::Principal;

use crate::password::PasswordHasher;
use crate::rate::{RateGuard, RatePolicy};

/// Resolves a principal by handle and checks a submitted secret.
#[derive(Clone)]
pub struct CredentialVerifier {
    store: Arc<dyn PrincipalStore>,
    notifier: Arc<dyn NotificationPublisher>,
    rate: RateGuard,
    hasher: PasswordHasher,
    policy: RatePolicy,
    conceal_unknown_handles: bool,
    reset_failures_on_success: bool,
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("policy", &self.policy)
            .field("conceal_unknown_handles", &self.conceal_unknown_handles)
            .finish_non_exhaustive()
    }
}

impl CredentialVerifier {
    /// Creates a verifier.
    pub fn new(
        config: &AuthConfig,
        store: Arc<dyn PrincipalStore>,
        notifier: Arc<dyn NotificationPublisher>,
        rate: RateGuard,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            store,
            notifier,
            rate,
            hasher,
            policy: RatePolicy::login(config),
            conceal_unknown_handles: config.conceal_unknown_handles,
            reset_failures_on_success: config.reset_failures_on_success,
        }
    }

    /// Verify `secret` for the principal named by `handle` (username or email).
    pub async fn verify(&self, handle: &str, secret: &str) -> AppResult<Principal> {
        let handle = handle.trim();
        if handle.is_empty() || secret.is_empty() {
            return Err(AppError::validation("Username and password are required"));
        }

        let Some(principal) = self.store.find_by_handle_or_email(handle).await? else {
            info!(handle, "Login for unknown handle");
            return Err(if self.conceal_unknown_handles {
                AppError::authentication("Invalid credentials")
            } else {
                AppError::not_found("User not found")
            });
        };

        let failures_key = keys::login_failures(&principal.username);
        if self.rate.is_exceeded(&failures_key, &self.policy).await? {
            self.rate.extend(&failures_key, self.policy.window).await?;
            self.notifier
                .publish(&NotificationEvent::security_alert(&principal))
                .await?;
            warn!(username = %principal.username, "Login attempt while locked out");
            return Err(AppError::throttled(
                "Too many failed login attempts. Try again later",
            ));
        }

        let matches = self
            .hasher
            .verify_password_blocking(secret, &principal.password_hash)
            .await?;

        if !matches {
            let count = self.rate.record(&failures_key, &self.policy).await?;
            warn!(username = %principal.username, failures = count, "Invalid credentials");
            return Err(AppError::authentication("Invalid credentials"));
        }

        if self.reset_failures_on_success {
            self.rate.clear(&failures_key).await?;
        }
        info!(username = %principal.username, principal_id = %principal.id, "Credentials verified");
        Ok(principal)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::Fixture;
    use warden_core::error::ErrorKind;
    use warden_core::events::notification::ACTION_SECURITY;
    use warden_core::traits::CacheProvider;

    fn verifier(fx: &Fixture) -> CredentialVerifier {
        CredentialVerifier::new(
            &fx.config.auth,
            fx.store(),
            fx.notifier(),
            RateGuard::new(fx.cache.clone()),
            fx.hasher.clone(),
        )
    }

    #[tokio::test]
    async fn test_success_by_username_and_email() {
        let fx = Fixture::new();
        let alice = fx.add_principal("alice", "alice@example.com", "CorrectPass1!");
        let v = verifier(&fx);
        assert_eq!(v.verify("alice", "CorrectPass1!").await.unwrap().id, alice.id);
        assert_eq!(
            v.verify("alice@example.com", "CorrectPass1!").await.unwrap().id,
            alice.id
        );
    }

    #[tokio::test]
    async fn test_failure_counts_and_starts_window() {
        let fx = Fixture::new();
        fx.add_principal("alice", "alice@example.com", "CorrectPass1!");
        let v = verifier(&fx);
        let err = v.verify("alice", "wrong").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(fx.cache.get("login_failures:alice").await.unwrap().as_deref(), Some("1"));
        let ttl = fx.cache.ttl("login_failures:alice").await.unwrap().unwrap();
        assert!(ttl > Duration::from_secs(590));
    }

    #[tokio::test]
    async fn test_email_and_username_share_one_budget() {
        let fx = Fixture::new();
        fx.add_principal("alice", "alice@example.com", "CorrectPass1!");
        let v = verifier(&fx);
        let _ = v.verify("alice", "wrong").await;
        let _ = v.verify("alice@example.com", "wrong").await;
        assert_eq!(fx.cache.get("login_failures:alice").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_unknown_handle_is_concealed() {
        let fx = Fixture::new();
        let err = verifier(&fx).verify("ghost", "whatever").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_unknown_handle_not_found_when_not_concealed() {
        let mut fx = Fixture::new();
        fx.config.auth.conceal_unknown_handles = false;
        let err = verifier(&fx).verify("ghost", "whatever").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_lockout_rejects_correct_secret_and_alerts() {
        let fx = Fixture::new();
        fx.add_principal("alice", "alice@example.com", "CorrectPass1!");
        let v = verifier(&fx);
        for _ in 0..6 {
            let _ = v.verify("alice", "wrong").await;
        }
        let err = v.verify("alice", "CorrectPass1!").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Throttled);
        let alerts = fx.notifier.with_action(ACTION_SECURITY).await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].target, "alice@example.com");
    }

    #[tokio::test]
    async fn test_locked_attempt_restarts_window() {
        let fx = Fixture::new();
        fx.add_principal("alice", "alice@example.com", "CorrectPass1!");
        fx.cache
            .set("login_failures:alice", "6", Duration::from_secs(5))
            .await
            .unwrap();

        let err = verifier(&fx).verify("alice", "CorrectPass1!").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Throttled);
        let ttl = fx.cache.ttl("login_failures:alice").await.unwrap().unwrap();
        assert!(ttl > Duration::from_secs(590));
        // locked attempts are not counted
        assert_eq!(fx.cache.get("login_failures:alice").await.unwrap().as_deref(), Some("6"));
    }

    #[tokio::test]
    async fn test_undeliverable_alert_is_dependency_error() {
        let fx = Fixture::new();
        fx.add_principal("alice", "", "CorrectPass1!");
        fx.cache
            .set("login_failures:alice", "6", Duration::from_secs(600))
            .await
            .unwrap();

        let err = verifier(&fx).verify("alice", "CorrectPass1!").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Dependency);
        assert!(fx.notifier.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_mixed_case_email_resolves() {
        let fx = Fixture::new();
        let alice = fx.add_principal("alice", "alice@example.com", "CorrectPass1!");
        let principal = verifier(&fx)
            .verify("Alice@Example.COM", "CorrectPass1!")
            .await
            .unwrap();
        assert_eq!(principal.id, alice.id);
    }

    #[tokio::test]
    async fn test_success_keeps_counter_unless_configured() {
        let fx = Fixture::new();
        fx.add_principal("alice", "alice@example.com", "CorrectPass1!");
        let v = verifier(&fx);
        let _ = v.verify("alice", "wrong").await;
        v.verify("alice", "CorrectPass1!").await.unwrap();
        assert!(fx.cache.exists("login_failures:alice").await.unwrap());

        let mut fx2 = Fixture::new();
        fx2.config.auth.reset_failures_on_success = true;
        fx2.add_principal("alice", "alice@example.com", "CorrectPass1!");
        let v2 = verifier(&fx2);
        let _ = v2.verify("alice", "wrong").await;
        v2.verify("alice", "CorrectPass1!").await.unwrap();
        assert!(!fx2.cache.exists("login_failures:alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_input_is_validation_error() {
        let fx = Fixture::new();
        let v = verifier(&fx);
        assert_eq!(v.verify("", "x").await.unwrap_err().kind, ErrorKind::Validation);
        assert_eq!(v.verify("alice", "").await.unwrap_err().kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_store_failure_is_dependency_error() {
        let fx = Fixture::new();
        fx.store.set_fail_reads(true);
        let err = verifier(&fx).verify("alice", "x").await.unwrap_err();
        assert!(err.is_dependency());
    }
}
