//! The caller-facing facade over every access component.
//!
//! Each operation runs under a child of the injected root span and is
//! bounded by the configured request timeout. When the deadline passes the
//! in-flight future is dropped, which cancels every pending cache and store
//! call, and the caller sees a `Dependency` error.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{Instrument, Span, debug, info, info_span, warn};

use warden_cache::{CacheManager, keys};
use warden_core::config::AppConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::{CacheProvider, NotificationPublisher, PrincipalStore};
use warden_core::types::{Principal, PrincipalId};

use crate::credential::CredentialVerifier;
use crate::existence::ExistenceIndex;
use crate::jwt::TokenCodec;
use crate::password::{PasswordHasher, PasswordPolicy};
use crate::rate::{RateGuard, RatePolicy};
use crate::rbac::PermissionAuthorizer;
use crate::reset::{PasswordResetFlow, ResetState};
use crate::token::{IssuedToken, TokenPair, TokenService, extract_bearer};

/// Result of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginOutcome {
    /// The authenticated principal.
    pub principal_id: PrincipalId,
    /// Canonical handle.
    pub username: String,
    /// The new session.
    pub tokens: TokenPair,
}

/// Reachability of the external collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Cache answered its health probe.
    pub cache: bool,
    /// Durable store answered its health probe.
    pub store: bool,
}

impl HealthStatus {
    /// Whether every collaborator is reachable.
    pub fn is_healthy(&self) -> bool {
        self.cache && self.store
    }
}

/// Session and access-control operations.
#[derive(Clone)]
pub struct AccessService {
    verifier: CredentialVerifier,
    tokens: TokenService,
    reset: PasswordResetFlow,
    permissions: PermissionAuthorizer,
    existence: Arc<ExistenceIndex>,
    rate: RateGuard,
    api_policy: RatePolicy,
    cache: Arc<CacheManager>,
    store: Arc<dyn PrincipalStore>,
    timeout: Duration,
    span: Span,
}

impl std::fmt::Debug for AccessService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessService")
            .field("api_policy", &self.api_policy)
            .field("timeout", &self.timeout)
            .field("existence", &self.existence)
            .finish_non_exhaustive()
    }
}

impl AccessService {
    /// Wire every component from configuration and the shared collaborators.
    ///
    /// `span` is the root span for all operations; it usually carries the
    /// service name.
    pub fn new(
        config: &AppConfig,
        cache: Arc<CacheManager>,
        store: Arc<dyn PrincipalStore>,
        notifier: Arc<dyn NotificationPublisher>,
        span: Span,
    ) -> AppResult<Self> {
        config.validate()?;

        let hasher = PasswordHasher::new(&config.auth)?;
        let rate = RateGuard::new(cache.clone());

        let verifier = CredentialVerifier::new(
            &config.auth,
            store.clone(),
            notifier.clone(),
            rate.clone(),
            hasher.clone(),
        );
        let tokens = TokenService::new(TokenCodec::new(&config.auth), cache.clone(), store.clone());
        let reset = PasswordResetFlow::new(
            &config.reset,
            cache.clone(),
            store.clone(),
            notifier,
            hasher,
            PasswordPolicy::new(&config.auth),
        );
        let permissions =
            PermissionAuthorizer::new(&config.permissions, cache.clone(), store.clone());
        let existence = Arc::new(ExistenceIndex::new(
            &config.existence,
            cache.clone(),
            store.clone(),
        ));

        Ok(Self {
            verifier,
            tokens,
            reset,
            permissions,
            existence,
            rate,
            api_policy: RatePolicy::api(&config.rate_limit),
            cache,
            store,
            timeout: config.service.request_timeout(),
            span,
        })
    }

    /// The existence index, for callers that manage warm-up themselves.
    pub fn existence(&self) -> &Arc<ExistenceIndex> {
        &self.existence
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        let span = info_span!(parent: &self.span, "access", operation);
        let timeout = self.timeout;
        async move {
            match tokio::time::timeout(timeout, fut).await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => {
                    debug!(kind = %e.kind, error = %e.message, "Operation rejected");
                    Err(e)
                }
                Err(_) => {
                    warn!(timeout_ms = timeout.as_millis() as u64, "Operation timed out");
                    Err(AppError::dependency(format!(
                        "{operation} timed out after {} ms",
                        timeout.as_millis()
                    )))
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Verify a credential and start a new session.
    pub async fn login(&self, handle: &str, secret: &str) -> AppResult<LoginOutcome> {
        self.bounded("login", async {
            let principal = self.verifier.verify(handle, secret).await?;
            let tokens = self.tokens.issue(&principal).await?;
            info!(username = %principal.username, "Login succeeded");
            Ok(LoginOutcome {
                principal_id: principal.id,
                username: principal.username,
                tokens,
            })
        })
        .await
    }

    /// Authenticate an `Authorization` header value and count the call
    /// against the principal's API rate limit.
    pub async fn authorize(&self, header: Option<&str>) -> AppResult<Principal> {
        self.bounded("authorize", async {
            let token = extract_bearer(header)?;
            let principal = self.tokens.authorize(token).await?;
            let calls = self
                .rate
                .hit(&keys::api_calls(principal.id), &self.api_policy)
                .await
                .inspect_err(|_| {
                    warn!(principal_id = %principal.id, "API rate limit exceeded");
                })?;
            debug!(principal_id = %principal.id, calls, "Request authorized");
            Ok(principal)
        })
        .await
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<IssuedToken> {
        self.bounded("refresh", self.tokens.refresh(refresh_token))
            .await
    }

    /// End the current session.
    pub async fn logout(&self, access_token: &str, refresh_token: &str) -> AppResult<()> {
        self.bounded("logout", self.tokens.revoke(access_token, refresh_token))
            .await
    }

    /// Start a password reset for the principal registered under `email`.
    pub async fn request_reset(&self, email: &str) -> AppResult<ResetState> {
        self.bounded("request_reset", self.reset.request_reset(email))
            .await
    }

    /// Complete a password reset.
    pub async fn reset_password(&self, token: &str, new_secret: &str) -> AppResult<()> {
        self.bounded("reset_password", self.reset.consume(token, new_secret))
            .await
    }

    /// Whether the principal holds `permission`.
    pub async fn check_permission(&self, id: PrincipalId, permission: &str) -> AppResult<bool> {
        self.bounded("check_permission", self.permissions.check(id, permission))
            .await
    }

    /// Admit the principal only if it holds `permission`.
    pub async fn require_permission(&self, id: PrincipalId, permission: &str) -> AppResult<()> {
        self.bounded("require_permission", self.permissions.require(id, permission))
            .await
    }

    /// Drop the cached permission view for a principal.
    pub async fn invalidate_permissions(&self, id: PrincipalId) -> AppResult<()> {
        self.bounded("invalidate_permissions", self.permissions.invalidate(id))
            .await
    }

    /// Whether a handle is taken.
    pub async fn handle_exists(&self, handle: &str) -> AppResult<bool> {
        self.bounded("handle_exists", self.existence.maybe_exists(handle))
            .await
    }

    /// Register a handle created by the user-management collaborator.
    pub async fn record_created_handle(&self, handle: &str) -> AppResult<()> {
        self.bounded("record_created_handle", self.existence.record_created(handle))
            .await
    }

    /// Populate the existence filter. Not bounded by the request timeout.
    pub async fn warm_up(&self) -> AppResult<u64> {
        self.existence
            .warm_up()
            .instrument(info_span!(parent: &self.span, "existence_warm_up"))
            .await
    }

    /// Populate the existence filter on a background task.
    pub fn spawn_warm_up(&self) -> JoinHandle<AppResult<u64>> {
        let _entered = self.span.enter();
        self.existence.spawn_warm_up()
    }

    /// Probe the cache and the durable store.
    pub async fn health(&self) -> HealthStatus {
        let probe = async {
            let cache = self.cache.health_check().await.unwrap_or_else(|e| {
                warn!(error = %e, "Cache health check failed");
                false
            });
            let store = self.store.health_check().await.unwrap_or_else(|e| {
                warn!(error = %e, "Store health check failed");
                false
            });
            Ok::<_, AppError>(HealthStatus { cache, store })
        };
        self.bounded("health", probe).await.unwrap_or(HealthStatus {
            cache: false,
            store: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::testing::Fixture;
    use warden_core::error::ErrorKind;

    /// Store whose lookups never complete within a request deadline.
    struct StalledStore;

    #[async_trait]
    impl PrincipalStore for StalledStore {
        async fn find_by_handle_or_email(&self, _: &str) -> AppResult<Option<Principal>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(None)
        }
        async fn find_by_id(&self, _: PrincipalId) -> AppResult<Option<Principal>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(None)
        }
        async fn find_by_email(&self, _: &str) -> AppResult<Option<Principal>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(None)
        }
        async fn update_credential(&self, _: &str, _: &str) -> AppResult<u64> {
            Ok(0)
        }
        async fn list_permissions(&self, _: PrincipalId) -> AppResult<Vec<String>> {
            Ok(Vec::new())
        }
        async fn handle_exists(&self, _: &str) -> AppResult<bool> {
            Ok(false)
        }
        async fn count_handles(&self) -> AppResult<u64> {
            Ok(0)
        }
        async fn list_handles(&self, _: Option<&str>, _: u32) -> AppResult<Vec<String>> {
            Ok(Vec::new())
        }
        async fn health_check(&self) -> AppResult<bool> {
            Ok(true)
        }
    }

    fn service(fx: &Fixture) -> AccessService {
        AccessService::new(
            &fx.config,
            fx.cache.clone(),
            fx.store(),
            fx.notifier(),
            info_span!("warden", service = "test"),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_store_times_out_as_dependency() {
        let fx = Fixture::new();
        let svc = AccessService::new(
            &fx.config,
            fx.cache.clone(),
            Arc::new(StalledStore),
            fx.notifier(),
            Span::none(),
        )
        .unwrap();

        let err = svc.login("alice", "CorrectPass1!").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Dependency);
        let err = svc.request_reset("alice@example.com").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Dependency);
    }

    #[tokio::test]
    async fn test_login_then_authorize_header() {
        let fx = Fixture::new();
        fx.add_principal("alice", "alice@example.com", "CorrectPass1!");
        let svc = service(&fx);

        let outcome = svc.login("alice", "CorrectPass1!").await.unwrap();
        assert_eq!(outcome.username, "alice");

        let header = format!("Bearer {}", outcome.tokens.access.token);
        let principal = svc.authorize(Some(&header)).await.unwrap();
        assert_eq!(principal.id, outcome.principal_id);
        assert_eq!(
            fx.cache.get(&keys::api_calls(principal.id)).await.unwrap().as_deref(),
            Some("1")
        );

        assert_eq!(
            svc.authorize(None).await.unwrap_err().kind,
            ErrorKind::Authentication
        );
    }

    #[tokio::test]
    async fn test_rejects_invalid_config() {
        let mut fx = Fixture::new();
        fx.config.auth.jwt_secret = String::new();
        let err = AccessService::new(
            &fx.config,
            fx.cache.clone(),
            fx.store(),
            fx.notifier(),
            Span::none(),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_health_reports_store_failure() {
        let fx = Fixture::new();
        let svc = service(&fx);
        assert!(svc.health().await.is_healthy());

        fx.store.set_fail_reads(true);
        let status = svc.health().await;
        assert!(status.cache);
        assert!(!status.store);
        assert!(!status.is_healthy());
    }
}
