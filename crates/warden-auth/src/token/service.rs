//! Single-active-session token service.
//!
//! The cache holds exactly one access token and one refresh token per
//! principal handle. Issuing overwrites both, so whichever write lands last
//! is the only session that still authorizes. A presented token must equal
//! the stored one byte for byte.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use warden_cache::{CacheManager, keys};
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::{CacheProvider, PrincipalStore};
use warden_core::types::{Principal, TokenKind};

use crate::jwt::{Claims, TokenCodec};

/// A signed token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    /// The opaque bearer value.
    pub token: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Result of a successful token pair generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access: IssuedToken,
    /// Long-lived refresh token.
    pub refresh: IssuedToken,
}

/// Issues, validates, rotates and revokes bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    codec: TokenCodec,
    cache: Arc<CacheManager>,
    store: Arc<dyn PrincipalStore>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a token service.
    pub fn new(codec: TokenCodec, cache: Arc<CacheManager>, store: Arc<dyn PrincipalStore>) -> Self {
        Self {
            codec,
            cache,
            store,
        }
    }

    /// Signs a token of `kind` and makes it the principal's only live one.
    async fn issue_one(&self, principal: &Principal, kind: TokenKind) -> AppResult<IssuedToken> {
        let (token, claims) = self.codec.encode(principal.id, kind)?;
        self.cache
            .set(
                &keys::token(kind, &principal.username),
                &token,
                self.codec.ttl(kind),
            )
            .await?;
        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
        })
    }

    /// Issue a fresh access and refresh token, replacing any previous session.
    pub async fn issue(&self, principal: &Principal) -> AppResult<TokenPair> {
        let access = self.issue_one(principal, TokenKind::Access).await?;
        let refresh = self.issue_one(principal, TokenKind::Refresh).await?;
        info!(username = %principal.username, principal_id = %principal.id, "Token pair issued");
        Ok(TokenPair { access, refresh })
    }

    /// Decode `token` as `kind` and resolve its subject.
    ///
    /// Returns `Ok(None)` when the subject no longer exists.
    async fn resolve(&self, token: &str, kind: TokenKind) -> AppResult<(Claims, Option<Principal>)> {
        if token.trim().is_empty() {
            return Err(AppError::validation(format!("{kind} token is required")));
        }
        let claims = self.codec.decode(token, kind).map_err(|e| {
            debug!(kind = %kind, reason = %e, "Token rejected");
            AppError::from(e)
        })?;
        let principal = self.store.find_by_id(claims.principal_id()).await?;
        Ok((claims, principal))
    }

    /// Whether `token` is the one currently stored for `(kind, handle)`.
    async fn is_current(&self, kind: TokenKind, handle: &str, token: &str) -> AppResult<bool> {
        let stored = self.cache.get(&keys::token(kind, handle)).await?;
        Ok(stored.as_deref() == Some(token))
    }

    /// Validate an access token and return its principal.
    ///
    /// Fails closed with `Authentication` for any decode failure, an unknown
    /// subject, or a token that is no longer the stored one.
    pub async fn authorize(&self, token: &str) -> AppResult<Principal> {
        let (_, principal) = self.resolve(token, TokenKind::Access).await?;
        let principal =
            principal.ok_or_else(|| AppError::authentication("Invalid or expired token"))?;

        if !self
            .is_current(TokenKind::Access, &principal.username, token)
            .await?
        {
            debug!(username = %principal.username, "Access token superseded or revoked");
            return Err(AppError::authentication("Invalid or expired token"));
        }
        Ok(principal)
    }

    /// Exchange the current refresh token for a new access token.
    ///
    /// The refresh token itself is not rotated.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<IssuedToken> {
        let (_, principal) = self.resolve(refresh_token, TokenKind::Refresh).await?;
        let principal = principal.ok_or_else(|| AppError::not_found("Principal not found"))?;

        if !self
            .is_current(TokenKind::Refresh, &principal.username, refresh_token)
            .await?
        {
            warn!(username = %principal.username, "Superseded refresh token presented");
            return Err(AppError::authorization("Refresh token is no longer valid"));
        }

        let access = self.issue_one(&principal, TokenKind::Access).await?;
        info!(username = %principal.username, "Access token refreshed");
        Ok(access)
    }

    /// Revoke the current session. Both tokens must be the stored ones for
    /// the same principal; then both are deleted, forcing a new login.
    pub async fn revoke(&self, access_token: &str, refresh_token: &str) -> AppResult<()> {
        let (access_claims, principal) = self.resolve(access_token, TokenKind::Access).await?;
        let (refresh_claims, _) = self.resolve(refresh_token, TokenKind::Refresh).await?;

        if access_claims.sub != refresh_claims.sub {
            return Err(AppError::authentication(
                "Access and refresh tokens belong to different principals",
            ));
        }
        let principal = principal.ok_or_else(|| AppError::not_found("Principal not found"))?;
        let handle = principal.username.as_str();

        if !self.is_current(TokenKind::Access, handle, access_token).await? {
            return Err(AppError::authentication("Invalid or expired token"));
        }
        if !self
            .is_current(TokenKind::Refresh, handle, refresh_token)
            .await?
        {
            return Err(AppError::authorization("Refresh token is no longer valid"));
        }

        self.cache.delete(&keys::access_token(handle)).await?;
        self.cache.delete(&keys::refresh_token(handle)).await?;
        info!(username = %handle, "Session revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::Fixture;
    use warden_core::error::ErrorKind;

    fn service(fx: &Fixture) -> TokenService {
        TokenService::new(TokenCodec::new(&fx.config.auth), fx.cache.clone(), fx.store())
    }

    #[tokio::test]
    async fn test_issue_stores_both_tokens_with_ttls() {
        let fx = Fixture::new();
        let alice = fx.add_principal("alice", "alice@example.com", "CorrectPass1!");
        let tokens = service(&fx).issue(&alice).await.unwrap();

        let access = fx.cache.get("access_token:alice").await.unwrap();
        let refresh = fx.cache.get("refresh_token:alice").await.unwrap();
        assert_eq!(access.as_deref(), Some(tokens.access.token.as_str()));
        assert_eq!(refresh.as_deref(), Some(tokens.refresh.token.as_str()));

        let access_ttl = fx.cache.ttl("access_token:alice").await.unwrap().unwrap();
        let refresh_ttl = fx.cache.ttl("refresh_token:alice").await.unwrap().unwrap();
        assert!(access_ttl <= Duration::from_secs(15 * 60) && access_ttl > Duration::from_secs(14 * 60));
        assert!(refresh_ttl <= Duration::from_secs(4 * 3600) && refresh_ttl > Duration::from_secs(4 * 3600 - 60));
    }

    #[tokio::test]
    async fn test_authorize_accepts_current_token_only() {
        let fx = Fixture::new();
        let alice = fx.add_principal("alice", "alice@example.com", "CorrectPass1!");
        let svc = service(&fx);
        let first = svc.issue(&alice).await.unwrap();
        assert_eq!(svc.authorize(&first.access.token).await.unwrap().id, alice.id);

        let second = svc.issue(&alice).await.unwrap();
        let err = svc.authorize(&first.access.token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert!(svc.authorize(&second.access.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_authorize_rejects_refresh_token() {
        let fx = Fixture::new();
        let alice = fx.add_principal("alice", "alice@example.com", "CorrectPass1!");
        let svc = service(&fx);
        let tokens = svc.issue(&alice).await.unwrap();
        let err = svc.authorize(&tokens.refresh.token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_refresh_reissues_access_only() {
        let fx = Fixture::new();
        let alice = fx.add_principal("alice", "alice@example.com", "CorrectPass1!");
        let svc = service(&fx);
        let tokens = svc.issue(&alice).await.unwrap();

        let access = svc.refresh(&tokens.refresh.token).await.unwrap();
        assert_ne!(access.token, tokens.access.token);
        assert!(svc.authorize(&access.token).await.is_ok());
        assert!(svc.authorize(&tokens.access.token).await.is_err());
        // refresh token is not rotated
        assert!(svc.refresh(&tokens.refresh.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_superseded_refresh_is_forbidden() {
        let fx = Fixture::new();
        let alice = fx.add_principal("alice", "alice@example.com", "CorrectPass1!");
        let svc = service(&fx);
        let old = svc.issue(&alice).await.unwrap();
        svc.issue(&alice).await.unwrap();
        let err = svc.refresh(&old.refresh.token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_revoke_deletes_both() {
        let fx = Fixture::new();
        let alice = fx.add_principal("alice", "alice@example.com", "CorrectPass1!");
        let svc = service(&fx);
        let tokens = svc.issue(&alice).await.unwrap();
        svc.revoke(&tokens.access.token, &tokens.refresh.token)
            .await
            .unwrap();
        assert!(!fx.cache.exists("access_token:alice").await.unwrap());
        assert!(!fx.cache.exists("refresh_token:alice").await.unwrap());
        assert!(svc.authorize(&tokens.access.token).await.is_err());
    }

    #[tokio::test]
    async fn test_revoke_requires_same_principal_and_valid_tokens() {
        let fx = Fixture::new();
        let alice = fx.add_principal("alice", "alice@example.com", "CorrectPass1!");
        let bob = fx.add_principal("bob", "bob@example.com", "CorrectPass1!");
        let svc = service(&fx);
        let a = svc.issue(&alice).await.unwrap();
        let b = svc.issue(&bob).await.unwrap();

        let err = svc.revoke(&a.access.token, &b.refresh.token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);

        let err = svc.revoke("garbage", &a.refresh.token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        // nothing was partially revoked
        assert!(fx.cache.exists("refresh_token:alice").await.unwrap());

        let err = svc.revoke("", &a.refresh.token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
