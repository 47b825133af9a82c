//! HS384 token signing and verification.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::types::{PrincipalId, TokenKind};

use super::claims::Claims;
use super::error::TokenError;

/// Signs and verifies bearer tokens with a server-held symmetric secret.
#[derive(Clone)]
pub struct TokenCodec {
    /// HMAC key for signing.
    encoding_key: EncodingKey,
    /// HMAC key for verification.
    decoding_key: DecodingKey,
    /// Validation rules applied on decode.
    validation: Validation,
    /// Access token lifetime.
    access_ttl: Duration,
    /// Refresh token lifetime.
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Signing algorithm for every token.
    pub const ALGORITHM: Algorithm = Algorithm::HS384;

    /// Creates a codec from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Self::ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 5; // clock skew, seconds

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            access_ttl: Duration::from_secs(config.access_ttl_minutes * 60),
            refresh_ttl: Duration::from_secs(config.refresh_ttl_hours * 3600),
        }
    }

    /// Lifetime of tokens of `kind`.
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Signs a fresh token of `kind` for `subject`.
    pub fn encode(&self, subject: PrincipalId, kind: TokenKind) -> Result<(String, Claims), AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.0,
            iat: now,
            exp: now + self.ttl(kind).as_secs() as i64,
            jti: Uuid::new_v4().to_string(),
            typ: kind,
        };

        let token = encode(&Header::new(Self::ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode {kind} token: {e}")))?;

        Ok((token, claims))
    }

    /// Verifies signature and expiry, then requires the token to be of `expected` kind.
    pub fn decode(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;

        if claims.typ != expected {
            return Err(TokenError::WrongKind {
                expected,
                found: claims.typ,
            });
        }

        Ok(claims)
    }
}
