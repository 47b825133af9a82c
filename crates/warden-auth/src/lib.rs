//! # warden-auth
//!
//! The session and access-control components of Warden.
//!
//! ## Modules
//!
//! - `rate`: per-key counters with a TTL window (login lockout, API limits)
//! - `password`: Argon2id hashing and new-password policy
//! - `credential`: credential verification with attempt-based lockout
//! - `jwt`: typed claims and the HS384 token codec
//! - `token`: single-active-session token issuance, rotation and revocation
//! - `reset`: the single-use password reset protocol
//! - `rbac`: cached permission checks
//! - `existence`: probabilistic handle existence with a confirming cache
//! - `service`: the [`AccessService`] facade bounding every operation

pub mod credential;
pub mod existence;
pub mod jwt;
pub mod password;
pub mod rate;
pub mod rbac;
pub mod reset;
pub mod service;
pub mod token;

pub use credential::CredentialVerifier;
pub use existence::{BloomFilter, ExistenceIndex, MembershipFilter};
pub use jwt::{Claims, TokenCodec, TokenError};
pub use password::{PasswordHasher, PasswordPolicy};
pub use rate::{RateGuard, RatePolicy};
pub use rbac::PermissionAuthorizer;
pub use reset::{PasswordResetFlow, ResetState};
pub use service::{AccessService, HealthStatus, LoginOutcome};
pub use token::{IssuedToken, TokenPair, TokenService, extract_bearer};

#[cfg(test)]
pub(crate) mod testing;
