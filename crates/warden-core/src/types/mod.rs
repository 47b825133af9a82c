//! Shared domain types used across all Warden crates.

pub mod id;
pub mod principal;
pub mod token;

pub use id::PrincipalId;
pub use principal::Principal;
pub use token::TokenKind;
