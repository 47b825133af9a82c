//! Credential verification with attempt-based lockout.

pub mod verifier;

pub use verifier::CredentialVerifier;
