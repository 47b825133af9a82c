//! # warden-core
//!
//! Core crate for Warden. Contains the configuration schema, the shared
//! principal and token types, the collaborator traits (cache, principal
//! store, notification publisher), the notification event payload, and
//! the unified error system.
//!
//! This crate has **no** internal dependencies on other Warden crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
