//! # warden-database
//!
//! PostgreSQL connection management, the principal and permission
//! repositories, and the [`PrincipalStore`](warden_core::traits::PrincipalStore)
//! implementations consumed by the access components.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{MemoryPrincipalStore, PgPrincipalStore};
