//! [`PrincipalStore`](warden_core::traits::PrincipalStore) implementations.

pub mod memory;
pub mod postgres;

pub use memory::MemoryPrincipalStore;
pub use postgres::PgPrincipalStore;
