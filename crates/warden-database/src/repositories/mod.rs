//! Repository implementations for the tables the access subsystem reads.

pub mod permission;
pub mod principal;

pub use permission::PermissionRepository;
pub use principal::PrincipalRepository;
