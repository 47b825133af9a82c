//! Collaborator traits consumed by the access-control components.
//!
//! Concrete implementations live in `warden-cache`, `warden-database` and
//! `warden-notify`; the components only ever see these seams.

pub mod cache;
pub mod notifier;
pub mod store;

pub use cache::CacheProvider;
pub use notifier::NotificationPublisher;
pub use store::PrincipalStore;
