//! Events emitted by the access-control components.

pub mod notification;

pub use notification::NotificationEvent;
