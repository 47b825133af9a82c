//! Notification channel trait.

use async_trait::async_trait;

use crate::events::NotificationEvent;
use crate::result::AppResult;

/// Fire-and-forget publisher for notification events.
///
/// Delivery failures surface as `ErrorKind::Dependency`; publishers do not retry.
#[async_trait]
pub trait NotificationPublisher: Send + Sync + std::fmt::Debug + 'static {
    /// Publish a single event.
    async fn publish(&self, event: &NotificationEvent) -> AppResult<()>;
}
