//! In-memory notification publisher for single-node runs and tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};
use tracing::debug;

use warden_core::error::AppError;
use warden_core::events::NotificationEvent;
use warden_core::result::AppResult;
use warden_core::traits::NotificationPublisher;

/// Broadcasts events to in-process subscribers and records every published event.
#[derive(Debug, Clone)]
pub struct MemoryNotificationPublisher {
    tx: broadcast::Sender<NotificationEvent>,
    history: Arc<RwLock<Vec<NotificationEvent>>>,
    fail: Arc<AtomicBool>,
}

impl MemoryNotificationPublisher {
    /// Create a publisher whose subscribers buffer up to `buffer_size` events.
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer_size.max(1));
        Self {
            tx,
            history: Arc::new(RwLock::new(Vec::new())),
            fail: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.tx.subscribe()
    }

    /// Every event published so far, oldest first.
    pub async fn history(&self) -> Vec<NotificationEvent> {
        self.history.read().await.clone()
    }

    /// Published events with the given action.
    pub async fn with_action(&self, action: &str) -> Vec<NotificationEvent> {
        self.history
            .read()
            .await
            .iter()
            .filter(|event| event.action == action)
            .cloned()
            .collect()
    }

    /// Make subsequent publishes fail as if the channel were down.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl Default for MemoryNotificationPublisher {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl NotificationPublisher for MemoryNotificationPublisher {
    async fn publish(&self, event: &NotificationEvent) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::dependency("notification channel unavailable"));
        }
        event.validate()?;
        self.history.write().await.push(event.clone());
        // No subscribers is not a failure.
        let receivers = self.tx.send(event.clone()).unwrap_or(0);
        debug!(event_id = %event.event_id, action = %event.action, receivers, "Notification published");
        Ok(())
    }
}
