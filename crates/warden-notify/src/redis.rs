//! Redis `PUBLISH` notification publisher.

use async_trait::async_trait;
use tracing::debug;

use warden_cache::redis::RedisClient;
use warden_core::error::{AppError, ErrorKind};
use warden_core::events::NotificationEvent;
use warden_core::result::AppResult;
use warden_core::traits::NotificationPublisher;

/// Publishes events as JSON to a Redis channel.
#[derive(Debug, Clone)]
pub struct RedisNotificationPublisher {
    client: RedisClient,
    channel: String,
}

impl RedisNotificationPublisher {
    /// Connect to Redis and publish to `channel`.
    pub async fn connect(url: &str, channel: &str) -> AppResult<Self> {
        let client = RedisClient::connect_url(url, "").await?;
        Ok(Self {
            client,
            channel: channel.to_string(),
        })
    }
}

#[async_trait]
impl NotificationPublisher for RedisNotificationPublisher {
    async fn publish(&self, event: &NotificationEvent) -> AppResult<()> {
        event.validate()?;
        let payload = serde_json::to_string(event)?;
        let mut conn = self.client.conn_mut();

        let receivers: i64 = redis::cmd("PUBLISH")
            .arg(&self.channel)
            .arg(payload)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Dependency, format!("Redis PUBLISH failed: {e}"), e)
            })?;

        debug!(
            event_id = %event.event_id,
            action = %event.action,
            channel = %self.channel,
            receivers,
            "Notification published"
        );
        Ok(())
    }
}
