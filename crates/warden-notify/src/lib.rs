//! # warden-notify
//!
//! Publishers for [`NotificationEvent`](warden_core::events::NotificationEvent)s.
//!
//! - **redis**: `PUBLISH` of the JSON payload to a configured channel, for a
//!   separate delivery service to consume
//! - **memory**: in-process broadcast that also keeps a history, used for
//!   local runs and tests

pub mod memory;
pub mod redis;

use std::sync::Arc;

use tracing::info;

use warden_core::config::NotificationConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::NotificationPublisher;

pub use self::memory::MemoryNotificationPublisher;
pub use self::redis::RedisNotificationPublisher;

/// Build the configured publisher.
pub async fn build_publisher(config: &NotificationConfig) -> AppResult<Arc<dyn NotificationPublisher>> {
    match config.provider.as_str() {
        "redis" => {
            info!(channel = %config.channel, "Initializing Redis notification publisher");
            let publisher =
                RedisNotificationPublisher::connect(&config.redis_url, &config.channel).await?;
            Ok(Arc::new(publisher))
        }
        "memory" => {
            info!("Initializing in-memory notification publisher");
            Ok(Arc::new(MemoryNotificationPublisher::new(256)))
        }
        other => Err(AppError::configuration(format!(
            "Unknown notification provider: '{other}'. Supported: memory, redis"
        ))),
    }
}
