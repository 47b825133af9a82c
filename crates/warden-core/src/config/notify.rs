//! Notification channel configuration.

use serde::{Deserialize, Serialize};

/// Where notification events are published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Publisher type: `"memory"` or `"redis"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Redis URL used by the `redis` publisher.
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    /// Channel (topic) the events are published to.
    #[serde(default = "default_channel")]
    pub channel: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            redis_url: default_redis_url(),
            channel: default_channel(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_channel() -> String {
    "email-service".to_string()
}
