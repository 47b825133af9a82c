//! Service identity configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Service-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Name recorded on the root logging span.
    #[serde(default = "default_name")]
    pub name: String,
    /// Upper bound for a single caller-facing operation, in milliseconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_ms: u64,
}

impl ServiceConfig {
    /// The request deadline as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            request_timeout_ms: default_timeout(),
        }
    }
}

fn default_name() -> String {
    "user-service".to_string()
}

fn default_timeout() -> u64 {
    5000
}
