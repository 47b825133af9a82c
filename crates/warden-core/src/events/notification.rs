//! Notification events published to the delivery channel.
//!
//! Formatting and delivery are owned by a separate service; this crate only
//! produces the structured payload.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::result::AppResult;
use crate::types::Principal;
use crate::types::PrincipalId;

/// Channel type for email notifications.
pub const NOTIFICATION_TYPE_EMAIL: &str = "email";

/// Action of the lockout alert.
pub const ACTION_SECURITY: &str = "security";

/// Action of the password reset link.
pub const ACTION_PASSWORD_RESET: &str = "password_reset";

/// A structured notification addressed to a principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Unique event ID.
    pub event_id: Uuid,
    /// Recipient principal.
    pub user_id: PrincipalId,
    /// Delivery channel type (e.g. `"email"`).
    pub notification_type: String,
    /// What the notification is about.
    pub action: String,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Delivery address.
    pub target: String,
    /// Free-form payload for the formatter.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// When the event was produced.
    pub created_at: DateTime<Utc>,
}

impl NotificationEvent {
    /// Build an email event with a fresh ID and timestamp.
    pub fn email(
        principal: &Principal,
        action: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            user_id: principal.id,
            notification_type: NOTIFICATION_TYPE_EMAIL.to_string(),
            action: action.into(),
            title: title.into(),
            message: message.into(),
            target: principal.email.clone(),
            metadata: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Alert sent on every login attempt made while the principal is locked out.
    pub fn security_alert(principal: &Principal) -> Self {
        Self::email(
            principal,
            ACTION_SECURITY,
            "Verify is it you",
            "Someone tried to login to your account",
        )
    }

    /// Message carrying a password reset link.
    pub fn reset_link(principal: &Principal, link: impl Into<String>) -> Self {
        Self::email(
            principal,
            ACTION_PASSWORD_RESET,
            "Password Reset",
            "Use the link below to reset your password. It expires shortly.",
        )
        .with_metadata("link", link)
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Check that the event carries everything the delivery service requires.
    ///
    /// A missing field fails as `Dependency`, like an unreachable channel.
    pub fn validate(&self) -> AppResult<()> {
        let missing = if self.user_id.0 < 0 {
            "user_id"
        } else if self.notification_type.trim().is_empty() {
            "notification_type"
        } else if self.action.trim().is_empty() {
            "action"
        } else if self.message.trim().is_empty() {
            "message"
        } else if self.target.trim().is_empty() {
            "target"
        } else {
            return Ok(());
        };
        Err(AppError::dependency(format!(
            "Notification cannot be delivered: {missing} is required"
        )))
    }
}
