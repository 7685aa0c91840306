//! Outbound user notifications, consumed by an external collaborator.
//! Best-effort: delivery failure is logged, never propagated.

use serde::{Deserialize, Serialize};

use crate::domain::NotificationSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: u64,
    pub message: String,
    pub priority: Priority,
}

impl Notification {
    pub fn new(user_id: u64, message: impl Into<String>, priority: Priority) -> Self {
        Self {
            user_id,
            message: message.into(),
            priority,
        }
    }
}

/// Sink that emits notifications into the tracing pipeline.
#[derive(Default, Debug)]
pub struct LogNotifier {}

impl NotificationSink for LogNotifier {
    fn notify(&self, notification: Notification) {
        tracing::info!(
            user_id = notification.user_id,
            priority = ?notification.priority,
            message = %notification.message,
            "notification"
        );
    }
}
