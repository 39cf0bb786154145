//! Notification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notification entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier (UUID)
    pub id: String,
    /// Recipient user id
    pub user_id: i64,
    /// Display message
    pub message: String,
    /// Whether the recipient has seen it
    pub is_read: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Create a new unread notification with a fresh UUID
    pub fn new(user_id: i64, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            message: message.into(),
            is_read: false,
            created_at: Utc::now(),
        }
    }
}
