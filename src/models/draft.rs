//! Draft model
//!
//! Drafts hold unpublished work as a JSON payload. Publishing a draft
//! creates a real content item and records its id back on the draft row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ContentKind;

/// Draft entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    /// Unique identifier (UUID)
    pub id: String,
    /// Owning user id
    pub user_id: i64,
    /// Kind of content this draft will become
    pub kind: ContentKind,
    /// Draft payload (title, body fields, tags) as JSON
    pub payload: serde_json::Value,
    /// Content item created from this draft, if published
    pub content_id: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Draft {
    /// Whether this draft has been published
    pub fn is_published(&self) -> bool {
        self.content_id.is_some()
    }
}

/// Input for saving a draft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveDraftInput {
    /// Existing draft id for overwrites; a new id is assigned when absent
    pub id: Option<String>,
    /// Owning user id
    pub user_id: i64,
    /// Kind of content this draft will become
    pub kind: ContentKind,
    /// Draft payload as JSON
    pub payload: serde_json::Value,
}
