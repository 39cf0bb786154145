//! Comment and like models
//!
//! Comments and likes both reference a content item by id plus the kind
//! tag, so either kind of content can receive engagement through the same
//! tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ContentKind;

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier (UUID)
    pub id: String,
    /// Content item this comment belongs to
    pub content_id: String,
    /// Kind of the referenced content item
    pub kind: ContentKind,
    /// Commenting user id
    pub user_id: i64,
    /// Comment text (sanitized)
    pub body: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Comment joined with the commenter's username for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentWithAuthor {
    /// The comment itself
    #[serde(flatten)]
    pub comment: Comment,
    /// Username of the commenter
    pub username: String,
}

/// Input for creating a new comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentInput {
    /// Content item id
    pub content_id: String,
    /// Kind of the referenced content item
    pub kind: ContentKind,
    /// Commenting user id
    pub user_id: i64,
    /// Comment text
    pub body: String,
}

/// Like entity, unique per user and content item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    /// Unique identifier (UUID)
    pub id: String,
    /// Content item this like belongs to
    pub content_id: String,
    /// Kind of the referenced content item
    pub kind: ContentKind,
    /// Liking user id
    pub user_id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
