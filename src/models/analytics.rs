//! Analytics models
//!
//! Lightweight event log plus the aggregated summary shown on the creator
//! dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded platform event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    /// Unique identifier (UUID)
    pub id: String,
    /// Acting user, when known
    pub user_id: Option<i64>,
    /// Event type, e.g. "login", "view", "like"
    pub event_type: String,
    /// Free-form detail, usually the affected content id or title
    pub detail: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl AnalyticsEvent {
    /// Create a new event with a fresh UUID
    pub fn new(user_id: Option<i64>, event_type: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            event_type: event_type.into(),
            detail: None,
            created_at: Utc::now(),
        }
    }

    /// Attach a detail string
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Aggregated per-author statistics for the creator dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatorSummary {
    /// Total views across the author's content
    pub total_views: i64,
    /// Total likes across the author's content
    pub total_likes: i64,
    /// Number of blog posts
    pub blog_count: i64,
    /// Number of case studies
    pub case_study_count: i64,
}

/// Platform-wide counts for the admin overview
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformOverview {
    /// Total registered users
    pub user_count: i64,
    /// Active (non-deactivated) users
    pub active_user_count: i64,
    /// Total content items
    pub content_count: i64,
    /// Total comments
    pub comment_count: i64,
    /// Total likes
    pub like_count: i64,
}
