//! Like service
//!
//! Likes are unique per user and content item. The content author is
//! notified of new likes unless they liked their own item or opted out.

use crate::db::repositories::{ContentRepository, LikeRepository, NotificationRepository, UserRepository};
use crate::models::{Like, Notification, User};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Error types for like service operations
#[derive(Debug, thiserror::Error)]
pub enum LikeServiceError {
    /// Content item not found
    #[error("Content not found")]
    NotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Engagement counts for a content item as seen by one viewer
#[derive(Debug, Clone, serde::Serialize)]
pub struct LikeStatus {
    /// Total likes on the item
    pub like_count: i64,
    /// Whether the viewer has liked the item
    pub liked_by_viewer: bool,
}

/// Like service
pub struct LikeService {
    like_repo: Arc<dyn LikeRepository>,
    content_repo: Arc<dyn ContentRepository>,
    user_repo: Arc<dyn UserRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
}

impl LikeService {
    /// Create a new like service
    pub fn new(
        like_repo: Arc<dyn LikeRepository>,
        content_repo: Arc<dyn ContentRepository>,
        user_repo: Arc<dyn UserRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
    ) -> Self {
        Self {
            like_repo,
            content_repo,
            user_repo,
            notification_repo,
        }
    }

    /// Like a published content item.
    ///
    /// Returns false when the user had already liked it.
    pub async fn like(&self, content_id: &str, actor: &User) -> Result<bool, LikeServiceError> {
        let item = self
            .content_repo
            .get_by_id(content_id)
            .await
            .context("Failed to get content item")?
            .ok_or(LikeServiceError::NotFound)?;

        if !item.is_published && !actor.can_edit(item.author_id) {
            return Err(LikeServiceError::NotFound);
        }

        let like = Like {
            id: Uuid::new_v4().to_string(),
            content_id: item.id.clone(),
            kind: item.kind,
            user_id: actor.id,
            created_at: Utc::now(),
        };

        let inserted = self
            .like_repo
            .insert(&like)
            .await
            .context("Failed to insert like")?;

        if inserted && item.author_id != actor.id {
            if let Some(author) = self
                .user_repo
                .get_by_id(item.author_id)
                .await
                .context("Failed to get content author")?
            {
                if author.profile.notify_likes {
                    let notification = Notification::new(
                        author.id,
                        format!("{} liked '{}'", actor.username, item.title),
                    );
                    self.notification_repo
                        .create(&notification)
                        .await
                        .context("Failed to create like notification")?;
                }
            }
        }

        Ok(inserted)
    }

    /// Remove a like. Returns false when there was nothing to remove.
    pub async fn unlike(&self, content_id: &str, actor: &User) -> Result<bool, LikeServiceError> {
        Ok(self
            .like_repo
            .delete_by_user_content(actor.id, content_id)
            .await
            .context("Failed to delete like")?)
    }

    /// Like count plus whether the viewer has liked the item
    pub async fn status(
        &self,
        content_id: &str,
        viewer: Option<&User>,
    ) -> Result<LikeStatus, LikeServiceError> {
        let like_count = self
            .like_repo
            .count_by_content(content_id)
            .await
            .context("Failed to count likes")?;

        let liked_by_viewer = match viewer {
            Some(user) => self
                .like_repo
                .has_liked(user.id, content_id)
                .await
                .context("Failed to check like")?,
            None => false,
        };

        Ok(LikeStatus {
            like_count,
            liked_by_viewer,
        })
    }
}
