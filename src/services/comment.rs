//! Comment service
//!
//! Comments on published content. The content author is notified of new
//! comments unless they wrote the comment themselves or opted out.

use crate::db::repositories::{
    CommentRepository, ContentRepository, NotificationRepository, UserRepository,
};
use crate::models::{Comment, CommentWithAuthor, CreateCommentInput, Notification, User};
use crate::services::sanitize::sanitize_text;
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

const MAX_COMMENT_LENGTH: usize = 2000;

/// Error types for comment service operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Content item or comment not found
    #[error("Not found")]
    NotFound,

    /// Actor is not allowed to perform the operation
    #[error("Permission denied")]
    PermissionDenied,

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Comment service
pub struct CommentService {
    comment_repo: Arc<dyn CommentRepository>,
    content_repo: Arc<dyn ContentRepository>,
    user_repo: Arc<dyn UserRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
}

impl CommentService {
    /// Create a new comment service
    pub fn new(
        comment_repo: Arc<dyn CommentRepository>,
        content_repo: Arc<dyn ContentRepository>,
        user_repo: Arc<dyn UserRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
    ) -> Self {
        Self {
            comment_repo,
            content_repo,
            user_repo,
            notification_repo,
        }
    }

    /// Add a comment to a published content item
    pub async fn add(
        &self,
        input: CreateCommentInput,
        actor: &User,
    ) -> Result<Comment, CommentServiceError> {
        if input.user_id != actor.id {
            return Err(CommentServiceError::PermissionDenied);
        }

        let body = sanitize_text(input.body.trim());
        if body.is_empty() {
            return Err(CommentServiceError::ValidationError(
                "Comment cannot be empty".to_string(),
            ));
        }
        if body.len() > MAX_COMMENT_LENGTH {
            return Err(CommentServiceError::ValidationError(format!(
                "Comment cannot exceed {} characters",
                MAX_COMMENT_LENGTH
            )));
        }

        let item = self
            .content_repo
            .get_by_id(&input.content_id)
            .await
            .context("Failed to get content item")?
            .ok_or(CommentServiceError::NotFound)?;

        if !item.is_published && !actor.can_edit(item.author_id) {
            return Err(CommentServiceError::NotFound);
        }

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            content_id: item.id.clone(),
            kind: item.kind,
            user_id: actor.id,
            body,
            created_at: Utc::now(),
        };

        let created = self
            .comment_repo
            .create(&comment)
            .await
            .context("Failed to create comment")?;

        if item.author_id != actor.id {
            self.notify_author(item.author_id, &actor.username, &item.title)
                .await?;
        }

        Ok(created)
    }

    /// List comments on a content item with author usernames
    pub async fn list(&self, content_id: &str) -> Result<Vec<CommentWithAuthor>, CommentServiceError> {
        if self
            .content_repo
            .get_by_id(content_id)
            .await
            .context("Failed to get content item")?
            .is_none()
        {
            return Err(CommentServiceError::NotFound);
        }

        Ok(self
            .comment_repo
            .list_by_content(content_id)
            .await
            .context("Failed to list comments")?)
    }

    /// Delete a comment.
    ///
    /// The comment author, the content author and admins may delete.
    pub async fn delete(&self, comment_id: &str, actor: &User) -> Result<(), CommentServiceError> {
        let comment = self
            .comment_repo
            .get_by_id(comment_id)
            .await
            .context("Failed to get comment")?
            .ok_or(CommentServiceError::NotFound)?;

        let content_author_id = self
            .content_repo
            .get_by_id(&comment.content_id)
            .await
            .context("Failed to get content item")?
            .map(|item| item.author_id);

        let allowed = comment.user_id == actor.id
            || actor.is_admin
            || content_author_id == Some(actor.id);
        if !allowed {
            return Err(CommentServiceError::PermissionDenied);
        }

        self.comment_repo
            .delete(comment_id)
            .await
            .context("Failed to delete comment")?;

        Ok(())
    }

    /// Count comments on a content item
    pub async fn count(&self, content_id: &str) -> Result<i64, CommentServiceError> {
        Ok(self
            .comment_repo
            .count_by_content(content_id)
            .await
            .context("Failed to count comments")?)
    }

    async fn notify_author(
        &self,
        author_id: i64,
        commenter: &str,
        title: &str,
    ) -> Result<(), CommentServiceError> {
        let author = self
            .user_repo
            .get_by_id(author_id)
            .await
            .context("Failed to get content author")?;

        if let Some(author) = author {
            if author.profile.notify_comments {
                let notification = Notification::new(
                    author.id,
                    format!("{} commented on '{}'", commenter, title),
                );
                self.notification_repo
                    .create(&notification)
                    .await
                    .context("Failed to create comment notification")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxCommentRepository, SqlxContentRepository, SqlxNotificationRepository,
        SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations, DbPool};
    use crate::models::{ContentItem, ContentKind, CreateUserInput};

    async fn setup() -> (DbPool, CommentService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let service = CommentService::new(
            SqlxCommentRepository::boxed(pool.clone()),
            SqlxContentRepository::boxed(pool.clone()),
            SqlxUserRepository::boxed(pool.clone()),
            SqlxNotificationRepository::boxed(pool.clone()),
        );
        (pool, service)
    }

    async fn create_user(pool: &DbPool, username: &str, admin: bool) -> User {
        let repo = SqlxUserRepository::new(pool.clone());
        let mut input = CreateUserInput::new(
            username,
            format!("{}@example.com", username),
            "$argon2id$hash",
        );
        if admin {
            input = input.with_admin();
        }
        repo.create(&input).await.expect("Failed to create user")
    }

    async fn seed_content(pool: &DbPool, author_id: i64, published: bool) -> ContentItem {
        let now = Utc::now();
        let item = ContentItem {
            id: Uuid::new_v4().to_string(),
            kind: ContentKind::Blog,
            author_id,
            title: "Post".to_string(),
            body: Some("body".to_string()),
            problem: None,
            solution: None,
            results: None,
            font: None,
            views: 0,
            is_published: published,
            public_link: String::new(),
            created_at: now,
            updated_at: now,
        };
        SqlxContentRepository::new(pool.clone())
            .create(&item)
            .await
            .expect("Failed to seed content")
    }

    fn comment_input(content_id: &str, user_id: i64, body: &str) -> CreateCommentInput {
        CreateCommentInput {
            content_id: content_id.to_string(),
            kind: ContentKind::Blog,
            user_id,
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_comment_and_notify_author() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "author", false).await;
        let reader = create_user(&pool, "reader", false).await;
        let item = seed_content(&pool, author.id, true).await;

        let comment = service
            .add(comment_input(&item.id, reader.id, "Great post!"), &reader)
            .await
            .unwrap();
        assert_eq!(comment.body, "Great post!");

        let notified: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = ?")
                .bind(author.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(notified, 1);
    }

    #[tokio::test]
    async fn test_self_comment_does_not_notify() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "author", false).await;
        let item = seed_content(&pool, author.id, true).await;

        service
            .add(comment_input(&item.id, author.id, "Note to self"), &author)
            .await
            .unwrap();

        let notified: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(notified, 0);
    }

    #[tokio::test]
    async fn test_comment_body_sanitized_and_validated() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "author", false).await;
        let item = seed_content(&pool, author.id, true).await;

        let comment = service
            .add(
                comment_input(&item.id, author.id, "hi <img src=x onerror=alert(1)>"),
                &author,
            )
            .await
            .unwrap();
        assert!(!comment.body.contains('<'));

        let empty = service
            .add(comment_input(&item.id, author.id, "   "), &author)
            .await;
        assert!(matches!(
            empty,
            Err(CommentServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_cannot_comment_on_unpublished_content() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "author", false).await;
        let reader = create_user(&pool, "reader", false).await;
        let item = seed_content(&pool, author.id, false).await;

        let result = service
            .add(comment_input(&item.id, reader.id, "sneaky"), &reader)
            .await;
        assert!(matches!(result, Err(CommentServiceError::NotFound)));

        // The author can still comment on their own draft
        assert!(service
            .add(comment_input(&item.id, author.id, "todo"), &author)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_delete_permissions() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "author", false).await;
        let reader = create_user(&pool, "reader", false).await;
        let stranger = create_user(&pool, "stranger", false).await;
        let item = seed_content(&pool, author.id, true).await;

        let comment = service
            .add(comment_input(&item.id, reader.id, "hmm"), &reader)
            .await
            .unwrap();

        assert!(matches!(
            service.delete(&comment.id, &stranger).await,
            Err(CommentServiceError::PermissionDenied)
        ));

        // The content author can moderate comments on their item
        service.delete(&comment.id, &author).await.unwrap();
        assert_eq!(service.count(&item.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_missing_content() {
        let (_pool, service) = setup().await;
        assert!(matches!(
            service.list("no-such-id").await,
            Err(CommentServiceError::NotFound)
        ));
    }
}
