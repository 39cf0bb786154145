//! Comment and like repositories
//!
//! Engagement rows for content items. Likes are unique per (user,
//! content item) which the database enforces; the repository surfaces the
//! conflict as a false return instead of an error.

use crate::db::DbPool;
use crate::models::{Comment, CommentWithAuthor, ContentKind, Like};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a new comment
    async fn create(&self, comment: &Comment) -> Result<Comment>;

    /// Get comment by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Comment>>;

    /// List comments on a content item with author usernames, oldest first
    async fn list_by_content(&self, content_id: &str) -> Result<Vec<CommentWithAuthor>>;

    /// Delete a comment. Returns true when a row was deleted.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Count comments on a content item
    async fn count_by_content(&self, content_id: &str) -> Result<i64>;

    /// Count all comments
    async fn count(&self) -> Result<i64>;
}

/// Like repository trait
#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Record a like. Returns false when the user already liked the item.
    async fn insert(&self, like: &Like) -> Result<bool>;

    /// Whether a user has liked a content item
    async fn has_liked(&self, user_id: i64, content_id: &str) -> Result<bool>;

    /// Remove a user's like. Returns true when a row was deleted.
    async fn delete_by_user_content(&self, user_id: i64, content_id: &str) -> Result<bool>;

    /// Count likes on a content item
    async fn count_by_content(&self, content_id: &str) -> Result<i64>;

    /// Count all likes
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: DbPool,
}

impl SqlxCommentRepository {
    /// Create a new SQLx comment repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_comment(row: &SqliteRow) -> Result<Comment> {
    let kind_str: String = row.get("kind");
    let kind = ContentKind::from_str(&kind_str)
        .ok_or_else(|| anyhow!("Unknown content kind: {}", kind_str))?;

    Ok(Comment {
        id: row.get("id"),
        content_id: row.get("content_id"),
        kind,
        user_id: row.get("user_id"),
        body: row.get("body"),
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, comment: &Comment) -> Result<Comment> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, content_id, kind, user_id, body, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.content_id)
        .bind(comment.kind.as_str())
        .bind(comment.user_id)
        .bind(&comment.body)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create comment")?;

        Ok(comment.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Comment>> {
        let row = sqlx::query(
            "SELECT id, content_id, kind, user_id, body, created_at FROM comments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get comment by ID")?;

        row.as_ref().map(row_to_comment).transpose()
    }

    async fn list_by_content(&self, content_id: &str) -> Result<Vec<CommentWithAuthor>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.content_id, c.kind, c.user_id, c.body, c.created_at, u.username
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.content_id = ?
            ORDER BY c.created_at
            "#,
        )
        .bind(content_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list comments by content")?;

        rows.iter()
            .map(|row| {
                Ok(CommentWithAuthor {
                    comment: row_to_comment(row)?,
                    username: row.get("username"),
                })
            })
            .collect()
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete comment")?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_by_content(&self, content_id: &str) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE content_id = ?")
            .bind(content_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count comments by content")
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count comments")
    }
}

/// SQLx-based like repository implementation
pub struct SqlxLikeRepository {
    pool: DbPool,
}

impl SqlxLikeRepository {
    /// Create a new SQLx like repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn LikeRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl LikeRepository for SqlxLikeRepository {
    async fn insert(&self, like: &Like) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO likes (id, content_id, kind, user_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&like.id)
        .bind(&like.content_id)
        .bind(like.kind.as_str())
        .bind(like.user_id)
        .bind(like.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert like")?;

        Ok(result.rows_affected() > 0)
    }

    async fn has_liked(&self, user_id: i64, content_id: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM likes WHERE user_id = ? AND content_id = ?",
        )
        .bind(user_id)
        .bind(content_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check like")?;

        Ok(count > 0)
    }

    async fn delete_by_user_content(&self, user_id: i64, content_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = ? AND content_id = ?")
            .bind(user_id)
            .bind(content_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete like")?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_by_content(&self, content_id: &str) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE content_id = ?")
            .bind(content_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count likes by content")
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM likes")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count likes")
    }
}
