//! Notification repository

use crate::db::DbPool;
use crate::models::Notification;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;

/// Notification repository trait
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Create a new notification
    async fn create(&self, notification: &Notification) -> Result<Notification>;

    /// List a user's notifications, newest first
    async fn list_by_user(&self, user_id: i64, limit: i64) -> Result<Vec<Notification>>;

    /// Count a user's unread notifications
    async fn unread_count(&self, user_id: i64) -> Result<i64>;

    /// Mark one notification read. Returns true when a row was updated.
    async fn mark_read(&self, id: &str, user_id: i64) -> Result<bool>;

    /// Mark all of a user's notifications read, returning how many changed
    async fn mark_all_read(&self, user_id: i64) -> Result<i64>;
}

/// SQLx-based notification repository implementation
pub struct SqlxNotificationRepository {
    pool: DbPool,
}

impl SqlxNotificationRepository {
    /// Create a new SQLx notification repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn NotificationRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_notification(row: &SqliteRow) -> Notification {
    Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        message: row.get("message"),
        is_read: row.get::<i64, _>("is_read") != 0,
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl NotificationRepository for SqlxNotificationRepository {
    async fn create(&self, notification: &Notification) -> Result<Notification> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, message, is_read, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&notification.id)
        .bind(notification.user_id)
        .bind(&notification.message)
        .bind(notification.is_read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create notification")?;

        Ok(notification.clone())
    }

    async fn list_by_user(&self, user_id: i64, limit: i64) -> Result<Vec<Notification>> {
        let rows = sqlx::query(
            "SELECT id, user_id, message, is_read, created_at FROM notifications \
             WHERE user_id = ? ORDER BY created_at DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list notifications")?;

        Ok(rows.iter().map(row_to_notification).collect())
    }

    async fn unread_count(&self, user_id: i64) -> Result<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count unread notifications")
    }

    async fn mark_read(&self, id: &str, user_id: i64) -> Result<bool> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .context("Failed to mark notification read")?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, user_id: i64) -> Result<i64> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0")
                .bind(user_id)
                .execute(&self.pool)
                .await
                .context("Failed to mark notifications read")?;

        Ok(result.rows_affected() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> (DbPool, SqlxNotificationRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxNotificationRepository::new(pool.clone());
        (pool, repo)
    }

    async fn create_test_user(pool: &DbPool, id: i64) {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash) VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(format!("user{}", id))
        .bind(format!("user{}@example.com", id))
        .bind("hash")
        .execute(pool)
        .await
        .expect("Failed to create test user");
    }

    #[tokio::test]
    async fn test_create_and_list_notifications() {
        let (pool, repo) = setup_test_repo().await;
        create_test_user(&pool, 1).await;

        repo.create(&Notification::new(1, "alice published a new blog"))
            .await
            .unwrap();
        repo.create(&Notification::new(1, "bob commented on your post"))
            .await
            .unwrap();

        let list = repo.list_by_user(1, 50).await.unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|n| !n.is_read));
        assert_eq!(repo.unread_count(1).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_mark_read_is_scoped_to_user() {
        let (pool, repo) = setup_test_repo().await;
        create_test_user(&pool, 1).await;
        create_test_user(&pool, 2).await;

        let mine = Notification::new(1, "hello");
        repo.create(&mine).await.unwrap();

        // Another user cannot mark someone else's notification
        assert!(!repo.mark_read(&mine.id, 2).await.unwrap());
        assert!(repo.mark_read(&mine.id, 1).await.unwrap());
        assert_eq!(repo.unread_count(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_all_read() {
        let (pool, repo) = setup_test_repo().await;
        create_test_user(&pool, 1).await;

        for i in 0..3 {
            repo.create(&Notification::new(1, format!("event {}", i)))
                .await
                .unwrap();
        }

        assert_eq!(repo.mark_all_read(1).await.unwrap(), 3);
        assert_eq!(repo.mark_all_read(1).await.unwrap(), 0);
        assert_eq!(repo.unread_count(1).await.unwrap(), 0);
    }
}
