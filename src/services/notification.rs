//! Notification service

use crate::db::repositories::NotificationRepository;
use crate::models::Notification;
use anyhow::Context;
use std::sync::Arc;

const DEFAULT_LIST_LIMIT: i64 = 50;

/// Error types for notification service operations
#[derive(Debug, thiserror::Error)]
pub enum NotificationServiceError {
    /// Notification not found or not owned by the user
    #[error("Notification not found")]
    NotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Notification service
pub struct NotificationService {
    notification_repo: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    /// Create a new notification service
    pub fn new(notification_repo: Arc<dyn NotificationRepository>) -> Self {
        Self { notification_repo }
    }

    /// List a user's most recent notifications
    pub async fn list(
        &self,
        user_id: i64,
    ) -> Result<Vec<Notification>, NotificationServiceError> {
        Ok(self
            .notification_repo
            .list_by_user(user_id, DEFAULT_LIST_LIMIT)
            .await
            .context("Failed to list notifications")?)
    }

    /// Count a user's unread notifications
    pub async fn unread_count(&self, user_id: i64) -> Result<i64, NotificationServiceError> {
        Ok(self
            .notification_repo
            .unread_count(user_id)
            .await
            .context("Failed to count unread notifications")?)
    }

    /// Mark one notification read. Fails when it does not exist or
    /// belongs to another user.
    pub async fn mark_read(
        &self,
        id: &str,
        user_id: i64,
    ) -> Result<(), NotificationServiceError> {
        let updated = self
            .notification_repo
            .mark_read(id, user_id)
            .await
            .context("Failed to mark notification read")?;

        if !updated {
            return Err(NotificationServiceError::NotFound);
        }
        Ok(())
    }

    /// Mark all of a user's notifications read, returning how many changed
    pub async fn mark_all_read(&self, user_id: i64) -> Result<i64, NotificationServiceError> {
        Ok(self
            .notification_repo
            .mark_all_read(user_id)
            .await
            .context("Failed to mark notifications read")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{NotificationRepository, SqlxNotificationRepository};
    use crate::db::{create_test_pool, migrations, DbPool};

    async fn setup() -> (DbPool, NotificationService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let service = NotificationService::new(SqlxNotificationRepository::boxed(pool.clone()));
        (pool, service)
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
    async fn test_list_and_mark_read() {
        let (pool, service) = setup().await;
        create_test_user(&pool, 1).await;

        let repo = SqlxNotificationRepository::new(pool.clone());
        let n = Notification::new(1, "hello");
        repo.create(&n).await.unwrap();

        assert_eq!(service.unread_count(1).await.unwrap(), 1);
        service.mark_read(&n.id, 1).await.unwrap();
        assert_eq!(service.unread_count(1).await.unwrap(), 0);
        assert_eq!(service.list(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mark_read_foreign_notification_fails() {
        let (pool, service) = setup().await;
        create_test_user(&pool, 1).await;
        create_test_user(&pool, 2).await;

        let repo = SqlxNotificationRepository::new(pool.clone());
        let n = Notification::new(1, "mine");
        repo.create(&n).await.unwrap();

        assert!(matches!(
            service.mark_read(&n.id, 2).await,
            Err(NotificationServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_mark_all_read() {
        let (pool, service) = setup().await;
        create_test_user(&pool, 1).await;

        let repo = SqlxNotificationRepository::new(pool.clone());
        for i in 0..3 {
            repo.create(&Notification::new(1, format!("n{}", i))).await.unwrap();
        }

        assert_eq!(service.mark_all_read(1).await.unwrap(), 3);
        assert_eq!(service.unread_count(1).await.unwrap(), 0);
    }
}
