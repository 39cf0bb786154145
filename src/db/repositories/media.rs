//! Media repository
//!
//! Database operations for base64-encoded media rows attached to content
//! items. Listings exclude the data column so galleries stay cheap; the
//! payload is only read on single-item fetches.

use crate::db::DbPool;
use crate::models::{Media, MediaType};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;

/// Media metadata without the base64 payload
#[derive(Debug, Clone, serde::Serialize)]
pub struct MediaSummary {
    /// Unique identifier (UUID)
    pub id: String,
    /// Content item this media belongs to
    pub content_id: String,
    /// User who uploaded the file
    pub uploader_id: i64,
    /// Media classification
    pub media_type: MediaType,
    /// Original filename
    pub filename: String,
    /// Creation timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Media repository trait
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// Create a new media row
    async fn create(&self, media: &Media) -> Result<Media>;

    /// Get media by ID including the base64 payload
    async fn get_by_id(&self, id: &str) -> Result<Option<Media>>;

    /// List media metadata for a content item, oldest first
    async fn list_by_content(&self, content_id: &str) -> Result<Vec<MediaSummary>>;

    /// Delete a media row. Returns true when a row was deleted.
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// SQLx-based media repository implementation
pub struct SqlxMediaRepository {
    pool: DbPool,
}

impl SqlxMediaRepository {
    /// Create a new SQLx media repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn MediaRepository> {
        Arc::new(Self::new(pool))
    }
}

fn parse_media_type(row: &SqliteRow) -> Result<MediaType> {
    let type_str: String = row.get("media_type");
    MediaType::from_str(&type_str).ok_or_else(|| anyhow!("Unknown media type: {}", type_str))
}

#[async_trait]
impl MediaRepository for SqlxMediaRepository {
    async fn create(&self, media: &Media) -> Result<Media> {
        sqlx::query(
            r#"
            INSERT INTO media (id, content_id, uploader_id, media_type, filename, data, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&media.id)
        .bind(&media.content_id)
        .bind(media.uploader_id)
        .bind(media.media_type.as_str())
        .bind(&media.filename)
        .bind(&media.data)
        .bind(media.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create media")?;

        Ok(media.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Media>> {
        let row = sqlx::query(
            "SELECT id, content_id, uploader_id, media_type, filename, data, created_at \
             FROM media WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get media by ID")?;

        match row {
            Some(row) => Ok(Some(Media {
                id: row.get("id"),
                content_id: row.get("content_id"),
                uploader_id: row.get("uploader_id"),
                media_type: parse_media_type(&row)?,
                filename: row.get("filename"),
                data: row.get("data"),
                created_at: row.get("created_at"),
            })),
            None => Ok(None),
        }
    }

    async fn list_by_content(&self, content_id: &str) -> Result<Vec<MediaSummary>> {
        let rows = sqlx::query(
            "SELECT id, content_id, uploader_id, media_type, filename, created_at \
             FROM media WHERE content_id = ? ORDER BY created_at",
        )
        .bind(content_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list media by content")?;

        rows.iter()
            .map(|row| {
                Ok(MediaSummary {
                    id: row.get("id"),
                    content_id: row.get("content_id"),
                    uploader_id: row.get("uploader_id"),
                    media_type: parse_media_type(row)?,
                    filename: row.get("filename"),
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM media WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete media")?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::Utc;
    use uuid::Uuid;

    async fn setup_test_repo() -> (DbPool, SqlxMediaRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxMediaRepository::new(pool.clone());
        (pool, repo)
    }

    async fn seed_content(pool: &DbPool) -> String {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash) VALUES (1, 'author', 'a@example.com', 'hash')",
        )
        .execute(pool)
        .await
        .unwrap();

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO content_items (id, kind, author_id, title) VALUES (?, 'blog', 1, 'Post')",
        )
        .bind(&id)
        .execute(pool)
        .await
        .unwrap();
        id
    }

    fn media_row(content_id: &str, filename: &str, media_type: MediaType) -> Media {
        Media {
            id: Uuid::new_v4().to_string(),
            content_id: content_id.to_string(),
            uploader_id: 1,
            media_type,
            filename: filename.to_string(),
            data: "aGVsbG8=".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_media() {
        let (pool, repo) = setup_test_repo().await;
        let content_id = seed_content(&pool).await;

        let media = media_row(&content_id, "photo.png", MediaType::Image);
        repo.create(&media).await.expect("Failed to create media");

        let found = repo.get_by_id(&media.id).await.unwrap().unwrap();
        assert_eq!(found.filename, "photo.png");
        assert_eq!(found.media_type, MediaType::Image);
        assert_eq!(found.data, "aGVsbG8=");
    }

    #[tokio::test]
    async fn test_list_by_content_omits_payload() {
        let (pool, repo) = setup_test_repo().await;
        let content_id = seed_content(&pool).await;

        repo.create(&media_row(&content_id, "a.gif", MediaType::Gif))
            .await
            .unwrap();
        repo.create(&media_row(&content_id, "b.mp4", MediaType::Video))
            .await
            .unwrap();

        let summaries = repo.list_by_content(&content_id).await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].filename, "a.gif");
        assert_eq!(summaries[0].media_type, MediaType::Gif);
    }

    #[tokio::test]
    async fn test_delete_media() {
        let (pool, repo) = setup_test_repo().await;
        let content_id = seed_content(&pool).await;

        let media = media_row(&content_id, "gone.png", MediaType::Image);
        repo.create(&media).await.unwrap();

        assert!(repo.delete(&media.id).await.unwrap());
        assert!(repo.get_by_id(&media.id).await.unwrap().is_none());
        assert!(!repo.delete(&media.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_media_requires_existing_content() {
        let (_pool, repo) = setup_test_repo().await;

        let media = media_row("no-such-content", "x.png", MediaType::Image);
        assert!(repo.create(&media).await.is_err());
    }
}
