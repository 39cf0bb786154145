//! Tag repository
//!
//! Tags are shared across all content items and created on demand the
//! first time a name is used.

use crate::db::DbPool;
use crate::models::{Tag, TagWithCount};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Get an existing tag by name or create it
    async fn get_or_create(&self, name: &str) -> Result<Tag>;

    /// Get a tag by name
    async fn get_by_name(&self, name: &str) -> Result<Option<Tag>>;

    /// List all tags sorted by name
    async fn list_all(&self) -> Result<Vec<Tag>>;

    /// Most used tags on published content, by usage count descending
    async fn popular(&self, limit: i64) -> Result<Vec<TagWithCount>>;
}

/// SQLx-based tag repository implementation
pub struct SqlxTagRepository {
    pool: DbPool,
}

impl SqlxTagRepository {
    /// Create a new SQLx tag repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_tag(row: &sqlx::sqlite::SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn get_or_create(&self, name: &str) -> Result<Tag> {
        if let Some(tag) = self.get_by_name(name).await? {
            return Ok(tag);
        }

        let tag = Tag::new(name);
        // A concurrent insert of the same name loses the race here, so
        // fall back to the existing row on conflict.
        let result = sqlx::query(
            "INSERT OR IGNORE INTO tags (id, name, created_at) VALUES (?, ?, ?)",
        )
        .bind(&tag.id)
        .bind(&tag.name)
        .bind(tag.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create tag")?;

        if result.rows_affected() == 0 {
            return self
                .get_by_name(name)
                .await?
                .context("Tag vanished after insert conflict");
        }

        Ok(tag)
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, name, created_at FROM tags WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get tag by name")?;

        Ok(row.as_ref().map(row_to_tag))
    }

    async fn list_all(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, name, created_at FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list tags")?;

        Ok(rows.iter().map(row_to_tag).collect())
    }

    async fn popular(&self, limit: i64) -> Result<Vec<TagWithCount>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.name, t.created_at, COUNT(ct.content_id) AS usage_count
            FROM tags t
            JOIN content_tags ct ON ct.tag_id = t.id
            JOIN content_items c ON c.id = ct.content_id AND c.is_published = 1
            GROUP BY t.id
            ORDER BY usage_count DESC, t.name
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list popular tags")?;

        Ok(rows
            .iter()
            .map(|row| TagWithCount {
                tag: row_to_tag(row),
                usage_count: row.get("usage_count"),
            })
            .collect())
    }
}
