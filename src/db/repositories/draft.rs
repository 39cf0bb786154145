//! Draft repository
//!
//! Drafts store their working copy as a JSON text column, so the payload
//! is serialized on write and parsed back on read.

use crate::db::DbPool;
use crate::models::{ContentKind, Draft};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;

/// Draft repository trait
#[async_trait]
pub trait DraftRepository: Send + Sync {
    /// Insert a draft, or overwrite its payload when the id exists
    async fn upsert(&self, draft: &Draft) -> Result<Draft>;

    /// Get draft by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Draft>>;

    /// List a user's drafts, most recently updated first
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Draft>>;

    /// Delete a draft. Returns true when a row was deleted.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Record the content item created when the draft was published
    async fn set_content_id(&self, id: &str, content_id: &str) -> Result<()>;
}

/// SQLx-based draft repository implementation
pub struct SqlxDraftRepository {
    pool: DbPool,
}

impl SqlxDraftRepository {
    /// Create a new SQLx draft repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn DraftRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_draft(row: &SqliteRow) -> Result<Draft> {
    let kind_str: String = row.get("kind");
    let kind = ContentKind::from_str(&kind_str)
        .ok_or_else(|| anyhow!("Unknown content kind: {}", kind_str))?;

    let payload_text: String = row.get("payload");
    let payload =
        serde_json::from_str(&payload_text).context("Failed to parse draft payload")?;

    Ok(Draft {
        id: row.get("id"),
        user_id: row.get("user_id"),
        kind,
        payload,
        content_id: row.get("content_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl DraftRepository for SqlxDraftRepository {
    async fn upsert(&self, draft: &Draft) -> Result<Draft> {
        let payload_text =
            serde_json::to_string(&draft.payload).context("Failed to serialize draft payload")?;

        sqlx::query(
            r#"
            INSERT INTO drafts (id, user_id, kind, payload, content_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                kind = excluded.kind,
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&draft.id)
        .bind(draft.user_id)
        .bind(draft.kind.as_str())
        .bind(&payload_text)
        .bind(&draft.content_id)
        .bind(draft.created_at)
        .bind(draft.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to upsert draft")?;

        Ok(draft.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Draft>> {
        let row = sqlx::query(
            "SELECT id, user_id, kind, payload, content_id, created_at, updated_at \
             FROM drafts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get draft by ID")?;

        row.as_ref().map(row_to_draft).transpose()
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Draft>> {
        let rows = sqlx::query(
            "SELECT id, user_id, kind, payload, content_id, created_at, updated_at \
             FROM drafts WHERE user_id = ? ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list drafts by user")?;

        rows.iter().map(row_to_draft).collect()
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM drafts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete draft")?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_content_id(&self, id: &str, content_id: &str) -> Result<()> {
        sqlx::query("UPDATE drafts SET content_id = ?, updated_at = ? WHERE id = ?")
            .bind(content_id)
            .bind(chrono::Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to link draft to content item")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    async fn setup_test_repo() -> (DbPool, SqlxDraftRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxDraftRepository::new(pool.clone());
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

    fn draft_row(user_id: i64, title: &str) -> Draft {
        let now = Utc::now();
        Draft {
            id: Uuid::new_v4().to_string(),
            user_id,
            kind: ContentKind::Blog,
            payload: json!({"title": title, "body": "work in progress"}),
            content_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_and_overwrites() {
        let (pool, repo) = setup_test_repo().await;
        create_test_user(&pool, 1).await;

        let mut draft = draft_row(1, "v1");
        repo.upsert(&draft).await.unwrap();

        draft.payload = json!({"title": "v2", "body": "revised"});
        draft.updated_at = Utc::now();
        repo.upsert(&draft).await.unwrap();

        let found = repo.get_by_id(&draft.id).await.unwrap().unwrap();
        assert_eq!(found.payload["title"], "v2");
        assert!(!found.is_published());

        assert_eq!(repo.list_by_user(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_by_user_ordering() {
        let (pool, repo) = setup_test_repo().await;
        create_test_user(&pool, 1).await;
        create_test_user(&pool, 2).await;

        let older = Draft {
            updated_at: Utc::now() - chrono::Duration::hours(1),
            ..draft_row(1, "older")
        };
        repo.upsert(&older).await.unwrap();
        repo.upsert(&draft_row(1, "newer")).await.unwrap();
        repo.upsert(&draft_row(2, "other user")).await.unwrap();

        let drafts = repo.list_by_user(1).await.unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].payload["title"], "newer");
        assert_eq!(drafts[1].payload["title"], "older");
    }

    #[tokio::test]
    async fn test_delete_draft() {
        let (pool, repo) = setup_test_repo().await;
        create_test_user(&pool, 1).await;

        let draft = draft_row(1, "temp");
        repo.upsert(&draft).await.unwrap();

        assert!(repo.delete(&draft.id).await.unwrap());
        assert!(repo.get_by_id(&draft.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_content_id_marks_published() {
        let (pool, repo) = setup_test_repo().await;
        create_test_user(&pool, 1).await;

        let draft = draft_row(1, "ready");
        repo.upsert(&draft).await.unwrap();

        repo.set_content_id(&draft.id, "content-uuid").await.unwrap();

        let found = repo.get_by_id(&draft.id).await.unwrap().unwrap();
        assert!(found.is_published());
        assert_eq!(found.content_id.as_deref(), Some("content-uuid"));
    }
}
