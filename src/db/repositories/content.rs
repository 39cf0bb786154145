//! Content repository
//!
//! Database operations for content items (blogs and case studies) and
//! their tag associations. Search runs over published items only and
//! uses LIKE, which is case-insensitive for ASCII in SQLite.

use crate::db::DbPool;
use crate::models::{ContentItem, ContentKind, ListParams, PagedResult};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;

/// Content repository trait
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Create a new content item
    async fn create(&self, item: &ContentItem) -> Result<ContentItem>;

    /// Get content item by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<ContentItem>>;

    /// Update an existing content item (full row)
    async fn update(&self, item: &ContentItem) -> Result<ContentItem>;

    /// Delete a content item. Dependent rows (tags, media, comments,
    /// likes) are removed by foreign key cascade. Returns true when a
    /// row was deleted.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// List all items by an author, newest first
    async fn list_by_author(
        &self,
        author_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<ContentItem>>;

    /// List published items, newest first, optionally filtered by kind
    async fn list_published(
        &self,
        params: &ListParams,
        kind: Option<ContentKind>,
    ) -> Result<PagedResult<ContentItem>>;

    /// Search published items by title and text sections, optionally
    /// filtered by kind and tag name
    async fn search(
        &self,
        query: &str,
        kind: Option<ContentKind>,
        tag: Option<&str>,
        params: &ListParams,
    ) -> Result<PagedResult<ContentItem>>;

    /// List published items carrying a tag, newest first
    async fn list_published_by_tag(
        &self,
        tag: &str,
        params: &ListParams,
    ) -> Result<PagedResult<ContentItem>>;

    /// Increment the view counter
    async fn increment_views(&self, id: &str) -> Result<()>;

    /// Replace all tag associations for a content item
    async fn replace_tags(&self, content_id: &str, tag_ids: &[String]) -> Result<()>;

    /// Get tag names attached to a content item, sorted alphabetically
    async fn get_tag_names(&self, content_id: &str) -> Result<Vec<String>>;

    /// Count all content items
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based content repository implementation
pub struct SqlxContentRepository {
    pool: DbPool,
}

impl SqlxContentRepository {
    /// Create a new SQLx content repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn ContentRepository> {
        Arc::new(Self::new(pool))
    }
}

const CONTENT_COLUMNS: &str = "id, kind, author_id, title, body, problem, solution, results, \
     font, views, is_published, public_link, created_at, updated_at";

fn row_to_content(row: &SqliteRow) -> Result<ContentItem> {
    let kind_str: String = row.get("kind");
    let kind = ContentKind::from_str(&kind_str)
        .ok_or_else(|| anyhow!("Unknown content kind: {}", kind_str))?;

    Ok(ContentItem {
        id: row.get("id"),
        kind,
        author_id: row.get("author_id"),
        title: row.get("title"),
        body: row.get("body"),
        problem: row.get("problem"),
        solution: row.get("solution"),
        results: row.get("results"),
        font: row.get("font"),
        views: row.get("views"),
        is_published: row.get::<i64, _>("is_published") != 0,
        public_link: row.get("public_link"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Escape LIKE wildcards in user-supplied search text
fn escape_like(query: &str) -> String {
    query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl ContentRepository for SqlxContentRepository {
    async fn create(&self, item: &ContentItem) -> Result<ContentItem> {
        sqlx::query(
            r#"
            INSERT INTO content_items
                (id, kind, author_id, title, body, problem, solution, results,
                 font, views, is_published, public_link, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.id)
        .bind(item.kind.as_str())
        .bind(item.author_id)
        .bind(&item.title)
        .bind(&item.body)
        .bind(&item.problem)
        .bind(&item.solution)
        .bind(&item.results)
        .bind(&item.font)
        .bind(item.views)
        .bind(item.is_published)
        .bind(&item.public_link)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create content item")?;

        Ok(item.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<ContentItem>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM content_items WHERE id = ?",
            CONTENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get content item by ID")?;

        row.as_ref().map(row_to_content).transpose()
    }

    async fn update(&self, item: &ContentItem) -> Result<ContentItem> {
        sqlx::query(
            r#"
            UPDATE content_items
            SET title = ?, body = ?, problem = ?, solution = ?, results = ?,
                font = ?, is_published = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&item.title)
        .bind(&item.body)
        .bind(&item.problem)
        .bind(&item.solution)
        .bind(&item.results)
        .bind(&item.font)
        .bind(item.is_published)
        .bind(Utc::now())
        .bind(&item.id)
        .execute(&self.pool)
        .await
        .context("Failed to update content item")?;

        self.get_by_id(&item.id)
            .await?
            .ok_or_else(|| anyhow!("Content item disappeared after update"))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin content deletion transaction")?;

        // Drafts keep no FK to content, so the link is cleared by hand.
        sqlx::query("UPDATE drafts SET content_id = NULL WHERE content_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear draft links for deleted content")?;

        let result = sqlx::query("DELETE FROM content_items WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete content item")?;

        tx.commit()
            .await
            .context("Failed to commit content deletion transaction")?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_author(
        &self,
        author_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<ContentItem>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM content_items WHERE author_id = ?")
                .bind(author_id)
                .fetch_one(&self.pool)
                .await
                .context("Failed to count content items by author")?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM content_items WHERE author_id = ? \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
            CONTENT_COLUMNS
        ))
        .bind(author_id)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list content items by author")?;

        let items = rows
            .iter()
            .map(row_to_content)
            .collect::<Result<Vec<_>>>()?;

        Ok(PagedResult::new(items, total, params))
    }

    async fn list_published(
        &self,
        params: &ListParams,
        kind: Option<ContentKind>,
    ) -> Result<PagedResult<ContentItem>> {
        let kind_clause = match kind {
            Some(_) => " AND kind = ?",
            None => "",
        };

        let count_sql = format!(
            "SELECT COUNT(*) FROM content_items WHERE is_published = 1{}",
            kind_clause
        );
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(kind) = kind {
            count_query = count_query.bind(kind.as_str());
        }
        let total = count_query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count published content items")?;

        let list_sql = format!(
            "SELECT {} FROM content_items WHERE is_published = 1{} \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
            CONTENT_COLUMNS, kind_clause
        );
        let mut list_query = sqlx::query(&list_sql);
        if let Some(kind) = kind {
            list_query = list_query.bind(kind.as_str());
        }
        let rows = list_query
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list published content items")?;

        let items = rows
            .iter()
            .map(row_to_content)
            .collect::<Result<Vec<_>>>()?;

        Ok(PagedResult::new(items, total, params))
    }

    async fn search(
        &self,
        query: &str,
        kind: Option<ContentKind>,
        tag: Option<&str>,
        params: &ListParams,
    ) -> Result<PagedResult<ContentItem>> {
        let pattern = format!("%{}%", escape_like(query));

        let mut conditions = String::from(
            "is_published = 1 AND (title LIKE ? ESCAPE '\\' \
             OR body LIKE ? ESCAPE '\\' \
             OR problem LIKE ? ESCAPE '\\' \
             OR solution LIKE ? ESCAPE '\\' \
             OR results LIKE ? ESCAPE '\\')",
        );
        if kind.is_some() {
            conditions.push_str(" AND kind = ?");
        }
        if tag.is_some() {
            conditions.push_str(
                " AND id IN (SELECT ct.content_id FROM content_tags ct \
                 JOIN tags t ON t.id = ct.tag_id WHERE t.name = ?)",
            );
        }

        let count_sql = format!("SELECT COUNT(*) FROM content_items WHERE {}", conditions);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for _ in 0..5 {
            count_query = count_query.bind(&pattern);
        }
        if let Some(kind) = kind {
            count_query = count_query.bind(kind.as_str());
        }
        if let Some(tag) = tag {
            count_query = count_query.bind(tag);
        }
        let total = count_query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count search results")?;

        let list_sql = format!(
            "SELECT {} FROM content_items WHERE {} \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
            CONTENT_COLUMNS, conditions
        );
        let mut list_query = sqlx::query(&list_sql);
        for _ in 0..5 {
            list_query = list_query.bind(&pattern);
        }
        if let Some(kind) = kind {
            list_query = list_query.bind(kind.as_str());
        }
        if let Some(tag) = tag {
            list_query = list_query.bind(tag);
        }
        let rows = list_query
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .context("Failed to search content items")?;

        let items = rows
            .iter()
            .map(row_to_content)
            .collect::<Result<Vec<_>>>()?;

        Ok(PagedResult::new(items, total, params))
    }

    async fn list_published_by_tag(
        &self,
        tag: &str,
        params: &ListParams,
    ) -> Result<PagedResult<ContentItem>> {
        let conditions = "is_published = 1 AND id IN \
             (SELECT ct.content_id FROM content_tags ct \
              JOIN tags t ON t.id = ct.tag_id WHERE t.name = ?)";

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM content_items WHERE {}",
            conditions
        ))
        .bind(tag)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count content items by tag")?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM content_items WHERE {} \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
            CONTENT_COLUMNS, conditions
        ))
        .bind(tag)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list content items by tag")?;

        let items = rows
            .iter()
            .map(row_to_content)
            .collect::<Result<Vec<_>>>()?;

        Ok(PagedResult::new(items, total, params))
    }

    async fn increment_views(&self, id: &str) -> Result<()> {
        sqlx::query("UPDATE content_items SET views = views + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to increment view count")?;

        Ok(())
    }

    async fn replace_tags(&self, content_id: &str, tag_ids: &[String]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin tag replacement transaction")?;

        sqlx::query("DELETE FROM content_tags WHERE content_id = ?")
            .bind(content_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear tag associations")?;

        for tag_id in tag_ids {
            sqlx::query("INSERT OR IGNORE INTO content_tags (content_id, tag_id) VALUES (?, ?)")
                .bind(content_id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await
                .context("Failed to insert tag association")?;
        }

        tx.commit()
            .await
            .context("Failed to commit tag replacement transaction")?;

        Ok(())
    }

    async fn get_tag_names(&self, content_id: &str) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT t.name FROM tags t
            JOIN content_tags ct ON ct.tag_id = t.id
            WHERE ct.content_id = ?
            ORDER BY t.name
            "#,
        )
        .bind(content_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get tag names for content item")?;

        Ok(rows.iter().map(|row| row.get("name")).collect())
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM content_items")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count content items")
    }
}
