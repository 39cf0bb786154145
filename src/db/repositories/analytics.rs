//! Analytics repository
//!
//! Event log writes plus the aggregate queries behind the creator
//! dashboard and the admin overview.

use crate::db::DbPool;
use crate::models::{AnalyticsEvent, CreatorSummary, PlatformOverview};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

/// Analytics repository trait
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Record an event
    async fn record(&self, event: &AnalyticsEvent) -> Result<()>;

    /// Most recent events, newest first
    async fn recent(&self, limit: i64) -> Result<Vec<AnalyticsEvent>>;

    /// Aggregate statistics for one author's content
    async fn creator_summary(&self, author_id: i64) -> Result<CreatorSummary>;

    /// Platform-wide counts for the admin overview
    async fn platform_overview(&self) -> Result<PlatformOverview>;
}

/// SQLx-based analytics repository implementation
pub struct SqlxAnalyticsRepository {
    pool: DbPool,
}

impl SqlxAnalyticsRepository {
    /// Create a new SQLx analytics repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn AnalyticsRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl AnalyticsRepository for SqlxAnalyticsRepository {
    async fn record(&self, event: &AnalyticsEvent) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO analytics_events (id, user_id, event_type, detail, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.id)
        .bind(event.user_id)
        .bind(&event.event_type)
        .bind(&event.detail)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to record analytics event")?;

        Ok(())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<AnalyticsEvent>> {
        let rows = sqlx::query(
            "SELECT id, user_id, event_type, detail, created_at FROM analytics_events \
             ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list recent analytics events")?;

        Ok(rows
            .iter()
            .map(|row| AnalyticsEvent {
                id: row.get("id"),
                user_id: row.get("user_id"),
                event_type: row.get("event_type"),
                detail: row.get("detail"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn creator_summary(&self, author_id: i64) -> Result<CreatorSummary> {
        let row = sqlx::query(
            r#"
            SELECT
                COALESCE(SUM(views), 0) AS total_views,
                COALESCE(SUM(CASE WHEN kind = 'blog' THEN 1 ELSE 0 END), 0) AS blog_count,
                COALESCE(SUM(CASE WHEN kind = 'case_study' THEN 1 ELSE 0 END), 0) AS case_study_count
            FROM content_items
            WHERE author_id = ?
            "#,
        )
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to aggregate creator content stats")?;

        let total_likes: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM likes l
            JOIN content_items c ON c.id = l.content_id
            WHERE c.author_id = ?
            "#,
        )
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count creator likes")?;

        Ok(CreatorSummary {
            total_views: row.get("total_views"),
            total_likes,
            blog_count: row.get("blog_count"),
            case_study_count: row.get("case_study_count"),
        })
    }

    async fn platform_overview(&self) -> Result<PlatformOverview> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS user_count,
                (SELECT COUNT(*) FROM users WHERE is_active = 1) AS active_user_count,
                (SELECT COUNT(*) FROM content_items) AS content_count,
                (SELECT COUNT(*) FROM comments) AS comment_count,
                (SELECT COUNT(*) FROM likes) AS like_count
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to aggregate platform overview")?;

        Ok(PlatformOverview {
            user_count: row.get("user_count"),
            active_user_count: row.get("active_user_count"),
            content_count: row.get("content_count"),
            comment_count: row.get("comment_count"),
            like_count: row.get("like_count"),
        })
    }
}
