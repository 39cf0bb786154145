//! Analytics service
//!
//! Records platform events and serves the aggregate views. Event
//! recording is best effort: a failed write is logged, never surfaced
//! to the caller's request.

use crate::db::repositories::AnalyticsRepository;
use crate::models::{AnalyticsEvent, CreatorSummary, PlatformOverview};
use anyhow::Context;
use std::sync::Arc;

/// Error types for analytics service operations
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsServiceError {
    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Analytics service
pub struct AnalyticsService {
    analytics_repo: Arc<dyn AnalyticsRepository>,
}

impl AnalyticsService {
    /// Create a new analytics service
    pub fn new(analytics_repo: Arc<dyn AnalyticsRepository>) -> Self {
        Self { analytics_repo }
    }

    /// Record an event. Failures are logged and swallowed.
    pub async fn record(&self, user_id: Option<i64>, event_type: &str, detail: Option<&str>) {
        let mut event = AnalyticsEvent::new(user_id, event_type);
        if let Some(detail) = detail {
            event = event.with_detail(detail);
        }

        if let Err(e) = self.analytics_repo.record(&event).await {
            tracing::warn!("Failed to record analytics event '{}': {}", event_type, e);
        }
    }

    /// Most recent events (admin surface)
    pub async fn recent(&self, limit: i64) -> Result<Vec<AnalyticsEvent>, AnalyticsServiceError> {
        Ok(self
            .analytics_repo
            .recent(limit.clamp(1, 500))
            .await
            .context("Failed to list recent events")?)
    }

    /// Aggregate statistics for one author's content
    pub async fn creator_summary(
        &self,
        author_id: i64,
    ) -> Result<CreatorSummary, AnalyticsServiceError> {
        Ok(self
            .analytics_repo
            .creator_summary(author_id)
            .await
            .context("Failed to build creator summary")?)
    }

    /// Platform-wide counts (admin surface)
    pub async fn platform_overview(&self) -> Result<PlatformOverview, AnalyticsServiceError> {
        Ok(self
            .analytics_repo
            .platform_overview()
            .await
            .context("Failed to build platform overview")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxAnalyticsRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> AnalyticsService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        AnalyticsService::new(SqlxAnalyticsRepository::boxed(pool))
    }

    #[tokio::test]
    async fn test_record_and_recent() {
        let service = setup().await;

        service.record(Some(1), "login", None).await;
        service.record(None, "view", Some("post-id")).await;

        let events = service.recent(10).await.unwrap();
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn test_recent_limit_clamped() {
        let service = setup().await;
        for i in 0..3 {
            service.record(None, "view", Some(&format!("p{}", i))).await;
        }

        // A nonsense limit still returns results
        let events = service.recent(0).await.unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_overview() {
        let service = setup().await;
        let overview = service.platform_overview().await.unwrap();
        assert_eq!(overview.user_count, 0);
        assert_eq!(overview.content_count, 0);
    }
}
