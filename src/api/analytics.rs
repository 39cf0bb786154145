//! Creator analytics API endpoints
//!
//! - GET /api/v1/analytics/summary - Totals for the caller's content

use axum::{extract::State, routing::get, Json, Router};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::CreatorSummary;

/// Build the analytics router
pub fn router() -> Router<AppState> {
    Router::new().route("/summary", get(creator_summary))
}

/// GET /api/v1/analytics/summary - Views, likes and item counts for the
/// caller's published work
async fn creator_summary(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<CreatorSummary>, ApiError> {
    let summary = state.analytics_service.creator_summary(user.0.id).await?;
    Ok(Json(summary))
}
