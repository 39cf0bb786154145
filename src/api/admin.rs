//! Admin API endpoints
//!
//! Mounted under /api/v1/admin behind `require_auth` + `require_admin`.
//! - GET /api/v1/admin/users - Paged user list
//! - PUT /api/v1/admin/users/{id}/status - Activate or deactivate
//! - GET /api/v1/admin/overview - Platform totals
//! - GET /api/v1/admin/events - Recent analytics events
//! - GET /api/v1/admin/stats - Process-level request stats

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::UserResponse;
use crate::models::{AnalyticsEvent, ListParams, PlatformOverview};

/// Build the admin router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}/status", put(set_user_status))
        .route("/overview", get(overview))
        .route("/events", get(recent_events))
        .route("/stats", get(system_stats))
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 { 1 }
fn default_per_page() -> u32 { 20 }

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

/// GET /api/v1/admin/users - Paged user list
async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<UserListResponse>, ApiError> {
    let params = ListParams::new(query.page, query.per_page);
    let page = state.user_service.list(&params).await?;
    Ok(Json(UserListResponse {
        total: page.total,
        page: page.page,
        per_page: page.per_page,
        users: page.items.into_iter().map(Into::into).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub is_active: bool,
}

/// PUT /api/v1/admin/users/{id}/status - Activate or deactivate a user
///
/// Admins cannot deactivate themselves.
async fn set_user_status(
    State(state): State<AppState>,
    admin: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<SetStatusRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if id == admin.0.id && !body.is_active {
        return Err(ApiError::validation_error(
            "You cannot deactivate your own account",
        ));
    }

    if body.is_active {
        state.user_service.reactivate(id).await?;
    } else {
        state.user_service.deactivate(id).await?;
    }

    let user = state
        .user_service
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!(
        "Admin {} set user {} active={}",
        admin.0.username,
        user.username,
        body.is_active
    );
    Ok(Json(user.into()))
}

/// GET /api/v1/admin/overview - Platform totals
async fn overview(State(state): State<AppState>) -> Result<Json<PlatformOverview>, ApiError> {
    let overview = state.analytics_service.platform_overview().await?;
    Ok(Json(overview))
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(default = "default_event_limit")]
    pub limit: i64,
}

fn default_event_limit() -> i64 { 100 }

/// GET /api/v1/admin/events - Recent analytics events, newest first
async fn recent_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<AnalyticsEvent>>, ApiError> {
    let events = state.analytics_service.recent(query.limit).await?;
    Ok(Json(events))
}

#[derive(Debug, Serialize)]
pub struct SystemStatsResponse {
    pub total_requests: u64,
    pub avg_response_time_us: f64,
    pub uptime_seconds: u64,
}

/// GET /api/v1/admin/stats - Process-level request stats
async fn system_stats(State(state): State<AppState>) -> Json<SystemStatsResponse> {
    Json(SystemStatsResponse {
        total_requests: state.request_stats.total_requests(),
        avg_response_time_us: state.request_stats.avg_response_time_us(),
        uptime_seconds: state.request_stats.uptime_seconds(),
    })
}
