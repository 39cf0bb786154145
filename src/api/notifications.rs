//! Notification API endpoints
//!
//! All routes require authentication.
//! - GET /api/v1/notifications - Newest first
//! - GET /api/v1/notifications/unread-count
//! - POST /api/v1/notifications/{id}/read
//! - POST /api/v1/notifications/read-all

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::Notification;

/// Build the notification router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/{id}/read", post(mark_read))
        .route("/read-all", post(mark_all_read))
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            message: n.message,
            is_read: n.is_read,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

/// GET /api/v1/notifications - The caller's notifications, newest first
async fn list_notifications(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let notifications = state.notification_service.list(user.0.id).await?;
    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread: i64,
}

/// GET /api/v1/notifications/unread-count
async fn unread_count(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let unread = state.notification_service.unread_count(user.0.id).await?;
    Ok(Json(UnreadCountResponse { unread }))
}

/// POST /api/v1/notifications/{id}/read - Mark one notification read
async fn mark_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.notification_service.mark_read(&id, user.0.id).await?;
    Ok(Json(serde_json::json!({ "marked": 1 })))
}

/// POST /api/v1/notifications/read-all - Mark everything read
async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let marked = state.notification_service.mark_all_read(user.0.id).await?;
    Ok(Json(serde_json::json!({ "marked": marked })))
}
