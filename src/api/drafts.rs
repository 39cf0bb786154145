//! Draft API endpoints
//!
//! Drafts hold free-form JSON payloads until they are published as
//! content items. All routes require authentication.
//! - GET /api/v1/drafts - The caller's drafts
//! - POST /api/v1/drafts - Save (create or overwrite)
//! - GET /api/v1/drafts/{id}
//! - DELETE /api/v1/drafts/{id}
//! - POST /api/v1/drafts/{id}/publish

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::ContentResponse;
use crate::models::{ContentKind, Draft, SaveDraftInput};

/// Build the draft router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_drafts))
        .route("/", post(save_draft))
        .route("/{id}", get(get_draft))
        .route("/{id}", delete(delete_draft))
        .route("/{id}/publish", post(publish_draft))
}

#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub id: String,
    pub kind: String,
    pub payload: serde_json::Value,
    pub content_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Draft> for DraftResponse {
    fn from(d: Draft) -> Self {
        Self {
            id: d.id,
            kind: d.kind.as_str().to_string(),
            payload: d.payload,
            content_id: d.content_id,
            created_at: d.created_at.to_rfc3339(),
            updated_at: d.updated_at.to_rfc3339(),
        }
    }
}

/// GET /api/v1/drafts - The caller's drafts, most recently updated first
async fn list_drafts(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<DraftResponse>>, ApiError> {
    let drafts = state.draft_service.list(&user.0).await?;
    Ok(Json(drafts.into_iter().map(Into::into).collect()))
}

/// Request body for saving a draft
#[derive(Debug, Deserialize)]
pub struct SaveDraftRequest {
    /// Existing draft id to overwrite; omit to create
    pub id: Option<String>,
    pub kind: ContentKind,
    pub payload: serde_json::Value,
}

/// POST /api/v1/drafts - Save a draft
async fn save_draft(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<SaveDraftRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let creating = body.id.is_none();
    let input = SaveDraftInput {
        id: body.id,
        user_id: user.0.id,
        kind: body.kind,
        payload: body.payload,
    };

    let draft = state.draft_service.save(input, &user.0).await?;
    let status = if creating { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(DraftResponse::from(draft))))
}

/// GET /api/v1/drafts/{id} - Fetch one draft (owner only)
async fn get_draft(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<DraftResponse>, ApiError> {
    let draft = state.draft_service.get(&id, &user.0).await?;
    Ok(Json(draft.into()))
}

/// DELETE /api/v1/drafts/{id} - Delete a draft (owner or admin)
async fn delete_draft(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.draft_service.delete(&id, &user.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/drafts/{id}/publish - Publish a draft as content
async fn publish_draft(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.draft_service.publish(&id, &user.0).await?;
    state
        .analytics_service
        .record(Some(user.0.id), "publish", Some(&item.id))
        .await;
    Ok((StatusCode::CREATED, Json(ContentResponse::from(item))))
}
