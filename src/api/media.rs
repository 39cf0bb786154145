//! Media API endpoints
//!
//! Uploads are base64 payloads attached to a content item.
//! - GET /api/v1/media/{id} - Fetch one upload with its payload (public)
//! - GET /api/v1/content/{id}/media - List uploads for an item (public)
//! - POST /api/v1/content/{id}/media - Attach an upload
//! - DELETE /api/v1/media/{id} - Delete an upload

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::db::repositories::MediaSummary;
use crate::models::{CreateMediaInput, Media};

/// Build public media routes
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/media/{id}", get(get_media))
        .route("/content/{id}/media", get(list_media))
}

/// Build protected media routes
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/content/{id}/media", post(upload_media))
        .route("/media/{id}", delete(delete_media))
}

/// Full media response including the base64 payload
#[derive(Debug, Serialize)]
pub struct MediaResponse {
    pub id: String,
    pub content_id: String,
    pub uploader_id: i64,
    pub media_type: String,
    pub filename: String,
    pub data: String,
    pub created_at: String,
}

impl From<Media> for MediaResponse {
    fn from(m: Media) -> Self {
        Self {
            id: m.id,
            content_id: m.content_id,
            uploader_id: m.uploader_id,
            media_type: m.media_type.as_str().to_string(),
            filename: m.filename,
            data: m.data,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// GET /api/v1/media/{id} - Fetch one upload
async fn get_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MediaResponse>, ApiError> {
    let media = state.media_service.get(&id).await?;
    Ok(Json(media.into()))
}

/// GET /api/v1/content/{id}/media - List uploads without payloads
async fn list_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MediaSummary>>, ApiError> {
    let media = state.media_service.list_for_content(&id).await?;
    Ok(Json(media))
}

/// Request body for an upload
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    /// Declared MIME type, e.g. "image/png"
    pub mime_type: String,
    pub filename: String,
    /// Base64-encoded payload
    pub data: String,
}

/// POST /api/v1/content/{id}/media - Attach an upload
///
/// Only the content author or an admin may attach media. Size and type
/// limits come from the upload config.
async fn upload_media(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(body): Json<UploadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = CreateMediaInput {
        content_id: id,
        uploader_id: user.0.id,
        mime_type: body.mime_type,
        filename: body.filename,
        data: body.data,
    };

    let media = state.media_service.upload(input, &user.0).await?;
    Ok((StatusCode::CREATED, Json(MediaResponse::from(media))))
}

/// DELETE /api/v1/media/{id} - Delete an upload (uploader or admin)
async fn delete_media(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.media_service.delete(&id, &user.0).await?;
    Ok(StatusCode::NO_CONTENT)
}
