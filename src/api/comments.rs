//! Comment and like API endpoints
//!
//! - GET /api/v1/content/{id}/comments - List comments (public)
//! - GET /api/v1/content/{id}/likes - Like count and viewer state (public)
//! - POST /api/v1/content/{id}/comments - Add a comment
//! - DELETE /api/v1/comments/{id} - Delete a comment
//! - POST /api/v1/content/{id}/like - Like an item
//! - DELETE /api/v1/content/{id}/like - Remove a like

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::CommentResponse;
use crate::models::CreateCommentInput;
use crate::services::LikeStatus;

/// Build public comment/like routes (optional auth is layered on top)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/content/{id}/comments", get(list_comments))
        .route("/content/{id}/likes", get(like_status))
}

/// Build protected comment/like routes
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/content/{id}/comments", post(create_comment))
        .route("/comments/{id}", delete(delete_comment))
        .route("/content/{id}/like", post(like))
        .route("/content/{id}/like", delete(unlike))
}

/// Response for comment listings
#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub comments: Vec<CommentResponse>,
    pub total: usize,
}

/// GET /api/v1/content/{id}/comments - List comments with usernames
async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CommentListResponse>, ApiError> {
    let comments = state.comment_service.list(&id).await?;
    let comments: Vec<CommentResponse> = comments.into_iter().map(Into::into).collect();
    Ok(Json(CommentListResponse {
        total: comments.len(),
        comments,
    }))
}

/// Request body for adding a comment
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
}

/// POST /api/v1/content/{id}/comments - Add a comment
async fn create_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.content_service.get(&id, Some(&user.0), false).await?;

    let input = CreateCommentInput {
        content_id: item.id,
        kind: item.kind,
        user_id: user.0.id,
        body: body.body,
    };

    let comment = state.comment_service.add(input, &user.0).await?;
    state
        .analytics_service
        .record(Some(user.0.id), "comment", Some(&comment.content_id))
        .await;

    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}

/// DELETE /api/v1/comments/{id} - Delete a comment
///
/// Allowed for the comment author, the content author, and admins.
async fn delete_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.comment_service.delete(&id, &user.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/content/{id}/likes - Like count and whether the viewer liked
async fn like_status(
    State(state): State<AppState>,
    viewer: Option<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<LikeStatus>, ApiError> {
    let viewer = viewer.map(|u| u.0);
    let status = state.like_service.status(&id, viewer.as_ref()).await?;
    Ok(Json(status))
}

/// POST /api/v1/content/{id}/like - Like an item
///
/// Liking an item twice is a conflict.
async fn like(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<LikeStatus>, ApiError> {
    let inserted = state.like_service.like(&id, &user.0).await?;
    if !inserted {
        return Err(ApiError::conflict("Already liked"));
    }

    state
        .analytics_service
        .record(Some(user.0.id), "like", Some(&id))
        .await;

    let status = state.like_service.status(&id, Some(&user.0)).await?;
    Ok(Json(status))
}

/// DELETE /api/v1/content/{id}/like - Remove a like
async fn unlike(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<LikeStatus>, ApiError> {
    state.like_service.unlike(&id, &user.0).await?;
    let status = state.like_service.status(&id, Some(&user.0)).await?;
    Ok(Json(status))
}
