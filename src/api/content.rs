//! Content API endpoints
//!
//! Handles HTTP requests for blogs and case studies:
//! - GET /api/v1/content - List published items
//! - GET /api/v1/content/{id} - Get one item (bumps views)
//! - GET /api/v1/search - Search published items
//! - POST /api/v1/content - Create an item
//! - PUT /api/v1/content/{id} - Update an item
//! - DELETE /api/v1/content/{id} - Delete an item
//! - GET /api/v1/content/mine - The caller's items, drafts included

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{ContentResponse, PaginatedContentResponse};
use crate::models::{ContentKind, CreateContentInput, ListParams, UpdateContentInput};

/// Build public content routes (optional auth is layered on top)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/content", get(list_published))
        .route("/content/{id}", get(get_content))
        .route("/search", get(search))
}

/// Build protected content routes
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/content", post(create_content))
        .route("/content/mine", get(list_mine))
        .route("/content/{id}", put(update_content))
        .route("/content/{id}", delete(delete_content))
}

/// Query parameters for content listings
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Optional kind filter ("blog" or "case_study")
    pub kind: Option<String>,
}

fn default_page() -> u32 { 1 }
fn default_per_page() -> u32 { 10 }

fn parse_kind(kind: Option<&str>) -> Result<Option<ContentKind>, ApiError> {
    match kind {
        None => Ok(None),
        Some(s) => ContentKind::from_str(s)
            .map(Some)
            .ok_or_else(|| ApiError::validation_error(format!("Unknown content kind: {}", s))),
    }
}

/// GET /api/v1/content - List published items, newest first
async fn list_published(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PaginatedContentResponse>, ApiError> {
    let kind = parse_kind(query.kind.as_deref())?;
    let params = ListParams::new(query.page, query.per_page);
    let page = state.content_service.list_published(&params, kind).await?;
    Ok(Json(page.into()))
}

/// GET /api/v1/content/{id} - Get one item
///
/// Bumps the view counter and logs a view event for published items
/// viewed by someone other than the author. Unpublished items are only
/// visible to their author and admins.
async fn get_content(
    State(state): State<AppState>,
    viewer: Option<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<ContentResponse>, ApiError> {
    let viewer = viewer.map(|u| u.0);
    let item = state
        .content_service
        .get(&id, viewer.as_ref(), true)
        .await?;

    let is_author = viewer.as_ref().map(|u| u.id == item.author_id).unwrap_or(false);
    if item.is_published && !is_author {
        state
            .analytics_service
            .record(viewer.as_ref().map(|u| u.id), "view", Some(&item.id))
            .await;
    }

    let tags = state.content_service.tags_for(&item.id).await?;
    let likes = state.like_service.status(&item.id, viewer.as_ref()).await?;
    let comments = state.comment_service.count(&item.id).await?;

    Ok(Json(
        ContentResponse::from(item)
            .with_tags(tags)
            .with_engagement(likes.like_count, comments),
    ))
}

/// Query parameters for search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub kind: Option<String>,
    pub tag: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// GET /api/v1/search - Search published items
///
/// Case-insensitive substring match over title and body fields, with
/// optional kind and tag filters.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<PaginatedContentResponse>, ApiError> {
    let kind = parse_kind(query.kind.as_deref())?;
    let params = ListParams::new(query.page, query.per_page);
    let page = state
        .content_service
        .search(&query.q, kind, query.tag.as_deref(), &params)
        .await?;
    Ok(Json(page.into()))
}

/// Request body for creating content
#[derive(Debug, Deserialize)]
pub struct CreateContentRequest {
    pub kind: ContentKind,
    pub title: String,
    pub body: Option<String>,
    pub problem: Option<String>,
    pub solution: Option<String>,
    pub results: Option<String>,
    pub font: Option<String>,
    /// Comma-separated tag names
    pub tags: Option<String>,
    /// Defaults to true
    pub is_published: Option<bool>,
}

/// POST /api/v1/content - Create a blog post or case study
async fn create_content(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateContentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = CreateContentInput {
        kind: body.kind,
        author_id: user.0.id,
        title: body.title,
        body: body.body,
        problem: body.problem,
        solution: body.solution,
        results: body.results,
        font: body.font,
        tags: body.tags,
        is_published: body.is_published,
    };

    let created = state.content_service.create(input, &user.0).await?;
    if created.is_published {
        state
            .analytics_service
            .record(Some(user.0.id), "publish", Some(&created.id))
            .await;
    }

    let tags = state.content_service.tags_for(&created.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ContentResponse::from(created).with_tags(tags)),
    ))
}

/// GET /api/v1/content/mine - The caller's items including unpublished
async fn list_mine(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<PaginatedContentResponse>, ApiError> {
    let params = ListParams::new(query.page, query.per_page);
    let page = state
        .content_service
        .list_by_author(user.0.id, &params)
        .await?;
    Ok(Json(page.into()))
}

/// PUT /api/v1/content/{id} - Update an item (author or admin)
async fn update_content(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(input): Json<UpdateContentInput>,
) -> Result<Json<ContentResponse>, ApiError> {
    let newly_published = matches!(input.is_published, Some(true));
    let updated = state.content_service.update(&id, input, &user.0).await?;

    if newly_published && updated.is_published {
        state
            .analytics_service
            .record(Some(user.0.id), "publish", Some(&updated.id))
            .await;
    }

    let tags = state.content_service.tags_for(&updated.id).await?;
    Ok(Json(ContentResponse::from(updated).with_tags(tags)))
}

/// DELETE /api/v1/content/{id} - Delete an item (author or admin)
async fn delete_content(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.content_service.delete(&id, &user.0).await?;
    Ok(StatusCode::NO_CONTENT)
}
