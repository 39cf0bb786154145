//! Tag API endpoints
//!
//! - GET /api/v1/tags - All tags
//! - GET /api/v1/tags/popular - Tags ranked by published usage
//! - GET /api/v1/tags/{name}/content - Published items carrying a tag

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{PaginatedContentResponse, TagResponse};
use crate::models::ListParams;

/// Build the public tag router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tags))
        .route("/popular", get(popular_tags))
        .route("/{name}/content", get(content_by_tag))
}

#[derive(Debug, Serialize)]
pub struct TagListResponse {
    pub tags: Vec<TagResponse>,
}

/// GET /api/v1/tags - All tags, alphabetical
async fn list_tags(State(state): State<AppState>) -> Result<Json<TagListResponse>, ApiError> {
    let tags = state.content_service.all_tags().await?;
    Ok(Json(TagListResponse {
        tags: tags.into_iter().map(Into::into).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    #[serde(default = "default_popular_limit")]
    pub limit: i64,
}

fn default_popular_limit() -> i64 { 20 }

/// GET /api/v1/tags/popular - Tags by number of published items
async fn popular_tags(
    State(state): State<AppState>,
    Query(query): Query<PopularQuery>,
) -> Result<Json<TagListResponse>, ApiError> {
    let tags = state.content_service.popular_tags(query.limit).await?;
    Ok(Json(TagListResponse {
        tags: tags.into_iter().map(Into::into).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct TagContentQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 { 1 }
fn default_per_page() -> u32 { 10 }

/// GET /api/v1/tags/{name}/content - Published items with a tag
async fn content_by_tag(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<TagContentQuery>,
) -> Result<Json<PaginatedContentResponse>, ApiError> {
    let params = ListParams::new(query.page, query.per_page);
    let page = state
        .content_service
        .content_by_tag(&name, &params)
        .await?;
    Ok(Json(page.into()))
}
