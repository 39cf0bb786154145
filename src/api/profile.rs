//! Profile API endpoints
//!
//! - GET /api/v1/users/{username} - Public profile (no auth)
//! - PUT /api/v1/profile - Update own profile
//! - PUT /api/v1/profile/password - Change password
//! - POST /api/v1/profile/deactivate - Deactivate own account
//! - POST /api/v1/profile/follow/{username} - Follow a user
//! - DELETE /api/v1/profile/follow/{username} - Unfollow a user

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{PublicProfileResponse, UserResponse};
use crate::models::UpdateProfileInput;
use crate::services::UserServiceError;

/// Build the protected profile router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", put(update_profile))
        .route("/password", put(change_password))
        .route("/deactivate", post(deactivate))
        .route("/follow/{username}", post(follow))
        .route("/follow/{username}", delete(unfollow))
}

/// GET /api/v1/users/{username} - Public profile lookup
pub async fn get_public_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<PublicProfileResponse>, ApiError> {
    let user = state
        .user_service
        .get_by_username(&username)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let followers = state
        .user_repo
        .find_followers(&user.username)
        .await
        .map_err(|e| ApiError::from(UserServiceError::InternalError(e)))?;

    Ok(Json(PublicProfileResponse::new(user, followers.len() as i64)))
}

/// PUT /api/v1/profile - Update own profile
async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<UpdateProfileInput>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated = state.user_service.update_profile(user.0.id, input).await?;
    Ok(Json(updated.into()))
}

/// Request body for password change
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// PUT /api/v1/profile/password - Change password
///
/// All sessions are revoked on success, the client must log in again.
async fn change_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .user_service
        .change_password(user.0.id, &body.current_password, &body.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/profile/deactivate - Deactivate own account
async fn deactivate(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    state.user_service.deactivate(user.0.id).await?;
    tracing::info!("User {} deactivated their account", user.0.username);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/profile/follow/{username} - Follow a user
async fn follow(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated = state.user_service.follow(user.0.id, &username).await?;
    Ok(Json(updated.into()))
}

/// DELETE /api/v1/profile/follow/{username} - Unfollow a user
async fn unfollow(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated = state.user_service.unfollow(user.0.id, &username).await?;
    Ok(Json(updated.into()))
}
