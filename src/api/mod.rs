//! API layer - HTTP handlers and routing
//!
//! All endpoints live under /api/v1. Public routes get optional auth so
//! handlers can see the viewer when a session is presented; protected
//! routes require a valid session; admin routes additionally require
//! the admin flag.

pub mod admin;
pub mod analytics;
pub mod auth;
pub mod comments;
pub mod content;
pub mod drafts;
pub mod media;
pub mod middleware;
pub mod notifications;
pub mod profile;
pub mod responses;
pub mod tags;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser, RequestStats};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (need admin flag)
    let admin_routes = Router::new()
        .nest("/admin", admin::router())
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need auth but not admin)
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .nest("/profile", profile::router())
        .nest("/notifications", notifications::router())
        .nest("/drafts", drafts::router())
        .nest("/analytics", analytics::router())
        .merge(content::protected_router())
        .merge(comments::protected_router())
        .merge(media::protected_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes, with optional auth so handlers can see the viewer
    Router::new()
        .nest("/auth", auth::public_router())
        .nest("/tags", tags::router())
        .route(
            "/users/{username}",
            axum::routing::get(profile::get_public_profile),
        )
        .merge(content::public_router())
        .merge(comments::public_router())
        .merge(media::public_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth,
        ))
        .merge(admin_routes)
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            cors_origin
                .parse::<HeaderValue>()
                .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:8080")),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // Request stats middleware (outermost layer, runs for all requests)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::request_stats_middleware,
        ))
        .with_state(state)
}
