//! GalaxyWrite - A publishing platform for blogs and case studies

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use galaxywrite::{
    api::{self, AppState, RequestStats},
    cache::create_cache,
    config::Config,
    db::{
        self,
        repositories::{
            SqlxAnalyticsRepository, SqlxCommentRepository, SqlxContentRepository,
            SqlxDraftRepository, SqlxLikeRepository, SqlxMediaRepository,
            SqlxNotificationRepository, SqlxSessionRepository, SqlxTagRepository,
            SqlxUserRepository,
        },
    },
    services::{
        AnalyticsService, CommentService, ContentService, DraftService, LikeService,
        LoginRateLimiter, MediaService, NotificationService, UserService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "galaxywrite=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting GalaxyWrite...");

    // Load configuration (file plus GALAXYWRITE_* environment overrides)
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Initialize cache
    let cache = Arc::new(create_cache(&config.cache));
    tracing::info!("Cache initialized");

    // Create repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let content_repo = SqlxContentRepository::boxed(pool.clone());
    let tag_repo = SqlxTagRepository::boxed(pool.clone());
    let media_repo = SqlxMediaRepository::boxed(pool.clone());
    let comment_repo = SqlxCommentRepository::boxed(pool.clone());
    let like_repo = SqlxLikeRepository::boxed(pool.clone());
    let notification_repo = SqlxNotificationRepository::boxed(pool.clone());
    let draft_repo = SqlxDraftRepository::boxed(pool.clone());
    let analytics_repo = SqlxAnalyticsRepository::boxed(pool.clone());

    // Wire up services
    let user_service = Arc::new(UserService::with_session_lifetime(
        user_repo.clone(),
        session_repo,
        config.session.lifetime_days,
    ));
    let content_service = Arc::new(ContentService::new(
        content_repo.clone(),
        tag_repo,
        user_repo.clone(),
        notification_repo.clone(),
        cache,
        &config.server.public_url,
    ));
    let comment_service = Arc::new(CommentService::new(
        comment_repo,
        content_repo.clone(),
        user_repo.clone(),
        notification_repo.clone(),
    ));
    let like_service = Arc::new(LikeService::new(
        like_repo,
        content_repo.clone(),
        user_repo.clone(),
        notification_repo.clone(),
    ));
    let media_service = Arc::new(MediaService::new(
        media_repo,
        content_repo,
        config.upload.clone(),
    ));
    let notification_service = Arc::new(NotificationService::new(notification_repo));
    let draft_service = Arc::new(DraftService::new(draft_repo, content_service.clone()));
    let analytics_service = Arc::new(AnalyticsService::new(analytics_repo));

    let rate_limiter = Arc::new(LoginRateLimiter::new());
    let request_stats = Arc::new(RequestStats::new());

    let state = AppState {
        pool: pool.clone(),
        user_service: user_service.clone(),
        user_repo,
        content_service,
        comment_service,
        like_service,
        media_service,
        notification_service,
        draft_service,
        analytics_service,
        rate_limiter: rate_limiter.clone(),
        request_stats,
    };

    // Rate limiter cleanup task (runs every 5 minutes)
    {
        let limiter = rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(300));
            loop {
                interval.tick().await;
                limiter.cleanup().await;
            }
        });
    }

    // Expired session cleanup task (runs hourly)
    {
        let users = user_service.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(3600));
            loop {
                interval.tick().await;
                match users.cleanup_expired_sessions().await {
                    Ok(n) if n > 0 => tracing::info!("Removed {} expired sessions", n),
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Session cleanup failed: {}", e),
                }
            }
        });
    }

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
