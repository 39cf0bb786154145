//! Repository layer
//!
//! Repositories wrap all SQL behind async traits so services depend on
//! behavior, not on the database. Each trait has a SQLx implementation
//! plus a `boxed()` constructor producing the `Arc<dyn Trait>` handle
//! that gets wired into the services at startup.

pub mod analytics;
pub mod comment;
pub mod content;
pub mod draft;
pub mod media;
pub mod notification;
pub mod session;
pub mod tag;
pub mod user;

pub use analytics::{AnalyticsRepository, SqlxAnalyticsRepository};
pub use comment::{CommentRepository, LikeRepository, SqlxCommentRepository, SqlxLikeRepository};
pub use content::{ContentRepository, SqlxContentRepository};
pub use draft::{DraftRepository, SqlxDraftRepository};
pub use media::{MediaRepository, MediaSummary, SqlxMediaRepository};
pub use notification::{NotificationRepository, SqlxNotificationRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use tag::{SqlxTagRepository, TagRepository};
pub use user::{SqlxUserRepository, UserRepository};
