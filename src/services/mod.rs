//! Services layer - Business logic
//!
//! This module contains all business logic for the GalaxyWrite platform.
//! Services are responsible for:
//! - Implementing business rules and permission checks
//! - Coordinating between repositories, cache and notifications
//! - Handling validation, sanitization and error cases

pub mod analytics;
pub mod comment;
pub mod content;
pub mod draft;
pub mod like;
pub mod media;
pub mod notification;
pub mod password;
pub mod rate_limiter;
pub mod sanitize;
pub mod user;

pub use analytics::{AnalyticsService, AnalyticsServiceError};
pub use comment::{CommentService, CommentServiceError};
pub use content::{ContentService, ContentServiceError};
pub use draft::{DraftService, DraftServiceError};
pub use like::{LikeService, LikeServiceError, LikeStatus};
pub use media::{MediaService, MediaServiceError};
pub use notification::{NotificationService, NotificationServiceError};
pub use password::{hash_password, verify_password};
pub use rate_limiter::LoginRateLimiter;
pub use sanitize::{sanitize_body, sanitize_text};
pub use user::{LoginInput, RegisterInput, UserService, UserServiceError};
