//! Data models
//!
//! This module contains all data structures used throughout the platform.
//! Models represent:
//! - Database entities (User, Session, ContentItem, Tag, Media, Comment,
//!   Like, Notification, Draft, AnalyticsEvent)
//! - Internal data transfer objects and input builders

mod analytics;
mod comment;
mod content;
mod draft;
mod media;
mod notification;
mod session;
mod tag;
mod user;

pub use analytics::{AnalyticsEvent, CreatorSummary, PlatformOverview};
pub use comment::{Comment, CommentWithAuthor, CreateCommentInput, Like};
pub use content::{
    ContentItem, ContentKind, CreateContentInput, ListParams, PagedResult, UpdateContentInput,
};
pub use draft::{Draft, SaveDraftInput};
pub use media::{CreateMediaInput, Media, MediaType};
pub use notification::Notification;
pub use session::Session;
pub use tag::{parse_tag_names, Tag, TagWithCount};
pub use user::{CreateUserInput, UpdateProfileInput, User, UserProfile};
