//! Shared API response types
//!
//! Common response structures used across multiple endpoints so the
//! wire format stays consistent.

use serde::Serialize;

use crate::models::{
    Comment, CommentWithAuthor, ContentItem, PagedResult, Tag, TagWithCount, User,
};

/// User info returned to the account owner
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub profile: crate::models::UserProfile,
    pub created_at: String,
    pub last_login: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_admin: user.is_admin,
            is_active: user.is_active,
            profile: user.profile,
            created_at: user.created_at.to_rfc3339(),
            last_login: user.last_login.map(|t| t.to_rfc3339()),
        }
    }
}

/// Public profile view. No email, no notification preferences.
#[derive(Debug, Serialize)]
pub struct PublicProfileResponse {
    pub id: i64,
    pub username: String,
    pub bio: String,
    pub website: String,
    pub social_links: std::collections::HashMap<String, String>,
    pub profile_picture: Option<String>,
    pub follower_count: i64,
    pub created_at: String,
}

impl PublicProfileResponse {
    pub fn new(user: User, follower_count: i64) -> Self {
        Self {
            id: user.id,
            username: user.username,
            bio: user.profile.bio,
            website: user.profile.website,
            social_links: user.profile.social_links,
            profile_picture: user.profile.profile_picture,
            follower_count,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Full content item response
#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub id: String,
    pub kind: String,
    pub author_id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    pub views: i64,
    pub is_published: bool,
    pub public_link: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<i64>,
}

impl From<ContentItem> for ContentResponse {
    fn from(item: ContentItem) -> Self {
        Self {
            id: item.id,
            kind: item.kind.as_str().to_string(),
            author_id: item.author_id,
            title: item.title,
            body: item.body,
            problem: item.problem,
            solution: item.solution,
            results: item.results,
            font: item.font,
            views: item.views,
            is_published: item.is_published,
            public_link: item.public_link,
            created_at: item.created_at.to_rfc3339(),
            updated_at: item.updated_at.to_rfc3339(),
            tags: None,
            like_count: None,
            comment_count: None,
        }
    }
}

impl ContentResponse {
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn with_engagement(mut self, like_count: i64, comment_count: i64) -> Self {
        self.like_count = Some(like_count);
        self.comment_count = Some(comment_count);
        self
    }
}

/// Paginated content list response
#[derive(Debug, Serialize)]
pub struct PaginatedContentResponse {
    pub items: Vec<ContentResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl From<PagedResult<ContentItem>> for PaginatedContentResponse {
    fn from(page: PagedResult<ContentItem>) -> Self {
        let total_pages = page.total_pages();
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            total_pages,
        }
    }
}

/// Comment response with the commenter's username
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: String,
    pub content_id: String,
    pub user_id: i64,
    pub username: Option<String>,
    pub body: String,
    pub created_at: String,
}

impl From<CommentWithAuthor> for CommentResponse {
    fn from(c: CommentWithAuthor) -> Self {
        Self {
            id: c.comment.id,
            content_id: c.comment.content_id,
            user_id: c.comment.user_id,
            username: Some(c.username),
            body: c.comment.body,
            created_at: c.comment.created_at.to_rfc3339(),
        }
    }
}

impl From<Comment> for CommentResponse {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            content_id: c.content_id,
            user_id: c.user_id,
            username: None,
            body: c.body,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// Tag response, optionally carrying a usage count
#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_count: Option<i64>,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            usage_count: None,
        }
    }
}

impl From<TagWithCount> for TagResponse {
    fn from(t: TagWithCount) -> Self {
        Self {
            id: t.tag.id,
            name: t.tag.name,
            usage_count: Some(t.usage_count),
        }
    }
}
