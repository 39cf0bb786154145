//! Content item model
//!
//! This module provides:
//! - `ContentItem` entity covering both blogs and case studies
//! - `ContentKind` discriminator
//! - Input types for creating and updating content
//! - Pagination types for list queries
//!
//! Blogs carry a single `body`; case studies carry `problem`, `solution`
//! and `results` sections. Both live in one table and one Rust type so that
//! comments, likes and media can reference any item uniformly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The two kinds of publishable content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Free-form blog post
    Blog,
    /// Structured case study
    CaseStudy,
}

impl ContentKind {
    /// Convert kind to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Blog => "blog",
            ContentKind::CaseStudy => "case_study",
        }
    }

    /// Parse kind from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "blog" => Some(ContentKind::Blog),
            "case_study" => Some(ContentKind::CaseStudy),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Content item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    /// Unique identifier (UUID)
    pub id: String,
    /// Content kind discriminator
    pub kind: ContentKind,
    /// Author user ID
    pub author_id: i64,
    /// Title
    pub title: String,
    /// Blog body (blogs only)
    pub body: Option<String>,
    /// Problem statement (case studies only)
    pub problem: Option<String>,
    /// Solution description (case studies only)
    pub solution: Option<String>,
    /// Results summary (case studies only)
    pub results: Option<String>,
    /// Preferred display font
    pub font: Option<String>,
    /// View count
    #[serde(default)]
    pub views: i64,
    /// Whether the item is publicly visible
    pub is_published: bool,
    /// Shareable public link
    pub public_link: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    /// Combined searchable text of the item, joined by newlines.
    ///
    /// For blogs this is title + body; for case studies it is title plus
    /// all three sections.
    pub fn searchable_text(&self) -> String {
        let mut parts = vec![self.title.as_str()];
        match self.kind {
            ContentKind::Blog => {
                if let Some(body) = &self.body {
                    parts.push(body);
                }
            }
            ContentKind::CaseStudy => {
                for section in [&self.problem, &self.solution, &self.results] {
                    if let Some(text) = section {
                        parts.push(text);
                    }
                }
            }
        }
        parts.join("\n")
    }
}

/// Input for creating a new content item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContentInput {
    /// Content kind
    pub kind: ContentKind,
    /// Author user ID
    pub author_id: i64,
    /// Title
    pub title: String,
    /// Blog body (blogs only)
    pub body: Option<String>,
    /// Problem statement (case studies only)
    pub problem: Option<String>,
    /// Solution description (case studies only)
    pub solution: Option<String>,
    /// Results summary (case studies only)
    pub results: Option<String>,
    /// Preferred display font
    pub font: Option<String>,
    /// Comma-separated tag names
    pub tags: Option<String>,
    /// Whether to publish immediately (defaults to true)
    pub is_published: Option<bool>,
}

impl CreateContentInput {
    /// Create input for a new blog post
    pub fn blog(author_id: i64, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Blog,
            author_id,
            title: title.into(),
            body: Some(body.into()),
            problem: None,
            solution: None,
            results: None,
            font: None,
            tags: None,
            is_published: None,
        }
    }

    /// Create input for a new case study
    pub fn case_study(
        author_id: i64,
        title: impl Into<String>,
        problem: impl Into<String>,
        solution: impl Into<String>,
        results: impl Into<String>,
    ) -> Self {
        Self {
            kind: ContentKind::CaseStudy,
            author_id,
            title: title.into(),
            body: None,
            problem: Some(problem.into()),
            solution: Some(solution.into()),
            results: Some(results.into()),
            font: None,
            tags: None,
            is_published: None,
        }
    }

    /// Set the tags string
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Set the display font
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    /// Set the published flag
    pub fn with_published(mut self, is_published: bool) -> Self {
        self.is_published = Some(is_published);
        self
    }
}

/// Input for updating an existing content item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateContentInput {
    /// New title (optional)
    pub title: Option<String>,
    /// New blog body (optional)
    pub body: Option<String>,
    /// New problem statement (optional)
    pub problem: Option<String>,
    /// New solution description (optional)
    pub solution: Option<String>,
    /// New results summary (optional)
    pub results: Option<String>,
    /// New display font (optional)
    pub font: Option<String>,
    /// New comma-separated tag names (optional, replaces existing tags)
    pub tags: Option<String>,
    /// New published flag (optional)
    pub is_published: Option<bool>,
}

impl UpdateContentInput {
    /// Create a new empty UpdateContentInput
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the blog body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the tags string
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Set the published flag
    pub fn with_published(mut self, is_published: bool) -> Self {
        self.is_published = Some(is_published);
        self
    }

    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.body.is_some()
            || self.problem.is_some()
            || self.solution.is_some()
            || self.results.is_some()
            || self.font.is_some()
            || self.tags.is_some()
            || self.is_published.is_some()
    }
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        ((self.page.saturating_sub(1)) * self.per_page) as i64
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// A page of results with pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Items per page
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    /// Create a new paged result
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Total number of pages
    pub fn total_pages(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            ((self.total as u32) + self.per_page - 1) / self.per_page
        }
    }

    /// Whether a next page exists
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Whether a previous page exists
    pub fn has_prev(&self) -> bool {
        self.page > 1 && self.total > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        assert_eq!(ContentKind::from_str("blog"), Some(ContentKind::Blog));
        assert_eq!(
            ContentKind::from_str("case_study"),
            Some(ContentKind::CaseStudy)
        );
        assert_eq!(ContentKind::from_str("CASE_STUDY"), Some(ContentKind::CaseStudy));
        assert_eq!(ContentKind::from_str("podcast"), None);
        assert_eq!(ContentKind::Blog.as_str(), "blog");
        assert_eq!(ContentKind::CaseStudy.to_string(), "case_study");
    }

    #[test]
    fn test_blog_input_builder() {
        let input = CreateContentInput::blog(1, "Title", "Body")
            .with_tags("rust, web")
            .with_published(false);

        assert_eq!(input.kind, ContentKind::Blog);
        assert_eq!(input.title, "Title");
        assert_eq!(input.body.as_deref(), Some("Body"));
        assert!(input.problem.is_none());
        assert_eq!(input.tags.as_deref(), Some("rust, web"));
        assert_eq!(input.is_published, Some(false));
    }

    #[test]
    fn test_case_study_input_builder() {
        let input = CreateContentInput::case_study(2, "Title", "P", "S", "R");

        assert_eq!(input.kind, ContentKind::CaseStudy);
        assert!(input.body.is_none());
        assert_eq!(input.problem.as_deref(), Some("P"));
        assert_eq!(input.solution.as_deref(), Some("S"));
        assert_eq!(input.results.as_deref(), Some("R"));
    }

    #[test]
    fn test_update_input_has_changes() {
        assert!(!UpdateContentInput::new().has_changes());
        assert!(UpdateContentInput::new().with_title("New").has_changes());
        assert!(UpdateContentInput::new().with_published(false).has_changes());
    }

    #[test]
    fn test_searchable_text_blog() {
        let item = ContentItem {
            id: "id".to_string(),
            kind: ContentKind::Blog,
            author_id: 1,
            title: "Title".to_string(),
            body: Some("Body".to_string()),
            problem: None,
            solution: None,
            results: None,
            font: None,
            views: 0,
            is_published: true,
            public_link: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(item.searchable_text(), "Title\nBody");
    }

    #[test]
    fn test_list_params_clamping() {
        let params = ListParams::new(0, 500);
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 100);
        assert_eq!(params.offset(), 0);

        let params = ListParams::new(3, 10);
        assert_eq!(params.offset(), 20);
        assert_eq!(params.limit(), 10);
    }

    #[test]
    fn test_paged_result_math() {
        let params = ListParams::new(2, 10);
        let result: PagedResult<i32> = PagedResult::new(vec![1, 2, 3], 25, &params);

        assert_eq!(result.total_pages(), 3);
        assert!(result.has_next());
        assert!(result.has_prev());

        let empty: PagedResult<i32> = PagedResult::new(vec![], 0, &ListParams::default());
        assert_eq!(empty.total_pages(), 0);
        assert!(!empty.has_next());
        assert!(!empty.has_prev());
    }
}
