//! Tag model
//!
//! Tags categorize content items across kinds. Names are unique and
//! normalized (trimmed, lowercased) before storage; the association with
//! content items lives in the `content_tags` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    /// Unique identifier (UUID)
    pub id: String,
    /// Normalized tag name
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Create a new Tag with a fresh UUID
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// Tag with usage count for popular-tag listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagWithCount {
    /// The tag itself
    #[serde(flatten)]
    pub tag: Tag,
    /// Number of published content items carrying this tag
    pub usage_count: i64,
}

/// Normalize a comma-separated tag string into clean tag names.
///
/// Names are trimmed, lowercased and deduplicated; empty entries are
/// dropped.
pub fn parse_tag_names(raw: &str) -> Vec<String> {
    let mut names = Vec::new();
    for part in raw.split(',') {
        let name = part.trim().to_lowercase();
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_new() {
        let tag = Tag::new("rust");
        assert!(!tag.id.is_empty());
        assert_eq!(tag.name, "rust");
    }

    #[test]
    fn test_parse_tag_names() {
        assert_eq!(
            parse_tag_names("Rust, Web,  rust , , systems"),
            vec!["rust", "web", "systems"]
        );
        assert!(parse_tag_names("").is_empty());
        assert!(parse_tag_names(" , ,").is_empty());
    }
}
