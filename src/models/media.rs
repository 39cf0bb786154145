//! Media model
//!
//! Uploaded files are stored as base64 text on the media row, attached to
//! a content item. The media type is classified from the declared MIME
//! type at upload time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Broad media classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Still image
    Image,
    /// Video clip
    Video,
    /// Animated GIF
    Gif,
}

impl MediaType {
    /// Convert type to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Gif => "gif",
        }
    }

    /// Parse type from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            "gif" => Some(MediaType::Gif),
            _ => None,
        }
    }

    /// Classify a MIME type into a media type.
    ///
    /// GIFs are split out from other images because they are rendered
    /// differently by clients.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.to_lowercase();
        if mime == "image/gif" {
            Some(MediaType::Gif)
        } else if mime.starts_with("image/") {
            Some(MediaType::Image)
        } else if mime.starts_with("video/") {
            Some(MediaType::Video)
        } else {
            None
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Media entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    /// Unique identifier (UUID)
    pub id: String,
    /// Content item this media belongs to
    pub content_id: String,
    /// User who uploaded the file
    pub uploader_id: i64,
    /// Media classification
    pub media_type: MediaType,
    /// Original filename
    pub filename: String,
    /// Base64-encoded file contents
    pub data: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for attaching media to a content item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMediaInput {
    /// Content item id
    pub content_id: String,
    /// Uploader user id
    pub uploader_id: i64,
    /// Declared MIME type
    pub mime_type: String,
    /// Original filename
    pub filename: String,
    /// Base64-encoded file contents
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_from_mime() {
        assert_eq!(MediaType::from_mime("image/png"), Some(MediaType::Image));
        assert_eq!(MediaType::from_mime("image/jpeg"), Some(MediaType::Image));
        assert_eq!(MediaType::from_mime("image/gif"), Some(MediaType::Gif));
        assert_eq!(MediaType::from_mime("video/mp4"), Some(MediaType::Video));
        assert_eq!(MediaType::from_mime("application/pdf"), None);
    }

    #[test]
    fn test_media_type_roundtrip() {
        for t in [MediaType::Image, MediaType::Video, MediaType::Gif] {
            assert_eq!(MediaType::from_str(t.as_str()), Some(t));
        }
        assert_eq!(MediaType::from_str("audio"), None);
    }
}
