//! Media service
//!
//! Attaching base64-encoded uploads to content items. The payload is
//! decoded once at upload time to verify it is valid base64 and within
//! the configured size limit, then stored as text.

use crate::config::UploadConfig;
use crate::db::repositories::{ContentRepository, MediaRepository, MediaSummary};
use crate::models::{CreateMediaInput, Media, MediaType, User};
use anyhow::Context;
use chrono::Utc;
use data_encoding::BASE64;
use std::sync::Arc;
use uuid::Uuid;

/// Error types for media service operations
#[derive(Debug, thiserror::Error)]
pub enum MediaServiceError {
    /// Content item or media not found
    #[error("Not found")]
    NotFound,

    /// Actor is not allowed to perform the operation
    #[error("Permission denied")]
    PermissionDenied,

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Media service
pub struct MediaService {
    media_repo: Arc<dyn MediaRepository>,
    content_repo: Arc<dyn ContentRepository>,
    upload_config: UploadConfig,
}

impl MediaService {
    /// Create a new media service
    pub fn new(
        media_repo: Arc<dyn MediaRepository>,
        content_repo: Arc<dyn ContentRepository>,
        upload_config: UploadConfig,
    ) -> Self {
        Self {
            media_repo,
            content_repo,
            upload_config,
        }
    }

    /// Attach an upload to a content item.
    ///
    /// Only the content author or an admin may attach media.
    pub async fn upload(
        &self,
        input: CreateMediaInput,
        actor: &User,
    ) -> Result<Media, MediaServiceError> {
        if input.uploader_id != actor.id {
            return Err(MediaServiceError::PermissionDenied);
        }

        let item = self
            .content_repo
            .get_by_id(&input.content_id)
            .await
            .context("Failed to get content item")?
            .ok_or(MediaServiceError::NotFound)?;

        if !actor.can_edit(item.author_id) {
            return Err(MediaServiceError::PermissionDenied);
        }

        if !self.upload_config.is_type_allowed(&input.mime_type) {
            return Err(MediaServiceError::ValidationError(format!(
                "File type '{}' is not allowed",
                input.mime_type
            )));
        }

        let media_type = MediaType::from_mime(&input.mime_type).ok_or_else(|| {
            MediaServiceError::ValidationError(format!(
                "Cannot classify file type '{}'",
                input.mime_type
            ))
        })?;

        let filename = input.filename.trim();
        if filename.is_empty() {
            return Err(MediaServiceError::ValidationError(
                "Filename cannot be empty".to_string(),
            ));
        }

        let decoded = BASE64
            .decode(input.data.as_bytes())
            .map_err(|_| MediaServiceError::ValidationError("Invalid base64 data".to_string()))?;
        if decoded.is_empty() {
            return Err(MediaServiceError::ValidationError(
                "File is empty".to_string(),
            ));
        }
        if decoded.len() as u64 > self.upload_config.max_file_size {
            return Err(MediaServiceError::ValidationError(format!(
                "File exceeds the maximum size of {} bytes",
                self.upload_config.max_file_size
            )));
        }

        let media = Media {
            id: Uuid::new_v4().to_string(),
            content_id: item.id,
            uploader_id: actor.id,
            media_type,
            filename: filename.to_string(),
            data: input.data,
            created_at: Utc::now(),
        };

        Ok(self
            .media_repo
            .create(&media)
            .await
            .context("Failed to create media")?)
    }

    /// Get a media item including its payload
    pub async fn get(&self, id: &str) -> Result<Media, MediaServiceError> {
        self.media_repo
            .get_by_id(id)
            .await
            .context("Failed to get media")?
            .ok_or(MediaServiceError::NotFound)
    }

    /// List media metadata for a content item
    pub async fn list_for_content(
        &self,
        content_id: &str,
    ) -> Result<Vec<MediaSummary>, MediaServiceError> {
        Ok(self
            .media_repo
            .list_by_content(content_id)
            .await
            .context("Failed to list media")?)
    }

    /// Delete a media item. The uploader and admins may delete.
    pub async fn delete(&self, id: &str, actor: &User) -> Result<(), MediaServiceError> {
        let media = self
            .media_repo
            .get_by_id(id)
            .await
            .context("Failed to get media")?
            .ok_or(MediaServiceError::NotFound)?;

        if media.uploader_id != actor.id && !actor.is_admin {
            return Err(MediaServiceError::PermissionDenied);
        }

        self.media_repo
            .delete(id)
            .await
            .context("Failed to delete media")?;

        Ok(())
    }
}
