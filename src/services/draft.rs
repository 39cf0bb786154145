//! Draft service
//!
//! Drafts hold a free-form JSON working copy. Publishing a draft turns
//! the payload into a real content item through the content service and
//! links the created item back onto the draft row.

use crate::db::repositories::DraftRepository;
use crate::models::{ContentItem, CreateContentInput, ContentKind, Draft, SaveDraftInput, User};
use crate::services::content::{ContentService, ContentServiceError};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Error types for draft service operations
#[derive(Debug, thiserror::Error)]
pub enum DraftServiceError {
    /// Draft not found
    #[error("Draft not found")]
    NotFound,

    /// Actor is not allowed to perform the operation
    #[error("Permission denied")]
    PermissionDenied,

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Draft was already published
    #[error("Draft was already published")]
    AlreadyPublished,

    /// Publishing the payload failed
    #[error(transparent)]
    Content(ContentServiceError),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Draft service
pub struct DraftService {
    draft_repo: Arc<dyn DraftRepository>,
    content_service: Arc<ContentService>,
}

impl DraftService {
    /// Create a new draft service
    pub fn new(draft_repo: Arc<dyn DraftRepository>, content_service: Arc<ContentService>) -> Self {
        Self {
            draft_repo,
            content_service,
        }
    }

    /// Save a draft. An existing id overwrites that draft's payload;
    /// otherwise a new draft is created.
    pub async fn save(
        &self,
        input: SaveDraftInput,
        actor: &User,
    ) -> Result<Draft, DraftServiceError> {
        if input.user_id != actor.id {
            return Err(DraftServiceError::PermissionDenied);
        }
        if !input.payload.is_object() {
            return Err(DraftServiceError::ValidationError(
                "Draft payload must be a JSON object".to_string(),
            ));
        }

        let now = Utc::now();
        let draft = match input.id {
            Some(id) => {
                let existing = self
                    .draft_repo
                    .get_by_id(&id)
                    .await
                    .context("Failed to get draft")?
                    .ok_or(DraftServiceError::NotFound)?;
                if existing.user_id != actor.id {
                    return Err(DraftServiceError::PermissionDenied);
                }
                Draft {
                    id,
                    user_id: actor.id,
                    kind: input.kind,
                    payload: input.payload,
                    content_id: existing.content_id,
                    created_at: existing.created_at,
                    updated_at: now,
                }
            }
            None => Draft {
                id: Uuid::new_v4().to_string(),
                user_id: actor.id,
                kind: input.kind,
                payload: input.payload,
                content_id: None,
                created_at: now,
                updated_at: now,
            },
        };

        Ok(self
            .draft_repo
            .upsert(&draft)
            .await
            .context("Failed to save draft")?)
    }

    /// Get a draft. Only the owner may read it.
    pub async fn get(&self, id: &str, actor: &User) -> Result<Draft, DraftServiceError> {
        let draft = self
            .draft_repo
            .get_by_id(id)
            .await
            .context("Failed to get draft")?
            .ok_or(DraftServiceError::NotFound)?;

        if draft.user_id != actor.id {
            return Err(DraftServiceError::PermissionDenied);
        }
        Ok(draft)
    }

    /// List the actor's drafts, most recently updated first
    pub async fn list(&self, actor: &User) -> Result<Vec<Draft>, DraftServiceError> {
        Ok(self
            .draft_repo
            .list_by_user(actor.id)
            .await
            .context("Failed to list drafts")?)
    }

    /// Delete a draft. The owner and admins may delete.
    pub async fn delete(&self, id: &str, actor: &User) -> Result<(), DraftServiceError> {
        let draft = self
            .draft_repo
            .get_by_id(id)
            .await
            .context("Failed to get draft")?
            .ok_or(DraftServiceError::NotFound)?;

        if draft.user_id != actor.id && !actor.is_admin {
            return Err(DraftServiceError::PermissionDenied);
        }

        self.draft_repo
            .delete(id)
            .await
            .context("Failed to delete draft")?;
        Ok(())
    }

    /// Publish a draft as a content item.
    ///
    /// The payload must carry the fields the draft's kind requires. The
    /// created item id is recorded on the draft.
    pub async fn publish(&self, id: &str, actor: &User) -> Result<ContentItem, DraftServiceError> {
        let draft = self.get(id, actor).await?;
        if draft.is_published() {
            return Err(DraftServiceError::AlreadyPublished);
        }

        let input = payload_to_input(&draft, actor.id)?;
        let item = self
            .content_service
            .create(input, actor)
            .await
            .map_err(DraftServiceError::Content)?;

        self.draft_repo
            .set_content_id(id, &item.id)
            .await
            .context("Failed to link draft to content")?;

        Ok(item)
    }
}

fn payload_to_input(draft: &Draft, author_id: i64) -> Result<CreateContentInput, DraftServiceError> {
    let field = |name: &str| -> Option<String> {
        draft
            .payload
            .get(name)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    };

    let title = field("title").ok_or_else(|| {
        DraftServiceError::ValidationError("Draft payload is missing a title".to_string())
    })?;

    let mut input = match draft.kind {
        ContentKind::Blog => {
            let body = field("body").ok_or_else(|| {
                DraftServiceError::ValidationError("Draft payload is missing a body".to_string())
            })?;
            CreateContentInput::blog(author_id, title, body)
        }
        ContentKind::CaseStudy => {
            let section = |name: &str| {
                field(name).ok_or_else(|| {
                    DraftServiceError::ValidationError(format!(
                        "Draft payload is missing a {} section",
                        name
                    ))
                })
            };
            CreateContentInput::case_study(
                author_id,
                title,
                section("problem")?,
                section("solution")?,
                section("results")?,
            )
        }
    };

    if let Some(tags) = field("tags") {
        input = input.with_tags(tags);
    }
    if let Some(font) = field("font") {
        input = input.with_font(font);
    }

    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::db::repositories::{
        SqlxContentRepository, SqlxDraftRepository, SqlxNotificationRepository,
        SqlxTagRepository, SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations, DbPool};
    use crate::models::CreateUserInput;
    use serde_json::json;

    async fn setup() -> (DbPool, Arc<ContentService>, DraftService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let content_service = Arc::new(ContentService::new(
            SqlxContentRepository::boxed(pool.clone()),
            SqlxTagRepository::boxed(pool.clone()),
            SqlxUserRepository::boxed(pool.clone()),
            SqlxNotificationRepository::boxed(pool.clone()),
            Arc::new(MemoryCache::new()),
            "http://localhost:8080",
        ));
        let service = DraftService::new(
            SqlxDraftRepository::boxed(pool.clone()),
            content_service.clone(),
        );
        (pool, content_service, service)
    }

    async fn create_user(pool: &DbPool, username: &str) -> User {
        let repo = SqlxUserRepository::new(pool.clone());
        repo.create(&CreateUserInput::new(
            username,
            format!("{}@example.com", username),
            "$argon2id$hash",
        ))
        .await
        .expect("Failed to create user")
    }

    fn save_input(user_id: i64, payload: serde_json::Value) -> SaveDraftInput {
        SaveDraftInput {
            id: None,
            user_id,
            kind: ContentKind::Blog,
            payload,
        }
    }

    #[tokio::test]
    async fn test_save_and_overwrite() {
        let (pool, _, service) = setup().await;
        let user = create_user(&pool, "writer").await;

        let draft = service
            .save(save_input(user.id, json!({"title": "v1"})), &user)
            .await
            .unwrap();

        let overwritten = service
            .save(
                SaveDraftInput {
                    id: Some(draft.id.clone()),
                    user_id: user.id,
                    kind: ContentKind::Blog,
                    payload: json!({"title": "v2", "body": "text"}),
                },
                &user,
            )
            .await
            .unwrap();
        assert_eq!(overwritten.payload["title"], "v2");
        assert_eq!(service.list(&user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_payload_must_be_object() {
        let (pool, _, service) = setup().await;
        let user = create_user(&pool, "writer").await;

        let result = service.save(save_input(user.id, json!("nope")), &user).await;
        assert!(matches!(
            result,
            Err(DraftServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_drafts_are_private() {
        let (pool, _, service) = setup().await;
        let writer = create_user(&pool, "writer").await;
        let other = create_user(&pool, "other").await;

        let draft = service
            .save(save_input(writer.id, json!({"title": "secret"})), &writer)
            .await
            .unwrap();

        assert!(matches!(
            service.get(&draft.id, &other).await,
            Err(DraftServiceError::PermissionDenied)
        ));
        assert!(service.list(&other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_blog_draft() {
        let (pool, _, service) = setup().await;
        let user = create_user(&pool, "writer").await;

        let draft = service
            .save(
                save_input(
                    user.id,
                    json!({"title": "Launch", "body": "We are live", "tags": "news, rust"}),
                ),
                &user,
            )
            .await
            .unwrap();

        let item = service.publish(&draft.id, &user).await.unwrap();
        assert_eq!(item.title, "Launch");
        assert!(item.is_published);

        let after = service.get(&draft.id, &user).await.unwrap();
        assert_eq!(after.content_id.as_deref(), Some(item.id.as_str()));

        assert!(matches!(
            service.publish(&draft.id, &user).await,
            Err(DraftServiceError::AlreadyPublished)
        ));
    }

    #[tokio::test]
    async fn test_content_delete_unlinks_draft() {
        let (pool, content_service, service) = setup().await;
        let user = create_user(&pool, "writer").await;

        let draft = service
            .save(
                save_input(user.id, json!({"title": "Launch", "body": "We are live"})),
                &user,
            )
            .await
            .unwrap();
        let item = service.publish(&draft.id, &user).await.unwrap();

        content_service.delete(&item.id, &user).await.unwrap();

        let after = service.get(&draft.id, &user).await.unwrap();
        assert_eq!(after.content_id, None);

        // With the link gone the draft can be published again.
        let republished = service.publish(&draft.id, &user).await.unwrap();
        assert_ne!(republished.id, item.id);
    }

    #[tokio::test]
    async fn test_publish_requires_complete_payload() {
        let (pool, _, service) = setup().await;
        let user = create_user(&pool, "writer").await;

        let draft = service
            .save(save_input(user.id, json!({"title": "No body yet"})), &user)
            .await
            .unwrap();

        assert!(matches!(
            service.publish(&draft.id, &user).await,
            Err(DraftServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_publish_case_study_draft() {
        let (pool, _, service) = setup().await;
        let user = create_user(&pool, "writer").await;

        let draft = service
            .save(
                SaveDraftInput {
                    id: None,
                    user_id: user.id,
                    kind: ContentKind::CaseStudy,
                    payload: json!({
                        "title": "Scaling",
                        "problem": "Slow",
                        "solution": "Cache",
                        "results": "Fast"
                    }),
                },
                &user,
            )
            .await
            .unwrap();

        let item = service.publish(&draft.id, &user).await.unwrap();
        assert_eq!(item.kind, ContentKind::CaseStudy);
        assert_eq!(item.problem.as_deref(), Some("Slow"));
    }
}
