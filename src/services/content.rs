//! Content service
//!
//! Business logic for blogs and case studies:
//! - creation with validation, sanitization and shareable public links
//! - author-or-admin permission checks on mutation
//! - published listings and search over published items only
//! - tag management and follower notifications on publish

use crate::cache::{self, MemoryCache};
use crate::db::repositories::{
    ContentRepository, NotificationRepository, TagRepository, UserRepository,
};
use crate::models::{
    parse_tag_names, ContentItem, ContentKind, CreateContentInput, ListParams, Notification,
    PagedResult, Tag, TagWithCount, UpdateContentInput, User,
};
use crate::services::sanitize::{sanitize_body, sanitize_text};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const POPULAR_TAGS_TTL: Duration = Duration::from_secs(300);
const PUBLISHED_LIST_TTL: Duration = Duration::from_secs(60);
const MAX_TITLE_LENGTH: usize = 255;

/// Error types for content service operations
#[derive(Debug, thiserror::Error)]
pub enum ContentServiceError {
    /// Content item not found
    #[error("Content not found")]
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

/// Content service for blogs and case studies
pub struct ContentService {
    content_repo: Arc<dyn ContentRepository>,
    tag_repo: Arc<dyn TagRepository>,
    user_repo: Arc<dyn UserRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
    cache: Arc<MemoryCache>,
    public_url: String,
}

impl ContentService {
    /// Create a new content service
    pub fn new(
        content_repo: Arc<dyn ContentRepository>,
        tag_repo: Arc<dyn TagRepository>,
        user_repo: Arc<dyn UserRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
        cache: Arc<MemoryCache>,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            content_repo,
            tag_repo,
            user_repo,
            notification_repo,
            cache,
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a new content item.
    ///
    /// Followers of the author are notified when the item is published
    /// immediately, honoring their notification preference.
    pub async fn create(
        &self,
        mut input: CreateContentInput,
        author: &User,
    ) -> Result<ContentItem, ContentServiceError> {
        if input.author_id != author.id {
            return Err(ContentServiceError::PermissionDenied);
        }

        input.title = sanitize_text(input.title.trim());
        validate_title(&input.title)?;
        sanitize_sections(&mut input.body, &mut input.problem, &mut input.solution, &mut input.results);
        validate_sections(input.kind, &input.body, &input.problem, &input.solution, &input.results)?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let item = ContentItem {
            public_link: self.build_public_link(input.kind, &author.username, &id),
            id,
            kind: input.kind,
            author_id: author.id,
            title: input.title.clone(),
            body: input.body.clone(),
            problem: input.problem.clone(),
            solution: input.solution.clone(),
            results: input.results.clone(),
            font: input.font.clone(),
            views: 0,
            is_published: input.is_published.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        let created = self
            .content_repo
            .create(&item)
            .await
            .context("Failed to create content item")?;

        if let Some(tags) = &input.tags {
            self.assign_tags(&created.id, tags).await?;
        }

        if created.is_published {
            self.notify_followers(author, &created).await?;
        }

        self.invalidate_listings();
        tracing::info!(
            "Created {} '{}' by {} (published: {})",
            created.kind,
            created.title,
            author.username,
            created.is_published
        );

        Ok(created)
    }

    /// Get a content item.
    ///
    /// Unpublished items are only visible to their author and admins.
    /// When `count_view` is set, views are bumped for published items
    /// viewed by someone other than the author.
    pub async fn get(
        &self,
        id: &str,
        viewer: Option<&User>,
        count_view: bool,
    ) -> Result<ContentItem, ContentServiceError> {
        let item = self
            .content_repo
            .get_by_id(id)
            .await
            .context("Failed to get content item")?
            .ok_or(ContentServiceError::NotFound)?;

        if !item.is_published {
            let can_see = viewer.map(|u| u.can_edit(item.author_id)).unwrap_or(false);
            if !can_see {
                return Err(ContentServiceError::NotFound);
            }
        }

        let is_author = viewer.map(|u| u.id == item.author_id).unwrap_or(false);
        if count_view && item.is_published && !is_author {
            self.content_repo
                .increment_views(id)
                .await
                .context("Failed to increment views")?;
        }

        Ok(item)
    }

    /// Update a content item. Only the author or an admin may update.
    pub async fn update(
        &self,
        id: &str,
        mut input: UpdateContentInput,
        actor: &User,
    ) -> Result<ContentItem, ContentServiceError> {
        if !input.has_changes() {
            return Err(ContentServiceError::ValidationError(
                "No fields to update".to_string(),
            ));
        }

        let mut item = self
            .content_repo
            .get_by_id(id)
            .await
            .context("Failed to get content item")?
            .ok_or(ContentServiceError::NotFound)?;

        if !actor.can_edit(item.author_id) {
            return Err(ContentServiceError::PermissionDenied);
        }

        reject_foreign_sections(item.kind, &input)?;

        if let Some(title) = input.title.take() {
            let title = sanitize_text(title.trim());
            validate_title(&title)?;
            item.title = title;
        }
        sanitize_sections(&mut input.body, &mut input.problem, &mut input.solution, &mut input.results);
        if let Some(body) = input.body.take() {
            item.body = Some(body);
        }
        if let Some(problem) = input.problem.take() {
            item.problem = Some(problem);
        }
        if let Some(solution) = input.solution.take() {
            item.solution = Some(solution);
        }
        if let Some(results) = input.results.take() {
            item.results = Some(results);
        }
        if let Some(font) = input.font.take() {
            item.font = Some(font);
        }

        let newly_published = matches!(input.is_published, Some(true)) && !item.is_published;
        if let Some(is_published) = input.is_published {
            item.is_published = is_published;
        }

        let updated = self
            .content_repo
            .update(&item)
            .await
            .context("Failed to update content item")?;

        if let Some(tags) = &input.tags {
            self.assign_tags(id, tags).await?;
        }

        if newly_published {
            if let Some(author) = self
                .user_repo
                .get_by_id(updated.author_id)
                .await
                .context("Failed to get author")?
            {
                self.notify_followers(&author, &updated).await?;
            }
        }

        self.invalidate_listings();

        Ok(updated)
    }

    /// Delete a content item and everything attached to it. Only the
    /// author or an admin may delete.
    pub async fn delete(&self, id: &str, actor: &User) -> Result<(), ContentServiceError> {
        let item = self
            .content_repo
            .get_by_id(id)
            .await
            .context("Failed to get content item")?
            .ok_or(ContentServiceError::NotFound)?;

        if !actor.can_edit(item.author_id) {
            return Err(ContentServiceError::PermissionDenied);
        }

        self.content_repo
            .delete(id)
            .await
            .context("Failed to delete content item")?;

        self.invalidate_listings();
        tracing::info!("Deleted {} '{}' ({})", item.kind, item.title, item.id);

        Ok(())
    }

    /// List published items, newest first. Results are cached briefly.
    pub async fn list_published(
        &self,
        params: &ListParams,
        kind: Option<ContentKind>,
    ) -> Result<PagedResult<ContentItem>, ContentServiceError> {
        let key = cache::published_list_key(
            kind.map(|k| k.as_str()),
            params.page,
            params.per_page,
        );
        if let Some(cached) = self
            .cache
            .get::<PagedResult<ContentItem>>(&key)
            .await
            .context("Failed to read listing cache")?
        {
            return Ok(cached);
        }

        let page = self
            .content_repo
            .list_published(params, kind)
            .await
            .context("Failed to list published content")?;

        self.cache
            .set(&key, &page, PUBLISHED_LIST_TTL)
            .await
            .context("Failed to cache listing")?;

        Ok(page)
    }

    /// List all of an author's items including unpublished ones
    pub async fn list_by_author(
        &self,
        author_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<ContentItem>, ContentServiceError> {
        Ok(self
            .content_repo
            .list_by_author(author_id, params)
            .await
            .context("Failed to list content by author")?)
    }

    /// Search published items by text, optionally filtered by kind and tag
    pub async fn search(
        &self,
        query: &str,
        kind: Option<ContentKind>,
        tag: Option<&str>,
        params: &ListParams,
    ) -> Result<PagedResult<ContentItem>, ContentServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ContentServiceError::ValidationError(
                "Search query cannot be empty".to_string(),
            ));
        }

        Ok(self
            .content_repo
            .search(query, kind, tag, params)
            .await
            .context("Failed to search content")?)
    }

    /// Published items carrying a tag, newest first
    pub async fn content_by_tag(
        &self,
        tag: &str,
        params: &ListParams,
    ) -> Result<PagedResult<ContentItem>, ContentServiceError> {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            return Err(ContentServiceError::ValidationError(
                "Tag name cannot be empty".to_string(),
            ));
        }

        Ok(self
            .content_repo
            .list_published_by_tag(&tag, params)
            .await
            .context("Failed to list content by tag")?)
    }

    /// Tag names attached to a content item
    pub async fn tags_for(&self, content_id: &str) -> Result<Vec<String>, ContentServiceError> {
        Ok(self
            .content_repo
            .get_tag_names(content_id)
            .await
            .context("Failed to get tags")?)
    }

    /// All tags on the platform
    pub async fn all_tags(&self) -> Result<Vec<Tag>, ContentServiceError> {
        Ok(self
            .tag_repo
            .list_all()
            .await
            .context("Failed to list tags")?)
    }

    /// Most used tags on published content. Results are cached.
    pub async fn popular_tags(
        &self,
        limit: i64,
    ) -> Result<Vec<TagWithCount>, ContentServiceError> {
        let key = cache::popular_tags_key(limit);
        if let Some(cached) = self
            .cache
            .get::<Vec<TagWithCount>>(&key)
            .await
            .context("Failed to read tag cache")?
        {
            return Ok(cached);
        }

        let tags = self
            .tag_repo
            .popular(limit)
            .await
            .context("Failed to list popular tags")?;

        self.cache
            .set(&key, &tags, POPULAR_TAGS_TTL)
            .await
            .context("Failed to cache popular tags")?;

        Ok(tags)
    }

    fn build_public_link(&self, kind: ContentKind, username: &str, id: &str) -> String {
        format!(
            "{}/content/{}/{}/{}",
            self.public_url,
            kind.as_str(),
            urlencoding::encode(username),
            id
        )
    }

    async fn assign_tags(&self, content_id: &str, raw: &str) -> Result<(), ContentServiceError> {
        let names = parse_tag_names(raw);
        let mut tag_ids = Vec::with_capacity(names.len());
        for name in &names {
            let tag = self
                .tag_repo
                .get_or_create(name)
                .await
                .context("Failed to resolve tag")?;
            tag_ids.push(tag.id);
        }

        self.content_repo
            .replace_tags(content_id, &tag_ids)
            .await
            .context("Failed to assign tags")?;

        // Tag counts changed
        if let Err(e) = self.cache.delete_prefix("tags:popular:") {
            tracing::warn!("Failed to invalidate tag cache: {}", e);
        }

        Ok(())
    }

    async fn notify_followers(
        &self,
        author: &User,
        item: &ContentItem,
    ) -> Result<(), ContentServiceError> {
        let followers = self
            .user_repo
            .find_followers(&author.username)
            .await
            .context("Failed to find followers")?;

        let label = match item.kind {
            ContentKind::Blog => "blog post",
            ContentKind::CaseStudy => "case study",
        };

        for follower in followers {
            if !follower.profile.notify_followers {
                continue;
            }
            let notification = Notification::new(
                follower.id,
                format!("{} published a new {}: {}", author.username, label, item.title),
            );
            self.notification_repo
                .create(&notification)
                .await
                .context("Failed to create follower notification")?;
        }

        Ok(())
    }

    fn invalidate_listings(&self) {
        if let Err(e) = self.cache.delete_prefix("content:published:") {
            tracing::warn!("Failed to invalidate listing cache: {}", e);
        }
    }
}

fn validate_title(title: &str) -> Result<(), ContentServiceError> {
    if title.is_empty() {
        return Err(ContentServiceError::ValidationError(
            "Title cannot be empty".to_string(),
        ));
    }
    if title.len() > MAX_TITLE_LENGTH {
        return Err(ContentServiceError::ValidationError(format!(
            "Title cannot exceed {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

fn sanitize_sections(
    body: &mut Option<String>,
    problem: &mut Option<String>,
    solution: &mut Option<String>,
    results: &mut Option<String>,
) {
    for section in [body, problem, solution, results] {
        if let Some(text) = section.take() {
            *section = Some(sanitize_body(&text));
        }
    }
}

fn validate_sections(
    kind: ContentKind,
    body: &Option<String>,
    problem: &Option<String>,
    solution: &Option<String>,
    results: &Option<String>,
) -> Result<(), ContentServiceError> {
    match kind {
        ContentKind::Blog => {
            if body.as_deref().map(str::trim).unwrap_or("").is_empty() {
                return Err(ContentServiceError::ValidationError(
                    "Blog posts require a body".to_string(),
                ));
            }
            if problem.is_some() || solution.is_some() || results.is_some() {
                return Err(ContentServiceError::ValidationError(
                    "Blog posts cannot carry case study sections".to_string(),
                ));
            }
        }
        ContentKind::CaseStudy => {
            for (name, section) in [
                ("problem", problem),
                ("solution", solution),
                ("results", results),
            ] {
                if section.as_deref().map(str::trim).unwrap_or("").is_empty() {
                    return Err(ContentServiceError::ValidationError(format!(
                        "Case studies require a {} section",
                        name
                    )));
                }
            }
            if body.is_some() {
                return Err(ContentServiceError::ValidationError(
                    "Case studies cannot carry a blog body".to_string(),
                ));
            }
        }
    }
    Ok(())
}

fn reject_foreign_sections(
    kind: ContentKind,
    input: &UpdateContentInput,
) -> Result<(), ContentServiceError> {
    match kind {
        ContentKind::Blog => {
            if input.problem.is_some() || input.solution.is_some() || input.results.is_some() {
                return Err(ContentServiceError::ValidationError(
                    "Blog posts cannot carry case study sections".to_string(),
                ));
            }
        }
        ContentKind::CaseStudy => {
            if input.body.is_some() {
                return Err(ContentServiceError::ValidationError(
                    "Case studies cannot carry a blog body".to_string(),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxContentRepository, SqlxNotificationRepository, SqlxTagRepository, SqlxUserRepository,
        UserRepository,
    };
    use crate::db::{create_test_pool, migrations, DbPool};
    use crate::models::CreateUserInput;

    async fn setup() -> (DbPool, ContentService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let service = ContentService::new(
            SqlxContentRepository::boxed(pool.clone()),
            SqlxTagRepository::boxed(pool.clone()),
            SqlxUserRepository::boxed(pool.clone()),
            SqlxNotificationRepository::boxed(pool.clone()),
            Arc::new(MemoryCache::new()),
            "http://localhost:8080/",
        );
        (pool, service)
    }

    async fn create_user(pool: &DbPool, username: &str, admin: bool) -> User {
        let repo = SqlxUserRepository::new(pool.clone());
        let mut input = CreateUserInput::new(
            username,
            format!("{}@example.com", username),
            "$argon2id$hash",
        );
        if admin {
            input = input.with_admin();
        }
        repo.create(&input).await.expect("Failed to create user")
    }

    #[tokio::test]
    async fn test_create_blog_builds_public_link() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "alice writer", false).await;

        let item = service
            .create(
                CreateContentInput::blog(author.id, "My Post", "Hello"),
                &author,
            )
            .await
            .unwrap();

        assert_eq!(
            item.public_link,
            format!(
                "http://localhost:8080/content/blog/alice%20writer/{}",
                item.id
            )
        );
        assert!(item.is_published);
    }

    #[tokio::test]
    async fn test_create_sanitizes_input() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "alice", false).await;

        let item = service
            .create(
                CreateContentInput::blog(
                    author.id,
                    "Title <script>x</script>",
                    "<p>fine</p><script>alert(1)</script>",
                ),
                &author,
            )
            .await
            .unwrap();

        assert!(!item.title.contains("<script"));
        assert!(!item.body.as_deref().unwrap_or_default().contains("<script"));
        assert!(item.body.as_deref().unwrap_or_default().contains("<p>fine</p>"));
    }

    #[tokio::test]
    async fn test_create_validates_kind_sections() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "alice", false).await;

        let empty_body = service
            .create(CreateContentInput::blog(author.id, "Title", "  "), &author)
            .await;
        assert!(matches!(
            empty_body,
            Err(ContentServiceError::ValidationError(_))
        ));

        let missing_section = service
            .create(
                CreateContentInput::case_study(author.id, "Study", "P", "S", " "),
                &author,
            )
            .await;
        assert!(matches!(
            missing_section,
            Err(ContentServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_create_assigns_tags() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "alice", false).await;

        let item = service
            .create(
                CreateContentInput::blog(author.id, "Tagged", "body")
                    .with_tags("Rust, Web, rust"),
                &author,
            )
            .await
            .unwrap();

        assert_eq!(service.tags_for(&item.id).await.unwrap(), vec!["rust", "web"]);
    }

    #[tokio::test]
    async fn test_content_by_tag_normalizes_name() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "alice", false).await;

        let tagged = service
            .create(
                CreateContentInput::blog(author.id, "Tagged", "body").with_tags("rust"),
                &author,
            )
            .await
            .unwrap();
        service
            .create(CreateContentInput::blog(author.id, "Plain", "body"), &author)
            .await
            .unwrap();

        let page = service
            .content_by_tag(" Rust ", &ListParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, tagged.id);

        let err = service.content_by_tag("  ", &ListParams::default()).await;
        assert!(matches!(err, Err(ContentServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_publish_notifies_followers_honoring_preference() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "author", false).await;
        let fan = create_user(&pool, "fan", false).await;
        let muted = create_user(&pool, "muted", false).await;

        let user_repo = SqlxUserRepository::new(pool.clone());
        let mut fan_profile = fan.profile.clone();
        fan_profile.following.push("author".to_string());
        user_repo.update_profile(fan.id, &fan_profile).await.unwrap();

        let mut muted_profile = muted.profile.clone();
        muted_profile.following.push("author".to_string());
        muted_profile.notify_followers = false;
        user_repo.update_profile(muted.id, &muted_profile).await.unwrap();

        service
            .create(
                CreateContentInput::blog(author.id, "Announcement", "news"),
                &author,
            )
            .await
            .unwrap();

        let fan_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = ?")
                .bind(fan.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(fan_count, 1);

        let muted_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = ?")
                .bind(muted.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(muted_count, 0);
    }

    #[tokio::test]
    async fn test_unpublished_draft_notifies_on_publish_only() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "author", false).await;
        let fan = create_user(&pool, "fan", false).await;

        let user_repo = SqlxUserRepository::new(pool.clone());
        let mut profile = fan.profile.clone();
        profile.following.push("author".to_string());
        user_repo.update_profile(fan.id, &profile).await.unwrap();

        let item = service
            .create(
                CreateContentInput::blog(author.id, "Later", "soon").with_published(false),
                &author,
            )
            .await
            .unwrap();

        let before: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = ?")
                .bind(fan.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(before, 0);

        service
            .update(
                &item.id,
                UpdateContentInput::new().with_published(true),
                &author,
            )
            .await
            .unwrap();

        let after: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = ?")
                .bind(fan.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(after, 1);
    }

    #[tokio::test]
    async fn test_get_hides_unpublished_from_strangers() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "author", false).await;
        let stranger = create_user(&pool, "stranger", false).await;
        let admin = create_user(&pool, "admin", true).await;

        let item = service
            .create(
                CreateContentInput::blog(author.id, "Hidden", "wip").with_published(false),
                &author,
            )
            .await
            .unwrap();

        assert!(matches!(
            service.get(&item.id, None, false).await,
            Err(ContentServiceError::NotFound)
        ));
        assert!(matches!(
            service.get(&item.id, Some(&stranger), false).await,
            Err(ContentServiceError::NotFound)
        ));
        assert!(service.get(&item.id, Some(&author), false).await.is_ok());
        assert!(service.get(&item.id, Some(&admin), false).await.is_ok());
    }

    #[tokio::test]
    async fn test_view_counting_skips_author() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "author", false).await;
        let reader = create_user(&pool, "reader", false).await;

        let item = service
            .create(CreateContentInput::blog(author.id, "Post", "body"), &author)
            .await
            .unwrap();

        service.get(&item.id, Some(&author), true).await.unwrap();
        service.get(&item.id, Some(&reader), true).await.unwrap();
        service.get(&item.id, None, true).await.unwrap();

        let refreshed = service.get(&item.id, None, false).await.unwrap();
        assert_eq!(refreshed.views, 2);
    }

    #[tokio::test]
    async fn test_update_permissions() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "author", false).await;
        let stranger = create_user(&pool, "stranger", false).await;
        let admin = create_user(&pool, "admin", true).await;

        let item = service
            .create(CreateContentInput::blog(author.id, "Post", "body"), &author)
            .await
            .unwrap();

        let denied = service
            .update(&item.id, UpdateContentInput::new().with_title("Hax"), &stranger)
            .await;
        assert!(matches!(denied, Err(ContentServiceError::PermissionDenied)));

        let by_admin = service
            .update(
                &item.id,
                UpdateContentInput::new().with_title("Moderated"),
                &admin,
            )
            .await
            .unwrap();
        assert_eq!(by_admin.title, "Moderated");
    }

    #[tokio::test]
    async fn test_update_rejects_foreign_sections() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "author", false).await;

        let blog = service
            .create(CreateContentInput::blog(author.id, "Post", "body"), &author)
            .await
            .unwrap();

        let mut input = UpdateContentInput::new();
        input.problem = Some("not a case study".to_string());
        let result = service.update(&blog.id, input, &author).await;
        assert!(matches!(
            result,
            Err(ContentServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_permissions() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "author", false).await;
        let stranger = create_user(&pool, "stranger", false).await;

        let item = service
            .create(CreateContentInput::blog(author.id, "Post", "body"), &author)
            .await
            .unwrap();

        assert!(matches!(
            service.delete(&item.id, &stranger).await,
            Err(ContentServiceError::PermissionDenied)
        ));
        service.delete(&item.id, &author).await.unwrap();
        assert!(matches!(
            service.delete(&item.id, &author).await,
            Err(ContentServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let (_pool, service) = setup().await;
        let result = service
            .search("   ", None, None, &ListParams::default())
            .await;
        assert!(matches!(
            result,
            Err(ContentServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_popular_tags_cached() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "author", false).await;

        service
            .create(
                CreateContentInput::blog(author.id, "Post", "body").with_tags("rust"),
                &author,
            )
            .await
            .unwrap();

        let first = service.popular_tags(10).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].tag.name, "rust");

        let second = service.popular_tags(10).await.unwrap();
        assert_eq!(second.len(), 1);
    }
}
