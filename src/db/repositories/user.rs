//! User repository
//!
//! Database operations for user accounts. The profile document is stored
//! as a JSON column and (de)serialized at the repository boundary, so the
//! rest of the system only ever sees `UserProfile`.

use crate::db::DbPool;
use crate::models::{CreateUserInput, ListParams, PagedResult, User, UserProfile};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, input: &CreateUserInput) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Get user by email
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Replace a user's profile document
    async fn update_profile(&self, id: i64, profile: &UserProfile) -> Result<()>;

    /// Replace a user's password hash
    async fn update_password(&self, id: i64, password_hash: &str) -> Result<()>;

    /// Record a successful login
    async fn update_last_login(&self, id: i64) -> Result<()>;

    /// Activate or deactivate an account
    async fn set_active(&self, id: i64, is_active: bool) -> Result<()>;

    /// List users with pagination, newest first
    async fn list(&self, params: &ListParams) -> Result<PagedResult<User>>;

    /// Count all users
    async fn count(&self) -> Result<i64>;

    /// Find active users whose profile `following` list contains the
    /// given username
    async fn find_followers(&self, username: &str) -> Result<Vec<User>>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: DbPool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, input: &CreateUserInput) -> Result<User> {
        let profile = UserProfile::default();
        let profile_json =
            serde_json::to_string(&profile).context("Failed to serialize profile")?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, profile, is_admin, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, 1, ?)
            "#,
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&profile_json)
        .bind(input.is_admin)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create user")?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: input.username.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            profile,
            is_admin: input.is_admin,
            is_active: true,
            created_at: now,
            last_login: None,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, profile, is_admin, is_active, created_at, last_login FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by ID")?;

        row.map(|row| row_to_user(&row)).transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, profile, is_admin, is_active, created_at, last_login FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by username")?;

        row.map(|row| row_to_user(&row)).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, profile, is_admin, is_active, created_at, last_login FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by email")?;

        row.map(|row| row_to_user(&row)).transpose()
    }

    async fn update_profile(&self, id: i64, profile: &UserProfile) -> Result<()> {
        let profile_json =
            serde_json::to_string(profile).context("Failed to serialize profile")?;

        sqlx::query("UPDATE users SET profile = ? WHERE id = ?")
            .bind(&profile_json)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update profile")?;

        Ok(())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update password")?;

        Ok(())
    }

    async fn update_last_login(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update last login")?;

        Ok(())
    }

    async fn set_active(&self, id: i64, is_active: bool) -> Result<()> {
        sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
            .bind(is_active)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to set user active flag")?;

        Ok(())
    }

    async fn list(&self, params: &ListParams) -> Result<PagedResult<User>> {
        let total_row = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users")?;
        let total: i64 = total_row.get("count");

        let rows = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, profile, is_admin, is_active, created_at, last_login
            FROM users
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list users")?;

        let users = rows
            .iter()
            .map(row_to_user)
            .collect::<Result<Vec<_>>>()?;

        Ok(PagedResult::new(users, total, params))
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users")?;
        Ok(row.get("count"))
    }

    async fn find_followers(&self, username: &str) -> Result<Vec<User>> {
        // LIKE prefilter on the JSON column; the exact membership check
        // happens after deserializing the profile.
        let pattern = format!("%\"{}\"%", username);
        let rows = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, profile, is_admin, is_active, created_at, last_login
            FROM users
            WHERE is_active = 1 AND profile LIKE ?
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .context("Failed to find followers")?;

        let mut followers = Vec::new();
        for row in &rows {
            let user = row_to_user(row)?;
            if user.is_following(username) {
                followers.push(user);
            }
        }

        Ok(followers)
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let profile_json: String = row.get("profile");
    let profile: UserProfile =
        serde_json::from_str(&profile_json).unwrap_or_default();

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        profile,
        is_admin: row.get("is_admin"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        last_login: row.try_get("last_login").unwrap_or(None),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxUserRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxUserRepository::new(pool)
    }

    fn sample_input(name: &str) -> CreateUserInput {
        CreateUserInput::new(name, format!("{}@example.com", name), "hashed")
    }

    #[tokio::test]
    async fn test_create_user() {
        let repo = setup_test_repo().await;

        let user = repo
            .create(&sample_input("alice"))
            .await
            .expect("Failed to create user");

        assert!(user.id > 0);
        assert_eq!(user.username, "alice");
        assert!(user.is_active);
        assert!(!user.is_admin);
        assert!(user.profile.following.is_empty());
    }

    #[tokio::test]
    async fn test_create_admin_user() {
        let repo = setup_test_repo().await;

        let user = repo
            .create(&sample_input("root").with_admin())
            .await
            .expect("Failed to create user");

        assert!(user.is_admin);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = setup_test_repo().await;

        repo.create(&sample_input("alice")).await.unwrap();

        let duplicate = CreateUserInput::new("alice", "other@example.com", "hash");
        assert!(repo.create(&duplicate).await.is_err());
    }

    #[tokio::test]
    async fn test_get_by_username_and_email() {
        let repo = setup_test_repo().await;
        let created = repo.create(&sample_input("alice")).await.unwrap();

        let by_name = repo
            .get_by_username("alice")
            .await
            .unwrap()
            .expect("User not found");
        assert_eq!(by_name.id, created.id);

        let by_email = repo
            .get_by_email("alice@example.com")
            .await
            .unwrap()
            .expect("User not found");
        assert_eq!(by_email.id, created.id);

        assert!(repo.get_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_profile_roundtrip() {
        let repo = setup_test_repo().await;
        let user = repo.create(&sample_input("alice")).await.unwrap();

        let mut profile = user.profile.clone();
        profile.bio = "Writes about Rust".to_string();
        profile.following.push("bob".to_string());
        profile.notify_likes = false;

        repo.update_profile(user.id, &profile).await.unwrap();

        let reloaded = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.profile, profile);
    }

    #[tokio::test]
    async fn test_update_last_login() {
        let repo = setup_test_repo().await;
        let user = repo.create(&sample_input("alice")).await.unwrap();
        assert!(user.last_login.is_none());

        repo.update_last_login(user.id).await.unwrap();

        let reloaded = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert!(reloaded.last_login.is_some());
    }

    #[tokio::test]
    async fn test_set_active() {
        let repo = setup_test_repo().await;
        let user = repo.create(&sample_input("alice")).await.unwrap();

        repo.set_active(user.id, false).await.unwrap();
        let reloaded = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert!(!reloaded.is_active);

        repo.set_active(user.id, true).await.unwrap();
        let reloaded = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert!(reloaded.is_active);
    }

    #[tokio::test]
    async fn test_list_users_paged() {
        let repo = setup_test_repo().await;
        for i in 0..15 {
            repo.create(&sample_input(&format!("user{}", i)))
                .await
                .unwrap();
        }

        let page = repo.list(&ListParams::new(1, 10)).await.unwrap();
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.total, 15);
        assert!(page.has_next());

        let page2 = repo.list(&ListParams::new(2, 10)).await.unwrap();
        assert_eq!(page2.items.len(), 5);
        assert!(!page2.has_next());
    }

    #[tokio::test]
    async fn test_find_followers() {
        let repo = setup_test_repo().await;
        repo.create(&sample_input("author")).await.unwrap();
        let fan = repo.create(&sample_input("fan")).await.unwrap();
        let other = repo.create(&sample_input("other")).await.unwrap();

        let mut fan_profile = fan.profile.clone();
        fan_profile.following.push("author".to_string());
        repo.update_profile(fan.id, &fan_profile).await.unwrap();

        // bio mentioning the name must not count as following
        let mut other_profile = other.profile.clone();
        other_profile.bio = "I like \"author\" posts".to_string();
        repo.update_profile(other.id, &other_profile).await.unwrap();

        let followers = repo.find_followers("author").await.unwrap();
        assert_eq!(followers.len(), 1);
        assert_eq!(followers[0].id, fan.id);

        let none = repo.find_followers("fan").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_deactivated_follower_excluded() {
        let repo = setup_test_repo().await;
        repo.create(&sample_input("author")).await.unwrap();
        let fan = repo.create(&sample_input("fan")).await.unwrap();

        let mut profile = fan.profile.clone();
        profile.following.push("author".to_string());
        repo.update_profile(fan.id, &profile).await.unwrap();
        repo.set_active(fan.id, false).await.unwrap();

        let followers = repo.find_followers("author").await.unwrap();
        assert!(followers.is_empty());
    }
}
