//! User service
//!
//! Business logic for accounts and authentication:
//! - registration with validation, first registered user becomes admin
//! - login by username or email, returning a session token
//! - session validation and logout
//! - profile updates, password changes and the follow graph

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{
    CreateUserInput, ListParams, PagedResult, Session, UpdateProfileInput, User,
};
use crate::services::password::{hash_password, verify_password};
use crate::services::sanitize::sanitize_text;
use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

const DEFAULT_SESSION_LIFETIME_DAYS: i64 = 7;
const MIN_PASSWORD_LENGTH: usize = 6;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex must compile")
});

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{3,50}$").expect("username regex must compile")
});

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// User already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Registration input
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegisterInput {
    /// Desired username
    pub username: String,
    /// Email address
    pub email: String,
    /// Plaintext password
    pub password: String,
}

/// Login input
#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoginInput {
    /// Username or email address
    pub username_or_email: String,
    /// Plaintext password
    pub password: String,
}

/// User service for accounts and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_lifetime_days: i64,
}

impl UserService {
    /// Create a new user service with the given repositories
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_lifetime_days: DEFAULT_SESSION_LIFETIME_DAYS,
        }
    }

    /// Create a new user service with a custom session lifetime
    pub fn with_session_lifetime(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_lifetime_days: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_lifetime_days,
        }
    }

    /// Register a new user.
    ///
    /// The first account created on the platform is granted admin
    /// privileges automatically.
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        let username = input.username.trim().to_string();
        let email = input.email.trim().to_lowercase();

        validate_username(&username)?;
        validate_email(&email)?;
        validate_password(&input.password)?;

        if self
            .user_repo
            .get_by_username(&username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Username '{}' is already taken",
                username
            )));
        }

        if self
            .user_repo
            .get_by_email(&email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        let is_first = self
            .user_repo
            .count()
            .await
            .context("Failed to count users")?
            == 0;

        let password_hash =
            hash_password(&input.password).context("Failed to hash password")?;

        let mut create = CreateUserInput::new(username, email, password_hash);
        if is_first {
            create = create.with_admin();
        }

        let user = self
            .user_repo
            .create(&create)
            .await
            .context("Failed to create user")?;

        tracing::info!("Registered user {} (admin: {})", user.username, user.is_admin);

        Ok(user)
    }

    /// Login with username or email.
    ///
    /// Deactivated accounts cannot log in. On success a new session is
    /// created and the last login timestamp recorded.
    pub async fn login(&self, input: LoginInput) -> Result<(Session, User), UserServiceError> {
        let user = self
            .find_by_username_or_email(input.username_or_email.trim())
            .await?
            .ok_or_else(|| {
                UserServiceError::AuthenticationError(
                    "Invalid username or password".to_string(),
                )
            })?;

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;

        if !password_valid {
            return Err(UserServiceError::AuthenticationError(
                "Invalid username or password".to_string(),
            ));
        }

        if !user.is_active {
            return Err(UserServiceError::AuthenticationError(
                "This account has been deactivated".to_string(),
            ));
        }

        let session = Session::new(user.id, self.session_lifetime_days);
        self.session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        self.user_repo
            .update_last_login(user.id)
            .await
            .context("Failed to record last login")?;

        Ok((session, user))
    }

    /// Logout (invalidate session)
    pub async fn logout(&self, session_id: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(session_id)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Validate a session token and return the associated user.
    ///
    /// Expired sessions are removed on sight. Deactivated users fail
    /// validation even with a live session.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            let _ = self.session_repo.delete(token).await;
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?;

        Ok(user.filter(|u| u.is_active))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user by ID")?)
    }

    /// Get user by username
    pub async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserServiceError> {
        Ok(self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to get user by username")?)
    }

    /// Update the editable parts of a user's profile
    pub async fn update_profile(
        &self,
        user_id: i64,
        mut input: UpdateProfileInput,
    ) -> Result<User, UserServiceError> {
        if !input.has_changes() {
            return Err(UserServiceError::ValidationError(
                "No profile fields to update".to_string(),
            ));
        }

        if let Some(bio) = input.bio.take() {
            input.bio = Some(sanitize_text(&bio));
        }
        if let Some(website) = input.website.take() {
            let website = website.trim().to_string();
            if !website.is_empty()
                && !website.starts_with("http://")
                && !website.starts_with("https://")
            {
                return Err(UserServiceError::ValidationError(
                    "Website must start with http:// or https://".to_string(),
                ));
            }
            input.website = Some(website);
        }

        let mut user = self
            .user_repo
            .get_by_id(user_id)
            .await
            .context("Failed to get user")?
            .ok_or(UserServiceError::UserNotFound)?;

        input.apply_to(&mut user.profile);

        self.user_repo
            .update_profile(user_id, &user.profile)
            .await
            .context("Failed to update profile")?;

        Ok(user)
    }

    /// Change a user's password after verifying the current one
    pub async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), UserServiceError> {
        validate_password(new_password)?;

        let user = self
            .user_repo
            .get_by_id(user_id)
            .await
            .context("Failed to get user")?
            .ok_or(UserServiceError::UserNotFound)?;

        let current_valid = verify_password(current_password, &user.password_hash)
            .context("Failed to verify password")?;
        if !current_valid {
            return Err(UserServiceError::AuthenticationError(
                "Current password is incorrect".to_string(),
            ));
        }

        let new_hash = hash_password(new_password).context("Failed to hash password")?;
        self.user_repo
            .update_password(user_id, &new_hash)
            .await
            .context("Failed to update password")?;

        // Existing sessions are revoked so the old credential stops working
        self.session_repo
            .delete_by_user(user_id)
            .await
            .context("Failed to revoke sessions")?;

        Ok(())
    }

    /// Follow another user by username
    pub async fn follow(
        &self,
        follower_id: i64,
        target_username: &str,
    ) -> Result<User, UserServiceError> {
        let target = self
            .user_repo
            .get_by_username(target_username)
            .await
            .context("Failed to get target user")?
            .ok_or(UserServiceError::UserNotFound)?;

        let mut follower = self
            .user_repo
            .get_by_id(follower_id)
            .await
            .context("Failed to get follower")?
            .ok_or(UserServiceError::UserNotFound)?;

        if follower.username == target.username {
            return Err(UserServiceError::ValidationError(
                "You cannot follow yourself".to_string(),
            ));
        }

        if !follower.is_following(&target.username) {
            follower.profile.following.push(target.username.clone());
            self.user_repo
                .update_profile(follower_id, &follower.profile)
                .await
                .context("Failed to update follow list")?;
        }

        Ok(follower)
    }

    /// Unfollow a user by username. Unfollowing someone not followed is a
    /// no-op.
    pub async fn unfollow(
        &self,
        follower_id: i64,
        target_username: &str,
    ) -> Result<User, UserServiceError> {
        let mut follower = self
            .user_repo
            .get_by_id(follower_id)
            .await
            .context("Failed to get follower")?
            .ok_or(UserServiceError::UserNotFound)?;

        let before = follower.profile.following.len();
        follower.profile.following.retain(|u| u != target_username);

        if follower.profile.following.len() != before {
            self.user_repo
                .update_profile(follower_id, &follower.profile)
                .await
                .context("Failed to update follow list")?;
        }

        Ok(follower)
    }

    /// Deactivate an account and revoke its sessions
    pub async fn deactivate(&self, user_id: i64) -> Result<(), UserServiceError> {
        self.user_repo
            .set_active(user_id, false)
            .await
            .context("Failed to deactivate user")?;
        self.session_repo
            .delete_by_user(user_id)
            .await
            .context("Failed to revoke sessions")?;
        Ok(())
    }

    /// Reactivate a previously deactivated account
    pub async fn reactivate(&self, user_id: i64) -> Result<(), UserServiceError> {
        self.user_repo
            .set_active(user_id, true)
            .await
            .context("Failed to reactivate user")?;
        Ok(())
    }

    /// List users with pagination (admin surface)
    pub async fn list(&self, params: &ListParams) -> Result<PagedResult<User>, UserServiceError> {
        Ok(self
            .user_repo
            .list(params)
            .await
            .context("Failed to list users")?)
    }

    /// Delete expired sessions, returning the number removed
    pub async fn cleanup_expired_sessions(&self) -> Result<i64, UserServiceError> {
        Ok(self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?)
    }

    async fn find_by_username_or_email(
        &self,
        username_or_email: &str,
    ) -> Result<Option<User>, UserServiceError> {
        if let Some(user) = self
            .user_repo
            .get_by_username(username_or_email)
            .await
            .context("Failed to get user by username")?
        {
            return Ok(Some(user));
        }

        Ok(self
            .user_repo
            .get_by_email(&username_or_email.to_lowercase())
            .await
            .context("Failed to get user by email")?)
    }
}

fn validate_username(username: &str) -> Result<(), UserServiceError> {
    if !USERNAME_REGEX.is_match(username) {
        return Err(UserServiceError::ValidationError(
            "Username must be 3-50 characters of letters, digits, '_' or '-'".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), UserServiceError> {
    if !EMAIL_REGEX.is_match(email) {
        return Err(UserServiceError::ValidationError(
            "Invalid email address".to_string(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), UserServiceError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(UserServiceError::ValidationError(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxSessionRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations};

    async fn setup_service() -> UserService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool),
        )
    }

    fn register_input(username: &str, email: &str) -> RegisterInput {
        RegisterInput {
            username: username.to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_user_becomes_admin() {
        let service = setup_service().await;

        let first = service
            .register(register_input("alice", "alice@example.com"))
            .await
            .unwrap();
        let second = service
            .register(register_input("bob", "bob@example.com"))
            .await
            .unwrap();

        assert!(first.is_admin);
        assert!(!second.is_admin);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let service = setup_service().await;

        let short_name = service
            .register(register_input("ab", "ab@example.com"))
            .await;
        assert!(matches!(
            short_name,
            Err(UserServiceError::ValidationError(_))
        ));

        let bad_email = service
            .register(register_input("charlie", "not-an-email"))
            .await;
        assert!(matches!(bad_email, Err(UserServiceError::ValidationError(_))));

        let short_password = service
            .register(RegisterInput {
                username: "charlie".to_string(),
                email: "charlie@example.com".to_string(),
                password: "short".to_string(),
            })
            .await;
        assert!(matches!(
            short_password,
            Err(UserServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_rejected() {
        let service = setup_service().await;

        service
            .register(register_input("alice", "alice@example.com"))
            .await
            .unwrap();

        let dup_name = service
            .register(register_input("alice", "other@example.com"))
            .await;
        assert!(matches!(dup_name, Err(UserServiceError::UserExists(_))));

        let dup_email = service
            .register(register_input("alice2", "alice@example.com"))
            .await;
        assert!(matches!(dup_email, Err(UserServiceError::UserExists(_))));
    }

    #[tokio::test]
    async fn test_login_by_username_and_email() {
        let service = setup_service().await;
        service
            .register(register_input("alice", "alice@example.com"))
            .await
            .unwrap();

        let (session, user) = service
            .login(LoginInput {
                username_or_email: "alice".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(user.username, "alice");
        assert!(!session.is_expired());

        let (_, by_email) = service
            .login(LoginInput {
                username_or_email: "alice@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(by_email.id, user.id);
        assert!(by_email.last_login.is_some() || user.last_login.is_none());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let service = setup_service().await;
        service
            .register(register_input("alice", "alice@example.com"))
            .await
            .unwrap();

        let result = service
            .login(LoginInput {
                username_or_email: "alice".to_string(),
                password: "wrong-password".to_string(),
            })
            .await;
        assert!(matches!(
            result,
            Err(UserServiceError::AuthenticationError(_))
        ));
    }

    #[tokio::test]
    async fn test_deactivated_user_cannot_login() {
        let service = setup_service().await;
        let user = service
            .register(register_input("alice", "alice@example.com"))
            .await
            .unwrap();

        service.deactivate(user.id).await.unwrap();

        let result = service
            .login(LoginInput {
                username_or_email: "alice".to_string(),
                password: "secret123".to_string(),
            })
            .await;
        assert!(matches!(
            result,
            Err(UserServiceError::AuthenticationError(_))
        ));

        service.reactivate(user.id).await.unwrap();
        assert!(service
            .login(LoginInput {
                username_or_email: "alice".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_validate_session_lifecycle() {
        let service = setup_service().await;
        service
            .register(register_input("alice", "alice@example.com"))
            .await
            .unwrap();

        let (session, _) = service
            .login(LoginInput {
                username_or_email: "alice".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        let validated = service.validate_session(&session.id).await.unwrap();
        assert_eq!(validated.unwrap().username, "alice");

        service.logout(&session.id).await.unwrap();
        assert!(service.validate_session(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_change_password_revokes_sessions() {
        let service = setup_service().await;
        let user = service
            .register(register_input("alice", "alice@example.com"))
            .await
            .unwrap();

        let (session, _) = service
            .login(LoginInput {
                username_or_email: "alice".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        let wrong_current = service
            .change_password(user.id, "wrong", "newsecret")
            .await;
        assert!(matches!(
            wrong_current,
            Err(UserServiceError::AuthenticationError(_))
        ));

        service
            .change_password(user.id, "secret123", "newsecret")
            .await
            .unwrap();

        assert!(service.validate_session(&session.id).await.unwrap().is_none());
        assert!(service
            .login(LoginInput {
                username_or_email: "alice".to_string(),
                password: "newsecret".to_string(),
            })
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_update_profile() {
        let service = setup_service().await;
        let user = service
            .register(register_input("alice", "alice@example.com"))
            .await
            .unwrap();

        let updated = service
            .update_profile(
                user.id,
                UpdateProfileInput {
                    bio: Some("Writer of <script>alert(1)</script> things".to_string()),
                    website: Some("https://alice.example".to_string()),
                    notify_likes: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!updated.profile.bio.contains("<script"));
        assert_eq!(updated.profile.website, "https://alice.example");
        assert!(!updated.profile.notify_likes);
        assert!(updated.profile.notify_comments);

        let bad_website = service
            .update_profile(
                user.id,
                UpdateProfileInput {
                    website: Some("javascript:alert(1)".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(
            bad_website,
            Err(UserServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_follow_and_unfollow() {
        let service = setup_service().await;
        let alice = service
            .register(register_input("alice", "alice@example.com"))
            .await
            .unwrap();
        service
            .register(register_input("bob", "bob@example.com"))
            .await
            .unwrap();

        let after_follow = service.follow(alice.id, "bob").await.unwrap();
        assert!(after_follow.is_following("bob"));

        // Following twice does not duplicate the entry
        let again = service.follow(alice.id, "bob").await.unwrap();
        assert_eq!(again.profile.following.len(), 1);

        let self_follow = service.follow(alice.id, "alice").await;
        assert!(matches!(
            self_follow,
            Err(UserServiceError::ValidationError(_))
        ));

        let missing = service.follow(alice.id, "nobody").await;
        assert!(matches!(missing, Err(UserServiceError::UserNotFound)));

        let after_unfollow = service.unfollow(alice.id, "bob").await.unwrap();
        assert!(!after_unfollow.is_following("bob"));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(20))]

            #[test]
            fn valid_usernames_accepted(name in "[A-Za-z0-9_-]{3,50}") {
                prop_assert!(validate_username(&name).is_ok());
            }

            #[test]
            fn whitespace_in_email_rejected(
                local in "[a-z]{1,8}",
                domain in "[a-z]{1,8}"
            ) {
                let email = format!("{} @{}.com", local, domain);
                prop_assert!(validate_email(&email).is_err());
            }

            #[test]
            fn short_passwords_rejected(password in "[ -~]{0,5}") {
                prop_assert!(validate_password(&password).is_err());
            }
        }
    }
}
