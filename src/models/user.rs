//! User model
//!
//! This module provides:
//! - `User` entity for registered accounts
//! - `UserProfile` JSON document stored alongside each account
//! - Input types for registration and profile updates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Unique username
    pub username: String,
    /// Unique email address
    pub email: String,
    /// Argon2 password hash (never serialized in API responses)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Profile document
    pub profile: UserProfile,
    /// Whether the user has admin privileges
    pub is_admin: bool,
    /// Whether the account is active (deactivated users cannot log in)
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last successful login timestamp
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Check if this user can modify content authored by `author_id`
    pub fn can_edit(&self, author_id: i64) -> bool {
        self.is_admin || self.id == author_id
    }

    /// Check if this user follows the given username
    pub fn is_following(&self, username: &str) -> bool {
        self.profile.following.iter().any(|u| u == username)
    }
}

/// Profile document stored as JSON on the user row.
///
/// All fields are optional in storage; missing fields deserialize to their
/// defaults so older rows keep working as the document grows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    /// Short biography
    #[serde(default)]
    pub bio: String,
    /// Personal website URL
    #[serde(default)]
    pub website: String,
    /// Social links keyed by platform name
    #[serde(default)]
    pub social_links: HashMap<String, String>,
    /// Media id of the profile picture, if one was uploaded
    #[serde(default)]
    pub profile_picture: Option<String>,
    /// Usernames this user follows
    #[serde(default)]
    pub following: Vec<String>,
    /// Receive notifications for comments on own content
    #[serde(default = "default_true")]
    pub notify_comments: bool,
    /// Receive notifications for likes on own content
    #[serde(default = "default_true")]
    pub notify_likes: bool,
    /// Receive notifications when followed authors publish
    #[serde(default = "default_true")]
    pub notify_followers: bool,
}

fn default_true() -> bool {
    true
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            bio: String::new(),
            website: String::new(),
            social_links: HashMap::new(),
            profile_picture: None,
            following: Vec::new(),
            notify_comments: true,
            notify_likes: true,
            notify_followers: true,
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserInput {
    /// Username
    pub username: String,
    /// Email address
    pub email: String,
    /// Pre-hashed password
    pub password_hash: String,
    /// Whether the user should have admin privileges
    pub is_admin: bool,
}

impl CreateUserInput {
    /// Create a new CreateUserInput
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            is_admin: false,
        }
    }

    /// Mark the user as an admin
    pub fn with_admin(mut self) -> Self {
        self.is_admin = true;
        self
    }
}

/// Input for updating the editable parts of a profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileInput {
    /// New biography (optional)
    pub bio: Option<String>,
    /// New website URL (optional)
    pub website: Option<String>,
    /// New social links map (optional, replaces the existing map)
    pub social_links: Option<HashMap<String, String>>,
    /// New profile picture media id (optional)
    pub profile_picture: Option<String>,
    /// New comment notification preference (optional)
    pub notify_comments: Option<bool>,
    /// New like notification preference (optional)
    pub notify_likes: Option<bool>,
    /// New follower notification preference (optional)
    pub notify_followers: Option<bool>,
}

impl UpdateProfileInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.bio.is_some()
            || self.website.is_some()
            || self.social_links.is_some()
            || self.profile_picture.is_some()
            || self.notify_comments.is_some()
            || self.notify_likes.is_some()
            || self.notify_followers.is_some()
    }

    /// Apply the set fields onto an existing profile
    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(bio) = &self.bio {
            profile.bio = bio.clone();
        }
        if let Some(website) = &self.website {
            profile.website = website.clone();
        }
        if let Some(social_links) = &self.social_links {
            profile.social_links = social_links.clone();
        }
        if let Some(profile_picture) = &self.profile_picture {
            profile.profile_picture = Some(profile_picture.clone());
        }
        if let Some(notify_comments) = self.notify_comments {
            profile.notify_comments = notify_comments;
        }
        if let Some(notify_likes) = self.notify_likes {
            profile.notify_likes = notify_likes;
        }
        if let Some(notify_followers) = self.notify_followers {
            profile.notify_followers = notify_followers;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 1,
            username: "writer".to_string(),
            email: "writer@example.com".to_string(),
            password_hash: "$argon2id$hash".to_string(),
            profile: UserProfile::default(),
            is_admin: false,
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn test_can_edit_own_content() {
        let user = sample_user();
        assert!(user.can_edit(1));
        assert!(!user.can_edit(2));
    }

    #[test]
    fn test_admin_can_edit_any_content() {
        let mut user = sample_user();
        user.is_admin = true;
        assert!(user.can_edit(2));
    }

    #[test]
    fn test_is_following() {
        let mut user = sample_user();
        user.profile.following.push("other".to_string());
        assert!(user.is_following("other"));
        assert!(!user.is_following("stranger"));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = sample_user();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("$argon2id$"));
    }

    #[test]
    fn test_profile_defaults_from_empty_json() {
        let profile: UserProfile = serde_json::from_str("{}").unwrap();
        assert!(profile.bio.is_empty());
        assert!(profile.following.is_empty());
        assert!(profile.notify_comments);
        assert!(profile.notify_likes);
        assert!(profile.notify_followers);
    }

    #[test]
    fn test_update_profile_apply() {
        let mut profile = UserProfile::default();
        let input = UpdateProfileInput {
            bio: Some("Rust developer".to_string()),
            notify_likes: Some(false),
            ..Default::default()
        };

        assert!(input.has_changes());
        input.apply_to(&mut profile);

        assert_eq!(profile.bio, "Rust developer");
        assert!(!profile.notify_likes);
        assert!(profile.notify_comments);
    }

    #[test]
    fn test_update_profile_empty_has_no_changes() {
        let input = UpdateProfileInput::default();
        assert!(!input.has_changes());
    }
}
