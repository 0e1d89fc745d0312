//! Wire DTOs for the REST backend.
//!
//! DESIGN
//! ======
//! Field names mirror the backend's JSON payloads so serde stays lossless.
//! Optional fields use `#[serde(default)]` because the backend emits both a
//! full user shape (`/users/me/`, `/users/{id}/`) and a "mini" shape nested in
//! posts, comments, and messages.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type PostId = i64;
pub type CommentId = i64;
pub type MessageId = i64;

/// A user account as returned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Numeric user identifier.
    pub id: UserId,
    /// Unique login handle.
    pub username: String,
    /// Contact email; absent on mini payloads.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Avatar image reference, either absolute or relative to the media host.
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    /// Friend count; only present on full user payloads.
    #[serde(default)]
    pub friends_count: Option<u32>,
    /// Account creation timestamp (RFC 3339).
    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    /// Short display name: first name when set, otherwise the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.first_name.is_empty() { &self.username } else { &self.first_name }
    }

    /// Full name for profile headers and search rows.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.first_name.is_empty() {
            return self.username.clone();
        }
        format!("{} {}", self.first_name, self.last_name).trim_end().to_owned()
    }

    /// Uppercase initial used by the avatar fallback.
    #[must_use]
    pub fn initial(&self) -> String {
        self.first_name
            .chars()
            .next()
            .or_else(|| self.username.chars().next())
            .map_or_else(|| "?".to_owned(), |c| c.to_uppercase().collect())
    }
}

/// A comment attached to a post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub author: User,
    /// Owning post; omitted by some responses.
    #[serde(default)]
    pub post: Option<PostId>,
    pub content: String,
    pub created_at: String,
}

/// A feed post with its like state and comments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author: User,
    pub content: String,
    /// Attached image reference, if any.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub likes_count: u32,
    #[serde(default)]
    pub comments_count: u32,
    /// Comments in server order (oldest first).
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Whether the requesting user has liked this post.
    #[serde(default)]
    pub is_liked: bool,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A direct message between two users.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender: User,
    #[serde(default)]
    pub receiver: Option<User>,
    pub content: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: String,
}

/// Result of `POST /posts/{id}/like/`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeResult {
    pub liked: bool,
    pub likes_count: u32,
}

/// Result of login and registration: the user plus a fresh token pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResult {
    pub user: User,
    pub access: String,
    pub refresh: String,
}

/// Result of `POST /auth/token/refresh/`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResult {
    pub access: String,
}

/// Login form payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Minimum accepted password length, enforced before registration is sent.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Registration form payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password2: String,
}

impl Registration {
    /// Local checks run before the request is sent.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message when the passwords differ or are too short.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.password != self.password2 {
            return Err("Passwords don't match.");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err("Password must be at least 6 characters.");
        }
        Ok(())
    }
}

/// Profile fields accepted by `PATCH /users/me/`. `None` fields are not sent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<Upload>,
}

/// New post payload; at least one of `content` or `image` must be present.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewPost {
    pub content: String,
    pub image: Option<Upload>,
}

impl NewPost {
    /// A post is submittable when it has non-blank text or an image.
    #[must_use]
    pub fn is_submittable(&self) -> bool {
        !self.content.trim().is_empty() || self.image.is_some()
    }
}

/// An in-memory file selected for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// List endpoints return either a bare array or a paginated envelope.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Plain(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> ListResponse<T> {
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Plain(items) | Self::Paged { results: items } => items,
        }
    }
}
