//! Typed endpoint calls on top of [`ApiClient`].
//!
//! Paths follow the backend contract (trailing slashes included). Path
//! builders are plain functions so they can be checked without a transport.

#[cfg(test)]
#[path = "endpoints_test.rs"]
mod endpoints_test;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::session::{SessionSnapshot, Tokens};
use crate::transport::{Body, Method, MultipartForm, Transport};
use crate::types::{
    AuthResult, Comment, CommentId, Credentials, LikeResult, ListResponse, Message, NewPost, Post, PostId,
    ProfileUpdate, Registration, User, UserId,
};

pub(crate) const LOGIN_PATH: &str = "/auth/login/";
pub(crate) const REGISTER_PATH: &str = "/auth/register/";
pub(crate) const ME_PATH: &str = "/users/me/";
pub(crate) const FEED_PATH: &str = "/posts/feed/";
pub(crate) const POSTS_PATH: &str = "/posts/";
pub(crate) const CONVERSATIONS_PATH: &str = "/messages/conversations/";
pub(crate) const MESSAGES_PATH: &str = "/messages/";

fn encode_query(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

pub(crate) fn user_search_path(query: &str) -> String {
    format!("/users/search/?q={}", encode_query(query))
}

pub(crate) fn user_path(user_id: UserId) -> String {
    format!("/users/{user_id}/")
}

pub(crate) fn user_posts_path(user_id: UserId) -> String {
    format!("/posts/?author={user_id}")
}

pub(crate) fn post_path(post_id: PostId) -> String {
    format!("/posts/{post_id}/")
}

pub(crate) fn post_like_path(post_id: PostId) -> String {
    format!("/posts/{post_id}/like/")
}

pub(crate) fn post_comment_path(post_id: PostId) -> String {
    format!("/posts/{post_id}/comment/")
}

pub(crate) fn comment_path(comment_id: CommentId) -> String {
    format!("/comments/{comment_id}/")
}

pub(crate) fn messages_with_path(user_id: UserId) -> String {
    format!("/messages/?with={user_id}")
}

pub(crate) fn new_post_form(post: NewPost) -> MultipartForm {
    let mut form = MultipartForm::new();
    if !post.content.is_empty() {
        form = form.text("content", post.content);
    }
    if let Some(image) = post.image {
        form = form.file("image", image);
    }
    form
}

pub(crate) fn profile_form(update: ProfileUpdate) -> MultipartForm {
    let mut form = MultipartForm::new();
    if let Some(first_name) = update.first_name {
        form = form.text("first_name", first_name);
    }
    if let Some(last_name) = update.last_name {
        form = form.text("last_name", last_name);
    }
    if let Some(bio) = update.bio {
        form = form.text("bio", bio);
    }
    if let Some(avatar) = update.avatar {
        form = form.file("avatar", avatar);
    }
    form
}

// =============================================================================
// AUTH
// =============================================================================

impl<T: Transport> ApiClient<T> {
    /// Sign in and record the returned user and tokens in the session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] (usually 401) for rejected credentials.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let body = Body::Json(serde_json::to_value(credentials)?);
        let result: AuthResult = self.fetch_anonymous(Method::Post, LOGIN_PATH, body).await?;
        Ok(self.adopt(result))
    }

    /// Create an account, then sign in as it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when local checks fail (no request is
    /// sent) and [`ApiError::Http`] with per-field errors when the server
    /// rejects the form.
    pub async fn register(&self, form: &Registration) -> Result<User, ApiError> {
        form.validate().map_err(|msg| ApiError::Validation(msg.to_owned()))?;
        let body = Body::Json(serde_json::to_value(form)?);
        let result: AuthResult = self.fetch_anonymous(Method::Post, REGISTER_PATH, body).await?;
        Ok(self.adopt(result))
    }

    fn adopt(&self, result: AuthResult) -> User {
        let user = result.user;
        self.session().login(user.clone(), Tokens { access: result.access, refresh: result.refresh });
        user
    }

    /// End the session locally. The backend keeps no server-side session.
    pub fn logout(&self) {
        self.session().logout();
    }

    /// Startup check: validate stored tokens with an identity fetch.
    ///
    /// Leaves the session `Authenticated` on success and `Anonymous` (with
    /// storage cleared) otherwise.
    pub async fn restore_session(&self) -> SessionSnapshot {
        if self.session().access_token().is_none() {
            self.session().finish_anonymous();
            return self.session().snapshot();
        }
        match self.current_user().await {
            Ok(user) => self.session().restore(user),
            Err(e) => {
                tracing::info!(error = %e, "stored session rejected");
                self.session().expire();
            }
        }
        self.session().snapshot()
    }

    // =========================================================================
    // USERS
    // =========================================================================

    /// # Errors
    ///
    /// Propagates request failures.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.fetch(Method::Get, ME_PATH, Body::Empty).await
    }

    /// Patch the signed-in user's profile and refresh the cached session user.
    ///
    /// # Errors
    ///
    /// Propagates request failures; per-field errors arrive as [`ApiError::Http`].
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<User, ApiError> {
        let user: User = self.fetch(Method::Patch, ME_PATH, Body::Multipart(profile_form(update))).await?;
        self.session().update_user(user.clone());
        Ok(user)
    }

    /// Search users by name. Blank queries return an empty list without a
    /// request.
    ///
    /// # Errors
    ///
    /// Propagates request failures.
    pub async fn search_users(&self, query: &str) -> Result<Vec<User>, ApiError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let list: ListResponse<User> = self.fetch(Method::Get, &user_search_path(query), Body::Empty).await?;
        Ok(list.into_vec())
    }

    /// # Errors
    ///
    /// A missing user surfaces as a 404 [`ApiError::Http`].
    pub async fn get_user(&self, user_id: UserId) -> Result<User, ApiError> {
        self.fetch(Method::Get, &user_path(user_id), Body::Empty).await
    }

    // =========================================================================
    // POSTS
    // =========================================================================

    /// # Errors
    ///
    /// Propagates request failures.
    pub async fn feed(&self) -> Result<Vec<Post>, ApiError> {
        let list: ListResponse<Post> = self.fetch(Method::Get, FEED_PATH, Body::Empty).await?;
        Ok(list.into_vec())
    }

    /// # Errors
    ///
    /// Propagates request failures.
    pub async fn user_posts(&self, user_id: UserId) -> Result<Vec<Post>, ApiError> {
        let list: ListResponse<Post> = self.fetch(Method::Get, &user_posts_path(user_id), Body::Empty).await?;
        Ok(list.into_vec())
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an empty post (no text, no image).
    pub async fn create_post(&self, post: NewPost) -> Result<Post, ApiError> {
        if !post.is_submittable() {
            return Err(ApiError::Validation("Write something or attach a photo.".to_owned()));
        }
        self.fetch(Method::Post, POSTS_PATH, Body::Multipart(new_post_form(post))).await
    }

    /// # Errors
    ///
    /// Non-authors receive a 403 [`ApiError::Http`].
    pub async fn delete_post(&self, post_id: PostId) -> Result<(), ApiError> {
        self.execute(Method::Delete, &post_path(post_id), Body::Empty).await
    }

    /// Toggle the signed-in user's like on a post.
    ///
    /// # Errors
    ///
    /// Propagates request failures.
    pub async fn like_post(&self, post_id: PostId) -> Result<LikeResult, ApiError> {
        self.fetch(Method::Post, &post_like_path(post_id), Body::Empty).await
    }

    // =========================================================================
    // COMMENTS
    // =========================================================================

    /// # Errors
    ///
    /// Propagates request failures.
    pub async fn add_comment(&self, post_id: PostId, content: &str) -> Result<Comment, ApiError> {
        let body = Body::Json(serde_json::json!({ "content": content }));
        self.fetch(Method::Post, &post_comment_path(post_id), body).await
    }

    /// # Errors
    ///
    /// Non-authors receive a 403 [`ApiError::Http`].
    pub async fn delete_comment(&self, comment_id: CommentId) -> Result<(), ApiError> {
        self.execute(Method::Delete, &comment_path(comment_id), Body::Empty).await
    }

    // =========================================================================
    // MESSAGES
    // =========================================================================

    /// Users the signed-in user has exchanged messages with.
    ///
    /// # Errors
    ///
    /// Propagates request failures.
    pub async fn conversations(&self) -> Result<Vec<User>, ApiError> {
        let list: ListResponse<User> = self.fetch(Method::Get, CONVERSATIONS_PATH, Body::Empty).await?;
        Ok(list.into_vec())
    }

    /// Message history with one partner, oldest first.
    ///
    /// # Errors
    ///
    /// Propagates request failures.
    pub async fn messages_with(&self, user_id: UserId) -> Result<Vec<Message>, ApiError> {
        let list: ListResponse<Message> = self.fetch(Method::Get, &messages_with_path(user_id), Body::Empty).await?;
        Ok(list.into_vec())
    }

    /// # Errors
    ///
    /// Propagates request failures.
    pub async fn send_message(&self, receiver_id: UserId, content: &str) -> Result<Message, ApiError> {
        let body = Body::Json(serde_json::json!({ "receiver_id": receiver_id, "content": content }));
        self.fetch(Method::Post, MESSAGES_PATH, body).await
    }
}
