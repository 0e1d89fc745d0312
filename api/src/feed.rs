//! Local post-list state for the feed and profile pages.
//!
//! DESIGN
//! ======
//! The server stays the source of truth. These updates only fold a confirmed
//! response into the displayed list: a like replaces flag and count with the
//! server's values, a comment is appended as returned, deletes remove by id.
//! Callers apply them on success and leave the list untouched on failure.

#[cfg(test)]
#[path = "feed_test.rs"]
mod feed_test;

use crate::types::{Comment, CommentId, LikeResult, Post, PostId, User};

/// Posts displayed by one view, newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostList {
    pub posts: Vec<Post>,
}

impl PostList {
    #[must_use]
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    #[must_use]
    pub fn get(&self, post_id: PostId) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    fn get_mut(&mut self, post_id: PostId) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| p.id == post_id)
    }

    /// Show a freshly created post at the top.
    pub fn prepend(&mut self, post: Post) {
        self.posts.insert(0, post);
    }

    /// Returns `false` when the post was not displayed.
    pub fn remove(&mut self, post_id: PostId) -> bool {
        let before = self.posts.len();
        self.posts.retain(|p| p.id != post_id);
        self.posts.len() != before
    }

    pub fn apply_like(&mut self, post_id: PostId, result: LikeResult) -> bool {
        let Some(post) = self.get_mut(post_id) else {
            return false;
        };
        post.is_liked = result.liked;
        post.likes_count = result.likes_count;
        true
    }

    pub fn append_comment(&mut self, post_id: PostId, comment: Comment) -> bool {
        let Some(post) = self.get_mut(post_id) else {
            return false;
        };
        post.comments.push(comment);
        post.comments_count = post.comments_count.saturating_add(1);
        true
    }

    /// Remove exactly one comment id from one post.
    pub fn remove_comment(&mut self, post_id: PostId, comment_id: CommentId) -> bool {
        let Some(post) = self.get_mut(post_id) else {
            return false;
        };
        let before = post.comments.len();
        post.comments.retain(|c| c.id != comment_id);
        let removed = post.comments.len() != before;
        if removed {
            post.comments_count = post.comments_count.saturating_sub(1);
        }
        removed
    }
}

/// Only a post's author sees its delete control.
#[must_use]
pub fn can_delete_post(post: &Post, viewer: Option<&User>) -> bool {
    viewer.is_some_and(|u| u.id == post.author.id)
}

/// Comment authors and the post's author may remove a comment.
#[must_use]
pub fn can_delete_comment(post: &Post, comment: &Comment, viewer: Option<&User>) -> bool {
    viewer.is_some_and(|u| u.id == comment.author.id || u.id == post.author.id)
}
