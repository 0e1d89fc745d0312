//! Plain-text rendering of API results for the terminal.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::HashSet;
use std::fmt::Write as _;

use api::ApiConfig;
use api::messaging::is_outgoing;
use api::timefmt::time_ago;
use api::types::{LikeResult, Message, MessageId, Post, User};
use time::OffsetDateTime;

pub fn user_line(user: &User) -> String {
    format!("#{} @{} ({})", user.id, user.username, user.full_name())
}

pub fn profile_block(user: &User) -> String {
    let mut out = user_line(user);
    if let Some(bio) = user.bio.as_deref().filter(|b| !b.is_empty()) {
        let _ = write!(out, "\n  {bio}");
    }
    if let Some(email) = user.email.as_deref() {
        let _ = write!(out, "\n  email: {email}");
    }
    let _ = write!(out, "\n  friends: {}", user.friends_count.unwrap_or(0));
    out
}

pub fn post_block(post: &Post, config: &ApiConfig, now: OffsetDateTime) -> String {
    let mut out = format!("#{} {} · {}", post.id, post.author.display_name(), time_ago(&post.created_at, now));
    if !post.content.is_empty() {
        let _ = write!(out, "\n{}", post.content);
    }
    if let Some(image) = post.image.as_deref() {
        let _ = write!(out, "\n[image] {}", config.media_url(image));
    }
    let liked = if post.is_liked { " (you)" } else { "" };
    let _ = write!(out, "\n{} likes{liked} · {} comments", post.likes_count, post.comments_count);
    for comment in &post.comments {
        let _ = write!(out, "\n  #{} {}: {}", comment.id, comment.author.username, comment.content);
    }
    out
}

pub fn like_line(post_id: i64, result: LikeResult) -> String {
    let state = if result.liked { "liked" } else { "unliked" };
    format!("post #{post_id} {state} ({} likes)", result.likes_count)
}

pub fn message_line(message: &Message, viewer: Option<&User>, now: OffsetDateTime) -> String {
    let arrow = if is_outgoing(message, viewer) { ">" } else { "<" };
    format!(
        "[{}] {arrow} {}: {}",
        time_ago(&message.created_at, now),
        message.sender.display_name(),
        message.content
    )
}

/// Messages not printed yet, in thread order. Marks them as seen.
pub fn unseen(seen: &mut HashSet<MessageId>, messages: Vec<Message>) -> Vec<Message> {
    messages.into_iter().filter(|m| seen.insert(m.id)).collect()
}
