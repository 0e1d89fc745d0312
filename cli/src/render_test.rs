use super::*;

use serde_json::json;

// 2024-01-01T00:00:00Z
fn now() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_704_067_200).unwrap()
}

fn user(id: i64, username: &str, first_name: &str) -> User {
    serde_json::from_value(json!({"id": id, "username": username, "first_name": first_name, "last_name": ""}))
        .unwrap()
}

fn post() -> Post {
    serde_json::from_value(json!({
        "id": 5,
        "author": {"id": 1, "username": "alice", "first_name": "Alice"},
        "content": "hello",
        "image": "/media/posts/a.png",
        "likes_count": 2,
        "comments_count": 1,
        "comments": [{"id": 9, "author": {"id": 2, "username": "bob"}, "content": "hi", "created_at": "2023-12-31T23:00:00Z"}],
        "is_liked": true,
        "created_at": "2023-12-31T22:00:00Z"
    }))
    .unwrap()
}

fn message(id: i64, sender: User, content: &str) -> Message {
    serde_json::from_value(json!({
        "id": id,
        "sender": sender,
        "content": content,
        "created_at": "2023-12-31T23:55:00Z"
    }))
    .unwrap()
}

// =============================================================================
// USERS AND POSTS
// =============================================================================

#[test]
fn user_line_shows_id_handle_and_name() {
    assert_eq!(user_line(&user(3, "carol", "Carol")), "#3 @carol (Carol)");
    assert_eq!(user_line(&user(4, "dave", "")), "#4 @dave (dave)");
}

#[test]
fn profile_block_defaults_missing_friend_count() {
    let block = profile_block(&user(3, "carol", "Carol"));
    assert!(block.ends_with("friends: 0"));
}

#[test]
fn post_block_renders_every_section() {
    let block = post_block(&post(), &ApiConfig::default(), now());
    let lines: Vec<&str> = block.lines().collect();
    assert_eq!(
        lines,
        vec![
            "#5 Alice · 2h ago",
            "hello",
            "[image] http://localhost:8000/media/posts/a.png",
            "2 likes (you) · 1 comments",
            "  #9 bob: hi",
        ]
    );
}

#[test]
fn like_line_reports_new_state() {
    assert_eq!(like_line(5, LikeResult { liked: false, likes_count: 1 }), "post #5 unliked (1 likes)");
}

// =============================================================================
// MESSAGES
// =============================================================================

#[test]
fn message_line_marks_direction() {
    let me = user(1, "alice", "Alice");
    let outgoing = message(1, me.clone(), "yo");
    let incoming = message(2, user(2, "bob", ""), "sup");
    assert_eq!(message_line(&outgoing, Some(&me), now()), "[5m ago] > Alice: yo");
    assert_eq!(message_line(&incoming, Some(&me), now()), "[5m ago] < bob: sup");
}

#[test]
fn unseen_returns_only_new_messages() {
    let bob = user(2, "bob", "");
    let mut seen = HashSet::new();

    let first = unseen(&mut seen, vec![message(1, bob.clone(), "a"), message(2, bob.clone(), "b")]);
    assert_eq!(first.len(), 2);

    let second = unseen(&mut seen, vec![message(1, bob.clone(), "a"), message(2, bob.clone(), "b"), message(3, bob, "c")]);
    assert_eq!(second.iter().map(|m| m.id).collect::<Vec<_>>(), vec![3]);
}
