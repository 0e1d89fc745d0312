use super::*;
use crate::test_support::{
    MockTransport, client_with_store, comment_json, json, post_json, store_with_tokens, user, user_json,
};
use std::cell::Cell;
use std::rc::Rc;

fn post(id: PostId, author: i64) -> Post {
    serde_json::from_value(post_json(id, author, "text")).unwrap()
}

fn comment(id: CommentId, author: i64, post_id: PostId) -> Comment {
    serde_json::from_value(comment_json(id, author, post_id, "c")).unwrap()
}

fn list_with_comments() -> PostList {
    let mut first = post(1, 1);
    first.comments = vec![comment(10, 2, 1), comment(11, 3, 1), comment(12, 2, 1)];
    first.comments_count = 3;
    PostList::new(vec![first, post(2, 1)])
}

// =============================================================
// Posts
// =============================================================

#[test]
fn prepend_puts_new_post_first() {
    let mut list = PostList::new(vec![post(1, 1)]);
    list.prepend(post(2, 1));
    assert_eq!(list.posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2, 1]);
}

#[test]
fn remove_drops_only_that_post() {
    let mut list = PostList::new(vec![post(1, 1), post(2, 1), post(3, 1)]);
    assert!(list.remove(2));
    assert_eq!(list.posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 3]);
    assert!(!list.remove(2));
}

#[test]
fn apply_like_uses_server_values() {
    let mut list = PostList::new(vec![post(1, 1)]);
    assert!(list.apply_like(1, LikeResult { liked: true, likes_count: 9 }));
    let p = list.get(1).unwrap();
    assert!(p.is_liked);
    assert_eq!(p.likes_count, 9);
}

#[test]
fn apply_like_to_missing_post_is_noop() {
    let mut list = PostList::new(vec![post(1, 1)]);
    let before = list.clone();
    assert!(!list.apply_like(5, LikeResult { liked: true, likes_count: 1 }));
    assert_eq!(list, before);
}

// =============================================================
// Comments
// =============================================================

#[test]
fn append_comment_keeps_order_and_bumps_count() {
    let mut list = list_with_comments();
    assert!(list.append_comment(1, comment(13, 4, 1)));
    let p = list.get(1).unwrap();
    assert_eq!(p.comments.iter().map(|c| c.id).collect::<Vec<_>>(), vec![10, 11, 12, 13]);
    assert_eq!(p.comments_count, 4);
}

#[test]
fn remove_comment_removes_exactly_that_id() {
    let mut list = list_with_comments();
    assert!(list.remove_comment(1, 11));
    let p = list.get(1).unwrap();
    assert_eq!(p.comments.iter().map(|c| c.id).collect::<Vec<_>>(), vec![10, 12]);
    assert_eq!(p.comments_count, 2);
}

#[test]
fn remove_unknown_comment_changes_nothing() {
    let mut list = list_with_comments();
    let before = list.clone();
    assert!(!list.remove_comment(1, 99));
    assert!(!list.remove_comment(2, 10));
    assert_eq!(list, before);
}

// =============================================================
// Ownership
// =============================================================

#[test]
fn only_author_may_delete() {
    let p = post(1, 7);
    assert!(can_delete_post(&p, Some(&user(7, "owner"))));
    assert!(!can_delete_post(&p, Some(&user(8, "other"))));
    assert!(!can_delete_post(&p, None));

    let c = comment(10, 2, 1);
    assert!(can_delete_comment(&p, &c, Some(&user(2, "commenter"))));
    assert!(can_delete_comment(&p, &c, Some(&user(7, "owner"))));
    assert!(!can_delete_comment(&p, &c, Some(&user(9, "stranger"))));
    assert!(!can_delete_comment(&p, &c, None));
}

// =============================================================
// Round trips against a scripted backend
// =============================================================

#[tokio::test]
async fn liking_twice_restores_original_state() {
    let state = Rc::new(Cell::new(false));
    let transport = MockTransport::new(move |_| {
        state.set(!state.get());
        let count = u32::from(state.get()) + 4;
        json(200, &serde_json::json!({"liked": state.get(), "likes_count": count}))
    });
    let api = client_with_store(transport, store_with_tokens("acc-1", "ref-1"));

    let mut original = post(1, 1);
    original.likes_count = 4;
    let mut list = PostList::new(vec![original.clone()]);

    let first = api.like_post(1).await.unwrap();
    list.apply_like(1, first);
    assert!(list.get(1).unwrap().is_liked);
    assert_eq!(list.get(1).unwrap().likes_count, 5);

    let second = api.like_post(1).await.unwrap();
    list.apply_like(1, second);
    assert_eq!(list.get(1), Some(&original));
}

#[tokio::test]
async fn failed_like_leaves_post_unchanged() {
    let transport = MockTransport::new(|_| json(500, &serde_json::json!({})));
    let api = client_with_store(transport, store_with_tokens("acc-1", "ref-1"));
    let mut list = PostList::new(vec![post(1, 1)]);
    let before = list.clone();

    if let Ok(result) = api.like_post(1).await {
        list.apply_like(1, result);
    }

    assert_eq!(list, before);
}

#[tokio::test]
async fn login_then_post_prepends_fresh_post() {
    let transport = MockTransport::new(|req| {
        if req.url.ends_with("/auth/login/") {
            return json(200, &serde_json::json!({"user": user_json(1, "alice"), "access": "a", "refresh": "r"}));
        }
        if req.url.ends_with("/posts/feed/") {
            return json(200, &serde_json::json!([post_json(1, 2, "older")]));
        }
        json(201, &post_json(2, 1, "hello"))
    });
    let api = client_with_store(transport, std::sync::Arc::new(crate::MemoryStore::new()));

    let credentials = crate::types::Credentials { username: "alice".to_owned(), password: "secret1".to_owned() };
    api.login(&credentials).await.unwrap();
    assert_eq!(api.session().access_token().as_deref(), Some("a"));
    assert_eq!(api.session().refresh_token().as_deref(), Some("r"));

    let mut list = PostList::new(api.feed().await.unwrap());
    let created = api.create_post(crate::types::NewPost { content: "hello".to_owned(), image: None }).await.unwrap();
    list.prepend(created);

    let top = &list.posts[0];
    assert_eq!(top.content, "hello");
    assert_eq!(top.likes_count, 0);
    assert!(!top.is_liked);
    assert_eq!(list.len(), 2);
}
