use super::*;

#[test]
fn prompt_uses_display_name() {
    let user: User =
        serde_json::from_value(serde_json::json!({"id": 1, "username": "alice", "first_name": "Alice"})).unwrap();
    assert_eq!(composer_prompt(Some(&user)), "What's on your mind, Alice?");
}

#[test]
fn prompt_without_user_is_generic() {
    assert_eq!(composer_prompt(None), "What's on your mind, ?");
}

fn draft(content: &str, image: Option<Upload>) -> NewPost {
    NewPost { content: content.to_owned(), image }
}

#[test]
fn post_waits_for_photo_read() {
    assert!(!can_post(&draft("beach day", None), false, true));
    assert!(can_post(&draft("beach day", None), false, false));
}

#[test]
fn post_needs_content_or_photo_and_no_submit_in_flight() {
    let photo = Upload { file_name: "a.png".to_owned(), content_type: "image/png".to_owned(), bytes: vec![1] };
    assert!(can_post(&draft("", Some(photo)), false, false));
    assert!(!can_post(&draft("   ", None), false, false));
    assert!(!can_post(&draft("hi", None), true, false));
}
