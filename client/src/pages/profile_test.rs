use super::*;
use leptos::prelude::Owner;

#[test]
fn parse_user_id_accepts_numeric_segments() {
    assert_eq!(parse_user_id(Some("42")), Some(42));
    assert_eq!(parse_user_id(Some(" 7 ")), Some(7));
}

#[test]
fn parse_user_id_rejects_missing_or_garbage() {
    assert_eq!(parse_user_id(None), None);
    assert_eq!(parse_user_id(Some("me")), None);
    assert_eq!(parse_user_id(Some("")), None);
}

#[test]
fn joined_label_formats_month_and_year() {
    assert_eq!(joined_label(Some("2024-03-05T10:00:00Z")), Some("Joined March 2024".to_owned()));
}

#[test]
fn joined_label_skips_missing_or_invalid_dates() {
    assert_eq!(joined_label(None), None);
    assert_eq!(joined_label(Some("yesterday")), None);
}

#[test]
fn build_profile_update_trims_and_sends_every_text_field() {
    let update = build_profile_update(" Alice ", "", " hi there ", None);
    assert_eq!(update.first_name.as_deref(), Some("Alice"));
    assert_eq!(update.last_name.as_deref(), Some(""));
    assert_eq!(update.bio.as_deref(), Some("hi there"));
    assert!(update.avatar.is_none());
}

#[test]
fn build_profile_update_carries_new_avatar() {
    let upload = Upload { file_name: "me.png".to_owned(), content_type: "image/png".to_owned(), bytes: vec![1, 2] };
    let update = build_profile_update("a", "b", "c", Some(upload.clone()));
    assert_eq!(update.avatar, Some(upload));
}

#[test]
fn still_requested_tracks_the_route_id() {
    let owner = Owner::new();
    owner.with(|| {
        let requested = Memo::new(|_| Some(7));
        assert!(still_requested(requested, 7));
        assert!(!still_requested(requested, 8));
    });
}

#[test]
fn still_requested_is_false_once_the_page_is_disposed() {
    let owner = Owner::new();
    let requested = owner.with(|| Memo::new(|_| Some(7)));
    owner.cleanup();
    assert!(!still_requested(requested, 7));
}
