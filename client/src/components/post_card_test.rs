use super::*;

#[test]
fn comments_label_pluralizes() {
    assert_eq!(comments_label(0), "0 comments");
    assert_eq!(comments_label(1), "1 comment");
    assert_eq!(comments_label(3), "3 comments");
}

#[test]
fn stats_row_parts_follow_counts() {
    assert_eq!(stats_shown(0, 0), (false, false));
    assert_eq!(stats_shown(2, 0), (true, false));
    assert_eq!(stats_shown(0, 1), (false, true));
}
