//! Relative timestamps for posts, comments, and messages.

#[cfg(test)]
#[path = "timefmt_test.rs"]
mod timefmt_test;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Render `timestamp` (RFC 3339) relative to `now`: `just now`, `5m ago`,
/// `3h ago`, `2d ago`. Unparseable input is returned unchanged; timestamps in
/// the future count as `just now`.
#[must_use]
pub fn time_ago(timestamp: &str, now: OffsetDateTime) -> String {
    let Ok(at) = OffsetDateTime::parse(timestamp, &Rfc3339) else {
        return timestamp.to_owned();
    };
    let secs = (now - at).whole_seconds();
    if secs < MINUTE {
        "just now".to_owned()
    } else if secs < HOUR {
        format!("{}m ago", secs / MINUTE)
    } else if secs < DAY {
        format!("{}h ago", secs / HOUR)
    } else {
        format!("{}d ago", secs / DAY)
    }
}
