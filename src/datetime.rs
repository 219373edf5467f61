//! Timestamp helpers.
//!
//! Nodes, files and collections carry timestamps as milliseconds since the
//! Unix epoch, the unit the browser UI works in.

use chrono::{DateTime, Utc};

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parse a timestamp written as text: epoch milliseconds, or RFC 3339 as
/// older clients stored it.
pub fn parse_millis(text: &str) -> Option<i64> {
    let text = text.trim();
    text.parse::<i64>().ok().or_else(|| {
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| dt.timestamp_millis())
    })
}
