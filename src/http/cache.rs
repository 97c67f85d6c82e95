//! HTTP cache control module
//!
//! Provides `ETag` generation, conditional request handling and HTTP dates.

use chrono::{DateTime, TimeDelta, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

/// Cache lifetime for static assets, in seconds
pub const STATIC_MAX_AGE: i64 = 86_400;

/// Weak `ETag` from file size and modification time
///
/// Shaped like `W/"<size hex>-<mtime millis hex>"`, so it changes whenever
/// the file is rewritten without reading its content.
pub fn file_etag(size: u64, modified: SystemTime) -> String {
    let millis = modified
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());
    format!("W/\"{size:x}-{millis:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Uses the weak comparison `If-None-Match` calls for, so `W/"x"` and `"x"`
/// match. Supports lists (`"a", "b"`) and the `*` wildcard.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    let opaque = |tag: &str| tag.trim().trim_start_matches("W/").to_string();
    let ours = opaque(etag);

    if_none_match.is_some_and(|client| {
        client
            .split(',')
            .any(|e| e.trim() == "*" || opaque(e) == ours)
    })
}

/// Format a timestamp as an IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// `Expires` value `seconds` from now
pub fn expires_in(seconds: i64) -> String {
    let now = Utc::now();
    http_date(
        TimeDelta::try_seconds(seconds)
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(now),
    )
}
