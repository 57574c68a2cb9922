// src/history/format.rs
// Relative-age rendering for history listings

use chrono::{DateTime, TimeZone, Utc};

/// Age of an entry relative to `now`, as shown in history listings
pub fn format_relative(timestamp_ms: i64, now: DateTime<Utc>) -> String {
    let elapsed = now.timestamp_millis().saturating_sub(timestamp_ms).max(0);
    let minutes = elapsed / 60_000;
    let hours = minutes / 60;
    let days = hours / 24;

    if minutes < 1 {
        "just now".to_string()
    } else if hours < 1 {
        format!("{}m ago", minutes)
    } else if days < 1 {
        format!("{}h ago", hours)
    } else if days < 7 {
        format!("{}d ago", days)
    } else {
        match Utc.timestamp_millis_opt(timestamp_ms).single() {
            Some(at) => at.format("%Y-%m-%d").to_string(),
            None => "unknown".to_string(),
        }
    }
}
