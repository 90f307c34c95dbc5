//! Timestamp utilities

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp as ISO-8601 with a trailing `Z` (e.g. `2025-01-05T10:04:00.123456Z`)
pub fn to_iso8601(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Whole seconds elapsed since `since`, clamped at zero
pub fn seconds_since(since: &DateTime<Utc>) -> u64 {
    Utc::now()
        .signed_duration_since(*since)
        .num_seconds()
        .max(0) as u64
}
