//! Timestamp utilities

use chrono::{DateTime, Local, TimeZone, Utc};

/// Display format for job labels, e.g. `2026-10-16 14:05:09`
pub const LABEL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp in the operator's local time zone for display
pub fn format_local<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String {
    timestamp.with_timezone(&Local).format(LABEL_FORMAT).to_string()
}
