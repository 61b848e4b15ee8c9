//! Timestamp utilities

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current UTC timestamp as stored in the database (RFC 3339, microsecond precision)
pub fn now_rfc3339() -> String {
    now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Format a stored timestamp for display as `dd/mm/YYYY HH:MM`
///
/// Values that do not parse as RFC 3339 are returned unchanged.
pub fn format_display(value: &str) -> String {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => dt.format("%d/%m/%Y %H:%M").to_string(),
        Err(_) => value.to_string(),
    }
}
