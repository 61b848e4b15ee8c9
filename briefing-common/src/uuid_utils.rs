//! UUID utilities for briefing identifiers

use uuid::Uuid;

/// Generate a new briefing identifier (UUIDv4, hyphenated)
pub fn generate() -> String {
    Uuid::new_v4().to_string()
}

/// Check that a path segment is a well-formed briefing identifier
pub fn is_valid_id(s: &str) -> bool {
    Uuid::parse_str(s).is_ok()
}
