//! Normalization of stored briefing content
//!
//! Stored payloads reach us in several encodings: a JSON object, a JSON
//! string holding that object, or an object whose `briefing_result` is itself
//! a JSON string. [`normalize`] reconciles all of them into
//! [`NormalizedContent`]. It never fails: anything undecodable degrades to
//! empty content.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::briefing::BriefingRecord;

/// Canonical content shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedContent {
    pub input_text: String,
    pub briefing_result: Map<String, Value>,
}

impl NormalizedContent {
    /// Canonical content for a freshly generated briefing
    pub fn from_record(input_text: impl Into<String>, record: &BriefingRecord) -> Self {
        let briefing_result = match serde_json::to_value(record) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self {
            input_text: input_text.into(),
            briefing_result,
        }
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("input_text".to_string(), Value::String(self.input_text.clone()));
        map.insert("briefing_result".to_string(), Value::Object(self.briefing_result.clone()));
        Value::Object(map)
    }

    pub fn is_empty(&self) -> bool {
        self.input_text.is_empty() && self.briefing_result.is_empty()
    }

    /// Typed view of the briefing, when it satisfies the schema
    pub fn briefing(&self) -> Option<BriefingRecord> {
        BriefingRecord::from_value(Value::Object(self.briefing_result.clone())).ok()
    }
}

/// Decode a value into an object, one pass at most
///
/// Objects pass through; strings are parsed once; everything else (and any
/// parse failure or non-object result) yields an empty object.
fn decode_object(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.clone(),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}

/// Normalize a stored content payload
pub fn normalize(raw: &Value) -> NormalizedContent {
    let top = decode_object(raw);

    let input_text = match top.get("input_text") {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };

    let briefing_result = top
        .get("briefing_result")
        .map(decode_object)
        .unwrap_or_default();

    NormalizedContent {
        input_text,
        briefing_result,
    }
}

/// Normalize a payload read from a text column
///
/// The column may hold JSON (object or string literal) or arbitrary text.
pub fn normalize_str(stored: &str) -> NormalizedContent {
    let value = serde_json::from_str::<Value>(stored)
        .unwrap_or_else(|_| Value::String(stored.to_string()));
    normalize(&value)
}

/// Whether a stored column already holds the canonical encoding
pub fn is_canonical(stored: &str) -> bool {
    match serde_json::from_str::<Value>(stored) {
        Ok(Value::Object(map)) => {
            map.len() == 2
                && matches!(map.get("input_text"), Some(Value::String(_)))
                && matches!(map.get("briefing_result"), Some(Value::Object(_)))
        }
        _ => false,
    }
}
