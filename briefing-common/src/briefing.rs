//! Briefing record model and schema validation
//!
//! A briefing is the structured summary of a client engagement extracted from
//! an unstructured conversation. The six business fields are mandatory; a
//! record missing any of them, or carrying the wrong shape, is rejected.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Fields every briefing must carry, in display order
pub const REQUIRED_FIELDS: [&str; 6] = [
    "objetivo",
    "publico_alvo",
    "referencias",
    "prazos",
    "orcamento",
    "observacoes",
];

/// Title used when neither the objective nor the input text is usable
pub const DEFAULT_TITLE: &str = "Novo Briefing";

/// Input text longer than this is truncated when used as a title
const TITLE_INPUT_CHARS: usize = 50;

/// Canonical briefing record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BriefingRecord {
    pub objetivo: String,
    pub publico_alvo: String,
    pub referencias: Vec<String>,
    /// Deadline label → description (e.g. "entrega" → "2 semanas")
    pub prazos: BTreeMap<String, String>,
    /// Budget label → amount (e.g. "total" → 2000.0)
    pub orcamento: BTreeMap<String, f64>,
    pub observacoes: Vec<String>,
    /// Original conversation text, attached after extraction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texto_original: Option<String>,
}

/// Input to briefing generation
#[derive(Debug, Clone, Deserialize)]
pub struct BriefingRequest {
    pub conversation: String,
    pub user_id: String,
}

/// Reason a JSON value was rejected as a briefing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    NotAnObject(&'static str),
    MissingField(&'static str),
    WrongType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaViolation::NotAnObject(found) => {
                write!(f, "expected a JSON object, found {}", found)
            }
            SchemaViolation::MissingField(field) => {
                write!(f, "missing required field `{}`", field)
            }
            SchemaViolation::WrongType {
                field,
                expected,
                found,
            } => write!(f, "field `{}` must be {}, found {}", field, expected, found),
        }
    }
}

impl std::error::Error for SchemaViolation {}

impl BriefingRecord {
    /// Validate a parsed JSON value and convert it into a record
    ///
    /// Unknown keys are dropped. `texto_original` is kept when it is a string.
    pub fn from_value(value: Value) -> Result<Self, SchemaViolation> {
        let map = match value {
            Value::Object(map) => map,
            other => return Err(SchemaViolation::NotAnObject(type_name(&other))),
        };

        let objetivo = require_string(&map, "objetivo")?;
        let publico_alvo = require_string(&map, "publico_alvo")?;
        let referencias = require_string_list(&map, "referencias")?;
        let prazos = require_string_map(&map, "prazos")?;
        let orcamento = require_number_map(&map, "orcamento")?;
        let observacoes = require_string_list(&map, "observacoes")?;
        let texto_original = map
            .get("texto_original")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            objetivo,
            publico_alvo,
            referencias,
            prazos,
            orcamento,
            observacoes,
            texto_original,
        })
    }

    /// Attach the original conversation text
    pub fn with_original_text(mut self, text: impl Into<String>) -> Self {
        self.texto_original = Some(text.into());
        self
    }

    /// Derive a display title
    ///
    /// Non-empty objective first, then the leading characters of the input
    /// text, then [`DEFAULT_TITLE`].
    pub fn derive_title(&self, input_text: &str) -> String {
        let objetivo = self.objetivo.trim();
        if !objetivo.is_empty() {
            return objetivo.to_string();
        }

        let input = input_text.trim();
        if input.is_empty() {
            return DEFAULT_TITLE.to_string();
        }

        if input.chars().count() > TITLE_INPUT_CHARS {
            let head: String = input.chars().take(TITLE_INPUT_CHARS).collect();
            format!("{}...", head)
        } else {
            input.to_string()
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn require<'a>(map: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value, SchemaViolation> {
    map.get(field).ok_or(SchemaViolation::MissingField(field))
}

fn require_string(map: &Map<String, Value>, field: &'static str) -> Result<String, SchemaViolation> {
    match require(map, field)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(SchemaViolation::WrongType {
            field: field.to_string(),
            expected: "a string",
            found: type_name(other),
        }),
    }
}

fn require_string_list(
    map: &Map<String, Value>,
    field: &'static str,
) -> Result<Vec<String>, SchemaViolation> {
    let items = match require(map, field)? {
        Value::Array(items) => items,
        other => {
            return Err(SchemaViolation::WrongType {
                field: field.to_string(),
                expected: "an array of strings",
                found: type_name(other),
            })
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(SchemaViolation::WrongType {
                field: format!("{}[{}]", field, i),
                expected: "a string",
                found: type_name(other),
            }),
        })
        .collect()
}

fn require_object<'a>(
    map: &'a Map<String, Value>,
    field: &'static str,
    expected: &'static str,
) -> Result<&'a Map<String, Value>, SchemaViolation> {
    match require(map, field)? {
        Value::Object(inner) => Ok(inner),
        other => Err(SchemaViolation::WrongType {
            field: field.to_string(),
            expected,
            found: type_name(other),
        }),
    }
}

fn require_string_map(
    map: &Map<String, Value>,
    field: &'static str,
) -> Result<BTreeMap<String, String>, SchemaViolation> {
    require_object(map, field, "an object of strings")?
        .iter()
        .map(|(label, value)| match value {
            Value::String(s) => Ok((label.clone(), s.clone())),
            other => Err(SchemaViolation::WrongType {
                field: format!("{}.{}", field, label),
                expected: "a string",
                found: type_name(other),
            }),
        })
        .collect()
}

fn require_number_map(
    map: &Map<String, Value>,
    field: &'static str,
) -> Result<BTreeMap<String, f64>, SchemaViolation> {
    require_object(map, field, "an object of numbers")?
        .iter()
        .map(|(label, value)| match value.as_f64() {
            Some(n) => Ok((label.clone(), n)),
            None => Err(SchemaViolation::WrongType {
                field: format!("{}.{}", field, label),
                expected: "a number",
                found: type_name(value),
            }),
        })
        .collect()
}
