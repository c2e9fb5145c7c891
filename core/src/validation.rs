//! Input rules for todo payloads, shared by the server handlers and the
//! client store.
//!
//! # Design
//! Validation works on a raw `serde_json::Value` rather than a typed struct
//! so both sides see exactly the same failures, including wrong types and
//! unexpected keys that a derive-based deserializer would report with its
//! own wording. Rules run in a fixed order and the first failure wins.

use serde_json::{Map, Value};
use thiserror::Error;

const TEXT: &str = "text";
const COMPLETED: &str = "completed";

/// A todo payload that passed validation, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoInput {
    pub text: String,
    pub completed: bool,
}

/// The first rule a payload broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Name of the offending key, or `value` when the payload itself is wrong.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, reason: &str) -> Self {
        Self {
            field: field.to_string(),
            message: format!("\"{field}\" {reason}"),
        }
    }
}

/// Validate an arbitrary JSON payload against the todo rules.
pub fn validate_todo(input: &Value) -> Result<TodoInput, ValidationError> {
    let Value::Object(fields) = input else {
        return Err(ValidationError::new("value", "must be of type object"));
    };

    let completed = completed_field(fields)?;
    let text = text_field(fields)?;

    if let Some(key) = fields.keys().find(|k| *k != TEXT && *k != COMPLETED) {
        return Err(ValidationError::new(key, "is not allowed"));
    }

    Ok(TodoInput { text, completed })
}

/// Validate a bare text value as if it had been submitted as `{"text": text}`.
pub fn validate_text(text: &str) -> Result<TodoInput, ValidationError> {
    let mut fields = Map::new();
    fields.insert(TEXT.to_string(), Value::String(text.to_string()));
    validate_todo(&Value::Object(fields))
}

fn completed_field(fields: &Map<String, Value>) -> Result<bool, ValidationError> {
    match fields.get(COMPLETED) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        // String forms are converted, matching form-encoded submissions.
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(true),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(false),
        Some(_) => Err(ValidationError::new(COMPLETED, "must be a boolean")),
    }
}

fn text_field(fields: &Map<String, Value>) -> Result<String, ValidationError> {
    match fields.get(TEXT) {
        None => Err(ValidationError::new(TEXT, "is required")),
        Some(Value::String(s)) if s.is_empty() => {
            Err(ValidationError::new(TEXT, "is not allowed to be empty"))
        }
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ValidationError::new(TEXT, "must be a string")),
    }
}
