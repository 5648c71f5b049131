// Event validator
// Pure function of the submitted payload; no side effects.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::entities::EventDraft;
use crate::value_objects::{EventType, ALLOWED_EVENT_TYPES};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid event type '{}', allowed types: {}", .got, ALLOWED_EVENT_TYPES.join(", "))]
    InvalidEventType { got: String },
    #[error("{field} is required and must be a non-empty string")]
    MissingOrInvalidField { field: &'static str },
    #[error("{0}")]
    MissingTypeSpecificField(&'static str),
}

/// Validates a raw submission into an [`EventDraft`].
///
/// The payload is inspected as loose JSON rather than deserialized into a
/// typed struct so each rejection names the offending field instead of
/// collapsing into one deserialization error.
pub fn validate_event(payload: &Value) -> Result<EventDraft, ValidationError> {
    let type_str = payload.get("type").and_then(Value::as_str).unwrap_or("");
    let event_type = EventType::parse(type_str).ok_or_else(|| ValidationError::InvalidEventType {
        got: type_str.to_string(),
    })?;

    let session_id = require_string(payload, "sessionId")?;
    let country = require_string(payload, "country")?;

    let extra = match payload.get("extra") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => return Err(ValidationError::MissingOrInvalidField { field: "extra" }),
    };

    match event_type {
        EventType::ImageView => {
            if !extra.get("imageIndex").map(Value::is_number).unwrap_or(false) {
                return Err(ValidationError::MissingTypeSpecificField(
                    "image_view requires a numeric extra.imageIndex",
                ));
            }
        }
        EventType::CodeCopy => {
            if !extra.get("codeVersion").map(is_truthy).unwrap_or(false) {
                return Err(ValidationError::MissingTypeSpecificField(
                    "code_copy requires extra.codeVersion",
                ));
            }
        }
        _ => {}
    }

    Ok(EventDraft {
        event_type,
        session_id,
        country,
        extra,
    })
}

fn require_string(payload: &Value, field: &'static str) -> Result<String, ValidationError> {
    match payload.get(field).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(ValidationError::MissingOrInvalidField { field }),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
