use serde_json::{Map, Value};

use crate::errors::PipelineError;

/// An inbound request body, resolved to one of two shapes at the edge.
///
/// Handlers receive raw bytes; tests and embedders may already hold parsed
/// JSON. Either way the distinction is settled here exactly once - nothing
/// downstream re-checks what the body was.
pub enum Payload<'a> {
    /// Bytes still to be parsed as JSON.
    Raw(&'a [u8]),
    /// An already-parsed JSON value.
    Structured(Value),
}

/// Normalizes a payload into a JSON object map for field validation.
///
/// A JSON string value is parsed one more time: platforms that pre-parse
/// bodies can hand over a string whose contents are the actual document.
/// `invalid_shape` is the pipeline-specific detail used when the result is
/// not an object.
pub fn into_object(
    payload: Payload<'_>,
    invalid_shape: &str,
) -> Result<Map<String, Value>, PipelineError> {
    let value = match payload {
        Payload::Raw(bytes) => serde_json::from_slice::<Value>(bytes)
            .map_err(|_| PipelineError::InvalidPayload("Invalid JSON payload".to_string()))?,
        Payload::Structured(value) => value,
    };

    let value = match value {
        Value::String(inner) => serde_json::from_str::<Value>(&inner)
            .map_err(|_| PipelineError::InvalidPayload("Invalid JSON payload".to_string()))?,
        other => other,
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(PipelineError::InvalidPayload(invalid_shape.to_string())),
    }
}

/// Returns the trimmed value of a required string field, or `None` when the
/// field is absent, not a string, or empty after trimming. An absent field
/// stays absent - it is never coerced into literal text.
pub fn required_trimmed(map: &Map<String, Value>, field: &str) -> Option<String> {
    match map.get(field) {
        Some(Value::String(raw)) => {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}
