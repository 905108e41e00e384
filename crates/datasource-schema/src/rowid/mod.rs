//! Opaque row identifiers for external tables.
//!
//! External tables have no single `_id`; rows are addressed by their
//! primary key values, which may span several columns. The codec packs the
//! ordered key values into one percent-encoded string that is safe in URL
//! path segments and template expressions.
//!
//! Double quotes in the JSON encoding are swapped for single quotes
//! because the encoded id can be embedded inside template statements where
//! double quotes are reserved; they are swapped back before parsing.

use percent_encoding::{percent_decode_str, utf8_percent_encode};
use serde_json::Value;

use crate::core::identifier::URI_COMPONENT_SET;

/// Encode ordered primary-key values into a single opaque row id.
///
/// A single scalar may be passed as a one-element slice; the encoding
/// preserves both order and JSON types.
pub fn generate_row_id_field(key_values: &[Value]) -> String {
    // serde_json is infallible for Value inputs
    let json = serde_json::to_string(key_values).unwrap_or_default();
    let swapped = json.replace('"', "'");
    utf8_percent_encode(&swapped, URI_COMPONENT_SET).to_string()
}

/// Decode a row id back into its ordered primary-key values.
///
/// Always returns a Vec: arrays come back as-is, scalars are wrapped in a
/// singleton. Input that does not parse as JSON after decoding — for
/// example template placeholder tokens used for many-to-many join
/// references — comes back unchanged as a single-element Vec rather than
/// raising. Composite keys are always valid JSON, so that fallback only
/// ever fires for placeholder tokens.
pub fn break_row_id_field(id: &str) -> Vec<Value> {
    if id.is_empty() {
        return Vec::new();
    }
    let decoded = match percent_decode_str(id).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => return vec![Value::String(id.to_string())],
    };
    let swapped = decoded.replace('\'', "\"");
    match serde_json::from_str::<Value>(&swapped) {
        Ok(Value::Array(values)) => values,
        Ok(value) => vec![value],
        // wasn't json - likely a template token for a many to many
        Err(_) => vec![Value::String(id.to_string())],
    }
}

/// True if the value already looks like a row id: an array of key values,
/// or a string shaped like a JSON array literal.
///
/// Operates on the *decoded* string form; the percent-encoded form never
/// begins with `[`, so this check is meaningless on encoded input.
pub fn is_row_id(field: &Value) -> bool {
    match field {
        Value::Array(_) => true,
        Value::String(s) => is_bracketed(s),
        _ => false,
    }
}

/// Reduce a row id value to a single key.
///
/// Arrays yield their first element (the single-column fast path);
/// bracket-shaped strings yield the interior substring without JSON
/// parsing; anything else passes through unchanged.
pub fn convert_row_id(field: &Value) -> Value {
    match field {
        Value::Array(values) => values.first().cloned().unwrap_or(Value::Null),
        Value::String(s) if is_bracketed(s) => Value::String(s[1..s.len() - 1].to_string()),
        other => other.clone(),
    }
}

fn is_bracketed(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('[') && s.ends_with(']')
}
