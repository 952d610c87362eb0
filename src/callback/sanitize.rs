//! Result payload sanitization.
//!
//! Raw module results can carry diff payloads, exception traces and raw
//! module output buffers that are large or not meant for the report. These
//! are dropped before anything is stored, and set-typed fields are turned
//! into ordered sequences so the payload is plain JSON.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use super::types::ResultField;

/// Payload keys removed before a result is stored.
pub const STRIPPED_KEYS: [&str; 5] = [
    "diff",
    "exception",
    "module_stderr",
    "module_stdout",
    "warnings",
];

/// Returns a JSON-only copy of `payload` without the [`STRIPPED_KEYS`].
///
/// Field order is preserved. Sets become arrays in their sorted order.
pub fn sanitize_payload(payload: &IndexMap<String, ResultField>) -> IndexMap<String, JsonValue> {
    payload
        .iter()
        .filter(|(key, _)| !STRIPPED_KEYS.contains(&key.as_str()))
        .map(|(key, field)| {
            let value = match field {
                ResultField::Json(value) => value.clone(),
                ResultField::Set(items) => {
                    JsonValue::Array(items.iter().cloned().map(JsonValue::String).collect())
                }
            };
            (key.clone(), value)
        })
        .collect()
}
