/**
 * Document Normalization
 *
 * Stored documents are opaque text. These helpers turn request payloads into
 * that text and stored text back into JSON, filling in fields the client
 * expects to find.
 */

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::shared::document::DocumentKind;
use crate::shared::SharedError;

/// Text to store for a request payload
///
/// Strings are taken verbatim; any other value is serialized.
pub fn payload_to_text(payload: Value) -> Result<String, SharedError> {
    match payload {
        Value::Null => Err(SharedError::validation("json", "document payload is required")),
        Value::String(text) => Ok(text),
        other => Ok(serde_json::to_string(&other)?),
    }
}

/// Parse a stored document, keeping the parser's position on failure
pub fn parse_stored(kind: DocumentKind, text: &str) -> Result<Value, SharedError> {
    serde_json::from_str(text).map_err(|e| SharedError::malformed(kind.as_str(), e.to_string()))
}

/// Give every character default `attributes` and `relations`
pub fn normalize_character(mut doc: Value) -> Value {
    if let Some(characters) = doc.get_mut("characters").and_then(Value::as_array_mut) {
        for character in characters.iter_mut().filter_map(Value::as_object_mut) {
            character
                .entry("attributes")
                .or_insert_with(|| Value::Object(Map::new()));
            character
                .entry("relations")
                .or_insert_with(|| Value::Array(Vec::new()));
        }
    }
    doc
}

/// Assign a fresh id to each timeline event without a string `id`
///
/// Returns the number of ids assigned.
pub fn ensure_event_ids(doc: &mut Value) -> usize {
    let Some(events) = doc.get_mut("events").and_then(Value::as_array_mut) else {
        return 0;
    };

    let mut assigned = 0;
    for event in events.iter_mut().filter_map(Value::as_object_mut) {
        let has_id = event.get("id").and_then(Value::as_str).is_some_and(|id| !id.is_empty());
        if !has_id {
            event.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
            assigned += 1;
        }
    }
    assigned
}

/// Timeline text with event ids filled in
///
/// Text that does not parse, or already has all ids, is returned unchanged.
pub fn prepare_timeline(text: String) -> Result<String, SharedError> {
    let Ok(mut doc) = serde_json::from_str::<Value>(&text) else {
        return Ok(text);
    };
    if ensure_event_ids(&mut doc) == 0 {
        return Ok(text);
    }
    Ok(serde_json::to_string(&doc)?)
}
