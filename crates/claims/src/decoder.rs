//! Typed-value decoding.
//!
//! Claim documents may arrive in the attribute-value wire format, where every
//! scalar and collection is wrapped in a single-key object naming its type:
//!
//! ```json
//! { "claim_id": { "S": "u/1.pdf" }, "final_score": { "N": "35" },
//!   "flags": { "L": [ { "S": "HIGH_AMOUNT" } ] } }
//! ```
//!
//! [`decode`] normalises such values into plain JSON. Values that are already
//! plain pass through unchanged, so decoding is idempotent:
//! `decode(decode(v)) == decode(v)`.
//!
//! ## Recognised tags
//!
//! | Tag | Payload | Decodes to |
//! |-----|---------|------------|
//! | `S` | string | string |
//! | `N` | decimal text (or a JSON number) | integer when integral, else float |
//! | `BOOL` | bool | bool |
//! | `NULL` | `true` | null |
//! | `M` | object of values | object, each value decoded |
//! | `L` | array of values | array, each element decoded |
//! | `SS` / `BS` | array of strings | array of strings |
//! | `NS` | array of decimal text | array of numbers |
//! | `B` | base64 string | the base64 string, unchanged |
//!
//! A recognised tag with a payload of the wrong JSON type is
//! [`ClaimError::DecodeMalformed`]; the decoder never guesses.
//!
//! ## Known limitation
//!
//! Telling a tagged wrapper from a plain object is a heuristic, isolated in
//! [`is_tagged_wrapper`]: a plain object that happens to have exactly one key
//! named like a tag (e.g. `{"S": "x"}`) is treated as tagged. If the wire
//! contract ever carries an explicit format marker, only that predicate needs
//! to change.

use serde_json::{Map, Number, Value};

use crate::record::{ClaimRecord, JOB_ID_KEY};
use crate::ClaimError;

/// Type tags of the attribute-value wire format.
pub const TAGS: [&str; 10] = ["S", "N", "BOOL", "NULL", "M", "L", "SS", "NS", "BS", "B"];

/// Returns `true` when `value` looks like a tagged wrapper: an object with
/// exactly one key, and that key is a recognised tag.
pub fn is_tagged_wrapper(value: &Value) -> bool {
    match value {
        Value::Object(map) if map.len() == 1 => map
            .keys()
            .next()
            .is_some_and(|key| TAGS.contains(&key.as_str())),
        _ => false,
    }
}

/// Decodes a (possibly tagged) value into plain JSON.
pub fn decode(value: &Value) -> Result<Value, ClaimError> {
    decode_at(value, "")
}

/// Decodes a whole claim document into a [`ClaimRecord`].
///
/// - `null` decodes to an empty record.
/// - A tagged `M` wrapper decodes to its mapping.
/// - An object decodes field by field, with one fast path: when its
///   `claim_id` field is a bare string the document is taken to be plain
///   already and returned without visiting the other fields. This is a
///   shortcut for the common already-normalised response, not a correctness
///   guarantee: a document with a plain `claim_id` but tagged other fields is
///   returned with those fields still tagged.
/// - Anything else is malformed.
pub fn decode_document(document: &Value) -> Result<ClaimRecord, ClaimError> {
    match document {
        Value::Null => Ok(ClaimRecord::default()),
        Value::Object(map) if !is_tagged_wrapper(document) && has_plain_job_id(map) => {
            Ok(ClaimRecord::new(map.clone()))
        }
        Value::Object(_) => match decode(document)? {
            Value::Object(map) => Ok(ClaimRecord::new(map)),
            Value::Null => Ok(ClaimRecord::default()),
            _ => Err(malformed("", "document does not decode to a mapping")),
        },
        _ => Err(malformed("", "document is not a mapping")),
    }
}

fn has_plain_job_id(map: &Map<String, Value>) -> bool {
    map.get(JOB_ID_KEY).is_some_and(Value::is_string)
}

fn decode_at(value: &Value, path: &str) -> Result<Value, ClaimError> {
    match value {
        Value::Object(map) => match single_entry(map) {
            Some((tag, payload)) if TAGS.contains(&tag) => decode_tagged(tag, payload, path),
            _ => decode_map(map, path),
        },
        Value::Array(items) => decode_list(items, path),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(value.clone()),
    }
}

fn single_entry(map: &Map<String, Value>) -> Option<(&str, &Value)> {
    if map.len() != 1 {
        return None;
    }
    map.iter().next().map(|(k, v)| (k.as_str(), v))
}

fn decode_tagged(tag: &str, payload: &Value, path: &str) -> Result<Value, ClaimError> {
    match (tag, payload) {
        ("S" | "B", Value::String(s)) => Ok(Value::String(s.clone())),
        ("N", _) => decode_number(payload, path),
        ("BOOL", Value::Bool(b)) => Ok(Value::Bool(*b)),
        ("NULL", Value::Bool(true)) => Ok(Value::Null),
        ("NULL", _) => Err(malformed(path, "NULL tag must carry `true`")),
        ("M", Value::Object(map)) => decode_map(map, path),
        ("L", Value::Array(items)) => decode_list(items, path),
        ("SS" | "BS", Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) => Ok(Value::String(s.clone())),
                _ => Err(malformed(
                    &child(path, &i.to_string()),
                    &format!("{tag} element must be a string"),
                )),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        ("NS", Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| decode_number(item, &child(path, &i.to_string())))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        _ => Err(malformed(
            path,
            &format!("{tag} tag cannot carry a {} payload", json_type(payload)),
        )),
    }
}

fn decode_map(map: &Map<String, Value>, path: &str) -> Result<Value, ClaimError> {
    let mut out = Map::with_capacity(map.len());
    for (key, value) in map {
        out.insert(key.clone(), decode_at(value, &child(path, key))?);
    }
    Ok(Value::Object(out))
}

fn decode_list(items: &[Value], path: &str) -> Result<Value, ClaimError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| decode_at(item, &child(path, &i.to_string())))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

/// Parses number text with Rust's locale-independent parsers. Integral text
/// stays integral; anything else must be a finite float.
fn decode_number(payload: &Value, path: &str) -> Result<Value, ClaimError> {
    let text = match payload {
        Value::Number(n) => return Ok(Value::Number(n.clone())),
        Value::String(s) => s.trim(),
        other => {
            return Err(malformed(
                path,
                &format!("N tag cannot carry a {} payload", json_type(other)),
            ))
        }
    };
    if let Ok(i) = text.parse::<i64>() {
        return Ok(Value::from(i));
    }
    if let Ok(u) = text.parse::<u64>() {
        return Ok(Value::from(u));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| malformed(path, &format!("'{text}' is not a finite decimal number")))
}

fn child(path: &str, segment: &str) -> String {
    format!("{path}/{segment}")
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn malformed(path: &str, reason: &str) -> ClaimError {
    let path = if path.is_empty() { "/" } else { path };
    ClaimError::DecodeMalformed {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[path = "decoder_tests.rs"]
mod tests;
