//! # Safe Serialization Module
//!
//! This module converts arbitrary [`FieldValue`] trees into JSON text
//! without ever failing. Values JSON cannot represent are rendered as
//! visible bracket markers instead of being dropped, and circular
//! structures terminate with a `"[Circular]"` marker instead of
//! recursing forever.
//!
//! ## Marker Precedence
//!
//! Rules apply per encountered value, in this order:
//!
//! 1. Already-visited identity → `"[Circular]"`
//! 2. Error record → `{name, message, stack, ...extras}`
//! 3. Function → `"[Function: <name|anonymous>]"`
//! 4. Undefined marker → `"[undefined]"`
//! 5. Big integer → `"[BigInt: <decimal>]"`
//! 6. Symbol → `"[Symbol: <description>]"`
//! 7. Structural recursion as standard JSON
//!
//! The visited set tracks cell identity (not structure) and persists for
//! the whole walk, so a value referenced twice renders as `"[Circular]"`
//! on its second appearance.
//!
//! These functions are directly callable utilities, independent of any
//! logger instance.

use crate::value::{ErrorRecord, FieldValue, Metadata};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Default sensitive-key substrings for [`redact_default`].
pub const DEFAULT_REDACT_KEYS: [&str; 5] = ["password", "token", "secret", "key", "auth"];

/// Placeholder emitted for values replaced by redaction.
pub const REDACTED_MARKER: &str = "[REDACTED]";

/// Placeholder emitted for revisited identities.
pub const CIRCULAR_MARKER: &str = "[Circular]";

/// Placeholder emitted when a value cannot be read at all (poisoned
/// lock, residual encoding failure).
const UNSERIALIZABLE_MARKER: &str = "[Unserializable]";

/// Serialize a value to JSON text. Total: never panics, never returns
/// invalid JSON.
///
/// `indent = Some(n)` pretty-prints with `n` spaces per level; `None`
/// produces compact single-line output.
pub fn serialize(value: &FieldValue, indent: Option<usize>) -> String {
    let json = to_json(value, &mut Vec::new());
    render(&json, indent)
}

/// Serialize a metadata map as a JSON object, with the same guarantees
/// as [`serialize`].
pub fn serialize_metadata(metadata: &Metadata, indent: Option<usize>) -> String {
    let json = metadata_to_json(metadata);
    render(&json, indent)
}

/// Rebuild a value with every sensitive field replaced by
/// [`REDACTED_MARKER`]. Key matching is case-insensitive and
/// substring-based. The input is never mutated; scalars pass through
/// unchanged, and null/undefined leaves are preserved even under a
/// matching key.
pub fn redact(value: &FieldValue, sensitive_keys: &[&str]) -> FieldValue {
    let patterns: Vec<String> = sensitive_keys
        .iter()
        .map(|k| k.to_ascii_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    redact_value(value, &patterns, &mut Vec::new())
}

/// [`redact`] with the [`DEFAULT_REDACT_KEYS`] substring set.
pub fn redact_default(value: &FieldValue) -> FieldValue {
    redact(value, &DEFAULT_REDACT_KEYS)
}

/// Convert an error value into a plain object with `name`, `message`,
/// `stack`, and any extra properties. Every other value is returned
/// unchanged (a handle clone for shared cells).
pub fn to_error_record(value: &FieldValue) -> FieldValue {
    match value {
        FieldValue::Error(record) => {
            let obj = FieldValue::object_empty();
            obj.insert("name", FieldValue::Str(record.name.clone()));
            obj.insert("message", FieldValue::Str(record.message.clone()));
            obj.insert(
                "stack",
                match &record.stack {
                    Some(stack) => FieldValue::Str(stack.clone()),
                    None => FieldValue::Null,
                },
            );
            for (key, extra) in &record.extra {
                obj.insert(key.clone(), extra.clone());
            }
            obj
        }
        other => other.clone(),
    }
}

/// Convert a value tree to a `serde_json::Value`, applying the marker
/// precedence rules. `seen` carries the identities visited so far in
/// this walk.
fn to_json(value: &FieldValue, seen: &mut Vec<usize>) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Undefined => Value::String("[undefined]".to_string()),
        FieldValue::Bool(b) => Value::Bool(*b),
        FieldValue::Int(n) => Value::Number((*n).into()),
        FieldValue::Float(f) => match serde_json::Number::from_f64(*f) {
            Some(n) => Value::Number(n),
            // NaN and infinities follow standard JSON encoding: null.
            None => Value::Null,
        },
        FieldValue::BigInt(n) => Value::String(format!("[BigInt: {}]", n)),
        FieldValue::Str(s) => Value::String(s.clone()),
        FieldValue::Symbol(desc) => Value::String(format!("[Symbol: {}]", desc)),
        FieldValue::Function(name) => Value::String(format!(
            "[Function: {}]",
            name.as_deref().unwrap_or("anonymous")
        )),
        FieldValue::Bytes(bytes) => Value::String(format!("[Buffer: {} bytes]", bytes.len())),
        FieldValue::Error(record) => {
            let identity = Arc::as_ptr(record) as usize;
            if seen.contains(&identity) {
                return Value::String(CIRCULAR_MARKER.to_string());
            }
            seen.push(identity);
            error_to_json(record, seen)
        }
        FieldValue::Array(cell) => {
            let identity = Arc::as_ptr(cell) as *const () as usize;
            if seen.contains(&identity) {
                return Value::String(CIRCULAR_MARKER.to_string());
            }
            seen.push(identity);
            match cell.read() {
                Ok(items) => Value::Array(items.iter().map(|item| to_json(item, seen)).collect()),
                Err(_) => Value::String(UNSERIALIZABLE_MARKER.to_string()),
            }
        }
        FieldValue::Object(cell) => {
            let identity = Arc::as_ptr(cell) as *const () as usize;
            if seen.contains(&identity) {
                return Value::String(CIRCULAR_MARKER.to_string());
            }
            seen.push(identity);
            match cell.read() {
                Ok(entries) => {
                    let mut map = serde_json::Map::with_capacity(entries.len());
                    for (key, entry) in entries.iter() {
                        map.insert(key.clone(), to_json(entry, seen));
                    }
                    Value::Object(map)
                }
                Err(_) => Value::String(UNSERIALIZABLE_MARKER.to_string()),
            }
        }
    }
}

fn error_to_json(record: &ErrorRecord, seen: &mut Vec<usize>) -> Value {
    let mut map = serde_json::Map::new();
    map.insert("name".to_string(), Value::String(record.name.clone()));
    map.insert("message".to_string(), Value::String(record.message.clone()));
    map.insert(
        "stack".to_string(),
        match &record.stack {
            Some(stack) => Value::String(stack.clone()),
            None => Value::Null,
        },
    );
    for (key, extra) in &record.extra {
        map.insert(key.clone(), to_json(extra, seen));
    }
    Value::Object(map)
}

/// Cycle-safe JSON view of a single value; backs the `Serialize` impl
/// on [`FieldValue`].
pub(crate) fn value_to_json(value: &FieldValue) -> Value {
    to_json(value, &mut Vec::new())
}

/// Metadata maps share the walk machinery so nested cells inside the
/// map still get cycle protection.
pub(crate) fn metadata_to_json(metadata: &Metadata) -> Value {
    let mut seen = Vec::new();
    let mut map = serde_json::Map::with_capacity(metadata.len());
    for (key, entry) in metadata {
        map.insert(key.clone(), to_json(entry, &mut seen));
    }
    Value::Object(map)
}

fn render(json: &Value, indent: Option<usize>) -> String {
    let result = match indent {
        None => serde_json::to_string(json),
        Some(width) => {
            let indent_unit = " ".repeat(width);
            let mut out = Vec::new();
            let formatter =
                serde_json::ser::PrettyFormatter::with_indent(indent_unit.as_bytes());
            let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
            json.serialize(&mut ser)
                .map(|_| String::from_utf8_lossy(&out).into_owned())
        }
    };
    result.unwrap_or_else(|_| format!("\"{}\"", UNSERIALIZABLE_MARKER))
}

fn is_sensitive(key: &str, patterns: &[String]) -> bool {
    let key = key.to_ascii_lowercase();
    patterns.iter().any(|pattern| key.contains(pattern))
}

fn redact_value(value: &FieldValue, patterns: &[String], seen: &mut Vec<usize>) -> FieldValue {
    match value {
        FieldValue::Array(cell) => {
            let identity = Arc::as_ptr(cell) as *const () as usize;
            if seen.contains(&identity) {
                return FieldValue::Str(CIRCULAR_MARKER.to_string());
            }
            seen.push(identity);
            match cell.read() {
                Ok(items) => FieldValue::array(
                    items
                        .iter()
                        .map(|item| redact_value(item, patterns, seen))
                        .collect::<Vec<_>>(),
                ),
                Err(_) => FieldValue::Str(UNSERIALIZABLE_MARKER.to_string()),
            }
        }
        FieldValue::Object(cell) => {
            let identity = Arc::as_ptr(cell) as *const () as usize;
            if seen.contains(&identity) {
                return FieldValue::Str(CIRCULAR_MARKER.to_string());
            }
            seen.push(identity);
            match cell.read() {
                Ok(entries) => {
                    let rebuilt = FieldValue::object_empty();
                    for (key, entry) in entries.iter() {
                        rebuilt.insert(key.clone(), redact_entry(key, entry, patterns, seen));
                    }
                    rebuilt
                }
                Err(_) => FieldValue::Str(UNSERIALIZABLE_MARKER.to_string()),
            }
        }
        FieldValue::Error(record) => {
            let mut rebuilt = ErrorRecord::new(record.name.clone(), record.message.clone());
            rebuilt.stack = record.stack.clone();
            for (key, extra) in &record.extra {
                rebuilt
                    .extra
                    .insert(key.clone(), redact_entry(key, extra, patterns, seen));
            }
            FieldValue::Error(Arc::new(rebuilt))
        }
        scalar => scalar.clone(),
    }
}

fn redact_entry(
    key: &str,
    value: &FieldValue,
    patterns: &[String],
    seen: &mut Vec<usize>,
) -> FieldValue {
    // Null and undefined leaves carry nothing worth hiding.
    let is_empty_leaf = matches!(value, FieldValue::Null | FieldValue::Undefined);
    if is_sensitive(key, patterns) && !is_empty_leaf {
        FieldValue::Str(REDACTED_MARKER.to_string())
    } else {
        redact_value(value, patterns, seen)
    }
}

/// Redact a metadata map with the same rules as [`redact`].
pub fn redact_metadata(metadata: &Metadata, sensitive_keys: &[&str]) -> Metadata {
    let patterns: Vec<String> = sensitive_keys
        .iter()
        .map(|k| k.to_ascii_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    let mut seen = Vec::new();
    metadata
        .iter()
        .map(|(key, entry)| {
            (
                key.clone(),
                redact_entry(key, entry, &patterns, &mut seen),
            )
        })
        .collect()
}
