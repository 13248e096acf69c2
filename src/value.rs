//! # Metadata Value Module
//!
//! This module defines the value tree carried as structured metadata on
//! log records. Unlike a plain JSON tree it can represent every shape
//! the safe serializer must survive: absent/undefined markers, big
//! integers, symbols, functions-as-values, raw byte buffers, error
//! records, and — because arrays and objects are identity-shared
//! handles — circular structures.
//!
//! ## Sharing Semantics
//!
//! `Array` and `Object` variants hold `Arc`-shared cells. Cloning a
//! `FieldValue` clones the handle, not the contents, which is exactly
//! what makes a cycle constructible:
//!
//! ```
//! use omnilog::value::FieldValue;
//!
//! let node = FieldValue::object_empty();
//! node.insert("me", node.clone()); // node now references itself
//! ```
//!
//! The serializer detects revisits by cell pointer identity and renders
//! them as the `"[Circular]"` marker.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Structured metadata attached to a log record or logger instance.
pub type Metadata = BTreeMap<String, FieldValue>;

/// A single metadata value.
#[derive(Clone)]
pub enum FieldValue {
    /// JSON null
    Null,
    /// Explicit absent-value marker, preserved in output as `"[undefined]"`
    Undefined,
    /// Boolean
    Bool(bool),
    /// Signed 64-bit integer
    Int(i64),
    /// Double-precision float; non-finite values encode as JSON null
    Float(f64),
    /// Arbitrary-precision-style integer, rendered as `"[BigInt: <n>]"`
    BigInt(i128),
    /// UTF-8 string
    Str(String),
    /// Unique-symbol description, rendered as `"[Symbol: <desc>]"`
    Symbol(String),
    /// Function-as-value with optional name
    Function(Option<String>),
    /// Raw byte buffer, rendered as a bounded placeholder
    Bytes(Vec<u8>),
    /// Captured error record
    Error(Arc<ErrorRecord>),
    /// Identity-shared array cell
    Array(Arc<RwLock<Vec<FieldValue>>>),
    /// Identity-shared object cell with deterministic key order
    Object(Arc<RwLock<Metadata>>),
}

impl FieldValue {
    /// New shared array cell owning the given elements.
    pub fn array<I>(items: I) -> Self
    where
        I: IntoIterator<Item = FieldValue>,
    {
        FieldValue::Array(Arc::new(RwLock::new(items.into_iter().collect())))
    }

    /// New empty shared array cell.
    pub fn array_empty() -> Self {
        FieldValue::array(std::iter::empty())
    }

    /// New shared object cell owning the given entries.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, FieldValue)>,
    {
        FieldValue::Object(Arc::new(RwLock::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    /// New empty shared object cell.
    pub fn object_empty() -> Self {
        FieldValue::object(std::iter::empty::<(String, FieldValue)>())
    }

    /// Capture an error (and its source chain) as a value.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        FieldValue::Error(Arc::new(ErrorRecord::from_error(err)))
    }

    /// Append an element when this value is an array cell; no-op for
    /// every other variant. Used to build shared and cyclic structures.
    pub fn push(&self, value: FieldValue) {
        if let FieldValue::Array(cell) = self {
            if let Ok(mut items) = cell.write() {
                items.push(value);
            }
        }
    }

    /// Insert an entry when this value is an object cell; no-op for
    /// every other variant.
    pub fn insert(&self, key: impl Into<String>, value: FieldValue) {
        if let FieldValue::Object(cell) = self {
            if let Ok(mut entries) = cell.write() {
                entries.insert(key.into(), value);
            }
        }
    }

    /// Variant name for diagnostics.
    fn variant(&self) -> &'static str {
        match self {
            FieldValue::Null => "Null",
            FieldValue::Undefined => "Undefined",
            FieldValue::Bool(_) => "Bool",
            FieldValue::Int(_) => "Int",
            FieldValue::Float(_) => "Float",
            FieldValue::BigInt(_) => "BigInt",
            FieldValue::Str(_) => "Str",
            FieldValue::Symbol(_) => "Symbol",
            FieldValue::Function(_) => "Function",
            FieldValue::Bytes(_) => "Bytes",
            FieldValue::Error(_) => "Error",
            FieldValue::Array(_) => "Array",
            FieldValue::Object(_) => "Object",
        }
    }
}

// Shallow by intent: a recursive Debug would never terminate on the
// cyclic structures this type exists to represent.
impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(v) => write!(f, "Bool({})", v),
            FieldValue::Int(v) => write!(f, "Int({})", v),
            FieldValue::Float(v) => write!(f, "Float({})", v),
            FieldValue::BigInt(v) => write!(f, "BigInt({})", v),
            FieldValue::Str(v) => write!(f, "Str({:?})", v),
            FieldValue::Symbol(v) => write!(f, "Symbol({:?})", v),
            FieldValue::Function(v) => write!(f, "Function({:?})", v),
            FieldValue::Bytes(v) => write!(f, "Bytes(len={})", v.len()),
            other => f.write_str(other.variant()),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        // Values beyond i64 range promote to the big-integer variant.
        match i64::try_from(v) {
            Ok(n) => FieldValue::Int(n),
            Err(_) => FieldValue::BigInt(v as i128),
        }
    }
}

impl From<i128> for FieldValue {
    fn from(v: i128) -> Self {
        FieldValue::BigInt(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float(v as f64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Str(v)
    }
}

impl From<&[u8]> for FieldValue {
    fn from(v: &[u8]) -> Self {
        FieldValue::Bytes(v.to_vec())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => FieldValue::Null,
        }
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    FieldValue::from(u)
                } else {
                    FieldValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => FieldValue::Str(s),
            serde_json::Value::Array(items) => {
                FieldValue::array(items.into_iter().map(FieldValue::from))
            }
            serde_json::Value::Object(entries) => FieldValue::object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, FieldValue::from(v))),
            ),
        }
    }
}

// Equality compares the safe serializer's JSON view, so it terminates on
// cyclic values and treats non-finite floats per the non-finite→null rule.
impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        crate::serializer::value_to_json(self) == crate::serializer::value_to_json(other)
    }
}

// Serialization goes through the safe serializer's JSON view, so even a
// cyclic value embedded in a config map cannot hang encoding.
impl serde::Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        crate::serializer::value_to_json(self).serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(FieldValue::from)
    }
}

/// Captured error shape: name, message, optional stack-like context,
/// and any extra structured properties.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    /// Error class name
    pub name: String,
    /// Human-readable message
    pub message: String,
    /// Source-chain rendering, when one exists
    pub stack: Option<String>,
    /// Additional structured properties beyond the three above
    pub extra: Metadata,
}

impl ErrorRecord {
    /// Build a record with the given name and message.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorRecord {
            name: name.into(),
            message: message.into(),
            stack: None,
            extra: Metadata::new(),
        }
    }

    /// Capture a standard error, rendering its source chain as the
    /// stack field (one `caused by:` line per link).
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut stack = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            stack.push(format!("caused by: {}", cause));
            source = cause.source();
        }
        ErrorRecord {
            name: "Error".to_string(),
            message: err.to_string(),
            stack: if stack.is_empty() {
                None
            } else {
                Some(stack.join("\n"))
            },
            extra: Metadata::new(),
        }
    }

    /// Attach an extra structured property.
    pub fn with_extra(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Build a [`Metadata`] map from literal key/value pairs.
///
/// ```
/// use omnilog::metadata;
///
/// let meta = metadata! {
///     "device" => "mic-1",
///     "attempt" => 3,
/// };
/// assert_eq!(meta.len(), 2);
/// ```
#[macro_export]
macro_rules! metadata {
    () => {
        $crate::value::Metadata::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::value::Metadata::new();
        $(
            map.insert(($key).to_string(), $crate::value::FieldValue::from($value));
        )+
        map
    }};
}
