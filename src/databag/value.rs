//! Attribute value types.
//!
//! A bag holds whatever a JSON document can hold, plus a handful of native
//! shapes that only ever enter through [`crate::AttributeBag::set`]:
//! timestamps, durations, typed string collections and opaque native values.
//!
//! | Variant | Enters via | JSON form |
//! |---------|------------|-----------|
//! | `Null`, `Bool`, `String` | decode or `set` | as-is |
//! | `Float` | decode (every JSON number) or `set` | number |
//! | `Int`, `Int64` | `set` or [`Value::normalize_integers`] | number |
//! | `Time` | `set` | RFC 3339 text |
//! | `Duration` | `set` | integer nanoseconds |
//! | `StringList`, `StringMap`, `StringListMap` | `set` | array / object |
//! | `Array`, `Object` | decode or `set` | array / object |
//! | `Opaque` | `set` | not encodable |
//!
//! Decoding never produces the typed collection variants: a decoded array is
//! always an `Array`, so `get_string_slice` only sees lists that were set
//! programmatically.

use chrono::{DateTime, TimeDelta, Utc};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Runtime representation of an attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit JSON `null`.
    Null,

    Bool(bool),

    /// 32-bit integer, read only by `get_int`.
    ///
    /// Kept apart from `Int64` so the two widths never satisfy each other's
    /// accessor.
    Int(i32),

    /// 64-bit integer, read only by `get_int64`.
    Int64(i64),

    /// Every decoded JSON number lands here.
    Float(f64),

    String(String),

    /// Timestamp, encoded as RFC 3339 text.
    Time(DateTime<Utc>),

    /// Signed duration, encoded as integer nanoseconds.
    Duration(TimeDelta),

    /// Typed list of strings (e.g. tags). Never produced by decoding.
    StringList(Vec<String>),

    /// Typed string-to-string map (e.g. labels). Never produced by decoding.
    StringMap(HashMap<String, String>),

    /// Typed map of string lists (e.g. group members). Never produced by decoding.
    StringListMap(HashMap<String, Vec<String>>),

    /// Heterogeneous JSON array.
    Array(Vec<Value>),

    /// Nested JSON object, read by `get_string_map`.
    Object(HashMap<String, Value>),

    /// A native value with no JSON representation.
    ///
    /// Encoding a bag that holds one fails.
    Opaque(Opaque),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Int64(_) => "int64",
            Value::Float(_) => "float64",
            Value::String(_) => "string",
            Value::Time(_) => "time",
            Value::Duration(_) => "duration",
            Value::StringList(_) => "string list",
            Value::StringMap(_) => "string map",
            Value::StringListMap(_) => "string list map",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Opaque(_) => "opaque",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<TimeDelta> {
        match self {
            Value::Duration(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            Value::StringList(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_string_map(&self) -> Option<&HashMap<String, String>> {
        match self {
            Value::StringMap(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_string_list_map(&self) -> Option<&HashMap<String, Vec<String>>> {
        match self {
            Value::StringListMap(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&Opaque> {
        match self {
            Value::Opaque(o) => Some(o),
            _ => None,
        }
    }

    /// Rewrite integral floats as `Int64`, descending into arrays and objects.
    ///
    /// Decoded JSON numbers are always `Float`; this is the explicit pass that
    /// makes them visible to `get_int64`. Floats with a fractional part, or
    /// outside the i64 range, are left alone.
    pub fn normalize_integers(&mut self) {
        match self {
            Value::Float(f) => {
                if let Some(i) = integral(*f) {
                    *self = Value::Int64(i);
                }
            }
            Value::Array(items) => items.iter_mut().for_each(Value::normalize_integers),
            Value::Object(map) => map.values_mut().for_each(Value::normalize_integers),
            _ => {}
        }
    }

    /// Scalars compare by value; collections and opaque values only compare
    /// equal to themselves.
    pub(crate) fn shallow_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => a == b,
            (
                Value::StringList(_)
                | Value::StringMap(_)
                | Value::StringListMap(_)
                | Value::Array(_)
                | Value::Object(_),
                _,
            ) => std::ptr::eq(self, other),
            _ => false,
        }
    }
}

fn integral(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// A native value stored in a bag without a JSON form.
///
/// Clones share the underlying value; two opaque values are equal only when
/// they share it.
#[derive(Clone)]
pub struct Opaque {
    type_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            inner: Arc::new(value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.inner).downcast_ref::<T>()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({})", self.type_name)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v)
    }
}

impl From<TimeDelta> for Value {
    fn from(v: TimeDelta) -> Self {
        Value::Duration(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::StringList(v)
    }
}

impl From<HashMap<String, String>> for Value {
    fn from(v: HashMap<String, String>) -> Self {
        Value::StringMap(v)
    }
}

impl From<HashMap<String, Vec<String>>> for Value {
    fn from(v: HashMap<String, Vec<String>>) -> Self {
        Value::StringListMap(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(v: HashMap<String, Value>) -> Self {
        Value::Object(v)
    }
}

impl From<Opaque> for Value {
    fn from(v: Opaque) -> Self {
        Value::Opaque(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Same mapping the decoder applies: every number becomes `Float`.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Float),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}
