//! # JSON Codec
//!
//! The wire form of a bag is a single JSON object whose fields are the bag's
//! keys. Encoding goes through `serde::Serialize`, so bags can also be embedded
//! in other serde structs.
//!
//! ## Encoding
//!
//! - Object keys are written in sorted order, so equal bags encode identically.
//! - Integral floats below 1e15 in magnitude are written without a fraction
//!   (`5`, not `5.0`).
//! - `Time` is written as RFC 3339 text in UTC, `Duration` as integer
//!   nanoseconds.
//! - A null bag encodes exactly like an empty one: `{}`.
//! - Non-finite floats, durations that overflow i64 nanoseconds and `Opaque`
//!   values fail with [`BagError::Encode`].
//!
//! ## Decoding
//!
//! [`AttributeBag::decode_json`] only accepts a top-level object and replaces
//! the whole bag on success; on failure the bag is left untouched. Every JSON
//! number decodes to `Value::Float`.
//!
//! When a bag is deserialized as a field of some other struct, a JSON `null`
//! yields the null bag instead of an error.

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{self, Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::bag::AttributeBag;
use crate::error::{BagError, Result};
use crate::value::Value;

/// Largest magnitude written as an integer literal.
const INTEGRAL_LIMIT: f64 = 1e15;

impl AttributeBag {
    pub fn encode_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(BagError::Encode)
    }

    /// Replace the contents with the object in `data`.
    pub fn decode_json(&mut self, data: &[u8]) -> Result<()> {
        let entries: HashMap<String, Value> =
            serde_json::from_slice(data).map_err(BagError::Decode)?;
        tracing::trace!(entries = entries.len(), "decoded attribute bag");
        self.replace(Some(entries));
        Ok(())
    }

    pub fn from_json(data: &[u8]) -> Result<Self> {
        let mut bag = AttributeBag::new();
        bag.decode_json(data)?;
        Ok(bag)
    }
}

/// Best-effort JSON text; empty when the bag holds an unencodable value.
impl fmt::Display for AttributeBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(text) => f.write_str(&text),
            Err(_) => Ok(()),
        }
    }
}

impl Serialize for AttributeBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.entries() {
            Some(map) => serialize_sorted(map, serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }
}

fn serialize_sorted<V: Serialize, S: Serializer>(
    map: &HashMap<String, V>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let sorted: BTreeMap<&String, &V> = map.iter().collect();
    let mut out = serializer.serialize_map(Some(sorted.len()))?;
    for (key, value) in sorted {
        out.serialize_entry(key, value)?;
    }
    out.end()
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i32(*i),
            Value::Int64(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serialize_float(*f, serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Time(t) => serializer
                .serialize_str(&t.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)),
            Value::Duration(d) => match d.num_nanoseconds() {
                Some(nanos) => serializer.serialize_i64(nanos),
                None => Err(ser::Error::custom(format!(
                    "unsupported value: duration {d} overflows nanoseconds"
                ))),
            },
            Value::StringList(items) => items.serialize(serializer),
            Value::StringMap(map) => serialize_sorted(map, serializer),
            Value::StringListMap(map) => serialize_sorted(map, serializer),
            Value::Array(items) => items.serialize(serializer),
            Value::Object(map) => serialize_sorted(map, serializer),
            Value::Opaque(o) => Err(ser::Error::custom(format!(
                "unsupported type: {}",
                o.type_name()
            ))),
        }
    }
}

fn serialize_float<S: Serializer>(f: f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    if !f.is_finite() {
        return Err(ser::Error::custom(format!("unsupported value: {f}")));
    }
    if f.fract() == 0.0 && f.abs() < INTEGRAL_LIMIT {
        serializer.serialize_i64(f as i64)
    } else {
        serializer.serialize_f64(f)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::Float(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(Value::Float(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Value, D::Error> {
        Value::deserialize(d)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> std::result::Result<Value, A::Error> {
        read_map(map).map(Value::Object)
    }
}

fn read_map<'de, A: MapAccess<'de>>(
    mut map: A,
) -> std::result::Result<HashMap<String, Value>, A::Error> {
    let mut entries = HashMap::with_capacity(map.size_hint().unwrap_or(0));
    while let Some((key, value)) = map.next_entry::<String, Value>()? {
        entries.insert(key, value);
    }
    Ok(entries)
}

impl<'de> Deserialize<'de> for AttributeBag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(BagVisitor)
    }
}

struct BagVisitor;

impl<'de> Visitor<'de> for BagVisitor {
    type Value = AttributeBag;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object or null")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<AttributeBag, E> {
        Ok(AttributeBag::null())
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<AttributeBag, E> {
        Ok(AttributeBag::null())
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<AttributeBag, D::Error> {
        AttributeBag::deserialize(d)
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> std::result::Result<AttributeBag, A::Error> {
        read_map(map).map(AttributeBag::from)
    }
}
