//! # The Attribute Bag
//!
//! [`AttributeBag`] is an unordered map from string keys to [`Value`]s with two
//! distinct "nothing" states:
//!
//! - **null**: no backing map at all. This is what a `NULL` column scans into.
//!   Reads behave as if the bag were empty; writes are a programmer error.
//! - **empty**: an allocated map with zero entries.
//!
//! ## Typed Accessors
//!
//! The `get_*` family never fails. Absence, an explicit `Null` and a value of a
//! different variant all degrade to the zero value of the requested shape.
//! There is no coercion between variants: an `Int` is not an `Int64`, and a
//! decoded JSON number (always `Float`) is neither, until
//! [`AttributeBag::normalize_integers`] has been run.
//!
//! Callers that need to tell "missing" from "wrong type" use [`AttributeBag::get`]
//! and inspect the [`Value`] themselves.
//!
//! ## Equality
//!
//! [`AttributeBag::equals`] is shallow: scalars compare by value, nested
//! collections compare by identity, so two bags holding equal nested arrays
//! are not `equals`. Use [`AttributeBag::deep_equals`] when structure matters.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use std::collections::HashMap;

use crate::error::BagError;
use crate::value::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeBag {
    entries: Option<HashMap<String, Value>>,
}

/// The zero timestamp returned by `get_time`: 0001-01-01T00:00:00Z.
pub fn zero_time() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

impl AttributeBag {
    /// An allocated, empty bag.
    pub fn new() -> Self {
        Self {
            entries: Some(HashMap::new()),
        }
    }

    /// A bag with no backing storage.
    pub fn null() -> Self {
        Self { entries: None }
    }

    /// Insert or overwrite `key`.
    ///
    /// # Panics
    ///
    /// Panics if the bag is null. Allocate it with [`AttributeBag::new`] first.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        match self.entries.as_mut() {
            Some(map) => {
                map.insert(key.into(), value.into());
            }
            None => panic!("assignment to entry in a null attribute bag"),
        }
    }

    /// The stored value, or `None` when the key is absent.
    ///
    /// A key stored with an explicit null comes back as `Some(&Value::Null)`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.as_ref().and_then(|map| map.get(key))
    }

    /// Like [`AttributeBag::get`], for keys whose absence is a bug.
    ///
    /// # Panics
    ///
    /// Panics with a message naming the key when it is absent.
    pub fn must_get(&self, key: &str) -> &Value {
        match self.get(key) {
            Some(value) => value,
            None => panic!("{}", BagError::MissingKey(key.to_string())),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.as_mut().and_then(|map| map.remove(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, HashMap::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter().flat_map(|map| map.iter())
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.iter().map(|(k, _)| k)
    }

    pub fn is_null(&self) -> bool {
        self.entries.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run [`Value::normalize_integers`] over every entry.
    pub fn normalize_integers(&mut self) {
        if let Some(map) = self.entries.as_mut() {
            map.values_mut().for_each(Value::normalize_integers);
        }
    }

    /// Shallow comparison: same size, same keys, and values equal by
    /// [`Value`] identity rules for collections.
    ///
    /// A key present on one side only makes the bags unequal, even when the
    /// sizes match.
    pub fn equals(&self, other: &AttributeBag) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|(key, value)| {
            other
                .get(key)
                .is_some_and(|theirs| value.shallow_eq(theirs))
        })
    }

    /// Structural comparison, recursing into nested collections.
    ///
    /// Null and empty bags are deep-equal; float `NaN` never is.
    pub fn deep_equals(&self, other: &AttributeBag) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }

    pub(crate) fn replace(&mut self, entries: Option<HashMap<String, Value>>) {
        self.entries = entries;
    }

    pub(crate) fn entries(&self) -> Option<&HashMap<String, Value>> {
        self.entries.as_ref()
    }

    /// Looks up `key` and projects it, treating absence as `None`.
    fn lookup<'a, T>(
        &'a self,
        key: &str,
        project: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Option<T> {
        self.get(key).and_then(project)
    }

    pub fn get_string(&self, key: &str) -> String {
        self.lookup(key, Value::as_str)
            .map(str::to_string)
            .unwrap_or_default()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.lookup(key, Value::as_bool).unwrap_or_default()
    }

    pub fn get_int(&self, key: &str) -> i32 {
        self.lookup(key, Value::as_int).unwrap_or_default()
    }

    pub fn get_int64(&self, key: &str) -> i64 {
        self.lookup(key, Value::as_int64).unwrap_or_default()
    }

    pub fn get_float64(&self, key: &str) -> f64 {
        self.lookup(key, Value::as_float64).unwrap_or_default()
    }

    /// Zero value is [`zero_time`], not the Unix epoch.
    pub fn get_time(&self, key: &str) -> DateTime<Utc> {
        self.lookup(key, Value::as_time).unwrap_or_else(zero_time)
    }

    pub fn get_duration(&self, key: &str) -> TimeDelta {
        self.lookup(key, Value::as_duration)
            .unwrap_or_else(TimeDelta::zero)
    }

    pub fn get_string_slice(&self, key: &str) -> Vec<String> {
        self.lookup(key, Value::as_string_list)
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }

    pub fn get_string_map(&self, key: &str) -> HashMap<String, Value> {
        self.lookup(key, Value::as_object)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_string_map_string(&self, key: &str) -> HashMap<String, String> {
        self.lookup(key, Value::as_string_map)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_string_map_string_slice(&self, key: &str) -> HashMap<String, Vec<String>> {
        self.lookup(key, Value::as_string_list_map)
            .cloned()
            .unwrap_or_default()
    }
}

impl From<HashMap<String, Value>> for AttributeBag {
    fn from(entries: HashMap<String, Value>) -> Self {
        Self {
            entries: Some(entries),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for AttributeBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<HashMap<_, _>>()
            .into()
    }
}
