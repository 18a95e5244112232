//! # Storage Driver Bridge
//!
//! A bag persists as one column. [`DriverValue`] is the tagged union a
//! database driver hands to (and accepts from) column types, and
//! [`ColumnCodec`] is the seam a driver integration calls into.
//!
//! ## Inbound (`scan`)
//!
//! | Column value | Result |
//! |--------------|--------|
//! | `Null` | bag becomes null |
//! | `Bytes` | decoded as a JSON object, replacing the contents |
//! | `Text` | ignored by default, see [`TextScan`] |
//! | anything else | [`BagError::InvalidSource`] |
//!
//! ## Outbound (`value`)
//!
//! Always `Bytes` holding the JSON encoding. A null bag is written as `{}`,
//! never as a SQL `NULL`.

use chrono::{DateTime, Utc};

use crate::bag::AttributeBag;
use crate::config::{ScanConfig, TextScan};
use crate::error::{BagError, Result};

/// A value as exchanged with a storage driver.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverValue {
    Null,
    Bytes(Vec<u8>),
    Text(String),
    Int64(i64),
    Float64(f64),
    Bool(bool),
    Time(DateTime<Utc>),
}

impl DriverValue {
    pub fn kind(&self) -> &'static str {
        match self {
            DriverValue::Null => "null",
            DriverValue::Bytes(_) => "bytes",
            DriverValue::Text(_) => "text",
            DriverValue::Int64(_) => "int64",
            DriverValue::Float64(_) => "float64",
            DriverValue::Bool(_) => "bool",
            DriverValue::Time(_) => "time",
        }
    }
}

impl From<Vec<u8>> for DriverValue {
    fn from(v: Vec<u8>) -> Self {
        DriverValue::Bytes(v)
    }
}

impl From<&[u8]> for DriverValue {
    fn from(v: &[u8]) -> Self {
        DriverValue::Bytes(v.to_vec())
    }
}

impl From<String> for DriverValue {
    fn from(v: String) -> Self {
        DriverValue::Text(v)
    }
}

impl From<&str> for DriverValue {
    fn from(v: &str) -> Self {
        DriverValue::Text(v.to_string())
    }
}

impl From<i64> for DriverValue {
    fn from(v: i64) -> Self {
        DriverValue::Int64(v)
    }
}

impl From<f64> for DriverValue {
    fn from(v: f64) -> Self {
        DriverValue::Float64(v)
    }
}

impl From<bool> for DriverValue {
    fn from(v: bool) -> Self {
        DriverValue::Bool(v)
    }
}

impl From<DateTime<Utc>> for DriverValue {
    fn from(v: DateTime<Utc>) -> Self {
        DriverValue::Time(v)
    }
}

impl<T: Into<DriverValue>> From<Option<T>> for DriverValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(DriverValue::Null, Into::into)
    }
}

/// Conversion between a column type and driver values.
pub trait ColumnCodec {
    /// Populate `self` from a value read out of storage.
    fn scan(&mut self, raw: &DriverValue) -> Result<()>;

    /// The value to write into storage.
    fn value(&self) -> Result<DriverValue>;
}

impl ColumnCodec for AttributeBag {
    fn scan(&mut self, raw: &DriverValue) -> Result<()> {
        self.scan_with(raw, &ScanConfig::default())
    }

    fn value(&self) -> Result<DriverValue> {
        Ok(DriverValue::Bytes(self.encode_json()?))
    }
}

impl AttributeBag {
    pub fn scan_with(&mut self, raw: &DriverValue, config: &ScanConfig) -> Result<()> {
        match raw {
            DriverValue::Null => {
                tracing::debug!("scanned null column into attribute bag");
                self.replace(None);
                return Ok(());
            }
            DriverValue::Bytes(data) => self.decode_json(data)?,
            DriverValue::Text(text) => match config.text_scan {
                TextScan::Decode => self.decode_json(text.as_bytes())?,
                TextScan::Ignore => {
                    tracing::debug!(len = text.len(), "ignoring text column for attribute bag");
                    return Ok(());
                }
            },
            other => return Err(BagError::InvalidSource(other.kind())),
        }

        if config.normalize_integers {
            self.normalize_integers();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn populated() -> AttributeBag {
        let mut bag = AttributeBag::new();
        bag.set("keep", "me");
        bag
    }

    #[test]
    fn scan_null_makes_bag_null() {
        let mut bag = populated();
        bag.scan(&DriverValue::Null).unwrap();
        assert!(bag.is_null());
        assert!(bag.is_empty());
    }

    #[test]
    fn scan_bytes_decodes_json() {
        let mut bag = AttributeBag::null();
        bag.scan(&DriverValue::from(&br#"{"x":5}"#[..])).unwrap();

        assert!(!bag.is_null());
        assert_eq!(bag.get("x"), Some(&Value::Float(5.0)));
    }

    #[test]
    fn scan_bytes_then_value_round_trips() {
        let mut bag = AttributeBag::new();
        bag.scan(&DriverValue::Bytes(br#"{"x":5}"#.to_vec())).unwrap();

        assert_eq!(bag.value().unwrap(), DriverValue::Bytes(br#"{"x":5}"#.to_vec()));
    }

    #[test]
    fn scan_propagates_decode_errors() {
        let mut bag = populated();
        let err = bag.scan(&DriverValue::Bytes(b"[1,2,3]".to_vec())).unwrap_err();

        assert!(matches!(err, BagError::Decode(_)));
        assert_eq!(bag.get_string("keep"), "me");
    }

    #[test]
    fn scan_text_is_ignored_by_default() {
        let mut bag = populated();
        bag.scan(&DriverValue::from(r#"{"x":5}"#)).unwrap();

        assert_eq!(bag.len(), 1);
        assert_eq!(bag.get_string("keep"), "me");

        let mut null = AttributeBag::null();
        null.scan(&DriverValue::from("{}")).unwrap();
        assert!(null.is_null());
    }

    #[test]
    fn scan_text_decodes_when_configured() {
        let config = ScanConfig {
            text_scan: TextScan::Decode,
            ..ScanConfig::default()
        };
        let mut bag = populated();
        bag.scan_with(&DriverValue::from(r#"{"x":5}"#), &config).unwrap();

        assert!(!bag.contains_key("keep"));
        assert_eq!(bag.get_float64("x"), 5.0);
    }

    #[test]
    fn scan_rejects_other_representations() {
        let sources = [
            DriverValue::Int64(1),
            DriverValue::Float64(1.5),
            DriverValue::Bool(true),
            DriverValue::Time(Utc::now()),
        ];
        for raw in sources {
            let mut bag = populated();
            match bag.scan(&raw) {
                Err(BagError::InvalidSource(kind)) => assert_eq!(kind, raw.kind()),
                other => panic!("expected InvalidSource for {raw:?}, got {other:?}"),
            }
            assert_eq!(bag.get_string("keep"), "me");
        }
    }

    #[test]
    fn scan_normalizes_integers_when_configured() {
        let config = ScanConfig {
            normalize_integers: true,
            ..ScanConfig::default()
        };
        let mut bag = AttributeBag::new();
        bag.scan_with(&DriverValue::from(&br#"{"n":12,"f":1.5}"#[..]), &config)
            .unwrap();

        assert_eq!(bag.get_int64("n"), 12);
        assert_eq!(bag.get_float64("f"), 1.5);
    }

    #[test]
    fn value_of_null_bag_is_empty_object() {
        assert_eq!(
            AttributeBag::null().value().unwrap(),
            DriverValue::Bytes(b"{}".to_vec())
        );
    }

    #[test]
    fn value_propagates_encode_errors() {
        let mut bag = AttributeBag::new();
        bag.set("bad", f64::NAN);
        assert!(matches!(bag.value(), Err(BagError::Encode(_))));
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(DriverValue::from(None::<i64>), DriverValue::Null);
        assert_eq!(DriverValue::from(Some(true)), DriverValue::Bool(true));
    }
}
