use std::collections::HashMap;

use databag::{AttributeBag, BagError, ColumnCodec, DriverValue, ScanConfig, TextScan, Value};

/// Minimal stand-in for a table with one metadata column.
#[derive(Default)]
struct MemoryTable {
    rows: HashMap<u32, DriverValue>,
}

impl MemoryTable {
    fn insert<C: ColumnCodec>(&mut self, id: u32, column: &C) -> databag::Result<()> {
        self.rows.insert(id, column.value()?);
        Ok(())
    }

    fn insert_raw(&mut self, id: u32, raw: DriverValue) {
        self.rows.insert(id, raw);
    }

    fn load<C: ColumnCodec>(&self, id: u32, column: &mut C) -> databag::Result<()> {
        column.scan(self.rows.get(&id).unwrap_or(&DriverValue::Null))
    }
}

#[test]
fn bag_survives_a_trip_through_storage() {
    let mut table = MemoryTable::default();

    let mut meta = AttributeBag::new();
    meta.set("owner", "ops");
    meta.set("retries", 3i64);
    meta.set("paused", false);
    table.insert(1, &meta).unwrap();

    let mut loaded = AttributeBag::new();
    table.load(1, &mut loaded).unwrap();

    assert_eq!(loaded.get_string("owner"), "ops");
    assert!(!loaded.get_bool("paused"));
    assert_eq!(loaded.get("retries"), Some(&Value::Float(3.0)));
    assert_eq!(loaded.get_int64("retries"), 0);
}

#[test]
fn missing_row_scans_to_null_bag() {
    let table = MemoryTable::default();
    let mut loaded = AttributeBag::new();
    table.load(42, &mut loaded).unwrap();

    assert!(loaded.is_null());
    assert!(loaded.is_empty());
}

#[test]
fn null_bag_is_stored_as_empty_object() {
    let mut table = MemoryTable::default();
    table.insert(1, &AttributeBag::null()).unwrap();

    assert_eq!(table.rows[&1], DriverValue::Bytes(b"{}".to_vec()));

    let mut loaded = AttributeBag::null();
    table.load(1, &mut loaded).unwrap();
    assert!(!loaded.is_null());
    assert!(loaded.is_empty());
}

#[test]
fn unsupported_column_type_is_rejected() {
    let mut table = MemoryTable::default();
    table.insert_raw(1, DriverValue::Int64(7));

    let mut loaded = AttributeBag::new();
    let err = table.load(1, &mut loaded).unwrap_err();
    assert!(matches!(err, BagError::InvalidSource("int64")));
}

#[test]
fn text_columns_follow_configured_policy() {
    let raw = DriverValue::from(r#"{"region":"eu"}"#);

    let mut ignored = AttributeBag::new();
    ignored.scan_with(&raw, &ScanConfig::default()).unwrap();
    assert!(ignored.is_empty());

    let decode = ScanConfig {
        text_scan: TextScan::Decode,
        normalize_integers: false,
    };
    let mut decoded = AttributeBag::new();
    decoded.scan_with(&raw, &decode).unwrap();
    assert_eq!(decoded.get_string("region"), "eu");
}

#[test]
fn host_settings_embed_scan_config() {
    #[derive(serde::Deserialize)]
    struct HostSettings {
        metadata: ScanConfig,
    }

    let settings: HostSettings =
        serde_json::from_str(r#"{"metadata":{"normalize_integers":true}}"#).unwrap();
    assert_eq!(settings.metadata.text_scan, TextScan::Ignore);

    let mut bag = AttributeBag::new();
    bag.scan_with(
        &DriverValue::Bytes(br#"{"retries":3}"#.to_vec()),
        &settings.metadata,
    )
    .unwrap();

    assert_eq!(bag.get_int64("retries"), 3);
}

#[test]
fn stored_bytes_decode_to_an_equal_bag() {
    let mut table = MemoryTable::default();
    let source = AttributeBag::from_json(br#"{"a":1,"b":"x","c":true}"#).unwrap();
    table.insert(1, &source).unwrap();

    let mut loaded = AttributeBag::new();
    table.load(1, &mut loaded).unwrap();
    assert!(loaded.equals(&source));
}
