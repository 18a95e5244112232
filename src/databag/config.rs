//! Scan behaviour for [`crate::AttributeBag::scan_with`].
//!
//! These are plain serde structs: a host application embeds [`ScanConfig`] in
//! its own configuration and hands it to the bag. Nothing here touches disk.

use serde::{Deserialize, Serialize};

/// What a text-typed column value does when scanned into a bag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextScan {
    /// Accept the value without touching the bag.
    #[default]
    Ignore,
    /// Decode the text as JSON, same as a byte payload.
    Decode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub text_scan: TextScan,

    /// Rewrite integral numbers as `Int64` after each successful decode.
    #[serde(default)]
    pub normalize_integers: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.text_scan, TextScan::Ignore);
        assert!(!config.normalize_integers);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = ScanConfig {
            text_scan: TextScan::Decode,
            normalize_integers: true,
        };

        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"text_scan":"decode","normalize_integers":true}"#);

        let parsed: ScanConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: ScanConfig = serde_json::from_str(r#"{"text_scan":"decode"}"#).unwrap();
        assert_eq!(config.text_scan, TextScan::Decode);
        assert!(!config.normalize_integers);

        let empty: ScanConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ScanConfig::default());
    }

    #[test]
    fn test_unknown_text_policy_is_rejected() {
        assert!(serde_json::from_str::<ScanConfig>(r#"{"text_scan":"maybe"}"#).is_err());
    }
}
