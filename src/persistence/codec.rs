//! The serialized form of [`PersistedStatus`].
//!
//! ```json
//! {"version": 1, "targets": {"sku-123": {"available": true, "status": "Found: buy"}}}
//! ```
//!
//! Decoding is lenient: unknown fields are ignored, missing fields default,
//! undecodable entries are dropped one by one, and the flat `{"<id>": bool}`
//! map written by the earlier script-based monitor is still understood.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::error::PersistError;
use crate::models::{ObservedState, PersistedStatus};

/// Current blob format version.
pub const FORMAT_VERSION: u64 = 1;

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Legacy(bool),
    Current(ObservedState),
}

impl From<StoredEntry> for ObservedState {
    fn from(entry: StoredEntry) -> Self {
        match entry {
            StoredEntry::Legacy(available) => ObservedState {
                available,
                status: "Imported from legacy status".to_string(),
                ..Default::default()
            },
            StoredEntry::Current(state) => state,
        }
    }
}

/// Serializes `status` to the versioned JSON blob.
pub fn encode(status: &PersistedStatus) -> Result<String, PersistError> {
    let mut targets = Map::new();
    for (id, state) in status {
        targets.insert(id.clone(), serde_json::to_value(state)?);
    }
    Ok(serde_json::to_string_pretty(&json!({ "version": FORMAT_VERSION, "targets": targets }))?)
}

/// Deserializes a blob, degrading to an empty or partial status on damage.
pub fn decode(raw: &str) -> PersistedStatus {
    let mut root = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(root)) => root,
        Ok(other) => {
            tracing::warn!(
                kind = json_kind(&other),
                "Persisted status is not an object; starting from an empty status."
            );
            return PersistedStatus::new();
        }
        Err(e) => {
            tracing::warn!(error = %e, "Persisted status is corrupt; starting from empty.");
            return PersistedStatus::new();
        }
    };

    let entries = match root.remove("targets") {
        Some(Value::Object(targets)) => {
            let version = root.get("version").and_then(Value::as_u64).unwrap_or(FORMAT_VERSION);
            if version > FORMAT_VERSION {
                tracing::warn!(
                    version,
                    supported = FORMAT_VERSION,
                    "Persisted status was written by a newer version; reading known fields only."
                );
            }
            targets
        }
        Some(_) => {
            tracing::warn!("Persisted status 'targets' is not a map; starting from an empty status.");
            return PersistedStatus::new();
        }
        None if root.contains_key("version") => {
            tracing::warn!("Persisted status has no 'targets' map; starting from an empty status.");
            return PersistedStatus::new();
        }
        None => {
            tracing::info!(entries = root.len(), "Importing legacy flat status map.");
            root
        }
    };

    entries
        .into_iter()
        .filter_map(|(id, value)| match serde_json::from_value::<StoredEntry>(value) {
            Ok(entry) => Some((id, ObservedState::from(entry))),
            Err(e) => {
                tracing::warn!(target_id = %id, error = %e, "Dropping undecodable status entry.");
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_encode_then_decode_preserves_entries() {
        let mut status = PersistedStatus::new();
        status.insert(
            "sku-123",
            ObservedState::new(true, Some(Decimal::new(1999, 2)), "Found: buy"),
        );
        status.insert("sku-456", ObservedState::new(false, None, "Element not found"));

        let decoded = decode(&encode(&status).unwrap());

        assert_eq!(decoded, status);
    }

    #[test]
    fn test_encoded_blob_is_versioned() {
        let mut status = PersistedStatus::new();
        status.insert("sku-123", ObservedState::new(false, None, ""));

        let value: Value = serde_json::from_str(&encode(&status).unwrap()).unwrap();

        assert_eq!(value["version"], 1);
        assert_eq!(value["targets"]["sku-123"]["available"], false);
        assert!(value["targets"]["sku-123"].get("price").is_none());
    }

    #[test]
    fn test_decode_corrupt_blob_is_empty() {
        assert!(decode("{not json").is_empty());
        assert!(decode("").is_empty());
        assert!(decode("[1, 2, 3]").is_empty());
        assert!(decode(r#"{"version": 1, "targets": 7}"#).is_empty());
    }

    #[test]
    fn test_decode_legacy_flat_map() {
        let status = decode(
            r#"{"PS5-https://shop.example.com/ps5": true, "Phone-https://x.example/": false}"#,
        );

        assert_eq!(status.len(), 2);
        assert!(status.get("PS5-https://shop.example.com/ps5").unwrap().available);
        assert!(!status.get("Phone-https://x.example/").unwrap().available);
    }

    #[test]
    fn test_decode_skips_bad_entries_and_unknown_fields() {
        let status = decode(
            r#"{
                "version": 1,
                "extra": "ignored",
                "targets": {
                    "good": {"available": true, "colour": "red"},
                    "bad": {"available": "maybe"},
                    "worse": 42
                }
            }"#,
        );

        assert_eq!(status.len(), 1);
        assert!(status.get("good").unwrap().available);
        assert!(status.get("bad").is_none());
    }

    #[test]
    fn test_decode_newer_version_reads_known_fields() {
        let status = decode(r#"{"version": 9, "targets": {"a": {"available": true}}}"#);
        assert!(status.get("a").unwrap().available);
    }
}
