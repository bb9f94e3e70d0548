//! Helpers commonly used inside mappers

use chrono::{DateTime, Duration, Utc};
use contensis_import_types::{content_type_id, record_id, Record};
use serde_json::{Map, Value};
use std::collections::HashSet;
use uuid::Uuid;

/// Shift `date` forward (or back, for negative values) by `minutes`
pub fn add_minutes(date: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    date + Duration::minutes(minutes)
}

/// Records whose `sys.contentTypeId` is one of `content_type_ids`
pub fn get_entries_by_content_types(entries: &[Record], content_type_ids: &[&str]) -> Vec<Record> {
    entries
        .iter()
        .filter(|entry| {
            content_type_id(entry)
                .map(|id| content_type_ids.contains(&id))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

fn remove_key_deep(value: &mut Value, key: &str) {
    match value {
        Value::Object(map) => {
            map.remove(key);
            map.values_mut().for_each(|v| remove_key_deep(v, key));
        }
        Value::Array(items) => items.iter_mut().for_each(|v| remove_key_deep(v, key)),
        _ => {}
    }
}

/// Copy of `entry` retyped as `new_content_type_id`
///
/// Every `contentTypeId` key is removed throughout the record (including
/// those of embedded component and linked entry stubs) before
/// `sys.contentTypeId` is set, and `sys.slug` is dropped so the target
/// generates a fresh one.
pub fn replace_content_type_id(entry: &Record, new_content_type_id: &str) -> Record {
    let mut cleaned = entry.clone();
    remove_key_deep(&mut cleaned, "contentTypeId");

    if !cleaned.is_object() {
        cleaned = Value::Object(Map::new());
    }
    if !cleaned["sys"].is_object() {
        cleaned["sys"] = Value::Object(Map::new());
    }
    if let Some(sys) = cleaned["sys"].as_object_mut() {
        sys.insert(
            "contentTypeId".to_string(),
            Value::String(new_content_type_id.to_string()),
        );
        sys.remove("slug");
    }
    cleaned
}

/// Stable GUID derived from `seed`; the same seed always yields the same GUID
pub fn deterministic_guid(seed: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes()).to_string()
}

/// Copy of an asset entry prepared for loading into another project
///
/// With `transform_guid`, `sys.id` and `sys.properties.fileId` are re-seeded
/// from `image-{sys.id}` since the original ids may already be in use.
/// When the asset has a file path it is replaced by `path` (if given) and
/// `sys.uri` is rebuilt from the original path and filename; otherwise both
/// are removed.
pub fn generate_new_asset(asset: &Record, path: Option<&str>, transform_guid: bool) -> Record {
    let original_id = record_id(asset).unwrap_or_default().to_string();
    let new_id = deterministic_guid(&format!("image-{}", original_id));

    let mut new_asset = asset.clone();
    if !new_asset.is_object() {
        new_asset = Value::Object(Map::new());
    }

    let mut sys = asset
        .get("sys")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let mut properties = sys
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let original_file_path = properties
        .get("filePath")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .map(str::to_string);
    let filename = properties
        .get("filename")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if transform_guid {
        sys.insert("id".to_string(), Value::String(new_id.clone()));
        properties.insert("fileId".to_string(), Value::String(new_id));
    }

    match &original_file_path {
        Some(existing) => {
            let file_path = path.unwrap_or(existing.as_str());
            properties.insert("filePath".to_string(), Value::String(file_path.to_string()));
            sys.insert(
                "uri".to_string(),
                Value::String(format!("{}{}", existing, filename)),
            );
        }
        None => {
            properties.remove("filePath");
            sys.remove("uri");
        }
    }

    sys.insert("properties".to_string(), Value::Object(properties));
    new_asset["sys"] = Value::Object(sys);
    new_asset
}

/// Drop structurally identical records, keeping the first of each
pub fn dedupe(records: &[Record]) -> Vec<Record> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| seen.insert(record.to_string()))
        .cloned()
        .collect()
}
