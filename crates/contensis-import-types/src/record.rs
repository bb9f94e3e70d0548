//! Record and field path types
//!
//! Records are opaque JSON documents (entries, tags, tag groups, nodes).
//! A `FieldPath` addresses a value nested inside a record using dotted
//! segments, e.g. `sys.contentTypeId` or `sys.properties.filePath`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::str::FromStr;

/// A structured content item exchanged with the CMS
pub type Record = Value;

/// Conventional location of the content type discriminator
pub const CONTENT_TYPE_FIELD: &str = "sys.contentTypeId";

/// Conventional location of the record identifier
pub const ID_FIELD: &str = "sys.id";

/// Dotted path into a nested record
///
/// Segments are separated by `.`; array elements are addressed with a
/// numeric segment (`items.0.id`) or bracket index (`items[0].id`).
/// The path `$` (or an empty path) refers to the record itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let body = trimmed
            .strip_prefix("$.")
            .unwrap_or(if trimmed == "$" { "" } else { trimmed });

        let mut segments = Vec::new();
        for part in body.split('.').filter(|p| !p.is_empty()) {
            // "items[0][1]" -> "items", "0", "1"
            let mut rest = part;
            if let Some(open) = rest.find('[') {
                if open > 0 {
                    segments.push(rest[..open].to_string());
                }
                rest = &rest[open..];
                while let Some(stripped) = rest.strip_prefix('[') {
                    match stripped.find(']') {
                        Some(close) => {
                            segments.push(stripped[..close].to_string());
                            rest = &stripped[close + 1..];
                        }
                        None => {
                            segments.push(stripped.to_string());
                            rest = "";
                        }
                    }
                }
                if !rest.is_empty() {
                    segments.push(rest.to_string());
                }
            } else {
                segments.push(rest.to_string());
            }
        }

        Self {
            raw: trimmed.to_string(),
            segments,
        }
    }

    /// Path to the content type discriminator (`sys.contentTypeId`)
    pub fn content_type() -> Self {
        Self::parse(CONTENT_TYPE_FIELD)
    }

    /// The path as it was written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this path addresses the record itself
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Read the value at this path, `None` when any segment is missing
    pub fn resolve<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        let mut current = value;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Read the value at this path as a string slice
    pub fn resolve_str<'a>(&self, value: &'a Value) -> Option<&'a str> {
        self.resolve(value).and_then(Value::as_str)
    }
}

impl Default for FieldPath {
    fn default() -> Self {
        Self::content_type()
    }
}

impl FromStr for FieldPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for FieldPath {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// `sys.contentTypeId` of a record, if present
pub fn content_type_id(record: &Value) -> Option<&str> {
    record.get("sys")?.get("contentTypeId")?.as_str()
}

/// `sys.id` of a record, if present
pub fn record_id(record: &Value) -> Option<&str> {
    record.get("sys")?.get("id")?.as_str()
}
