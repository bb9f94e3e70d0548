//! Migration request types
//!
//! `MigrateRequest` is the single configuration object a migration service is
//! constructed with. The import facade assembles one per call.

use crate::connection::{SourceCms, TargetCms};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Verbosity of the migration service's own log output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warning,
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = crate::ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            _ => Err(crate::ImportError::InvalidConfiguration(format!(
                "Unknown log level: {}",
                s
            ))),
        }
    }
}

/// Delivery/management API query used to select source records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Restrict to these content type ids
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content_type_ids: Vec<String>,
    /// Restrict to these language codes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    /// `latest` or `published`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_status: Option<String>,
    /// Return only these fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_deleted: Option<bool>,
    /// Query options not modelled above, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Query {
    /// Query restricted to a single language
    pub fn for_language(language: impl Into<String>) -> Self {
        Self {
            languages: vec![language.into()],
            ..Default::default()
        }
    }

    /// First language in the query, if any
    pub fn primary_language(&self) -> Option<&str> {
        self.languages.first().map(String::as_str)
    }
}

/// Progress hook handed to the migration service
///
/// The service calls it with its own progress payload as work proceeds.
/// Two callbacks are equal only when they share the same closure.
#[derive(Clone)]
pub struct ProgressCallback(Arc<dyn Fn(&Value) + Send + Sync>);

impl ProgressCallback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Report `progress` to the caller
    pub fn call(&self, progress: &Value) {
        (self.0)(progress)
    }
}

impl std::fmt::Debug for ProgressCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ProgressCallback")
    }
}

impl PartialEq for ProgressCallback {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Complete configuration a migration service is constructed with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrateRequest {
    /// CMS and project to read from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceCms>,
    /// CMS and projects to write to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetCms>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,
    /// Raw zenQL query, takes precedence over `query` in the service
    #[serde(default, rename = "zenQL", skip_serializing_if = "Option::is_none")]
    pub zen_ql: Option<String>,
    /// Content type / component ids to fetch or migrate
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content_types: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_groups: Vec<Value>,
    /// Parallel request hint for the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
    /// Ask the service to regenerate record ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform_guids: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_logs: Option<LogLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_progress: Option<bool>,
    /// Progress hook, never serialized
    #[serde(skip)]
    pub callback: Option<ProgressCallback>,
    /// Service options not modelled above, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MigrateRequest {
    /// Name of the source project, empty when no source is set
    pub fn source_project(&self) -> &str {
        self.source.as_ref().map(|s| s.project.as_str()).unwrap_or("")
    }

    /// Target projects, empty when no target is set
    pub fn target_projects(&self) -> &[String] {
        self.target
            .as_ref()
            .map(|t| t.target_projects.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::CmsConnection;
    use serde_json::json;

    #[test]
    fn test_log_level_parse() {
        assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert!("verbose".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::default(), LogLevel::Warning);
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = MigrateRequest {
            target: Some(TargetCms::new(
                CmsConnection::new("https://cms/"),
                vec!["website".to_string()],
            )),
            zen_ql: Some("sys.contentTypeId = post".to_string()),
            tag_groups: vec![json!({ "id": "topics" })],
            transform_guids: Some(true),
            output_logs: Some(LogLevel::Info),
            ..Default::default()
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["target"]["targetProjects"], json!(["website"]));
        assert_eq!(value["zenQL"], json!("sys.contentTypeId = post"));
        assert_eq!(value["tagGroups"], json!([{ "id": "topics" }]));
        assert_eq!(value["transformGuids"], json!(true));
        assert_eq!(value["outputLogs"], json!("info"));
        assert!(value.get("entries").is_none());
    }

    #[test]
    fn test_query_keeps_unknown_options() {
        let query: Query = serde_json::from_value(json!({
            "languages": ["en-GB", "fr-FR"],
            "pageSize": 50,
            "dataFormats": ["entry"]
        }))
        .unwrap();

        assert_eq!(query.primary_language(), Some("en-GB"));
        assert_eq!(query.page_size, Some(50));
        assert_eq!(query.extra["dataFormats"], json!(["entry"]));
    }

    #[test]
    fn test_project_accessors() {
        let request = MigrateRequest::default();
        assert_eq!(request.source_project(), "");
        assert!(request.target_projects().is_empty());
    }

    #[test]
    fn test_callback_is_not_serialized() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback = ProgressCallback::new(move |progress| {
            sink.lock().unwrap().push(progress.clone());
        });

        let request = MigrateRequest {
            callback: Some(callback.clone()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&request).unwrap(), json!({}));
        assert_eq!(request.callback, Some(callback.clone()));
        assert_ne!(Some(ProgressCallback::new(|_| {})), request.callback);

        callback.call(&json!({ "processed": 1 }));
        assert_eq!(*seen.lock().unwrap(), vec![json!({ "processed": 1 })]);
    }
}
