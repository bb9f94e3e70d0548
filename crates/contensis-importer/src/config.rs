//! Importer configuration
//!
//! `ImporterConfig` holds the instance-level defaults every facade call falls
//! back to. It is usually built in code, or loaded from a JSON file:
//!
//! ```json
//! {
//!   "source": { "url": "https://cms-example.cloud.contensis.com/", "clientId": "...", "sharedSecret": "...", "project": "website" },
//!   "target": { "url": "https://cms-example-dev.cloud.contensis.com/", "clientId": "...", "sharedSecret": "...", "targetProjects": ["website"] },
//!   "concurrency": 3,
//!   "transformGuids": true
//! }
//! ```
//!
//! Commit (write) mode is never part of the file. It is passed to
//! `Importer::new` explicitly, usually from `commit_from_env`.

use contensis_import_types::{ImportError, ImportResult, LogLevel, Query, SourceCms, TargetCms};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Environment variable enabling commit mode
pub const COMMIT_ENV: &str = "COMMIT";

/// Whether a `COMMIT` value enables commit mode; only the literal `true` does
pub fn is_commit_value(value: Option<&str>) -> bool {
    value == Some("true")
}

/// Read `COMMIT` from the process environment
///
/// Call this once at startup and pass the result to `Importer::new`.
pub fn commit_from_env() -> bool {
    is_commit_value(std::env::var(COMMIT_ENV).ok().as_deref())
}

fn default_output_progress() -> bool {
    true
}

/// Instance-level defaults for an `Importer`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImporterConfig {
    /// CMS and project to read from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceCms>,
    /// CMS and projects to write to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetCms>,
    /// Default query for fetching entries and nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,
    #[serde(default, rename = "zenQL", skip_serializing_if = "Option::is_none")]
    pub zen_ql: Option<String>,
    /// Parallel request hint passed to the migration service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
    /// Regenerate record ids when importing
    #[serde(default)]
    pub transform_guids: bool,
    #[serde(default)]
    pub output_logs: LogLevel,
    #[serde(default = "default_output_progress")]
    pub output_progress: bool,
    /// Content types to import with `import_content_models`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content_types: Vec<Value>,
    /// Components to import with `import_content_models`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Value>,
    /// Additional request fields merged into every mutating request
    #[serde(flatten)]
    pub extra_args: Map<String, Value>,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            source: None,
            target: None,
            query: None,
            zen_ql: None,
            concurrency: None,
            transform_guids: false,
            output_logs: LogLevel::Warning,
            output_progress: true,
            content_types: Vec::new(),
            components: Vec::new(),
            extra_args: Map::new(),
        }
    }
}

impl ImporterConfig {
    pub fn with_source(mut self, source: SourceCms) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_target(mut self, target: TargetCms) -> Self {
        self.target = Some(target);
        self
    }

    /// Load and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> ImportResult<Self> {
        let path = path.as_ref();
        debug!("Loading importer configuration from {}", path.display());

        let raw = std::fs::read_to_string(path)?;
        let config: ImporterConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the migration service cannot use
    pub fn validate(&self) -> ImportResult<()> {
        if self.concurrency == Some(0) {
            return Err(ImportError::InvalidConfiguration(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if let Some(source) = &self.source {
            if source.connection.url.trim().is_empty() {
                return Err(ImportError::InvalidConfiguration(
                    "source url is empty".to_string(),
                ));
            }
        }
        if let Some(target) = &self.target {
            if target.connection.url.trim().is_empty() {
                return Err(ImportError::InvalidConfiguration(
                    "target url is empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}
