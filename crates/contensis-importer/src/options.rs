//! Per-call options for the import facade
//!
//! Every field is optional. Anything left as `None` falls back to the value
//! the `Importer` was constructed with, then to the documented default.

use contensis_import_types::{
    LogLevel, ProgressCallback, Query, Record, SourceCms, TagsQuery, TargetCms,
};
use serde_json::Value;

/// Options for `Importer::get_content_models`
#[derive(Debug, Clone, Default)]
pub struct GetContentModelsOptions {
    pub source: Option<SourceCms>,
    pub project: Option<String>,
    /// Content type / component ids to fetch, all when empty
    pub models: Option<Vec<String>>,
    pub output_logs: Option<LogLevel>,
    pub output_progress: Option<bool>,
    pub callback: Option<ProgressCallback>,
}

/// Options for `Importer::import_content_models`
#[derive(Debug, Clone, Default)]
pub struct ImportContentModelsOptions {
    pub target: Option<TargetCms>,
    pub projects: Option<Vec<String>>,
    /// Model ids to migrate; when empty the content types and components are sent instead
    pub models: Option<Vec<String>>,
    pub content_types: Option<Vec<Value>>,
    pub components: Option<Vec<Value>>,
    pub entries: Option<Vec<Record>>,
    pub nodes: Option<Vec<Record>>,
    pub tags: Option<Vec<Record>>,
    pub tag_groups: Option<Vec<Record>>,
    pub output_logs: Option<LogLevel>,
    pub output_progress: Option<bool>,
    pub callback: Option<ProgressCallback>,
}

/// Options for `Importer::get_entries`
#[derive(Debug, Clone, Default)]
pub struct GetEntriesOptions {
    pub source: Option<SourceCms>,
    pub project: Option<String>,
    pub query: Option<Query>,
    pub zen_ql: Option<String>,
    /// Also fetch entries the matched entries depend on (default `true`)
    pub with_dependents: Option<bool>,
    pub output_logs: Option<LogLevel>,
    pub output_progress: Option<bool>,
    pub callback: Option<ProgressCallback>,
}

/// Options for `Importer::import_entries`
#[derive(Debug, Clone, Default)]
pub struct ImportEntriesOptions {
    pub target: Option<TargetCms>,
    pub projects: Option<Vec<String>>,
    pub entries: Option<Vec<Record>>,
    pub tags: Option<Vec<Record>>,
    /// Language to import, defaults to the first language of the default query
    pub language: Option<String>,
    pub concurrency: Option<usize>,
    pub output_logs: Option<LogLevel>,
    pub output_progress: Option<bool>,
    pub callback: Option<ProgressCallback>,
    pub transform_guids: Option<bool>,
}

/// Options for `Importer::delete_entries`
#[derive(Debug, Clone, Default)]
pub struct DeleteEntriesOptions {
    pub target: Option<TargetCms>,
    pub projects: Option<Vec<String>>,
    pub entries: Option<Vec<Record>>,
    /// Move to the recycle bin instead of deleting permanently (default `false`)
    pub recycle: Option<bool>,
    pub output_logs: Option<LogLevel>,
    pub output_progress: Option<bool>,
    pub callback: Option<ProgressCallback>,
    pub transform_guids: Option<bool>,
}

/// Options for `Importer::get_tags`
#[derive(Debug, Clone, Default)]
pub struct GetTagsOptions {
    pub source: Option<SourceCms>,
    pub project: Option<String>,
    pub query: Option<TagsQuery>,
    /// Also fetch the groups of matched tags (default `false`)
    pub with_dependents: Option<bool>,
    pub output_logs: Option<LogLevel>,
    pub output_progress: Option<bool>,
    pub callback: Option<ProgressCallback>,
}

/// Options for `Importer::import_tags` and `Importer::import_tag_groups`
#[derive(Debug, Clone, Default)]
pub struct ImportTagsOptions {
    pub target: Option<TargetCms>,
    pub projects: Option<Vec<String>>,
    pub tags: Option<Vec<Record>>,
    pub tag_groups: Option<Vec<Record>>,
    pub concurrency: Option<usize>,
    pub output_logs: Option<LogLevel>,
    pub output_progress: Option<bool>,
    pub callback: Option<ProgressCallback>,
    pub transform_guids: Option<bool>,
}

/// Options for `Importer::delete_tags`
#[derive(Debug, Clone, Default)]
pub struct DeleteTagsOptions {
    pub target: Option<TargetCms>,
    pub projects: Option<Vec<String>>,
    pub tags: Option<Vec<Record>>,
    pub query: Option<TagsQuery>,
    pub output_logs: Option<LogLevel>,
    pub output_progress: Option<bool>,
    pub callback: Option<ProgressCallback>,
}

/// Options for `Importer::get_tag_groups`
#[derive(Debug, Clone, Default)]
pub struct GetTagGroupsOptions {
    pub source: Option<SourceCms>,
    pub project: Option<String>,
    pub query: Option<TagsQuery>,
    pub output_logs: Option<LogLevel>,
    pub output_progress: Option<bool>,
    pub callback: Option<ProgressCallback>,
}

/// Options for `Importer::delete_tag_groups`
#[derive(Debug, Clone, Default)]
pub struct DeleteTagGroupsOptions {
    pub target: Option<TargetCms>,
    pub projects: Option<Vec<String>>,
    pub tag_groups: Option<Vec<Record>>,
    pub query: Option<TagsQuery>,
    pub output_logs: Option<LogLevel>,
    pub output_progress: Option<bool>,
    pub callback: Option<ProgressCallback>,
}

/// Options for `Importer::get_nodes`
#[derive(Debug, Clone, Default)]
pub struct GetNodesOptions {
    /// Start of the node tree, the site root when omitted
    pub root_path: Option<String>,
    /// Levels below `root_path` to fetch
    pub depth: Option<u32>,
    pub source: Option<SourceCms>,
    pub project: Option<String>,
    pub query: Option<Query>,
    pub output_logs: Option<LogLevel>,
    pub output_progress: Option<bool>,
    pub callback: Option<ProgressCallback>,
}

/// Options for `Importer::import_nodes`
#[derive(Debug, Clone, Default)]
pub struct ImportNodesOptions {
    pub target: Option<TargetCms>,
    pub projects: Option<Vec<String>>,
    pub nodes: Option<Vec<Record>>,
    pub concurrency: Option<usize>,
    pub output_logs: Option<LogLevel>,
    pub output_progress: Option<bool>,
    pub callback: Option<ProgressCallback>,
    pub transform_guids: Option<bool>,
}

/// Options for `Importer::delete_nodes`
#[derive(Debug, Clone, Default)]
pub struct DeleteNodesOptions {
    pub target: Option<TargetCms>,
    pub projects: Option<Vec<String>>,
    /// Node paths to delete, each with all of its children
    pub root_paths: Vec<String>,
    pub concurrency: Option<usize>,
    pub output_logs: Option<LogLevel>,
    pub output_progress: Option<bool>,
    pub callback: Option<ProgressCallback>,
}

impl DeleteNodesOptions {
    pub fn new<I, S>(root_paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root_paths: root_paths.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}
