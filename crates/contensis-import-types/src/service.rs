//! Migration service traits
//!
//! Defines the interface of the external migration engine. The engine owns
//! all CMS traffic: fetching, diffing against the target, retries,
//! concurrency and honouring the dry-run flag. The import facade only
//! constructs one per call and forwards to a single method.

use crate::{error::ImportResult, record::Record, request::MigrateRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Summary returned by a mutating migration call
///
/// Shape is owned by the migration service; it is passed back untouched.
pub type MigrateResult = Value;

/// Content types, components and compiled content models fetched from a project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentModels {
    #[serde(default)]
    pub content_types: Vec<Value>,
    #[serde(default)]
    pub components: Vec<Value>,
    /// Content types with their component and dependency trees resolved
    #[serde(default)]
    pub models: Vec<Value>,
}

/// Query for tags and tag groups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Also return the tag groups the matched tags belong to
    #[serde(default)]
    pub with_dependents: bool,
    /// Query options not modelled above, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// External migration service
///
/// One instance is created per facade call via `MigrationServiceFactory`,
/// already configured with the request and dry-run flag.
#[async_trait]
pub trait MigrationService: Send + Sync {
    /// Fetch content types, components and content models from the source
    async fn get_content_models(&self) -> ImportResult<ContentModels>;

    /// Create or update content types and components in the target projects
    async fn migrate_content_models(&self) -> ImportResult<MigrateResult>;

    /// Fetch entries from the source, optionally with their dependencies
    async fn get_entries(&self, with_dependents: bool) -> ImportResult<Vec<Record>>;

    /// Create or update entries in the target projects
    async fn migrate_entries(&self) -> ImportResult<MigrateResult>;

    /// Delete entries from the target projects, moving them to the recycle bin when `recycle`
    async fn delete_entries(&self, recycle: bool) -> ImportResult<MigrateResult>;

    /// Fetch tags from the source
    async fn get_tags(&self, query: TagsQuery) -> ImportResult<Vec<Record>>;

    /// Create or update tags (and their groups) in the target projects
    async fn migrate_tags(&self) -> ImportResult<MigrateResult>;

    /// Delete tags from the target projects
    async fn delete_tags(&self, query: Option<TagsQuery>) -> ImportResult<MigrateResult>;

    /// Fetch tag groups from the source
    async fn get_tag_groups(&self, query: Option<TagsQuery>) -> ImportResult<Vec<Record>>;

    /// Create or update tag groups in the target projects
    async fn migrate_tag_groups(&self) -> ImportResult<MigrateResult>;

    /// Delete tag groups from the target projects
    async fn delete_tag_groups(&self, query: Option<TagsQuery>) -> ImportResult<MigrateResult>;

    /// Fetch the site view node tree below `root_path` down to `depth`
    async fn get_nodes(
        &self,
        root_path: Option<String>,
        depth: Option<u32>,
    ) -> ImportResult<Vec<Record>>;

    /// Create or update nodes in the target projects
    async fn migrate_nodes(&self) -> ImportResult<MigrateResult>;

    /// Delete nodes and all their children below each root path
    async fn delete_nodes(&self, root_paths: Vec<String>) -> ImportResult<MigrateResult>;
}

/// Builds a configured migration service for a single call
pub trait MigrationServiceFactory: Send + Sync {
    /// Create a service for `request`; `dry_run` asks it to report changes without writing
    fn create(
        &self,
        request: MigrateRequest,
        dry_run: bool,
    ) -> ImportResult<Box<dyn MigrationService>>;
}

impl<F> MigrationServiceFactory for F
where
    F: Fn(MigrateRequest, bool) -> ImportResult<Box<dyn MigrationService>> + Send + Sync,
{
    fn create(
        &self,
        request: MigrateRequest,
        dry_run: bool,
    ) -> ImportResult<Box<dyn MigrationService>> {
        self(request, dry_run)
    }
}
