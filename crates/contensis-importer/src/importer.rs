//! Import facade
//!
//! `Importer` turns per-call options into a `MigrateRequest`, builds a fresh
//! migration service for it and forwards to exactly one service method.
//! Mutating calls are built in dry-run (preview) mode unless the importer
//! was constructed with `commit = true`.

use crate::config::ImporterConfig;
use crate::options::{
    DeleteEntriesOptions, DeleteNodesOptions, DeleteTagGroupsOptions, DeleteTagsOptions,
    GetContentModelsOptions, GetEntriesOptions, GetNodesOptions, GetTagGroupsOptions,
    GetTagsOptions, ImportContentModelsOptions, ImportEntriesOptions, ImportNodesOptions,
    ImportTagsOptions,
};
use contensis_import_types::{
    ContentModels, FieldPath, ImportError, ImportResult, LogLevel, MigrateRequest, MigrateResult,
    MigrationService, MigrationServiceFactory, ProgressCallback, Query, Record, SourceCms,
    TargetCms,
};
use contensis_mapping::{map_entries_by_field, Mappers};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Convenience layer over a migration service
///
/// The staging collections (`entries`, `nodes`, `tags`, `tag_groups`,
/// `models`) are the defaults for the matching import options, so a script
/// can push mapped records into them and call the import method without
/// arguments.
pub struct Importer {
    commit: bool,
    config: ImporterConfig,
    factory: Arc<dyn MigrationServiceFactory>,
    /// Entries to import
    pub entries: Vec<Record>,
    /// Nodes to import
    pub nodes: Vec<Record>,
    /// Tags to import
    pub tags: Vec<Record>,
    /// Tag groups to import
    pub tag_groups: Vec<Record>,
    /// Content types to import
    pub content_types: Vec<Value>,
    /// Components to import
    pub components: Vec<Value>,
    /// Content model ids to fetch or import
    pub models: Vec<String>,
    /// Progress hook passed to every service unless a call supplies its own
    pub callback: Option<ProgressCallback>,
}

impl std::fmt::Debug for Importer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Importer")
            .field("commit", &self.commit)
            .field("config", &self.config)
            .field("entries", &self.entries.len())
            .field("nodes", &self.nodes.len())
            .field("tags", &self.tags.len())
            .field("tag_groups", &self.tag_groups.len())
            .field("content_types", &self.content_types.len())
            .field("components", &self.components.len())
            .field("models", &self.models)
            .field("callback", &self.callback)
            .finish()
    }
}

impl Importer {
    /// Create an importer; `commit` enables writes for every mutating call
    pub fn new(
        config: ImporterConfig,
        commit: bool,
        factory: impl MigrationServiceFactory + 'static,
    ) -> Self {
        Self::with_factory(config, commit, Arc::new(factory))
    }

    /// Create an importer sharing an existing factory
    pub fn with_factory(
        config: ImporterConfig,
        commit: bool,
        factory: Arc<dyn MigrationServiceFactory>,
    ) -> Self {
        info!(
            "Contensis importer ready in {} mode",
            if commit { "commit" } else { "preview" }
        );
        Self {
            commit,
            content_types: config.content_types.clone(),
            components: config.components.clone(),
            config,
            factory,
            entries: Vec::new(),
            nodes: Vec::new(),
            tags: Vec::new(),
            tag_groups: Vec::new(),
            models: Vec::new(),
            callback: None,
        }
    }

    /// Report service progress through `callback`
    pub fn with_callback(mut self, callback: ProgressCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Whether mutating calls write to the target
    pub fn commit(&self) -> bool {
        self.commit
    }

    pub fn config(&self) -> &ImporterConfig {
        &self.config
    }

    fn mode(&self) -> &'static str {
        if self.commit {
            "commit"
        } else {
            "preview"
        }
    }

    fn connect(
        &self,
        request: MigrateRequest,
        dry_run: bool,
    ) -> ImportResult<Box<dyn MigrationService>> {
        self.factory.create(request, dry_run)
    }

    /// Source connection: call-time, then instance, with the project resolved
    /// from the call, the chosen source, then the instance source
    fn resolve_source(&self, source: Option<SourceCms>, project: Option<String>) -> SourceCms {
        let source = source
            .or_else(|| self.config.source.clone())
            .unwrap_or_default();

        let project = project
            .or_else(|| non_empty(&source.project))
            .or_else(|| {
                self.config
                    .source
                    .as_ref()
                    .and_then(|s| non_empty(&s.project))
            })
            .unwrap_or_default();

        if source.connection.url.is_empty() {
            warn!("No source connection configured");
        }
        source.with_project(project)
    }

    /// Target connection: call-time, then instance, with projects resolved
    /// from the call, the chosen target, then the instance target
    fn resolve_target(&self, target: Option<TargetCms>, projects: Option<Vec<String>>) -> TargetCms {
        let target = target
            .or_else(|| self.config.target.clone())
            .unwrap_or_default();

        let projects = projects
            .or_else(|| {
                (!target.target_projects.is_empty()).then(|| target.target_projects.clone())
            })
            .or_else(|| self.config.target.as_ref().map(|t| t.target_projects.clone()))
            .unwrap_or_default();

        if target.connection.url.is_empty() {
            warn!("No target connection configured");
        }
        target.with_projects(projects)
    }

    fn output_logs(&self, output_logs: Option<LogLevel>) -> Option<LogLevel> {
        Some(output_logs.unwrap_or(self.config.output_logs))
    }

    fn output_progress(&self, output_progress: Option<bool>) -> Option<bool> {
        Some(output_progress.unwrap_or(self.config.output_progress))
    }

    fn progress_callback(&self, callback: Option<ProgressCallback>) -> Option<ProgressCallback> {
        callback.or_else(|| self.callback.clone())
    }

    fn transform_guids(&self, transform_guids: Option<bool>) -> Option<bool> {
        Some(transform_guids.unwrap_or(self.config.transform_guids))
    }

    fn concurrency(&self, concurrency: Option<usize>) -> Option<usize> {
        concurrency.or(self.config.concurrency)
    }

    /// Base for mutating requests, carrying the instance extra arguments
    fn mutating_request(&self, target: TargetCms) -> MigrateRequest {
        MigrateRequest {
            target: Some(target),
            extra: self.config.extra_args.clone(),
            ..Default::default()
        }
    }

    /// Get content types, components and compiled content models from the source
    pub async fn get_content_models(
        &self,
        options: GetContentModelsOptions,
    ) -> ImportResult<ContentModels> {
        let source = self.resolve_source(options.source, options.project);
        debug!("Getting content models from project {}", source.project);

        let request = MigrateRequest {
            source: Some(source),
            models: options.models.unwrap_or_else(|| self.models.clone()),
            output_logs: self.output_logs(options.output_logs),
            output_progress: self.output_progress(options.output_progress),
            callback: self.progress_callback(options.callback),
            ..Default::default()
        };

        self.connect(request, true)?.get_content_models().await
    }

    /// Migrate content types and components to the target projects
    ///
    /// Sends `models` when any are given, otherwise the content types and
    /// components themselves.
    pub async fn import_content_models(
        &self,
        options: ImportContentModelsOptions,
    ) -> ImportResult<MigrateResult> {
        let target = self.resolve_target(options.target, options.projects);
        let models = options.models.unwrap_or_else(|| self.models.clone());

        let mut request = self.mutating_request(target);
        if models.is_empty() {
            request.content_types = options
                .content_types
                .unwrap_or_else(|| self.content_types.clone());
            request.components = options
                .components
                .unwrap_or_else(|| self.components.clone());
        } else {
            request.models = models;
        }
        request.entries = options.entries.unwrap_or_else(|| self.entries.clone());
        request.nodes = options.nodes.unwrap_or_else(|| self.nodes.clone());
        request.tags = options.tags.unwrap_or_else(|| self.tags.clone());
        request.tag_groups = options.tag_groups.unwrap_or_else(|| self.tag_groups.clone());
        request.output_logs = self.output_logs(options.output_logs);
        request.output_progress = self.output_progress(options.output_progress);
        request.callback = self.progress_callback(options.callback);

        info!(
            "Importing {} models, {} content types, {} components into {:?} ({})",
            request.models.len(),
            request.content_types.len(),
            request.components.len(),
            request.target_projects(),
            self.mode()
        );

        self.connect(request, !self.commit)?
            .migrate_content_models()
            .await
    }

    /// Get entries from the source matching the query
    pub async fn get_entries(&self, options: GetEntriesOptions) -> ImportResult<Vec<Record>> {
        let source = self.resolve_source(options.source, options.project);
        let with_dependents = options.with_dependents.unwrap_or(true);
        debug!(
            "Getting entries from project {} (with dependents: {})",
            source.project, with_dependents
        );

        let request = MigrateRequest {
            source: Some(source),
            query: options.query.or_else(|| self.config.query.clone()),
            zen_ql: options.zen_ql.or_else(|| self.config.zen_ql.clone()),
            output_logs: self.output_logs(options.output_logs),
            output_progress: self.output_progress(options.output_progress),
            callback: self.progress_callback(options.callback),
            ..Default::default()
        };

        let entries = self.connect(request, true)?.get_entries(with_dependents).await?;
        info!("Fetched {} entries", entries.len());
        Ok(entries)
    }

    /// Map records with a per-content-type mapping table
    ///
    /// Uses `sys.contentTypeId` to choose each mapper unless `field` is given.
    pub fn map_entries(
        &self,
        records: &[Record],
        mappers: &Mappers,
        field: Option<&FieldPath>,
    ) -> anyhow::Result<Vec<Record>> {
        let content_type = FieldPath::content_type();
        map_entries_by_field(records, mappers, field.unwrap_or(&content_type))
    }

    /// Migrate entries (and any tags they use) to the target projects
    pub async fn import_entries(&self, options: ImportEntriesOptions) -> ImportResult<MigrateResult> {
        let target = self.resolve_target(options.target, options.projects);
        let language = options.language.or_else(|| {
            self.config
                .query
                .as_ref()
                .and_then(|q| q.primary_language())
                .map(str::to_string)
        });

        let mut request = self.mutating_request(target);
        request.entries = options.entries.unwrap_or_else(|| self.entries.clone());
        request.tags = options.tags.unwrap_or_else(|| self.tags.clone());
        request.query = language.map(Query::for_language);
        request.concurrency = self.concurrency(options.concurrency);
        request.output_logs = self.output_logs(options.output_logs);
        request.output_progress = self.output_progress(options.output_progress);
        request.callback = self.progress_callback(options.callback);
        request.transform_guids = self.transform_guids(options.transform_guids);

        info!(
            "Importing {} entries into {:?} ({})",
            request.entries.len(),
            request.target_projects(),
            self.mode()
        );

        self.connect(request, !self.commit)?.migrate_entries().await
    }

    /// Delete entries from the target projects
    pub async fn delete_entries(&self, options: DeleteEntriesOptions) -> ImportResult<MigrateResult> {
        let entries = options.entries.unwrap_or_else(|| self.entries.clone());
        if entries.is_empty() {
            return Err(ImportError::NothingToDelete("entries"));
        }
        let target = self.resolve_target(options.target, options.projects);
        let recycle = options.recycle.unwrap_or(false);

        let mut request = self.mutating_request(target);
        request.entries = entries;
        request.output_logs = self.output_logs(options.output_logs);
        request.output_progress = self.output_progress(options.output_progress);
        request.callback = self.progress_callback(options.callback);
        request.transform_guids = self.transform_guids(options.transform_guids);

        info!(
            "Deleting {} entries from {:?} (recycle: {}, {})",
            request.entries.len(),
            request.target_projects(),
            recycle,
            self.mode()
        );

        self.connect(request, !self.commit)?
            .delete_entries(recycle)
            .await
    }

    /// Get tags from the source
    pub async fn get_tags(&self, options: GetTagsOptions) -> ImportResult<Vec<Record>> {
        let source = self.resolve_source(options.source, options.project);
        let mut query = options.query.unwrap_or_default();
        query.with_dependents = options.with_dependents.unwrap_or(false);
        debug!("Getting tags from project {}", source.project);

        let request = MigrateRequest {
            source: Some(source),
            output_logs: self.output_logs(options.output_logs),
            output_progress: self.output_progress(options.output_progress),
            callback: self.progress_callback(options.callback),
            ..Default::default()
        };

        let tags = self.connect(request, true)?.get_tags(query).await?;
        info!("Fetched {} tags", tags.len());
        Ok(tags)
    }

    /// Migrate tags and their groups to the target projects
    pub async fn import_tags(&self, options: ImportTagsOptions) -> ImportResult<MigrateResult> {
        let request = self.tags_request(options);
        info!(
            "Importing {} tags and {} tag groups into {:?} ({})",
            request.tags.len(),
            request.tag_groups.len(),
            request.target_projects(),
            self.mode()
        );

        self.connect(request, !self.commit)?.migrate_tags().await
    }

    /// Delete tags from the target projects
    pub async fn delete_tags(&self, options: DeleteTagsOptions) -> ImportResult<MigrateResult> {
        let tags = options.tags.unwrap_or_else(|| self.tags.clone());
        if tags.is_empty() {
            return Err(ImportError::NothingToDelete("tags"));
        }
        let target = self.resolve_target(options.target, options.projects);

        let mut request = self.mutating_request(target);
        request.tags = tags;
        request.output_logs = self.output_logs(options.output_logs);
        request.output_progress = self.output_progress(options.output_progress);
        request.callback = self.progress_callback(options.callback);

        info!(
            "Deleting {} tags from {:?} ({})",
            request.tags.len(),
            request.target_projects(),
            self.mode()
        );

        self.connect(request, !self.commit)?
            .delete_tags(options.query)
            .await
    }

    /// Get tag groups from the source
    pub async fn get_tag_groups(&self, options: GetTagGroupsOptions) -> ImportResult<Vec<Record>> {
        let source = self.resolve_source(options.source, options.project);
        debug!("Getting tag groups from project {}", source.project);

        let request = MigrateRequest {
            source: Some(source),
            output_logs: self.output_logs(options.output_logs),
            output_progress: self.output_progress(options.output_progress),
            callback: self.progress_callback(options.callback),
            ..Default::default()
        };

        let groups = self
            .connect(request, true)?
            .get_tag_groups(options.query)
            .await?;
        info!("Fetched {} tag groups", groups.len());
        Ok(groups)
    }

    /// Migrate tag groups (and any tags supplied with them) to the target projects
    pub async fn import_tag_groups(&self, options: ImportTagsOptions) -> ImportResult<MigrateResult> {
        let request = self.tags_request(options);
        info!(
            "Importing {} tag groups into {:?} ({})",
            request.tag_groups.len(),
            request.target_projects(),
            self.mode()
        );

        self.connect(request, !self.commit)?
            .migrate_tag_groups()
            .await
    }

    fn tags_request(&self, options: ImportTagsOptions) -> MigrateRequest {
        let target = self.resolve_target(options.target, options.projects);

        let mut request = self.mutating_request(target);
        request.tags = options.tags.unwrap_or_else(|| self.tags.clone());
        request.tag_groups = options.tag_groups.unwrap_or_else(|| self.tag_groups.clone());
        request.concurrency = self.concurrency(options.concurrency);
        request.output_logs = self.output_logs(options.output_logs);
        request.output_progress = self.output_progress(options.output_progress);
        request.callback = self.progress_callback(options.callback);
        request.transform_guids = self.transform_guids(options.transform_guids);
        request
    }

    /// Delete tag groups from the target projects
    pub async fn delete_tag_groups(
        &self,
        options: DeleteTagGroupsOptions,
    ) -> ImportResult<MigrateResult> {
        let tag_groups = options.tag_groups.unwrap_or_else(|| self.tag_groups.clone());
        if tag_groups.is_empty() {
            return Err(ImportError::NothingToDelete("tag groups"));
        }
        let target = self.resolve_target(options.target, options.projects);

        let mut request = self.mutating_request(target);
        request.tag_groups = tag_groups;
        request.output_logs = self.output_logs(options.output_logs);
        request.output_progress = self.output_progress(options.output_progress);
        request.callback = self.progress_callback(options.callback);

        info!(
            "Deleting {} tag groups from {:?} ({})",
            request.tag_groups.len(),
            request.target_projects(),
            self.mode()
        );

        self.connect(request, !self.commit)?
            .delete_tag_groups(options.query)
            .await
    }

    /// Get the node tree from the source
    pub async fn get_nodes(&self, options: GetNodesOptions) -> ImportResult<Vec<Record>> {
        let source = self.resolve_source(options.source, options.project);
        debug!(
            "Getting nodes from project {} (root: {:?}, depth: {:?})",
            source.project, options.root_path, options.depth
        );

        let request = MigrateRequest {
            source: Some(source),
            query: options.query.or_else(|| self.config.query.clone()),
            output_logs: self.output_logs(options.output_logs),
            output_progress: self.output_progress(options.output_progress),
            callback: self.progress_callback(options.callback),
            ..Default::default()
        };

        let nodes = self
            .connect(request, true)?
            .get_nodes(options.root_path, options.depth)
            .await?;
        info!("Fetched {} nodes", nodes.len());
        Ok(nodes)
    }

    /// Migrate nodes to the target projects
    pub async fn import_nodes(&self, options: ImportNodesOptions) -> ImportResult<MigrateResult> {
        let target = self.resolve_target(options.target, options.projects);

        let mut request = self.mutating_request(target);
        request.nodes = options.nodes.unwrap_or_else(|| self.nodes.clone());
        request.concurrency = self.concurrency(options.concurrency);
        request.output_logs = self.output_logs(options.output_logs);
        request.output_progress = self.output_progress(options.output_progress);
        request.callback = self.progress_callback(options.callback);
        request.transform_guids = self.transform_guids(options.transform_guids);

        info!(
            "Importing {} nodes into {:?} ({})",
            request.nodes.len(),
            request.target_projects(),
            self.mode()
        );

        self.connect(request, !self.commit)?.migrate_nodes().await
    }

    /// Delete nodes and all of their children below each root path
    pub async fn delete_nodes(&self, options: DeleteNodesOptions) -> ImportResult<MigrateResult> {
        if options.root_paths.is_empty() {
            return Err(ImportError::NothingToDelete("root paths"));
        }
        let target = self.resolve_target(options.target, options.projects);

        let mut request = self.mutating_request(target);
        request.concurrency = self.concurrency(options.concurrency);
        request.output_logs = self.output_logs(options.output_logs);
        request.output_progress = self.output_progress(options.output_progress);
        request.callback = self.progress_callback(options.callback);

        info!(
            "Deleting nodes below {:?} from {:?} ({})",
            options.root_paths,
            request.target_projects(),
            self.mode()
        );

        self.connect(request, !self.commit)?
            .delete_nodes(options.root_paths)
            .await
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
