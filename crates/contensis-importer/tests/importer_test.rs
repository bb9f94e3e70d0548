use contensis_import_types::{
    CmsConnection, ContentModels, ImportError, ImportResult, LogLevel, MigrateRequest,
    MigrateResult, MigrationService, MigrationServiceFactory, ProgressCallback, Query, Record,
    SourceCms, TagsQuery, TargetCms,
};
use contensis_importer::mapping::{Mappers, Template};
use contensis_importer::types::FieldPath;
use contensis_importer::{
    DeleteEntriesOptions, DeleteNodesOptions, DeleteTagGroupsOptions, DeleteTagsOptions,
    GetContentModelsOptions, GetEntriesOptions, GetNodesOptions, GetTagGroupsOptions,
    GetTagsOptions, ImportContentModelsOptions, ImportEntriesOptions, ImportNodesOptions,
    ImportTagsOptions, Importer, ImporterConfig,
};
use mockall::mock;
use mockall::predicate::eq;
use serde_json::json;
use std::sync::{Arc, Mutex};

mock! {
    MigrationService {}
    #[async_trait::async_trait]
    impl MigrationService for MigrationService {
        async fn get_content_models(&self) -> ImportResult<ContentModels>;
        async fn migrate_content_models(&self) -> ImportResult<MigrateResult>;
        async fn get_entries(&self, with_dependents: bool) -> ImportResult<Vec<Record>>;
        async fn migrate_entries(&self) -> ImportResult<MigrateResult>;
        async fn delete_entries(&self, recycle: bool) -> ImportResult<MigrateResult>;
        async fn get_tags(&self, query: TagsQuery) -> ImportResult<Vec<Record>>;
        async fn migrate_tags(&self) -> ImportResult<MigrateResult>;
        async fn delete_tags(&self, query: Option<TagsQuery>) -> ImportResult<MigrateResult>;
        async fn get_tag_groups(&self, query: Option<TagsQuery>) -> ImportResult<Vec<Record>>;
        async fn migrate_tag_groups(&self) -> ImportResult<MigrateResult>;
        async fn delete_tag_groups(&self, query: Option<TagsQuery>) -> ImportResult<MigrateResult>;
        async fn get_nodes(&self, root_path: Option<String>, depth: Option<u32>) -> ImportResult<Vec<Record>>;
        async fn migrate_nodes(&self) -> ImportResult<MigrateResult>;
        async fn delete_nodes(&self, root_paths: Vec<String>) -> ImportResult<MigrateResult>;
    }
}

type Calls = Arc<Mutex<Vec<(MigrateRequest, bool)>>>;

/// Hands out prepared mocks in order and records every request it is given
struct RecordingFactory {
    calls: Calls,
    services: Mutex<Vec<MockMigrationService>>,
}

impl RecordingFactory {
    fn new(services: Vec<MockMigrationService>) -> (Self, Calls) {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let mut services = services;
        services.reverse();
        (
            Self {
                calls: calls.clone(),
                services: Mutex::new(services),
            },
            calls,
        )
    }
}

impl MigrationServiceFactory for RecordingFactory {
    fn create(
        &self,
        request: MigrateRequest,
        dry_run: bool,
    ) -> ImportResult<Box<dyn MigrationService>> {
        self.calls.lock().unwrap().push((request, dry_run));
        match self.services.lock().unwrap().pop() {
            Some(service) => Ok(Box::new(service)),
            None => Err(ImportError::ServiceUnavailable(
                "no service prepared".to_string(),
            )),
        }
    }
}

fn test_config() -> ImporterConfig {
    ImporterConfig {
        concurrency: Some(4),
        ..Default::default()
    }
    .with_source(SourceCms::new(
        CmsConnection::new("https://cms-source.example.com/"),
        "website",
    ))
    .with_target(TargetCms::new(
        CmsConnection::new("https://cms-target.example.com/"),
        vec!["website".to_string(), "intranet".to_string()],
    ))
}

fn importer(commit: bool, services: Vec<MockMigrationService>) -> (Importer, Calls) {
    let (factory, calls) = RecordingFactory::new(services);
    (Importer::new(test_config(), commit, factory), calls)
}

fn only_call(calls: &Calls) -> (MigrateRequest, bool) {
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1, "expected exactly one service to be created");
    calls[0].clone()
}

#[tokio::test]
async fn test_get_entries_is_always_a_dry_run() {
    let mut service = MockMigrationService::new();
    service
        .expect_get_entries()
        .with(eq(true))
        .times(1)
        .returning(|_| Ok(vec![json!({ "sys": { "id": "1", "contentTypeId": "post" } })]));

    let (importer, calls) = importer(true, vec![service]);
    let entries = importer
        .get_entries(GetEntriesOptions::default())
        .await
        .unwrap();

    assert_eq!(entries.len(), 1);
    let (request, dry_run) = only_call(&calls);
    assert!(dry_run);
    assert_eq!(request.source_project(), "website");
    assert_eq!(request.output_logs, Some(LogLevel::Warning));
    assert_eq!(request.output_progress, Some(true));
    assert!(request.target.is_none());
}

#[tokio::test]
async fn test_get_entries_call_options_win() {
    let mut service = MockMigrationService::new();
    service
        .expect_get_entries()
        .with(eq(false))
        .times(1)
        .returning(|_| Ok(vec![]));

    let (importer, calls) = importer(false, vec![service]);
    importer
        .get_entries(GetEntriesOptions {
            project: Some("archive".to_string()),
            zen_ql: Some("sys.contentTypeId = post".to_string()),
            with_dependents: Some(false),
            output_logs: Some(LogLevel::Debug),
            ..Default::default()
        })
        .await
        .unwrap();

    let (request, _) = only_call(&calls);
    assert_eq!(request.source_project(), "archive");
    assert_eq!(request.zen_ql.as_deref(), Some("sys.contentTypeId = post"));
    assert_eq!(request.output_logs, Some(LogLevel::Debug));
    assert_eq!(
        request.source.unwrap().connection.url,
        "https://cms-source.example.com/"
    );
}

#[tokio::test]
async fn test_import_entries_preview_mode() {
    let mut service = MockMigrationService::new();
    service
        .expect_migrate_entries()
        .times(1)
        .returning(|| Ok(json!({ "entriesToMigrate": { "totalCount": 1 } })));

    let (importer, calls) = importer(false, vec![service]);
    let result = importer
        .import_entries(ImportEntriesOptions {
            entries: Some(vec![json!({ "sys": { "id": "1" } })]),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(result["entriesToMigrate"]["totalCount"], json!(1));
    let (request, dry_run) = only_call(&calls);
    assert!(dry_run);
    assert_eq!(request.entries.len(), 1);
    assert_eq!(request.target_projects().to_vec(), vec!["website", "intranet"]);
    assert_eq!(request.concurrency, Some(4));
    assert_eq!(request.transform_guids, Some(false));
    assert!(request.query.is_none());
}

#[tokio::test]
async fn test_import_entries_commit_mode_with_language() {
    let mut service = MockMigrationService::new();
    service
        .expect_migrate_entries()
        .times(1)
        .returning(|| Ok(json!({})));

    let (mut importer, calls) = importer(true, vec![service]);
    importer.entries.push(json!({ "sys": { "id": "1" } }));
    importer.entries.push(json!({ "sys": { "id": "2" } }));

    importer
        .import_entries(ImportEntriesOptions {
            language: Some("en-GB".to_string()),
            projects: Some(vec!["website".to_string()]),
            transform_guids: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();

    let (request, dry_run) = only_call(&calls);
    assert!(!dry_run);
    assert_eq!(request.entries.len(), 2);
    assert_eq!(request.target_projects().to_vec(), vec!["website"]);
    assert_eq!(request.query, Some(Query::for_language("en-GB")));
    assert_eq!(request.transform_guids, Some(true));
}

#[tokio::test]
async fn test_import_entries_language_defaults_to_query_language() {
    let mut service = MockMigrationService::new();
    service.expect_migrate_entries().returning(|| Ok(json!({})));

    let (factory, calls) = RecordingFactory::new(vec![service]);
    let config = ImporterConfig {
        query: Some(Query {
            languages: vec!["fr-FR".to_string(), "en-GB".to_string()],
            ..Default::default()
        }),
        ..test_config()
    };
    let importer = Importer::new(config, false, factory);

    importer
        .import_entries(ImportEntriesOptions::default())
        .await
        .unwrap();

    let (request, _) = only_call(&calls);
    assert_eq!(request.query, Some(Query::for_language("fr-FR")));
}

#[tokio::test]
async fn test_service_errors_are_returned_unchanged() {
    let mut service = MockMigrationService::new();
    service
        .expect_migrate_nodes()
        .times(1)
        .returning(|| Err(ImportError::MigrationFailed("node tree locked".to_string())));

    let (importer, _) = importer(true, vec![service]);
    let err = importer
        .import_nodes(ImportNodesOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::MigrationFailed(ref msg) if msg == "node tree locked"));
}

#[tokio::test]
async fn test_factory_errors_are_returned() {
    let (importer, calls) = importer(false, vec![]);
    let err = importer
        .get_tags(GetTagsOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::ServiceUnavailable(_)));
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_deletes_never_create_a_service() {
    let (importer, calls) = importer(true, vec![]);

    let err = importer
        .delete_entries(DeleteEntriesOptions {
            entries: Some(vec![]),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "No entries supplied to delete");

    let err = importer
        .delete_tags(DeleteTagsOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "No tags supplied to delete");

    let err = importer
        .delete_tag_groups(DeleteTagGroupsOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "No tag groups supplied to delete");

    let err = importer
        .delete_nodes(DeleteNodesOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "No root paths supplied to delete");

    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_entries_passes_recycle() {
    let mut service = MockMigrationService::new();
    service
        .expect_delete_entries()
        .with(eq(true))
        .times(1)
        .returning(|_| Ok(json!({ "deleted": 1 })));

    let (importer, calls) = importer(false, vec![service]);
    importer
        .delete_entries(DeleteEntriesOptions {
            entries: Some(vec![json!({ "sys": { "id": "1" } })]),
            recycle: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();

    let (request, dry_run) = only_call(&calls);
    assert!(dry_run);
    assert_eq!(request.entries.len(), 1);
}

#[tokio::test]
async fn test_delete_nodes_forwards_root_paths() {
    let mut service = MockMigrationService::new();
    service
        .expect_delete_nodes()
        .with(eq(vec!["/blog".to_string(), "/news".to_string()]))
        .times(1)
        .returning(|_| Ok(json!({})));

    let (importer, calls) = importer(true, vec![service]);
    importer
        .delete_nodes(DeleteNodesOptions::new(["/blog", "/news"]))
        .await
        .unwrap();

    let (_, dry_run) = only_call(&calls);
    assert!(!dry_run);
}

#[tokio::test]
async fn test_get_tags_with_dependents_override() {
    let mut service = MockMigrationService::new();
    service
        .expect_get_tags()
        .withf(|query| query.with_dependents && query.group_id.as_deref() == Some("topics"))
        .times(1)
        .returning(|_| Ok(vec![json!({ "id": "t1" })]));

    let (importer, _) = importer(false, vec![service]);
    let tags = importer
        .get_tags(GetTagsOptions {
            query: Some(TagsQuery {
                group_id: Some("topics".to_string()),
                ..Default::default()
            }),
            with_dependents: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(tags.len(), 1);
}

#[tokio::test]
async fn test_tag_operations_use_staged_records() {
    let mut tags_service = MockMigrationService::new();
    tags_service
        .expect_migrate_tags()
        .times(1)
        .returning(|| Ok(json!({})));
    let mut groups_service = MockMigrationService::new();
    groups_service
        .expect_migrate_tag_groups()
        .times(1)
        .returning(|| Ok(json!({})));
    let mut delete_service = MockMigrationService::new();
    delete_service
        .expect_delete_tag_groups()
        .with(eq(None))
        .times(1)
        .returning(|_| Ok(json!({})));
    let mut read_service = MockMigrationService::new();
    read_service
        .expect_get_tag_groups()
        .with(eq(None))
        .times(1)
        .returning(|_| Ok(vec![json!({ "id": "topics" })]));

    let (mut importer, calls) = importer(
        true,
        vec![tags_service, groups_service, delete_service, read_service],
    );
    importer.tags.push(json!({ "id": "t1" }));
    importer.tag_groups.push(json!({ "id": "topics" }));

    importer
        .import_tags(ImportTagsOptions::default())
        .await
        .unwrap();
    importer
        .import_tag_groups(ImportTagsOptions::default())
        .await
        .unwrap();
    importer
        .delete_tag_groups(DeleteTagGroupsOptions::default())
        .await
        .unwrap();
    let groups = importer
        .get_tag_groups(GetTagGroupsOptions::default())
        .await
        .unwrap();
    assert_eq!(groups.len(), 1);

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[0].0.tags.len(), 1);
    assert_eq!(calls[0].0.tag_groups.len(), 1);
    assert!(!calls[0].1);
    assert_eq!(calls[1].0.tag_groups.len(), 1);
    assert!(!calls[2].1);
    assert!(calls[3].1);
}

#[tokio::test]
async fn test_content_models_prefer_models_over_types() {
    let mut read_service = MockMigrationService::new();
    read_service
        .expect_get_content_models()
        .times(1)
        .returning(|| {
            Ok(ContentModels {
                content_types: vec![json!({ "id": "blogPost" })],
                ..Default::default()
            })
        });
    let mut models_service = MockMigrationService::new();
    models_service
        .expect_migrate_content_models()
        .times(1)
        .returning(|| Ok(json!({})));
    let mut types_service = MockMigrationService::new();
    types_service
        .expect_migrate_content_models()
        .times(1)
        .returning(|| Ok(json!({})));

    let (mut importer, calls) =
        importer(false, vec![read_service, models_service, types_service]);

    let models = importer
        .get_content_models(GetContentModelsOptions {
            models: Some(vec!["blogPost".to_string()]),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(models.content_types.len(), 1);

    importer.models = vec!["blogPost".to_string()];
    importer.content_types = vec![json!({ "id": "ignored" })];
    importer
        .import_content_models(ImportContentModelsOptions::default())
        .await
        .unwrap();

    importer.models.clear();
    importer
        .import_content_models(ImportContentModelsOptions::default())
        .await
        .unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls[0].0.models, vec!["blogPost".to_string()]);
    assert!(calls[0].1);

    assert_eq!(calls[1].0.models, vec!["blogPost".to_string()]);
    assert!(calls[1].0.content_types.is_empty());

    assert!(calls[2].0.models.is_empty());
    assert_eq!(calls[2].0.content_types, vec![json!({ "id": "ignored" })]);
}

#[tokio::test]
async fn test_get_nodes_forwards_root_and_depth() {
    let mut service = MockMigrationService::new();
    service
        .expect_get_nodes()
        .with(eq(Some("/blog".to_string())), eq(Some(2)))
        .times(1)
        .returning(|_, _| Ok(vec![json!({ "path": "/blog" })]));

    let (importer, calls) = importer(false, vec![service]);
    let nodes = importer
        .get_nodes(GetNodesOptions {
            root_path: Some("/blog".to_string()),
            depth: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(nodes.len(), 1);
    assert!(only_call(&calls).1);
}

#[tokio::test]
async fn test_extra_args_reach_mutating_requests_only() {
    let mut read_service = MockMigrationService::new();
    read_service.expect_get_entries().returning(|_| Ok(vec![]));
    let mut write_service = MockMigrationService::new();
    write_service.expect_migrate_nodes().returning(|| Ok(json!({})));

    let (factory, calls) = RecordingFactory::new(vec![read_service, write_service]);
    let mut config = test_config();
    config
        .extra_args
        .insert("includeDefaults".to_string(), json!(true));
    let importer = Importer::new(config, false, factory);

    importer
        .get_entries(GetEntriesOptions::default())
        .await
        .unwrap();
    importer
        .import_nodes(ImportNodesOptions::default())
        .await
        .unwrap();

    let calls = calls.lock().unwrap();
    assert!(calls[0].0.extra.is_empty());
    assert_eq!(calls[1].0.extra.get("includeDefaults"), Some(&json!(true)));
}

#[tokio::test]
async fn test_missing_connections_resolve_to_empty() {
    let mut service = MockMigrationService::new();
    service.expect_migrate_entries().returning(|| Ok(json!({})));

    let (factory, calls) = RecordingFactory::new(vec![service]);
    let importer = Importer::new(ImporterConfig::default(), false, factory);
    importer
        .import_entries(ImportEntriesOptions::default())
        .await
        .unwrap();

    let (request, _) = only_call(&calls);
    assert!(request.target_projects().is_empty());
    assert!(request.entries.is_empty());
}

#[test]
fn test_map_entries_through_facade() {
    let (importer, calls) = importer(false, vec![]);
    let records = vec![
        json!({ "sys": { "contentTypeId": "post" }, "title": "A", "kind": "news" }),
        json!({ "sys": { "contentTypeId": "unknown" }, "title": "B", "kind": "blog" }),
    ];

    let mappers = Mappers::new().with_function("post", |record, _| {
        let mut mapped = record.clone();
        mapped["mapped"] = json!(true);
        Ok(Some(mapped))
    });
    let mapped = importer.map_entries(&records, &mappers, None).unwrap();
    assert_eq!(
        mapped,
        vec![json!({ "sys": { "contentTypeId": "post" }, "title": "A", "kind": "news", "mapped": true })]
    );

    let by_kind = Mappers::new().with_template("blog", Template::new().path("heading", "title"));
    let field = FieldPath::parse("kind");
    let mapped = importer
        .map_entries(&records, &by_kind, Some(&field))
        .unwrap();
    assert_eq!(mapped, vec![json!({ "heading": "B" })]);

    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_tags_ignores_query_with_dependents() {
    let mut service = MockMigrationService::new();
    service
        .expect_get_tags()
        .withf(|query| !query.with_dependents && query.label.as_deref() == Some("News"))
        .times(1)
        .returning(|_| Ok(vec![]));

    let (importer, _) = importer(false, vec![service]);
    importer
        .get_tags(GetTagsOptions {
            query: Some(TagsQuery {
                label: Some("News".to_string()),
                with_dependents: true,
                ..Default::default()
            }),
            ..Default::default()
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_source_override_supplies_project() {
    let mut service = MockMigrationService::new();
    service.expect_get_entries().returning(|_| Ok(vec![]));

    let (importer, calls) = importer(false, vec![service]);
    importer
        .get_entries(GetEntriesOptions {
            source: Some(SourceCms::new(
                CmsConnection::new("https://cms-archive.example.com/"),
                "archive",
            )),
            ..Default::default()
        })
        .await
        .unwrap();

    let (request, _) = only_call(&calls);
    let source = request.source.unwrap();
    assert_eq!(source.connection.url, "https://cms-archive.example.com/");
    assert_eq!(source.project, "archive");
}

#[tokio::test]
async fn test_source_override_without_project_uses_instance_project() {
    let mut service = MockMigrationService::new();
    service.expect_get_nodes().returning(|_, _| Ok(vec![]));

    let (importer, calls) = importer(false, vec![service]);
    importer
        .get_nodes(GetNodesOptions {
            source: Some(SourceCms::new(
                CmsConnection::new("https://cms-archive.example.com/"),
                "",
            )),
            ..Default::default()
        })
        .await
        .unwrap();

    let (request, _) = only_call(&calls);
    assert_eq!(request.source_project(), "website");
}

#[tokio::test]
async fn test_target_override_supplies_projects() {
    let mut service = MockMigrationService::new();
    service.expect_migrate_nodes().returning(|| Ok(json!({})));

    let (importer, calls) = importer(true, vec![service]);
    importer
        .import_nodes(ImportNodesOptions {
            target: Some(TargetCms::new(
                CmsConnection::new("https://cms-staging.example.com/"),
                vec!["staging".to_string()],
            )),
            ..Default::default()
        })
        .await
        .unwrap();

    let (request, dry_run) = only_call(&calls);
    assert!(!dry_run);
    let target = request.target.unwrap();
    assert_eq!(target.connection.url, "https://cms-staging.example.com/");
    assert_eq!(target.target_projects, vec!["staging".to_string()]);
}

#[tokio::test]
async fn test_progress_callback_reaches_every_request() {
    let mut read_service = MockMigrationService::new();
    read_service.expect_get_entries().returning(|_| Ok(vec![]));
    let mut write_service = MockMigrationService::new();
    write_service.expect_migrate_entries().returning(|| Ok(json!({})));

    let (factory, calls) = RecordingFactory::new(vec![read_service, write_service]);
    let instance_callback = ProgressCallback::new(|_| {});
    let call_callback = ProgressCallback::new(|_| {});
    let importer =
        Importer::new(test_config(), false, factory).with_callback(instance_callback.clone());

    importer
        .get_entries(GetEntriesOptions::default())
        .await
        .unwrap();
    importer
        .import_entries(ImportEntriesOptions {
            callback: Some(call_callback.clone()),
            ..Default::default()
        })
        .await
        .unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls[0].0.callback, Some(instance_callback));
    assert_eq!(calls[1].0.callback, Some(call_callback));
}
