//! Contensis import facade
//!
//! `Importer` wraps an injected migration service with per-call option
//! merging and preview/commit handling, and exposes the record mapping
//! dispatcher from `contensis-mapping`.
//!
//! # Usage
//!
//! ```ignore
//! let importer = Importer::new(config, commit_from_env(), factory);
//! let entries = importer.get_entries(GetEntriesOptions::default()).await?;
//! let mapped = importer.map_entries(&entries, &mappers, None)?;
//! let result = importer
//!     .import_entries(ImportEntriesOptions { entries: Some(mapped), ..Default::default() })
//!     .await?;
//! ```

pub mod config;
pub mod importer;
pub mod options;
pub mod script;

pub use config::{commit_from_env, is_commit_value, ImporterConfig, COMMIT_ENV};
pub use importer::Importer;
pub use options::{
    DeleteEntriesOptions, DeleteNodesOptions, DeleteTagGroupsOptions, DeleteTagsOptions,
    GetContentModelsOptions, GetEntriesOptions, GetNodesOptions, GetTagGroupsOptions,
    GetTagsOptions, ImportContentModelsOptions, ImportEntriesOptions, ImportNodesOptions,
    ImportTagsOptions,
};
pub use script::{run_script, ImportScript};

pub use contensis_import_types as types;
pub use contensis_mapping as mapping;
