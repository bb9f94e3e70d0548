//! Core types and traits for the Contensis import system
//!
//! This crate provides the foundational abstractions shared by the mapping
//! utilities and the import facade.
//!
//! # Architecture
//!
//! - **Traits**: `MigrationService` is the external migration engine the
//!   facade forwards to, `MigrationServiceFactory` builds one per request
//! - **Types**: Records, field paths, CMS connections and `MigrateRequest`
//! - **Errors**: Unified error handling across the import crates
//!
//! # Usage
//!
//! Migration engine bindings depend on this crate and implement
//! `MigrationService`; the `contensis-importer` facade only talks to the traits.

pub mod connection;
pub mod error;
pub mod record;
pub mod request;
pub mod service;

pub use connection::{CmsConnection, SourceCms, TargetCms};
pub use error::{ImportError, ImportResult};
pub use record::{
    content_type_id, record_id, FieldPath, Record, CONTENT_TYPE_FIELD, ID_FIELD,
};
pub use request::{LogLevel, MigrateRequest, ProgressCallback, Query};
pub use service::{
    ContentModels, MigrateResult, MigrationService, MigrationServiceFactory, TagsQuery,
};
