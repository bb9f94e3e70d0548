//! Error types for the import system

use thiserror::Error;

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;

/// Errors that can occur during import operations
#[derive(Error, Debug)]
pub enum ImportError {
    /// A bulk delete was called without anything to delete
    #[error("No {0} supplied to delete")]
    NothingToDelete(&'static str),

    /// Invalid configuration detected
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The migration service could not be created
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The migration service reported a failure
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Operation left for the caller to provide
    #[error("{0} method not implemented")]
    NotImplemented(&'static str),

    /// IO error (reading configuration or record files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
