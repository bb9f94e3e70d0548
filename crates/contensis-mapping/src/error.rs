//! Error types for record mapping

use thiserror::Error;

/// Result type for mapping setup
pub type MappingResult<T> = Result<T, MappingError>;

/// Errors raised while building mappers
///
/// Failures inside caller-supplied transforms are not wrapped here; they are
/// returned to the caller as-is.
#[derive(Error, Debug)]
pub enum MappingError {
    /// Template definition could not be understood
    #[error("Invalid template at '{path}': {reason}")]
    InvalidTemplate { path: String, reason: String },

    /// Mapping table definition could not be understood
    #[error("Invalid mappers: {0}")]
    InvalidMappers(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl MappingError {
    pub(crate) fn invalid_template(path: &str, reason: impl Into<String>) -> Self {
        MappingError::InvalidTemplate {
            path: if path.is_empty() { "$".to_string() } else { path.to_string() },
            reason: reason.into(),
        }
    }
}
