//! Schema loading errors
//!
//! Error codes:
//! - DOCPATCH_SCHEMA_IO
//! - DOCPATCH_MALFORMED_SCHEMA

use thiserror::Error;

/// Result type for schema loading
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Failures while reading a schema description from disk or text.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Schema file could not be read
    #[error("failed to read schema '{location}': {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    /// Schema text is not a valid description
    #[error("malformed schema '{location}': {reason}")]
    Malformed { location: String, reason: String },
}

impl SchemaError {
    pub fn malformed(location: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::Malformed {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::Io { .. } => "DOCPATCH_SCHEMA_IO",
            SchemaError::Malformed { .. } => "DOCPATCH_MALFORMED_SCHEMA",
        }
    }
}
