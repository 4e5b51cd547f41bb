//! Error types for dbal

use thiserror::Error;

/// Result type alias for dbal operations
pub type DbalResult<T> = Result<T, DbalError>;

/// Error types for database operations
#[derive(Debug, Error)]
pub enum DbalError {
    /// Database connection or session-setup error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement rejected by the driver
    #[error("Statement error: {0}")]
    Statement(String),

    /// Configuration error (missing or malformed connection settings)
    #[error("Config error: {0}")]
    Config(String),

    /// Count of supplied id values does not match the primary-key columns
    #[error("Expected {expected} primary key value(s), got {supplied}")]
    KeyCardinality { expected: usize, supplied: usize },

    /// Rendering or record access attempted without a FROM source
    #[error("No source table set; call from() first")]
    MissingSource,

    /// A record is missing one of its primary-key fields
    #[error("Record is missing primary key field '{0}'")]
    MissingKey(String),

    /// Insert attempted with a record that has no fields
    #[error("Record has no fields")]
    EmptyRecord,

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Result value conversion error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl DbalError {
    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a statement error
    pub fn statement(message: impl Into<String>) -> Self {
        Self::Statement(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a key cardinality error
    pub fn is_key_cardinality(&self) -> bool {
        matches!(self, Self::KeyCardinality { .. })
    }
}

impl From<serde_json::Error> for DbalError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
