//! Error types for palate-state

use thiserror::Error;

/// Errors raised while connecting to or preparing the database
#[derive(Error, Debug)]
pub enum StateError {
    /// Database connection error
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// Schema setup error
    #[error("Schema setup failed: {0}")]
    SchemaSetup(String),

    /// Invalid store configuration
    #[error("Invalid store configuration: {0}")]
    Config(String),
}

/// Errors raised by directory and review store operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backend rejected or failed the operation
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Text that is not a well-formed record identifier
    #[error("invalid record id: {value:?}")]
    InvalidRecordId { value: String },

    /// No session could be acquired before the deadline
    #[error("no store session available within {waited_ms}ms")]
    PoolExhausted { waited_ms: u64 },

    /// A stored row could not be mapped back to a record
    #[error("stored record is malformed: {0}")]
    Serialization(String),
}

impl From<surrealdb::Error> for StorageError {
    fn from(err: surrealdb::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}
