//! Storage-specific error types.
//!
//! All persistence operations return [`StorageError`] on failure, which can be
//! matched to determine the underlying cause (open failure, schema, database,
//! serialization). A missing record is not an error: `get` returns `Ok(None)`.

use thiserror::Error;

/// Errors that can occur in the persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Opening the database failed. Fatal to every dependent operation.
    #[error("storage unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    /// The on-disk schema does not match the declared collections.
    #[error("schema mismatch: {0}")]
    Schema(String),

    /// Operation named a collection the schema does not declare.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    /// Operation named an index the collection does not declare.
    #[error("unknown index {index} on collection {collection}")]
    UnknownIndex {
        /// Collection the lookup ran against.
        collection: String,
        /// Requested index name.
        index: String,
    },

    /// Index key has the wrong number of components for the index.
    #[error("index {index} expects {expected} key component(s), got {got}")]
    IndexKeyArity {
        /// Index the key was built for.
        index: String,
        /// Number of columns the index declares.
        expected: usize,
        /// Number of components the caller supplied.
        got: usize,
    },

    /// Record cannot be stored (e.g. missing its primary key field).
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Database operation failed (sqlx error).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
