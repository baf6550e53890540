//! Error types for jobtrail-core

use thiserror::Error;

/// Result type alias using jobtrail-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in jobtrail-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A live query could not be established or failed mid-stream
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// The store rejected an ordered query because the backing composite
    /// index does not exist; callers may retry without the order clause
    #[error("Missing index for ordered query: {0}")]
    MissingIndex(String),

    /// A create/update/delete against the store failed
    #[error("Write error: {0}")]
    Write(String),

    /// A mutation targeted a document that does not exist or is not owned
    /// by the caller
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV import/export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
