//! Error types for Folio

use thiserror::Error;

/// Main error type for Folio engine operations
///
/// User-correctable form problems are not errors at this level; see
/// [`crate::rules::form::FieldError`] and [`crate::rules::form::SubmitOutcome`].
#[derive(Error, Debug)]
pub enum FolioError {
    /// An element a rule group binds to is absent from the document
    #[error("Missing DOM target: {0}")]
    MissingDomTarget(String),

    /// An in-page link points at a fragment with no matching element
    #[error("Fragment target not found: {0}")]
    FragmentNotFound(String),

    /// Selector text could not be parsed
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// Engine configuration is malformed
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Error during preference storage operations
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database creation/opening error
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    /// Transaction error
    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    /// Table error
    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    /// Storage operation error
    #[error("Storage operation error: {0}")]
    StorageOp(#[from] redb::StorageError),

    /// Commit error
    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    /// Error during serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Replay script is malformed or refers to missing elements
    #[error("Script error: {0}")]
    Script(String),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using FolioError
pub type FolioResult<T> = Result<T, FolioError>;

impl FolioError {
    /// Shorthand for a missing bound element
    pub fn missing(what: impl Into<String>) -> Self {
        FolioError::MissingDomTarget(what.into())
    }
}
