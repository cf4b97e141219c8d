use quarry_bd::ImportError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SqliteStoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to encode issue payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("issue already exists: {0}")]
    IssueAlreadyExists(String),

    #[error("issue not found: {0}")]
    IssueNotFound(String),

    #[error("invalid issue prefix '{0}': must be non-empty and must not end with '-'")]
    InvalidPrefix(String),

    #[error("failed to create database directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a single-issue create running in its own transaction.
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error(transparent)]
    Store(#[from] SqliteStoreError),

    #[error(transparent)]
    Import(#[from] ImportError<SqliteStoreError>),
}

/// Failure of a batch import. Any failure means nothing was committed.
#[derive(Debug, thiserror::Error)]
pub enum BatchImportError {
    #[error(transparent)]
    Store(#[from] SqliteStoreError),

    #[error("import aborted at record {index} ({id}); nothing was committed: {source}")]
    Record {
        /// Position in the input, zero-based.
        index: usize,
        id: String,
        #[source]
        source: ImportError<SqliteStoreError>,
    },
}

pub(crate) fn has_extended_code(err: &rusqlite::Error, extended: std::ffi::c_int) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(failure, _) if failure.extended_code == extended)
}
