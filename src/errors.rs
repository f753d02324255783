//! Error kinds the scan branches on. Everything else travels as `anyhow::Error`.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Bad input given to a run. Fatal and never retried.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot open term list {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("scan root {} is not a readable directory", .0.display())]
    NotADirectory(PathBuf),
}

/// Why the extraction service produced no text. Always recovered by the adapter.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("extraction timed out after {0:?}")]
    Timeout(Duration),
    #[error("extraction service unavailable at {endpoint}: {reason}")]
    ServiceUnavailable { endpoint: String, reason: String },
    #[error("unsupported or unreadable format")]
    Unsupported,
    #[error("extraction service returned HTTP {status}")]
    Service { status: u16 },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed extraction response: {0}")]
    Decode(String),
}

/// A record could not be stored.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("insert {path} failed: {source}")]
    Insert {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("commit {path} failed: {source}")]
    Commit {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    /// The insert failed and so did the rollback: the connection is in an unknown state.
    #[error("rollback after failed insert of {path} failed: {source}")]
    Rollback {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl PersistenceError {
    /// Insert and commit failures were rolled back and only lose this record.
    pub fn is_recovered(&self) -> bool {
        !matches!(self, PersistenceError::Rollback { .. })
    }
}

/// True when `err` (or anything in its chain) is an [`InputError`]; such errors skip the retry policy.
pub fn is_input_error(err: &anyhow::Error) -> bool {
    err.chain().any(|e| e.downcast_ref::<InputError>().is_some())
}
