//! Error types for the I/O collaborators. The engine itself never fails.

use std::path::PathBuf;

use thiserror::Error;

/// Persistence store failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("session not found: {0}")]
    SessionNotFound(u64),

    #[error("{} has schema version {found}, expected {expected}", path.display())]
    SchemaMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}

/// A single word-source attempt failed. Callers fall through to the next
/// source rather than surfacing this.
#[derive(Error, Debug)]
pub enum WordSourceError {
    #[error("network support disabled")]
    Disabled,

    #[error("request failed: {0}")]
    Http(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("malformed word list: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no usable words in response")]
    Empty,
}
