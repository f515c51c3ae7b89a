//! Error types for codedb

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using codedb's Error
pub type Result<T> = std::result::Result<T, Error>;

/// codedb error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed database: {message}")]
    MalformedDatabase { message: String },

    #[error("malformed entity record: {message}")]
    MalformedRecord { message: String },

    #[error("unknown entity kind: {code}")]
    UnknownEntityKind { code: String },

    #[error("unclassifiable token tag: {tag}")]
    UnclassifiableTag { tag: String },

    #[error("database roots differ: {} vs {}", .left.display(), .right.display())]
    RootMismatch { left: PathBuf, right: PathBuf },
}
