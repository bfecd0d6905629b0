//! Error types for filestate-fs

use std::path::PathBuf;

/// Result type for filestate-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in filestate-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },

    #[error("Unknown hash algorithm: {name}")]
    UnknownHashAlgorithm { name: String },

    #[error("Invalid hash specification '{spec}': expected <algorithm>=<hex digest>")]
    InvalidHashSpec { spec: String },

    #[error("Invalid relative path '{path}': {reason}")]
    InvalidTreePath { path: String, reason: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is an I/O error caused by a missing file or directory.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
