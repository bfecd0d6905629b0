//! Error types for filestate-core

use std::path::PathBuf;
use std::time::Duration;

/// Result type for filestate-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling a declaration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unknown, missing or malformed parameters; raised before any I/O
    #[error("Invalid parameters for {kind}: {message}")]
    InvalidParameter { kind: String, message: String },

    /// The fetcher could not provide the resource
    #[error("Unable to fetch {uri}: {message}")]
    Fetch { uri: String, message: String },

    /// The fetch did not complete in time
    #[error("Fetching {uri} timed out after {}s", timeout.as_secs_f64())]
    FetchTimeout { uri: String, timeout: Duration },

    /// An existing entity is in the way and `force` was not set
    #[error("{path} exists and is {found}; set force to replace it")]
    Conflict { path: PathBuf, found: String },

    /// An existing entity has the wrong type for the declared state
    #[error("{path} is {found}, expected {expected}")]
    TypeConflict {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// A file or parent directory the state relies on does not exist
    #[error("{path} does not exist")]
    PathNotFound { path: PathBuf },

    /// A local mutation failed
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: filestate_fs::Error,
    },

    /// A mutation completed but the entity still differs from the declaration
    #[error("{path} did not converge: {message}")]
    Unconverged { path: PathBuf, message: String },

    /// The patch interpreter could not parse the patch
    #[error("Malformed patch: {message}")]
    PatchFormat { message: String },

    /// The patch does not apply to the target
    #[error("Patch rejected: {message}")]
    PatchRejected { message: String },

    /// No patch interpreter is installed
    #[error("Patch interpreter '{tool}' is not available")]
    ToolUnavailable { tool: String },

    /// A blocking task panicked or was cancelled
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// Filesystem error from filestate-fs
    #[error(transparent)]
    Fs(#[from] filestate_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid(kind: impl ToString, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            kind: kind.to_string(),
            message: message.into(),
        }
    }

    pub fn fetch(uri: impl Into<String>, message: impl ToString) -> Self {
        Self::Fetch {
            uri: uri.into(),
            message: message.to_string(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: filestate_fs::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    pub fn type_conflict(
        path: impl Into<PathBuf>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeConflict {
            path: path.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Structural errors abort a whole request, including every entry of a
    /// recursive sync.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. } | Self::ToolUnavailable { .. } | Self::Internal { .. }
        )
    }
}
