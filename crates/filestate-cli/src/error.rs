//! Error types for filestate-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from filestate-core
    #[error(transparent)]
    Core(#[from] filestate_core::Error),

    /// Result could not be rendered as JSON
    #[error("Failed to render JSON output: {0}")]
    Json(#[from] serde_json::Error),

    /// Logging could not be initialized
    #[error("Failed to initialize logging: {message}")]
    Logging { message: String },
}
