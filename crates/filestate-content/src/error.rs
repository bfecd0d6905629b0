//! Error types for filestate-content

/// Result type for filestate-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur building a text mutator
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid regular expression '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error("Invalid comment marker '{marker}': {reason}")]
    InvalidMarker { marker: String, reason: String },
}

impl Error {
    pub(crate) fn regex(pattern: &str, err: regex::Error) -> Self {
        Self::InvalidRegex {
            pattern: pattern.to_string(),
            message: err.to_string(),
        }
    }
}
