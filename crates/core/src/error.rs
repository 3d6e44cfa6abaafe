//! Error types for inkpipe.
//!
//! A single error enum covers every failure category of the content pipeline:
//! configuration, template loading and substitution, generation backends,
//! publishing, and version control.

use thiserror::Error;

/// Unified error type for inkpipe.
///
/// Every fallible function in the workspace returns `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing directory, unknown provider, or missing credential
    #[error("Configuration error: {0}")]
    Config(String),

    /// Template directory or style that does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing placeholder value or malformed stage header
    #[error("Template error: {0}")]
    Template(String),

    /// Transport failure or unparseable response from a generation service
    #[error("Backend error: {0}")]
    Backend(String),

    /// Local git process failure during add/commit/push
    #[error("VCS error: {0}")]
    Vcs(String),

    /// Invalid publish input or manifest contention
    #[error("Publish error: {0}")]
    Publish(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_category() {
        let err = AppError::Template("missing value for placeholder 'title'".to_string());
        assert_eq!(
            err.to_string(),
            "Template error: missing value for placeholder 'title'"
        );
    }

    #[test]
    fn test_json_error_converts_to_serialization() {
        let parse: Result<Vec<String>, _> = serde_json::from_str("not json");
        let err: AppError = parse.unwrap_err().into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
