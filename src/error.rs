//! Error types for batch background removal

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for batch operations
pub type Result<T> = std::result::Result<T, BatchError>;

/// Error types for batch background removal
///
/// Configuration and directory errors abort a whole batch. `Processing`
/// errors belong to a single file and are folded into that file's
/// [`crate::types::ProcessResult`] by the orchestrator.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Missing or invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Input directory does not exist or cannot be accessed
    #[error("Input directory does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Output directory does not exist and may not be created
    #[error("Output directory does not exist: {}", .0.display())]
    OutputNotFound(PathBuf),

    /// A path that must be a directory points at something else
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// A single file failed to process
    #[error("Failed to process '{file}': {message}")]
    Processing { file: String, message: String },

    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level failure talking to the removal service
    #[error("Network error: {0}")]
    Network(String),

    /// The removal service answered with a non-success status
    #[error("Removal API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
}

impl BatchError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new per-file processing error
    pub fn processing<F: Into<String>, S: Into<String>>(file: F, msg: S) -> Self {
        Self::Processing {
            file: file.into(),
            message: msg.into(),
        }
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create network error with operation context
    pub fn network_error<S: Into<String>, E: std::fmt::Display>(context: S, error: E) -> Self {
        Self::Network(format!("{}: {}", context.into(), error))
    }

    /// Whether this error aborts the whole batch rather than a single file
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::InputNotFound(_)
                | Self::OutputNotFound(_)
                | Self::NotADirectory(_)
        )
    }

    /// Message suitable for a failed [`crate::types::ProcessResult`]
    ///
    /// Processing errors already carry the file name in the result, so only
    /// the underlying message is kept for them.
    #[must_use]
    pub fn file_message(&self) -> String {
        match self {
            Self::Processing { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for BatchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Network(format!("request timed out: {}", error))
        } else {
            Self::Network(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let err = BatchError::config("missing API key");
        assert!(matches!(err, BatchError::Config(_)));

        let err = BatchError::processing("a.png", "boom");
        assert!(matches!(err, BatchError::Processing { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = BatchError::config("Missing API key");
        assert_eq!(err.to_string(), "Invalid configuration: Missing API key");

        let err = BatchError::InputNotFound(PathBuf::from("/nope/in"));
        assert_eq!(err.to_string(), "Input directory does not exist: /nope/in");

        let err = BatchError::OutputNotFound(PathBuf::from("/nope/out"));
        assert_eq!(err.to_string(), "Output directory does not exist: /nope/out");

        let err = BatchError::Api {
            status: 402,
            body: "insufficient credits".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Removal API returned HTTP 402: insufficient credits"
        );
    }

    #[test]
    fn test_file_io_error_context() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = BatchError::file_io_error("copy result", Path::new("/out/a.png"), &io_error);
        let error_string = err.to_string();
        assert!(error_string.contains("copy result"));
        assert!(error_string.contains("/out/a.png"));
        assert!(error_string.contains("access denied"));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(BatchError::config("x").is_fatal());
        assert!(BatchError::InputNotFound(PathBuf::from("in")).is_fatal());
        assert!(BatchError::OutputNotFound(PathBuf::from("out")).is_fatal());
        assert!(BatchError::NotADirectory(PathBuf::from("out")).is_fatal());
        assert!(!BatchError::processing("a.png", "x").is_fatal());
        assert!(!BatchError::Network("down".to_string()).is_fatal());
    }

    #[test]
    fn test_file_message_strips_file_prefix() {
        let err = BatchError::processing("a.png", "service unavailable");
        assert_eq!(err.file_message(), "service unavailable");

        let err = BatchError::Network("connection refused".to_string());
        assert_eq!(err.file_message(), "Network error: connection refused");
    }
}
