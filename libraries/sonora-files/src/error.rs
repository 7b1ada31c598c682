//! Error types for library file access

use thiserror::Error;

/// File provider errors
#[derive(Debug, Error)]
pub enum FilesError {
    /// No file exists at the requested path
    #[error("File not found: {0}")]
    NotFound(String),

    /// The requested path is a directory
    #[error("Not a file: {0}")]
    NotAFile(String),

    /// The requested directory does not exist
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// The requested path escapes the provider root
    #[error("Path outside library root: {0}")]
    OutsideRoot(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking task was cancelled or panicked
    #[error("Background task failed: {0}")]
    Task(String),
}

/// Result type for file provider operations
pub type Result<T> = std::result::Result<T, FilesError>;

impl From<tokio::task::JoinError> for FilesError {
    fn from(err: tokio::task::JoinError) -> Self {
        FilesError::Task(err.to_string())
    }
}
