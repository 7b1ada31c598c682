//! Error types for playback control

use thiserror::Error;

/// Playback errors
///
/// None of these reach the caller of a control operation as a hard fault:
/// the controller recovers locally by moving to `Stopped` and notifying
/// observers. They surface in logs and from the backend and registry APIs
/// themselves.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The rendering backend could not open a track
    #[error("Failed to open '{uri}': {reason}")]
    OpenFailure { uri: String, reason: String },

    /// An observer callback panicked during notification
    #[error("Observer {id} failed: {message}")]
    ObserverFailure { id: u64, message: String },

    /// A playback thread (worker or dispatcher) could not be spawned
    #[error("Failed to spawn {name} thread: {source}")]
    ThreadSpawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PlaybackError {
    /// Create an open failure for `uri`
    pub fn open_failure(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::OpenFailure {
            uri: uri.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_failure_message_names_track() {
        let err = PlaybackError::open_failure("a.mp3", "no such file");
        assert_eq!(err.to_string(), "Failed to open 'a.mp3': no such file");
    }
}
