//! CLI error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

/// Errors reported to the user at the prompt
///
/// None of these end the session; the REPL prints them and reads the next
/// line.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Unknown command: {0}\nType 'help' for a list of available commands.")]
    UnknownCommand(String),

    #[error("Usage: {usage}")]
    MissingArgument { usage: String },

    #[error("Invalid argument '{value}': {reason}\nUsage: {usage}")]
    InvalidArgument {
        value: String,
        reason: String,
        usage: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File error: {0}")]
    Files(#[from] sonora_files::FilesError),

    #[error("Playback error: {0}")]
    Playback(#[from] sonora_playback::PlaybackError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_messages() {
        let err = CliError::MissingArgument {
            usage: "play <file>".to_string(),
        };
        assert_eq!(err.to_string(), "Usage: play <file>");

        let err = CliError::InvalidArgument {
            value: "loud".to_string(),
            reason: "expected a number of seconds".to_string(),
            usage: "seek <seconds>".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid argument 'loud': expected a number of seconds\nUsage: seek <seconds>"
        );
    }
}
