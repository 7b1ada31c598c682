//! Core types for playback control

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Playback state
///
/// `Paused` is only ever entered from `Playing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No track loaded
    #[default]
    Stopped,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,
}

impl PlaybackState {
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            PlaybackState::Stopped => 0,
            PlaybackState::Playing => 1,
            PlaybackState::Paused => 2,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => PlaybackState::Playing,
            2 => PlaybackState::Paused,
            _ => PlaybackState::Stopped,
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Stopped => "stopped",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// Repeat mode, applied when a track completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Advance to the next queued track, stop when the queue runs out
    #[default]
    None,

    /// Restart the current track
    Single,

    /// Requeue the finished track at the tail, then advance
    All,
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RepeatMode::None => "none",
            RepeatMode::Single => "single",
            RepeatMode::All => "all",
        };
        f.write_str(name)
    }
}

/// Unrecognized repeat mode token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid repeat mode: {0} (expected none, single or all)")]
pub struct ParseRepeatModeError(pub String);

impl FromStr for RepeatMode {
    type Err = ParseRepeatModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(RepeatMode::None),
            "single" | "one" => Ok(RepeatMode::Single),
            "all" => Ok(RepeatMode::All),
            _ => Err(ParseRepeatModeError(s.to_string())),
        }
    }
}

/// Configuration for the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Worker polling interval in milliseconds (default: 100)
    pub poll_interval_ms: u64,

    /// Duration assumed when the backend cannot report one (default: 180s)
    pub fallback_duration_secs: f64,

    /// Initial repeat mode (default: None)
    pub repeat: RepeatMode,

    /// Initial shuffle mode (default: off)
    pub shuffle: bool,
}

impl PlaybackConfig {
    /// Worker polling interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Reject values the worker cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(crate::PlaybackError::InvalidConfig(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }

        if !self.fallback_duration_secs.is_finite() || self.fallback_duration_secs <= 0.0 {
            return Err(crate::PlaybackError::InvalidConfig(format!(
                "fallback_duration_secs must be positive, got {}",
                self.fallback_duration_secs
            )));
        }

        Ok(())
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            fallback_duration_secs: 180.0,
            repeat: RepeatMode::None,
            shuffle: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.fallback_duration_secs, 180.0);
        assert_eq!(config.repeat, RepeatMode::None);
        assert!(!config.shuffle);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_interval_and_bad_fallback() {
        let mut config = PlaybackConfig {
            poll_interval_ms: 0,
            ..PlaybackConfig::default()
        };
        assert!(config.validate().is_err());

        config.poll_interval_ms = 50;
        config.fallback_duration_secs = 0.0;
        assert!(config.validate().is_err());

        config.fallback_duration_secs = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn repeat_mode_parsing() {
        assert_eq!("none".parse::<RepeatMode>(), Ok(RepeatMode::None));
        assert_eq!("Single".parse::<RepeatMode>(), Ok(RepeatMode::Single));
        assert_eq!("ALL".parse::<RepeatMode>(), Ok(RepeatMode::All));
        assert_eq!(
            "sometimes".parse::<RepeatMode>(),
            Err(ParseRepeatModeError("sometimes".to_string()))
        );
    }

    #[test]
    fn state_round_trips_through_u8() {
        for state in [
            PlaybackState::Stopped,
            PlaybackState::Playing,
            PlaybackState::Paused,
        ] {
            assert_eq!(PlaybackState::from_u8(state.as_u8()), state);
        }
    }

    #[test]
    fn config_deserializes_with_partial_fields() {
        let config: PlaybackConfig =
            serde_json::from_str(r#"{"poll_interval_ms": 20, "repeat": "all"}"#).unwrap();
        assert_eq!(config.poll_interval_ms, 20);
        assert_eq!(config.repeat, RepeatMode::All);
        assert_eq!(config.fallback_duration_secs, 180.0);
    }
}
