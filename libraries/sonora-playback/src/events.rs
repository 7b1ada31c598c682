//! Playback Events
//!
//! Lifecycle notifications delivered to registered observers:
//! - Track changes (on every `play`, including repeat restarts)
//! - State changes (started/resumed, paused, stopped)
//! - Position updates (every worker tick, and on `seek`)

use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Playback started, or resumed from pause
    Started,

    /// Playback paused mid-track
    Paused,

    /// Playback stopped (explicitly, queue exhausted, or open failure)
    Stopped,

    /// A new track became current
    TrackChanged {
        /// Identifier of the new track
        uri: String,
    },

    /// Position update
    Progress {
        /// Current position in seconds
        position: f64,
        /// Track duration in seconds
        duration: f64,
    },
}

impl PlaybackEvent {
    /// Short name used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackEvent::Started => "started",
            PlaybackEvent::Paused => "paused",
            PlaybackEvent::Stopped => "stopped",
            PlaybackEvent::TrackChanged { .. } => "track-changed",
            PlaybackEvent::Progress { .. } => "progress",
        }
    }
}

/// Observer of playback lifecycle events
///
/// Callbacks run synchronously on the thread that produced the event (the
/// caller of a control operation, or the playback worker for progress).
/// They must return promptly and must not call back into the `Player`;
/// control operations hold the controller lock while notifying.
///
/// A panicking callback is caught and logged; it never reaches playback
/// logic or prevents later observers from being notified.
pub trait PlaybackObserver: Send + Sync {
    fn on_playback_started(&self) {}

    fn on_playback_paused(&self) {}

    fn on_playback_stopped(&self) {}

    fn on_track_changed(&self, uri: &str) {
        let _ = uri;
    }

    fn on_playback_progress(&self, position: f64, duration: f64) {
        let _ = (position, duration);
    }

    /// Dispatch a [`PlaybackEvent`] to the matching callback
    fn on_event(&self, event: &PlaybackEvent) {
        match event {
            PlaybackEvent::Started => self.on_playback_started(),
            PlaybackEvent::Paused => self.on_playback_paused(),
            PlaybackEvent::Stopped => self.on_playback_stopped(),
            PlaybackEvent::TrackChanged { uri } => self.on_track_changed(uri),
            PlaybackEvent::Progress { position, duration } => {
                self.on_playback_progress(*position, *duration);
            }
        }
    }
}
