//! Sonora - Playback Control
//!
//! Single-track playback controller with a track queue, repeat and shuffle
//! modes, and observer notification.
//!
//! This crate provides:
//! - Playback state machine (Stopped, Playing, Paused)
//! - FIFO track queue whose head is the track now playing
//! - Repeat modes (None, Single, All) and shuffle selection
//! - Observer registry with stable handles
//! - One background worker per track, simulating position from wall-clock time
//!
//! # Architecture
//!
//! `sonora-playback` never decodes or outputs audio. Opening a track is
//! delegated to a [`RenderBackend`]:
//! - [`SimulatedBackend`] opens anything and is driven purely by the clock
//! - [`ProbeBackend`] (feature `probe`) reads durations from local files
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use sonora_playback::{PlaybackConfig, Player, RepeatMode, SimulatedBackend};
//! use std::sync::Arc;
//!
//! let player = Player::new(PlaybackConfig::default(), Arc::new(SimulatedBackend::new())).unwrap();
//!
//! player.play("/music/first.mp3");
//! player.enqueue("/music/second.mp3");
//! assert_eq!(player.queue(), vec!["/music/first.mp3", "/music/second.mp3"]);
//!
//! player.set_repeat_mode(RepeatMode::All);
//! player.next();
//! assert_eq!(player.current_track().as_deref(), Some("/music/second.mp3"));
//! ```
//!
//! # Example: Observing Events
//!
//! ```rust
//! use sonora_playback::{PlaybackObserver, PlaybackConfig, Player, SimulatedBackend};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl PlaybackObserver for Printer {
//!     fn on_track_changed(&self, uri: &str) {
//!         println!("Now playing {}", uri);
//!     }
//! }
//!
//! let player = Player::new(PlaybackConfig::default(), Arc::new(SimulatedBackend::new())).unwrap();
//! let id = player.add_observer(Arc::new(Printer));
//! player.play("song.mp3");
//! assert!(player.remove_observer(id));
//! ```

mod backend;
mod error;
mod events;
mod observer;
mod player;
#[cfg(feature = "probe")]
mod probe;
mod queue;
mod shuffle;
mod state;
pub mod types;
mod worker;

// Public exports
pub use backend::{RenderBackend, RenderResource, SimulatedBackend, SimulatedResource};
pub use error::{PlaybackError, Result};
pub use events::{PlaybackEvent, PlaybackObserver};
pub use observer::{ChannelObserver, ObserverId, ObserverRegistry};
pub use player::{Player, PlayerStatus};
#[cfg(feature = "probe")]
pub use probe::{ProbeBackend, ProbeResource};
pub use queue::TrackQueue;
pub use types::{ParseRepeatModeError, PlaybackConfig, PlaybackState, RepeatMode};
