//! Lock-free playback status shared between the controller and its worker
//!
//! The state is a single atomic enumeration so composite reads such as
//! "playing and not paused" can never observe a torn pair of flags.
//! Position and duration are `f64` seconds stored as raw bits.

use crate::types::PlaybackState;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Atomic cell holding a [`PlaybackState`]
#[derive(Debug, Default)]
pub struct AtomicPlaybackState(AtomicU8);

impl AtomicPlaybackState {
    pub fn new(state: PlaybackState) -> Self {
        Self(AtomicU8::new(state.as_u8()))
    }

    pub fn load(&self) -> PlaybackState {
        PlaybackState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, state: PlaybackState) {
        self.0.store(state.as_u8(), Ordering::Release);
    }

    /// Transition `from -> to`, returning whether the transition happened
    pub fn transition(&self, from: PlaybackState, to: PlaybackState) -> bool {
        self.0
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Position and duration of the current track, in seconds
#[derive(Debug, Default)]
pub struct PlaybackClock {
    position: AtomicU64,
    duration: AtomicU64,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> f64 {
        f64::from_bits(self.position.load(Ordering::Acquire))
    }

    pub fn duration(&self) -> f64 {
        f64::from_bits(self.duration.load(Ordering::Acquire))
    }

    /// Set the position, clamped to `0.0`
    pub fn set_position(&self, seconds: f64) -> f64 {
        let seconds = clamp_seconds(seconds);
        self.position.store(seconds.to_bits(), Ordering::Release);
        seconds
    }

    pub fn set_duration(&self, seconds: f64) {
        self.duration
            .store(clamp_seconds(seconds).to_bits(), Ordering::Release);
    }

    /// Add `delta` seconds to the position and return the new value
    ///
    /// Performed as a single read-modify-write so a concurrent `seek`
    /// is never overwritten by a stale tick.
    pub fn advance(&self, delta: f64) -> f64 {
        let delta = clamp_seconds(delta);
        let previous = self
            .position
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                Some((f64::from_bits(bits) + delta).to_bits())
            })
            .unwrap_or_else(|bits| bits);
        f64::from_bits(previous) + delta
    }

    /// Zero both position and duration until the next track reports its length
    pub fn reset(&self) {
        self.position.store(0f64.to_bits(), Ordering::Release);
        self.duration.store(0f64.to_bits(), Ordering::Release);
    }
}

fn clamp_seconds(seconds: f64) -> f64 {
    if seconds.is_finite() {
        seconds.max(0.0)
    } else if seconds == f64::INFINITY {
        f64::MAX
    } else {
        0.0
    }
}
