//! Rendering backend boundary
//!
//! The controller never decodes audio. Once per track the playback worker
//! asks a [`RenderBackend`] to open the track, reads its duration, and
//! hands the resource back through [`RenderBackend::close`] when the track
//! is retired.

use crate::error::{PlaybackError, Result};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Opaque resource for one opened track
pub trait RenderResource: Send {
    /// Identifier the resource was opened for
    fn uri(&self) -> &str;

    /// Total track duration, if the backend knows it
    fn duration(&self) -> Option<Duration>;
}

/// Opens and closes audio resources for track identifiers
///
/// Implementations are shared between the controller and its worker
/// threads, hence `Send + Sync`.
pub trait RenderBackend: Send + Sync {
    /// Open `uri` for playback
    ///
    /// # Returns
    /// * `Ok(resource)` - Track is ready
    /// * `Err(PlaybackError::OpenFailure)` - Track cannot be played
    fn open(&self, uri: &str) -> Result<Box<dyn RenderResource>>;

    /// Release a resource returned by `open`
    fn close(&self, resource: Box<dyn RenderResource>) {
        drop(resource);
    }
}

/// Resource handed out by [`SimulatedBackend`]
#[derive(Debug, Clone)]
pub struct SimulatedResource {
    uri: String,
    duration: Option<Duration>,
}

impl RenderResource for SimulatedResource {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }
}

/// Backend that opens every track without touching any file
///
/// Playback is then driven purely by wall-clock time. Specific identifiers
/// can be marked as unopenable, and the backend counts opens and closes.
#[derive(Debug, Default)]
pub struct SimulatedBackend {
    duration: Option<Duration>,
    rejected: Mutex<HashSet<String>>,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl SimulatedBackend {
    /// Backend reporting no duration (the controller's fallback applies)
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend reporting `duration` for every track
    pub fn with_duration(duration: Duration) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    /// Make every future `open(uri)` fail
    pub fn reject(&self, uri: impl Into<String>) {
        self.rejected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(uri.into());
    }

    /// Number of successful opens so far
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of resources returned through `close`
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

impl RenderBackend for SimulatedBackend {
    fn open(&self, uri: &str) -> Result<Box<dyn RenderResource>> {
        let rejected = self
            .rejected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(uri);
        if rejected {
            return Err(PlaybackError::open_failure(uri, "rejected by backend"));
        }

        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SimulatedResource {
            uri: uri.to_string(),
            duration: self.duration,
        }))
    }

    fn close(&self, resource: Box<dyn RenderResource>) {
        self.closed.fetch_add(1, Ordering::SeqCst);
        drop(resource);
    }
}
