//! Playback worker
//!
//! One background thread per active track. It opens the track through the
//! rendering backend, advances the shared clock while the controller is in
//! `Playing`, reports progress to observers, and hands completion back to
//! the controller as a message.
//!
//! ## Architecture
//!
//! ```text
//! Player (caller thread)        Worker thread              Dispatcher thread
//!        │  spawn(generation)        │                            │
//!        │──────────────────────────>│ backend.open(uri)          │
//!        │                           │ loop: tick, progress       │
//!        │                           │                            │
//!        │                           │  Completed / OpenFailed    │
//!        │                           │───────────────────────────>│
//!        │                           │ (exits)                    │ player.next() / stop()
//!        │  retire(): drop stop_tx   │                            │
//!        │──────────────────────────>│ close resource, exit       │
//!        │  join()                   │                            │
//! ```
//!
//! The worker never takes the controller lock, so the controller may join
//! it while holding that lock.

use crate::backend::RenderBackend;
use crate::error::{PlaybackError, Result};
use crate::events::PlaybackEvent;
use crate::observer::ObserverRegistry;
use crate::state::{AtomicPlaybackState, PlaybackClock};
use crate::types::PlaybackState;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Messages delivered to the controller's dispatcher thread
#[derive(Debug)]
pub(crate) enum ControllerMessage {
    /// Worker `generation` played its track to the end
    Completed { generation: u64, uri: String },

    /// Worker `generation` could not open its track
    OpenFailed {
        generation: u64,
        error: PlaybackError,
    },

    /// The player is shutting down
    Shutdown,
}

/// Everything a worker needs from the controller
///
/// Deliberately excludes the controller's locked core: the worker reads the
/// atomic state, writes the clock, and reports through `reports`.
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub backend: Arc<dyn RenderBackend>,
    pub state: Arc<AtomicPlaybackState>,
    pub clock: Arc<PlaybackClock>,
    pub observers: Arc<ObserverRegistry>,
    pub reports: Sender<ControllerMessage>,
    pub poll_interval: Duration,
    pub fallback_duration: f64,
}

/// Controller-side handle to a running worker
pub(crate) struct WorkerHandle {
    generation: u64,
    uri: String,
    /// Dropping this sender is the stop signal
    stop_tx: Sender<()>,
    thread: JoinHandle<()>,
}

impl WorkerHandle {
    /// Start a worker for `uri`
    pub fn spawn(context: WorkerContext, generation: u64, uri: String) -> Result<Self> {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let worker_uri = uri.clone();

        let thread = thread::Builder::new()
            .name(format!("playback-worker-{}", generation))
            .spawn(move || run(context, generation, worker_uri, stop_rx))
            .map_err(|source| PlaybackError::ThreadSpawn {
                name: "playback-worker".to_string(),
                source,
            })?;

        tracing::debug!("Worker {} started for '{}'", generation, uri);

        Ok(Self {
            generation,
            uri,
            stop_tx,
            thread,
        })
    }

    /// Signal the worker to stop and wait for it to exit
    pub fn retire(self) {
        let Self {
            generation,
            uri,
            stop_tx,
            thread,
        } = self;

        drop(stop_tx);

        if thread.thread().id() == thread::current().id() {
            // Joining ourselves would never return; the loop exits on its own.
            tracing::warn!("Worker {} asked to retire itself, detaching", generation);
            return;
        }

        if thread.join().is_err() {
            tracing::warn!("Worker {} for '{}' panicked", generation, uri);
        } else {
            tracing::debug!("Worker {} for '{}' retired", generation, uri);
        }
    }
}

/// Worker thread body
fn run(context: WorkerContext, generation: u64, uri: String, stop_rx: Receiver<()>) {
    let resource = match context.backend.open(&uri) {
        Ok(resource) => resource,
        Err(error) => {
            tracing::warn!("Worker {}: {}", generation, error);
            // Single attempt; the controller moves to Stopped and notifies.
            let _ = context
                .reports
                .send(ControllerMessage::OpenFailed { generation, error });
            return;
        }
    };

    let duration = resource
        .duration()
        .map(|d| d.as_secs_f64())
        .filter(|d| *d > 0.0)
        .unwrap_or(context.fallback_duration);
    context.clock.set_duration(duration);

    // `None` while paused: the interval spanning a pause is never counted
    let mut last_tick = Some(Instant::now());
    let mut completed = false;

    loop {
        match stop_rx.recv_timeout(context.poll_interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }

        let now = Instant::now();
        if context.state.load() != PlaybackState::Playing {
            last_tick = None;
            continue;
        }
        let Some(previous) = last_tick.replace(now) else {
            continue;
        };

        let mut position = context.clock.advance(now.duration_since(previous).as_secs_f64());
        if position >= duration {
            position = context.clock.set_position(duration);
            completed = true;
        }

        // Paused or stopped while advancing
        if !completed && context.state.load() != PlaybackState::Playing {
            last_tick = None;
            continue;
        }

        context
            .observers
            .notify(&PlaybackEvent::Progress { position, duration });

        if completed {
            break;
        }
    }

    context.backend.close(resource);

    if completed {
        tracing::debug!("Worker {} finished '{}'", generation, uri);
        let _ = context
            .reports
            .send(ControllerMessage::Completed { generation, uri });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SimulatedBackend;
    use crate::observer::ChannelObserver;
    use crossbeam_channel::unbounded;

    struct Fixture {
        backend: Arc<SimulatedBackend>,
        context: WorkerContext,
        reports: Receiver<ControllerMessage>,
        events: Receiver<PlaybackEvent>,
    }

    fn fixture(duration: Option<Duration>) -> Fixture {
        let backend = Arc::new(match duration {
            Some(d) => SimulatedBackend::with_duration(d),
            None => SimulatedBackend::new(),
        });
        let observers = Arc::new(ObserverRegistry::new());
        let (event_tx, events) = unbounded();
        observers.add(Arc::new(ChannelObserver::new(event_tx)));
        let (reports_tx, reports) = unbounded();

        let context = WorkerContext {
            backend: backend.clone(),
            state: Arc::new(AtomicPlaybackState::new(PlaybackState::Playing)),
            clock: Arc::new(PlaybackClock::new()),
            observers,
            reports: reports_tx,
            poll_interval: Duration::from_millis(5),
            fallback_duration: 0.05,
        };

        Fixture {
            backend,
            context,
            reports,
            events,
        }
    }

    #[test]
    fn completes_and_reports_once() {
        let f = fixture(Some(Duration::from_millis(40)));
        let worker = WorkerHandle::spawn(f.context.clone(), 7, "a.mp3".into()).unwrap();

        match f.reports.recv_timeout(Duration::from_secs(2)).unwrap() {
            ControllerMessage::Completed { generation, uri } => {
                assert_eq!(generation, 7);
                assert_eq!(uri, "a.mp3");
            }
            other => panic!("unexpected report {:?}", other),
        }
        worker.retire();

        assert!(f.reports.try_recv().is_err());
        assert_eq!(f.backend.closed(), 1);

        let progress: Vec<_> = f.events.try_iter().collect();
        assert!(!progress.is_empty());
        assert_eq!(
            progress.last(),
            Some(&PlaybackEvent::Progress {
                position: 0.04,
                duration: 0.04
            })
        );
    }

    #[test]
    fn uses_fallback_duration_when_backend_has_none() {
        let f = fixture(None);
        let worker = WorkerHandle::spawn(f.context.clone(), 1, "a.mp3".into()).unwrap();

        assert!(matches!(
            f.reports.recv_timeout(Duration::from_secs(2)).unwrap(),
            ControllerMessage::Completed { .. }
        ));
        worker.retire();
        assert_eq!(f.context.clock.duration(), 0.05);
    }

    #[test]
    fn open_failure_is_reported_without_events() {
        let f = fixture(None);
        f.backend.reject("bad.mp3");

        let worker = WorkerHandle::spawn(f.context.clone(), 3, "bad.mp3".into()).unwrap();
        match f.reports.recv_timeout(Duration::from_secs(2)).unwrap() {
            ControllerMessage::OpenFailed { generation, error } => {
                assert_eq!(generation, 3);
                assert!(matches!(error, PlaybackError::OpenFailure { .. }));
            }
            other => panic!("unexpected report {:?}", other),
        }
        worker.retire();

        assert!(f.events.try_recv().is_err());
        assert_eq!(f.backend.closed(), 0);
    }

    #[test]
    fn stop_signal_releases_resource_silently() {
        let f = fixture(Some(Duration::from_secs(600)));
        let worker = WorkerHandle::spawn(f.context.clone(), 1, "long.mp3".into()).unwrap();

        thread::sleep(Duration::from_millis(30));
        worker.retire();

        assert_eq!(f.backend.closed(), 1);
        assert!(f.reports.try_recv().is_err());
    }

    #[test]
    fn paused_state_freezes_position() {
        let f = fixture(Some(Duration::from_secs(600)));
        f.context.state.store(PlaybackState::Paused);

        let worker = WorkerHandle::spawn(f.context.clone(), 1, "a.mp3".into()).unwrap();
        thread::sleep(Duration::from_millis(40));
        assert_eq!(f.context.clock.position(), 0.0);
        assert!(f.events.try_recv().is_err());

        f.context.state.store(PlaybackState::Playing);
        thread::sleep(Duration::from_millis(40));
        assert!(f.context.clock.position() > 0.0);

        worker.retire();
    }

    #[test]
    fn resume_does_not_count_paused_time() {
        let mut f = fixture(Some(Duration::from_secs(600)));
        f.context.poll_interval = Duration::from_millis(100);
        f.context.state.store(PlaybackState::Paused);

        let worker = WorkerHandle::spawn(f.context.clone(), 1, "a.mp3".into()).unwrap();
        // Ticks at ~100ms (paused) and ~200ms (first playing tick)
        thread::sleep(Duration::from_millis(150));
        f.context.state.store(PlaybackState::Playing);
        thread::sleep(Duration::from_millis(100));

        assert_eq!(f.context.clock.position(), 0.0);
        assert!(f.events.try_recv().is_err());

        worker.retire();
    }
}
