//! Playback controller
//!
//! [`Player`] owns the queue, the observer registry and the playback state,
//! and drives at most one [`WorkerHandle`] at a time.
//!
//! Control operations serialize on one mutex. The worker never takes that
//! mutex; it reports completion and open failures to a dispatcher thread,
//! which re-enters the controller under the same lock. Every report carries
//! the worker's generation, and reports from superseded workers are dropped.

use crate::backend::RenderBackend;
use crate::error::{PlaybackError, Result};
use crate::events::{PlaybackEvent, PlaybackObserver};
use crate::observer::{ObserverId, ObserverRegistry};
use crate::queue::TrackQueue;
use crate::state::{AtomicPlaybackState, PlaybackClock};
use crate::types::{PlaybackConfig, PlaybackState, RepeatMode};
use crate::worker::{ControllerMessage, WorkerContext, WorkerHandle};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, JoinHandle};

/// Point-in-time view of the controller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStatus {
    pub state: PlaybackState,
    pub current_track: Option<String>,
    pub position: f64,
    pub duration: f64,
    pub repeat: RepeatMode,
    pub shuffle: bool,
    pub queue_len: usize,
}

/// State guarded by the controller mutex
struct Core {
    current_track: Option<String>,
    repeat: RepeatMode,
    shuffle: bool,
    worker: Option<WorkerHandle>,
    /// Bumped on every start and stop; identifies the live worker
    generation: u64,
}

struct Inner {
    core: Mutex<Core>,
    queue: TrackQueue,
    observers: Arc<ObserverRegistry>,
    state: Arc<AtomicPlaybackState>,
    clock: Arc<PlaybackClock>,
    backend: Arc<dyn RenderBackend>,
    reports: Sender<ControllerMessage>,
    config: PlaybackConfig,
}

/// Single-track playback controller
///
/// # Example
///
/// ```
/// use sonora_playback::{PlaybackConfig, Player, SimulatedBackend};
/// use std::sync::Arc;
///
/// let player = Player::new(PlaybackConfig::default(), Arc::new(SimulatedBackend::new())).unwrap();
/// player.play("intro.mp3");
/// assert!(player.is_playing());
///
/// player.pause();
/// assert!(!player.is_playing());
///
/// player.stop();
/// ```
///
/// Observers are called synchronously from the caller's thread and from
/// playback threads, and must not call back into the `Player`.
pub struct Player {
    inner: Arc<Inner>,
    dispatcher: Option<JoinHandle<()>>,
}

impl Player {
    /// Create a stopped player with an empty queue
    pub fn new(config: PlaybackConfig, backend: Arc<dyn RenderBackend>) -> Result<Self> {
        config.validate()?;

        let (reports, receiver) = unbounded();
        let inner = Arc::new(Inner {
            core: Mutex::new(Core {
                current_track: None,
                repeat: config.repeat,
                shuffle: config.shuffle,
                worker: None,
                generation: 0,
            }),
            queue: TrackQueue::new(),
            observers: Arc::new(ObserverRegistry::new()),
            state: Arc::new(AtomicPlaybackState::new(PlaybackState::Stopped)),
            clock: Arc::new(PlaybackClock::new()),
            backend,
            reports,
            config,
        });

        let weak = Arc::downgrade(&inner);
        let dispatcher = thread::Builder::new()
            .name("playback-dispatcher".to_string())
            .spawn(move || dispatch(weak, receiver))
            .map_err(|source| PlaybackError::ThreadSpawn {
                name: "playback-dispatcher".to_string(),
                source,
            })?;

        Ok(Self {
            inner,
            dispatcher: Some(dispatcher),
        })
    }

    /// Stop whatever is playing, make `uri` the sole queue entry and play it
    pub fn play(&self, uri: impl Into<String>) {
        let uri = uri.into();
        tracing::info!("Playing '{}'", uri);

        let mut core = self.inner.lock();
        self.inner.stop_locked(&mut core);
        self.inner.queue.replace_with(uri.clone());
        self.inner.start_locked(&mut core, uri);
    }

    /// Pause playback (no-op unless playing)
    pub fn pause(&self) {
        let _core = self.inner.lock();
        if self
            .inner
            .state
            .transition(PlaybackState::Playing, PlaybackState::Paused)
        {
            tracing::debug!("Paused");
            self.inner.observers.notify(&PlaybackEvent::Paused);
        }
    }

    /// Resume playback (no-op unless paused)
    pub fn resume(&self) {
        let _core = self.inner.lock();
        if self
            .inner
            .state
            .transition(PlaybackState::Paused, PlaybackState::Playing)
        {
            tracing::debug!("Resumed");
            self.inner.observers.notify(&PlaybackEvent::Started);
        }
    }

    /// Stop playback and release the worker (idempotent)
    pub fn stop(&self) {
        let mut core = self.inner.lock();
        self.inner.stop_locked(&mut core);
    }

    /// Advance to the next queued track, or stop if there is none
    pub fn next(&self) {
        let mut core = self.inner.lock();
        self.inner.next_locked(&mut core);
    }

    /// Restart the current track, if any
    pub fn previous(&self) {
        let mut core = self.inner.lock();
        self.inner.replay_locked(&mut core);
    }

    /// Move the playback position (clamped to zero) and report it
    pub fn seek(&self, position: f64) {
        let _core = self.inner.lock();
        let position = self.inner.clock.set_position(position);
        let duration = self.inner.clock.duration();
        tracing::debug!("Seek to {:.2}s", position);
        self.inner
            .observers
            .notify(&PlaybackEvent::Progress { position, duration });
    }

    /// Append a track to the queue
    pub fn enqueue(&self, uri: impl Into<String>) {
        self.inner.queue.enqueue(uri);
    }

    /// Remove every queued track; playback continues
    pub fn clear_queue(&self) {
        self.inner.queue.clear();
    }

    pub fn set_repeat_mode(&self, mode: RepeatMode) {
        self.inner.lock().repeat = mode;
    }

    pub fn set_shuffle_mode(&self, enabled: bool) {
        self.inner.lock().shuffle = enabled;
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.inner.lock().repeat
    }

    pub fn shuffle_mode(&self) -> bool {
        self.inner.lock().shuffle
    }

    /// Position within the current track, in seconds
    pub fn current_position(&self) -> f64 {
        self.inner.clock.position()
    }

    /// Duration of the current track, in seconds
    pub fn duration(&self) -> f64 {
        self.inner.clock.duration()
    }

    /// True only in the `Playing` state
    pub fn is_playing(&self) -> bool {
        self.inner.state.load() == PlaybackState::Playing
    }

    pub fn state(&self) -> PlaybackState {
        self.inner.state.load()
    }

    pub fn current_track(&self) -> Option<String> {
        self.inner.lock().current_track.clone()
    }

    /// Copy of the queue, head (now playing) first
    pub fn queue(&self) -> Vec<String> {
        self.inner.queue.snapshot()
    }

    pub fn status(&self) -> PlayerStatus {
        let core = self.inner.lock();
        PlayerStatus {
            state: self.inner.state.load(),
            current_track: core.current_track.clone(),
            position: self.inner.clock.position(),
            duration: self.inner.clock.duration(),
            repeat: core.repeat,
            shuffle: core.shuffle,
            queue_len: self.inner.queue.len(),
        }
    }

    /// Register an observer for playback events
    pub fn add_observer(&self, observer: Arc<dyn PlaybackObserver>) -> ObserverId {
        self.inner.observers.add(observer)
    }

    /// Unregister an observer; unknown handles are ignored
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.inner.observers.remove(id)
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.inner.config
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
        let _ = self.inner.reports.send(ControllerMessage::Shutdown);
        if let Some(dispatcher) = self.dispatcher.take() {
            if dispatcher.join().is_err() {
                tracing::warn!("Playback dispatcher panicked");
            }
        }
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn worker_context(&self) -> WorkerContext {
        WorkerContext {
            backend: Arc::clone(&self.backend),
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
            observers: Arc::clone(&self.observers),
            reports: self.reports.clone(),
            poll_interval: self.config.poll_interval(),
            fallback_duration: self.config.fallback_duration_secs,
        }
    }

    /// Begin playing `uri` from position zero
    ///
    /// Observers hear about the new track before the worker exists, so
    /// track-changed and started always precede any progress.
    fn start_locked(&self, core: &mut Core, uri: String) {
        if let Some(stale) = core.worker.take() {
            stale.retire();
        }

        core.generation += 1;
        core.current_track = Some(uri.clone());
        self.clock.reset();
        self.state.store(PlaybackState::Playing);

        self.observers
            .notify(&PlaybackEvent::TrackChanged { uri: uri.clone() });
        self.observers.notify(&PlaybackEvent::Started);

        match WorkerHandle::spawn(self.worker_context(), core.generation, uri) {
            Ok(worker) => core.worker = Some(worker),
            Err(e) => {
                tracing::warn!("{}", e);
                self.stop_locked(core);
            }
        }
    }

    fn stop_locked(&self, core: &mut Core) {
        if self.state.load() == PlaybackState::Stopped {
            // A worker may linger after an open failure or completion race
            if let Some(worker) = core.worker.take() {
                worker.retire();
            }
            return;
        }

        self.state.store(PlaybackState::Stopped);
        core.generation += 1;
        if let Some(worker) = core.worker.take() {
            worker.retire();
        }

        core.current_track = None;
        self.clock.reset();

        tracing::debug!("Stopped");
        self.observers.notify(&PlaybackEvent::Stopped);
    }

    fn next_locked(&self, core: &mut Core) {
        let shuffle = core.shuffle;
        match self.queue.advance(shuffle) {
            Some(uri) => {
                tracing::info!("Next track '{}'", uri);
                self.stop_locked(core);
                self.start_locked(core, uri);
            }
            None => {
                tracing::debug!("Queue exhausted");
                self.stop_locked(core);
            }
        }
    }

    /// Play the current track again from the start, as `play` would
    fn replay_locked(&self, core: &mut Core) {
        let Some(uri) = core.current_track.clone() else {
            return;
        };
        self.stop_locked(core);
        self.queue.replace_with(uri.clone());
        self.start_locked(core, uri);
    }

    fn handle_report(&self, message: ControllerMessage) {
        let mut core = self.lock();
        match message {
            ControllerMessage::Completed { generation, uri } => {
                if generation != core.generation {
                    tracing::debug!("Discarding stale completion of '{}'", uri);
                    return;
                }

                tracing::debug!("Completed '{}' (repeat: {})", uri, core.repeat);
                match core.repeat {
                    RepeatMode::Single => self.replay_locked(&mut core),
                    RepeatMode::All => {
                        self.queue.enqueue(uri);
                        self.next_locked(&mut core);
                    }
                    RepeatMode::None => self.next_locked(&mut core),
                }
            }
            ControllerMessage::OpenFailed { generation, error } => {
                if generation != core.generation {
                    tracing::debug!("Discarding stale open failure: {}", error);
                    return;
                }
                tracing::warn!("Stopping playback: {}", error);
                self.stop_locked(&mut core);
            }
            ControllerMessage::Shutdown => {}
        }
    }
}

/// Dispatcher thread body
fn dispatch(inner: Weak<Inner>, receiver: Receiver<ControllerMessage>) {
    for message in receiver {
        if matches!(message, ControllerMessage::Shutdown) {
            break;
        }
        let Some(inner) = inner.upgrade() else {
            break;
        };
        inner.handle_report(message);
    }
    tracing::debug!("Playback dispatcher exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SimulatedBackend;
    use crate::observer::ChannelObserver;
    use std::time::Duration;

    const SETTLE_TIMEOUT: Duration = Duration::from_secs(2);

    fn player(duration: Duration) -> (Player, Arc<SimulatedBackend>) {
        let backend = Arc::new(SimulatedBackend::with_duration(duration));
        let config = PlaybackConfig {
            poll_interval_ms: 5,
            ..PlaybackConfig::default()
        };
        (Player::new(config, backend.clone()).unwrap(), backend)
    }

    #[test]
    fn rejects_invalid_config() {
        let config = PlaybackConfig {
            poll_interval_ms: 0,
            ..PlaybackConfig::default()
        };
        assert!(Player::new(config, Arc::new(SimulatedBackend::new())).is_err());
    }

    #[test]
    fn initial_status() {
        let (player, _) = player(Duration::from_secs(10));
        let status = player.status();
        assert_eq!(status.state, PlaybackState::Stopped);
        assert_eq!(status.current_track, None);
        assert_eq!(status.queue_len, 0);
        assert!(!player.is_playing());
    }

    #[test]
    fn stale_completion_is_discarded() {
        let (player, _) = player(Duration::from_secs(600));
        player.play("a.mp3");
        player.enqueue("b.mp3");

        let generation = player.inner.lock().generation;
        player.inner.handle_report(ControllerMessage::Completed {
            generation: generation - 1,
            uri: "a.mp3".into(),
        });

        assert_eq!(player.current_track().as_deref(), Some("a.mp3"));
        assert_eq!(player.queue(), vec!["a.mp3", "b.mp3"]);
    }

    #[test]
    fn current_completion_advances() {
        let (player, _) = player(Duration::from_secs(600));
        player.play("a.mp3");
        player.enqueue("b.mp3");

        let generation = player.inner.lock().generation;
        player.inner.handle_report(ControllerMessage::Completed {
            generation,
            uri: "a.mp3".into(),
        });

        assert_eq!(player.current_track().as_deref(), Some("b.mp3"));
        assert_eq!(player.queue(), vec!["b.mp3"]);
    }

    #[test]
    fn stop_retires_worker_and_closes_resource() {
        let (player, backend) = player(Duration::from_secs(600));
        let (tx, rx) = crossbeam_channel::unbounded();
        player.add_observer(Arc::new(ChannelObserver::new(tx)));

        player.play("a.mp3");
        // Wait for the worker to have opened the track
        rx.recv_timeout(SETTLE_TIMEOUT).unwrap();
        while backend.opened() == 0 {
            thread::sleep(Duration::from_millis(1));
        }
        player.stop();

        assert!(player.inner.lock().worker.is_none());
        assert_eq!(backend.closed(), 1);
    }
}
