//! Observer registry
//!
//! Observers are keyed by a stable [`ObserverId`] handed out at registration,
//! so removal never depends on comparing trait objects. Registering the same
//! observer twice is allowed and yields two independent handles.

use crate::error::PlaybackError;
use crate::events::{PlaybackEvent, PlaybackObserver};
use crossbeam_channel::{Sender, TrySendError};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Handle identifying one registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl ObserverId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Synchronized list of observers, notified in registration order
///
/// The registry holds shared references only; it never outlives or
/// destroys the observers it holds.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Mutex<Vec<(ObserverId, Arc<dyn PlaybackObserver>)>>,
    next_id: AtomicU64,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer and return its handle
    pub fn add(&self, observer: Arc<dyn PlaybackObserver>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, observer));
        tracing::debug!("Registered observer {}", id);
        id
    }

    /// Remove the observer registered under `id`
    ///
    /// Returns false (and does nothing) if no such registration exists.
    pub fn remove(&self, id: ObserverId) -> bool {
        let mut observers = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match observers.iter().position(|(entry, _)| *entry == id) {
            Some(index) => {
                observers.remove(index);
                tracing::debug!("Removed observer {}", id);
                true
            }
            None => false,
        }
    }

    /// Number of registrations
    pub fn len(&self) -> usize {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every observer, in registration order
    ///
    /// The registry lock is held for the whole pass, so a concurrent
    /// add/remove waits until notification completes. A panicking observer
    /// is isolated: the failure is logged and returned, and the remaining
    /// observers are still notified.
    pub fn notify(&self, event: &PlaybackEvent) -> Vec<PlaybackError> {
        let observers = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut failures = Vec::new();
        for (id, observer) in observers.iter() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| observer.on_event(event)));
            if let Err(payload) = result {
                let failure = PlaybackError::ObserverFailure {
                    id: id.as_u64(),
                    message: panic_message(payload.as_ref()),
                };
                tracing::warn!("{} while handling '{}' event", failure, event.name());
                failures.push(failure);
            }
        }
        failures
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "observer panicked".to_string()
    }
}

/// Observer forwarding every event into a channel
///
/// Never blocks the notifying thread: when a bounded channel is full the
/// event is dropped.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: Sender<PlaybackEvent>,
}

impl ChannelObserver {
    pub fn new(sender: Sender<PlaybackEvent>) -> Self {
        Self { sender }
    }
}

impl PlaybackObserver for ChannelObserver {
    fn on_event(&self, event: &PlaybackEvent) {
        match self.sender.try_send(event.clone()) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(_)) => {
                tracing::debug!("Event channel full, dropping '{}' event", event.name());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    struct Panicking;

    impl PlaybackObserver for Panicking {
        fn on_playback_started(&self) {
            panic!("boom");
        }
    }

    #[test]
    fn notifies_in_registration_order() {
        let registry = ObserverRegistry::new();
        let (tx, rx) = unbounded();
        let first = Arc::new(ChannelObserver::new(tx.clone()));
        let (tx2, rx2) = unbounded();

        registry.add(first);
        registry.add(Arc::new(ChannelObserver::new(tx2)));
        registry.notify(&PlaybackEvent::Started);

        assert_eq!(rx.try_recv().unwrap(), PlaybackEvent::Started);
        assert_eq!(rx2.try_recv().unwrap(), PlaybackEvent::Started);
        drop(tx);
    }

    #[test]
    fn duplicate_registration_gets_distinct_handles() {
        let registry = ObserverRegistry::new();
        let (tx, rx) = unbounded();
        let observer: Arc<dyn PlaybackObserver> = Arc::new(ChannelObserver::new(tx));

        let a = registry.add(observer.clone());
        let b = registry.add(observer);
        assert_ne!(a, b);

        registry.notify(&PlaybackEvent::Paused);
        assert_eq!(rx.try_iter().count(), 2);

        assert!(registry.remove(a));
        registry.notify(&PlaybackEvent::Paused);
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn removing_unknown_handle_is_noop() {
        let registry = ObserverRegistry::new();
        let (tx, rx) = unbounded();
        let id = registry.add(Arc::new(ChannelObserver::new(tx)));

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert!(registry.is_empty());

        registry.notify(&PlaybackEvent::Stopped);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn panicking_observer_does_not_stop_notification() {
        let registry = ObserverRegistry::new();
        let (tx, rx) = unbounded();

        let bad = registry.add(Arc::new(Panicking));
        registry.add(Arc::new(ChannelObserver::new(tx)));

        let failures = registry.notify(&PlaybackEvent::Started);
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            &failures[0],
            PlaybackError::ObserverFailure { id, message } if *id == bad.as_u64() && message == "boom"
        ));
        assert_eq!(rx.try_recv().unwrap(), PlaybackEvent::Started);

        // Registry is still usable afterwards
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn full_channel_drops_instead_of_blocking() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let observer = ChannelObserver::new(tx);

        observer.on_event(&PlaybackEvent::Started);
        observer.on_event(&PlaybackEvent::Paused);

        assert_eq!(rx.try_recv().unwrap(), PlaybackEvent::Started);
        assert!(rx.try_recv().is_err());
    }
}
