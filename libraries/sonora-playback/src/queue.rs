//! Track queue
//!
//! FIFO of track identifiers shared between the controller and the
//! playback worker's completion path. The entry at the head is the track
//! currently playing; everything behind it is pending.
//!
//! ```text
//! Head (now playing): c.mp3
//! ─────────────────────────
//! Pending:
//!   - a.mp3
//!   - b.mp3
//! ```

use crate::shuffle;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Synchronized FIFO of track identifiers
///
/// Duplicates are permitted. Every method takes the internal lock once, so
/// each call is atomic with respect to every other call.
#[derive(Debug, Default)]
pub struct TrackQueue {
    entries: Mutex<VecDeque<String>>,
}

impl TrackQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a track at the tail
    pub fn enqueue(&self, uri: impl Into<String>) {
        self.lock().push_back(uri.into());
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Remove and return the head
    pub fn pop_front(&self) -> Option<String> {
        self.lock().pop_front()
    }

    /// Replace the whole queue with a single entry
    pub fn replace_with(&self, uri: impl Into<String>) {
        let mut entries = self.lock();
        entries.clear();
        entries.push_back(uri.into());
    }

    /// Drop the head and return the new head, if there is one
    ///
    /// With at most one entry the queue counts as exhausted: nothing is
    /// removed and `None` is returned. The size check and the pop happen
    /// under one lock acquisition.
    ///
    /// When `shuffle` is set, the new head is drawn at random from the
    /// pending entries and moved to the front; identifiers themselves are
    /// never altered.
    pub fn advance(&self, shuffle: bool) -> Option<String> {
        let mut entries = self.lock();
        if entries.len() <= 1 {
            return None;
        }

        entries.pop_front();

        if shuffle && entries.len() > 1 {
            let index = shuffle::pick_index(entries.len());
            if let Some(picked) = entries.remove(index) {
                entries.push_front(picked);
            }
        }

        entries.front().cloned()
    }

    /// Peek at the head without removing it
    pub fn front(&self) -> Option<String> {
        self.lock().front().cloned()
    }

    /// Copy of all entries, head first
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
