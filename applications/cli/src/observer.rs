//! Console status display

use sonora_playback::PlaybackObserver;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// Prints track changes and state transitions
///
/// Progress is only logged, at `debug` level, to keep the prompt readable.
pub struct ConsoleObserver {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleObserver {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    fn print(&self, message: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{}", message).and_then(|()| out.flush()) {
            tracing::warn!("Failed to write status: {}", e);
        }
    }
}

impl PlaybackObserver for ConsoleObserver {
    fn on_playback_started(&self) {
        self.print("[playing]");
    }

    fn on_playback_paused(&self) {
        self.print("[paused]");
    }

    fn on_playback_stopped(&self) {
        self.print("[stopped]");
    }

    fn on_track_changed(&self, uri: &str) {
        self.print(&format!("Now playing: {}", uri));
    }

    fn on_playback_progress(&self, position: f64, duration: f64) {
        tracing::debug!("Progress {:.1}s / {:.1}s", position, duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Writer appending into a shared buffer
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn prints_track_and_state_changes() {
        let buffer = SharedBuffer::default();
        let observer = ConsoleObserver::new(Box::new(buffer.clone()));

        observer.on_track_changed("a.mp3");
        observer.on_playback_started();
        observer.on_playback_progress(1.0, 2.0);
        observer.on_playback_paused();
        observer.on_playback_stopped();

        let printed = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert_eq!(
            printed,
            "Now playing: a.mp3\n[playing]\n[paused]\n[stopped]\n"
        );
    }
}
