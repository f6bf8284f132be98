//! Background sweeper thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use tracing::{debug, warn};

use super::MatchRegistry;

/// Stops the sweeper when shut down or dropped.
#[derive(Debug)]
pub struct SweeperHandle {
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Signal the sweeper and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        // Dropping the sender disconnects the channel, which wakes the thread.
        self.stop.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("sweeper thread panicked");
            }
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

impl MatchRegistry {
    /// Sweep every `interval` on a background thread.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> SweeperHandle {
        let (stop, stopped) = bounded::<()>(1);
        let registry = Arc::clone(self);
        let thread = thread::spawn(move || loop {
            match stopped.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => match registry.sweep(Instant::now()) {
                    Ok(evicted) if !evicted.is_empty() => debug!(?evicted, "sweeper pass"),
                    Ok(_) => {}
                    Err(err) => warn!(error = %err, "sweep failed"),
                },
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        SweeperHandle {
            stop: Some(stop),
            thread: Some(thread),
        }
    }
}
