//! Scoped periodic timer.
//!
//! A [`Ticker`] owns a thread that calls its callback once per interval.
//! Dropping the ticker stops and joins that thread, so once `drop`
//! returns the callback will never run again.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub struct Ticker {
    stop_tx: Option<Sender<()>>,
    handle:  Option<JoinHandle<()>>,
}

impl Ticker {
    /// Start ticking.  The first call happens one `interval` from now.
    /// The thread exits early if `on_tick` returns `false`.
    pub fn start<F>(interval: Duration, mut on_tick: F) -> Ticker
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if !on_tick() { return; }
                }
                // Explicit stop or the ticker was dropped.
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            }
        });
        Ticker { stop_tx: Some(stop_tx), handle: Some(handle) }
    }

    /// Stop and join.  Same as dropping.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
