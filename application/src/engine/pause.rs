//! Pause gate
//!
//! Pausing is an instantaneous flag flip that takes effect at the engine's
//! next suspension checkpoint (before each turn, each voter, and each
//! revealed character). Built on a watch channel so waiting tasks park on
//! a change notification instead of polling a flag in a sleep loop.

use tokio::sync::watch;

/// Cloneable pause control shared between the engine task and its callers
#[derive(Debug, Clone)]
pub struct PauseGate {
    tx: watch::Sender<bool>,
}

impl PauseGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn pause(&self) {
        self.tx.send_replace(true);
    }

    pub fn resume(&self) {
        self.tx.send_replace(false);
    }

    /// Flip the flag, returning the new paused state
    pub fn toggle(&self) -> bool {
        let next = !*self.tx.borrow();
        self.tx.send_replace(next);
        next
    }

    pub fn is_paused(&self) -> bool {
        *self.tx.borrow()
    }

    /// Suspension checkpoint: returns immediately when not paused,
    /// otherwise parks until `resume` is called.
    pub async fn wait_until_resumed(&self) {
        let mut rx = self.tx.subscribe();
        while *rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}
