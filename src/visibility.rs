//! Process-wide dashboard visibility signal.
//!
//! A single boolean owned by the app shell: `true` while the dashboard view
//! is shown, `false` while only the ambient status line is rendered. Pollers
//! subscribe to pause visibility-gated resources. Built on a watch channel so
//! a reader mounted after a transition still observes the latest value:
//! writes are never lost, and the current value is readable synchronously.

use tokio::sync::watch;

#[derive(Clone)]
pub struct VisibilitySignal {
    tx: watch::Sender<bool>,
}

impl VisibilitySignal {
    /// Starts hidden; the app shell flips it when the panel is first shown.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Record a show/hide transition. Redundant writes do not wake
    /// subscribers.
    pub fn set(&self, visible: bool) {
        self.tx.send_if_modified(|current| {
            if *current == visible {
                false
            } else {
                *current = visible;
                true
            }
        });
    }

    /// Current value, synchronously.
    pub fn get(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for VisibilitySignal {
    fn default() -> Self {
        Self::new()
    }
}
