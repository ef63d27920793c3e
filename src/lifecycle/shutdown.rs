//! Shutdown coordination.

use tokio::sync::watch;

/// Coordinator for graceful shutdown.
///
/// Hands out cloneable listeners; triggering flips a watch flag that every
/// listener observes, including ones created after the trigger.
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Create a listener for a task that should stop on shutdown.
    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Signal all listeners to stop.
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// A handle that resolves once shutdown has been triggered.
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Wait until shutdown is triggered. Returns immediately if it already
    /// was.
    pub async fn wait(&mut self) {
        // An Err means the coordinator is gone, which counts as shutdown.
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}
