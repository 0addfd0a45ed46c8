use std::time::Duration;

use tokio::{sync::watch, task::JoinHandle, time::Instant};
use tracing::{debug, info};

pub const DEFAULT_SPLASH_DELAY: Duration = Duration::from_millis(2000);

/// One-shot startup timer that flips `ready` from false to true after a fixed
/// delay. Cancelling (or dropping) the sequencer before the timer fires keeps
/// `ready` false for good.
pub struct BootstrapSequencer {
    ready: watch::Receiver<bool>,
    timer: Option<JoinHandle<()>>,
}

impl BootstrapSequencer {
    /// Must be called from within a tokio runtime.
    pub fn start(delay: Duration) -> Self {
        let (ready_tx, ready_rx) = watch::channel(false);
        let deadline = Instant::now() + delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            ready_tx.send_replace(true);
            info!(delay_ms = delay.as_millis() as u64, "bootstrap complete");
        });

        Self {
            ready: ready_rx,
            timer: Some(timer),
        }
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.ready.clone()
    }

    /// Resolves once the timer fired (`true`) or was cancelled (`false`).
    pub async fn wait_ready(&self) -> bool {
        let mut ready = self.ready.clone();
        let ok = ready.wait_for(|ready| *ready).await.is_ok();
        ok
    }

    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            if !timer.is_finished() {
                debug!("bootstrap timer cancelled before firing");
            }
            timer.abort();
        }
    }
}

impl Drop for BootstrapSequencer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[path = "tests/bootstrap_tests.rs"]
mod tests;
