//! Periodic position sampling
//!
//! The ticker only reads the transport (through a [`PositionProbe`]) and
//! writes the observed position into the state. It never drives playback.

use crate::state::{lock_store, SharedStore};
use needledrop_playback::PositionProbe;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Background task mirroring transport position into the state
pub struct PositionTicker {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PositionTicker {
    /// Start sampling every `interval` on the current tokio runtime
    pub fn spawn(probe: PositionProbe, store: SharedStore, interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticks.tick() => {
                        let position = probe.position();
                        lock_store(&store).set_playback_position(position);
                    }
                }
            }
            trace!("Position ticker stopped");
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop sampling and wait for the task to finish
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for PositionTicker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
