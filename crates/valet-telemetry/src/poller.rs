//! The polling task.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use valet_agent::{AgentClient, AgentError};
use valet_core::types::TelemetrySnapshot;

use crate::state::TelemetryEvent;

/// Anything that can produce a telemetry snapshot on demand.
#[async_trait]
pub trait StatusSource: Send + Sync + 'static {
    async fn fetch(&self) -> Result<TelemetrySnapshot, AgentError>;
}

#[async_trait]
impl StatusSource for AgentClient {
    async fn fetch(&self) -> Result<TelemetrySnapshot, AgentError> {
        self.status().await
    }
}

#[async_trait]
impl<S: StatusSource + ?Sized> StatusSource for std::sync::Arc<S> {
    async fn fetch(&self) -> Result<TelemetrySnapshot, AgentError> {
        (**self).fetch().await
    }
}

/// Handle over the running poll task.
///
/// Stopping aborts the task at its next suspension point, so a tick that
/// was scheduled but has not fired yet never fires. Dropping the handle
/// stops the poller too.
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns the fixed-period poll loop.
pub struct TelemetryPoller {
    interval: Duration,
}

impl TelemetryPoller {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Start polling `source`: one fetch immediately, then one per period.
    ///
    /// A failed poll emits [`TelemetryEvent::Failed`] and simply waits for
    /// the next tick; there is no backoff. The channel closes when the
    /// poller is stopped.
    pub fn start<S: StatusSource>(
        self,
        source: S,
    ) -> (PollerHandle, mpsc::UnboundedReceiver<TelemetryEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let interval = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let event = match source.fetch().await {
                    Ok(snapshot) => TelemetryEvent::Snapshot(snapshot),
                    Err(e) => {
                        debug!("Telemetry poll failed: {}", e);
                        TelemetryEvent::Failed(e.to_string())
                    }
                };
                if tx.send(event).is_err() {
                    // Subscriber went away.
                    break;
                }
            }
        });

        (PollerHandle { task }, rx)
    }
}

// =============================================================================
// Tests
// =============================================================================
