//! Last-known-good telemetry view.

use valet_core::types::TelemetrySnapshot;

/// Outcome of one poll, as delivered to subscribers.
#[derive(Clone, Debug)]
pub enum TelemetryEvent {
    Snapshot(TelemetrySnapshot),
    Failed(String),
}

/// Folds poll outcomes into the view the dashboard renders.
///
/// A failure never clears the snapshot: the dashboard keeps showing stale
/// data next to an error banner until the next successful poll replaces
/// both.
#[derive(Debug, Default)]
pub struct TelemetryState {
    snapshot: Option<TelemetrySnapshot>,
    error: Option<String>,
}

impl TelemetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent successful snapshot, if any poll has succeeded.
    pub fn snapshot(&self) -> Option<&TelemetrySnapshot> {
        self.snapshot.as_ref()
    }

    /// The error from the most recent poll, if it failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether no poll has completed yet.
    pub fn is_loading(&self) -> bool {
        self.snapshot.is_none() && self.error.is_none()
    }

    /// Fold one poll outcome into the view.
    pub fn apply(&mut self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::Snapshot(snapshot) => {
                self.snapshot = Some(snapshot);
                self.error = None;
            }
            TelemetryEvent::Failed(reason) => {
                self.error = Some(reason);
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
