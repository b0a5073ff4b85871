//! Telemetry polling for valet.
//!
//! A background task fetches the machine snapshot on a fixed period and
//! streams outcomes to the shell; [`TelemetryState`] folds those outcomes
//! into a last-known-good view.

pub mod poller;
pub mod state;

pub use poller::{PollerHandle, StatusSource, TelemetryPoller};
pub use state::{TelemetryEvent, TelemetryState};
