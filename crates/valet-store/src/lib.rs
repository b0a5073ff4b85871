//! Conversation persistence for valet.
//!
//! A single JSON document on disk holds the full message sequence. Reads
//! treat anything unparsable as an empty history; writes are best-effort.

pub mod history;

pub use history::{HistoryStore, StoreError};
