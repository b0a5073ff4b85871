//! History file management.
//!
//! The store is a plain JSON array of messages at a fixed path. Writes are
//! not transactional; a crash mid-write may leave a partial file, which the
//! next `load` treats as an empty history.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use valet_core::types::Message;

/// File name of the history document inside the data directory.
pub const HISTORY_FILE: &str = "history.json";

/// Errors from operations that report failure (export only; load, save and
/// clear are best-effort and never error outward).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("export failed: {0}")]
    Export(String),
}

/// Disk-backed conversation store.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Create a store over an explicit history file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store over `<dir>/history.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(HISTORY_FILE))
    }

    /// Path of the underlying history file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted message sequence.
    ///
    /// Returns an empty sequence when the file is missing, unreadable,
    /// invalid JSON, or not an array. Never errors outward.
    pub fn load(&self) -> Vec<Message> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read history from {}: {}", self.path.display(), e);
                }
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Message>>(&raw) {
            Ok(messages) => messages,
            Err(e) => {
                warn!(
                    "Discarding unparsable history at {}: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Persist the message sequence, materializing missing timestamps.
    ///
    /// Best-effort: failures are logged and swallowed.
    pub fn save(&self, messages: &[Message]) {
        let now = Utc::now();
        let stamped: Vec<Message> = messages.iter().map(|m| m.with_ts(now)).collect();

        let json = match serde_json::to_string(&stamped) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize history: {}", e);
                return;
            }
        };

        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("Failed to create {}: {}", parent.display(), e);
                return;
            }
        }

        if let Err(e) = std::fs::write(&self.path, json) {
            warn!("Failed to save history to {}: {}", self.path.display(), e);
        } else {
            debug!(count = stamped.len(), "History saved");
        }
    }

    /// Remove the history file. A missing file is not an error.
    pub fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("History cleared"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to clear history at {}: {}", self.path.display(), e),
        }
    }

    /// Write a pretty-printed export artifact into `dir`.
    ///
    /// The artifact is named `chat-history-<timestamp>.json` with all
    /// timestamps materialized at export time. Returns the artifact path.
    pub fn export(
        &self,
        messages: &[Message],
        dir: &Path,
        now: DateTime<Utc>,
    ) -> Result<PathBuf, StoreError> {
        let stamped: Vec<Message> = messages.iter().map(|m| m.with_ts(now)).collect();
        let json = serde_json::to_string_pretty(&stamped)
            .map_err(|e| StoreError::Export(e.to_string()))?;

        std::fs::create_dir_all(dir).map_err(|e| StoreError::Export(e.to_string()))?;

        // Colons are not valid in file names on every platform.
        let stamp = now.to_rfc3339().replace(':', "-");
        let path = dir.join(format!("chat-history-{}.json", stamp));
        std::fs::write(&path, json).map_err(|e| StoreError::Export(e.to_string()))?;

        debug!(path = %path.display(), "History exported");
        Ok(path)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use valet_core::types::Role;

    fn sample_messages() -> Vec<Message> {
        vec![
            Message::user("hello"),
            Message::assistant("hi"),
        ]
    }

    fn store_in(dir: &tempfile::TempDir) -> HistoryStore {
        HistoryStore::in_dir(dir.path())
    }

    // ---- Load ----

    #[test]
    fn test_load_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_invalid_json_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{ not json").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_non_array_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"id": "1", "role": "user", "text": "x"}"#).unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_array_of_wrong_shape_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"[{"foo": 1}]"#).unwrap();
        assert!(store.load().is_empty());
    }

    // ---- Save / round trip ----

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let messages = sample_messages();

        store.save(&messages);
        let loaded = store.load();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, messages[0].id);
        assert_eq!(loaded[0].role, Role::User);
        assert_eq!(loaded[0].text, "hello");
        assert_eq!(loaded[1].text, "hi");
    }

    #[test]
    fn test_save_materializes_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&sample_messages());
        let loaded = store.load();
        assert!(loaded.iter().all(|m| m.ts.is_some()));
    }

    #[test]
    fn test_save_keeps_existing_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let earlier = "2025-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();

        let mut messages = sample_messages();
        messages[0].ts = Some(earlier);
        store.save(&messages);

        let loaded = store.load();
        assert_eq!(loaded[0].ts, Some(earlier));
    }

    #[test]
    fn test_save_overwrites_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&sample_messages());
        store.save(&[Message::assistant("only one")]);

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].text, "only one");
    }

    #[test]
    fn test_save_creates_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("nested").join(HISTORY_FILE));
        store.save(&sample_messages());
        assert_eq!(store.load().len(), 2);
    }

    #[test]
    fn test_save_empty_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&[]);
        assert!(store.path().exists());
        assert!(store.load().is_empty());
    }

    // ---- Clear ----

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&sample_messages());
        store.clear();
        assert!(!store.path().exists());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_clear_missing_file_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.clear();
        store.clear();
        assert!(store.load().is_empty());
    }

    // ---- Export ----

    #[test]
    fn test_export_writes_pretty_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let now = Utc::now();

        let path = store
            .export(&sample_messages(), dir.path(), now)
            .unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("chat-history-"));
        assert!(name.ends_with(".json"));

        let raw = std::fs::read_to_string(&path).unwrap();
        // Pretty-printed output spans multiple lines.
        assert!(raw.lines().count() > 2);

        let exported: Vec<Message> = serde_json::from_str(&raw).unwrap();
        assert_eq!(exported.len(), 2);
        assert!(exported.iter().all(|m| m.ts.is_some()));
    }

    #[test]
    fn test_export_does_not_touch_history_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&sample_messages());
        let before = std::fs::read_to_string(store.path()).unwrap();

        store
            .export(&[Message::user("other")], dir.path(), Utc::now())
            .unwrap();

        let after = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_export_filename_has_no_colons() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let path = store.export(&sample_messages(), dir.path(), Utc::now()).unwrap();
        assert!(!path.file_name().unwrap().to_string_lossy().contains(':'));
    }
}
