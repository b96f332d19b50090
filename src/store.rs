//! Durable state: an opaque key-value seam plus file-backed and
//! in-memory stores.
//!
//! Three fixed records survive restarts: the settings blob, the
//! fingerprint list, and the offline queue. A corrupt record resets to
//! its default; corruption never blocks startup.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{SyncError, SyncResult};

/// Fixed key for the settings blob.
pub const KEY_SETTINGS: &str = "axon_settings";
/// Fixed key for the fingerprint list, most-recent-last.
pub const KEY_FINGERPRINTS: &str = "axon_fingerprints";
/// Fixed key for the offline queue, oldest-first.
pub const KEY_QUEUE: &str = "axon_queue";

/// Opaque key-value persistence consumed by the engine.
///
/// Writes are best-effort: the engine logs failures and keeps going.
pub trait StateStore {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str) -> SyncResult<()>;
}

/// Deserialize a persisted record, falling back to the default when the
/// record is missing or corrupt.
pub fn load_or_default<T: DeserializeOwned + Default>(store: &dyn StateStore, key: &str) -> T {
    match store.read(key) {
        None => T::default(),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("axon: corrupt record {key}, resetting: {e}");
                T::default()
            }
        },
    }
}

/// Serialize and write a record, logging on failure.
pub fn persist<T: Serialize>(store: &dyn StateStore, key: &str, value: &T) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("axon: failed to serialize {key}: {e}");
            return;
        }
    };
    if let Err(e) = store.write(key, &raw) {
        tracing::warn!("axon: failed to persist {key}: {e}");
    }
}

/// One JSON file per key under a directory.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open the store, creating `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> SyncResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| SyncError::State {
            reason: format!("create {}: {e}", dir.display()),
        })?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStore for JsonFileStore {
    fn read(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn write(&self, key: &str, value: &str) -> SyncResult<()> {
        std::fs::write(self.path_for(key), value).map_err(|e| SyncError::State {
            reason: format!("write {key}: {e}"),
        })
    }
}

/// In-memory store for tests and embedders without a filesystem.
///
/// Single-threaded like the rest of the pipeline; wrap the engine in a
/// mutex or actor boundary before sharing across threads.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<HashMap<String, String>>,
}

impl StateStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.records.borrow().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) -> SyncResult<()> {
        self.records
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
