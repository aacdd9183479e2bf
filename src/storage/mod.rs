//! Local persistence
//!
//! A [`StorageBackend`] moves raw JSON strings in and out of named slots.
//! [`LocalPersistence`] sits on top and gives the pipeline a best-effort,
//! never-failing `load`/`save` pair: problems are logged and the in-memory
//! value stays authoritative.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};

/// Raw slot storage
pub trait StorageBackend: Send + Sync {
    /// Short name used in log fields
    fn name(&self) -> &'static str;

    /// Read a slot. `Ok(None)` when the slot was never written.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace a slot's contents.
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// Slot names map to file names, so keep them boring.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key != "."
        && key != ".."
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

// ─────────────────────────────────────────────────────────────────
// Persistence Adapter
// ─────────────────────────────────────────────────────────────────

/// Best-effort typed persistence over a [`StorageBackend`]
#[derive(Clone)]
pub struct LocalPersistence {
    backend: Arc<dyn StorageBackend>,
}

impl LocalPersistence {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Load a value, falling back to `default` on any problem.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.backend.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(backend = self.backend.name(), key, "Storage slot empty, using default");
                return default;
            }
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    key,
                    error = %e.format_for_log(),
                    "Storage unavailable, using default"
                );
                return default;
            }
        };

        match serde_json::from_str(&raw).map_err(Error::from) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    key,
                    error = %e.format_for_log(),
                    "Stored value is corrupt, using default"
                );
                default
            }
        }
    }

    /// Serialize and write a value. Returns whether the write went through.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let raw = match serde_json::to_string(value).map_err(Error::from) {
            Ok(raw) => raw,
            Err(e) => {
                error!(
                    backend = self.backend.name(),
                    key,
                    error = %e.format_for_log(),
                    "Failed to serialize value"
                );
                return false;
            }
        };

        match self.backend.write(key, &raw) {
            Ok(()) => {
                debug!(backend = self.backend.name(), key, bytes = raw.len(), "Storage slot saved");
                true
            }
            Err(e) => {
                error!(
                    backend = self.backend.name(),
                    key,
                    error = %e.format_for_log(),
                    "Failed to save storage slot"
                );
                false
            }
        }
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }
}
