//! In-process slot storage.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::StorageBackend;
use crate::error::Result;

/// Slots held in a map; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of written slots
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.read().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.slots.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
