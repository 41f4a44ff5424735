use std::collections::HashMap;
use std::sync::RwLock;

use crate::errors::BackendError;
use crate::store::SlotStorage;

/// Slots kept in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySlots {
    map: RwLock<HashMap<String, String>>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage with one slot already filled in.
    pub fn with_slot(key: impl Into<String>, value: impl Into<String>) -> Self {
        let slots = Self::new();
        slots
            .map
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into(), value.into());

        slots
    }
}

impl SlotStorage for MemorySlots {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let map = self.map.read().unwrap_or_else(|e| e.into_inner());

        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        let mut map = self.map.write().unwrap_or_else(|e| e.into_inner());
        map.insert(key.to_owned(), value.to_owned());

        Ok(())
    }
}
