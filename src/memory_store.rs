use std::collections::HashMap;
use std::sync::RwLock;

use log::debug;

use crate::key_value_store::KeyValueStore;
use crate::storage_error::StorageResult;

/// Process-local store backed by a `HashMap`.
///
/// Used when no persistent backend is available, and as the default store in
/// tests. Contents are lost when the value is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let map = self.entries.read()?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut map = self.entries.write()?;
        map.insert(key.to_string(), value.to_string());
        debug!("memory store: wrote {} bytes under '{}'", value.len(), key);
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let mut map = self.entries.write()?;
        map.remove(key);
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let mut map = self.entries.write()?;
        map.clear();
        Ok(())
    }

    fn contains(&self, key: &str) -> StorageResult<bool> {
        let map = self.entries.read()?;
        Ok(map.contains_key(key))
    }
}
