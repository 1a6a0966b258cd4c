//! Typed JSON access over a [`KeyValueStore`].
//!
//! [`StorageService`] is the only place values are serialized or deserialized.
//! It exposes two flavours of every operation:
//!
//! - `try_save` / `try_load` / `try_remove` / `try_clear` return a
//!   [`StorageResult`] for callers that want to handle failures.
//! - `save` / `load` / `remove` / `clear` never fail: errors are logged and the
//!   call degrades to a no-op or `None`. UI call sites use these.
//!
//! # Examples
//!
//! ```rust
//! use clinical_store::memory_store::MemoryStore;
//! use clinical_store::storage_service::StorageService;
//!
//! let storage = StorageService::new(MemoryStore::new());
//! storage.save("tags", &vec!["initial", "follow-up"]);
//!
//! let tags: Option<Vec<String>> = storage.load("tags");
//! assert_eq!(tags.unwrap().len(), 2);
//! ```

use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::key_value_store::KeyValueStore;
use crate::storage_error::StorageResult;

pub struct StorageService<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> StorageService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn try_save<T: Serialize + ?Sized>(&self, key: &str, data: &T) -> StorageResult<()> {
        let serialized = serde_json::to_string(data)?;
        self.store.set(key, &serialized)
    }

    /// Reads and decodes the value at `key`.
    ///
    /// An absent key and an empty stored string both yield `Ok(None)`.
    pub fn try_load<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        match self.store.get(key)? {
            Some(raw) if !raw.is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
            _ => Ok(None),
        }
    }

    pub fn try_remove(&self, key: &str) -> StorageResult<()> {
        self.store.delete(key)
    }

    pub fn try_clear(&self) -> StorageResult<()> {
        self.store.clear()
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: &str, data: &T) {
        if let Err(e) = self.try_save(key, data) {
            error!("Error saving data with key \"{key}\": {e}");
        }
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_load(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Error loading data with key \"{key}\": {e}");
                None
            }
        }
    }

    pub fn remove(&self, key: &str) {
        match self.try_remove(key) {
            Ok(()) => debug!("Removed key \"{key}\""),
            Err(e) => error!("Error removing data with key \"{key}\": {e}"),
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.try_clear() {
            error!("Error clearing store: {e}");
        }
    }
}
