//! The raw string-keyed store every repository is built on.
//!
//! A [`KeyValueStore`] is injected into [`StorageService`](crate::storage_service::StorageService)
//! at construction, so tests can hand in a double and the host can choose
//! between the in-memory and LMDB backends.

use std::sync::Arc;

use crate::storage_error::StorageResult;

/// String-keyed persistent store with get/set/delete capabilities.
///
/// Implementations report failures through [`StorageResult`]; the decision to
/// swallow them belongs to the layers above.
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw text stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// Removes every key.
    fn clear(&self) -> StorageResult<()>;

    /// Returns whether `key` is present.
    fn contains(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        (**self).delete(key)
    }

    fn clear(&self) -> StorageResult<()> {
        (**self).clear()
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        (**self).delete(key)
    }

    fn clear(&self) -> StorageResult<()> {
        (**self).clear()
    }
}
