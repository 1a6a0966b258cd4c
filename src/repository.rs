//! Whole-collection CRUD over one entity type.
//!
//! A [`Repository`] stores every entity of type `T` as a single JSON array
//! under one key. Each mutation loads the full collection, changes it in
//! memory, and writes the full collection back. There is no locking: two
//! writers interleaving their load and save can lose an update.
//!
//! Strict `try_*` methods propagate [`StorageError`]. The remaining methods
//! log failures and degrade to an empty collection, `None`, or a no-op. A
//! stored collection that cannot be decoded counts as empty, so a lenient
//! mutation replaces it. When the store itself cannot be reached, a lenient
//! mutation is abandoned.

use std::marker::PhantomData;

use log::{debug, error, warn};

use crate::entity::Entity;
use crate::key_value_store::KeyValueStore;
use crate::storage_error::{StorageError, StorageResult};
use crate::storage_service::StorageService;

pub struct Repository<T: Entity, S: KeyValueStore> {
    storage: StorageService<S>,
    key: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity, S: KeyValueStore> Repository<T, S> {
    /// Repository stored under `T::COLLECTION_KEY`.
    pub fn new(store: S) -> Self {
        Self::with_key(store, T::COLLECTION_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            storage: StorageService::new(store),
            key: key.into(),
            _entity: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn try_get_all(&self) -> StorageResult<Vec<T>> {
        Ok(self.storage.try_load::<Vec<T>>(&self.key)?.unwrap_or_default())
    }

    pub fn try_filter(&self, predicate: impl Fn(&T) -> bool) -> StorageResult<Vec<T>> {
        Ok(self
            .try_get_all()?
            .into_iter()
            .filter(|entity| predicate(entity))
            .collect())
    }

    /// First entity whose id equals `id`.
    pub fn try_find_by_id(&self, id: &str) -> StorageResult<Option<T>> {
        Ok(self.try_get_all()?.into_iter().find(|entity| entity.id() == id))
    }

    /// Appends `entity` without checking for an existing id.
    pub fn try_create(&self, entity: T) -> StorageResult<()> {
        self.append(self.try_get_all()?, entity)
    }

    /// Appends `entity` only if no stored entity has the same id.
    pub fn try_insert_unique(&self, entity: T) -> StorageResult<()> {
        let mut entities = self.try_get_all()?;
        if entities.iter().any(|existing| existing.id() == entity.id()) {
            return Err(StorageError::DuplicateKey(entity.id().to_string()));
        }
        entities.push(entity);
        self.storage.try_save(&self.key, &entities)
    }

    /// Replaces every entity sharing `entity`'s id and returns how many were
    /// replaced. The collection is rewritten even when nothing matched.
    pub fn try_update(&self, entity: T) -> StorageResult<usize> {
        self.replace(self.try_get_all()?, entity)
    }

    /// Removes every entity with `id` and returns how many were removed.
    pub fn try_delete(&self, id: &str) -> StorageResult<usize> {
        self.remove(self.try_get_all()?, id)
    }

    fn append(&self, mut entities: Vec<T>, entity: T) -> StorageResult<()> {
        debug!("Appending entity '{}' to '{}'", entity.id(), self.key);
        entities.push(entity);
        self.storage.try_save(&self.key, &entities)
    }

    fn replace(&self, entities: Vec<T>, entity: T) -> StorageResult<usize> {
        let mut replaced = 0;
        let entities: Vec<T> = entities
            .into_iter()
            .map(|existing| {
                if existing.id() == entity.id() {
                    replaced += 1;
                    entity.clone()
                } else {
                    existing
                }
            })
            .collect();
        self.storage.try_save(&self.key, &entities)?;
        debug!("Updated {replaced} entities with id '{}' in '{}'", entity.id(), self.key);
        Ok(replaced)
    }

    fn remove(&self, mut entities: Vec<T>, id: &str) -> StorageResult<usize> {
        let before = entities.len();
        entities.retain(|entity| entity.id() != id);
        let removed = before - entities.len();
        self.storage.try_save(&self.key, &entities)?;
        debug!("Deleted {removed} entities with id '{id}' from '{}'", self.key);
        Ok(removed)
    }

    /// Collection a lenient mutation starts from. Undecodable data counts as
    /// empty; an unreachable store is still an error.
    fn load_for_write(&self) -> StorageResult<Vec<T>> {
        match self.try_get_all() {
            Err(StorageError::Serialization(e)) => {
                warn!("Collection '{}' is unreadable, starting from empty: {e}", self.key);
                Ok(Vec::new())
            }
            Err(StorageError::InvalidUtf8(_)) => {
                warn!("Collection '{}' is not valid UTF-8, starting from empty", self.key);
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Deletes the storage key for this collection.
    pub fn try_clear_all(&self) -> StorageResult<()> {
        self.storage.try_remove(&self.key)
    }

    pub fn try_exists(&self, id: &str) -> StorageResult<bool> {
        Ok(self.try_find_by_id(id)?.is_some())
    }

    pub fn try_count(&self) -> StorageResult<usize> {
        Ok(self.try_get_all()?.len())
    }

    pub fn get_all(&self) -> Vec<T> {
        self.try_get_all().unwrap_or_else(|e| {
            warn!("Error loading collection '{}': {e}", self.key);
            Vec::new()
        })
    }

    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.get_all().into_iter().filter(|entity| predicate(entity)).collect()
    }

    pub fn find_by_id(&self, id: &str) -> Option<T> {
        self.get_all().into_iter().find(|entity| entity.id() == id)
    }

    pub fn create(&self, entity: T) {
        if let Err(e) = self.load_for_write().and_then(|entities| self.append(entities, entity)) {
            error!("Error creating entity in '{}': {e}", self.key);
        }
    }

    pub fn update(&self, entity: T) {
        if let Err(e) = self.load_for_write().and_then(|entities| self.replace(entities, entity)) {
            error!("Error updating entity in '{}': {e}", self.key);
        }
    }

    pub fn delete(&self, id: &str) {
        if let Err(e) = self.load_for_write().and_then(|entities| self.remove(entities, id)) {
            error!("Error deleting entity '{id}' from '{}': {e}", self.key);
        }
    }

    pub fn clear_all(&self) {
        if let Err(e) = self.try_clear_all() {
            error!("Error clearing collection '{}': {e}", self.key);
        }
    }

    pub fn exists(&self, id: &str) -> bool {
        self.find_by_id(id).is_some()
    }

    pub fn count(&self) -> usize {
        self.get_all().len()
    }
}
