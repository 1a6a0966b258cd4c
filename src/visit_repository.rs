//! Repository for [`Visit`] records, stored under the `"visits"` key.
//!
//! # Examples
//!
//! ```rust
//! use clinical_store::memory_store::MemoryStore;
//! use clinical_store::visit_model::Visit;
//! use clinical_store::visit_repository::VisitRepository;
//!
//! let visits = VisitRepository::new(MemoryStore::new());
//! visits.create(Visit::new("v1", "pat-1", "2025-01-01T00:00:00Z", "initial", "completed"));
//!
//! assert_eq!(visits.get_by_patient_id("pat-1").len(), 1);
//! assert!(visits.get_by_visit_id("nonexistent").is_none());
//! ```

use crate::key_value_store::KeyValueStore;
use crate::repository::Repository;
use crate::storage_error::StorageResult;
use crate::visit_model::Visit;

pub struct VisitRepository<S: KeyValueStore> {
    inner: Repository<Visit, S>,
}

impl<S: KeyValueStore> VisitRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            inner: Repository::new(store),
        }
    }

    /// Repository stored under a custom key instead of `"visits"`.
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            inner: Repository::with_key(store, key),
        }
    }

    /// The generic repository, for operations not exposed here.
    pub fn get_all(&self) -> Vec<Visit> {
        self.inner.get_all()
    }

    /// Visits with an exact `patient_id` match, in stored order.
    pub fn get_by_patient_id(&self, patient_id: &str) -> Vec<Visit> {
        self.inner.filter(|visit| visit.patient_id == patient_id)
    }

    pub fn get_by_visit_id(&self, id: &str) -> Option<Visit> {
        self.inner.find_by_id(id)
    }

    pub fn create(&self, visit: Visit) {
        self.inner.create(visit)
    }

    pub fn update(&self, visit: Visit) {
        self.inner.update(visit)
    }

    pub fn delete(&self, id: &str) {
        self.inner.delete(id)
    }

    pub fn clear_all(&self) {
        self.inner.clear_all()
    }

    pub fn exists(&self, id: &str) -> bool {
        self.inner.exists(id)
    }

    pub fn count(&self) -> usize {
        self.inner.count()
    }

    pub fn try_get_all(&self) -> StorageResult<Vec<Visit>> {
        self.inner.try_get_all()
    }

    pub fn try_get_by_patient_id(&self, patient_id: &str) -> StorageResult<Vec<Visit>> {
        self.inner.try_filter(|visit| visit.patient_id == patient_id)
    }

    pub fn try_get_by_visit_id(&self, id: &str) -> StorageResult<Option<Visit>> {
        self.inner.try_find_by_id(id)
    }

    pub fn try_create(&self, visit: Visit) -> StorageResult<()> {
        self.inner.try_create(visit)
    }

    /// Like [`try_create`](Self::try_create), but fails with
    /// [`StorageError::DuplicateKey`](crate::storage_error::StorageError::DuplicateKey)
    /// when the id is already stored.
    pub fn insert_unique(&self, visit: Visit) -> StorageResult<()> {
        self.inner.try_insert_unique(visit)
    }

    pub fn try_update(&self, visit: Visit) -> StorageResult<usize> {
        self.inner.try_update(visit)
    }

    pub fn try_delete(&self, id: &str) -> StorageResult<usize> {
        self.inner.try_delete(id)
    }

    pub fn try_clear_all(&self) -> StorageResult<()> {
        self.inner.try_clear_all()
    }
}
