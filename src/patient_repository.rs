use crate::key_value_store::KeyValueStore;
use crate::patient_model::Patient;
use crate::repository::Repository;
use crate::storage_error::StorageResult;

/// Repository for [`Patient`] records, stored under the `"patients"` key.
///
/// Same contract as [`VisitRepository`](crate::visit_repository::VisitRepository):
/// lenient methods never fail, `try_*` methods report storage errors.
pub struct PatientRepository<S: KeyValueStore> {
    inner: Repository<Patient, S>,
}

impl<S: KeyValueStore> PatientRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            inner: Repository::new(store),
        }
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            inner: Repository::with_key(store, key),
        }
    }

    pub fn get_all(&self) -> Vec<Patient> {
        self.inner.get_all()
    }

    pub fn get_by_id(&self, id: &str) -> Option<Patient> {
        self.inner.find_by_id(id)
    }

    pub fn create(&self, patient: Patient) {
        self.inner.create(patient)
    }

    pub fn update(&self, patient: Patient) {
        self.inner.update(patient)
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

    pub fn try_get_all(&self) -> StorageResult<Vec<Patient>> {
        self.inner.try_get_all()
    }

    pub fn try_get_by_id(&self, id: &str) -> StorageResult<Option<Patient>> {
        self.inner.try_find_by_id(id)
    }

    pub fn try_create(&self, patient: Patient) -> StorageResult<()> {
        self.inner.try_create(patient)
    }

    pub fn insert_unique(&self, patient: Patient) -> StorageResult<()> {
        self.inner.try_insert_unique(patient)
    }

    pub fn try_update(&self, patient: Patient) -> StorageResult<usize> {
        self.inner.try_update(patient)
    }

    pub fn try_delete(&self, id: &str) -> StorageResult<usize> {
        self.inner.try_delete(id)
    }

    pub fn try_clear_all(&self) -> StorageResult<()> {
        self.inner.try_clear_all()
    }
}
