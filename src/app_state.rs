use std::sync::Arc;

use crate::lmdb_store::LmdbStore;
use crate::patient_repository::PatientRepository;
use crate::storage_error::StorageResult;
use crate::store_config::StoreConfig;
use crate::visit_repository::VisitRepository;

/// Everything an FFI host holds on to: one LMDB store shared by the visit and
/// patient repositories.
pub struct AppState {
    backend: Arc<LmdbStore>,
    pub visits: VisitRepository<Arc<LmdbStore>>,
    pub patients: PatientRepository<Arc<LmdbStore>>,
}

impl AppState {
    pub fn open(config: StoreConfig) -> StorageResult<Self> {
        let backend = Arc::new(LmdbStore::open(config)?);
        Ok(Self::from_backend(backend))
    }

    pub fn from_backend(backend: Arc<LmdbStore>) -> Self {
        Self {
            visits: VisitRepository::new(Arc::clone(&backend)),
            patients: PatientRepository::new(Arc::clone(&backend)),
            backend,
        }
    }

    pub fn backend(&self) -> &LmdbStore {
        &self.backend
    }

    pub fn close(&self) -> StorageResult<()> {
        self.backend.close_database()
    }

    pub fn reset(&self, name: &str) -> StorageResult<()> {
        self.backend.reset_database(name)
    }
}
