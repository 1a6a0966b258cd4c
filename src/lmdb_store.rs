//! LMDB-backed [`KeyValueStore`].
//!
//! Each store owns one LMDB environment in a `<name>.lmdb` directory with a
//! single named database holding every key. Values are UTF-8 JSON text.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use lmdb::{Database, DatabaseFlags, Environment, EnvironmentFlags, Transaction, WriteFlags};
use log::{debug, info, warn};

use crate::key_value_store::KeyValueStore;
use crate::storage_error::{StorageError, StorageResult};
use crate::store_config::StoreConfig;

const DB_NAME: &str = "clinical_store";

struct LmdbHandle {
    env: Environment,
    db: Database,
}

struct LmdbState {
    config: StoreConfig,
    handle: Option<LmdbHandle>,
}

pub struct LmdbStore {
    state: RwLock<LmdbState>,
}

impl LmdbStore {
    /// Opens (or creates) `<name>.lmdb` with default settings.
    pub fn init(name: String) -> StorageResult<Self> {
        Self::open(StoreConfig::named(name))
    }

    pub fn open(config: StoreConfig) -> StorageResult<Self> {
        config.validate()?;
        let handle = open_handle(&config)?;
        Ok(Self {
            state: RwLock::new(LmdbState {
                config,
                handle: Some(handle),
            }),
        })
    }

    pub fn is_open(&self) -> bool {
        self.state
            .read()
            .map(|state| state.handle.is_some())
            .unwrap_or(false)
    }

    pub fn path(&self) -> StorageResult<PathBuf> {
        Ok(self.state.read()?.config.lmdb_dir())
    }

    /// Flushes and releases the LMDB environment.
    ///
    /// Every later operation fails with [`StorageError::Unavailable`] until the
    /// store is reset. Closing an already closed store is a no-op.
    pub fn close_database(&self) -> StorageResult<()> {
        let mut state = self.state.write()?;
        match state.handle.take() {
            Some(handle) => {
                if let Err(e) = handle.env.sync(true) {
                    warn!("Failed to sync LMDB environment before close: {e}");
                }
                drop(handle);
                info!("LMDB environment at {:?} closed", state.config.lmdb_dir());
            }
            None => debug!("close_database called on an already closed store"),
        }
        Ok(())
    }

    /// Closes the store, deletes its directory, and reopens an empty store
    /// under `name`. An invalid `name` is rejected before anything is closed.
    pub fn reset_database(&self, name: &str) -> StorageResult<()> {
        let mut state = self.state.write()?;
        let mut config = state.config.clone();
        config.name = name.to_string();
        config.validate()?;

        state.handle = None;
        remove_dir_if_exists(&state.config.lmdb_dir())?;
        remove_dir_if_exists(&config.lmdb_dir())?;

        state.handle = Some(open_handle(&config)?);
        state.config = config;
        info!("Database reset to {:?}", state.config.lmdb_dir());
        Ok(())
    }

    fn with_handle<R>(&self, f: impl FnOnce(&LmdbHandle) -> StorageResult<R>) -> StorageResult<R> {
        let state = self.state.read()?;
        match state.handle.as_ref() {
            Some(handle) => f(handle),
            None => Err(StorageError::Unavailable(format!(
                "database {:?} is closed",
                state.config.lmdb_dir()
            ))),
        }
    }
}

fn open_handle(config: &StoreConfig) -> StorageResult<LmdbHandle> {
    let dir = config.lmdb_dir();
    fs::create_dir_all(&dir)?;

    let mut builder = Environment::new();
    builder.set_max_dbs(config.max_dbs).set_map_size(config.map_size);
    if !config.sync_on_write {
        builder.set_flags(EnvironmentFlags::NO_SYNC);
    }

    let env = builder.open(&dir)?;
    let db = env.create_db(Some(DB_NAME), DatabaseFlags::empty())?;
    info!("LMDB environment opened at {:?}", dir);
    Ok(LmdbHandle { env, db })
}

fn remove_dir_if_exists(dir: &Path) -> StorageResult<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
        debug!("Removed database directory {:?}", dir);
    }
    Ok(())
}

impl KeyValueStore for LmdbStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.with_handle(|handle| {
            let txn = handle.env.begin_ro_txn()?;
            let value = match txn.get(handle.db, &key) {
                Ok(bytes) => match std::str::from_utf8(bytes) {
                    Ok(text) => Some(text.to_string()),
                    Err(_) => return Err(StorageError::InvalidUtf8(key.to_string())),
                },
                Err(lmdb::Error::NotFound) => None,
                Err(e) => return Err(e.into()),
            };
            txn.commit()?;
            Ok(value)
        })
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.with_handle(|handle| {
            let mut txn = handle.env.begin_rw_txn()?;
            txn.put(handle.db, &key, &value, WriteFlags::empty())?;
            txn.commit()?;
            debug!("lmdb store: wrote {} bytes under '{}'", value.len(), key);
            Ok(())
        })
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.with_handle(|handle| {
            let mut txn = handle.env.begin_rw_txn()?;
            match txn.del(handle.db, &key, None) {
                Ok(()) | Err(lmdb::Error::NotFound) => {}
                Err(e) => return Err(e.into()),
            }
            txn.commit()?;
            Ok(())
        })
    }

    fn clear(&self) -> StorageResult<()> {
        self.with_handle(|handle| {
            let mut txn = handle.env.begin_rw_txn()?;
            txn.clear_db(handle.db)?;
            txn.commit()?;
            Ok(())
        })
    }
}

impl Drop for LmdbStore {
    fn drop(&mut self) {
        if let Err(e) = self.close_database() {
            warn!("Failed to close LMDB store on drop: {e}");
        }
    }
}
