//! Configuration for the LMDB-backed store.
//!
//! Hosts either build a [`StoreConfig`] with [`StoreConfig::named`] or hand in a
//! JSON document such as:
//!
//! ```json
//! { "name": "clinic_data", "map_size": 10485760, "max_dbs": 4, "sync_on_write": true }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::storage_error::{StorageError, StorageResult};

/// Default LMDB map size: 10 MiB.
pub const DEFAULT_MAP_SIZE: usize = 10 * 1024 * 1024;

/// Default number of named LMDB databases the environment may hold.
pub const DEFAULT_MAX_DBS: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path stem of the database. The environment lives in `<name>.lmdb`.
    pub name: String,

    /// Maximum size of the memory map in bytes. Writes beyond it fail with
    /// [`StorageError::QuotaExceeded`].
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    #[serde(default = "default_max_dbs")]
    pub max_dbs: u32,

    /// Force an `fsync` of the environment after every write.
    #[serde(default = "default_sync_on_write")]
    pub sync_on_write: bool,
}

fn default_map_size() -> usize {
    DEFAULT_MAP_SIZE
}

fn default_max_dbs() -> u32 {
    DEFAULT_MAX_DBS
}

fn default_sync_on_write() -> bool {
    true
}

impl StoreConfig {
    /// Configuration with defaults for everything but the name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            map_size: DEFAULT_MAP_SIZE,
            max_dbs: DEFAULT_MAX_DBS,
            sync_on_write: true,
        }
    }

    pub fn from_json(json: &str) -> StorageResult<Self> {
        let config: StoreConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> StorageResult<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    pub fn validate(&self) -> StorageResult<()> {
        if self.name.trim().is_empty() {
            return Err(StorageError::Config("database name must not be empty".to_string()));
        }
        if self.map_size == 0 {
            return Err(StorageError::Config("map_size must be greater than zero".to_string()));
        }
        if self.max_dbs == 0 {
            return Err(StorageError::Config("max_dbs must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Directory holding the LMDB environment.
    pub fn lmdb_dir(&self) -> PathBuf {
        PathBuf::from(format!("{}.lmdb", self.name))
    }
}
