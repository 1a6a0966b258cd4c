//! Error type shared by every store backend and repository.
//!
//! Strict (`try_*`) operations surface these errors to the caller. The lenient
//! operations log them and degrade to "no data" instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store quota exceeded")]
    QuotaExceeded,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stored value for key '{0}' is not valid UTF-8")]
    InvalidUtf8(String),

    #[error("Database error: {0}")]
    Database(lmdb::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("An entity with id '{0}' already exists")]
    DuplicateKey(String),
}

impl From<lmdb::Error> for StorageError {
    fn from(err: lmdb::Error) -> Self {
        match err {
            lmdb::Error::MapFull => StorageError::QuotaExceeded,
            other => StorageError::Database(other),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for StorageError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StorageError::Unavailable("store lock poisoned".to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
