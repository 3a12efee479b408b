//! Storage error types.

use stakeledger_state::StateError;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// RocksDB error.
    #[error("RocksDB error: {0}")]
    RocksDb(String),

    /// Backend failure other than RocksDB (e.g. a poisoned lock).
    #[error("Backend error: {0}")]
    Backend(String),

    /// Record encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid key format.
    #[error("Invalid key format: {0}")]
    InvalidKey(String),

    /// A record required after genesis is absent.
    #[error("Required record missing: {record}")]
    MissingRequiredRecord {
        /// Name of the missing record.
        record: &'static str,
    },

    /// Genesis was already imported into this store.
    #[error("Store already initialized")]
    AlreadyInitialized,

    /// Genesis file is malformed or inconsistent.
    #[error("Invalid genesis: {0}")]
    Genesis(String),

    /// Accounting rule violated while deriving state.
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rocksdb::Error> for StorageError {
    fn from(e: rocksdb::Error) -> Self {
        StorageError::RocksDb(e.to_string())
    }
}

impl From<stakeledger_core::SerializationError> for StorageError {
    fn from(e: stakeledger_core::SerializationError) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Genesis(e.to_string())
    }
}

impl From<StorageError> for StateError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::MissingRequiredRecord { record } => {
                StateError::MissingRequiredRecord { record }
            }
            StorageError::State(inner) => inner,
            other => StateError::Storage(other.to_string()),
        }
    }
}
