//! Key-value storage backends.
//!
//! The keeper needs four things from a store: point reads and writes,
//! ordered scans of one namespace, and atomic multi-record writes.
//! [`MemoryBackend`] serves tests; [`RocksBackend`] backs the audit tool.

mod memory_backend;
mod rocks_backend;

use std::collections::BTreeMap;

pub use memory_backend::MemoryBackend;
pub use rocks_backend::RocksBackend;

use crate::error::StorageError;

/// A key-value pair read from the store.
pub type KvEntry = (Vec<u8>, Vec<u8>);

/// Entries under one prefix, in ascending key order.
///
/// A read failure mid-scan is yielded as an `Err` item rather than ending
/// the scan silently.
pub type PrefixIterator<'a> = Box<dyn Iterator<Item = Result<KvEntry, StorageError>> + 'a>;

/// Store contract consumed by the keeper.
pub trait KvBackend: Send + Sync {
    /// Read one value.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Write one value.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Remove one key; absent keys are not an error.
    fn delete(&self, key: &[u8]) -> Result<(), StorageError>;

    /// Check if a key is present.
    fn exists(&self, key: &[u8]) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }

    /// Apply every staged write, or none of them.
    fn write_batch(&self, batch: WriteBatch) -> Result<(), StorageError>;

    /// Scan the keys starting with `prefix`.
    fn prefix_iterator(&self, prefix: &[u8]) -> Result<PrefixIterator<'_>, StorageError>;

    /// Make completed writes durable.
    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Writes staged for one atomic commit.
///
/// Staging is keyed: a later write to the same key replaces the earlier
/// one, so clearing a namespace and then re-putting some of its keys
/// leaves those keys present.
#[derive(Clone, Debug, Default)]
pub struct WriteBatch {
    // `None` marks a delete
    staged: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl WriteBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a write.
    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.staged.insert(key, Some(value));
    }

    /// Stage a delete.
    pub fn delete(&mut self, key: Vec<u8>) {
        self.staged.insert(key, None);
    }

    /// Number of distinct keys touched.
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    /// Check if nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    fn into_writes(self) -> impl Iterator<Item = (Vec<u8>, Option<Vec<u8>>)> {
        self.staged.into_iter()
    }
}
