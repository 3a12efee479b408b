//! # Stakeledger Storage
//!
//! Persistence for the stakeledger accounting core.
//!
//! This crate provides:
//! - A namespaced key schema ([`StateKey`]) built by pure functions
//! - Key-value backends: in-memory for tests, RocksDB on disk
//! - The [`Keeper`], sole reader and writer of the pool, fee pool and
//!   parameter records
//! - Genesis import from JSON
//!
//! ## Architecture
//!
//! The keeper implements the `LedgerReader`, `LedgerWriter` and
//! `InvariantView` traits from `stakeledger-state`, so the block operations
//! and invariant checks run unchanged against a persistent store.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod genesis;
pub mod keeper;
pub mod keys;
pub mod kv;

pub use error::StorageError;
pub use genesis::{GenesisFeePool, GenesisRewardPool, GenesisState};
pub use keeper::Keeper;
pub use keys::{KeyPrefix, StateKey};
pub use kv::{KvBackend, MemoryBackend, RocksBackend, WriteBatch};
