//! Stakeledger audit tool library.
//!
//! Imports a genesis file into a RocksDB store and re-checks the ledger
//! invariants against what is committed there. Used by the
//! `stakeledger-audit` binary and by the integration tests.

pub mod cli;
pub mod commands;
pub mod config;
