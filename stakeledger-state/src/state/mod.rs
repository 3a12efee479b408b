//! Ledger container and storage traits.
//!
//! This module provides:
//! - [`LedgerReader`]: Read-only access to the accounting records
//! - [`LedgerWriter`]: Mutable access to the accounting records
//! - [`LedgerState`]: In-memory implementation

mod ledger_state;
mod store;

pub use ledger_state::LedgerState;
pub use store::{LedgerReader, LedgerWriter};
