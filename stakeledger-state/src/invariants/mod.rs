//! Invariant checks over a committed ledger snapshot.
//!
//! These recompute pool totals and the validator set from individual
//! records and compare them with what is stored. They are verification
//! oracles for tests and background audits, not part of block processing.

mod checks;
mod error;
mod supply;
mod view;

pub use checks::{all_invariants, positive_power_invariant, validator_set_invariant};
pub use error::{InvariantError, InvariantResult};
pub use supply::{supply_invariant, tally_supply, SupplyTally};
pub use view::{EntryIter, InvariantView};
