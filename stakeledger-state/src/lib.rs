//! Accounting core for the stakeledger staking ledger.
//!
//! This crate tracks how the token supply splits between loose, bonded and
//! unbonding tokens, accrues fees to validators with a lazy height
//! accumulator, and verifies conservation after every transition. It does
//! no networking or persistence of its own.
//!
//! # Key Components
//!
//! - [`Accumulator`]: Running integral of a rate over block height
//! - [`Pool`]: Loose / bonded / unbonding counters
//! - [`FeePool`]: Per-validator reward pools and the community pool
//! - [`LedgerReader`]/[`LedgerWriter`]: Traits abstracting record access
//! - [`execute`]: Block hooks and message handlers
//! - [`invariants`]: Conservation and validator-set checks
//!
//! # Example
//!
//! ```ignore
//! use stakeledger_state::{execute, invariants, LedgerState};
//!
//! let mut state = LedgerState::genesis(params, accounts, validators, ubds, FeePool::initial())?;
//! execute::allocate_fees(&mut state, height, &fees, &validators)?;
//! invariants::all_invariants(&state)?;
//! ```

mod accumulator;
mod bond;
mod distribution;
mod error;
mod source;
mod state;

pub mod execute;
pub mod invariants;

pub use accumulator::Accumulator;
pub use bond::Pool;
pub use distribution::{
    validate_commission_rate, DistributionParams, FeeAllocation, FeePool, RewardPool,
    DEFAULT_BOND_DENOM,
};
pub use error::{PoolCounter, StateError, StateResult};
pub use source::{HasBalance, HasCoins, HasPower};
pub use state::{LedgerReader, LedgerState, LedgerWriter};
