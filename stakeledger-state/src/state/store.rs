//! Ledger storage traits.
//!
//! These traits abstract over the backing store so the same operations
//! and invariant checks run against the in-memory [`LedgerState`] and the
//! persistent keeper.
//!
//! [`LedgerState`]: super::LedgerState

use stakeledger_core::Address;

use crate::bond::Pool;
use crate::distribution::{DistributionParams, FeePool, RewardPool};
use crate::error::StateResult;

/// Read access to the accounting records.
///
/// The singletons exist from genesis on; an implementation returns
/// [`StateError::MissingRequiredRecord`](crate::StateError::MissingRequiredRecord)
/// when one is absent.
pub trait LedgerReader {
    // === Pool ===

    /// Get the staking pool.
    fn pool(&self) -> StateResult<Pool>;

    // === Distribution ===

    /// Get the fee pool with every validator's reward pool.
    fn fee_pool(&self) -> StateResult<FeePool>;

    /// Get one validator's reward pool, if it has ever received rewards.
    fn reward_pool(&self, validator: &Address) -> StateResult<Option<RewardPool>>;

    /// Get the distribution parameters.
    fn params(&self) -> StateResult<DistributionParams>;
}

/// Write access to the accounting records.
pub trait LedgerWriter: LedgerReader {
    /// Replace the staking pool.
    fn set_pool(&mut self, pool: &Pool) -> StateResult<()>;

    /// Replace the fee pool, including every reward pool.
    fn set_fee_pool(&mut self, fee_pool: &FeePool) -> StateResult<()>;

    /// Replace one validator's reward pool.
    fn set_reward_pool(&mut self, validator: &Address, reward_pool: &RewardPool) -> StateResult<()>;

    /// Replace the distribution parameters.
    fn set_params(&mut self, params: &DistributionParams) -> StateResult<()>;

    /// Replace the pool and the fee pool together.
    ///
    /// Persistent stores override this to write both in one batch.
    fn set_ledger(&mut self, pool: &Pool, fee_pool: &FeePool) -> StateResult<()> {
        self.set_pool(pool)?;
        self.set_fee_pool(fee_pool)
    }
}
