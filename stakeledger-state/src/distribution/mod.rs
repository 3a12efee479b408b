//! Fee and reward distribution ledger.
//!
//! Collected fees are credited to per-validator [`RewardPool`]s and the
//! community pool at injection time. Delegator rewards and validator
//! commission stay in those pools until withdrawn.

mod fee_pool;
mod params;

pub use fee_pool::{FeeAllocation, FeePool, RewardPool};
pub use params::{validate_commission_rate, DistributionParams, DEFAULT_BOND_DENOM};
