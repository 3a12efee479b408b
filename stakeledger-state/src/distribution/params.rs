//! Distribution parameters.

use serde::{Deserialize, Serialize};
use stakeledger_core::decimal::canonical;
use stakeledger_core::Decimal;

use crate::error::{StateError, StateResult};
use crate::source::HasPower;

/// Default staking denomination.
pub const DEFAULT_BOND_DENOM: &str = "stake";

/// Consensus parameters read by fee injection and the supply check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionParams {
    /// Denomination that is bonded and counted by the supply invariant.
    pub bond_denom: String,
    /// Fraction of every fee injection routed to the community pool.
    #[serde(with = "canonical")]
    pub community_tax: Decimal,
}

impl DistributionParams {
    /// Check that the denomination is set and the tax lies in `[0, 1]`.
    pub fn validate(&self) -> StateResult<()> {
        if self.bond_denom.is_empty() {
            return Err(StateError::InvalidParams {
                reason: "bond denomination is empty".to_string(),
            });
        }
        if self.community_tax < Decimal::ZERO || self.community_tax > Decimal::ONE {
            return Err(StateError::InvalidParams {
                reason: format!("community tax {} outside [0, 1]", self.community_tax),
            });
        }
        Ok(())
    }
}

/// Check that a validator's commission rate lies in `[0, 1]`.
pub fn validate_commission_rate<V: HasPower + ?Sized>(validator: &V) -> StateResult<()> {
    let rate = validator.commission_rate();
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(StateError::InvalidCommissionRate {
            validator: validator.operator(),
            rate,
        });
    }
    Ok(())
}

impl Default for DistributionParams {
    fn default() -> Self {
        Self {
            bond_denom: DEFAULT_BOND_DENOM.to_string(),
            // 2%
            community_tax: Decimal::new(2, 2),
        }
    }
}
