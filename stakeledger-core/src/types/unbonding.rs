//! Unbonding delegation records.

use serde::{Deserialize, Serialize};

use super::{Address, Coin};
use crate::serialization::hex_bytes;

/// Tokens leaving a validator, locked until `completion_height`.
///
/// While in flight the balance counts towards the pool's unbonding tokens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondingDelegation {
    /// Delegator receiving the tokens.
    #[serde(with = "hex_bytes")]
    pub delegator: Address,
    /// Validator the tokens were bonded to.
    #[serde(with = "hex_bytes")]
    pub validator: Address,
    /// Height the unbonding started.
    pub creation_height: i64,
    /// Height the tokens become liquid.
    pub completion_height: i64,
    /// Amount being unbonded.
    pub balance: Coin,
}

impl UnbondingDelegation {
    /// Check if the unbonding has matured at `height`.
    pub fn is_mature(&self, height: i64) -> bool {
        height >= self.completion_height
    }
}
