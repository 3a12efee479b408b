//! Validator records.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Address, ConsensusPubKey};
use crate::decimal::{canonical, Decimal};
use crate::serialization::hex_bytes;

/// Bonding status of a validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BondStatus {
    /// In the active set; tokens count as bonded.
    Bonded,
    /// Leaving the active set; tokens still locked.
    Unbonding,
    /// Outside the active set.
    Unbonded,
}

impl fmt::Display for BondStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BondStatus::Bonded => write!(f, "bonded"),
            BondStatus::Unbonding => write!(f, "unbonding"),
            BondStatus::Unbonded => write!(f, "unbonded"),
        }
    }
}

/// A validator as seen by the accounting core.
///
/// Status transitions belong to the staking state machine; this record
/// is read for power, token holdings and commission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// Operator address, also the validator's id in the fee pool.
    #[serde(with = "hex_bytes")]
    pub operator: Address,
    /// Consensus public key.
    #[serde(with = "hex_bytes")]
    pub consensus_pubkey: ConsensusPubKey,
    /// Bonding status.
    pub status: BondStatus,
    /// Tokens delegated to this validator.
    #[serde(with = "canonical")]
    pub tokens: Decimal,
    /// Fraction of rewards kept as commission, in `[0, 1]`.
    #[serde(with = "canonical")]
    pub commission_rate: Decimal,
}

impl Validator {
    /// Voting power: the tokens of a bonded validator, zero otherwise.
    pub fn power(&self) -> Decimal {
        match self.status {
            BondStatus::Bonded => self.tokens,
            BondStatus::Unbonding | BondStatus::Unbonded => Decimal::ZERO,
        }
    }

    /// Check if the validator is bonded.
    pub fn is_bonded(&self) -> bool {
        self.status == BondStatus::Bonded
    }

    /// Entry this validator contributes to the consensus validator set.
    pub fn consensus_entry(&self) -> ConsensusValidator {
        ConsensusValidator {
            pubkey: self.consensus_pubkey,
            power: self.power(),
        }
    }
}

/// One member of the validator set handed to the consensus engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusValidator {
    /// Consensus public key.
    #[serde(with = "hex_bytes")]
    pub pubkey: ConsensusPubKey,
    /// Voting power.
    #[serde(with = "canonical")]
    pub power: Decimal,
}
