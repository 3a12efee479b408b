//! Invariant violations.

use std::fmt;

use stakeledger_core::Decimal;

use crate::error::StateError;

/// A failed invariant, or a failure to read the state it checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantError {
    /// Stored loose tokens differ from the sum of liquid holdings.
    LooseTokensMismatch { stored: Decimal, computed: Decimal },
    /// Stored unbonding tokens differ from the sum of in-flight unbonding.
    UnbondingTokensMismatch { stored: Decimal, computed: Decimal },
    /// Stored bonded tokens differ from the sum of bonded power.
    BondedTokensMismatch { stored: Decimal, computed: Decimal },
    /// A bonded validator has zero or negative power.
    NonPositivePower { pubkey: String, power: Decimal },
    /// The consensus validator set diverges from the bonded set.
    ValidatorSetMismatch {
        /// Bonded validators absent from the consensus set.
        missing: Vec<String>,
        /// Consensus entries with no bonded validator.
        unexpected: Vec<String>,
        /// Keys present in both with different power.
        mismatched: Vec<String>,
    },
    /// The state could not be read.
    Read(StateError),
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantError::LooseTokensMismatch { stored, computed } => {
                write!(
                    f,
                    "expected loose tokens to equal total bond denom held liquid - \
                     pool.loose_tokens: {}, sum of liquid holdings: {}",
                    stored, computed
                )
            }
            InvariantError::UnbondingTokensMismatch { stored, computed } => {
                write!(
                    f,
                    "expected unbonding tokens to equal total bond denom in unbonding - \
                     pool.unbonding_tokens: {}, sum of unbonding balances: {}",
                    stored, computed
                )
            }
            InvariantError::BondedTokensMismatch { stored, computed } => {
                write!(
                    f,
                    "expected bonded tokens to equal total power of bonded validators - \
                     pool.bonded_tokens: {}, sum of bonded power: {}",
                    stored, computed
                )
            }
            InvariantError::NonPositivePower { pubkey, power } => {
                write!(
                    f,
                    "validator with non-positive power stored (pubkey {}, power {})",
                    pubkey, power
                )
            }
            InvariantError::ValidatorSetMismatch {
                missing,
                unexpected,
                mismatched,
            } => {
                write!(
                    f,
                    "consensus validator set diverges from bonded set - missing: [{}], unexpected: [{}], power mismatch: [{}]",
                    missing.join(", "),
                    unexpected.join(", "),
                    mismatched.join(", ")
                )
            }
            InvariantError::Read(err) => write!(f, "failed to read state: {}", err),
        }
    }
}

impl std::error::Error for InvariantError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InvariantError::Read(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StateError> for InvariantError {
    fn from(err: StateError) -> Self {
        InvariantError::Read(err)
    }
}

/// Result of an invariant check.
pub type InvariantResult = Result<(), InvariantError>;
