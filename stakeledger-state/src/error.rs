//! Error types for ledger accounting operations.

use std::fmt;

use stakeledger_core::{Address, Coins, Decimal};

/// One of the three pool counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoolCounter {
    /// Tokens held liquid by accounts and the fee pool.
    Loose,
    /// Tokens bonded to validators in the active set.
    Bonded,
    /// Tokens in a timed transition out of the bonded state.
    Unbonding,
}

impl fmt::Display for PoolCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolCounter::Loose => write!(f, "loose_tokens"),
            PoolCounter::Bonded => write!(f, "bonded_tokens"),
            PoolCounter::Unbonding => write!(f, "unbonding_tokens"),
        }
    }
}

/// All errors raised by pool, fee-pool and accumulator bookkeeping.
///
/// None of these are recoverable inside the state machine: the block
/// driver must halt rather than commit the transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateError {
    // === Accumulator Errors ===
    /// Accumulator asked to move to a height below its last update.
    OutOfOrderHeight { last: i64, requested: i64 },

    // === Pool Errors ===
    /// A pool counter would go below zero.
    NegativeBalance {
        counter: PoolCounter,
        balance: Decimal,
        delta: Decimal,
    },
    /// A transfer, mint or burn was given a negative amount.
    InvalidAmount { amount: Decimal },

    // === Distribution Errors ===
    /// A reward debit exceeds what remains in the validator's pool.
    InsufficientPool {
        validator: Address,
        available: Coins,
        requested: Coins,
    },
    /// A validator's commission rate lies outside `[0, 1]`.
    InvalidCommissionRate { validator: Address, rate: Decimal },
    /// Distribution parameters failed validation.
    InvalidParams { reason: String },

    // === Storage Errors ===
    /// A record that must exist after genesis is absent.
    MissingRequiredRecord { record: &'static str },
    /// The backing store failed.
    Storage(String),

    // === General Errors ===
    /// Arithmetic overflow in a decimal or coin computation.
    ArithmeticOverflow,
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::OutOfOrderHeight { last, requested } => {
                write!(
                    f,
                    "accumulator height regression: last update at {}, requested {}",
                    last, requested
                )
            }
            StateError::NegativeBalance {
                counter,
                balance,
                delta,
            } => {
                write!(
                    f,
                    "{} would go negative: balance {}, delta {}",
                    counter, balance, delta
                )
            }
            StateError::InvalidAmount { amount } => {
                write!(f, "amount must be non-negative, got {}", amount)
            }
            StateError::InsufficientPool {
                validator,
                available,
                requested,
            } => {
                write!(
                    f,
                    "insufficient reward pool for validator {}: available {}, requested {}",
                    hex::encode(validator),
                    available,
                    requested
                )
            }
            StateError::InvalidCommissionRate { validator, rate } => {
                write!(
                    f,
                    "commission rate {} of validator {} outside [0, 1]",
                    rate,
                    hex::encode(validator)
                )
            }
            StateError::InvalidParams { reason } => {
                write!(f, "invalid distribution params: {}", reason)
            }
            StateError::MissingRequiredRecord { record } => {
                write!(f, "required record missing from store: {}", record)
            }
            StateError::Storage(msg) => write!(f, "storage error: {}", msg),
            StateError::ArithmeticOverflow => write!(f, "arithmetic overflow"),
        }
    }
}

impl std::error::Error for StateError {}

/// Result type for state operations.
pub type StateResult<T> = Result<T, StateError>;
