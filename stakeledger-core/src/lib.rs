//! # Stakeledger Core
//!
//! Core types, decimal helpers and serialization for the stakeledger
//! accounting core.
//!
//! This crate provides the foundation for all other stakeledger crates:
//! - Address and key identifiers
//! - Multi-denomination coin amounts ([`Coin`], [`Coins`])
//! - The externally owned records the accounting core reads
//!   (accounts, validators, unbonding delegations, the consensus set)
//! - Canonical binary encoding of [`Decimal`] values
//! - Deterministic, length-prefixed binary serialization

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod decimal;
pub mod error;
pub mod serialization;
pub mod types;

// Re-export commonly used types at crate root
pub use decimal::Decimal;
pub use error::{CoreError, SerializationError};
pub use types::{
    Account, Address, BondStatus, Coin, Coins, ConsensusPubKey, ConsensusValidator,
    UnbondingDelegation, Validator,
};
