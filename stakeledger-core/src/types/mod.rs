//! Core data types.
//!
//! - Address and consensus key identifiers
//! - [`Coin`] and [`Coins`] amounts
//! - Records owned by the account, staking and consensus modules that the
//!   accounting core reads but never mutates: [`Account`], [`Validator`],
//!   [`UnbondingDelegation`], [`ConsensusValidator`]

mod account;
mod coin;
mod unbonding;
mod validator;

pub use account::Account;
pub use coin::{Coin, Coins};
pub use unbonding::UnbondingDelegation;
pub use validator::{BondStatus, ConsensusValidator, Validator};

/// A 20-byte account or validator operator address.
pub type Address = [u8; 20];

/// A 32-byte consensus (block-signing) public key.
pub type ConsensusPubKey = [u8; 32];
