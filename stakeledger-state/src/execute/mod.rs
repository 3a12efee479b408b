//! Block hooks and message handlers.
//!
//! Each operation reads the records it needs, computes the new values,
//! and only then writes them back. A failed operation writes nothing.
//!
//! Operations that change the bonded total first advance the pool's
//! `bonded_val_accum` to the current height at the old total.

mod distribution;
mod staking;

pub use distribution::{allocate_fees, withdraw_delegator_reward, withdraw_validator_commission};
pub use staking::{
    begin_unbonding, bond_tokens, burn_tokens, complete_unbonding, mint_tokens,
    rebond_unbonding, record_bonded_power, slash_bonded, slash_unbonding, unbond_to_loose,
};
