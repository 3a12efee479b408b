//! Loose / bonded / unbonding counters.

use serde::{Deserialize, Serialize};
use stakeledger_core::decimal::canonical;
use stakeledger_core::Decimal;

use crate::accumulator::Accumulator;
use crate::error::{PoolCounter, StateError, StateResult};

/// Global staking pool.
///
/// `loose + bonded + unbonding` is the total supply. Only mint and burn
/// (and slashing, which burns) change that sum; every other transition
/// moves tokens between two counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    #[serde(with = "canonical")]
    loose_tokens: Decimal,
    #[serde(with = "canonical")]
    bonded_tokens: Decimal,
    #[serde(with = "canonical")]
    unbonding_tokens: Decimal,
    bonded_val_accum: Accumulator,
}

impl Pool {
    /// Build a pool from explicit counters.
    ///
    /// Fails with [`StateError::InvalidAmount`] if any counter is negative.
    pub fn new(
        loose_tokens: Decimal,
        bonded_tokens: Decimal,
        unbonding_tokens: Decimal,
        bonded_val_accum: Accumulator,
    ) -> StateResult<Self> {
        for value in [loose_tokens, bonded_tokens, unbonding_tokens] {
            if is_negative(value) {
                return Err(StateError::InvalidAmount { amount: value });
            }
        }

        Ok(Self {
            loose_tokens,
            bonded_tokens,
            unbonding_tokens,
            bonded_val_accum,
        })
    }

    /// Genesis pool with a fresh accumulator anchored at `height`.
    pub fn genesis(
        loose_tokens: Decimal,
        bonded_tokens: Decimal,
        unbonding_tokens: Decimal,
        height: i64,
    ) -> StateResult<Self> {
        Self::new(
            loose_tokens,
            bonded_tokens,
            unbonding_tokens,
            Accumulator::new(height),
        )
    }

    /// Empty pool at height zero.
    pub fn empty() -> Self {
        Self {
            loose_tokens: Decimal::ZERO,
            bonded_tokens: Decimal::ZERO,
            unbonding_tokens: Decimal::ZERO,
            bonded_val_accum: Accumulator::default(),
        }
    }

    pub fn loose_tokens(&self) -> Decimal {
        self.loose_tokens
    }

    pub fn bonded_tokens(&self) -> Decimal {
        self.bonded_tokens
    }

    pub fn unbonding_tokens(&self) -> Decimal {
        self.unbonding_tokens
    }

    pub fn bonded_val_accum(&self) -> Accumulator {
        self.bonded_val_accum
    }

    /// Sum of all three counters.
    pub fn total_tokens(&self) -> StateResult<Decimal> {
        self.loose_tokens
            .checked_add(self.bonded_tokens)
            .and_then(|sum| sum.checked_add(self.unbonding_tokens))
            .ok_or(StateError::ArithmeticOverflow)
    }

    /// Fraction of the supply that is bonded, zero for an empty pool.
    pub fn bonded_ratio(&self) -> StateResult<Decimal> {
        let total = self.total_tokens()?;
        if total.is_zero() {
            return Ok(Decimal::ZERO);
        }
        self.bonded_tokens
            .checked_div(total)
            .ok_or(StateError::ArithmeticOverflow)
    }

    // === Single-counter adjustments ===

    /// Adjust loose tokens by a signed amount.
    pub fn add_loose_tokens(&self, delta: Decimal) -> StateResult<Self> {
        let loose_tokens = apply_delta(PoolCounter::Loose, self.loose_tokens, delta)?;
        Ok(Self {
            loose_tokens,
            ..*self
        })
    }

    /// Adjust bonded tokens by a signed amount.
    pub fn add_bonded_tokens(&self, delta: Decimal) -> StateResult<Self> {
        let bonded_tokens = apply_delta(PoolCounter::Bonded, self.bonded_tokens, delta)?;
        Ok(Self {
            bonded_tokens,
            ..*self
        })
    }

    /// Adjust unbonding tokens by a signed amount.
    pub fn add_unbonding_tokens(&self, delta: Decimal) -> StateResult<Self> {
        let unbonding_tokens =
            apply_delta(PoolCounter::Unbonding, self.unbonding_tokens, delta)?;
        Ok(Self {
            unbonding_tokens,
            ..*self
        })
    }

    // === Paired transitions ===

    /// Move tokens from loose to bonded (delegation to a bonded validator).
    pub fn loose_to_bonded(&self, amount: Decimal) -> StateResult<Self> {
        self.transfer(PoolCounter::Loose, PoolCounter::Bonded, amount)
    }

    /// Move tokens from bonded to unbonding.
    pub fn bonded_to_unbonding(&self, amount: Decimal) -> StateResult<Self> {
        self.transfer(PoolCounter::Bonded, PoolCounter::Unbonding, amount)
    }

    /// Release matured unbonding tokens back to loose.
    pub fn unbonding_to_loose(&self, amount: Decimal) -> StateResult<Self> {
        self.transfer(PoolCounter::Unbonding, PoolCounter::Loose, amount)
    }

    /// Return unbonding tokens to the bonded state.
    pub fn unbonding_to_bonded(&self, amount: Decimal) -> StateResult<Self> {
        self.transfer(PoolCounter::Unbonding, PoolCounter::Bonded, amount)
    }

    /// Move tokens straight from bonded to loose.
    pub fn bonded_to_loose(&self, amount: Decimal) -> StateResult<Self> {
        self.transfer(PoolCounter::Bonded, PoolCounter::Loose, amount)
    }

    fn transfer(&self, from: PoolCounter, to: PoolCounter, amount: Decimal) -> StateResult<Self> {
        require_non_negative(amount)?;
        // Both sides are computed before anything is returned
        self.adjust(from, -amount)?.adjust(to, amount)
    }

    fn adjust(&self, counter: PoolCounter, delta: Decimal) -> StateResult<Self> {
        match counter {
            PoolCounter::Loose => self.add_loose_tokens(delta),
            PoolCounter::Bonded => self.add_bonded_tokens(delta),
            PoolCounter::Unbonding => self.add_unbonding_tokens(delta),
        }
    }

    // === Supply changes ===

    /// Create new loose tokens.
    pub fn mint(&self, amount: Decimal) -> StateResult<Self> {
        require_non_negative(amount)?;
        self.add_loose_tokens(amount)
    }

    /// Destroy loose tokens.
    pub fn burn_loose(&self, amount: Decimal) -> StateResult<Self> {
        require_non_negative(amount)?;
        self.add_loose_tokens(-amount)
    }

    /// Destroy bonded tokens (slashing of a bonded validator).
    pub fn slash_bonded(&self, amount: Decimal) -> StateResult<Self> {
        require_non_negative(amount)?;
        self.add_bonded_tokens(-amount)
    }

    /// Destroy unbonding tokens (slashing of an in-flight unbonding).
    pub fn slash_unbonding(&self, amount: Decimal) -> StateResult<Self> {
        require_non_negative(amount)?;
        self.add_unbonding_tokens(-amount)
    }

    // === Accumulator ===

    /// Advance `bonded_val_accum` to `height` at `total_power`.
    pub fn update_bonded_val_accum(&self, height: i64, total_power: Decimal) -> StateResult<Self> {
        let bonded_val_accum = self
            .bonded_val_accum
            .update_for_new_height(height, total_power)?;
        Ok(Self {
            bonded_val_accum,
            ..*self
        })
    }
}

fn is_negative(value: Decimal) -> bool {
    value.is_sign_negative() && !value.is_zero()
}

fn require_non_negative(amount: Decimal) -> StateResult<()> {
    if is_negative(amount) {
        return Err(StateError::InvalidAmount { amount });
    }
    Ok(())
}

fn apply_delta(counter: PoolCounter, balance: Decimal, delta: Decimal) -> StateResult<Decimal> {
    let updated = balance
        .checked_add(delta)
        .ok_or(StateError::ArithmeticOverflow)?;
    if is_negative(updated) {
        return Err(StateError::NegativeBalance {
            counter,
            balance,
            delta,
        });
    }
    Ok(updated)
}
