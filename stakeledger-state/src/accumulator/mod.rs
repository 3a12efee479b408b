//! Lazily updated running integral of a rate over block height.
//!
//! An [`Accumulator`] is never advanced block by block. Each time the
//! integrated quantity is about to change, the caller moves the
//! accumulator to the current height at the old rate, which makes the
//! cost of an update independent of how many blocks passed or how many
//! delegators share the pool.

mod math;

use serde::{Deserialize, Serialize};
use stakeledger_core::decimal::canonical;
use stakeledger_core::Decimal;

use crate::error::{StateError, StateResult};

pub use math::integrate;

/// Running integral of a rate over block height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accumulator {
    update_height: i64,
    #[serde(with = "canonical")]
    accum: Decimal,
}

impl Accumulator {
    /// Create an empty accumulator anchored at `height`.
    pub fn new(height: i64) -> Self {
        Self {
            update_height: height,
            accum: Decimal::ZERO,
        }
    }

    /// Restore an accumulator from stored parts.
    pub fn from_parts(update_height: i64, accum: Decimal) -> Self {
        Self {
            update_height,
            accum,
        }
    }

    /// Height of the last update.
    pub fn update_height(&self) -> i64 {
        self.update_height
    }

    /// Accumulated value as of [`update_height`](Self::update_height).
    pub fn accum(&self) -> Decimal {
        self.accum
    }

    /// Advance to `new_height`, integrating `rate` over the elapsed blocks.
    ///
    /// `rate` is the value the integrated quantity held since the last
    /// update. At equal height the accumulator is returned unchanged.
    pub fn update_for_new_height(&self, new_height: i64, rate: Decimal) -> StateResult<Self> {
        if new_height == self.update_height {
            return Ok(*self);
        }
        let delta = integrate(rate, self.update_height, new_height)?;

        let accum = self
            .accum
            .checked_add(delta)
            .ok_or(StateError::ArithmeticOverflow)?;
        Ok(Self {
            update_height: new_height,
            accum,
        })
    }

    /// Value the accumulator would hold at `height` without moving it.
    pub fn accum_at(&self, height: i64, rate: Decimal) -> StateResult<Decimal> {
        Ok(self.update_for_new_height(height, rate)?.accum)
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new(0)
    }
}
