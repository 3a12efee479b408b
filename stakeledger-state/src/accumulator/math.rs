//! Height-integral arithmetic.
//!
//! The accumulated value over a span of blocks is `rate * (to - from)`.
//! Everything here is checked: an overflowing product is an error, never
//! a wrapped or saturated value.

use stakeledger_core::Decimal;

use crate::error::{StateError, StateResult};

/// Integrate a constant `rate` over the heights `from..to`.
///
/// Requires `to >= from` and a non-negative rate.
pub fn integrate(rate: Decimal, from: i64, to: i64) -> StateResult<Decimal> {
    if to < from {
        return Err(StateError::OutOfOrderHeight {
            last: from,
            requested: to,
        });
    }
    if rate.is_sign_negative() && !rate.is_zero() {
        return Err(StateError::InvalidAmount { amount: rate });
    }

    let blocks = to.checked_sub(from).ok_or(StateError::ArithmeticOverflow)?;
    rate.checked_mul(Decimal::from(blocks))
        .ok_or(StateError::ArithmeticOverflow)
}
