//! Token pool bookkeeping.
//!
//! The [`Pool`] tracks how the total supply splits between loose, bonded
//! and unbonding tokens. Every operation returns a new pool and leaves the
//! receiver untouched, so a failed transition never half-applies.

mod pool;

pub use pool::Pool;
