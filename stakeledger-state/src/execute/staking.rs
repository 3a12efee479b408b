//! Pool transitions driven by the staking module.

use stakeledger_core::Decimal;

use crate::bond::Pool;
use crate::error::StateResult;
use crate::state::LedgerWriter;

/// Read the pool, apply `f`, write the result.
fn update_pool<S, F>(state: &mut S, op: &'static str, f: F) -> StateResult<Pool>
where
    S: LedgerWriter,
    F: FnOnce(Pool) -> StateResult<Pool>,
{
    let pool = state.pool()?;
    let updated = f(pool)?;
    state.set_pool(&updated)?;

    tracing::debug!(
        op,
        loose = %updated.loose_tokens(),
        bonded = %updated.bonded_tokens(),
        unbonding = %updated.unbonding_tokens(),
        "Pool updated"
    );
    Ok(updated)
}

/// Advance the bonded accumulator at the pre-change bonded total.
fn accrue(pool: Pool, height: i64) -> StateResult<Pool> {
    pool.update_bonded_val_accum(height, pool.bonded_tokens())
}

/// Delegate loose tokens to a bonded validator.
pub fn bond_tokens<S: LedgerWriter>(state: &mut S, height: i64, amount: Decimal) -> StateResult<Pool> {
    update_pool(state, "bond", |pool| accrue(pool, height)?.loose_to_bonded(amount))
}

/// Start unbonding tokens from a bonded validator.
pub fn begin_unbonding<S: LedgerWriter>(
    state: &mut S,
    height: i64,
    amount: Decimal,
) -> StateResult<Pool> {
    update_pool(state, "begin_unbonding", |pool| {
        accrue(pool, height)?.bonded_to_unbonding(amount)
    })
}

/// Release matured unbonding tokens to loose.
pub fn complete_unbonding<S: LedgerWriter>(state: &mut S, amount: Decimal) -> StateResult<Pool> {
    update_pool(state, "complete_unbonding", |pool| pool.unbonding_to_loose(amount))
}

/// Return unbonding tokens to a bonded validator.
pub fn rebond_unbonding<S: LedgerWriter>(
    state: &mut S,
    height: i64,
    amount: Decimal,
) -> StateResult<Pool> {
    update_pool(state, "rebond", |pool| {
        accrue(pool, height)?.unbonding_to_bonded(amount)
    })
}

/// Move bonded tokens straight to loose.
pub fn unbond_to_loose<S: LedgerWriter>(
    state: &mut S,
    height: i64,
    amount: Decimal,
) -> StateResult<Pool> {
    update_pool(state, "unbond_to_loose", |pool| {
        accrue(pool, height)?.bonded_to_loose(amount)
    })
}

/// Create new loose tokens.
pub fn mint_tokens<S: LedgerWriter>(state: &mut S, amount: Decimal) -> StateResult<Pool> {
    update_pool(state, "mint", |pool| pool.mint(amount))
}

/// Destroy loose tokens.
pub fn burn_tokens<S: LedgerWriter>(state: &mut S, amount: Decimal) -> StateResult<Pool> {
    update_pool(state, "burn", |pool| pool.burn_loose(amount))
}

/// Destroy tokens slashed from a bonded validator.
pub fn slash_bonded<S: LedgerWriter>(
    state: &mut S,
    height: i64,
    amount: Decimal,
) -> StateResult<Pool> {
    update_pool(state, "slash_bonded", |pool| {
        accrue(pool, height)?.slash_bonded(amount)
    })
}

/// Destroy tokens slashed from unbonding delegations.
pub fn slash_unbonding<S: LedgerWriter>(state: &mut S, amount: Decimal) -> StateResult<Pool> {
    update_pool(state, "slash_unbonding", |pool| pool.slash_unbonding(amount))
}

/// Advance both power accumulators to `height` at the current bonded total.
///
/// Called at the start of every block so the integrals never lag by more
/// than one block. Pool and fee pool are written together.
pub fn record_bonded_power<S: LedgerWriter>(state: &mut S, height: i64) -> StateResult<()> {
    let pool = state.pool()?;
    let fee_pool = state.fee_pool()?;
    let power = pool.bonded_tokens();

    let pool = pool.update_bonded_val_accum(height, power)?;
    let fee_pool = fee_pool.update_total_val_accum(height, power)?;
    state.set_ledger(&pool, &fee_pool)?;

    tracing::debug!(height, power = %power, "Recorded bonded power");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{DistributionParams, FeePool};
    use crate::error::{PoolCounter, StateError};
    use crate::state::{LedgerReader, LedgerState};
    use rust_decimal_macros::dec;

    fn state() -> LedgerState {
        let mut state = LedgerState::new();
        state
            .set_pool(&Pool::genesis(dec!(1000), dec!(200), dec!(0), 0).unwrap())
            .unwrap();
        state.set_fee_pool(&FeePool::initial()).unwrap();
        state.set_params(&DistributionParams::default()).unwrap();
        state
    }

    #[test]
    fn test_bond_accrues_at_old_total() {
        let mut state = state();
        let pool = bond_tokens(&mut state, 5, dec!(300)).unwrap();

        assert_eq!(pool.bonded_tokens(), dec!(500));
        assert_eq!(pool.loose_tokens(), dec!(700));
        // 5 blocks at 200 bonded
        assert_eq!(pool.bonded_val_accum().accum(), dec!(1000));
        assert_eq!(state.pool().unwrap(), pool);
    }

    #[test]
    fn test_unbonding_lifecycle() {
        let mut state = state();
        begin_unbonding(&mut state, 1, dec!(150)).unwrap();
        rebond_unbonding(&mut state, 2, dec!(50)).unwrap();
        let pool = complete_unbonding(&mut state, dec!(100)).unwrap();

        assert_eq!(pool.bonded_tokens(), dec!(100));
        assert_eq!(pool.unbonding_tokens(), dec!(0));
        assert_eq!(pool.loose_tokens(), dec!(1100));
        // 200 for one block, then 50 for one block
        assert_eq!(pool.bonded_val_accum().accum(), dec!(250));
    }

    #[test]
    fn test_failed_operation_writes_nothing() {
        let mut state = state();
        let before = state.pool().unwrap();

        let err = unbond_to_loose(&mut state, 3, dec!(201)).unwrap_err();
        assert!(matches!(
            err,
            StateError::NegativeBalance {
                counter: PoolCounter::Bonded,
                ..
            }
        ));
        assert_eq!(state.pool().unwrap(), before);
    }

    #[test]
    fn test_height_regression_writes_nothing() {
        let mut state = state();
        bond_tokens(&mut state, 10, dec!(1)).unwrap();
        let before = state.pool().unwrap();

        let err = slash_bonded(&mut state, 9, dec!(1)).unwrap_err();
        assert!(matches!(err, StateError::OutOfOrderHeight { .. }));
        assert_eq!(state.pool().unwrap(), before);
    }

    #[test]
    fn test_supply_changes() {
        let mut state = state();
        mint_tokens(&mut state, dec!(50)).unwrap();
        burn_tokens(&mut state, dec!(20)).unwrap();
        slash_bonded(&mut state, 1, dec!(10)).unwrap();
        begin_unbonding(&mut state, 1, dec!(10)).unwrap();
        let pool = slash_unbonding(&mut state, dec!(5)).unwrap();

        assert_eq!(pool.total_tokens().unwrap(), dec!(1215));
    }

    #[test]
    fn test_record_bonded_power() {
        let mut state = state();
        record_bonded_power(&mut state, 4).unwrap();

        assert_eq!(state.pool().unwrap().bonded_val_accum().accum(), dec!(800));
        assert_eq!(state.fee_pool().unwrap().total_val_accum().accum(), dec!(800));

        // Same height again changes nothing
        record_bonded_power(&mut state, 4).unwrap();
        assert_eq!(state.pool().unwrap().bonded_val_accum().accum(), dec!(800));
    }

    #[test]
    fn test_missing_pool() {
        let mut state = LedgerState::new();
        assert_eq!(
            mint_tokens(&mut state, dec!(1)),
            Err(StateError::MissingRequiredRecord { record: "pool" })
        );
    }
}
