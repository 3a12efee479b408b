//! Fee allocation and reward withdrawal.

use stakeledger_core::{Address, Coins};

use crate::distribution::FeeAllocation;
use crate::error::StateResult;
use crate::source::HasPower;
use crate::state::LedgerWriter;

/// Distribute the fees collected in a block.
///
/// `validators` is the staking module's current validator list; only the
/// bonded ones share in the fees.
pub fn allocate_fees<S, V>(
    state: &mut S,
    height: i64,
    fees: &Coins,
    validators: &[V],
) -> StateResult<FeeAllocation>
where
    S: LedgerWriter,
    V: HasPower,
{
    let params = state.params()?;
    let fee_pool = state.fee_pool()?;

    let (fee_pool, allocation) = fee_pool.inject_fees(height, fees, validators, &params)?;
    state.set_fee_pool(&fee_pool)?;

    Ok(allocation)
}

/// Pay out a validator's accrued commission.
///
/// Returns the coins withdrawn. Nothing accrued is not an error: the
/// result is empty and the store is untouched.
pub fn withdraw_validator_commission<S: LedgerWriter>(
    state: &mut S,
    validator: &Address,
) -> StateResult<Coins> {
    let reward_pool = match state.reward_pool(validator)? {
        Some(reward_pool) if !reward_pool.pool_commission.is_zero() => reward_pool,
        _ => {
            tracing::debug!(validator = %hex::encode(validator), "No commission to withdraw");
            return Ok(Coins::new());
        }
    };

    let (remaining, commission) = reward_pool.withdraw_commission();
    state.set_reward_pool(validator, &remaining)?;

    tracing::debug!(
        validator = %hex::encode(validator),
        amount = %commission,
        "Withdrew validator commission"
    );
    Ok(commission)
}

/// Pay delegator rewards out of a validator's pool.
pub fn withdraw_delegator_reward<S: LedgerWriter>(
    state: &mut S,
    validator: &Address,
    amount: &Coins,
) -> StateResult<()> {
    if amount.is_zero() {
        return Ok(());
    }

    let reward_pool = state.reward_pool(validator)?.unwrap_or_default();
    let updated = reward_pool.debit(validator, amount)?;
    state.set_reward_pool(validator, &updated)?;

    tracing::debug!(
        validator = %hex::encode(validator),
        amount = %amount,
        "Withdrew delegator reward"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{DistributionParams, FeePool};
    use crate::error::StateError;
    use crate::state::{LedgerReader, LedgerState};
    use rust_decimal_macros::dec;
    use stakeledger_core::{BondStatus, Validator};

    fn setup() -> (LedgerState, Vec<Validator>) {
        let validators = vec![
            Validator {
                operator: [1u8; 20],
                consensus_pubkey: [1u8; 32],
                status: BondStatus::Bonded,
                tokens: dec!(75),
                commission_rate: dec!(0.2),
            },
            Validator {
                operator: [2u8; 20],
                consensus_pubkey: [2u8; 32],
                status: BondStatus::Bonded,
                tokens: dec!(25),
                commission_rate: dec!(0),
            },
        ];
        let state = LedgerState::genesis(
            DistributionParams {
                bond_denom: "stake".to_string(),
                community_tax: dec!(0.1),
            },
            vec![],
            validators.clone(),
            vec![],
            FeePool::initial(),
        )
        .unwrap();
        (state, validators)
    }

    #[test]
    fn test_allocate_then_withdraw() {
        let (mut state, validators) = setup();
        let fees = Coins::single("stake", 1000);

        let allocation = allocate_fees(&mut state, 1, &fees, &validators).unwrap();
        assert_eq!(allocation.total().unwrap(), fees);
        assert_eq!(allocation.community, Coins::single("stake", 100));

        // 900 split 675 / 225; commission floor(675 * 0.2) = 135
        let commission = withdraw_validator_commission(&mut state, &[1u8; 20]).unwrap();
        assert_eq!(commission, Coins::single("stake", 135));

        withdraw_delegator_reward(&mut state, &[1u8; 20], &Coins::single("stake", 540)).unwrap();
        let remaining = state.reward_pool(&[1u8; 20]).unwrap().unwrap();
        assert!(remaining.is_empty());
    }

    #[test]
    fn test_withdraw_commission_noop() {
        let (mut state, _) = setup();
        let before = state.fee_pool().unwrap();

        let commission = withdraw_validator_commission(&mut state, &[2u8; 20]).unwrap();
        assert!(commission.is_zero());
        assert_eq!(state.fee_pool().unwrap(), before);
    }

    #[test]
    fn test_overdrawn_reward_writes_nothing() {
        let (mut state, validators) = setup();
        allocate_fees(&mut state, 1, &Coins::single("stake", 100), &validators).unwrap();
        let before = state.fee_pool().unwrap();

        let err = withdraw_delegator_reward(&mut state, &[2u8; 20], &Coins::single("stake", 23))
            .unwrap_err();
        assert!(matches!(err, StateError::InsufficientPool { .. }));
        assert_eq!(state.fee_pool().unwrap(), before);
    }
}
