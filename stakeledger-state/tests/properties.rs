//! Property tests for the accounting core.

use proptest::prelude::*;
use rust_decimal::Decimal;
use stakeledger_core::{BondStatus, Coins, Validator};
use stakeledger_state::{
    invariants, Accumulator, DistributionParams, FeePool, LedgerReader, LedgerState, LedgerWriter,
    Pool, PoolCounter, StateError,
};

fn validator(id: u8, tokens: u64, commission_pct: u32) -> Validator {
    Validator {
        operator: [id; 20],
        consensus_pubkey: [id; 32],
        status: BondStatus::Bonded,
        tokens: Decimal::from(tokens),
        commission_rate: Decimal::new(commission_pct as i64, 2),
    }
}

#[derive(Clone, Debug)]
enum Transfer {
    LooseToBonded(u64),
    BondedToUnbonding(u64),
    UnbondingToLoose(u64),
    UnbondingToBonded(u64),
    BondedToLoose(u64),
}

fn transfer_strategy() -> impl Strategy<Value = Transfer> {
    prop_oneof![
        (0u64..500).prop_map(Transfer::LooseToBonded),
        (0u64..500).prop_map(Transfer::BondedToUnbonding),
        (0u64..500).prop_map(Transfer::UnbondingToLoose),
        (0u64..500).prop_map(Transfer::UnbondingToBonded),
        (0u64..500).prop_map(Transfer::BondedToLoose),
    ]
}

fn apply(pool: &Pool, transfer: &Transfer) -> Result<Pool, StateError> {
    match *transfer {
        Transfer::LooseToBonded(n) => pool.loose_to_bonded(Decimal::from(n)),
        Transfer::BondedToUnbonding(n) => pool.bonded_to_unbonding(Decimal::from(n)),
        Transfer::UnbondingToLoose(n) => pool.unbonding_to_loose(Decimal::from(n)),
        Transfer::UnbondingToBonded(n) => pool.unbonding_to_bonded(Decimal::from(n)),
        Transfer::BondedToLoose(n) => pool.bonded_to_loose(Decimal::from(n)),
    }
}

proptest! {
    #[test]
    fn accumulator_equals_sum_of_spans(
        steps in prop::collection::vec((0i64..1_000, 0u64..1_000_000, 0u32..6), 1..40)
    ) {
        let mut acc = Accumulator::new(0);
        let mut height = 0i64;
        let mut expected = Decimal::ZERO;

        for (gap, mantissa, scale) in steps {
            let rate = Decimal::new(mantissa as i64, scale);
            height += gap;
            expected += rate * Decimal::from(gap);
            acc = acc.update_for_new_height(height, rate).unwrap();
        }

        prop_assert_eq!(acc.accum(), expected);
        prop_assert_eq!(acc.update_height(), height);
    }

    #[test]
    fn accumulator_same_height_is_identity(
        height in 0i64..1_000_000,
        accum in 0u64..u32::MAX as u64,
        rate in 0u64..u32::MAX as u64,
    ) {
        let acc = Accumulator::from_parts(height, Decimal::from(accum));
        prop_assert_eq!(acc.update_for_new_height(height, Decimal::from(rate)).unwrap(), acc);
    }

    #[test]
    fn paired_transfers_conserve_supply(
        loose in 0u64..2_000,
        bonded in 0u64..2_000,
        unbonding in 0u64..2_000,
        transfers in prop::collection::vec(transfer_strategy(), 0..50),
    ) {
        let mut pool = Pool::genesis(
            Decimal::from(loose),
            Decimal::from(bonded),
            Decimal::from(unbonding),
            0,
        ).unwrap();
        let total = pool.total_tokens().unwrap();

        for transfer in &transfers {
            match apply(&pool, transfer) {
                Ok(next) => pool = next,
                Err(StateError::NegativeBalance { .. }) => {}
                Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            }
            prop_assert_eq!(pool.total_tokens().unwrap(), total);
        }
    }

    #[test]
    fn overdrawn_bonded_leaves_pool_unchanged(bonded in 0u64..10_000, excess in 1u64..10_000) {
        let pool = Pool::genesis(Decimal::from(5u64), Decimal::from(bonded), Decimal::ZERO, 0).unwrap();
        let before = pool;

        let result = pool.add_bonded_tokens(-Decimal::from(bonded + excess));
        let is_bonded_negative = matches!(
            result,
            Err(StateError::NegativeBalance { counter: PoolCounter::Bonded, .. })
        );
        prop_assert!(is_bonded_negative);
        prop_assert_eq!(pool, before);
    }

    #[test]
    fn inject_fees_is_exact(
        amount in 0u64..u64::MAX / 2,
        tax_pct in 0u32..=100,
        powers in prop::collection::vec((1u64..1_000_000_000, 0u32..=100), 0..12),
    ) {
        let validators: Vec<Validator> = powers
            .iter()
            .enumerate()
            .map(|(i, (power, commission))| validator(i as u8, *power, *commission))
            .collect();
        let params = DistributionParams {
            bond_denom: "stake".to_string(),
            community_tax: Decimal::new(tax_pct as i64, 2),
        };
        let fees = Coins::single("stake", amount);

        let (fee_pool, allocation) = FeePool::initial()
            .inject_fees(1, &fees, &validators, &params)
            .unwrap();

        prop_assert_eq!(allocation.total().unwrap(), fees.clone());
        prop_assert_eq!(fee_pool.holdings_of("stake").unwrap(), Decimal::from(amount));
        if validators.is_empty() {
            prop_assert_eq!(fee_pool.community_pool(), &fees);
        }
    }

    #[test]
    fn supply_violation_after_corrupting_bonded(delta in 1u64..1_000) {
        let mut state = LedgerState::genesis(
            DistributionParams::default(),
            vec![],
            vec![validator(1, 500, 5), validator(2, 250, 5)],
            vec![],
            FeePool::initial(),
        ).unwrap();
        prop_assert_eq!(invariants::supply_invariant(&state), Ok(()));

        let corrupted = state.pool().unwrap().add_bonded_tokens(Decimal::from(delta)).unwrap();
        state.set_pool(&corrupted).unwrap();

        let is_bonded_mismatch = matches!(
            invariants::supply_invariant(&state),
            Err(invariants::InvariantError::BondedTokensMismatch { .. })
        );
        prop_assert!(is_bonded_mismatch);
    }
}
