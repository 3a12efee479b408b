//! Acceptance tests for stakeledger-storage.
//!
//! These run the block operations and invariant checks against a keeper
//! over RocksDB:
//! 1. Persistence: genesis import survives a reopen and still passes every check
//! 2. Atomicity: a failed operation leaves the stored records untouched
//! 3. Detection: corrupting the stored pool is caught by the supply check
//! 4. Backend parity: the same operation sequence gives identical records
//!    on the memory and RocksDB backends

use std::sync::Arc;

use rust_decimal_macros::dec;
use stakeledger_core::{Account, BondStatus, Coin, Coins, UnbondingDelegation, Validator};
use stakeledger_state::invariants::{self, InvariantError};
use stakeledger_state::{execute, DistributionParams, LedgerReader, LedgerWriter, StateError};
use stakeledger_storage::{GenesisState, Keeper, KvBackend, MemoryBackend, RocksBackend};
use tempfile::TempDir;

fn validator(id: u8, tokens: rust_decimal::Decimal, rate: rust_decimal::Decimal) -> Validator {
    Validator {
        operator: [id; 20],
        consensus_pubkey: [id; 32],
        status: BondStatus::Bonded,
        tokens,
        commission_rate: rate,
    }
}

fn genesis() -> GenesisState {
    GenesisState {
        params: DistributionParams::default(),
        accounts: (0..50u8)
            .map(|i| Account::new([i; 20], Coins::single("stake", 1_000 + i as u64)))
            .collect(),
        validators: vec![
            validator(100, dec!(40000), dec!(0.05)),
            validator(101, dec!(25000), dec!(0.1)),
            validator(102, dec!(12345), dec!(0)),
        ],
        unbonding_delegations: vec![UnbondingDelegation {
            delegator: [1u8; 20],
            validator: [100u8; 20],
            creation_height: 0,
            completion_height: 50,
            balance: Coin::new("stake", 300),
        }],
        fee_pool: None,
        genesis_height: 0,
    }
}

/// Move coins out of or into an account, as the bank module would.
fn adjust_account<B: KvBackend>(keeper: &Keeper<B>, address: [u8; 20], debit: &Coins, credit: &Coins) {
    let mut account = keeper.get_account(&address).unwrap().unwrap();
    account.coins = account
        .coins
        .checked_sub(debit)
        .unwrap()
        .checked_add(credit)
        .unwrap();
    keeper.put_account(&account).unwrap();
}

/// Run a few blocks of fee collection, allocation and a withdrawal.
fn run_blocks<B: KvBackend>(keeper: &mut Keeper<B>) {
    let validators: Vec<Validator> = genesis().validators;
    for height in 1..=10 {
        execute::record_bonded_power(keeper, height).unwrap();

        // Fees are collected from an account before being allocated
        let fees = Coins::single("stake", 17 * height as u64);
        adjust_account(keeper, [0u8; 20], &fees, &Coins::new());
        execute::allocate_fees(keeper, height, &fees, &validators).unwrap();
    }

    let commission = execute::withdraw_validator_commission(keeper, &[101u8; 20]).unwrap();
    adjust_account(keeper, [49u8; 20], &Coins::new(), &commission);
}

#[test]
fn test_persistence_across_reopen() {
    let dir = TempDir::new().unwrap();

    let pool = {
        let keeper = Keeper::new(Arc::new(RocksBackend::open(dir.path()).unwrap()));
        let pool = keeper.init_genesis(&genesis()).unwrap();
        keeper.backend().flush().unwrap();
        pool
    };

    let keeper = Keeper::new(Arc::new(RocksBackend::open(dir.path()).unwrap()));
    assert_eq!(keeper.pool().unwrap(), pool);
    assert_eq!(keeper.params().unwrap(), DistributionParams::default());
    assert_eq!(invariants::all_invariants(&keeper), Ok(()));
}

#[test]
fn test_failed_operation_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut keeper = Keeper::new(Arc::new(RocksBackend::open(dir.path()).unwrap()));
    keeper.init_genesis(&genesis()).unwrap();
    execute::record_bonded_power(&mut keeper, 5).unwrap();

    let pool_before = keeper.pool().unwrap();
    let fee_pool_before = keeper.fee_pool().unwrap();

    // Height regression on the fee accumulator
    let err = execute::record_bonded_power(&mut keeper, 4).unwrap_err();
    assert!(matches!(err, StateError::OutOfOrderHeight { .. }));

    // Overdrawn bonded counter
    let err = execute::unbond_to_loose(&mut keeper, 6, dec!(1000000)).unwrap_err();
    assert!(matches!(err, StateError::NegativeBalance { .. }));

    assert_eq!(keeper.pool().unwrap(), pool_before);
    assert_eq!(keeper.fee_pool().unwrap(), fee_pool_before);
}

#[test]
fn test_corrupted_pool_detected() {
    let dir = TempDir::new().unwrap();
    let mut keeper = Keeper::new(Arc::new(RocksBackend::open(dir.path()).unwrap()));
    keeper.init_genesis(&genesis()).unwrap();
    run_blocks(&mut keeper);
    assert_eq!(invariants::all_invariants(&keeper), Ok(()));

    let corrupted = keeper.pool().unwrap().add_bonded_tokens(dec!(1)).unwrap();
    keeper.set_pool(&corrupted).unwrap();

    assert!(matches!(
        invariants::all_invariants(&keeper),
        Err(InvariantError::BondedTokensMismatch { .. })
    ));
}

#[test]
fn test_memory_and_rocks_agree() {
    let dir = TempDir::new().unwrap();
    let mut rocks = Keeper::new(Arc::new(RocksBackend::open(dir.path()).unwrap()));
    let mut memory = Keeper::new(Arc::new(MemoryBackend::new()));

    rocks.init_genesis(&genesis()).unwrap();
    memory.init_genesis(&genesis()).unwrap();
    run_blocks(&mut rocks);
    run_blocks(&mut memory);

    assert_eq!(rocks.pool().unwrap(), memory.pool().unwrap());
    assert_eq!(rocks.fee_pool().unwrap(), memory.fee_pool().unwrap());

    let rocks_entries: Vec<_> = rocks
        .backend()
        .prefix_iterator(&[])
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let memory_entries: Vec<_> = memory
        .backend()
        .prefix_iterator(&[])
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rocks_entries, memory_entries);
}

#[test]
fn test_missing_records_surface() {
    let dir = TempDir::new().unwrap();
    let keeper = Keeper::new(Arc::new(RocksBackend::open(dir.path()).unwrap()));

    assert!(matches!(
        invariants::all_invariants(&keeper),
        Err(InvariantError::Read(StateError::MissingRequiredRecord { .. }))
    ));
}

#[test]
fn test_unbonding_lifecycle_keeps_invariants() {
    let dir = TempDir::new().unwrap();
    let mut keeper = Keeper::new(Arc::new(RocksBackend::open(dir.path()).unwrap()));
    keeper.init_genesis(&genesis()).unwrap();

    // Delegator 2 starts unbonding 500 from validator 100
    execute::begin_unbonding(&mut keeper, 1, dec!(500)).unwrap();
    let mut validator = keeper.get_validator(&[100u8; 20]).unwrap().unwrap();
    validator.tokens -= dec!(500);
    keeper.put_validator(&validator).unwrap();

    let ubd = UnbondingDelegation {
        delegator: [2u8; 20],
        validator: [100u8; 20],
        creation_height: 1,
        completion_height: 21,
        balance: Coin::new("stake", 500),
    };
    keeper.put_unbonding_delegation(&ubd).unwrap();

    let consensus_set: Vec<_> = genesis()
        .validators
        .into_iter()
        .map(|v| if v.operator == validator.operator { validator.clone() } else { v })
        .filter(|v| v.is_bonded())
        .map(|v| v.consensus_entry())
        .collect();
    keeper.put_consensus_validators(&consensus_set).unwrap();
    assert_eq!(invariants::all_invariants(&keeper), Ok(()));

    // Maturity: the balance returns to the delegator's account
    assert!(ubd.is_mature(21));
    execute::complete_unbonding(&mut keeper, dec!(500)).unwrap();
    keeper.remove_unbonding_delegation(&ubd).unwrap();
    adjust_account(&keeper, [2u8; 20], &Coins::new(), &Coins::single("stake", 500));

    assert_eq!(invariants::all_invariants(&keeper), Ok(()));
    assert_eq!(keeper.pool().unwrap().unbonding_tokens(), dec!(300));
}
