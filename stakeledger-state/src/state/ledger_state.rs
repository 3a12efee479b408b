//! In-memory ledger container.

use std::collections::BTreeMap;

use stakeledger_core::{Account, Address, ConsensusValidator, UnbondingDelegation, Validator};

use super::store::{LedgerReader, LedgerWriter};
use crate::bond::Pool;
use crate::distribution::{validate_commission_rate, DistributionParams, FeePool, RewardPool};
use crate::error::{StateError, StateResult};
use crate::invariants::{EntryIter, InvariantView, SupplyTally};

/// In-memory ledger backed by ordered maps.
///
/// This is the testing implementation. The persistent keeper implements
/// the same traits over a key-value store.
#[derive(Clone, Debug, Default)]
pub struct LedgerState {
    /// Staking pool, absent until genesis.
    pub pool: Option<Pool>,

    /// Fee pool, absent until genesis.
    pub fee_pool: Option<FeePool>,

    /// Distribution parameters, absent until genesis.
    pub params: Option<DistributionParams>,

    /// Accounts by address.
    pub accounts: BTreeMap<Address, Account>,

    /// Validators by operator address.
    pub validators: BTreeMap<Address, Validator>,

    /// In-flight unbonding delegations.
    pub unbonding_delegations: Vec<UnbondingDelegation>,

    /// Validator set last handed to consensus.
    pub consensus_validators: Vec<ConsensusValidator>,
}

impl LedgerState {
    /// Create an empty ledger with no singletons.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger whose pool is derived from the given records.
    ///
    /// The consensus set is the bonded set, so a fresh genesis passes every
    /// invariant.
    pub fn genesis(
        params: DistributionParams,
        accounts: Vec<Account>,
        validators: Vec<Validator>,
        unbonding_delegations: Vec<UnbondingDelegation>,
        fee_pool: FeePool,
    ) -> StateResult<Self> {
        params.validate()?;
        for validator in &validators {
            validate_commission_rate(validator)?;
        }

        let mut tally = SupplyTally::default();
        for account in &accounts {
            tally.add_account(account, &params.bond_denom)?;
        }
        for ubd in &unbonding_delegations {
            tally.add_unbonding_delegation(ubd, &params.bond_denom)?;
        }
        for validator in &validators {
            tally.add_validator(validator)?;
        }
        tally.add_fee_pool(&fee_pool, &params.bond_denom)?;

        let pool = tally.to_pool(fee_pool.total_val_accum().update_height())?;
        let consensus_validators = validators
            .iter()
            .filter(|v| v.is_bonded())
            .map(Validator::consensus_entry)
            .collect();

        Ok(Self {
            pool: Some(pool),
            fee_pool: Some(fee_pool),
            params: Some(params),
            accounts: accounts.into_iter().map(|a| (a.address, a)).collect(),
            validators: validators.into_iter().map(|v| (v.operator, v)).collect(),
            unbonding_delegations,
            consensus_validators,
        })
    }

    /// Insert or replace a validator.
    pub fn set_validator(&mut self, validator: Validator) {
        self.validators.insert(validator.operator, validator);
    }

    /// Insert or replace an account.
    pub fn set_account(&mut self, account: Account) {
        self.accounts.insert(account.address, account);
    }

    /// Recompute the consensus set from the current bonded validators.
    pub fn sync_consensus_validators(&mut self) {
        self.consensus_validators = self
            .validators
            .values()
            .filter(|v| v.is_bonded())
            .map(Validator::consensus_entry)
            .collect();
    }
}

impl LedgerReader for LedgerState {
    fn pool(&self) -> StateResult<Pool> {
        self.pool
            .ok_or(StateError::MissingRequiredRecord { record: "pool" })
    }

    fn fee_pool(&self) -> StateResult<FeePool> {
        self.fee_pool
            .clone()
            .ok_or(StateError::MissingRequiredRecord { record: "fee_pool" })
    }

    fn reward_pool(&self, validator: &Address) -> StateResult<Option<RewardPool>> {
        let fee_pool = self
            .fee_pool
            .as_ref()
            .ok_or(StateError::MissingRequiredRecord { record: "fee_pool" })?;
        Ok(fee_pool.reward_pool(validator).cloned())
    }

    fn params(&self) -> StateResult<DistributionParams> {
        self.params
            .clone()
            .ok_or(StateError::MissingRequiredRecord { record: "params" })
    }
}

impl LedgerWriter for LedgerState {
    fn set_pool(&mut self, pool: &Pool) -> StateResult<()> {
        self.pool = Some(*pool);
        Ok(())
    }

    fn set_fee_pool(&mut self, fee_pool: &FeePool) -> StateResult<()> {
        self.fee_pool = Some(fee_pool.clone());
        Ok(())
    }

    fn set_reward_pool(&mut self, validator: &Address, reward_pool: &RewardPool) -> StateResult<()> {
        let fee_pool = self.fee_pool()?;
        self.fee_pool = Some(fee_pool.with_reward_pool(*validator, reward_pool.clone()));
        Ok(())
    }

    fn set_params(&mut self, params: &DistributionParams) -> StateResult<()> {
        params.validate()?;
        self.params = Some(params.clone());
        Ok(())
    }
}

impl InvariantView for LedgerState {
    type Account = Account;
    type Validator = Validator;
    type UnbondingDelegation = UnbondingDelegation;

    fn accounts(&self) -> EntryIter<'_, Account> {
        Box::new(self.accounts.values().cloned().map(Ok))
    }

    fn validators(&self) -> EntryIter<'_, Validator> {
        Box::new(self.validators.values().cloned().map(Ok))
    }

    fn unbonding_delegations(&self) -> EntryIter<'_, UnbondingDelegation> {
        Box::new(self.unbonding_delegations.iter().cloned().map(Ok))
    }

    fn consensus_validators(&self) -> EntryIter<'_, ConsensusValidator> {
        Box::new(self.consensus_validators.iter().cloned().map(Ok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use stakeledger_core::{BondStatus, Coin, Coins, Decimal};

    fn validator(id: u8, status: BondStatus, tokens: Decimal) -> Validator {
        Validator {
            operator: [id; 20],
            consensus_pubkey: [id; 32],
            status,
            tokens,
            commission_rate: dec!(0.05),
        }
    }

    #[test]
    fn test_missing_singletons() {
        let state = LedgerState::new();
        assert_eq!(
            state.pool(),
            Err(StateError::MissingRequiredRecord { record: "pool" })
        );
        assert!(matches!(
            state.fee_pool(),
            Err(StateError::MissingRequiredRecord { record: "fee_pool" })
        ));
        assert!(state.params().is_err());
    }

    #[test]
    fn test_genesis_derives_pool() {
        let state = LedgerState::genesis(
            DistributionParams::default(),
            vec![
                Account::new([1u8; 20], Coins::single("stake", 100)),
                Account::new([2u8; 20], Coins::single("other", 999)),
            ],
            vec![
                validator(10, BondStatus::Bonded, dec!(500)),
                validator(11, BondStatus::Unbonding, dec!(40)),
                validator(12, BondStatus::Unbonded, dec!(7)),
            ],
            vec![UnbondingDelegation {
                delegator: [1u8; 20],
                validator: [10u8; 20],
                creation_height: 0,
                completion_height: 100,
                balance: Coin::new("stake", 25),
            }],
            FeePool::initial(),
        )
        .unwrap();

        let pool = state.pool().unwrap();
        assert_eq!(pool.loose_tokens(), dec!(107));
        assert_eq!(pool.unbonding_tokens(), dec!(65));
        assert_eq!(pool.bonded_tokens(), dec!(500));
        assert_eq!(state.consensus_validators.len(), 1);
    }

    #[test]
    fn test_genesis_rejects_bad_params() {
        let params = DistributionParams {
            bond_denom: "stake".to_string(),
            community_tax: dec!(2),
        };
        let result = LedgerState::genesis(params, vec![], vec![], vec![], FeePool::initial());
        assert!(matches!(result, Err(StateError::InvalidParams { .. })));
    }

    #[test]
    fn test_minted_tokens_credited_to_account() {
        let mut state = LedgerState::genesis(
            DistributionParams::default(),
            vec![Account::new([1u8; 20], Coins::single("stake", 100))],
            vec![validator(10, BondStatus::Bonded, dec!(500))],
            vec![],
            FeePool::initial(),
        )
        .unwrap();

        crate::execute::mint_tokens(&mut state, dec!(20)).unwrap();
        assert!(crate::invariants::supply_invariant(&state).is_err());

        state.set_account(Account::new([1u8; 20], Coins::single("stake", 120)));
        assert_eq!(crate::invariants::supply_invariant(&state), Ok(()));
    }

    #[test]
    fn test_genesis_rejects_commission_above_one() {
        let mut greedy = validator(10, BondStatus::Bonded, dec!(500));
        greedy.commission_rate = dec!(1.5);

        let result = LedgerState::genesis(
            DistributionParams::default(),
            vec![],
            vec![greedy],
            vec![],
            FeePool::initial(),
        );
        assert_eq!(
            result.err(),
            Some(StateError::InvalidCommissionRate {
                validator: [10u8; 20],
                rate: dec!(1.5),
            })
        );
    }

    #[test]
    fn test_set_reward_pool() {
        let mut state = LedgerState::genesis(
            DistributionParams::default(),
            vec![],
            vec![],
            vec![],
            FeePool::initial(),
        )
        .unwrap();

        let reward_pool = RewardPool {
            pool: Coins::single("stake", 3),
            pool_commission: Coins::new(),
        };
        state.set_reward_pool(&[5u8; 20], &reward_pool).unwrap();
        assert_eq!(state.reward_pool(&[5u8; 20]).unwrap(), Some(reward_pool));
        assert_eq!(state.reward_pool(&[6u8; 20]).unwrap(), None);
    }
}
