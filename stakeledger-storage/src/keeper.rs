//! Typed access to the accounting records in a key-value store.
//!
//! The [`Keeper`] is the only reader and writer of the pool, fee pool,
//! reward pool and parameter records. Nothing is cached: every call is a
//! round trip to the backend, and multi-record writes go through one
//! atomic batch.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use stakeledger_core::serialization::{decode_record, encode_record};
use stakeledger_core::{
    Account, Address, Coins, ConsensusValidator, UnbondingDelegation, Validator,
};
use stakeledger_state::invariants::{EntryIter, InvariantView};
use stakeledger_state::{
    Accumulator, DistributionParams, FeePool, LedgerReader, LedgerState, LedgerWriter, Pool,
    RewardPool, StateError, StateResult,
};

use crate::error::StorageError;
use crate::genesis::GenesisState;
use crate::keys::{KeyPrefix, StateKey};
use crate::kv::{KvBackend, WriteBatch};

/// Stored part of the fee pool; reward pools live under their own keys.
#[derive(Serialize, Deserialize)]
struct FeePoolHeader {
    total_val_accum: Accumulator,
    community_pool: Coins,
}

/// Typed record access over a key-value backend.
pub struct Keeper<B: KvBackend> {
    backend: Arc<B>,
}

impl<B: KvBackend> Clone for Keeper<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: KvBackend> Keeper<B> {
    /// Create a keeper over a backend.
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    // === Generic record access ===

    fn get_record<T: DeserializeOwned>(&self, key: &StateKey) -> Result<Option<T>, StorageError> {
        match self.backend.get(&key.to_bytes())? {
            Some(bytes) => Ok(Some(decode_record(&bytes)?)),
            None => Ok(None),
        }
    }

    fn get_required<T: DeserializeOwned>(
        &self,
        key: &StateKey,
        record: &'static str,
    ) -> Result<T, StorageError> {
        self.get_record(key)?
            .ok_or(StorageError::MissingRequiredRecord { record })
    }

    fn put_record<T: Serialize>(&self, key: &StateKey, value: &T) -> Result<(), StorageError> {
        self.backend.put(&key.to_bytes(), &encode_record(value)?)
    }

    fn batch_put<T: Serialize>(
        batch: &mut WriteBatch,
        key: &StateKey,
        value: &T,
    ) -> Result<(), StorageError> {
        batch.put(key.to_bytes(), encode_record(value)?);
        Ok(())
    }

    /// Iterate the records of one namespace in key order.
    fn iter_records<T: DeserializeOwned + 'static>(
        &self,
        prefix: KeyPrefix,
    ) -> Box<dyn Iterator<Item = Result<(StateKey, T), StorageError>> + '_> {
        let entries = match self.backend.prefix_iterator(&prefix.as_key()) {
            Ok(entries) => entries,
            Err(e) => return Box::new(std::iter::once(Err(e))),
        };

        Box::new(entries.map(|entry| {
            let (key, value) = entry?;
            let key = StateKey::from_bytes(&key)
                .ok_or_else(|| StorageError::InvalidKey(format!("{:02x?}", key)))?;
            Ok((key, decode_record(&value)?))
        }))
    }

    fn entries<T: DeserializeOwned + 'static>(&self, prefix: KeyPrefix) -> EntryIter<'_, T> {
        Box::new(
            self.iter_records(prefix)
                .map(|entry| entry.map(|(_, value)| value).map_err(StateError::from)),
        )
    }

    // === Singletons ===

    /// Check if genesis has been imported.
    pub fn is_initialized(&self) -> Result<bool, StorageError> {
        self.backend.exists(&StateKey::Pool.to_bytes())
    }

    /// Get the staking pool.
    pub fn get_pool(&self) -> Result<Pool, StorageError> {
        self.get_required(&StateKey::Pool, "pool")
    }

    /// Get the distribution parameters.
    pub fn get_params(&self) -> Result<DistributionParams, StorageError> {
        self.get_required(&StateKey::Params, "params")
    }

    /// Get the fee pool, assembling every stored reward pool.
    pub fn get_fee_pool(&self) -> Result<FeePool, StorageError> {
        let header: FeePoolHeader = self.get_required(&StateKey::FeePool, "fee_pool")?;

        let mut validator_dist_pools = BTreeMap::new();
        for entry in self.iter_records::<RewardPool>(KeyPrefix::ValidatorDistInfo) {
            let (key, reward_pool) = entry?;
            if let StateKey::ValidatorDistInfo(validator) = key {
                validator_dist_pools.insert(validator, reward_pool);
            }
        }

        Ok(FeePool::from_parts(
            header.total_val_accum,
            validator_dist_pools,
            header.community_pool,
        ))
    }

    /// Get one validator's reward pool.
    pub fn get_reward_pool(&self, validator: &Address) -> Result<Option<RewardPool>, StorageError> {
        self.get_record(&StateKey::ValidatorDistInfo(*validator))
    }

    fn stage_fee_pool(&self, batch: &mut WriteBatch, fee_pool: &FeePool) -> Result<(), StorageError> {
        let header = FeePoolHeader {
            total_val_accum: fee_pool.total_val_accum(),
            community_pool: fee_pool.community_pool().clone(),
        };
        Self::batch_put(batch, &StateKey::FeePool, &header)?;

        // Reward pools dropped from the map are removed from the store
        let mut stale = BTreeSet::new();
        for entry in self.backend.prefix_iterator(&KeyPrefix::ValidatorDistInfo.as_key())? {
            let (key, _) = entry?;
            stale.insert(key);
        }
        for (validator, reward_pool) in fee_pool.validator_dist_pools() {
            let key = StateKey::ValidatorDistInfo(*validator);
            stale.remove(&key.to_bytes());
            Self::batch_put(batch, &key, reward_pool)?;
        }
        for key in stale {
            batch.delete(key);
        }
        Ok(())
    }

    /// Replace the staking pool.
    pub fn put_pool(&self, pool: &Pool) -> Result<(), StorageError> {
        self.put_record(&StateKey::Pool, pool)
    }

    /// Replace the fee pool and every reward pool in one batch.
    pub fn put_fee_pool(&self, fee_pool: &FeePool) -> Result<(), StorageError> {
        let mut batch = WriteBatch::new();
        self.stage_fee_pool(&mut batch, fee_pool)?;
        self.backend.write_batch(batch)
    }

    /// Replace the pool and fee pool in one batch.
    pub fn put_ledger(&self, pool: &Pool, fee_pool: &FeePool) -> Result<(), StorageError> {
        let mut batch = WriteBatch::new();
        Self::batch_put(&mut batch, &StateKey::Pool, pool)?;
        self.stage_fee_pool(&mut batch, fee_pool)?;
        self.backend.write_batch(batch)
    }

    /// Replace one validator's reward pool.
    pub fn put_reward_pool(&self, validator: &Address, reward_pool: &RewardPool) -> Result<(), StorageError> {
        self.put_record(&StateKey::ValidatorDistInfo(*validator), reward_pool)
    }

    /// Replace the distribution parameters.
    pub fn put_params(&self, params: &DistributionParams) -> Result<(), StorageError> {
        params.validate()?;
        self.put_record(&StateKey::Params, params)
    }

    // === Externally owned records ===

    /// Get an account by address.
    pub fn get_account(&self, address: &Address) -> Result<Option<Account>, StorageError> {
        self.get_record(&StateKey::Account(*address))
    }

    /// Insert or replace an account.
    pub fn put_account(&self, account: &Account) -> Result<(), StorageError> {
        self.put_record(&StateKey::Account(account.address), account)
    }

    /// Get a validator by operator.
    pub fn get_validator(&self, operator: &Address) -> Result<Option<Validator>, StorageError> {
        self.get_record(&StateKey::Validator(*operator))
    }

    /// Insert or replace a validator.
    pub fn put_validator(&self, validator: &Validator) -> Result<(), StorageError> {
        self.put_record(&StateKey::Validator(validator.operator), validator)
    }

    fn unbonding_key(ubd: &UnbondingDelegation) -> StateKey {
        StateKey::UnbondingDelegation(ubd.delegator, ubd.validator, ubd.creation_height)
    }

    /// Insert or replace an unbonding delegation.
    pub fn put_unbonding_delegation(&self, ubd: &UnbondingDelegation) -> Result<(), StorageError> {
        self.put_record(&Self::unbonding_key(ubd), ubd)
    }

    /// Remove a completed unbonding delegation.
    pub fn remove_unbonding_delegation(&self, ubd: &UnbondingDelegation) -> Result<(), StorageError> {
        self.backend.delete(&Self::unbonding_key(ubd).to_bytes())
    }

    /// Replace the consensus validator set in one batch.
    pub fn put_consensus_validators(&self, set: &[ConsensusValidator]) -> Result<(), StorageError> {
        let mut batch = WriteBatch::new();
        self.stage_consensus_validators(&mut batch, set)?;
        self.backend.write_batch(batch)
    }

    fn stage_consensus_validators(
        &self,
        batch: &mut WriteBatch,
        set: &[ConsensusValidator],
    ) -> Result<(), StorageError> {
        for entry in self.backend.prefix_iterator(&KeyPrefix::ConsensusValidator.as_key())? {
            let (key, _) = entry?;
            batch.delete(key);
        }
        for entry in set {
            Self::batch_put(batch, &StateKey::ConsensusValidator(entry.pubkey), entry)?;
        }
        Ok(())
    }

    // === Genesis ===

    /// Import a genesis state into an empty store.
    ///
    /// The pool is derived from the imported records and the consensus set
    /// is the bonded set, so the result passes every invariant. Everything
    /// is written in one batch.
    pub fn init_genesis(&self, genesis: &GenesisState) -> Result<Pool, StorageError> {
        if self.is_initialized()? {
            return Err(StorageError::AlreadyInitialized);
        }
        genesis.validate()?;

        let ledger = LedgerState::genesis(
            genesis.params.clone(),
            genesis.accounts.clone(),
            genesis.validators.clone(),
            genesis.unbonding_delegations.clone(),
            genesis.fee_pool()?,
        )?;
        let pool = ledger.pool()?;

        let mut batch = WriteBatch::new();
        Self::batch_put(&mut batch, &StateKey::Params, &genesis.params)?;
        Self::batch_put(&mut batch, &StateKey::Pool, &pool)?;
        self.stage_fee_pool(&mut batch, &ledger.fee_pool()?)?;
        for account in ledger.accounts.values() {
            Self::batch_put(&mut batch, &StateKey::Account(account.address), account)?;
        }
        for validator in ledger.validators.values() {
            Self::batch_put(&mut batch, &StateKey::Validator(validator.operator), validator)?;
        }
        for ubd in &ledger.unbonding_delegations {
            Self::batch_put(&mut batch, &Self::unbonding_key(ubd), ubd)?;
        }
        self.stage_consensus_validators(&mut batch, &ledger.consensus_validators)?;

        let records = batch.len();
        self.backend.write_batch(batch)?;

        tracing::info!(
            records,
            loose = %pool.loose_tokens(),
            bonded = %pool.bonded_tokens(),
            unbonding = %pool.unbonding_tokens(),
            "Imported genesis"
        );
        Ok(pool)
    }
}

impl<B: KvBackend> LedgerReader for Keeper<B> {
    fn pool(&self) -> StateResult<Pool> {
        Ok(self.get_pool()?)
    }

    fn fee_pool(&self) -> StateResult<FeePool> {
        Ok(self.get_fee_pool()?)
    }

    fn reward_pool(&self, validator: &Address) -> StateResult<Option<RewardPool>> {
        Ok(self.get_reward_pool(validator)?)
    }

    fn params(&self) -> StateResult<DistributionParams> {
        Ok(self.get_params()?)
    }
}

impl<B: KvBackend> LedgerWriter for Keeper<B> {
    fn set_pool(&mut self, pool: &Pool) -> StateResult<()> {
        Ok(self.put_pool(pool)?)
    }

    fn set_fee_pool(&mut self, fee_pool: &FeePool) -> StateResult<()> {
        Ok(self.put_fee_pool(fee_pool)?)
    }

    fn set_reward_pool(&mut self, validator: &Address, reward_pool: &RewardPool) -> StateResult<()> {
        Ok(self.put_reward_pool(validator, reward_pool)?)
    }

    fn set_params(&mut self, params: &DistributionParams) -> StateResult<()> {
        Ok(self.put_params(params)?)
    }

    fn set_ledger(&mut self, pool: &Pool, fee_pool: &FeePool) -> StateResult<()> {
        Ok(self.put_ledger(pool, fee_pool)?)
    }
}

impl<B: KvBackend> InvariantView for Keeper<B> {
    type Account = Account;
    type Validator = Validator;
    type UnbondingDelegation = UnbondingDelegation;

    fn accounts(&self) -> EntryIter<'_, Account> {
        self.entries(KeyPrefix::Account)
    }

    fn validators(&self) -> EntryIter<'_, Validator> {
        self.entries(KeyPrefix::Validator)
    }

    fn unbonding_delegations(&self) -> EntryIter<'_, UnbondingDelegation> {
        self.entries(KeyPrefix::UnbondingDelegation)
    }

    fn consensus_validators(&self) -> EntryIter<'_, ConsensusValidator> {
        self.entries(KeyPrefix::ConsensusValidator)
    }
}
