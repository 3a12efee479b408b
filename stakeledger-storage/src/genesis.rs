//! Genesis file import.
//!
//! A genesis file is JSON. Addresses and keys are hex strings and decimals
//! are decimal strings, for example:
//!
//! ```json
//! {
//!   "params": { "bond_denom": "stake", "community_tax": "0.02" },
//!   "accounts": [{ "address": "0101...01", "coins": [{ "denom": "stake", "amount": 500 }] }],
//!   "validators": [],
//!   "unbonding_delegations": []
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use stakeledger_core::serialization::hex_bytes;
use stakeledger_core::{Account, Address, Coins, UnbondingDelegation, Validator};
use stakeledger_state::{
    validate_commission_rate, Accumulator, DistributionParams, FeePool, RewardPool,
};

use crate::error::StorageError;

/// Reward pool of one validator at genesis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisRewardPool {
    /// Validator operator.
    #[serde(with = "hex_bytes")]
    pub validator: Address,
    /// Undistributed delegator rewards.
    #[serde(default)]
    pub pool: Coins,
    /// Unwithdrawn commission.
    #[serde(default)]
    pub pool_commission: Coins,
}

/// Fee pool holdings carried into genesis.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisFeePool {
    /// Community pool balance.
    #[serde(default)]
    pub community_pool: Coins,
    /// Reward pools by validator.
    #[serde(default)]
    pub validator_pools: Vec<GenesisRewardPool>,
}

/// Everything needed to initialise a store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    /// Distribution parameters.
    #[serde(default)]
    pub params: DistributionParams,
    /// Liquid accounts.
    #[serde(default)]
    pub accounts: Vec<Account>,
    /// Validators with their status and tokens.
    #[serde(default)]
    pub validators: Vec<Validator>,
    /// In-flight unbonding delegations.
    #[serde(default)]
    pub unbonding_delegations: Vec<UnbondingDelegation>,
    /// Fee pool holdings, empty if absent.
    #[serde(default)]
    pub fee_pool: Option<GenesisFeePool>,
    /// Height the accumulators start from.
    #[serde(default)]
    pub genesis_height: i64,
}

impl GenesisState {
    /// Parse a genesis document.
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a genesis file.
    pub fn from_file(path: &Path) -> Result<Self, StorageError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject duplicate ids, negative tokens, out-of-range commission rates
    /// and invalid parameters.
    pub fn validate(&self) -> Result<(), StorageError> {
        self.params.validate()?;

        let mut seen = BTreeSet::new();
        for account in &self.accounts {
            if !seen.insert(account.address) {
                return Err(StorageError::Genesis(format!(
                    "duplicate account {}",
                    hex::encode(account.address)
                )));
            }
        }

        let mut operators = BTreeSet::new();
        let mut pubkeys = BTreeSet::new();
        for validator in &self.validators {
            if !operators.insert(validator.operator) {
                return Err(StorageError::Genesis(format!(
                    "duplicate validator {}",
                    hex::encode(validator.operator)
                )));
            }
            if !pubkeys.insert(validator.consensus_pubkey) {
                return Err(StorageError::Genesis(format!(
                    "duplicate consensus key {}",
                    hex::encode(validator.consensus_pubkey)
                )));
            }
            if validator.tokens.is_sign_negative() && !validator.tokens.is_zero() {
                return Err(StorageError::Genesis(format!(
                    "validator {} has negative tokens",
                    hex::encode(validator.operator)
                )));
            }
            validate_commission_rate(validator)
                .map_err(|err| StorageError::Genesis(err.to_string()))?;
        }

        let mut ubds = BTreeSet::new();
        for ubd in &self.unbonding_delegations {
            if !ubds.insert((ubd.delegator, ubd.validator, ubd.creation_height)) {
                return Err(StorageError::Genesis(format!(
                    "duplicate unbonding delegation {} -> {} at {}",
                    hex::encode(ubd.delegator),
                    hex::encode(ubd.validator),
                    ubd.creation_height
                )));
            }
        }

        Ok(())
    }

    /// Fee pool at genesis, with its accumulator at `genesis_height`.
    pub fn fee_pool(&self) -> Result<FeePool, StorageError> {
        let accum = Accumulator::new(self.genesis_height);
        let Some(genesis_pool) = &self.fee_pool else {
            return Ok(FeePool::from_parts(accum, BTreeMap::new(), Coins::new()));
        };

        let mut validator_dist_pools = BTreeMap::new();
        for entry in &genesis_pool.validator_pools {
            let reward_pool = RewardPool {
                pool: entry.pool.clone(),
                pool_commission: entry.pool_commission.clone(),
            };
            if validator_dist_pools.insert(entry.validator, reward_pool).is_some() {
                return Err(StorageError::Genesis(format!(
                    "duplicate reward pool for {}",
                    hex::encode(entry.validator)
                )));
            }
        }

        Ok(FeePool::from_parts(
            accum,
            validator_dist_pools,
            genesis_pool.community_pool.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const GENESIS: &str = r#"{
        "params": { "bond_denom": "stake", "community_tax": "0.05" },
        "accounts": [
            { "address": "0101010101010101010101010101010101010101",
              "coins": [{ "denom": "stake", "amount": 500 }] }
        ],
        "validators": [
            { "operator": "0202020202020202020202020202020202020202",
              "consensus_pubkey": "0303030303030303030303030303030303030303030303030303030303030303",
              "status": "Bonded",
              "tokens": "1000",
              "commission_rate": "0.1" }
        ],
        "fee_pool": {
            "community_pool": [{ "denom": "stake", "amount": 7 }],
            "validator_pools": [
                { "validator": "0202020202020202020202020202020202020202",
                  "pool_commission": [{ "denom": "stake", "amount": 3 }] }
            ]
        },
        "genesis_height": 12
    }"#;

    #[test]
    fn test_parse_genesis() {
        let genesis = GenesisState::from_json(GENESIS).unwrap();
        assert_eq!(genesis.params.community_tax, dec!(0.05));
        assert_eq!(genesis.accounts[0].address, [1u8; 20]);
        assert_eq!(genesis.validators[0].tokens, dec!(1000));
        assert!(genesis.unbonding_delegations.is_empty());
        assert!(genesis.validate().is_ok());

        let fee_pool = genesis.fee_pool().unwrap();
        assert_eq!(fee_pool.total_val_accum().update_height(), 12);
        assert_eq!(fee_pool.holdings_of("stake").unwrap(), dec!(10));
    }

    #[test]
    fn test_json_roundtrip() {
        let genesis = GenesisState::from_json(GENESIS).unwrap();
        let json = genesis.to_json().unwrap();
        assert!(json.contains("\"0.05\""));
        assert_eq!(GenesisState::from_json(&json).unwrap(), genesis);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let genesis = GenesisState::from_json("{}").unwrap();
        assert_eq!(genesis.params, DistributionParams::default());
        assert!(genesis.validate().is_ok());
    }

    #[test]
    fn test_duplicate_account_rejected() {
        let mut genesis = GenesisState::from_json(GENESIS).unwrap();
        genesis.accounts.push(genesis.accounts[0].clone());
        assert!(matches!(genesis.validate(), Err(StorageError::Genesis(_))));
    }

    #[test]
    fn test_commission_rate_out_of_range_rejected() {
        let mut genesis = GenesisState::from_json(GENESIS).unwrap();
        genesis.validators[0].commission_rate = dec!(1.5);
        match genesis.validate() {
            Err(StorageError::Genesis(msg)) => assert!(msg.contains("commission rate 1.5")),
            other => panic!("expected genesis error, got {:?}", other),
        }

        genesis.validators[0].commission_rate = dec!(-0.1);
        assert!(matches!(genesis.validate(), Err(StorageError::Genesis(_))));

        genesis.validators[0].commission_rate = dec!(1);
        assert!(genesis.validate().is_ok());
    }

    #[test]
    fn test_bad_hex_rejected() {
        let json = r#"{ "accounts": [{ "address": "zz", "coins": [] }] }"#;
        assert!(matches!(
            GenesisState::from_json(json),
            Err(StorageError::Genesis(_))
        ));
    }
}
