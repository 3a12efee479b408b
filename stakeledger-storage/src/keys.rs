//! Key schema encoding for storage.
//!
//! Every record lives under a one-byte namespace prefix followed by its
//! fixed-width domain key. Key building is a pure function of the domain
//! key, so every replica lays out the store identically.

use stakeledger_core::{Address, ConsensusPubKey};

/// Key prefixes for the record namespaces.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyPrefix {
    /// Staking pool: `0x01`
    Pool = 0x01,
    /// Fee pool accumulator and community pool: `0x02`
    FeePool = 0x02,
    /// Reward pool of one validator: `0x03 || operator`
    ValidatorDistInfo = 0x03,
    /// Distribution parameters: `0x04`
    Params = 0x04,
    /// Account: `0x10 || address`
    Account = 0x10,
    /// Validator: `0x11 || operator`
    Validator = 0x11,
    /// Unbonding delegation: `0x12 || delegator || validator || creation_height`
    UnbondingDelegation = 0x12,
    /// Consensus validator set entry: `0x13 || pubkey`
    ConsensusValidator = 0x13,
}

impl KeyPrefix {
    /// The prefix as a one-byte key, for namespace iteration.
    pub fn as_key(self) -> [u8; 1] {
        [self as u8]
    }

    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(KeyPrefix::Pool),
            0x02 => Some(KeyPrefix::FeePool),
            0x03 => Some(KeyPrefix::ValidatorDistInfo),
            0x04 => Some(KeyPrefix::Params),
            0x10 => Some(KeyPrefix::Account),
            0x11 => Some(KeyPrefix::Validator),
            0x12 => Some(KeyPrefix::UnbondingDelegation),
            0x13 => Some(KeyPrefix::ConsensusValidator),
            _ => None,
        }
    }
}

/// Address of one stored record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StateKey {
    /// The staking pool.
    Pool,
    /// The fee pool header.
    FeePool,
    /// Reward pool by validator operator.
    ValidatorDistInfo(Address),
    /// Distribution parameters.
    Params,
    /// Account by address.
    Account(Address),
    /// Validator by operator.
    Validator(Address),
    /// Unbonding delegation by (delegator, validator, creation height).
    UnbondingDelegation(Address, Address, i64),
    /// Consensus set entry by pubkey.
    ConsensusValidator(ConsensusPubKey),
}

/// Encode a height so byte order matches numeric order.
fn height_bytes(height: i64) -> [u8; 8] {
    ((height as u64) ^ (1 << 63)).to_be_bytes()
}

fn height_from_bytes(bytes: [u8; 8]) -> i64 {
    (u64::from_be_bytes(bytes) ^ (1 << 63)) as i64
}

impl StateKey {
    /// Namespace this key belongs to.
    pub fn prefix(&self) -> KeyPrefix {
        match self {
            StateKey::Pool => KeyPrefix::Pool,
            StateKey::FeePool => KeyPrefix::FeePool,
            StateKey::ValidatorDistInfo(_) => KeyPrefix::ValidatorDistInfo,
            StateKey::Params => KeyPrefix::Params,
            StateKey::Account(_) => KeyPrefix::Account,
            StateKey::Validator(_) => KeyPrefix::Validator,
            StateKey::UnbondingDelegation(..) => KeyPrefix::UnbondingDelegation,
            StateKey::ConsensusValidator(_) => KeyPrefix::ConsensusValidator,
        }
    }

    /// Convert the state key to bytes for storage.
    pub fn to_bytes(&self) -> Vec<u8> {
        let prefix = self.prefix() as u8;
        match self {
            StateKey::Pool | StateKey::FeePool | StateKey::Params => vec![prefix],
            StateKey::ValidatorDistInfo(addr)
            | StateKey::Account(addr)
            | StateKey::Validator(addr) => {
                let mut key = Vec::with_capacity(21);
                key.push(prefix);
                key.extend_from_slice(addr);
                key
            }
            StateKey::UnbondingDelegation(delegator, validator, height) => {
                let mut key = Vec::with_capacity(49);
                key.push(prefix);
                key.extend_from_slice(delegator);
                key.extend_from_slice(validator);
                key.extend_from_slice(&height_bytes(*height));
                key
            }
            StateKey::ConsensusValidator(pubkey) => {
                let mut key = Vec::with_capacity(33);
                key.push(prefix);
                key.extend_from_slice(pubkey);
                key
            }
        }
    }

    /// Parse a state key from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&first, data) = bytes.split_first()?;
        match KeyPrefix::from_byte(first)? {
            KeyPrefix::Pool => data.is_empty().then_some(StateKey::Pool),
            KeyPrefix::FeePool => data.is_empty().then_some(StateKey::FeePool),
            KeyPrefix::Params => data.is_empty().then_some(StateKey::Params),
            KeyPrefix::ValidatorDistInfo => {
                Some(StateKey::ValidatorDistInfo(data.try_into().ok()?))
            }
            KeyPrefix::Account => Some(StateKey::Account(data.try_into().ok()?)),
            KeyPrefix::Validator => Some(StateKey::Validator(data.try_into().ok()?)),
            KeyPrefix::UnbondingDelegation => {
                if data.len() != 48 {
                    return None;
                }
                let delegator: Address = data[..20].try_into().ok()?;
                let validator: Address = data[20..40].try_into().ok()?;
                let height: [u8; 8] = data[40..].try_into().ok()?;
                Some(StateKey::UnbondingDelegation(
                    delegator,
                    validator,
                    height_from_bytes(height),
                ))
            }
            KeyPrefix::ConsensusValidator => {
                Some(StateKey::ConsensusValidator(data.try_into().ok()?))
            }
        }
    }
}
