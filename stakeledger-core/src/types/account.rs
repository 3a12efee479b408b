//! Account records.

use serde::{Deserialize, Serialize};

use super::{Address, Coins};
use crate::serialization::hex_bytes;

/// A liquid account as seen by the accounting core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account address.
    #[serde(with = "hex_bytes")]
    pub address: Address,
    /// Coins held by the account.
    pub coins: Coins,
}

impl Account {
    /// Create an account holding the given coins.
    pub fn new(address: Address, coins: Coins) -> Self {
        Self { address, coins }
    }
}
