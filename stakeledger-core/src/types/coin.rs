//! Multi-denomination coin amounts.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// An integer amount of a single denomination.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coin {
    /// Denomination name, e.g. `"stake"`.
    pub denom: String,
    /// Amount in the smallest unit.
    pub amount: u64,
}

impl Coin {
    /// Create a coin.
    pub fn new(denom: impl Into<String>, amount: u64) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    /// Check if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A set of coins, one entry per denomination.
///
/// Entries are kept sorted by denomination and zero amounts are never
/// stored, so two equal sets always encode to the same bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Coin>", into = "Vec<Coin>")]
pub struct Coins(Vec<Coin>);

impl Coins {
    /// Create an empty coin set.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Create a coin set holding a single denomination.
    pub fn single(denom: impl Into<String>, amount: u64) -> Self {
        let coin = Coin::new(denom, amount);
        if coin.is_zero() {
            Self::new()
        } else {
            Self(vec![coin])
        }
    }

    /// Build a normalized coin set, merging duplicate denominations.
    ///
    /// Returns `None` if merging overflows.
    pub fn from_coins<I: IntoIterator<Item = Coin>>(coins: I) -> Option<Self> {
        let mut merged: BTreeMap<String, u64> = BTreeMap::new();
        for coin in coins {
            let entry = merged.entry(coin.denom).or_insert(0);
            *entry = entry.checked_add(coin.amount)?;
        }
        Some(Self::from_map(merged))
    }

    fn from_map(map: BTreeMap<String, u64>) -> Self {
        Self(
            map.into_iter()
                .filter(|(_, amount)| *amount > 0)
                .map(|(denom, amount)| Coin { denom, amount })
                .collect(),
        )
    }

    fn to_map(&self) -> BTreeMap<String, u64> {
        self.0
            .iter()
            .map(|c| (c.denom.clone(), c.amount))
            .collect()
    }

    /// Amount held of one denomination (zero if absent).
    pub fn amount_of(&self, denom: &str) -> u64 {
        self.0
            .binary_search_by(|c| c.denom.as_str().cmp(denom))
            .map(|i| self.0[i].amount)
            .unwrap_or(0)
    }

    /// Check if the set holds nothing.
    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of denominations held.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the entries in denomination order.
    pub fn iter(&self) -> std::slice::Iter<'_, Coin> {
        self.0.iter()
    }

    /// Add two coin sets. Returns `None` on overflow.
    pub fn checked_add(&self, other: &Coins) -> Option<Coins> {
        let mut map = self.to_map();
        for coin in &other.0 {
            let entry = map.entry(coin.denom.clone()).or_insert(0);
            *entry = entry.checked_add(coin.amount)?;
        }
        Some(Self::from_map(map))
    }

    /// Subtract a coin set. Returns `None` if any denomination would go negative.
    pub fn checked_sub(&self, other: &Coins) -> Option<Coins> {
        let mut map = self.to_map();
        for coin in &other.0 {
            let entry = map.entry(coin.denom.clone()).or_insert(0);
            *entry = entry.checked_sub(coin.amount)?;
        }
        Some(Self::from_map(map))
    }

    /// Add an amount of one denomination. Returns `None` on overflow.
    pub fn checked_add_amount(&self, denom: &str, amount: u64) -> Option<Coins> {
        self.checked_add(&Coins::single(denom, amount))
    }
}

impl TryFrom<Vec<Coin>> for Coins {
    type Error = CoreError;

    fn try_from(coins: Vec<Coin>) -> Result<Self, Self::Error> {
        let denom = coins.first().map(|c| c.denom.clone()).unwrap_or_default();
        Coins::from_coins(coins).ok_or(CoreError::CoinArithmetic { denom })
    }
}

impl From<Coins> for Vec<Coin> {
    fn from(coins: Coins) -> Self {
        coins.0
    }
}

impl From<Coin> for Coins {
    fn from(coin: Coin) -> Self {
        Coins::single(coin.denom, coin.amount)
    }
}

impl<'a> IntoIterator for &'a Coins {
    type Item = &'a Coin;
    type IntoIter = std::slice::Iter<'a, Coin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "0");
        }
        for (i, coin) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", coin)?;
        }
        Ok(())
    }
}
