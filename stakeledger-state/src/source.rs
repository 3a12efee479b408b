//! Capability traits over externally owned records.
//!
//! The invariant checker and fee injection never name a concrete account
//! or validator type. They read balances and power through these traits,
//! which the records from `stakeledger-core` implement.

use stakeledger_core::{
    Account, Address, BondStatus, Coin, Coins, ConsensusPubKey, Decimal, UnbondingDelegation,
    Validator,
};

/// Anything holding a set of liquid coins.
pub trait HasCoins {
    fn coins(&self) -> &Coins;
}

/// Anything with bonding status and voting power.
pub trait HasPower {
    /// Operator address, the id under which rewards accrue.
    fn operator(&self) -> Address;

    fn consensus_pubkey(&self) -> ConsensusPubKey;

    fn status(&self) -> BondStatus;

    /// Tokens held regardless of status.
    fn tokens(&self) -> Decimal;

    /// Voting power; zero unless bonded.
    fn power(&self) -> Decimal {
        if self.status() == BondStatus::Bonded {
            self.tokens()
        } else {
            Decimal::ZERO
        }
    }

    fn commission_rate(&self) -> Decimal;

    fn is_bonded(&self) -> bool {
        self.status() == BondStatus::Bonded
    }
}

/// Anything holding a single in-flight balance.
pub trait HasBalance {
    fn balance(&self) -> &Coin;
}

impl HasCoins for Account {
    fn coins(&self) -> &Coins {
        &self.coins
    }
}

impl HasPower for Validator {
    fn operator(&self) -> Address {
        self.operator
    }

    fn consensus_pubkey(&self) -> ConsensusPubKey {
        self.consensus_pubkey
    }

    fn status(&self) -> BondStatus {
        self.status
    }

    fn tokens(&self) -> Decimal {
        self.tokens
    }

    fn power(&self) -> Decimal {
        Validator::power(self)
    }

    fn commission_rate(&self) -> Decimal {
        self.commission_rate
    }
}

impl HasBalance for UnbondingDelegation {
    fn balance(&self) -> &Coin {
        &self.balance
    }
}

impl<T: HasPower + ?Sized> HasPower for &T {
    fn operator(&self) -> Address {
        (**self).operator()
    }

    fn consensus_pubkey(&self) -> ConsensusPubKey {
        (**self).consensus_pubkey()
    }

    fn status(&self) -> BondStatus {
        (**self).status()
    }

    fn tokens(&self) -> Decimal {
        (**self).tokens()
    }

    fn power(&self) -> Decimal {
        (**self).power()
    }

    fn commission_rate(&self) -> Decimal {
        (**self).commission_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validator_power_through_trait() {
        let validator = Validator {
            operator: [3u8; 20],
            consensus_pubkey: [4u8; 32],
            status: BondStatus::Unbonding,
            tokens: dec!(40),
            commission_rate: dec!(0),
        };

        fn power_of<V: HasPower>(v: V) -> Decimal {
            v.power()
        }

        assert_eq!(power_of(&validator), Decimal::ZERO);
        assert_eq!(HasPower::tokens(&validator), dec!(40));
        assert!(!HasPower::is_bonded(&validator));
    }
}
