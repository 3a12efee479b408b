//! Supply recomputation and the supply invariant.

use stakeledger_core::decimal::from_amount;
use stakeledger_core::{BondStatus, Decimal};

use super::error::{InvariantError, InvariantResult};
use super::view::InvariantView;
use crate::bond::Pool;
use crate::distribution::FeePool;
use crate::error::{StateError, StateResult};
use crate::source::{HasBalance, HasCoins, HasPower};

/// Bond-denomination supply recomputed from individual holdings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SupplyTally {
    /// Accounts, non-bonded validators outside unbonding, and the fee pool.
    pub liquid: Decimal,
    /// Unbonding delegations and unbonding validators.
    pub unbonding: Decimal,
    /// Power of bonded validators.
    pub bonded: Decimal,
}

impl SupplyTally {
    pub fn add_account<A: HasCoins + ?Sized>(&mut self, account: &A, denom: &str) -> StateResult<()> {
        self.liquid = add(self.liquid, from_amount(account.coins().amount_of(denom)))?;
        Ok(())
    }

    pub fn add_unbonding_delegation<U: HasBalance + ?Sized>(
        &mut self,
        ubd: &U,
        denom: &str,
    ) -> StateResult<()> {
        let balance = ubd.balance();
        if balance.denom == denom {
            self.unbonding = add(self.unbonding, from_amount(balance.amount))?;
        }
        Ok(())
    }

    pub fn add_validator<V: HasPower + ?Sized>(&mut self, validator: &V) -> StateResult<()> {
        match validator.status() {
            BondStatus::Bonded => self.bonded = add(self.bonded, validator.power())?,
            BondStatus::Unbonding => self.unbonding = add(self.unbonding, validator.tokens())?,
            BondStatus::Unbonded => self.liquid = add(self.liquid, validator.tokens())?,
        }
        Ok(())
    }

    pub fn add_fee_pool(&mut self, fee_pool: &FeePool, denom: &str) -> StateResult<()> {
        self.liquid = add(self.liquid, fee_pool.holdings_of(denom)?)?;
        Ok(())
    }

    /// Pool whose counters match this tally, with its accumulator at `height`.
    pub fn to_pool(&self, height: i64) -> StateResult<Pool> {
        Pool::genesis(self.liquid, self.bonded, self.unbonding, height)
    }
}

fn add(a: Decimal, b: Decimal) -> StateResult<Decimal> {
    a.checked_add(b).ok_or(StateError::ArithmeticOverflow)
}

/// Recompute the bond-denomination supply from a snapshot.
pub fn tally_supply<V: InvariantView + ?Sized>(view: &V) -> StateResult<SupplyTally> {
    let denom = view.params()?.bond_denom;
    let mut tally = SupplyTally::default();

    for account in view.accounts() {
        tally.add_account(&account?, &denom)?;
    }
    for ubd in view.unbonding_delegations() {
        tally.add_unbonding_delegation(&ubd?, &denom)?;
    }
    for validator in view.validators() {
        tally.add_validator(&validator?)?;
    }
    tally.add_fee_pool(&view.fee_pool()?, &denom)?;

    Ok(tally)
}

/// Check the pool counters against the recomputed supply.
///
/// Each counter is compared on its own: `loose_tokens` with the liquid
/// holdings, `unbonding_tokens` with unbonding delegations and unbonding
/// validators, and `bonded_tokens` with the summed power of bonded
/// validators.
pub fn supply_invariant<V: InvariantView + ?Sized>(view: &V) -> InvariantResult {
    let pool = view.pool()?;
    let tally = tally_supply(view)?;

    if pool.loose_tokens() != tally.liquid {
        return Err(InvariantError::LooseTokensMismatch {
            stored: pool.loose_tokens(),
            computed: tally.liquid,
        });
    }

    if pool.unbonding_tokens() != tally.unbonding {
        return Err(InvariantError::UnbondingTokensMismatch {
            stored: pool.unbonding_tokens(),
            computed: tally.unbonding,
        });
    }

    if pool.bonded_tokens() != tally.bonded {
        return Err(InvariantError::BondedTokensMismatch {
            stored: pool.bonded_tokens(),
            computed: tally.bonded,
        });
    }

    Ok(())
}
