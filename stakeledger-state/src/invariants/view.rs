//! Read-only enumeration of the records the checks cross-reference.

use stakeledger_core::ConsensusValidator;

use crate::error::StateResult;
use crate::source::{HasBalance, HasCoins, HasPower};
use crate::state::LedgerReader;

/// Lazy, finite sequence of stored entries.
///
/// Each item is read on demand; a read failure surfaces as an `Err` item
/// and the consumer stops there.
pub type EntryIter<'a, T> = Box<dyn Iterator<Item = StateResult<T>> + 'a>;

/// A committed snapshot the invariant checks can enumerate.
pub trait InvariantView: LedgerReader {
    type Account: HasCoins + 'static;
    type Validator: HasPower + 'static;
    type UnbondingDelegation: HasBalance + 'static;

    /// Every live account.
    fn accounts(&self) -> EntryIter<'_, Self::Account>;

    /// Every validator regardless of status.
    fn validators(&self) -> EntryIter<'_, Self::Validator>;

    /// Every in-flight unbonding delegation.
    fn unbonding_delegations(&self) -> EntryIter<'_, Self::UnbondingDelegation>;

    /// The validator set last handed to the consensus engine.
    fn consensus_validators(&self) -> EntryIter<'_, ConsensusValidator>;

    /// Validators whose status is bonded. Read errors pass through.
    fn bonded_validators(&self) -> EntryIter<'_, Self::Validator> {
        Box::new(
            self.validators()
                .filter(|entry| entry.as_ref().map_or(true, |v| v.is_bonded())),
        )
    }
}
