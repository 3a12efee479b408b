//! Validator health checks and the combined suite.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use stakeledger_core::{ConsensusPubKey, Decimal};

use super::error::{InvariantError, InvariantResult};
use super::supply::supply_invariant;
use super::view::InvariantView;
use crate::source::HasPower;

/// Every bonded validator must have positive power.
pub fn positive_power_invariant<V: InvariantView + ?Sized>(view: &V) -> InvariantResult {
    for validator in view.bonded_validators() {
        let validator = validator?;
        let power = validator.power();
        if power <= Decimal::ZERO {
            return Err(InvariantError::NonPositivePower {
                pubkey: hex::encode(validator.consensus_pubkey()),
                power,
            });
        }
    }
    Ok(())
}

/// The consensus validator set must equal the bonded set.
///
/// Both sides are keyed by consensus pubkey and compared on power. Every
/// divergent key is reported, not just the first.
pub fn validator_set_invariant<V: InvariantView + ?Sized>(view: &V) -> InvariantResult {
    let mut bonded: BTreeMap<ConsensusPubKey, Decimal> = BTreeMap::new();
    for validator in view.bonded_validators() {
        let validator = validator?;
        bonded.insert(validator.consensus_pubkey(), validator.power());
    }

    let mut missing = Vec::new();
    let mut unexpected = Vec::new();
    let mut mismatched = Vec::new();

    let mut seen: BTreeMap<ConsensusPubKey, Decimal> = BTreeMap::new();
    for entry in view.consensus_validators() {
        let entry = entry?;
        match seen.entry(entry.pubkey) {
            Entry::Vacant(slot) => {
                slot.insert(entry.power);
            }
            // Duplicate keys in the consensus set never match the ledger
            Entry::Occupied(_) => unexpected.push(hex::encode(entry.pubkey)),
        }
    }

    for (pubkey, power) in &bonded {
        match seen.get(pubkey) {
            None => missing.push(hex::encode(pubkey)),
            Some(reported) if reported != power => mismatched.push(hex::encode(pubkey)),
            Some(_) => {}
        }
    }
    for pubkey in seen.keys() {
        if !bonded.contains_key(pubkey) {
            unexpected.push(hex::encode(pubkey));
        }
    }

    if missing.is_empty() && unexpected.is_empty() && mismatched.is_empty() {
        return Ok(());
    }
    unexpected.sort();

    Err(InvariantError::ValidatorSetMismatch {
        missing,
        unexpected,
        mismatched,
    })
}

/// Run supply, positive power and validator set checks in order.
///
/// Stops at the first violation.
pub fn all_invariants<V: InvariantView + ?Sized>(view: &V) -> InvariantResult {
    let checks: [(&str, fn(&V) -> InvariantResult); 3] = [
        ("supply", supply_invariant::<V>),
        ("positive_power", positive_power_invariant::<V>),
        ("validator_set", validator_set_invariant::<V>),
    ];

    for (name, check) in checks {
        if let Err(err) = check(view) {
            tracing::warn!(invariant = name, error = %err, "Invariant violated");
            return Err(err);
        }
        tracing::debug!(invariant = name, "Invariant holds");
    }
    Ok(())
}
