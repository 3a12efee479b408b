//! Fee pool and per-validator reward pools.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stakeledger_core::decimal::{floor_amount, from_amount};
use stakeledger_core::{Address, Coins, Decimal};

use super::params::{validate_commission_rate, DistributionParams};
use crate::accumulator::Accumulator;
use crate::error::{StateError, StateResult};
use crate::source::HasPower;

/// Rewards held for one validator until withdrawn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPool {
    /// Undistributed rewards owed to the validator's delegators.
    pub pool: Coins,
    /// Commission owed to the validator operator.
    pub pool_commission: Coins,
}

impl RewardPool {
    /// Check if both pools are empty.
    pub fn is_empty(&self) -> bool {
        self.pool.is_zero() && self.pool_commission.is_zero()
    }

    /// Amount of one denomination held across both pools.
    pub fn amount_of(&self, denom: &str) -> StateResult<Decimal> {
        from_amount(self.pool.amount_of(denom))
            .checked_add(from_amount(self.pool_commission.amount_of(denom)))
            .ok_or(StateError::ArithmeticOverflow)
    }

    fn credit(&self, reward: &Coins, commission: &Coins) -> StateResult<Self> {
        Ok(Self {
            pool: self
                .pool
                .checked_add(reward)
                .ok_or(StateError::ArithmeticOverflow)?,
            pool_commission: self
                .pool_commission
                .checked_add(commission)
                .ok_or(StateError::ArithmeticOverflow)?,
        })
    }

    /// Take the whole commission, leaving the delegator pool untouched.
    pub fn withdraw_commission(&self) -> (Self, Coins) {
        let remaining = Self {
            pool: self.pool.clone(),
            pool_commission: Coins::new(),
        };
        (remaining, self.pool_commission.clone())
    }

    /// Debit delegator rewards.
    pub fn debit(&self, validator: &Address, amount: &Coins) -> StateResult<Self> {
        let pool = self
            .pool
            .checked_sub(amount)
            .ok_or_else(|| StateError::InsufficientPool {
                validator: *validator,
                available: self.pool.clone(),
                requested: amount.clone(),
            })?;
        Ok(Self {
            pool,
            pool_commission: self.pool_commission.clone(),
        })
    }
}

/// What one fee injection credited, per validator and to the community pool.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeeAllocation {
    /// Community tax plus every remainder that could not be split.
    pub community: Coins,
    /// Credits per validator, in ascending operator order.
    pub validators: BTreeMap<Address, RewardPool>,
}

impl FeeAllocation {
    /// Everything the injection credited.
    pub fn total(&self) -> StateResult<Coins> {
        let mut total = self.community.clone();
        for credit in self.validators.values() {
            total = total
                .checked_add(&credit.pool)
                .and_then(|t| t.checked_add(&credit.pool_commission))
                .ok_or(StateError::ArithmeticOverflow)?;
        }
        Ok(total)
    }
}

/// Global distribution ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeePool {
    total_val_accum: Accumulator,
    validator_dist_pools: BTreeMap<Address, RewardPool>,
    community_pool: Coins,
}

impl FeePool {
    /// Fee pool at genesis: nothing accrued, accumulator at height zero.
    pub fn initial() -> Self {
        Self {
            total_val_accum: Accumulator::default(),
            validator_dist_pools: BTreeMap::new(),
            community_pool: Coins::new(),
        }
    }

    /// Reassemble a fee pool from its stored parts.
    pub fn from_parts(
        total_val_accum: Accumulator,
        validator_dist_pools: BTreeMap<Address, RewardPool>,
        community_pool: Coins,
    ) -> Self {
        Self {
            total_val_accum,
            validator_dist_pools,
            community_pool,
        }
    }

    pub fn total_val_accum(&self) -> Accumulator {
        self.total_val_accum
    }

    pub fn validator_dist_pools(&self) -> &BTreeMap<Address, RewardPool> {
        &self.validator_dist_pools
    }

    pub fn reward_pool(&self, validator: &Address) -> Option<&RewardPool> {
        self.validator_dist_pools.get(validator)
    }

    pub fn community_pool(&self) -> &Coins {
        &self.community_pool
    }

    /// Copy of this fee pool with one validator's reward pool replaced.
    pub fn with_reward_pool(&self, validator: Address, reward_pool: RewardPool) -> Self {
        let mut validator_dist_pools = self.validator_dist_pools.clone();
        validator_dist_pools.insert(validator, reward_pool);
        Self {
            validator_dist_pools,
            ..self.clone()
        }
    }

    /// Amount of `denom` held by the community pool and every reward pool.
    pub fn holdings_of(&self, denom: &str) -> StateResult<Decimal> {
        let mut total = from_amount(self.community_pool.amount_of(denom));
        for reward_pool in self.validator_dist_pools.values() {
            total = total
                .checked_add(reward_pool.amount_of(denom)?)
                .ok_or(StateError::ArithmeticOverflow)?;
        }
        Ok(total)
    }

    /// Advance `total_val_accum` to `height` at `total_power`.
    pub fn update_total_val_accum(&self, height: i64, total_power: Decimal) -> StateResult<Self> {
        Ok(Self {
            total_val_accum: self
                .total_val_accum
                .update_for_new_height(height, total_power)?,
            ..self.clone()
        })
    }

    /// Split collected fees between the community pool and bonded validators.
    ///
    /// Per denomination, `floor(amount * community_tax)` goes to the
    /// community pool. The rest is split by power over bonded validators in
    /// ascending operator order: each share is floored, the validator's
    /// commission is `floor(share * commission_rate)`, and whatever the
    /// floors leave behind goes to the community pool. With no bonded power
    /// the community pool receives everything.
    ///
    /// `total_val_accum` is advanced to `height` at the pre-injection total
    /// bonded power. On error the receiver is unchanged.
    pub fn inject_fees<V: HasPower>(
        &self,
        height: i64,
        fees: &Coins,
        validators: &[V],
        params: &DistributionParams,
    ) -> StateResult<(Self, FeeAllocation)> {
        params.validate()?;

        let mut bonded: BTreeMap<Address, (Decimal, Decimal)> = BTreeMap::new();
        for validator in validators.iter().filter(|v| v.is_bonded()) {
            let power = validator.power();
            if power <= Decimal::ZERO {
                continue;
            }
            validate_commission_rate(validator)?;
            bonded.insert(validator.operator(), (power, validator.commission_rate()));
        }

        let total_power = bonded
            .values()
            .try_fold(Decimal::ZERO, |acc, (power, _)| acc.checked_add(*power))
            .ok_or(StateError::ArithmeticOverflow)?;

        let total_val_accum = self
            .total_val_accum
            .update_for_new_height(height, total_power)?;

        let mut allocation = FeeAllocation::default();
        for coin in fees.iter() {
            let taxed = floor_of(from_amount(coin.amount), params.community_tax)?;
            let distributable = coin.amount - taxed;

            let mut distributed = 0u64;
            if !total_power.is_zero() {
                for (operator, (power, rate)) in &bonded {
                    let share = share_of(distributable, *power, total_power)?
                        .min(distributable - distributed);
                    if share == 0 {
                        continue;
                    }
                    let commission = floor_of(from_amount(share), *rate)?;

                    let credit = allocation.validators.entry(*operator).or_default();
                    *credit = credit.credit(
                        &Coins::single(coin.denom.as_str(), share - commission),
                        &Coins::single(coin.denom.as_str(), commission),
                    )?;
                    distributed += share;
                }
            }

            // Tax plus truncation dust
            let community_share = coin.amount - distributed;
            allocation.community = allocation
                .community
                .checked_add_amount(&coin.denom, community_share)
                .ok_or(StateError::ArithmeticOverflow)?;
        }

        let mut validator_dist_pools = self.validator_dist_pools.clone();
        for (operator, credit) in &allocation.validators {
            let entry = validator_dist_pools.entry(*operator).or_default();
            *entry = entry.credit(&credit.pool, &credit.pool_commission)?;
        }
        let community_pool = self
            .community_pool
            .checked_add(&allocation.community)
            .ok_or(StateError::ArithmeticOverflow)?;

        tracing::debug!(
            height,
            fees = %fees,
            community = %allocation.community,
            validators = allocation.validators.len(),
            "Injected fees"
        );

        Ok((
            Self {
                total_val_accum,
                validator_dist_pools,
                community_pool,
            },
            allocation,
        ))
    }

    /// Zero a validator's commission and return what it held.
    ///
    /// An unknown validator or an empty commission yields empty coins and
    /// an unchanged fee pool.
    pub fn withdraw_validator_commission(&self, validator: &Address) -> (Self, Coins) {
        let Some(reward_pool) = self.validator_dist_pools.get(validator) else {
            return (self.clone(), Coins::new());
        };
        if reward_pool.pool_commission.is_zero() {
            return (self.clone(), Coins::new());
        }

        let (remaining, commission) = reward_pool.withdraw_commission();
        (self.with_reward_pool(*validator, remaining), commission)
    }

    /// Debit delegator rewards from a validator's pool.
    ///
    /// Fails with [`StateError::InsufficientPool`] if any denomination of
    /// `amount` exceeds what remains.
    pub fn withdraw_delegator_reward(&self, validator: &Address, amount: &Coins) -> StateResult<Self> {
        if amount.is_zero() {
            return Ok(self.clone());
        }

        let current = self
            .validator_dist_pools
            .get(validator)
            .cloned()
            .unwrap_or_default();
        let updated = current.debit(validator, amount)?;
        Ok(self.with_reward_pool(*validator, updated))
    }
}

impl Default for FeePool {
    fn default() -> Self {
        Self::initial()
    }
}

/// `floor(amount * ratio)` for a ratio in `[0, 1]`.
fn floor_of(amount: Decimal, ratio: Decimal) -> StateResult<u64> {
    amount
        .checked_mul(ratio)
        .and_then(floor_amount)
        .ok_or(StateError::ArithmeticOverflow)
}

/// `floor(amount * power / total)`.
///
/// Decimal division rounds to 28 digits, so a quotient just below an
/// integer can come back as that integer; the share is stepped back when
/// multiplying it out overshoots the product. If `amount * power` exceeds
/// the decimal range the ratio is taken first and the result may sit one
/// unit above the floor; callers clamp each share to what remains.
fn share_of(amount: u64, power: Decimal, total: Decimal) -> StateResult<u64> {
    let amount = from_amount(amount);
    let Some(product) = amount.checked_mul(power) else {
        let value = power
            .checked_div(total)
            .and_then(|ratio| ratio.checked_mul(amount))
            .ok_or(StateError::ArithmeticOverflow)?;
        return floor_amount(value).ok_or(StateError::ArithmeticOverflow);
    };

    let value = product
        .checked_div(total)
        .ok_or(StateError::ArithmeticOverflow)?;
    let share = floor_amount(value).ok_or(StateError::ArithmeticOverflow)?;
    let overshoots = from_amount(share)
        .checked_mul(total)
        .map_or(true, |back| back > product);
    if share > 0 && overshoots {
        return Ok(share - 1);
    }
    Ok(share)
}
