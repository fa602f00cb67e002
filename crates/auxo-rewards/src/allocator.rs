//! Pro-rata allocation of a reward pool over compounded contributions
//!
//! Each eligible recipient receives
//! `floor(pool * contribution / total_contribution)` of the reward token.
//! The flooring dust stays in the pool and is reported, never reassigned.

use crate::error::{RewardError, Result};
use crate::redistribution::{apply_redistributions, Adjustment};
use crate::summary::{Drift, RewardSummary};
use auxo_core::{Account, Address, Amount, RecipientMap, RedistributionWeight, RewardToken};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Reward token and the amount to split
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPool {
    pub token: RewardToken,
    pub amount: Amount,
}

impl RewardPool {
    pub fn new(token: RewardToken, amount: Amount) -> Self {
        Self { token, amount }
    }
}

/// Output of [`RewardAllocator::allocate`]
#[derive(Clone, Debug)]
pub struct Allocation {
    pub pool: RewardPool,
    pub total_contribution: Amount,
    /// Pro-rata accounts before any override
    pub base: Vec<Account>,
    /// Accounts after redistribution
    pub accounts: Vec<Account>,
    pub adjustments: Vec<Adjustment>,
}

impl Allocation {
    /// Sum of the pro-rata shares
    pub fn distributed_pro_rata(&self) -> Result<Amount> {
        Ok(Amount::sum(self.base.iter().map(|a| a.reward.amount))?)
    }

    /// Sum of the final rewards
    pub fn total_rewards(&self) -> Result<Amount> {
        Ok(Amount::sum(self.accounts.iter().map(|a| a.reward.amount))?)
    }

    /// Pool versus pro-rata shares
    pub fn drift(&self) -> Result<Drift> {
        Ok(Drift::measure(
            self.pool.amount,
            self.distributed_pro_rata()?,
            self.base.len(),
        ))
    }

    /// `(receiver, amount)` pairs in account order
    pub fn rewards_by_account(&self) -> Vec<(Address, Amount)> {
        self.accounts
            .iter()
            .map(|a| (a.address, a.reward.amount))
            .collect()
    }

    pub fn summary(&self) -> Result<RewardSummary> {
        let to_stakers = self.distributed_pro_rata()?;
        let transferred = Amount::sum(self.adjustments.iter().map(|a| a.amount))?;
        Ok(RewardSummary {
            token: self.pool.token,
            amount: self.total_rewards()?,
            pro_rata_pool: self.pool.amount,
            total_contribution: self.total_contribution,
            to_stakers,
            remainder: self
                .pool
                .amount
                .checked_sub(to_stakers)
                .unwrap_or_else(Amount::zero),
            transferred,
            recipient_count: self.accounts.len(),
            adjustments: self.adjustments.clone(),
        })
    }
}

/// Splits a pool across contributors, then applies manual overrides
#[derive(Clone, Debug)]
pub struct RewardAllocator {
    pool: RewardPool,
    redistributions: Vec<RedistributionWeight>,
}

impl RewardAllocator {
    pub fn new(pool: RewardPool) -> Self {
        Self {
            pool,
            redistributions: Vec::new(),
        }
    }

    pub fn with_redistributions(mut self, weights: &[RedistributionWeight]) -> Self {
        self.redistributions = weights.to_vec();
        self
    }

    /// Allocate over explicit `(address, contribution)` pairs, in order
    pub fn allocate<I>(&self, contributions: I) -> Result<Allocation>
    where
        I: IntoIterator<Item = (Address, Amount)>,
    {
        let token = self.pool.token;
        let mut seen = HashSet::new();
        let mut base = Vec::new();
        for (address, contribution) in contributions {
            if !seen.insert(address) {
                return Err(RewardError::DuplicateAccount(address));
            }
            base.push(Account::active(address, contribution, token));
        }

        let total_contribution = Amount::sum(base.iter().map(|a| a.contribution.amount))?;

        // A zero total or zero pool leaves every share at zero
        if !total_contribution.is_zero() && !self.pool.amount.is_zero() {
            for account in base.iter_mut() {
                account.reward.amount = self
                    .pool
                    .amount
                    .mul_div_floor(account.contribution.amount, total_contribution)?;
            }
        }

        let (accounts, adjustments) = apply_redistributions(&base, &self.redistributions, token)?;

        let allocation = Allocation {
            pool: self.pool,
            total_contribution,
            base,
            accounts,
            adjustments,
        };

        tracing::info!(
            "Allocated {} {} ({:.4} tokens) over {} contributors, {} adjustments",
            allocation.pool.amount,
            token,
            allocation.pool.amount.to_token_units(),
            allocation.base.len(),
            allocation.adjustments.len()
        );
        allocation.drift()?.report(token);

        Ok(allocation)
    }

    /// Allocate over eligible merkle recipients, using their leaf amount as
    /// the contribution
    pub fn allocate_recipients(&self, recipients: &RecipientMap) -> Result<Allocation> {
        self.allocate(
            recipients
                .iter()
                .map(|(address, leaf)| (*address, leaf.rewards)),
        )
    }
}
