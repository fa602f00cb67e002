//! Allocation summary and rounding drift

use crate::redistribution::Adjustment;
use auxo_core::{Amount, RewardToken};
use serde::{Deserialize, Serialize};

/// Aggregate result of one allocation run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSummary {
    pub token: RewardToken,

    /// Sum of every final reward, transfers included. May exceed the pool.
    pub amount: Amount,

    /// Pool split pro-rata
    pub pro_rata_pool: Amount,

    /// WETH compounded by the eligible recipients
    pub total_contribution: Amount,

    /// Part of the pool that reached stakers after flooring
    pub to_stakers: Amount,

    /// Flooring dust left in the pool, not redistributed
    pub remainder: Amount,

    /// Sum of manual transfers
    pub transferred: Amount,

    /// Accounts after redistribution
    pub recipient_count: usize,

    pub adjustments: Vec<Adjustment>,
}

/// Difference between what should and what did get distributed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drift {
    pub expected: Amount,
    pub actual: Amount,
    pub diff: Amount,
    pub tolerance: Amount,
}

impl Drift {
    /// Flooring `n` shares loses strictly less than `n` units, so the
    /// tolerance is `n - 1`.
    pub fn measure(expected: Amount, actual: Amount, recipient_count: usize) -> Self {
        let tolerance = Amount::from(recipient_count.saturating_sub(1) as u64);
        Self {
            expected,
            actual,
            diff: expected.abs_diff(actual),
            tolerance,
        }
    }

    pub fn within_tolerance(&self) -> bool {
        self.diff <= self.tolerance
    }

    /// Log the drift, warning if it is beyond tolerance
    pub fn report(&self, token: RewardToken) {
        if self.within_tolerance() {
            tracing::info!(
                "{} rounding remainder {} wei within tolerance {}",
                token,
                self.diff,
                self.tolerance
            );
        } else {
            tracing::warn!(
                "{} distribution drift {} wei exceeds tolerance {} (expected {}, got {})",
                token,
                self.diff,
                self.tolerance,
                self.expected,
                self.actual
            );
        }
    }
}
