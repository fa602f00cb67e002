//! Compounding report file and checks run against written artifacts

use crate::error::{CompoundError, Result};
use auxo_core::{total_contribution, Account, Address, Amount, RecipientMap, RewardToken};
use auxo_rewards::{Allocation, Drift, RewardSummary};
use auxo_storage::ArtifactStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Contents of `compound-<TOKEN>-<N>.json`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompoundReport {
    #[serde(flatten)]
    pub summary: RewardSummary,

    /// Final accounts, each noted with the run it belongs to
    pub recipients: Vec<Account>,

    /// Pro-rata accounts before manual transfers
    pub pre_redistribution: Vec<Account>,
}

impl CompoundReport {
    pub fn new(allocation: &Allocation, summary: RewardSummary, run_note: &str) -> Self {
        let recipients = allocation
            .accounts
            .iter()
            .cloned()
            .map(|mut account| {
                account.notes.insert(0, run_note.to_string());
                account
            })
            .collect();
        Self {
            summary,
            recipients,
            pre_redistribution: allocation.base.clone(),
        }
    }
}

/// Split `<name>-<TOKEN>-<N>.json` into its token and suffix
pub fn split_filename(filename: &str) -> Result<(RewardToken, String)> {
    let invalid = || CompoundError::InvalidFilename(filename.to_string());

    let stem = filename.strip_suffix(".json").ok_or_else(invalid)?;
    let (head, suffix) = stem.rsplit_once('-').ok_or_else(invalid)?;
    let token_part = head.rsplit('-').next().ok_or_else(invalid)?;
    if suffix.is_empty() || token_part == head {
        return Err(invalid());
    }
    let token = token_part.parse::<RewardToken>().map_err(|_| invalid())?;
    Ok((token, suffix.to_string()))
}

/// Re-check a written compounding report
#[derive(Clone, Debug, Serialize)]
pub struct DistributionCheck {
    pub token: RewardToken,
    /// Sum of the recipients' rewards as written
    pub summed: Amount,
    /// The report's total
    pub total: Amount,
    /// Pool versus pro-rata shares in the report
    pub pro_rata: Drift,
}

impl DistributionCheck {
    /// Recipients never receive more than the reported total and the
    /// flooring dust is within tolerance
    pub fn is_ok(&self) -> bool {
        self.summed <= self.total && self.pro_rata.within_tolerance()
    }
}

/// Read `compound-<TOKEN>-<N>.json` and compare its parts
pub fn validate_distribution(store: &ArtifactStore, filename: &str) -> Result<DistributionCheck> {
    let report: CompoundReport = store.read(filename)?;
    let summed = Amount::sum(report.recipients.iter().map(|a| a.reward.amount))?;
    let pro_rata_paid = Amount::sum(report.pre_redistribution.iter().map(|a| a.reward.amount))?;

    let check = DistributionCheck {
        token: report.summary.token,
        summed,
        total: report.summary.amount,
        pro_rata: Drift::measure(
            report.summary.pro_rata_pool,
            pro_rata_paid,
            report.pre_redistribution.len(),
        ),
    };

    if check.is_ok() {
        tracing::info!(
            "{} summed: {} | total: {} | remainder: {}",
            check.token,
            check.summed,
            check.total,
            check.pro_rata.diff
        );
    } else {
        tracing::warn!(
            "{} summed: {} | total: {} | pro-rata drift {} beyond {}",
            check.token,
            check.summed,
            check.total,
            check.pro_rata.diff,
            check.pro_rata.tolerance
        );
    }
    Ok(check)
}

/// Compounder count and WETH compounded in a recipients file
#[derive(Clone, Debug, Serialize)]
pub struct RecipientTotals {
    pub token: RewardToken,
    pub compounders: usize,
    pub total: Amount,
}

/// Read `recipients-<TOKEN>-<N>.json` and total it
pub fn totals(store: &ArtifactStore, filename: &str) -> Result<RecipientTotals> {
    let (token, _) = split_filename(filename)?;
    let recipients: RecipientMap = store.read(filename)?;
    let totals = RecipientTotals {
        token,
        compounders: recipients.len(),
        total: total_contribution(&recipients)?,
    };
    tracing::info!(
        "Group: {}, Compounded Rewards: {} ({:.6}) across {} compounders",
        totals.token,
        totals.total,
        totals.total.to_token_units(),
        totals.compounders
    );
    Ok(totals)
}

/// Every address appearing in any of the recipients files, sorted
pub fn union_addresses(store: &ArtifactStore, filenames: &[String]) -> Result<Vec<Address>> {
    let mut all = BTreeSet::new();
    for filename in filenames {
        let recipients: RecipientMap = store.read(filename)?;
        all.extend(recipients.keys().copied());
    }
    Ok(all.into_iter().collect())
}
