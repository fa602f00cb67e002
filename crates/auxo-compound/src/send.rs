//! Send: eligible compounders to allocation and deposit batch

use crate::config::CompoundConfig;
use crate::error::{CompoundError, Result};
use crate::report::{split_filename, CompoundReport};
use auxo_core::{Amount, RecipientMap, RewardToken};
use auxo_rewards::{Drift, RewardAllocator, RewardPool, RewardSummary};
use auxo_safe::TransactionBatchBuilder;
use serde::Serialize;

/// What a send run computed and wrote
#[derive(Clone, Debug, Serialize)]
pub struct SendOutcome {
    pub summary: RewardSummary,
    pub drift: Drift,
    /// `compound-<TOKEN>-<N>.json`
    pub compound_file: String,
    /// `safe-tx-<TOKEN>-<N>.json`
    pub safe_tx_file: String,
}

/// Split `pool` over the recipients in `recipients_file`, apply the
/// configured transfers and write the report and deposit batch.
///
/// Every validation (file token, amounts, batch shape) runs before the
/// first write.
pub fn distribute_compounded(
    config: &CompoundConfig,
    token: RewardToken,
    pool: Amount,
    recipients_file: &str,
) -> Result<SendOutcome> {
    if let Ok((found, _)) = split_filename(recipients_file) {
        if found != token {
            return Err(CompoundError::TokenMismatch {
                file: recipients_file.to_string(),
                expected: token,
                found,
            });
        }
    }

    let store = config.store()?;
    let recipients: RecipientMap = store.read(recipients_file)?;
    tracing::info!(
        "Distributing {} {} over {} compounders from {}",
        pool,
        token,
        recipients.len(),
        recipients_file
    );

    let allocation = RewardAllocator::new(RewardPool::new(token, pool))
        .with_redistributions(config.redistributions_for(token))
        .allocate_recipients(&recipients)?;
    let summary = allocation.summary()?;
    let drift = allocation.drift()?;

    let safe_tx = TransactionBatchBuilder::new(config.chain.chain_id, config.safe_meta()).for_token(
        token,
        config.reward_target(token),
        &allocation.rewards_by_account(),
    )?;
    let report = CompoundReport::new(&allocation, summary.clone(), &config.run_note(token));

    let compound_file = store.write_versioned(&format!("compound-{}", token), &report)?;
    let safe_tx_file = store.write_versioned(&format!("safe-tx-{}", token), &safe_tx)?;

    tracing::info!(
        "Created {} compounding report {} and batch {} ({} calls)",
        token,
        compound_file,
        safe_tx_file,
        safe_tx.len()
    );

    Ok(SendOutcome {
        summary,
        drift,
        compound_file,
        safe_tx_file,
    })
}
