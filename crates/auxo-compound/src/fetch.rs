//! Fetch: claim tree to eligible compounders

use crate::config::CompoundConfig;
use crate::error::Result;
use auxo_chain::{eligible_from_status, BatchCaller, ChainReadBatcher, DistributorContract};
use auxo_core::{to_claims, total_contribution, Amount, MerkleTree, RewardToken};
use auxo_safe::TransactionBatchBuilder;
use serde::Serialize;

/// What a fetch run read and wrote
#[derive(Clone, Debug, Serialize)]
pub struct FetchOutcome {
    pub token: RewardToken,
    pub block: u64,
    pub tree_recipients: usize,
    pub delegated: usize,
    pub claimed: usize,
    pub eligible: usize,
    /// WETH held by the eligible recipients
    pub total_contribution: Amount,
    /// `recipients-<TOKEN>-<N>.json`
    pub recipients_file: String,
    /// `recipients-tuple-<TOKEN>-<N>.json`
    pub tuples_file: String,
    /// `safe-claim-<TOKEN>-<ROUND>.json`, absent when nobody is eligible
    pub claim_tx_file: Option<String>,
}

/// Load the token's tree, read delegation and claim status at the snapshot
/// block and persist the delegated-but-unclaimed recipients.
///
/// Chain reads and document building finish before the first write, so a
/// failed read leaves no artifacts behind.
pub async fn fetch_compounders<C: BatchCaller>(
    config: &CompoundConfig,
    token: RewardToken,
    caller: C,
) -> Result<FetchOutcome> {
    let tree = MerkleTree::load(&config.tree_path(token))?;
    let distributor = config.distributor(token);

    let batcher = ChainReadBatcher::new(
        caller,
        DistributorContract {
            distributor,
            operator: config.addresses.operator,
        },
        config.block_snapshot,
    );
    let status = batcher.read_status(&tree.recipients).await?;
    let eligible = eligible_from_status(&status, &tree.recipients);

    let claims = to_claims(&eligible);
    let claim_tx = if claims.is_empty() {
        None
    } else {
        let builder = TransactionBatchBuilder::new(config.chain.chain_id, config.safe_meta());
        Some(builder.claim_multi_delegated(distributor, &claims)?)
    };
    let contribution = total_contribution(&eligible)?;

    let store = config.store()?;
    let recipients_file = store.write_versioned(&format!("recipients-{}", token), &eligible)?;
    let tuples_file = store.write_versioned(&format!("recipients-tuple-{}", token), &claims)?;
    let claim_name = format!("safe-claim-{}", token);
    let claim_tx_file = match claim_tx {
        Some(tx) => Some(store.write_round(&claim_name, config.compound_round, &tx)?),
        None => {
            // An earlier fetch of this round may have left a claim batch that
            // no longer matches the recipients just written
            match store.remove_round(&claim_name, config.compound_round)? {
                Some(stale) => tracing::warn!(
                    "No eligible {} compounders, removed stale claim transaction {}",
                    token,
                    stale
                ),
                None => tracing::warn!(
                    "No eligible {} compounders, skipping claim transaction",
                    token
                ),
            }
            None
        }
    };

    tracing::info!(
        "Created {} compounders file {} ({} recipients, {} WETH)",
        token,
        recipients_file,
        eligible.len(),
        contribution.to_token_units()
    );

    Ok(FetchOutcome {
        token,
        block: status.block,
        tree_recipients: tree.recipients.len(),
        delegated: status.delegated_count(),
        claimed: status.claimed_count(),
        eligible: eligible.len(),
        total_contribution: contribution,
        recipients_file,
        tuples_file,
        claim_tx_file,
    })
}
