//! Batched claim-status reads against a merkle distributor

use crate::abi::{self, AbiValue};
use crate::error::{ChainError, Result};
use crate::rpc::{BatchCaller, EthCall};
use auxo_core::{Address, RecipientMap};
use indexmap::IndexMap;

/// Per-address answer to one yes/no query
pub type StatusMap = IndexMap<Address, bool>;

/// The distributor being queried and the operator recipients delegate to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DistributorContract {
    pub distributor: Address,
    pub operator: Address,
}

/// Both status maps, read at the same block
#[derive(Clone, Debug, Default)]
pub struct ClaimStatus {
    pub block: u64,
    pub delegated: StatusMap,
    pub claimed: StatusMap,
}

impl ClaimStatus {
    pub fn delegated_count(&self) -> usize {
        self.delegated.values().filter(|v| **v).count()
    }

    pub fn claimed_count(&self) -> usize {
        self.claimed.values().filter(|v| **v).count()
    }
}

/// Coalesces per-recipient view calls into one round trip per query type
pub struct ChainReadBatcher<C> {
    caller: C,
    contract: DistributorContract,
    block: u64,
}

impl<C: BatchCaller> ChainReadBatcher<C> {
    /// Every read issued by this batcher is pinned to `block`
    pub fn new(caller: C, contract: DistributorContract, block: u64) -> Self {
        Self {
            caller,
            contract,
            block,
        }
    }

    /// `isRewardsDelegate(recipient, operator)` for every recipient
    pub async fn delegated(&self, recipients: &RecipientMap) -> Result<StatusMap> {
        let calls: Vec<EthCall> = recipients
            .keys()
            .map(|user| EthCall {
                to: self.contract.distributor,
                data: abi::encode_call(
                    abi::IS_REWARDS_DELEGATE,
                    &[AbiValue::from(*user), AbiValue::from(self.contract.operator)],
                ),
            })
            .collect();

        let status = self.run("isRewardsDelegate", recipients, &calls).await?;
        tracing::debug!(
            "{} of {} recipients delegated to {} at block {}",
            status.values().filter(|v| **v).count(),
            status.len(),
            self.contract.operator,
            self.block
        );
        Ok(status)
    }

    /// `isClaimed(windowIndex, accountIndex)` for every recipient's leaf
    pub async fn claimed(&self, recipients: &RecipientMap) -> Result<StatusMap> {
        let calls: Vec<EthCall> = recipients
            .values()
            .map(|leaf| EthCall {
                to: self.contract.distributor,
                data: abi::encode_call(
                    abi::IS_CLAIMED,
                    &[
                        AbiValue::from(leaf.window_index),
                        AbiValue::from(leaf.account_index),
                    ],
                ),
            })
            .collect();

        let status = self.run("isClaimed", recipients, &calls).await?;
        tracing::debug!(
            "{} of {} leaves already claimed at block {}",
            status.values().filter(|v| **v).count(),
            status.len(),
            self.block
        );
        Ok(status)
    }

    /// Delegation then claim status. Either batch failing fails the whole read.
    pub async fn read_status(&self, recipients: &RecipientMap) -> Result<ClaimStatus> {
        let delegated = self.delegated(recipients).await?;
        let claimed = self.claimed(recipients).await?;
        Ok(ClaimStatus {
            block: self.block,
            delegated,
            claimed,
        })
    }

    async fn run(
        &self,
        query: &str,
        recipients: &RecipientMap,
        calls: &[EthCall],
    ) -> Result<StatusMap> {
        let results = self.caller.call_batch(calls, self.block).await?;
        if results.len() != calls.len() {
            return Err(ChainError::MalformedResponse(format!(
                "{}: {} calls but {} results",
                query,
                calls.len(),
                results.len()
            )));
        }

        let mut status = StatusMap::with_capacity(results.len());
        for (address, data) in recipients.keys().zip(results.iter()) {
            let value = abi::decode_bool(data).map_err(|e| {
                ChainError::MalformedResponse(format!("{} for {}: {}", query, address, e))
            })?;
            status.insert(*address, value);
        }
        Ok(status)
    }
}
