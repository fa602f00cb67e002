//! Allocation to batch document
//!
//! PRV is staked per receiver through the roll staker's `depositFor`. ARV is
//! topped up with a single `increaseAmountsForMany` call on the locker. The
//! argument order of each method is part of the contract ABI and must not
//! change.

use crate::batch::{
    ContractInput, ContractMethod, SafeTransaction, SafeTx, SafeTxMeta, SAFE_TX_VERSION,
};
use crate::error::{Result, SafeError};
use auxo_core::{Address, Amount, Claim, RewardToken};
use indexmap::IndexMap;
use serde_json::Value;

/// How an allocation maps onto contract calls
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallShape {
    /// One `depositFor(_amount, _receiver)` per receiver
    DepositForMany,
    /// One `increaseAmountsForMany(_receivers, _amounts)` for everyone
    BatchIncrease,
}

impl CallShape {
    pub fn for_token(token: RewardToken) -> Self {
        match token {
            RewardToken::PRV => Self::DepositForMany,
            RewardToken::ARV => Self::BatchIncrease,
        }
    }
}

/// Builds batch documents for one chain and metadata block
#[derive(Clone, Debug)]
pub struct TransactionBatchBuilder {
    chain_id: u64,
    meta: SafeTxMeta,
    created_at: Option<i64>,
}

impl TransactionBatchBuilder {
    pub fn new(chain_id: u64, meta: SafeTxMeta) -> Self {
        Self {
            chain_id,
            meta,
            created_at: None,
        }
    }

    /// Pin the creation timestamp instead of reading the clock
    pub fn with_created_at(mut self, timestamp: i64) -> Self {
        self.created_at = Some(timestamp);
        self
    }

    /// Document for a token's allocation, using that token's call shape
    pub fn for_token(
        &self,
        token: RewardToken,
        target: Address,
        rewards: &[(Address, Amount)],
    ) -> Result<SafeTx> {
        match CallShape::for_token(token) {
            CallShape::DepositForMany => self.deposit_for_many(target, rewards),
            CallShape::BatchIncrease => self.batch_increase(target, rewards),
        }
    }

    /// One `depositFor` call per `(receiver, amount)`, in input order
    pub fn deposit_for_many(
        &self,
        target: Address,
        rewards: &[(Address, Amount)],
    ) -> Result<SafeTx> {
        if rewards.is_empty() {
            return Err(SafeError::EmptyAllocation);
        }

        let transactions = rewards
            .iter()
            .map(|(receiver, amount)| {
                let mut values = IndexMap::new();
                values.insert("_amount".to_string(), Value::String(amount.to_string()));
                values.insert("_receiver".to_string(), Value::String(receiver.to_string()));
                SafeTransaction::call(target, deposit_for_method(), values)
            })
            .collect();

        Ok(self.document(transactions))
    }

    /// Unzip `(receiver, amount)` pairs into one `increaseAmountsForMany`
    pub fn batch_increase(&self, target: Address, rewards: &[(Address, Amount)]) -> Result<SafeTx> {
        let (receivers, amounts): (Vec<Address>, Vec<Amount>) = rewards.iter().copied().unzip();
        self.increase_amounts_for_many(target, &receivers, &amounts)
    }

    /// Single call taking positionally paired receiver and amount lists
    pub fn increase_amounts_for_many(
        &self,
        target: Address,
        receivers: &[Address],
        amounts: &[Amount],
    ) -> Result<SafeTx> {
        if receivers.len() != amounts.len() {
            return Err(SafeError::LengthMismatch {
                receivers: receivers.len(),
                amounts: amounts.len(),
            });
        }
        if receivers.is_empty() {
            return Err(SafeError::EmptyAllocation);
        }

        let mut values = IndexMap::new();
        values.insert("_receivers".to_string(), Value::String(serde_json::to_string(receivers)?));
        values.insert("_amounts".to_string(), Value::String(serde_json::to_string(amounts)?));

        let method = ContractMethod::new(
            "increaseAmountsForMany",
            vec![
                ContractInput::new("_receivers", "address[]"),
                ContractInput::new("_amounts", "uint256[]"),
            ],
        );
        Ok(self.document(vec![SafeTransaction::call(target, method, values)]))
    }

    /// `claimMultiDelegated(Claim[])` on a merkle distributor
    pub fn claim_multi_delegated(&self, distributor: Address, claims: &[Claim]) -> Result<SafeTx> {
        if claims.is_empty() {
            return Err(SafeError::EmptyAllocation);
        }

        let mut values = IndexMap::new();
        values.insert("_claims".to_string(), Value::String(serde_json::to_string(claims)?));

        let method = ContractMethod::new(
            "claimMultiDelegated",
            vec![ContractInput::tuple(
                "_claims",
                "struct IMerkleDistributor.Claim[]",
                "tuple[]",
                vec![
                    ContractInput::new("windowIndex", "uint256"),
                    ContractInput::new("accountIndex", "uint256"),
                    ContractInput::new("amount", "uint256"),
                    ContractInput::new("token", "address"),
                    ContractInput::new("merkleProof", "bytes32[]"),
                    ContractInput::new("account", "address"),
                ],
            )],
        );
        Ok(self.document(vec![SafeTransaction::call(distributor, method, values)]))
    }

    fn document(&self, transactions: Vec<SafeTransaction>) -> SafeTx {
        let created_at = self
            .created_at
            .unwrap_or_else(|| chrono::Utc::now().timestamp());
        tracing::debug!(
            "Built batch of {} calls on chain {}",
            transactions.len(),
            self.chain_id
        );
        SafeTx {
            version: SAFE_TX_VERSION.to_string(),
            chain_id: self.chain_id.to_string(),
            created_at,
            meta: self.meta.clone(),
            transactions,
        }
    }
}

fn deposit_for_method() -> ContractMethod {
    ContractMethod::new(
        "depositFor",
        vec![
            ContractInput::new("_amount", "uint256"),
            ContractInput::new("_receiver", "address"),
        ],
    )
}
