//! Safe Transaction Builder document model
//!
//! Field names and order match what the Safe web app's transaction builder
//! imports. Argument values are strings; array arguments are JSON array
//! strings.

use auxo_core::Address;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Document schema version
pub const SAFE_TX_VERSION: &str = "1.0";

/// Transaction builder version recorded in the metadata
pub const TX_BUILDER_VERSION: &str = "1.41.1";

// ============================================================================
// Document
// ============================================================================

/// A batch of calls for one multisig execution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeTx {
    pub version: String,

    /// Decimal chain id, as a string
    pub chain_id: String,

    /// Unix timestamp in whole seconds
    pub created_at: i64,

    pub meta: SafeTxMeta,

    pub transactions: Vec<SafeTransaction>,
}

impl SafeTx {
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeTxMeta {
    pub name: String,
    pub description: String,
    pub tx_builder_version: String,
    pub created_from_safe_address: String,
    pub created_from_owner_address: String,
    pub checksum: String,
}

impl Default for SafeTxMeta {
    fn default() -> Self {
        Self {
            name: "Transactions Batch".to_string(),
            description: String::new(),
            tx_builder_version: TX_BUILDER_VERSION.to_string(),
            created_from_safe_address: String::new(),
            created_from_owner_address: String::new(),
            checksum: String::new(),
        }
    }
}

// ============================================================================
// Calls
// ============================================================================

/// One contract call in the batch
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeTransaction {
    pub to: Address,

    /// Wei sent with the call
    pub value: String,

    /// Raw calldata; left empty so the builder encodes from the method
    pub data: Option<String>,

    pub contract_method: ContractMethod,

    /// Argument values keyed by input name, in declaration order
    pub contract_inputs_values: IndexMap<String, serde_json::Value>,
}

impl SafeTransaction {
    /// Non-payable call described by its method ABI
    pub fn call(
        to: Address,
        method: ContractMethod,
        values: IndexMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            to,
            value: "0".to_string(),
            data: None,
            contract_method: method,
            contract_inputs_values: values,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractMethod {
    pub inputs: Vec<ContractInput>,
    pub name: String,
    pub payable: bool,
}

impl ContractMethod {
    pub fn new(name: &str, inputs: Vec<ContractInput>) -> Self {
        Self {
            inputs,
            name: name.to_string(),
            payable: false,
        }
    }
}

/// ABI input declaration; `components` is set for tuple types
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInput {
    pub internal_type: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ContractInput>>,
}

impl ContractInput {
    /// Input whose internal type equals its ABI type
    pub fn new(name: &str, kind: &str) -> Self {
        Self {
            internal_type: kind.to_string(),
            name: name.to_string(),
            kind: kind.to_string(),
            components: None,
        }
    }

    /// Tuple or tuple array input
    pub fn tuple(
        name: &str,
        internal_type: &str,
        kind: &str,
        components: Vec<ContractInput>,
    ) -> Self {
        Self {
            internal_type: internal_type.to_string(),
            name: name.to_string(),
            kind: kind.to_string(),
            components: Some(components),
        }
    }
}
