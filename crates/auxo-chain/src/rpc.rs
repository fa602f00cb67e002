//! JSON-RPC batch transport
//!
//! Every `eth_call` in a batch is sent in a single HTTP request (a JSON-RPC
//! batch array) pinned to one block number. The response is only accepted if
//! it answers every request id exactly once without an error object.

use crate::abi;
use crate::error::{ChainError, Result};
use async_trait::async_trait;
use auxo_core::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// A read-only contract call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EthCall {
    pub to: Address,
    pub data: Vec<u8>,
}

/// Executes many read-only calls in one network round trip at a fixed block
#[async_trait]
pub trait BatchCaller: Send + Sync {
    /// Returns the raw return data of each call, in call order
    async fn call_batch(&self, calls: &[EthCall], block: u64) -> Result<Vec<Vec<u8>>>;
}

#[async_trait]
impl<T: BatchCaller + ?Sized> BatchCaller for std::sync::Arc<T> {
    async fn call_batch(&self, calls: &[EthCall], block: u64) -> Result<Vec<Vec<u8>>> {
        (**self).call_batch(calls, block).await
    }
}

#[async_trait]
impl<'a, T: BatchCaller + ?Sized> BatchCaller for &'a T {
    async fn call_batch(&self, calls: &[EthCall], block: u64) -> Result<Vec<Vec<u8>>> {
        (**self).call_batch(calls, block).await
    }
}

#[derive(Serialize)]
struct CallObject {
    to: String,
    data: String,
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: (CallObject, String),
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<JsonRpcErrorObject>,
}

/// Build the batch body for a set of calls; request ids are call positions
fn build_batch(calls: &[EthCall], block: u64) -> Vec<JsonRpcRequest> {
    let block_tag = format!("{:#x}", block);
    calls
        .iter()
        .enumerate()
        .map(|(i, call)| JsonRpcRequest {
            jsonrpc: "2.0",
            id: i as u64,
            method: "eth_call",
            params: (
                CallObject {
                    to: call.to.to_string(),
                    data: format!("0x{}", hex::encode(&call.data)),
                },
                block_tag.clone(),
            ),
        })
        .collect()
}

/// Match a batch response back to request order.
///
/// Responses may arrive in any order. Any error entry, missing id, duplicate
/// id or missing result fails the whole batch.
pub fn collect_results(expected: usize, body: serde_json::Value) -> Result<Vec<Vec<u8>>> {
    // A single error object instead of an array means the batch was rejected
    if let serde_json::Value::Object(_) = body {
        let single: JsonRpcResponse = serde_json::from_value(body)
            .map_err(|e| ChainError::MalformedResponse(e.to_string()))?;
        return Err(match single.error {
            Some(err) => ChainError::Rpc {
                id: single.id,
                code: err.code,
                message: err.message,
            },
            None => ChainError::MalformedResponse("expected batch array".to_string()),
        });
    }

    let responses: Vec<JsonRpcResponse> = serde_json::from_value(body)
        .map_err(|e| ChainError::MalformedResponse(e.to_string()))?;

    if responses.len() != expected {
        return Err(ChainError::MalformedResponse(format!(
            "expected {} responses, got {}",
            expected,
            responses.len()
        )));
    }

    let mut by_id: HashMap<u64, Vec<u8>> = HashMap::with_capacity(expected);
    for response in responses {
        if let Some(err) = response.error {
            return Err(ChainError::Rpc {
                id: response.id,
                code: err.code,
                message: err.message,
            });
        }
        let id = response
            .id
            .ok_or_else(|| ChainError::MalformedResponse("response without id".to_string()))?;
        let result = response.result.ok_or_else(|| {
            ChainError::MalformedResponse(format!("response {} has no result", id))
        })?;
        if by_id.insert(id, abi::decode_hex(&result)?).is_some() {
            return Err(ChainError::MalformedResponse(format!(
                "duplicate response id {}",
                id
            )));
        }
    }

    (0..expected as u64)
        .map(|id| {
            by_id
                .remove(&id)
                .ok_or_else(|| ChainError::MalformedResponse(format!("missing response id {}", id)))
        })
        .collect()
}

/// HTTP JSON-RPC client for an Ethereum node
pub struct JsonRpcClient {
    endpoint: String,
    client: reqwest::Client,
}

impl JsonRpcClient {
    /// Create a client with a transport-level timeout
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ChainError::InvalidEndpoint(endpoint.to_string()));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
        })
    }
}

#[async_trait]
impl BatchCaller for JsonRpcClient {
    async fn call_batch(&self, calls: &[EthCall], block: u64) -> Result<Vec<Vec<u8>>> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }

        let batch = build_batch(calls, block);
        tracing::debug!(
            "Sending batch of {} eth_call requests to {} at block {}",
            batch.len(),
            self.endpoint,
            block
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&batch)
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ChainError::MalformedResponse(e.to_string()))?;

        collect_results(calls.len(), body)
    }
}
