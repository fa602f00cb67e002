//! # Auxo Chain Reads
//!
//! Answers two questions for every leaf of a claim tree at one block height:
//! has the recipient delegated its claim to the operator, and has the leaf
//! been claimed. Each question is a single JSON-RPC batch of `eth_call`s.
//!
//! - [`ChainReadBatcher`] - encodes and runs the batches
//! - [`filter_eligible`] - keeps the delegated-but-unclaimed recipients
//! - [`BatchCaller`] - network seam, implemented by [`JsonRpcClient`]

pub mod abi;
pub mod batcher;
pub mod eligibility;
pub mod error;
pub mod rpc;

pub use batcher::{ChainReadBatcher, ClaimStatus, DistributorContract, StatusMap};
pub use eligibility::{eligible_from_status, filter_eligible};
pub use error::{ChainError, Result};
pub use rpc::{BatchCaller, EthCall, JsonRpcClient};
