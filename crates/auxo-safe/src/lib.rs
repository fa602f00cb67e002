//! # Auxo Safe Batches
//!
//! Serializes allocations into Safe Transaction Builder documents for
//! multisig review. Nothing here touches the network or signs anything.

pub mod batch;
pub mod builder;
pub mod error;

pub use batch::{
    ContractInput, ContractMethod, SafeTransaction, SafeTx, SafeTxMeta, SAFE_TX_VERSION,
    TX_BUILDER_VERSION,
};
pub use builder::{CallShape, TransactionBatchBuilder};
pub use error::{Result, SafeError};
