//! Error types for reward allocation

use auxo_core::{Address, CoreError};
use thiserror::Error;

/// Result type alias for allocation operations
pub type Result<T> = std::result::Result<T, RewardError>;

/// Errors raised before or during allocation.
///
/// All of these are validation failures: they are raised before any
/// artifact based on the allocation is written.
#[derive(Error, Debug)]
pub enum RewardError {
    /// Address appears twice in the contribution list
    #[error("Duplicate account {0} in allocation input")]
    DuplicateAccount(Address),

    /// Redistribution transfer with no amount
    #[error("Transfer to {0} has zero amount")]
    ZeroTransfer(Address),

    /// Core validation or arithmetic failure
    #[error(transparent)]
    Core(#[from] CoreError),
}
