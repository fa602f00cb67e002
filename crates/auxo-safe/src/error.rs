//! Errors raised while building a batch document

use thiserror::Error;

/// Result type alias for batch building
pub type Result<T> = std::result::Result<T, SafeError>;

#[derive(Error, Debug)]
pub enum SafeError {
    /// No calls to build
    #[error("Cannot build a batch from an empty allocation")]
    EmptyAllocation,

    /// Receivers and amounts do not pair up
    #[error("Receiver and amount lists differ in length: {receivers} receivers, {amounts} amounts")]
    LengthMismatch { receivers: usize, amounts: usize },

    /// Encoding an argument list failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
