//! Error types for the Auxo compounding data model

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while parsing or validating core data
#[derive(Error, Debug)]
pub enum CoreError {
    // === Validation ===
    /// Address is not a 0x-prefixed 20 byte hex string
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Amount is not a non-negative integer string
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Arithmetic left the 256 bit range
    #[error("Amount overflow in {0}")]
    AmountOverflow(&'static str),

    /// Two leaves in the same window share an account index
    #[error("Duplicate account index {account_index} in window {window_index}")]
    DuplicateAccountIndex { window_index: u64, account_index: u64 },

    /// Two recipient keys name the same address (e.g. differing only in case)
    #[error("Duplicate recipient address {0}")]
    DuplicateAddress(String),

    /// Leaf window does not match the tree window
    #[error("Leaf for {address} has window {found}, tree window is {expected}")]
    WindowMismatch {
        address: String,
        expected: u64,
        found: u64,
    },

    /// Unknown token symbol
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    // === I/O ===
    /// Failed to read an input file
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Input file is not valid JSON for the expected shape
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CoreError {
    /// Validation errors are raised before any artifact is written
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Io { .. } | Self::Parse { .. })
    }
}
