//! Pipeline error types

use auxo_chain::ChainError;
use auxo_core::{CoreError, RewardToken};
use auxo_rewards::RewardError;
use auxo_safe::SafeError;
use auxo_storage::StorageError;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, CompoundError>;

#[derive(Error, Debug)]
pub enum CompoundError {
    /// Configuration value rejected by validation
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration sources could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] ::config::ConfigError),

    /// No pool amount given on the command line or in configuration
    #[error("No {0} reward pool configured")]
    MissingPool(RewardToken),

    /// Artifact file name does not follow `<name>-<TOKEN>-<N>.json`
    #[error("Unrecognised artifact file name: {0}")]
    InvalidFilename(String),

    /// Input file belongs to a different token than requested
    #[error("{file} holds {found} recipients, expected {expected}")]
    TokenMismatch {
        file: String,
        expected: RewardToken,
        found: RewardToken,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Reward(#[from] RewardError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Safe(#[from] SafeError),
}

impl CompoundError {
    /// Network failure that may not recur on a later run
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Chain(e) if e.is_transient())
    }

    /// Bad input, raised before anything is written
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Config(_)
            | Self::ConfigLoad(_)
            | Self::MissingPool(_)
            | Self::InvalidFilename(_)
            | Self::TokenMismatch { .. }
            | Self::Reward(_)
            | Self::Safe(_) => true,
            Self::Core(e) => e.is_validation(),
            Self::Chain(_) | Self::Storage(_) => false,
        }
    }
}
