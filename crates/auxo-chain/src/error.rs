//! Error types for chain reads

use thiserror::Error;

/// Result type alias for chain operations
pub type Result<T> = std::result::Result<T, ChainError>;

/// Errors from batched contract reads.
///
/// None of these are ever turned into a `false` status: a batch either
/// answers every query or fails as a whole.
#[derive(Error, Debug)]
pub enum ChainError {
    /// HTTP transport failed (connect, timeout, non-2xx)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Node returned a JSON-RPC error object
    #[error("RPC error for request {id:?}: {message} (code {code})")]
    Rpc {
        id: Option<u64>,
        code: i64,
        message: String,
    },

    /// Node answered with something that is not a valid batch response
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid endpoint configuration
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ChainError {
    /// Network-class failures that a later run may not hit
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Rpc { .. })
    }
}

impl From<reqwest::Error> for ChainError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(ChainError::Transport("timeout".into()).is_transient());
        assert!(ChainError::Rpc {
            id: Some(1),
            code: -32000,
            message: "header not found".into()
        }
        .is_transient());
        assert!(!ChainError::MalformedResponse("bool word".into()).is_transient());
    }
}
