//! # Auxo Compounding Core
//!
//! Data model shared by every stage of the compounding run:
//!
//! - [`Address`] / [`Amount`] - EVM addresses and 256 bit wei amounts
//! - [`MerkleTree`] / [`MerkleRecipient`] - the epoch's claim tree (read-only)
//! - [`Account`] - a recipient in an allocation
//! - [`RedistributionWeight`] - manual transfer overrides
//!
//! ```text
//!   merkle-tree-<TOKEN>.json
//!            │
//!            ▼
//!   ┌─────────────────┐   batched reads   ┌────────────────────┐
//!   │  RecipientMap   │ ────────────────► │ eligible recipients │
//!   └─────────────────┘                   └─────────┬──────────┘
//!                                                   ▼
//!                                   Vec<Account> ─► Safe batch tx
//! ```

pub mod account;
pub mod address;
pub mod amount;
pub mod error;
pub mod merkle;
pub mod token;

pub use account::*;
pub use address::*;
pub use amount::*;
pub use error::*;
pub use merkle::*;
pub use token::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::account::{Account, AccountState, RedistributionOption, RedistributionWeight};
    pub use crate::address::Address;
    pub use crate::amount::Amount;
    pub use crate::error::{CoreError, Result};
    pub use crate::merkle::{Claim, MerkleRecipient, MerkleTree, RecipientMap};
    pub use crate::token::{RewardToken, Token, TokenAmount};
}
