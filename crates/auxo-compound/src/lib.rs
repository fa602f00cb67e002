//! # Auxo Compounding
//!
//! The two halves of a compounding round for ARV or PRV:
//!
//! 1. [`fetch_compounders`] - which recipients of the epoch's claim tree
//!    delegated to the operator and have not claimed. Writes the recipient
//!    list, the claim tuples and the `claimMultiDelegated` batch.
//! 2. [`distribute_compounded`] - split the compounded reward pool over
//!    those recipients, apply manual transfers and write the report and the
//!    deposit batch.
//!
//! Report helpers ([`validate_distribution`], [`totals`],
//! [`union_addresses`]) re-read written artifacts.

pub mod config;
pub mod error;
pub mod fetch;
pub mod report;
pub mod send;

pub use crate::config::CompoundConfig;
pub use error::{CompoundError, Result};
pub use fetch::{fetch_compounders, FetchOutcome};
pub use report::{
    split_filename, totals, union_addresses, validate_distribution, CompoundReport,
    DistributionCheck, RecipientTotals,
};
pub use send::{distribute_compounded, SendOutcome};
