//! # Auxo Reward Allocation
//!
//! Splits a reward pool of ARV or PRV pro-rata over the WETH each eligible
//! recipient compounded, then layers manual transfers on top.
//!
//! ## Rounding
//!
//! Shares are floored in wei. With `n` recipients the pool keeps strictly
//! less than `n` wei of dust; it is reported as `remainder` and a warning is
//! logged if the measured drift is ever larger.

pub mod allocator;
pub mod error;
pub mod redistribution;
pub mod summary;

pub use allocator::{Allocation, RewardAllocator, RewardPool};
pub use error::{RewardError, Result};
pub use redistribution::{apply_redistributions, Adjustment};
pub use summary::{Drift, RewardSummary};
