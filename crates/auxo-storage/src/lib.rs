//! # Auxo Artifact Storage
//!
//! JSON artifacts of a compounding run, scoped by epoch.
//!
//! ## Layout
//!
//! - `<root>/<epoch>/merkle-tree-<TOKEN>.json` - input trees
//! - `<root>/<epoch>/compounding/` - every artifact written by a run

pub mod error;
pub mod store;

pub use error::{Result, StorageError};
pub use store::{read_json, to_pretty_json, ArtifactStore, COMPOUNDING_DIR};
