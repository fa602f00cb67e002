//! Compounding run configuration
//!
//! Read once from a TOML file with `AUXO__` environment overrides, for
//! example `AUXO__BLOCK_SNAPSHOT=17500000` or `AUXO__CHAIN__RPC_URL=...`.
//! Everything downstream receives the validated value by reference.

use crate::error::{CompoundError, Result};
use auxo_core::{Address, Amount, MerkleTree, RedistributionWeight, RewardToken};
use auxo_safe::{SafeTxMeta, TX_BUILDER_VERSION};
use auxo_storage::ArtifactStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "AUXO";

/// Complete configuration for one epoch's compounding
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompoundConfig {
    /// Epoch directory name, e.g. `2023-6`
    pub epoch: String,

    /// Compounding round within the epoch
    #[serde(default)]
    pub compound_round: u32,

    /// Reports root directory
    #[serde(default = "default_directory")]
    pub directory: String,

    /// Block every chain read is pinned to
    pub block_snapshot: u64,

    #[serde(default)]
    pub chain: ChainSettings,

    pub addresses: AddressBook,

    #[serde(default)]
    pub safe: SafeSettings,

    /// Pools to split, per token
    #[serde(default)]
    pub rewards: RewardPools,

    /// Manual transfers, per token
    #[serde(default)]
    pub redistributions: Redistributions,
}

fn default_directory() -> String {
    "reports".to_string()
}

/// Ethereum node settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainSettings {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Transport timeout for a batch request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_rpc_url() -> String {
    "http://localhost:8545".to_string()
}

fn default_chain_id() -> u64 {
    1
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            chain_id: default_chain_id(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Contract and operator addresses
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddressBook {
    /// Multisig that recipients delegate claims to
    pub operator: Address,
    pub arv_distributor: Address,
    pub prv_distributor: Address,
    /// Receives `increaseAmountsForMany` for ARV
    pub arv_locker: Address,
    /// Receives `depositFor` for PRV
    pub prv_rollstaker: Address,
}

/// Metadata block of generated Safe batches
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SafeSettings {
    #[serde(default = "default_batch_name")]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_tx_builder_version")]
    pub tx_builder_version: String,

    /// Safe the batch is meant for
    #[serde(default)]
    pub safe_address: Option<Address>,

    #[serde(default)]
    pub owner_address: Option<Address>,
}

fn default_batch_name() -> String {
    "Transactions Batch".to_string()
}

fn default_tx_builder_version() -> String {
    TX_BUILDER_VERSION.to_string()
}

impl Default for SafeSettings {
    fn default() -> Self {
        Self {
            name: default_batch_name(),
            description: String::new(),
            tx_builder_version: default_tx_builder_version(),
            safe_address: None,
            owner_address: None,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RewardPools {
    #[serde(default)]
    pub arv: Option<Amount>,
    #[serde(default)]
    pub prv: Option<Amount>,
}

impl RewardPools {
    pub fn get(&self, token: RewardToken) -> Option<Amount> {
        match token {
            RewardToken::ARV => self.arv,
            RewardToken::PRV => self.prv,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Redistributions {
    #[serde(default)]
    pub arv: Vec<RedistributionWeight>,
    #[serde(default)]
    pub prv: Vec<RedistributionWeight>,
}

impl CompoundConfig {
    /// Load from a file (format from its extension) plus environment
    pub fn load(path: &Path) -> Result<Self> {
        let source = config::File::from(path.to_path_buf());
        Self::from_sources(config::Config::builder().add_source(source))
    }

    /// Load from TOML text plus environment
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let source = config::File::from_str(content, config::FileFormat::Toml);
        Self::from_sources(config::Config::builder().add_source(source))
    }

    fn from_sources(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;
        let conf: CompoundConfig = settings.try_deserialize()?;
        conf.validate()?;
        Ok(conf)
    }

    /// Reject values that would fail later in the run
    pub fn validate(&self) -> Result<()> {
        if self.epoch.is_empty()
            || self.epoch.contains(['/', '\\'])
            || self.epoch.starts_with('.')
        {
            return Err(CompoundError::Config(format!(
                "epoch {:?} is not a directory name",
                self.epoch
            )));
        }
        if self.block_snapshot == 0 {
            return Err(CompoundError::Config("block_snapshot must be set".to_string()));
        }
        let url = &self.chain.rpc_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CompoundError::Config(format!(
                "rpc_url must be http(s): {}",
                url
            )));
        }
        if self.chain.timeout_secs == 0 {
            return Err(CompoundError::Config("timeout_secs must be positive".to_string()));
        }

        let book = &self.addresses;
        for (name, address) in [
            ("operator", book.operator),
            ("arv_distributor", book.arv_distributor),
            ("prv_distributor", book.prv_distributor),
            ("arv_locker", book.arv_locker),
            ("prv_rollstaker", book.prv_rollstaker),
        ] {
            if address.is_zero() {
                return Err(CompoundError::Config(format!(
                    "addresses.{} is the zero address",
                    name
                )));
            }
        }

        for token in RewardToken::ALL {
            for weight in self.redistributions_for(token) {
                if weight.amount.is_zero() {
                    return Err(CompoundError::Config(format!(
                        "{} transfer to {} has zero amount",
                        token, weight.address
                    )));
                }
            }
        }
        Ok(())
    }

    /// Merkle distributor that pays out a token
    pub fn distributor(&self, token: RewardToken) -> Address {
        match token {
            RewardToken::ARV => self.addresses.arv_distributor,
            RewardToken::PRV => self.addresses.prv_distributor,
        }
    }

    /// Contract the compounded rewards are deposited into
    pub fn reward_target(&self, token: RewardToken) -> Address {
        match token {
            RewardToken::ARV => self.addresses.arv_locker,
            RewardToken::PRV => self.addresses.prv_rollstaker,
        }
    }

    pub fn redistributions_for(&self, token: RewardToken) -> &[RedistributionWeight] {
        match token {
            RewardToken::ARV => &self.redistributions.arv,
            RewardToken::PRV => &self.redistributions.prv,
        }
    }

    /// Pool to split: an explicit amount wins over the configured one
    pub fn pool(&self, token: RewardToken, explicit: Option<Amount>) -> Result<Amount> {
        explicit
            .or_else(|| self.rewards.get(token))
            .ok_or(CompoundError::MissingPool(token))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.chain.timeout_secs)
    }

    pub fn store(&self) -> Result<ArtifactStore> {
        Ok(ArtifactStore::new(&self.directory, &self.epoch)?)
    }

    /// `<directory>/<epoch>/merkle-tree-<TOKEN>.json`
    pub fn tree_path(&self, token: RewardToken) -> PathBuf {
        Path::new(&self.directory)
            .join(&self.epoch)
            .join(MerkleTree::file_name(token))
    }

    pub fn safe_meta(&self) -> SafeTxMeta {
        SafeTxMeta {
            name: self.safe.name.clone(),
            description: self.safe.description.clone(),
            tx_builder_version: self.safe.tx_builder_version.clone(),
            created_from_safe_address: self
                .safe
                .safe_address
                .map(|a| a.to_string())
                .unwrap_or_default(),
            created_from_owner_address: self
                .safe
                .owner_address
                .map(|a| a.to_string())
                .unwrap_or_default(),
            checksum: String::new(),
        }
    }

    /// Note attached to every account of a compounding report
    pub fn run_note(&self, token: RewardToken) -> String {
        format!(
            "Compounding {} Rewards for epoch {}/{}",
            token, self.epoch, self.compound_round
        )
    }
}
