//! Merkle claim trees
//!
//! A tree is produced once per epoch by the external tree generator and is
//! read-only here. Only the per-address leaves matter for compounding; the
//! aggregate reward block is carried through untouched.

use crate::address::Address;
use crate::amount::Amount;
use crate::error::{CoreError, Result};
use crate::token::RewardToken;
use indexmap::IndexMap;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Hex encoded 32 byte hash
pub type Bytes32 = String;

/// One leaf of the claim tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleRecipient {
    /// Distribution window this leaf belongs to
    pub window_index: u64,

    /// Position of the leaf within the window, unique per window
    pub account_index: u64,

    /// WETH the recipient earned and may claim (its compounding contribution)
    pub rewards: Amount,

    /// Token paid out by the distributor for this leaf
    pub token: Address,

    /// Ordered proof from leaf to root
    pub proof: Vec<Bytes32>,
}

/// Leaves keyed by recipient, in tree order
pub type RecipientMap = IndexMap<Address, MerkleRecipient>;

struct RecipientsVisitor;

impl<'de> Visitor<'de> for RecipientsVisitor {
    type Value = RecipientMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of recipient address to leaf")
    }

    fn visit_map<A: MapAccess<'de>>(
        self,
        mut map: A,
    ) -> std::result::Result<RecipientMap, A::Error> {
        let mut recipients = RecipientMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((address, leaf)) = map.next_entry::<Address, MerkleRecipient>()? {
            if recipients.insert(address, leaf).is_some() {
                return Err(de::Error::custom(CoreError::DuplicateAddress(
                    address.to_string(),
                )));
            }
        }
        Ok(recipients)
    }
}

/// Addresses are case-insensitive, so `0xabc..` and `0xABC..` keys collide.
/// A collision is rejected rather than letting the later leaf replace the
/// earlier one.
fn deserialize_recipients<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<RecipientMap, D::Error> {
    deserializer.deserialize_map(RecipientsVisitor)
}

/// Snapshot of a claim window
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleTree {
    pub window_index: u64,
    pub chain_id: u64,
    /// Reward summary the tree was generated from, kept verbatim
    pub aggregate_rewards: serde_json::Value,
    #[serde(deserialize_with = "deserialize_recipients")]
    pub recipients: RecipientMap,
    pub root: Bytes32,
}

impl MerkleTree {
    /// File name the tree generator uses for a token
    pub fn file_name(token: RewardToken) -> String {
        format!("merkle-tree-{}.json", token)
    }

    /// Read and validate a tree file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tree: MerkleTree =
            serde_json::from_str(&content).map_err(|source| CoreError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        tree.validate()?;

        tracing::debug!(
            "Loaded merkle tree window {} with {} recipients from {}",
            tree.window_index,
            tree.recipients.len(),
            path.display()
        );
        Ok(tree)
    }

    /// Every leaf must sit in the tree's window with a unique account index
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.recipients.len());
        for (address, leaf) in &self.recipients {
            if leaf.window_index != self.window_index {
                return Err(CoreError::WindowMismatch {
                    address: address.to_string(),
                    expected: self.window_index,
                    found: leaf.window_index,
                });
            }
            if !seen.insert(leaf.account_index) {
                return Err(CoreError::DuplicateAccountIndex {
                    window_index: self.window_index,
                    account_index: leaf.account_index,
                });
            }
        }
        Ok(())
    }

    /// Sum of all leaf amounts
    pub fn total_rewards(&self) -> Result<Amount> {
        total_contribution(&self.recipients)
    }
}

/// Sum of the WETH contributions in a recipient map
pub fn total_contribution(recipients: &RecipientMap) -> Result<Amount> {
    Amount::sum(recipients.values().map(|r| r.rewards))
}

/// Argument layout of `IMerkleDistributor.Claim`:
/// `(windowIndex, accountIndex, amount, token, merkleProof, account)`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim(
    pub u64,
    pub u64,
    pub Amount,
    pub Address,
    pub Vec<Bytes32>,
    pub Address,
);

impl Claim {
    pub fn from_leaf(account: Address, leaf: &MerkleRecipient) -> Self {
        Self(
            leaf.window_index,
            leaf.account_index,
            leaf.rewards,
            leaf.token,
            leaf.proof.clone(),
            account,
        )
    }
}

/// Claim tuples for every recipient, in map order
pub fn to_claims(recipients: &RecipientMap) -> Vec<Claim> {
    recipients
        .iter()
        .map(|(address, leaf)| Claim::from_leaf(*address, leaf))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn leaf(account_index: u64, rewards: u64) -> MerkleRecipient {
        MerkleRecipient {
            window_index: 2,
            account_index,
            rewards: Amount::from(rewards),
            token: Address::from_bytes([0xee; 20]),
            proof: vec![format!("0x{}", "ab".repeat(32))],
        }
    }

    fn tree() -> MerkleTree {
        let mut recipients = RecipientMap::new();
        recipients.insert(Address::from_bytes([1; 20]), leaf(0, 10));
        recipients.insert(Address::from_bytes([2; 20]), leaf(1, 20));
        MerkleTree {
            window_index: 2,
            chain_id: 1,
            aggregate_rewards: serde_json::json!({"amount": "30"}),
            recipients,
            root: format!("0x{}", "00".repeat(32)),
        }
    }

    #[test]
    fn test_leaf_json_shape() {
        let json = r#"{
            "windowIndex": 2,
            "accountIndex": 5,
            "rewards": "1000",
            "token": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
            "proof": ["0x01", "0x02"]
        }"#;
        let leaf: MerkleRecipient = serde_json::from_str(json).unwrap();
        assert_eq!(leaf.account_index, 5);
        assert_eq!(leaf.rewards, Amount::from(1000u64));
        assert_eq!(leaf.proof.len(), 2);
    }

    #[test]
    fn test_negative_leaf_amount_rejected() {
        let json = r#"{
            "windowIndex": 2, "accountIndex": 5, "rewards": "-1",
            "token": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", "proof": []
        }"#;
        assert!(serde_json::from_str::<MerkleRecipient>(json).is_err());
    }

    #[test]
    fn test_validate_duplicate_index() {
        let mut t = tree();
        t.recipients
            .insert(Address::from_bytes([3; 20]), leaf(1, 5));
        assert!(matches!(
            t.validate(),
            Err(CoreError::DuplicateAccountIndex { account_index: 1, .. })
        ));
    }

    #[test]
    fn test_validate_window_mismatch() {
        let mut t = tree();
        let mut bad = leaf(9, 1);
        bad.window_index = 3;
        t.recipients.insert(Address::from_bytes([4; 20]), bad);
        assert!(matches!(t.validate(), Err(CoreError::WindowMismatch { .. })));
    }

    #[test]
    fn test_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MerkleTree::file_name(RewardToken::ARV));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(serde_json::to_string(&tree()).unwrap().as_bytes())
            .unwrap();

        let loaded = MerkleTree::load(&path).unwrap();
        let keys: Vec<_> = loaded.recipients.keys().copied().collect();
        assert_eq!(
            keys,
            vec![Address::from_bytes([1; 20]), Address::from_bytes([2; 20])]
        );
        assert_eq!(loaded.total_rewards().unwrap(), Amount::from(30u64));
    }

    #[test]
    fn test_keys_differing_in_case_rejected() {
        let leaf_json = |index: u64, rewards: u64| {
            serde_json::json!({
                "windowIndex": 2,
                "accountIndex": index,
                "rewards": rewards.to_string(),
                "token": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
                "proof": [],
            })
        };
        let json = serde_json::json!({
            "windowIndex": 2,
            "chainId": 1,
            "aggregateRewards": {},
            "recipients": {
                "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed": leaf_json(0, 100),
                "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed": leaf_json(1, 200),
            },
            "root": "0x00",
        });

        let err = serde_json::from_value::<MerkleTree>(json.clone()).unwrap_err();
        assert!(err.to_string().contains("Duplicate recipient address"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MerkleTree::file_name(RewardToken::PRV));
        std::fs::write(&path, serde_json::to_string(&json).unwrap()).unwrap();
        assert!(matches!(MerkleTree::load(&path), Err(CoreError::Parse { .. })));
    }

    #[test]
    fn test_claim_tuple_layout() {
        let t = tree();
        let claims = to_claims(&t.recipients);
        let json = serde_json::to_value(&claims[1]).unwrap();
        let arr = json.as_array().unwrap();
        assert_eq!(arr.len(), 6);
        assert_eq!(arr[0], 2);
        assert_eq!(arr[1], 1);
        assert_eq!(arr[2], "20");
        assert_eq!(arr[5], Address::from_bytes([2; 20]).to_string());
    }
}
