//! End-to-end fetch and send runs against an in-memory chain

use async_trait::async_trait;
use auxo_chain::abi::{self, IS_CLAIMED, IS_REWARDS_DELEGATE};
use auxo_chain::{BatchCaller, ChainError, EthCall};
use auxo_core::{Address, Amount, MerkleRecipient, MerkleTree, RecipientMap, RewardToken};
use auxo_compound::{
    distribute_compounded, fetch_compounders, totals, union_addresses, validate_distribution,
    CompoundConfig, CompoundError, CompoundReport,
};
use auxo_safe::SafeTx;
use std::collections::HashSet;
use std::path::Path;
use tempfile::TempDir;

const EPOCH: &str = "2023-6";
const OPERATOR: [u8; 20] = [0x0b; 20];

fn user(i: u8) -> Address {
    Address::from_bytes([i; 20])
}

/// Distributor state: who delegated to whom, which leaves were claimed
struct FakeDistributor {
    delegated: HashSet<Address>,
    claimed: HashSet<u64>,
}

impl FakeDistributor {
    /// Users 1..=3 delegated and unclaimed, 4..=5 delegated and claimed,
    /// 6..=7 never delegated
    fn scenario() -> Self {
        Self {
            delegated: (1..=5).map(user).collect(),
            claimed: [3u64, 4].into_iter().collect(),
        }
    }

    /// Same delegations, but every leaf has since been claimed
    fn all_claimed() -> Self {
        Self {
            delegated: (1..=5).map(user).collect(),
            claimed: (0..7u64).collect(),
        }
    }

    fn answer(&self, call: &EthCall) -> Vec<u8> {
        let mut word = vec![0u8; 32];
        let selector = &call.data[..4];
        let value = if selector == abi::selector(IS_REWARDS_DELEGATE) {
            let mut who = [0u8; 20];
            who.copy_from_slice(&call.data[16..36]);
            let mut delegate = [0u8; 20];
            delegate.copy_from_slice(&call.data[48..68]);
            delegate == OPERATOR && self.delegated.contains(&Address::from_bytes(who))
        } else if selector == abi::selector(IS_CLAIMED) {
            let mut index = [0u8; 8];
            index.copy_from_slice(&call.data[60..68]);
            self.claimed.contains(&u64::from_be_bytes(index))
        } else {
            panic!("unexpected call");
        };
        word[31] = value as u8;
        word
    }
}

#[async_trait]
impl BatchCaller for FakeDistributor {
    async fn call_batch(&self, calls: &[EthCall], _block: u64) -> auxo_chain::Result<Vec<Vec<u8>>> {
        Ok(calls.iter().map(|c| self.answer(c)).collect())
    }
}

struct DownNode;

#[async_trait]
impl BatchCaller for DownNode {
    async fn call_batch(
        &self,
        _calls: &[EthCall],
        _block: u64,
    ) -> auxo_chain::Result<Vec<Vec<u8>>> {
        Err(ChainError::Transport("connection refused".to_string()))
    }
}

fn write_tree(root: &Path, token: RewardToken) {
    let recipients: RecipientMap = (1..=7u8)
        .map(|i| {
            (
                user(i),
                MerkleRecipient {
                    window_index: 5,
                    account_index: (i - 1) as u64,
                    rewards: Amount::from(1_000_000_000_000_000u64 * i as u64),
                    token: Address::from_bytes([0xee; 20]),
                    proof: vec![format!("0x{:064x}", i)],
                },
            )
        })
        .collect();
    let tree = MerkleTree {
        window_index: 5,
        chain_id: 1,
        aggregate_rewards: serde_json::json!({"amount": "28000000000000000"}),
        recipients,
        root: format!("0x{}", "11".repeat(32)),
    };
    let dir = root.join(EPOCH);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join(MerkleTree::file_name(token)),
        serde_json::to_string_pretty(&tree).unwrap(),
    )
    .unwrap();
}

fn config(root: &Path, extra: &str) -> CompoundConfig {
    let toml = format!(
        r#"
epoch = "{epoch}"
compound_round = 1
directory = "{dir}"
block_snapshot = 17500000

[addresses]
operator = "{operator}"
arv_distributor = "{arv_d}"
prv_distributor = "{prv_d}"
arv_locker = "{locker}"
prv_rollstaker = "{staker}"

{extra}
"#,
        epoch = EPOCH,
        dir = root.display(),
        operator = Address::from_bytes(OPERATOR),
        arv_d = Address::from_bytes([0xd1; 20]),
        prv_d = Address::from_bytes([0xd2; 20]),
        locker = Address::from_bytes([0x1c; 20]),
        staker = Address::from_bytes([0x5c; 20]),
        extra = extra,
    );
    CompoundConfig::from_toml_str(&toml).unwrap()
}

fn setup(token: RewardToken, extra: &str) -> (TempDir, CompoundConfig) {
    let dir = TempDir::new().unwrap();
    write_tree(dir.path(), token);
    let conf = config(dir.path(), extra);
    (dir, conf)
}

#[tokio::test]
async fn test_fetch_selects_delegated_unclaimed() {
    let (_dir, conf) = setup(RewardToken::ARV, "");
    let outcome = fetch_compounders(&conf, RewardToken::ARV, FakeDistributor::scenario())
        .await
        .unwrap();

    assert_eq!(outcome.tree_recipients, 7);
    assert_eq!(outcome.delegated, 5);
    assert_eq!(outcome.claimed, 2);
    assert_eq!(outcome.eligible, 3);
    assert_eq!(outcome.recipients_file, "recipients-ARV-0.json");
    assert_eq!(outcome.tuples_file, "recipients-tuple-ARV-0.json");
    assert_eq!(outcome.claim_tx_file.as_deref(), Some("safe-claim-ARV-1.json"));

    let store = conf.store().unwrap();
    let eligible: RecipientMap = store.read(&outcome.recipients_file).unwrap();
    let keys: Vec<_> = eligible.keys().copied().collect();
    assert_eq!(keys, vec![user(1), user(2), user(3)]);

    let claim_tx: SafeTx = store.read("safe-claim-ARV-1.json").unwrap();
    assert_eq!(claim_tx.transactions.len(), 1);
    assert_eq!(claim_tx.transactions[0].to, Address::from_bytes([0xd1; 20]));
    assert_eq!(claim_tx.transactions[0].contract_method.name, "claimMultiDelegated");
}

#[tokio::test]
async fn test_refetch_versions_recipients_and_replaces_claim_tx() {
    let (_dir, conf) = setup(RewardToken::PRV, "");
    let first = fetch_compounders(&conf, RewardToken::PRV, FakeDistributor::scenario())
        .await
        .unwrap();
    let second = fetch_compounders(&conf, RewardToken::PRV, FakeDistributor::scenario())
        .await
        .unwrap();

    assert_eq!(first.recipients_file, "recipients-PRV-0.json");
    assert_eq!(second.recipients_file, "recipients-PRV-1.json");
    assert_eq!(first.claim_tx_file, second.claim_tx_file);

    let store = conf.store().unwrap();
    let a = std::fs::read(store.path_of(&first.recipients_file)).unwrap();
    let b = std::fs::read(store.path_of(&second.recipients_file)).unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_refetch_without_eligible_removes_claim_tx() {
    let (_dir, conf) = setup(RewardToken::ARV, "");
    let first = fetch_compounders(&conf, RewardToken::ARV, FakeDistributor::scenario())
        .await
        .unwrap();
    let store = conf.store().unwrap();
    assert!(store.exists("safe-claim-ARV-1.json"));

    let second = fetch_compounders(&conf, RewardToken::ARV, FakeDistributor::all_claimed())
        .await
        .unwrap();
    assert_eq!(second.eligible, 0);
    assert_eq!(second.claim_tx_file, None);
    assert!(!store.exists("safe-claim-ARV-1.json"));

    // earlier recipients stay for comparison, the new one is empty
    let earlier: RecipientMap = store.read(&first.recipients_file).unwrap();
    let latest: RecipientMap = store.read(&second.recipients_file).unwrap();
    assert_eq!(earlier.len(), 3);
    assert!(latest.is_empty());
}

#[tokio::test]
async fn test_failed_read_writes_nothing() {
    let (_dir, conf) = setup(RewardToken::ARV, "");
    let err = fetch_compounders(&conf, RewardToken::ARV, DownNode)
        .await
        .unwrap_err();
    assert!(err.is_transient());

    let scope = conf.store().unwrap().scope_dir();
    assert!(!scope.exists() || std::fs::read_dir(&scope).unwrap().next().is_none());
}

#[tokio::test]
async fn test_send_arv_single_batch_call() {
    let (_dir, conf) = setup(RewardToken::ARV, "");
    let fetched = fetch_compounders(&conf, RewardToken::ARV, FakeDistributor::scenario())
        .await
        .unwrap();

    // contributions 1:2:3
    let pool = Amount::from(600u64);
    let sent =
        distribute_compounded(&conf, RewardToken::ARV, pool, &fetched.recipients_file).unwrap();
    assert_eq!(sent.compound_file, "compound-ARV-0.json");
    assert_eq!(sent.safe_tx_file, "safe-tx-ARV-0.json");
    assert_eq!(sent.summary.amount, pool);
    assert!(sent.summary.remainder.is_zero());

    let store = conf.store().unwrap();
    let report: CompoundReport = store.read(&sent.compound_file).unwrap();
    let rewards: Vec<_> = report.recipients.iter().map(|a| a.reward.amount).collect();
    assert_eq!(
        rewards,
        vec![Amount::from(100u64), Amount::from(200u64), Amount::from(300u64)]
    );
    assert_eq!(
        report.recipients[0].notes[0],
        "Compounding ARV Rewards for epoch 2023-6/1"
    );

    let tx: SafeTx = store.read(&sent.safe_tx_file).unwrap();
    assert_eq!(tx.transactions.len(), 1);
    assert_eq!(tx.transactions[0].to, Address::from_bytes([0x1c; 20]));
    let receivers: Vec<Address> = serde_json::from_str(
        tx.transactions[0].contract_inputs_values["_receivers"]
            .as_str()
            .unwrap(),
    )
    .unwrap();
    assert_eq!(receivers, vec![user(1), user(2), user(3)]);

    let check = validate_distribution(&store, &sent.compound_file).unwrap();
    assert!(check.is_ok());
    assert_eq!(check.summed, check.total);

    let t = totals(&store, &fetched.recipients_file).unwrap();
    assert_eq!(t.compounders, 3);
    assert_eq!(t.total, Amount::from(6_000_000_000_000_000u64));
}

#[tokio::test]
async fn test_send_prv_with_transfer() {
    let extra = format!(
        r#"
[[redistributions.prv]]
address = "{}"
amount = "42"
"#,
        user(9)
    );
    let (_dir, conf) = setup(RewardToken::PRV, &extra);
    let fetched = fetch_compounders(&conf, RewardToken::PRV, FakeDistributor::scenario())
        .await
        .unwrap();

    let sent = distribute_compounded(
        &conf,
        RewardToken::PRV,
        Amount::from(1000u64),
        &fetched.recipients_file,
    )
    .unwrap();

    // 1000 * 1/6, 2/6, 3/6 floored, plus the transfer on top
    assert_eq!(sent.summary.to_stakers, Amount::from(999u64));
    assert_eq!(sent.summary.remainder, Amount::from(1u64));
    assert_eq!(sent.summary.transferred, Amount::from(42u64));
    assert_eq!(sent.summary.amount, Amount::from(1041u64));
    assert!(sent.drift.within_tolerance());

    let store = conf.store().unwrap();
    let tx: SafeTx = store.read(&sent.safe_tx_file).unwrap();
    assert_eq!(tx.transactions.len(), 4);
    assert!(tx
        .transactions
        .iter()
        .all(|t| t.contract_method.name == "depositFor"));
    assert_eq!(tx.transactions[3].contract_inputs_values["_amount"], "42");

    let report: CompoundReport = store.read(&sent.compound_file).unwrap();
    assert_eq!(report.pre_redistribution.len(), 3);
    assert_eq!(report.recipients.len(), 4);
}

#[tokio::test]
async fn test_send_rejects_other_token_file() {
    let (_dir, conf) = setup(RewardToken::ARV, "");
    let fetched = fetch_compounders(&conf, RewardToken::ARV, FakeDistributor::scenario())
        .await
        .unwrap();
    let err = distribute_compounded(
        &conf,
        RewardToken::PRV,
        Amount::from(1u64),
        &fetched.recipients_file,
    )
    .unwrap_err();
    assert!(matches!(err, CompoundError::TokenMismatch { .. }));
    assert!(!conf.store().unwrap().exists("compound-PRV-0.json"));
}

#[tokio::test]
async fn test_union_across_tokens() {
    let dir = TempDir::new().unwrap();
    write_tree(dir.path(), RewardToken::ARV);
    write_tree(dir.path(), RewardToken::PRV);
    let conf = config(dir.path(), "");

    let arv = fetch_compounders(&conf, RewardToken::ARV, FakeDistributor::scenario())
        .await
        .unwrap();
    let prv = fetch_compounders(&conf, RewardToken::PRV, FakeDistributor::scenario())
        .await
        .unwrap();

    let files = [arv.recipients_file, prv.recipients_file];
    let all = union_addresses(&conf.store().unwrap(), &files).unwrap();
    assert_eq!(all, vec![user(1), user(2), user(3)]);
}
