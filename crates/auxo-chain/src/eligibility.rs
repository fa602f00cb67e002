//! Delegated-but-unclaimed selection

use crate::batcher::{ClaimStatus, StatusMap};
use auxo_core::RecipientMap;

/// Recipients that delegated to the operator and have not claimed yet.
///
/// An address missing from either map is ineligible. Leaves are cloned
/// unchanged and keep the input order.
pub fn filter_eligible(
    delegated: &StatusMap,
    claimed: &StatusMap,
    recipients: &RecipientMap,
) -> RecipientMap {
    recipients
        .iter()
        .filter(|(address, _)| {
            delegated.get(*address).copied() == Some(true)
                && claimed.get(*address).copied() == Some(false)
        })
        .map(|(address, leaf)| (*address, leaf.clone()))
        .collect()
}

/// [`filter_eligible`] over a [`ClaimStatus`] read
pub fn eligible_from_status(status: &ClaimStatus, recipients: &RecipientMap) -> RecipientMap {
    let eligible = filter_eligible(&status.delegated, &status.claimed, recipients);
    tracing::info!(
        "Block {}: {} recipients, {} delegated, {} claimed, {} eligible",
        status.block,
        recipients.len(),
        status.delegated_count(),
        status.claimed_count(),
        eligible.len()
    );
    eligible
}

#[cfg(test)]
mod tests {
    use super::*;
    use auxo_core::{Address, Amount, MerkleRecipient};
    use proptest::prelude::*;

    fn addr(i: u8) -> Address {
        Address::from_bytes([i; 20])
    }

    fn leaf(i: u64) -> MerkleRecipient {
        MerkleRecipient {
            window_index: 1,
            account_index: i,
            rewards: Amount::from(100 + i),
            token: Address::from_bytes([0xee; 20]),
            proof: vec![format!("0x{:064x}", i)],
        }
    }

    #[test]
    fn test_delegated_unclaimed_scenario() {
        // 1..=3 eligible, 4..=5 claimed, 6..=7 not delegated
        let recipients: RecipientMap = (1..=7u8).map(|i| (addr(i), leaf(i as u64))).collect();
        let mut delegated = StatusMap::new();
        let mut claimed = StatusMap::new();
        for i in 1..=7u8 {
            delegated.insert(addr(i), i <= 5);
            claimed.insert(addr(i), (4..=5).contains(&i));
        }

        let eligible = filter_eligible(&delegated, &claimed, &recipients);
        assert_eq!(eligible.len(), 3);
        let keys: Vec<_> = eligible.keys().copied().collect();
        assert_eq!(keys, vec![addr(1), addr(2), addr(3)]);
        assert_eq!(eligible[&addr(2)], recipients[&addr(2)]);
    }

    #[test]
    fn test_missing_status_is_ineligible() {
        let recipients: RecipientMap = (1..=2u8).map(|i| (addr(i), leaf(i as u64))).collect();
        let mut delegated = StatusMap::new();
        delegated.insert(addr(1), true);
        delegated.insert(addr(2), true);
        let mut claimed = StatusMap::new();
        claimed.insert(addr(1), false);

        let eligible = filter_eligible(&delegated, &claimed, &recipients);
        assert_eq!(eligible.len(), 1);
        assert!(eligible.contains_key(&addr(1)));
    }

    proptest! {
        #[test]
        fn prop_address_in_one_map_is_excluded(
            flags in proptest::collection::vec((any::<bool>(), any::<bool>(), 0u8..3), 1..20)
        ) {
            let mut recipients = RecipientMap::new();
            let mut delegated = StatusMap::new();
            let mut claimed = StatusMap::new();
            for (i, (d, c, presence)) in flags.iter().enumerate() {
                let a = addr(i as u8 + 1);
                recipients.insert(a, leaf(i as u64));
                // 0: only delegated known, 1: only claimed known, 2: both
                if *presence != 1 {
                    delegated.insert(a, *d);
                }
                if *presence != 0 {
                    claimed.insert(a, *c);
                }
            }

            let eligible = filter_eligible(&delegated, &claimed, &recipients);
            for (i, (d, c, presence)) in flags.iter().enumerate() {
                let expected = *presence == 2 && *d && !*c;
                prop_assert_eq!(eligible.contains_key(&addr(i as u8 + 1)), expected);
            }
        }
    }
}
