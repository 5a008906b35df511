use proptest::prelude::*;

use tamperchain::blockchain::{ChainFault, Ledger};
use tamperchain::crypto::{block_digest, Digest};

proptest! {
    /// Appending arbitrary payloads keeps the chain valid and indices dense.
    #[test]
    fn append_preserves_validity(payloads in prop::collection::vec(".*", 0..12)) {
        let mut ledger = Ledger::new();
        for (i, payload) in payloads.iter().enumerate() {
            let old_tail = ledger.tail().index();
            let block = ledger.append(payload, format!("ts-{}", i)).unwrap();
            prop_assert_eq!(block.index(), old_tail + 1);
            prop_assert!(ledger.is_valid());
        }
        prop_assert_eq!(ledger.len(), payloads.len() + 1);
    }

    /// Any content edit without a rehash is caught at the edited block.
    #[test]
    fn unhashed_edit_is_caught(len in 1usize..8, pick in any::<prop::sample::Index>(), edit in "[a-z]{1,8}") {
        let mut ledger = Ledger::new();
        for i in 0..len {
            ledger.append(&format!("block-{}", i), "t").unwrap();
        }
        let k = pick.index(ledger.len()) as u64;
        // Appended payloads start with "block-", so the edit always differs
        ledger.corrupt_block(k, &edit, false).unwrap();

        let report = ledger.validate();
        prop_assert_eq!(report.fault(), Some(&ChainFault::ContentMismatch { index: k }));
    }

    /// Same inputs hash the same; a changed index or timestamp changes the digest.
    #[test]
    fn digest_is_deterministic_and_sensitive(
        index in 0u64..u64::MAX,
        prev in prop::array::uniform32(0u8..),
        timestamp in ".*",
        data in ".*",
    ) {
        let prev = Digest::from_bytes(prev);
        let a = block_digest(index, &prev, &timestamp, &data);
        prop_assert_eq!(a, block_digest(index, &prev, &timestamp, &data));
        prop_assert_ne!(a, block_digest(index + 1, &prev, &timestamp, &data));
        prop_assert_ne!(a, block_digest(index, &prev, &format!("{}!", timestamp), &data));
    }
}
