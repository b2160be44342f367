//! Randomized checks of the tree against an ordered map model.

use cow_btree::{BTree, MemoryStore, TreeConfig};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

const PAGE: usize = 512;

fn config() -> TreeConfig {
    TreeConfig::new(PAGE, 32, 96)
}

fn entry_strategy() -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    (
        prop::collection::vec(any::<u8>(), 1..=32),
        prop::collection::vec(any::<u8>(), 0..=96),
    )
}

fn build(entries: &[(Vec<u8>, Vec<u8>)]) -> (Arc<MemoryStore>, BTree<Arc<MemoryStore>>) {
    let store = Arc::new(MemoryStore::new(PAGE));
    let mut tree = BTree::new(Arc::clone(&store), config()).expect("open tree");
    for (key, value) in entries {
        tree.insert(key, value).expect("insert");
    }
    (store, tree)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn tree_matches_btreemap(entries in prop::collection::vec(entry_strategy(), 1..400)) {
        let (store, tree) = build(&entries);
        let model: BTreeMap<Vec<u8>, Vec<u8>> = entries.iter().cloned().collect();

        for (key, value) in &model {
            prop_assert_eq!(tree.get(key).expect("get"), Some(value.clone()));
        }
        let scanned = tree.scan(None, None).expect("scan");
        let expected: Vec<_> = model.into_iter().collect();
        prop_assert_eq!(scanned, expected);

        let shape = tree.verify().expect("verify");
        prop_assert_eq!(shape.pages, store.stats().live_pages);
        prop_assert!(store.stats().max_alloc_size <= PAGE);
    }

    #[test]
    fn range_scan_matches_btreemap(
        entries in prop::collection::vec(entry_strategy(), 1..200),
        start in prop::collection::vec(any::<u8>(), 0..4),
        end in prop::collection::vec(any::<u8>(), 0..4),
    ) {
        let (_store, tree) = build(&entries);
        let model: BTreeMap<Vec<u8>, Vec<u8>> = entries.iter().cloned().collect();

        let scanned = tree.scan(Some(start.as_slice()), Some(end.as_slice())).expect("scan");
        let expected: Vec<_> = model
            .iter()
            .filter(|(key, _)| key.as_slice() >= start.as_slice() && key.as_slice() < end.as_slice())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        prop_assert_eq!(scanned, expected);
    }

    #[test]
    fn reinserting_present_entries_changes_nothing(
        entries in prop::collection::vec(entry_strategy(), 1..200),
    ) {
        let (_store, mut tree) = build(&entries);
        let before = tree.scan(None, None).expect("scan");

        for (key, value) in &before {
            tree.insert(key, value).expect("insert");
        }
        prop_assert_eq!(tree.scan(None, None).expect("scan"), before);
        tree.verify().expect("verify");
    }

    #[test]
    fn absent_keys_are_not_found(
        entries in prop::collection::vec(entry_strategy(), 1..200),
        probe in prop::collection::vec(any::<u8>(), 1..=32),
    ) {
        let (_store, tree) = build(&entries);
        let model: BTreeMap<Vec<u8>, Vec<u8>> = entries.iter().cloned().collect();
        prop_assert_eq!(tree.get(&probe).expect("get"), model.get(&probe).cloned());
    }
}
