#![allow(missing_docs)]

use alloy_primitives::{b256, B256};
use sable_trie::{
    AccountTrieCursor, BranchNode, Collector, InMemoryTrieStore, NodeError, PrefixSet,
    PrefixSetMut, TrieError,
};

const HA: B256 = b256!("00000000000000000000000000000000000000000000000000000000000000aa");
const HB: B256 = b256!("00000000000000000000000000000000000000000000000000000000000000bb");
const HC: B256 = b256!("00000000000000000000000000000000000000000000000000000000000000cc");

fn insert_node(store: &mut InMemoryTrieStore, key: &[u8], node: &BranchNode) {
    store.insert(key.to_vec(), node.encode());
}

/// Two sibling subtrees, each carrying one cached child hash.
fn sibling_store() -> InMemoryTrieStore {
    let mut store = InMemoryTrieStore::default();
    insert_node(&mut store, &[0x0a], &BranchNode::new(0b100, 0, 0b100, vec![HA], None));
    insert_node(&mut store, &[0x0b], &BranchNode::new(0b010, 0, 0b010, vec![HB], None));
    store
}

#[test]
fn clean_subtrees_are_emitted_in_order() {
    let mut store = sibling_store();
    let mut collector = Collector::default();
    let mut cursor = AccountTrieCursor::new(
        store.cursor(),
        PrefixSet::default(),
        &[],
        Some(&mut collector),
    );

    assert!(cursor.seek(&[]).unwrap());
    assert_eq!(cursor.key(), Some(&[0x0a, 0x02][..]));
    assert_eq!(cursor.hash(), Some(HA));
    assert!(cursor.skip_state());

    cursor.move_next().unwrap();
    assert_eq!(cursor.key(), Some(&[0x0b, 0x01][..]));
    assert_eq!(cursor.hash(), Some(HB));
    assert!(cursor.skip_state());

    assert!(!cursor.move_next().unwrap());
    assert_eq!(cursor.key(), None);

    drop(cursor);
    assert!(collector.is_empty());
}

#[test]
fn changed_subtree_is_queued_for_deletion() {
    let mut store = sibling_store();
    let mut changed = PrefixSetMut::default();
    // the only child of the first subtree has changed
    changed.insert([0x0a, 0x02]);

    let mut collector = Collector::default();
    let mut cursor =
        AccountTrieCursor::new(store.cursor(), changed.freeze(), &[], Some(&mut collector));

    // the stale subtree is deleted and the scan lands on its clean sibling
    assert!(!cursor.seek(&[]).unwrap());
    assert_eq!(cursor.key(), Some(&[0x0b, 0x01][..]));
    assert_eq!(cursor.hash(), Some(HB));
    // the region up to the emission had state-only children to re-walk
    assert!(!cursor.skip_state());

    drop(cursor);
    assert_eq!(collector.into_entries(), vec![(vec![0x0a], Vec::new())]);
}

#[test]
fn deletion_sequence_is_deterministic() {
    let run = || {
        let mut store = sibling_store();
        let mut changed = PrefixSetMut::default();
        changed.insert([0x0a, 0x02]);
        let mut collector = Collector::default();
        let mut cursor =
            AccountTrieCursor::new(store.cursor(), changed.freeze(), &[], Some(&mut collector));

        let mut emitted = Vec::new();
        cursor.seek(&[]).unwrap();
        while let Some(key) = cursor.key() {
            emitted.push((key.to_vec(), cursor.hash()));
            cursor.move_next().unwrap();
        }
        drop(cursor);
        (emitted, collector.into_entries())
    };

    assert_eq!(run(), run());
    let (emitted, deleted) = run();
    assert_eq!(emitted, vec![(vec![0x0b, 0x01], Some(HB))]);
    assert_eq!(deleted, vec![(vec![0x0a], Vec::new())]);
}

#[test]
fn descends_into_stored_subtrees() {
    let mut store = InMemoryTrieStore::default();
    // parent advertises a stored subtree at child 5 but carries no hash
    insert_node(&mut store, &[0x1], &BranchNode::new(0b10_0000, 0b10_0000, 0, vec![], None));
    insert_node(&mut store, &[0x1, 0x5], &BranchNode::new(0b1000, 0, 0b1000, vec![HC], None));

    let mut collector = Collector::default();
    let mut cursor = AccountTrieCursor::new(
        store.cursor(),
        PrefixSet::default(),
        &[],
        Some(&mut collector),
    );

    assert!(!cursor.seek(&[]).unwrap());
    assert_eq!(cursor.key(), Some(&[0x1, 0x5, 0x3][..]));
    assert_eq!(cursor.hash(), Some(HC));
    assert!(cursor.skip_state());

    assert!(!cursor.move_next().unwrap());
    assert_eq!(cursor.key(), None);
    // moving past the last emission leaves uncovered keyspace behind
    assert!(!cursor.skip_state());

    drop(cursor);
    // the hashless parent cannot be reused and was queued for deletion
    assert_eq!(collector.into_entries(), vec![(vec![0x1], Vec::new())]);
}

#[test]
fn malformed_row_fails_the_scan() {
    let mut store = InMemoryTrieStore::default();
    store.insert(vec![0x1], vec![0u8; 5]);

    let mut cursor = AccountTrieCursor::new(store.cursor(), PrefixSet::default(), &[], None);
    assert_eq!(
        cursor.seek(&[]).unwrap_err(),
        TrieError::Node(NodeError::TooShort { len: 5 })
    );
}

#[test]
fn marked_keys_invalidate_like_changed_keys() {
    let mut store = sibling_store();
    let mut changed = PrefixSetMut::default();
    // an account created inside a cached subtree invalidates it like any
    // other change
    changed.insert_marked([0x0a, 0x02]);

    let mut collector = Collector::default();
    let mut cursor =
        AccountTrieCursor::new(store.cursor(), changed.freeze(), &[], Some(&mut collector));

    assert!(!cursor.seek(&[]).unwrap());
    assert_eq!(cursor.key(), Some(&[0x0b, 0x01][..]));

    drop(cursor);
    assert_eq!(collector.into_entries(), vec![(vec![0x0a], Vec::new())]);
}

#[test]
fn marker_between_emissions_keeps_clean_subtrees_skippable() {
    let mut store = sibling_store();
    let mut changed = PrefixSetMut::default();
    // an account created outside both cached subtrees leaves them intact
    changed.insert_marked([0x0a, 0x0f]);

    let mut cursor = AccountTrieCursor::new(store.cursor(), changed.freeze(), &[], None);

    assert!(cursor.seek(&[]).unwrap());
    assert_eq!(cursor.key(), Some(&[0x0a, 0x02][..]));
    assert!(cursor.skip_state());

    cursor.move_next().unwrap();
    assert_eq!(cursor.key(), Some(&[0x0b, 0x01][..]));
    assert!(cursor.skip_state());
}
