use crate::{
    errors::TrieError,
    nibbles::{increment_nibbled_key, pack_nibbles},
    node::BranchNode,
    prefix_set::PrefixSet,
    store::TrieStoreCursor,
    subnode::CursorSubNode,
};
use alloy_primitives::B256;
use nybbles::Nibbles;
use tracing::trace;

/// Preorder cursor over the intermediate-hash rows stored under a fixed byte
/// prefix.
///
/// The walker emits `(nibble key, cached hash)` positions in strictly
/// increasing nibble-lexicographic order. At every position it reports
/// whether the subtree below is still covered by its cached hash
/// ([`can_skip_state`](Self::can_skip_state)); regions that are not get
/// re-walked from the state tables by the caller, and the rows covering them
/// are erased on visit so the re-hash pass can rewrite them.
#[derive(Debug)]
pub struct TrieWalker<C> {
    cursor: C,
    changed: PrefixSet,
    prefix: Vec<u8>,
    stack: Vec<CursorSubNode>,
    can_skip_state: bool,
}

impl<C: TrieStoreCursor> TrieWalker<C> {
    /// Opens a walker and positions it at the root of the scanned region.
    pub fn new(
        cursor: C,
        changed: PrefixSet,
        prefix: impl Into<Vec<u8>>,
    ) -> Result<Self, TrieError> {
        let mut this = Self {
            cursor,
            changed,
            prefix: prefix.into(),
            stack: Vec::with_capacity(64),
            can_skip_state: false,
        };
        this.consume_node(&Nibbles::default(), true)?;
        Ok(this)
    }

    /// Current full nibble key from the scan root, [`None`] once the scan is
    /// exhausted.
    pub fn key(&self) -> Option<Nibbles> {
        self.stack.last().map(CursorSubNode::full_key)
    }

    /// Cached hash covering the current position, if any.
    pub fn hash(&self) -> Option<B256> {
        self.stack.last().and_then(CursorSubNode::hash)
    }

    /// Whether the current child is materialised as a row of this table.
    pub fn children_are_in_trie(&self) -> bool {
        self.stack.last().is_some_and(CursorSubNode::tree_flag)
    }

    /// Whether the subtree at the current position still carries a usable
    /// hash and no changed key intersects it.
    pub const fn can_skip_state(&self) -> bool {
        self.can_skip_state
    }

    /// Packed byte key just past the region the walker has proven clean.
    ///
    /// [`None`] once the scan is exhausted; an empty key when the remainder
    /// of the keyspace is covered. The caller seeks the state tables here to
    /// re-walk the portion that cannot be skipped.
    pub fn first_uncovered_prefix(&self) -> Option<Vec<u8>> {
        let key = self.key()?;
        let nibbles = if self.can_skip_state {
            increment_nibbled_key(key.as_slice())
        } else {
            key.as_slice().to_vec()
        };
        Some(pack_nibbles(&nibbles))
    }

    /// Advances to the next position in preorder.
    pub fn advance(&mut self) -> Result<(), TrieError> {
        let Some(sub_node) = self.stack.last() else {
            // the scan is exhausted
            return Ok(());
        };

        if !self.can_skip_state && sub_node.tree_flag() {
            // the current subtree must be re-walked and has stored subnodes,
            // descend into them
            if sub_node.nibble < 0 {
                self.move_to_next_sibling(true)?;
            } else {
                let key = sub_node.full_key();
                self.consume_node(&key, false)?;
            }
        } else {
            self.move_to_next_sibling(false)?;
        }

        self.update_skip_state();
        Ok(())
    }

    /// Loads the row at (or, for `exact == false`, after) `prefix ++ key` and
    /// pushes it as the new top frame. A miss or a row outside the scan
    /// prefix ends the scan.
    fn consume_node(&mut self, key: &Nibbles, exact: bool) -> Result<(), TrieError> {
        let db_key = self.db_key(key.as_slice());
        let entry =
            if exact { self.cursor.find(&db_key)? } else { self.cursor.lower_bound(&db_key)? };

        let mut key = key.clone();
        if !exact {
            match &entry {
                Some((found_key, _)) if found_key.starts_with(&self.prefix) => {
                    key = Nibbles::from_nibbles_unchecked(&found_key[self.prefix.len()..]);
                }
                _ => {
                    self.stack.clear();
                    return Ok(());
                }
            }
        }

        let node = match &entry {
            Some((_, value)) => {
                let node = BranchNode::decode(value)?;
                assert!(node.state_mask.get() != 0, "stored branch node has empty state mask");
                Some(node)
            }
            None => None,
        };

        // the synthetic root has no state bits of its own; resync its child
        // position from the store so sibling iteration resumes correctly
        // after the stack unwinds
        if !key.is_empty() && !self.stack.is_empty() {
            self.stack[0].nibble = key.as_slice()[0] as i8;
        }

        let has_entry = entry.is_some();
        self.stack.push(CursorSubNode::new(key, node));
        self.update_skip_state();

        // rows about to be re-hashed are dropped on visit; only rows still
        // covered by a valid subtree hash survive
        if has_entry && (!self.can_skip_state || self.stack.last().is_some_and(|n| n.nibble != -1))
        {
            trace!(target: "trie::walker", key = ?self.key(), "erasing visited row");
            self.cursor.erase()?;
        }
        Ok(())
    }

    /// Moves to the next sibling, unwinding exhausted frames.
    fn move_to_next_sibling(
        &mut self,
        allow_root_to_child_nibble_within_subnode: bool,
    ) -> Result<(), TrieError> {
        let Some(sub_node) = self.stack.last_mut() else {
            return Ok(());
        };

        if sub_node.nibble >= 15 ||
            (sub_node.nibble < 0 && !allow_root_to_child_nibble_within_subnode)
        {
            // this node is fully traversed, continue on the parent
            self.stack.pop();
            return self.move_to_next_sibling(false);
        }

        sub_node.nibble += 1;

        if sub_node.node.is_none() {
            // no state bits to consult, the store decides
            let key = sub_node.full_key();
            return self.consume_node(&key, false);
        }

        while sub_node.nibble < 16 {
            if sub_node.state_flag() {
                return Ok(());
            }
            sub_node.nibble += 1;
        }

        // this node is fully traversed, continue on the parent
        self.stack.pop();
        self.move_to_next_sibling(false)
    }

    fn update_skip_state(&mut self) {
        self.can_skip_state = match self.key() {
            Some(key) => {
                let full_key = self.db_key(key.as_slice());
                !self.changed.contains(&full_key) &&
                    self.stack.last().is_some_and(CursorSubNode::hash_flag)
            }
            None => false,
        };
    }

    fn db_key(&self, key: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.prefix.len() + key.len());
        out.extend_from_slice(&self.prefix);
        out.extend_from_slice(key);
        out
    }
}
