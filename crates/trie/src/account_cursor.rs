use crate::{
    collector::Collector,
    errors::{NodeError, TrieError},
    nibbles::increment_nibbled_key,
    prefix_set::PrefixSet,
    store::TrieStoreCursor,
};
use alloy_primitives::B256;
use tracing::trace;

/// Account trie keys hold at most 64 nibbles; two spare levels absorb the
/// frame clearing done on upward moves.
const MAX_LEVELS: usize = 66;

/// A per-level frame: the raw row backing a node and the iteration state over
/// its children.
#[derive(Clone, Debug, Default)]
struct SubNode {
    key: Vec<u8>,
    value: Vec<u8>,
    has_state: u16,
    has_tree: u16,
    has_hash: u16,
    hash_id: i8,
    child_id: i8,
    deleted: bool,
}

impl SubNode {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Preorder cursor over the account intermediate-hash table.
///
/// Unlike [`crate::TrieWalker`], rows invalidated by the changed set are not
/// erased in place: their keys are queued into a [`Collector`] for deferred
/// bulk deletion, in emission order. The cursor also tracks whether the
/// region between consecutive emissions is provably clean
/// ([`skip_state`](Self::skip_state)), taking creation markers in the changed
/// set into account.
#[derive(Debug)]
pub struct AccountTrieCursor<'a, C> {
    cursor: C,
    changed: PrefixSet,
    collector: Option<&'a mut Collector>,
    sub_nodes: Vec<SubNode>,
    level: usize,
    prefix: Vec<u8>,
    prev: Vec<u8>,
    curr: Vec<u8>,
    next: Vec<u8>,
    buff: Vec<u8>,
    next_created: Vec<u8>,
    skip_state: bool,
}

impl<'a, C: TrieStoreCursor> AccountTrieCursor<'a, C> {
    /// Creates a cursor over `cursor`, reporting stale rows to `collector`.
    pub fn new(
        cursor: C,
        changed: PrefixSet,
        prefix: &[u8],
        collector: Option<&'a mut Collector>,
    ) -> Self {
        Self {
            cursor,
            changed,
            collector,
            sub_nodes: vec![SubNode::default(); MAX_LEVELS],
            level: 0,
            prefix: prefix.to_vec(),
            prev: Vec::new(),
            curr: Vec::new(),
            next: Vec::new(),
            buff: Vec::new(),
            next_created: Vec::new(),
            skip_state: true,
        }
    }

    /// Positions at the first emitted key under `prefix`.
    pub fn seek(&mut self, prefix: &[u8]) -> Result<bool, TrieError> {
        self.skip_state = true;
        let (_, next_created) = self.changed.contains_and_next_marked(&[]);
        self.next_created = next_created;
        self.prev.clone_from(&self.curr);
        self.prefix = prefix.to_vec();

        if !self.seek_in_db(&[])? {
            self.curr.clear();
            self.skip_state = false;
            return Ok(false);
        }

        if self.consume() {
            return Ok(true);
        }
        self.next()
    }

    /// Preorder step that never descends: used after emitting a hash to move
    /// past the whole cached subtree.
    pub fn move_next(&mut self) -> Result<bool, TrieError> {
        self.skip_state = true;
        self.prev.clone_from(&self.curr);
        self.preorder_traversal_step_no_indepth()?;

        if self.sub_nodes[self.level].key.is_empty() {
            self.curr.clear();
            self.skip_state = self.skip_state && increment_nibbled_key(&self.prev).is_empty();
            return Ok(false);
        }

        if self.consume() {
            return Ok(self.has_tree());
        }
        self.next()
    }

    /// Full preorder step, descending into stored subtrees where possible.
    ///
    /// Returns whether the new position has a stored child; the scan is
    /// exhausted once [`key`](Self::key) is [`None`].
    pub fn next(&mut self) -> Result<bool, TrieError> {
        self.skip_state = self.skip_state && self.has_tree();
        self.preorder_traversal_step()?;

        loop {
            if self.sub_nodes[self.level].key.is_empty() {
                self.curr.clear();
                self.skip_state = self.skip_state && increment_nibbled_key(&self.prev).is_empty();
                return Ok(false);
            }
            if self.consume() {
                return Ok(self.has_tree());
            }
            self.skip_state = self.skip_state && self.has_tree();
            self.preorder_traversal_step()?;
        }
    }

    /// The currently emitted key, [`None`] when the scan is exhausted.
    pub fn key(&self) -> Option<&[u8]> {
        (!self.curr.is_empty()).then_some(self.curr.as_slice())
    }

    /// Cached hash of the currently emitted child.
    pub fn hash(&self) -> Option<B256> {
        let sub_node = &self.sub_nodes[self.level];
        if !bit(sub_node.has_hash, sub_node.child_id) || sub_node.hash_id < 0 {
            return None;
        }
        let start = 6 + sub_node.hash_id as usize * 32;
        (sub_node.value.len() >= start + 32)
            .then(|| B256::from_slice(&sub_node.value[start..start + 32]))
    }

    /// Whether no unscanned changed key lies within the region skipped since
    /// the previous emission.
    pub const fn skip_state(&self) -> bool {
        self.skip_state
    }

    /// Queues the current subnode's row for deletion, once per subnode.
    pub fn delete_current(&mut self) {
        let sub_node = &mut self.sub_nodes[self.level];
        if !sub_node.deleted && !sub_node.key.is_empty() {
            trace!(target: "trie::account_cursor", key = ?sub_node.key, "queueing stale subtree");
            if let Some(collector) = &mut self.collector {
                collector.collect((sub_node.key.clone(), Vec::new()));
            }
            sub_node.deleted = true;
        }
    }

    /// Emission decision for the current child: emit its cached hash when the
    /// subtree is clean, otherwise queue the row for deletion.
    fn consume(&mut self) -> bool {
        if self.has_hash() {
            let sub_node = &self.sub_nodes[self.level];
            self.buff.clone_from(&sub_node.key);
            self.buff.push(sub_node.child_id as u8);
            let (contains, next_created) = self.changed.contains_and_next_marked(&self.buff);
            if !contains {
                self.skip_state = self.skip_state && key_is_before(&self.buff, &next_created);
                self.next_created = next_created;
                self.curr.clone_from(&self.buff);
                return true;
            }
        }
        self.delete_current();
        false
    }

    fn preorder_traversal_step(&mut self) -> Result<(), TrieError> {
        if self.has_tree() {
            self.next.clone_from(&self.sub_nodes[self.level].key);
            self.next.push(self.sub_nodes[self.level].child_id as u8);
            let within = self.next.clone();
            if self.seek_in_db(&within)? {
                return Ok(());
            }
        }
        self.preorder_traversal_step_no_indepth()
    }

    fn preorder_traversal_step_no_indepth(&mut self) -> Result<(), TrieError> {
        if self.next_sibling_in_mem() {
            return Ok(());
        }
        if self.next_sibling_of_parent_in_mem()? {
            return Ok(());
        }
        self.next_sibling_in_db()
    }

    /// Advances to the next interesting child of the current node: one with a
    /// cached hash or a stored subtree. Children that exist only in state
    /// clear the skip flag, the region around them has to be re-walked.
    fn next_sibling_in_mem(&mut self) -> bool {
        let bit_length = bit_len(self.sub_nodes[self.level].has_state);
        while self.sub_nodes[self.level].child_id < bit_length {
            self.sub_nodes[self.level].child_id += 1;
            if self.has_hash() {
                self.sub_nodes[self.level].hash_id += 1;
                return true;
            }
            if self.has_tree() {
                return true;
            }
            if self.has_state() {
                self.skip_state = false;
            }
        }
        false
    }

    /// Climbs towards the root looking for an ancestor with further children,
    /// probing the store for levels whose frame was cleared on the way up.
    fn next_sibling_of_parent_in_mem(&mut self) -> Result<bool, TrieError> {
        while self.level > 1 {
            if self.sub_nodes[self.level].key.is_empty() {
                let mut up_level = self.level - 1;
                while self.sub_nodes[up_level].key.is_empty() && up_level > 1 {
                    up_level -= 1;
                }
                self.next.clone_from(&self.sub_nodes[self.level].key);
                self.next.push(self.sub_nodes[self.level].child_id as u8);
                self.buff.clone_from(&self.sub_nodes[up_level].key);
                self.buff.push(self.sub_nodes[up_level].child_id as u8);
                let within = self.buff.clone();
                if self.seek_in_db(&within)? {
                    return Ok(true);
                }
                self.level = up_level + 1;
                continue;
            }
            self.level -= 1;
            if self.next_sibling_in_mem() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Jumps to the next sibling subtree via the store, past the current
    /// node's whole key range.
    fn next_sibling_in_db(&mut self) -> Result<(), TrieError> {
        let incremented = increment_nibbled_key(&self.sub_nodes[self.level].key);
        if incremented.is_empty() {
            self.sub_nodes[self.level].key.clear();
            return Ok(());
        }
        self.next = incremented;
        self.seek_in_db(&[])?;
        Ok(())
    }

    /// Seeks the store at the buffered target key. With a non-empty
    /// `within_prefix` the hit must stay inside that prefix; otherwise a miss
    /// outside the scan prefix clears the current frame.
    fn seek_in_db(&mut self, within_prefix: &[u8]) -> Result<bool, TrieError> {
        let entry = if self.next.is_empty() {
            self.cursor.to_first()?
        } else {
            self.cursor.lower_bound(&self.next)?
        };

        let entry = if within_prefix.is_empty() {
            entry.filter(|(key, _)| key.starts_with(&self.prefix))
        } else {
            match entry {
                Some((key, value)) if key.starts_with(within_prefix) => Some((key, value)),
                _ => return Ok(false),
            }
        };

        let Some((key, value)) = entry else {
            let sub_node = &mut self.sub_nodes[self.level];
            sub_node.key.clear();
            sub_node.value.clear();
            return Ok(false);
        };

        self.parse_subnode(&key, &value)?;
        self.next_sibling_in_mem();
        Ok(true)
    }

    /// Installs a freshly loaded row as the frame at its depth, clearing the
    /// frames between the previous level and the new one.
    fn parse_subnode(&mut self, key: &[u8], value: &[u8]) -> Result<(), TrieError> {
        if value.len() < 6 {
            return Err(NodeError::TooShort { len: value.len() }.into());
        }
        if (value.len() - 6) % 32 != 0 {
            return Err(NodeError::MisalignedHashes { len: value.len() }.into());
        }

        let (from, to) = if self.level >= key.len() {
            (key.len() + 1, self.level + 2)
        } else {
            (self.level + 1, key.len())
        };
        for i in from..to {
            self.sub_nodes[i].reset();
        }

        self.level = key.len();
        let sub_node = &mut self.sub_nodes[self.level];
        sub_node.key = key.to_vec();
        sub_node.value = value.to_vec();
        sub_node.deleted = false;
        sub_node.has_state = u16::from_be_bytes([value[0], value[1]]);
        sub_node.has_tree = u16::from_be_bytes([value[2], value[3]]);
        sub_node.has_hash = u16::from_be_bytes([value[4], value[5]]);
        sub_node.hash_id = -1;
        sub_node.child_id = sub_node.has_state.trailing_zeros() as i8 - 1;
        Ok(())
    }

    fn has_state(&self) -> bool {
        let sub_node = &self.sub_nodes[self.level];
        bit(sub_node.has_state, sub_node.child_id)
    }

    fn has_tree(&self) -> bool {
        let sub_node = &self.sub_nodes[self.level];
        bit(sub_node.has_tree, sub_node.child_id)
    }

    fn has_hash(&self) -> bool {
        let sub_node = &self.sub_nodes[self.level];
        bit(sub_node.has_hash, sub_node.child_id)
    }
}

/// Whether bit `id` of `mask` is set; out-of-range ids read as clear.
fn bit(mask: u16, id: i8) -> bool {
    (0..16).contains(&id) && (mask >> id) & 1 != 0
}

/// Index of the highest set bit plus one.
fn bit_len(mask: u16) -> i8 {
    (16 - mask.leading_zeros()) as i8
}

/// Ordering helper treating the empty key as unbounded.
fn key_is_before(k1: &[u8], k2: &[u8]) -> bool {
    if k1.is_empty() {
        return false;
    }
    if k2.is_empty() {
        return true;
    }
    k1 < k2
}
