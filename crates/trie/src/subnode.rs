use crate::node::BranchNode;
use alloy_primitives::B256;
use nybbles::Nibbles;

/// A frame of the walker stack: one loaded node and the child position under
/// consideration.
///
/// `nibble == -1` addresses the node itself, whose root hash (when cached)
/// covers the entire subtree; `0..=15` address a child. The synthetic root
/// frame carries no node at all: its state and tree flags default to
/// permissive so descent is driven by the store, and its hash flag to absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CursorSubNode {
    /// Nibble path from the scan root to this node.
    pub key: Nibbles,
    /// Decoded node, absent only for the synthetic root frame.
    pub node: Option<BranchNode>,
    /// Child selector, `-1..=15`.
    pub nibble: i8,
}

impl CursorSubNode {
    /// Creates a frame positioned at the root slot when a subtree hash is
    /// cached, otherwise at the lowest child present in the state trie.
    pub fn new(key: Nibbles, node: Option<BranchNode>) -> Self {
        let nibble = match &node {
            Some(node) if node.root_hash.is_none() => {
                node.state_mask.get().trailing_zeros() as i8
            }
            _ => -1,
        };
        Self { key, node, nibble }
    }

    /// Full nibble path of the current position.
    pub fn full_key(&self) -> Nibbles {
        let mut key = self.key.clone();
        if self.nibble >= 0 {
            key.push(self.nibble as u8);
        }
        key
    }

    /// Whether the current child exists in the state trie.
    pub fn state_flag(&self) -> bool {
        match &self.node {
            Some(node) if self.nibble >= 0 => node.state_mask.is_bit_set(self.nibble as u8),
            _ => true,
        }
    }

    /// Whether the current child has a stored subnode.
    pub fn tree_flag(&self) -> bool {
        match &self.node {
            Some(node) if self.nibble >= 0 => node.tree_mask.is_bit_set(self.nibble as u8),
            _ => true,
        }
    }

    /// Whether a cached hash covers the current position.
    pub fn hash_flag(&self) -> bool {
        match &self.node {
            None => false,
            Some(node) if self.nibble >= 0 => node.hash_mask.is_bit_set(self.nibble as u8),
            Some(node) => node.root_hash.is_some(),
        }
    }

    /// The cached hash covering the current position, if any.
    pub fn hash(&self) -> Option<B256> {
        if !self.hash_flag() {
            return None;
        }
        let node = self.node.as_ref()?;
        if self.nibble < 0 {
            node.root_hash
        } else {
            Some(node.hash_for_nibble(self.nibble as u8))
        }
    }
}
