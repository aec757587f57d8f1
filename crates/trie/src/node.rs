use crate::errors::NodeError;
use alloy_primitives::B256;
use alloy_trie::TrieMask;

/// A branch node of the intermediate-hash table.
///
/// The three masks describe the node's children: which exist in the state
/// trie at all, which have a stored subnode in this table, and which have a
/// cached hash. `tree_mask` and `hash_mask` are always subsets of
/// `state_mask`, and stored nodes always have a non-empty `state_mask`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BranchNode {
    /// Bitmap of children present in the state trie.
    pub state_mask: TrieMask,
    /// Bitmap of children with a stored subnode in this table.
    pub tree_mask: TrieMask,
    /// Bitmap of children with a cached hash.
    pub hash_mask: TrieMask,
    /// Cached child hashes, one per set `hash_mask` bit, in ascending nibble
    /// order.
    pub hashes: Vec<B256>,
    /// Cached hash of the whole subtree rooted at this node.
    pub root_hash: Option<B256>,
}

impl BranchNode {
    /// Creates a new branch node, asserting the mask inclusion invariants.
    pub fn new(
        state_mask: impl Into<TrieMask>,
        tree_mask: impl Into<TrieMask>,
        hash_mask: impl Into<TrieMask>,
        hashes: Vec<B256>,
        root_hash: Option<B256>,
    ) -> Self {
        let (state_mask, tree_mask, hash_mask) =
            (state_mask.into(), tree_mask.into(), hash_mask.into());
        assert!(tree_mask.get() & !state_mask.get() == 0, "tree mask exceeds state mask");
        assert!(hash_mask.get() & !state_mask.get() == 0, "hash mask exceeds state mask");
        assert_eq!(hash_mask.count_ones() as usize, hashes.len());
        Self { state_mask, tree_mask, hash_mask, hashes, root_hash }
    }

    /// Cached hash of child `nibble`.
    ///
    /// The caller checks the `hash_mask` bit; the hash index is the popcount
    /// of the mask bits below `nibble`.
    pub fn hash_for_nibble(&self, nibble: u8) -> B256 {
        let mask = (1u16 << nibble) - 1;
        let index = (self.hash_mask.get() & mask).count_ones() as usize;
        self.hashes[index]
    }

    /// Decodes a node from its table representation: three big-endian mask
    /// words followed by the cached hashes and an optional root hash.
    pub fn decode(buf: &[u8]) -> Result<Self, NodeError> {
        if buf.len() < 6 {
            return Err(NodeError::TooShort { len: buf.len() });
        }
        if (buf.len() - 6) % 32 != 0 {
            return Err(NodeError::MisalignedHashes { len: buf.len() });
        }
        let state_mask = TrieMask::new(u16::from_be_bytes([buf[0], buf[1]]));
        let tree_mask = TrieMask::new(u16::from_be_bytes([buf[2], buf[3]]));
        let hash_mask = TrieMask::new(u16::from_be_bytes([buf[4], buf[5]]));

        let expected = hash_mask.count_ones() as usize;
        let stored = (buf.len() - 6) / 32;
        if stored != expected && stored != expected + 1 {
            return Err(NodeError::HashCountMismatch { expected, got: stored });
        }

        let hash_at = |i: usize| B256::from_slice(&buf[6 + i * 32..6 + (i + 1) * 32]);
        let hashes = (0..expected).map(hash_at).collect();
        // a trailing extra hash covers the whole subtree
        let root_hash = (stored == expected + 1).then(|| hash_at(expected));
        Ok(Self { state_mask, tree_mask, hash_mask, hashes, root_hash })
    }

    /// Encodes the node into its table representation.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(6 + 32 * (self.hashes.len() + 1));
        out.extend_from_slice(&self.state_mask.get().to_be_bytes());
        out.extend_from_slice(&self.tree_mask.get().to_be_bytes());
        out.extend_from_slice(&self.hash_mask.get().to_be_bytes());
        for hash in &self.hashes {
            out.extend_from_slice(hash.as_slice());
        }
        if let Some(root_hash) = &self.root_hash {
            out.extend_from_slice(root_hash.as_slice());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    const HASH_A: B256 =
        b256!("1111111111111111111111111111111111111111111111111111111111111111");
    const HASH_B: B256 =
        b256!("2222222222222222222222222222222222222222222222222222222222222222");

    #[test]
    fn codec_roundtrip() {
        let node = BranchNode::new(0b1011, 0b0010, 0b1001, vec![HASH_A, HASH_B], None);
        let encoded = node.encode();
        assert_eq!(encoded.len(), 6 + 64);
        assert_eq!(BranchNode::decode(&encoded).unwrap(), node);

        let with_root = BranchNode::new(0b1011, 0, 0, vec![], Some(HASH_A));
        let encoded = with_root.encode();
        assert_eq!(encoded.len(), 6 + 32);
        assert_eq!(BranchNode::decode(&encoded).unwrap(), with_root);
    }

    #[test]
    fn decode_rejects_malformed_payloads() {
        assert_eq!(BranchNode::decode(&[0; 5]), Err(NodeError::TooShort { len: 5 }));
        assert_eq!(BranchNode::decode(&[0; 7]), Err(NodeError::MisalignedHashes { len: 7 }));
        // mask asks for two hashes, payload has none
        let mut buf = vec![0u8; 6];
        buf[0] = 0x00;
        buf[1] = 0b11;
        buf[4] = 0x00;
        buf[5] = 0b11;
        assert_eq!(
            BranchNode::decode(&buf),
            Err(NodeError::HashCountMismatch { expected: 2, got: 0 })
        );
    }

    #[test]
    fn hash_index_follows_mask_popcount() {
        let node = BranchNode::new(0b1011, 0, 0b1001, vec![HASH_A, HASH_B], None);
        assert_eq!(node.hash_for_nibble(0), HASH_A);
        assert_eq!(node.hash_for_nibble(3), HASH_B);
    }
}
