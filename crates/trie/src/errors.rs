use thiserror::Error;

/// Backend failure surfaced through a [`crate::TrieStoreCursor`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("trie store backend failure: {message}")]
pub struct StoreError {
    /// Backend-provided description of the failure.
    pub message: String,
}

/// Malformed branch node payload encountered during a scan.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum NodeError {
    /// The payload is shorter than the three mask words.
    #[error("branch node payload of {len} bytes is shorter than the 6 byte mask header")]
    TooShort {
        /// Length of the offending payload.
        len: usize,
    },
    /// The hash section is not a whole number of 32 byte hashes.
    #[error("branch node payload of {len} bytes is not 6 plus a multiple of 32")]
    MisalignedHashes {
        /// Length of the offending payload.
        len: usize,
    },
    /// The number of stored hashes does not match the hash mask.
    #[error("branch node stores {got} hashes where the mask expects {expected}")]
    HashCountMismatch {
        /// Hashes implied by the mask (an optional root hash may follow).
        expected: usize,
        /// Hashes actually stored.
        got: usize,
    },
}

/// Failure while scanning a trie table.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TrieError {
    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A stored node could not be decoded.
    #[error(transparent)]
    Node(#[from] NodeError),
}
