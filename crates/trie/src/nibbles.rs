//! Arithmetic over unpacked nibble keys.
//!
//! Trie paths are sequences of values in `0..=15`, stored one per byte. The
//! helpers here convert between that unpacked form and the packed two-per-byte
//! form used to seek byte-keyed state tables, and compute the successor keys
//! that bound skippable subtrees.

/// Packs a nibble sequence two per byte, high nibble first.
///
/// An odd-length sequence zero-fills the low nibble of the final byte, which
/// is exactly the padding callers apply when turning a nibble path into an
/// inclusive lower bound.
pub fn pack_nibbles(nibbles: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; nibbles.len().div_ceil(2)];
    for (i, nibble) in nibbles.iter().enumerate() {
        if i % 2 == 0 {
            out[i / 2] = nibble << 4;
        } else {
            out[i / 2] |= nibble;
        }
    }
    out
}

/// The shortest nibble key strictly greater than `nibbles` that does not
/// extend it: everything after the rightmost incrementable nibble is dropped
/// and that nibble is bumped.
///
/// Returns an empty key when every nibble is `0xf`, i.e. the keyspace past
/// `nibbles` is exhausted.
pub fn increment_nibbled_key(nibbles: &[u8]) -> Vec<u8> {
    match nibbles.iter().rposition(|nibble| *nibble < 0xf) {
        Some(pos) => {
            let mut out = nibbles[..=pos].to_vec();
            out[pos] += 1;
            out
        }
        None => Vec::new(),
    }
}

/// The packed seek key at which a state scan resumes after a skipped subtree.
///
/// Starts from `prefix` when nothing has been covered yet, otherwise from the
/// successor of `previous`. Odd-length results are padded with a zero nibble
/// so the bound packs into whole bytes. An empty result means the keyspace is
/// exhausted.
pub fn compute_next_uncovered_prefix(previous: &[u8], prefix: &[u8]) -> Vec<u8> {
    let mut key =
        if previous.is_empty() { prefix.to_vec() } else { increment_nibbled_key(previous) };
    if key.len() % 2 == 1 {
        key.push(0);
    }
    pack_nibbles(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nybbles::Nibbles;
    use proptest::prelude::*;

    #[test]
    fn increment_examples() {
        assert_eq!(increment_nibbled_key(&[0x01, 0x02]), vec![0x01, 0x03]);
        assert_eq!(increment_nibbled_key(&[0x01, 0x0f]), vec![0x02]);
        assert_eq!(increment_nibbled_key(&[0x0f, 0x0f]), Vec::<u8>::new());
        assert_eq!(increment_nibbled_key(&[]), Vec::<u8>::new());
        assert_eq!(increment_nibbled_key(&[0x0e, 0x0f, 0x0f]), vec![0x0f]);
    }

    #[test]
    fn next_uncovered_prefix_examples() {
        assert_eq!(compute_next_uncovered_prefix(&[0x01, 0x02], &[]), vec![0x13]);
        assert_eq!(compute_next_uncovered_prefix(&[], &[0x0a]), vec![0xa0]);
        assert_eq!(compute_next_uncovered_prefix(&[], &[]), Vec::<u8>::new());
        // a fully saturated previous key wraps to the empty bound
        assert_eq!(compute_next_uncovered_prefix(&[0x0f, 0x0f], &[]), Vec::<u8>::new());
    }

    proptest! {
        #[test]
        fn pack_unpack_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..64)) {
            let nibbles = Nibbles::unpack(&data);
            prop_assert_eq!(pack_nibbles(nibbles.as_slice()), data);
        }

        #[test]
        fn increment_law(key in proptest::collection::vec(0u8..16, 0..32)) {
            let next = increment_nibbled_key(&key);
            if key.iter().all(|nibble| *nibble == 0xf) {
                prop_assert!(next.is_empty());
            } else {
                // strictly greater, and equal to the original up to the bumped
                // position
                prop_assert!(next.as_slice() > key.as_slice());
                let pos = next.len() - 1;
                prop_assert_eq!(&next[..pos], &key[..pos]);
                prop_assert_eq!(next[pos], key[pos] + 1);
                prop_assert!(key[pos] < 0xf);
                prop_assert!(key[pos + 1..].iter().all(|nibble| *nibble == 0xf));
            }
        }
    }
}
