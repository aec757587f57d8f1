//! The byte-ordered store behind the intermediate-hash tables.

use crate::errors::StoreError;
use std::collections::BTreeMap;
use std::ops::Bound;

/// A `(key, value)` row of a trie table.
pub type StoreEntry = (Vec<u8>, Vec<u8>);

/// An ordered cursor over a trie table.
///
/// Positioning calls leave the cursor on the returned row, which is the row
/// affected by a subsequent [`erase`](Self::erase). The cursor is borrowed
/// exclusively by one scan at a time and is not reentrant.
pub trait TrieStoreCursor {
    /// Positions at `key` exactly.
    fn find(&mut self, key: &[u8]) -> Result<Option<StoreEntry>, StoreError>;

    /// Positions at the first row with a key at or after `key`.
    fn lower_bound(&mut self, key: &[u8]) -> Result<Option<StoreEntry>, StoreError>;

    /// Positions at the first row of the table.
    fn to_first(&mut self) -> Result<Option<StoreEntry>, StoreError>;

    /// Removes the row the cursor is positioned at, if any.
    fn erase(&mut self) -> Result<(), StoreError>;
}

/// In-memory reference store, used by the test-suite and small tools.
#[derive(Clone, Debug, Default)]
pub struct InMemoryTrieStore {
    rows: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl InMemoryTrieStore {
    /// Inserts or replaces a row.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.rows.insert(key.into(), value.into());
    }

    /// Whether a row with `key` exists.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.rows.contains_key(key)
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates the stored keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &Vec<u8>> {
        self.rows.keys()
    }

    /// Opens a cursor over the store.
    pub fn cursor(&mut self) -> InMemoryTrieCursor<'_> {
        InMemoryTrieCursor { rows: &mut self.rows, position: None }
    }
}

/// Cursor over an [`InMemoryTrieStore`].
#[derive(Debug)]
pub struct InMemoryTrieCursor<'a> {
    rows: &'a mut BTreeMap<Vec<u8>, Vec<u8>>,
    position: Option<Vec<u8>>,
}

impl TrieStoreCursor for InMemoryTrieCursor<'_> {
    fn find(&mut self, key: &[u8]) -> Result<Option<StoreEntry>, StoreError> {
        match self.rows.get(key) {
            Some(value) => {
                self.position = Some(key.to_vec());
                Ok(Some((key.to_vec(), value.clone())))
            }
            None => {
                self.position = None;
                Ok(None)
            }
        }
    }

    fn lower_bound(&mut self, key: &[u8]) -> Result<Option<StoreEntry>, StoreError> {
        let entry = self
            .rows
            .range::<[u8], _>((Bound::Included(key), Bound::Unbounded))
            .next()
            .map(|(k, v)| (k.clone(), v.clone()));
        self.position = entry.as_ref().map(|(k, _)| k.clone());
        Ok(entry)
    }

    fn to_first(&mut self) -> Result<Option<StoreEntry>, StoreError> {
        let entry = self.rows.iter().next().map(|(k, v)| (k.clone(), v.clone()));
        self.position = entry.as_ref().map(|(k, _)| k.clone());
        Ok(entry)
    }

    fn erase(&mut self) -> Result<(), StoreError> {
        if let Some(position) = self.position.take() {
            self.rows.remove(&position);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_positions_and_erases() {
        let mut store = InMemoryTrieStore::default();
        store.insert(vec![1], vec![0xa]);
        store.insert(vec![2, 0], vec![0xb]);
        store.insert(vec![3], vec![0xc]);

        let mut cursor = store.cursor();
        assert_eq!(cursor.find(&[2]).unwrap(), None);
        assert_eq!(cursor.lower_bound(&[2]).unwrap(), Some((vec![2, 0], vec![0xb])));
        cursor.erase().unwrap();
        assert_eq!(cursor.to_first().unwrap(), Some((vec![1], vec![0xa])));
        // erase at the same position twice is a no-op
        cursor.erase().unwrap();
        cursor.erase().unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.contains_key(&[3]));
    }
}
