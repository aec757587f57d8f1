#![doc = include_str!("../README.md")]

mod account_cursor;
mod collector;
mod errors;
mod nibbles;
mod node;
mod prefix_set;
mod store;
mod subnode;
mod walker;

pub use account_cursor::AccountTrieCursor;
pub use collector::Collector;
pub use errors::{NodeError, StoreError, TrieError};
pub use nibbles::{compute_next_uncovered_prefix, increment_nibbled_key, pack_nibbles};
pub use node::BranchNode;
pub use prefix_set::{PrefixSet, PrefixSetMut};
pub use store::{InMemoryTrieCursor, InMemoryTrieStore, StoreEntry, TrieStoreCursor};
pub use subnode::CursorSubNode;
pub use walker::TrieWalker;

pub use nybbles::Nibbles;
