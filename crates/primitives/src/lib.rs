//! Core block, transaction and receipt types shared across the sable
//! workspace.
//!
//! Everything here is deliberately storage- and interpreter-agnostic: the
//! types carry exactly the fields consumed by the state-commitment and block
//! execution pipelines.

mod block;
mod error;
mod receipt;
mod revision;
mod transaction;

pub use block::{Block, Header};
pub use error::GotExpected;
pub use receipt::{logs_bloom, receipts_root, Receipt};
pub use revision::Revision;
pub use transaction::{AccessListEntry, Transaction, TxType, DATA_GAS_PER_BLOB};
