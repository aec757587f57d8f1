use crate::state::State;
use alloy_primitives::Address;
use sable_primitives::{Block, Header};

/// Protocol rules consulted around transaction and block boundaries.
pub trait RuleSet<S: State> {
    /// Recipient of transaction fees for this header.
    fn beneficiary(&self, header: &Header) -> Address {
        header.beneficiary
    }

    /// Whether blocks arrive pre-validated by an external authority.
    ///
    /// Trust rule sets skip post-execution gas, receipts-root and logs-bloom
    /// comparisons and bill transactions at their effective gas price.
    fn is_trust(&self) -> bool {
        false
    }

    /// Block-level reward and settlement hook, run after all transactions.
    fn finalize(&self, state: &mut S, block: &Block);

    /// Whether `number` is the block of the irregular DAO state change.
    fn is_dao_block(&self, _number: u64) -> bool {
        false
    }

    /// Applies the irregular DAO balance transfers.
    fn transfer_dao_balances(&self, _state: &mut S) {}

    /// Whether `address` is an account whose balance and nonce mirror an
    /// external bridge contract.
    fn is_reserved_address(&self, _address: Address) -> bool {
        false
    }
}
