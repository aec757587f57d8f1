use alloy_primitives::{Address, Log, B256, U256};

/// The journalled world-state view the processor mutates.
///
/// Implementations keep a journal per transaction: the processor clears it
/// before each transaction and finalizes it afterwards, so an early return
/// never leaves a half-applied frame behind.
pub trait State {
    /// Current nonce of `address`.
    fn nonce(&self, address: Address) -> u64;

    /// Current balance of `address`.
    fn balance(&self, address: Address) -> U256;

    /// Marks `address` warm for EIP-2929 access accounting.
    fn access_account(&mut self, address: Address);

    /// Marks a storage slot of `address` warm.
    fn access_storage(&mut self, address: Address, key: B256);

    /// Sets the nonce of `address`.
    fn set_nonce(&mut self, address: Address, nonce: u64);

    /// Sets the balance of `address`, creating the account if necessary.
    fn set_balance(&mut self, address: Address, balance: U256);

    /// Credits `amount` to `address`.
    fn add_to_balance(&mut self, address: Address, amount: U256);

    /// Debits `amount` from `address`.
    fn subtract_from_balance(&mut self, address: Address, amount: U256);

    /// Logs accumulated by the current transaction.
    fn logs_mut(&mut self) -> &mut Vec<Log>;

    /// Drops the current journal and transaction substate.
    fn clear_journal_and_substate(&mut self);

    /// Destroys accounts self-destructed during the current transaction.
    fn destruct_suicides(&mut self);

    /// Destroys touched-but-dead accounts (EIP-158).
    fn destruct_touched_dead(&mut self);

    /// Commits the current journal.
    fn finalize_transaction(&mut self);

    /// Drops per-transaction tracking of externally driven account objects.
    fn reset_reserved_objects(&mut self);

    /// Writes the accumulated block state at `block_number`.
    fn write_to_db(&mut self, block_number: u64);
}
