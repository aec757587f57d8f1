//! Mock collaborators for exercising the processor without a real
//! interpreter or database.

use crate::{
    evm::{CallResult, Evm},
    gas::GasParams,
    rule_set::RuleSet,
    state::State,
};
use alloy_primitives::{Address, Log, B256, U256};
use sable_primitives::{Block, Revision, Transaction};
use std::collections::{HashMap, HashSet, VecDeque};

/// An in-memory account record.
#[derive(Clone, Copy, Debug, Default)]
pub struct MockAccount {
    /// Account nonce.
    pub nonce: u64,
    /// Account balance.
    pub balance: U256,
}

/// In-memory [`State`] with counters for every lifecycle hook, so tests can
/// assert ordering and cardinality.
#[derive(Debug, Default)]
pub struct MockState {
    /// Accounts by address.
    pub accounts: HashMap<Address, MockAccount>,
    /// Logs of the transaction in flight.
    pub logs: Vec<Log>,
    /// Accounts warmed via access tracking, in order.
    pub accessed_accounts: Vec<Address>,
    /// Storage slots warmed via access tracking, in order.
    pub accessed_storage: Vec<(Address, B256)>,
    /// Number of journal resets.
    pub journal_resets: usize,
    /// Number of finalized transactions.
    pub finalized_transactions: usize,
    /// Number of self-destruct sweeps.
    pub destructed_suicides: usize,
    /// Number of touched-dead sweeps.
    pub destructed_dead: usize,
    /// Number of reserved-object resets.
    pub reserved_resets: usize,
    /// Block number passed to the final commit, if any.
    pub written_block: Option<u64>,
}

impl MockState {
    /// Adds an account and returns the state, builder style.
    pub fn with_account(mut self, address: Address, nonce: u64, balance: U256) -> Self {
        self.accounts.insert(address, MockAccount { nonce, balance });
        self
    }

    /// Balance of `address`, zero when absent.
    pub fn balance_of(&self, address: Address) -> U256 {
        self.accounts.get(&address).map(|account| account.balance).unwrap_or_default()
    }

    /// Nonce of `address`, zero when absent.
    pub fn nonce_of(&self, address: Address) -> u64 {
        self.accounts.get(&address).map(|account| account.nonce).unwrap_or_default()
    }
}

impl State for MockState {
    fn nonce(&self, address: Address) -> u64 {
        self.nonce_of(address)
    }

    fn balance(&self, address: Address) -> U256 {
        self.balance_of(address)
    }

    fn access_account(&mut self, address: Address) {
        self.accessed_accounts.push(address);
    }

    fn access_storage(&mut self, address: Address, key: B256) {
        self.accessed_storage.push((address, key));
    }

    fn set_nonce(&mut self, address: Address, nonce: u64) {
        self.accounts.entry(address).or_default().nonce = nonce;
    }

    fn set_balance(&mut self, address: Address, balance: U256) {
        self.accounts.entry(address).or_default().balance = balance;
    }

    fn add_to_balance(&mut self, address: Address, amount: U256) {
        let account = self.accounts.entry(address).or_default();
        account.balance += amount;
    }

    fn subtract_from_balance(&mut self, address: Address, amount: U256) {
        let account = self.accounts.entry(address).or_default();
        account.balance = account.balance.saturating_sub(amount);
    }

    fn logs_mut(&mut self) -> &mut Vec<Log> {
        &mut self.logs
    }

    fn clear_journal_and_substate(&mut self) {
        self.journal_resets += 1;
    }

    fn destruct_suicides(&mut self) {
        self.destructed_suicides += 1;
    }

    fn destruct_touched_dead(&mut self) {
        self.destructed_dead += 1;
    }

    fn finalize_transaction(&mut self) {
        self.finalized_transactions += 1;
    }

    fn reset_reserved_objects(&mut self) {
        self.reserved_resets += 1;
    }

    fn write_to_db(&mut self, block_number: u64) {
        self.written_block = Some(block_number);
    }
}

/// Scripted [`Evm`]: returns queued [`CallResult`]s in order and records
/// what it was invoked with.
#[derive(Debug)]
pub struct MockEvm {
    /// Revision reported to the processor.
    pub revision: Revision,
    /// Variant protocol version reported to the processor.
    pub eos_evm_version: u64,
    /// Results returned per invocation; an exhausted queue yields defaults.
    pub results: VecDeque<CallResult>,
    /// Logs appended to the state on every invocation.
    pub logs_per_call: Vec<Log>,
    /// Gas handed over per invocation.
    pub gas_seen: Vec<u64>,
    /// Scaled `g_sset` charge observed per invocation.
    pub sset_seen: Vec<u64>,
}

impl MockEvm {
    /// Creates a scripted interpreter.
    pub fn new(revision: Revision, eos_evm_version: u64) -> Self {
        Self {
            revision,
            eos_evm_version,
            results: VecDeque::new(),
            logs_per_call: Vec::new(),
            gas_seen: Vec::new(),
            sset_seen: Vec::new(),
        }
    }

    /// Queues a result, builder style.
    pub fn returning(mut self, result: CallResult) -> Self {
        self.results.push_back(result);
        self
    }

    /// Emits `log` into the state on every invocation, builder style.
    pub fn emitting(mut self, log: Log) -> Self {
        self.logs_per_call.push(log);
        self
    }
}

impl Evm<MockState> for MockEvm {
    fn revision(&self) -> Revision {
        self.revision
    }

    fn eos_evm_version(&self) -> u64 {
        self.eos_evm_version
    }

    fn execute(
        &mut self,
        state: &mut MockState,
        _txn: &Transaction,
        gas: u64,
        gas_params: &GasParams,
    ) -> CallResult {
        self.gas_seen.push(gas);
        self.sset_seen.push(gas_params.g_sset);
        state.logs_mut().extend(self.logs_per_call.iter().cloned());
        self.results.pop_front().unwrap_or_default()
    }
}

/// Configurable [`RuleSet`].
#[derive(Debug, Default)]
pub struct MockRules {
    /// Whether blocks arrive externally validated.
    pub trust: bool,
    /// Externally driven accounts.
    pub reserved: HashSet<Address>,
    /// Block of the irregular state change, if any.
    pub dao_block: Option<u64>,
    /// Pair of accounts whose balance is moved on the irregular block.
    pub dao_drain: Option<(Address, Address)>,
    /// Number of finalize calls observed.
    pub finalized: core::cell::Cell<u64>,
}

impl RuleSet<MockState> for MockRules {
    fn is_trust(&self) -> bool {
        self.trust
    }

    fn finalize(&self, _state: &mut MockState, _block: &Block) {
        self.finalized.set(self.finalized.get() + 1);
    }

    fn is_dao_block(&self, number: u64) -> bool {
        self.dao_block == Some(number)
    }

    fn transfer_dao_balances(&self, state: &mut MockState) {
        if let Some((from, to)) = self.dao_drain {
            let amount = state.balance(from);
            state.subtract_from_balance(from, amount);
            state.add_to_balance(to, amount);
        }
    }

    fn is_reserved_address(&self, address: Address) -> bool {
        self.reserved.contains(&address)
    }
}
