use crate::{gas::GasParams, state::State};
use alloy_primitives::Bytes;
use sable_primitives::{Revision, Transaction};

/// Final status of an EVM invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VmStatus {
    /// Execution completed successfully.
    Success,
    /// Execution reverted; remaining gas is returned.
    Revert,
    /// Execution failed consuming all gas.
    Failure,
}

/// The outcome of running a transaction's message call or creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallResult {
    /// Final execution status.
    pub status: VmStatus,
    /// Gas remaining after execution.
    pub gas_left: u64,
    /// Refund counter accumulated during execution.
    pub gas_refund: u64,
    /// Return data or deployed code.
    pub output: Bytes,
}

impl Default for CallResult {
    fn default() -> Self {
        Self { status: VmStatus::Success, gas_left: 0, gas_refund: 0, output: Bytes::new() }
    }
}

/// The interpreter boundary.
///
/// An implementation is bound to one block and chain configuration; the
/// processor passes it the shared state for every invocation so the two never
/// hold it at the same time.
pub trait Evm<S: State> {
    /// Active fork revision for the bound block.
    fn revision(&self) -> Revision;

    /// Active variant protocol version; 0 for mainline Ethereum semantics.
    fn eos_evm_version(&self) -> u64;

    /// Runs `txn` with `gas` available against `state`.
    fn execute(
        &mut self,
        state: &mut S,
        txn: &Transaction,
        gas: u64,
        gas_params: &GasParams,
    ) -> CallResult;
}
