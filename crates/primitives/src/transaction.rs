use alloy_primitives::{Address, Bytes, B256, U256};

/// Data gas consumed by each blob of an EIP-4844 transaction.
pub const DATA_GAS_PER_BLOB: u64 = 0x20000;

/// EIP-2718 transaction envelope type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TxType {
    /// Untyped pre-EIP-2718 transaction.
    #[default]
    Legacy = 0,
    /// EIP-2930 access list transaction.
    Eip2930 = 1,
    /// EIP-1559 dynamic fee transaction.
    Eip1559 = 2,
    /// EIP-4844 blob transaction.
    Eip4844 = 3,
}

/// A single EIP-2930 access list entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessListEntry {
    /// Account to warm up.
    pub account: Address,
    /// Storage keys of `account` to warm up.
    pub storage_keys: Vec<B256>,
}

/// A transaction with its sender already recovered.
///
/// Fee fields follow the EIP-1559 shape for every envelope type; legacy
/// transactions set both fee caps to the gas price.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transaction {
    /// Envelope type.
    pub tx_type: TxType,
    /// Chain id, absent for pre-EIP-155 transactions.
    pub chain_id: Option<u64>,
    /// Sender nonce.
    pub nonce: u64,
    /// Max priority fee per gas paid on top of the base fee.
    pub max_priority_fee_per_gas: U256,
    /// Total fee cap per gas.
    pub max_fee_per_gas: U256,
    /// Gas limit.
    pub gas_limit: u64,
    /// Recipient; [`None`] for contract creation.
    pub to: Option<Address>,
    /// Transferred value in wei.
    pub value: U256,
    /// Calldata, or initcode for contract creation.
    pub input: Bytes,
    /// EIP-2930 access list.
    pub access_list: Vec<AccessListEntry>,
    /// EIP-4844 blob commitments.
    pub blob_versioned_hashes: Vec<B256>,
    /// EIP-4844 data gas fee cap.
    pub max_fee_per_data_gas: U256,
    /// Recovered sender.
    pub from: Address,
}

impl Transaction {
    /// Fee per gas the miner receives on top of the base fee.
    ///
    /// Valid transactions satisfy `max_fee_per_gas >= base_fee_per_gas`.
    pub fn priority_fee_per_gas(&self, base_fee_per_gas: U256) -> U256 {
        core::cmp::min(self.max_priority_fee_per_gas, self.max_fee_per_gas - base_fee_per_gas)
    }

    /// Fee per gas the sender is billed at.
    pub fn effective_gas_price(&self, base_fee_per_gas: U256) -> U256 {
        self.priority_fee_per_gas(base_fee_per_gas) + base_fee_per_gas
    }

    /// Total EIP-4844 data gas consumed by the carried blobs.
    pub fn total_data_gas(&self) -> u64 {
        DATA_GAS_PER_BLOB * self.blob_versioned_hashes.len() as u64
    }
}
