use crate::Transaction;
use alloy_primitives::{Address, Bloom, B256, U256};

/// Minimum data gas price charged for blob data (EIP-4844).
const MIN_DATA_GAS_PRICE: u64 = 1;

/// Denominator controlling how fast the data gas price reacts to excess.
const DATA_GAS_PRICE_UPDATE_FRACTION: u64 = 3338477;

/// A block header, restricted to the fields the execution and
/// state-commitment pipelines consume.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    /// Hash of the parent block.
    pub parent_hash: B256,
    /// Fee recipient under the default rules.
    pub beneficiary: Address,
    /// State root after this block.
    pub state_root: B256,
    /// Root of the transactions trie.
    pub transactions_root: B256,
    /// Root of the receipts trie.
    pub receipts_root: B256,
    /// Union of the bloom filters of all receipts.
    pub logs_bloom: Bloom,
    /// Block height.
    pub number: u64,
    /// Block gas limit.
    pub gas_limit: u64,
    /// Gas consumed by all transactions.
    pub gas_used: u64,
    /// Unix timestamp.
    pub timestamp: u64,
    /// EIP-1559 base fee, absent before London.
    pub base_fee_per_gas: Option<U256>,
    /// EIP-4844 excess data gas, absent before Cancun.
    pub excess_data_gas: Option<u64>,
}

impl Header {
    /// Data gas price for blob-carrying transactions, absent before Cancun.
    pub fn data_gas_price(&self) -> Option<U256> {
        self.excess_data_gas.map(|excess| {
            fake_exponential(
                U256::from(MIN_DATA_GAS_PRICE),
                U256::from(excess),
                U256::from(DATA_GAS_PRICE_UPDATE_FRACTION),
            )
        })
    }
}

/// Approximates `factor * e ** (numerator / denominator)` using Taylor
/// expansion, as defined by EIP-4844.
fn fake_exponential(factor: U256, numerator: U256, denominator: U256) -> U256 {
    let mut i = U256::from(1);
    let mut output = U256::ZERO;
    let mut accum = factor * denominator;
    while !accum.is_zero() {
        output += accum;
        accum = accum * numerator / (denominator * i);
        i += U256::from(1);
    }
    output / denominator
}

/// A block as handed to the execution processor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    /// The block header.
    pub header: Header,
    /// Transactions in execution order.
    pub transactions: Vec<Transaction>,
    /// Ommer headers, consumed only by rule-set finalization.
    pub ommers: Vec<Header>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_gas_price_starts_at_minimum() {
        let header = Header { excess_data_gas: Some(0), ..Default::default() };
        assert_eq!(header.data_gas_price(), Some(U256::from(MIN_DATA_GAS_PRICE)));
        assert_eq!(Header::default().data_gas_price(), None);
    }

    #[test]
    fn data_gas_price_grows_with_excess() {
        let low = Header { excess_data_gas: Some(0), ..Default::default() };
        let high = Header {
            excess_data_gas: Some(10 * DATA_GAS_PRICE_UPDATE_FRACTION),
            ..Default::default()
        };
        assert!(high.data_gas_price().unwrap() > low.data_gas_price().unwrap());
    }
}
