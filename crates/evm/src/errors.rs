use alloy_primitives::{Bloom, B256, U256};
use sable_primitives::GotExpected;
use thiserror::Error;

/// Rejection of a transaction before execution.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
    /// Sender nonce does not match the account.
    #[error("transaction nonce mismatch: {0}")]
    WrongNonce(GotExpected<u64>),
    /// The fee cap is below the block base fee.
    #[error("max fee per gas {max_fee_per_gas} below base fee {base_fee_per_gas}")]
    MaxFeeLessThanBase {
        /// Transaction fee cap.
        max_fee_per_gas: U256,
        /// Block base fee.
        base_fee_per_gas: U256,
    },
    /// The priority fee exceeds the fee cap.
    #[error("max priority fee {max_priority_fee_per_gas} above max fee {max_fee_per_gas}")]
    TipAboveFeeCap {
        /// Transaction priority fee.
        max_priority_fee_per_gas: U256,
        /// Transaction fee cap.
        max_fee_per_gas: U256,
    },
    /// The gas limit cannot cover the intrinsic gas.
    #[error("intrinsic gas {intrinsic_gas} exceeds gas limit {gas_limit}")]
    IntrinsicGas {
        /// Gas charged before execution.
        intrinsic_gas: u128,
        /// Transaction gas limit.
        gas_limit: u64,
    },
    /// The gas limit exceeds the gas left in the block.
    #[error("gas limit {gas_limit} exceeds available block gas {available_gas}")]
    BlockGasLimitExceeded {
        /// Transaction gas limit.
        gas_limit: u64,
        /// Gas remaining in the block.
        available_gas: u64,
    },
    /// The sender cannot cover the maximum charge.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        /// Maximum charge of the transaction.
        required: U256,
        /// Sender balance.
        available: U256,
    },
}

/// Failure of block execution or post-execution validation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Cumulative gas differs from the header.
    #[error("block gas used mismatch: {0}")]
    WrongBlockGas(GotExpected<u64>),
    /// Recomputed receipts root differs from the header.
    #[error("receipts root mismatch: {0}")]
    WrongReceiptsRoot(GotExpected<B256>),
    /// Combined receipt blooms differ from the header.
    #[error("logs bloom mismatch")]
    WrongLogsBloom(Box<GotExpected<Bloom>>),
    /// A transaction failed pre-execution validation.
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}
