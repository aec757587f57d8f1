//! Gas charges, scaling, and intrinsic gas.

use alloy_primitives::U256;
use sable_primitives::{Revision, Transaction};

/// Base charge of any transaction.
pub const G_TRANSACTION: u64 = 21_000;

/// Per-byte charge for zero calldata bytes.
const G_TX_DATA_ZERO: u64 = 4;

/// Per-byte charge for non-zero calldata bytes since Istanbul (EIP-2028).
const G_TX_DATA_NON_ZERO_ISTANBUL: u64 = 16;

/// Per-byte charge for non-zero calldata bytes before Istanbul.
const G_TX_DATA_NON_ZERO_FRONTIER: u64 = 68;

/// Extra charge for contract-creating transactions since Homestead.
const G_TX_CREATE: u64 = 32_000;

/// Per-account charge of an EIP-2930 access list.
const G_ACCESS_LIST_ADDRESS: u64 = 2_400;

/// Per-storage-key charge of an EIP-2930 access list.
const G_ACCESS_LIST_STORAGE_KEY: u64 = 1_900;

/// Per-word initcode charge since Shanghai (EIP-3860).
const G_INITCODE_WORD: u64 = 2;

/// Gas refund divisor before London.
pub(crate) const MAX_REFUND_QUOTIENT_FRONTIER: u64 = 2;

/// Gas refund divisor since London (EIP-3529).
pub(crate) const MAX_REFUND_QUOTIENT_LONDON: u64 = 5;

/// Protocol gas charges that the variant protocol scales with the ratio of
/// the storage price to the current gas price.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GasParams {
    /// Charge for creating an account via a value transfer.
    pub g_txnewaccount: u64,
    /// Charge for creating an account inside a call.
    pub g_newaccount: u64,
    /// Charge for a contract-creating transaction.
    pub g_txcreate: u64,
    /// Per-byte charge for deployed code.
    pub g_codedeposit: u64,
    /// Charge for setting a storage slot from zero.
    pub g_sset: u64,
}

impl Default for GasParams {
    fn default() -> Self {
        Self {
            g_txnewaccount: 0,
            g_newaccount: 25_000,
            g_txcreate: G_TX_CREATE,
            g_codedeposit: 200,
            g_sset: 20_000,
        }
    }
}

impl GasParams {
    /// Scales every charge by `numerator / denominator`, rounding down and
    /// saturating at the integer range.
    pub fn apply_discount_factor(&self, numerator: U256, denominator: U256) -> Self {
        let scale = |value: u64| {
            u64::try_from(U256::from(value) * numerator / denominator).unwrap_or(u64::MAX)
        };
        Self {
            g_txnewaccount: scale(self.g_txnewaccount),
            g_newaccount: scale(self.g_newaccount),
            g_txcreate: scale(self.g_txcreate),
            g_codedeposit: scale(self.g_codedeposit),
            g_sset: scale(self.g_sset),
        }
    }
}

/// Network gas price configuration of the variant protocol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GasPrices {
    /// Price covering fixed per-transaction overhead.
    pub overhead_price: u64,
    /// Price of persistent storage, the numerator of gas parameter scaling.
    pub storage_price: u64,
}

/// Gas charged before any bytecode runs.
///
/// Covers the base transaction charge, calldata, access lists, contract
/// creation (using the scaled creation charge under the variant protocol)
/// and initcode metering. Returned as `u128`: the value only fits `u64` for
/// transactions that already passed gas-limit validation.
pub fn intrinsic_gas(
    txn: &Transaction,
    revision: Revision,
    eos_evm_version: u64,
    gas_params: &GasParams,
) -> u128 {
    let mut gas = G_TRANSACTION as u128;

    if txn.to.is_none() && revision >= Revision::Homestead {
        let create = if eos_evm_version >= 1 { gas_params.g_txcreate } else { G_TX_CREATE };
        gas += create as u128;
    }

    let zero_bytes = txn.input.iter().filter(|byte| **byte == 0).count() as u128;
    let non_zero_bytes = txn.input.len() as u128 - zero_bytes;
    let non_zero_cost = if revision >= Revision::Istanbul {
        G_TX_DATA_NON_ZERO_ISTANBUL
    } else {
        G_TX_DATA_NON_ZERO_FRONTIER
    };
    gas += zero_bytes * G_TX_DATA_ZERO as u128 + non_zero_bytes * non_zero_cost as u128;

    if txn.to.is_none() && revision >= Revision::Shanghai {
        let initcode_words = (txn.input.len() as u128).div_ceil(32);
        gas += initcode_words * G_INITCODE_WORD as u128;
    }

    gas += txn.access_list.len() as u128 * G_ACCESS_LIST_ADDRESS as u128;
    let storage_keys: u128 =
        txn.access_list.iter().map(|entry| entry.storage_keys.len() as u128).sum();
    gas += storage_keys * G_ACCESS_LIST_STORAGE_KEY as u128;

    gas
}
