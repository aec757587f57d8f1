//! The refund regimes of the variant protocol.

use crate::{
    evm::CallResult,
    gas::{G_TRANSACTION, MAX_REFUND_QUOTIENT_FRONTIER, MAX_REFUND_QUOTIENT_LONDON},
};
use alloy_primitives::U256;
use sable_primitives::{Revision, Transaction};

/// Refund semantics selected by the protocol version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefundSchedule {
    /// The refund is capped at the consumed gas divided by the fork
    /// quotient.
    Capped {
        /// Divisor applied to the consumed gas.
        quotient: u64,
    },
    /// The refund applies in full, but the billed gas never drops below the
    /// base transaction charge.
    Floored,
    /// Fee-split accounting: the refund applies in full, the billed gas is
    /// floored, and the final fee is decomposed into inclusion and
    /// storage-covering parts.
    Repriced,
}

impl RefundSchedule {
    /// The schedule active for a protocol version at a revision.
    pub fn new(eos_evm_version: u64, revision: Revision) -> Self {
        match eos_evm_version {
            0 | 1 => {
                let quotient = if revision >= Revision::London {
                    MAX_REFUND_QUOTIENT_LONDON
                } else {
                    MAX_REFUND_QUOTIENT_FRONTIER
                };
                Self::Capped { quotient }
            }
            2 => Self::Floored,
            _ => Self::Repriced,
        }
    }
}

/// Gas and fee totals of one executed transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GasSummary {
    /// Gas billed to the sender.
    pub gas_used: u64,
    /// Gas returned to the sender after refunds.
    pub gas_left: u64,
    /// Fee credited to the beneficiary.
    pub final_fee: U256,
    /// Portion of the fee covering block inclusion.
    pub inclusion_fee: U256,
    /// Portion of the fee covering storage and overhead.
    pub storage_fee: U256,
}

/// The repriced refund scheme of protocol version 3.
///
/// Refund counters apply in full; the billed gas is floored at the base
/// transaction charge. The beneficiary fee is priced at `price` and split
/// into the inclusion part, priced at `inclusion_price`, and the remainder
/// covering storage and overhead at the scaled charges.
pub fn gas_refund_v3(
    eos_evm_version: u64,
    vm_res: &CallResult,
    txn: &Transaction,
    price: U256,
    inclusion_price: U256,
) -> GasSummary {
    debug_assert!(eos_evm_version >= 3);

    let mut gas_left = vm_res.gas_left.saturating_add(vm_res.gas_refund);
    let refundable = txn.gas_limit - G_TRANSACTION;
    if gas_left > refundable {
        gas_left = refundable;
    }
    let gas_used = txn.gas_limit - gas_left;

    let final_fee = price * U256::from(gas_used);
    let inclusion_fee = inclusion_price * U256::from(gas_used);
    GasSummary {
        gas_used,
        gas_left,
        final_fee,
        inclusion_fee,
        storage_fee: final_fee - inclusion_fee,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evm::VmStatus;
    use alloy_primitives::Bytes;

    fn call_result(gas_left: u64, gas_refund: u64) -> CallResult {
        CallResult { status: VmStatus::Success, gas_left, gas_refund, output: Bytes::new() }
    }

    #[test]
    fn schedule_selection() {
        assert_eq!(
            RefundSchedule::new(0, Revision::Berlin),
            RefundSchedule::Capped { quotient: 2 }
        );
        assert_eq!(
            RefundSchedule::new(1, Revision::London),
            RefundSchedule::Capped { quotient: 5 }
        );
        assert_eq!(RefundSchedule::new(2, Revision::London), RefundSchedule::Floored);
        assert_eq!(RefundSchedule::new(3, Revision::London), RefundSchedule::Repriced);
        assert_eq!(RefundSchedule::new(4, Revision::London), RefundSchedule::Repriced);
    }

    #[test]
    fn repriced_refund_applies_in_full() {
        let txn = Transaction { gas_limit: 100_000, ..Default::default() };
        let summary =
            gas_refund_v3(3, &call_result(40_000, 5_000), &txn, U256::from(16), U256::from(6));
        assert_eq!(summary.gas_left, 45_000);
        assert_eq!(summary.gas_used, 55_000);
        assert_eq!(summary.final_fee, U256::from(16u64 * 55_000));
        assert_eq!(summary.inclusion_fee, U256::from(6u64 * 55_000));
        assert_eq!(summary.storage_fee, U256::from(10u64 * 55_000));
    }

    #[test]
    fn repriced_refund_floors_billed_gas() {
        let txn = Transaction { gas_limit: 100_000, ..Default::default() };
        let summary =
            gas_refund_v3(3, &call_result(70_000, 50_000), &txn, U256::from(1), U256::ZERO);
        assert_eq!(summary.gas_used, G_TRANSACTION);
        assert_eq!(summary.gas_left, 100_000 - G_TRANSACTION);
    }
}
