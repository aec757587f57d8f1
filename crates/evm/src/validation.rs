use crate::{
    errors::TransactionError,
    gas::{intrinsic_gas, GasParams},
    state::State,
};
use alloy_primitives::U256;
use sable_primitives::{GotExpected, Header, Revision, Transaction};

/// Checks `txn` against the current state ahead of execution.
///
/// Execution itself assumes a validated transaction; every rejection here is
/// an expected failure the caller reports, not a bug.
pub fn validate_transaction<S: State>(
    txn: &Transaction,
    state: &S,
    header: &Header,
    revision: Revision,
    eos_evm_version: u64,
    available_gas: u64,
    gas_params: &GasParams,
) -> Result<(), TransactionError> {
    let base_fee_per_gas = header.base_fee_per_gas.unwrap_or_default();
    if txn.max_fee_per_gas < base_fee_per_gas {
        return Err(TransactionError::MaxFeeLessThanBase {
            max_fee_per_gas: txn.max_fee_per_gas,
            base_fee_per_gas,
        });
    }
    if txn.max_priority_fee_per_gas > txn.max_fee_per_gas {
        return Err(TransactionError::TipAboveFeeCap {
            max_priority_fee_per_gas: txn.max_priority_fee_per_gas,
            max_fee_per_gas: txn.max_fee_per_gas,
        });
    }

    let nonce = state.nonce(txn.from);
    if nonce != txn.nonce {
        return Err(TransactionError::WrongNonce(GotExpected {
            got: txn.nonce,
            expected: nonce,
        }));
    }

    let g0 = intrinsic_gas(txn, revision, eos_evm_version, gas_params);
    if g0 > txn.gas_limit as u128 {
        return Err(TransactionError::IntrinsicGas { intrinsic_gas: g0, gas_limit: txn.gas_limit });
    }

    if txn.gas_limit > available_gas {
        return Err(TransactionError::BlockGasLimitExceeded {
            gas_limit: txn.gas_limit,
            available_gas,
        });
    }

    let required = U256::from(txn.gas_limit) * txn.max_fee_per_gas +
        txn.value +
        U256::from(txn.total_data_gas()) * txn.max_fee_per_data_gas;
    let available = state.balance(txn.from);
    if available < required {
        return Err(TransactionError::InsufficientFunds { required, available });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockState;
    use alloy_primitives::Address;

    fn sender() -> Address {
        Address::with_last_byte(1)
    }

    fn valid_txn() -> Transaction {
        Transaction {
            to: Some(Address::with_last_byte(9)),
            gas_limit: 100_000,
            max_fee_per_gas: U256::from(10),
            max_priority_fee_per_gas: U256::from(2),
            from: sender(),
            ..Default::default()
        }
    }

    fn funded_state() -> MockState {
        MockState::default().with_account(sender(), 0, U256::from(10_000_000u64))
    }

    fn validate(
        txn: &Transaction,
        state: &MockState,
        header: &Header,
        available_gas: u64,
    ) -> Result<(), TransactionError> {
        validate_transaction(
            txn,
            state,
            header,
            Revision::London,
            0,
            available_gas,
            &GasParams::default(),
        )
    }

    #[test]
    fn accepts_a_well_formed_transaction() {
        let header = Header { base_fee_per_gas: Some(U256::from(5)), ..Default::default() };
        assert_eq!(validate(&valid_txn(), &funded_state(), &header, 1_000_000), Ok(()));
    }

    #[test]
    fn rejects_fee_cap_below_base_fee() {
        let header = Header { base_fee_per_gas: Some(U256::from(50)), ..Default::default() };
        assert!(matches!(
            validate(&valid_txn(), &funded_state(), &header, 1_000_000),
            Err(TransactionError::MaxFeeLessThanBase { .. })
        ));
    }

    #[test]
    fn rejects_tip_above_fee_cap() {
        let mut txn = valid_txn();
        txn.max_priority_fee_per_gas = U256::from(20);
        assert!(matches!(
            validate(&txn, &funded_state(), &Header::default(), 1_000_000),
            Err(TransactionError::TipAboveFeeCap { .. })
        ));
    }

    #[test]
    fn rejects_nonce_mismatch() {
        let mut txn = valid_txn();
        txn.nonce = 7;
        assert!(matches!(
            validate(&txn, &funded_state(), &Header::default(), 1_000_000),
            Err(TransactionError::WrongNonce(GotExpected { got: 7, expected: 0 }))
        ));
    }

    #[test]
    fn rejects_gas_limit_below_intrinsic_gas() {
        let mut txn = valid_txn();
        txn.gas_limit = 20_000;
        assert!(matches!(
            validate(&txn, &funded_state(), &Header::default(), 1_000_000),
            Err(TransactionError::IntrinsicGas { intrinsic_gas: 21_000, gas_limit: 20_000 })
        ));
    }

    #[test]
    fn rejects_gas_limit_above_block_remainder() {
        assert!(matches!(
            validate(&valid_txn(), &funded_state(), &Header::default(), 50_000),
            Err(TransactionError::BlockGasLimitExceeded { gas_limit: 100_000, available_gas: 50_000 })
        ));
    }

    #[test]
    fn rejects_insufficient_funds() {
        let state = MockState::default().with_account(sender(), 0, U256::from(100u64));
        assert!(matches!(
            validate(&valid_txn(), &state, &Header::default(), 1_000_000),
            Err(TransactionError::InsufficientFunds { .. })
        ));
    }
}
