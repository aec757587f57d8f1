use crate::{
    errors::ValidationError,
    evm::{CallResult, Evm, VmStatus},
    gas::{intrinsic_gas, GasParams, GasPrices, G_TRANSACTION},
    refund::{gas_refund_v3, GasSummary, RefundSchedule},
    rule_set::RuleSet,
    state::State,
    validation::validate_transaction,
};
use alloy_primitives::{Address, Bloom, U256};
use core::mem;
use sable_primitives::{
    logs_bloom, receipts_root, Block, GotExpected, Receipt, Revision, Transaction,
};
use tracing::{debug, trace};

/// Outcome of one executed transaction: the gas and fee accounting plus the
/// raw interpreter result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionOutcome {
    /// Gas and fee totals.
    pub gas: GasSummary,
    /// The low-level interpreter result.
    pub call: CallResult,
}

/// Executes the transactions of one block against a journalled [`State`].
///
/// The processor lives for one block: it accumulates the cumulative gas,
/// credits fees, assembles receipts, and finally validates gas, receipts
/// root and logs bloom against the header before committing.
#[derive(Debug)]
pub struct ExecutionProcessor<'a, S, E, R> {
    state: &'a mut S,
    rule_set: &'a R,
    evm: E,
    block: &'a Block,
    beneficiary: Address,
    gas_prices: GasPrices,
    cumulative_gas_used: u64,
}

impl<'a, S, E, R> ExecutionProcessor<'a, S, E, R>
where
    S: State,
    E: Evm<S>,
    R: RuleSet<S>,
{
    /// Binds the processor to one block.
    pub fn new(
        block: &'a Block,
        rule_set: &'a R,
        state: &'a mut S,
        evm: E,
        gas_prices: GasPrices,
    ) -> Self {
        let beneficiary = rule_set.beneficiary(&block.header);
        Self { state, rule_set, evm, block, beneficiary, gas_prices, cumulative_gas_used: 0 }
    }

    /// Gas still available to transactions of this block.
    pub fn available_gas(&self) -> u64 {
        self.block.header.gas_limit - self.cumulative_gas_used
    }

    /// Gas consumed by the transactions executed so far.
    pub const fn cumulative_gas_used(&self) -> u64 {
        self.cumulative_gas_used
    }

    /// The bound interpreter.
    pub const fn evm(&self) -> &E {
        &self.evm
    }

    /// The bound interpreter, mutably.
    pub fn evm_mut(&mut self) -> &mut E {
        &mut self.evm
    }

    /// The shared state.
    pub fn state(&self) -> &S {
        self.state
    }

    /// The shared state, mutably.
    pub fn state_mut(&mut self) -> &mut S {
        self.state
    }

    /// Executes one transaction and fills `receipt`.
    ///
    /// The transaction must already have passed [`validate_transaction`]
    /// against the current state; violating that precondition is a bug, not
    /// a runtime error.
    pub fn execute_transaction(
        &mut self,
        txn: &Transaction,
        receipt: &mut Receipt,
        gas_params: &GasParams,
    ) -> TransactionOutcome {
        debug_assert!(validate_transaction(
            txn,
            self.state,
            &self.block.header,
            self.evm.revision(),
            self.evm.eos_evm_version(),
            self.available_gas(),
            gas_params,
        )
        .is_ok());

        // receipt.logs may have capacity worth reusing
        mem::swap(&mut receipt.logs, self.state.logs_mut());
        self.state.clear_journal_and_substate();

        self.state.access_account(txn.from);
        if let Some(to) = txn.to {
            self.state.access_account(to);
            // the EVM itself increments the nonce for contract creation
            self.state.set_nonce(txn.from, txn.nonce + 1);
        }
        for entry in &txn.access_list {
            self.state.access_account(entry.account);
            for key in &entry.storage_keys {
                self.state.access_storage(entry.account, *key);
            }
        }

        let revision = self.evm.revision();
        if revision >= Revision::Shanghai {
            // EIP-3651: warm coinbase
            self.state.access_account(self.beneficiary);
        }

        let base_fee_per_gas = self.block.header.base_fee_per_gas.unwrap_or_default();
        let effective_gas_price = txn.effective_gas_price(base_fee_per_gas);
        self.state
            .subtract_from_balance(txn.from, U256::from(txn.gas_limit) * effective_gas_price);

        // EIP-4844 data gas
        let data_gas_price = self.block.header.data_gas_price().unwrap_or_default();
        self.state
            .subtract_from_balance(txn.from, U256::from(txn.total_data_gas()) * data_gas_price);

        let eos_evm_version = self.evm.eos_evm_version();
        let schedule = RefundSchedule::new(eos_evm_version, revision);

        let mut inclusion_price = U256::ZERO;
        let scaled_gas_params = if matches!(schedule, RefundSchedule::Repriced) {
            inclusion_price = core::cmp::min(
                txn.max_priority_fee_per_gas,
                txn.max_fee_per_gas - base_fee_per_gas,
            );
            let denominator = base_fee_per_gas + inclusion_price;
            assert!(!denominator.is_zero(), "gas parameter scaling requires a non-zero gas price");
            gas_params
                .apply_discount_factor(U256::from(self.gas_prices.storage_price), denominator)
        } else {
            gas_params.clone()
        };

        let g0 = intrinsic_gas(txn, revision, eos_evm_version, &scaled_gas_params);
        // holds for validated transactions
        assert!(g0 <= u128::from(u64::MAX));

        let vm_res =
            self.evm.execute(self.state, txn, txn.gas_limit - g0 as u64, &scaled_gas_params);

        let price = if self.rule_set.is_trust() {
            effective_gas_price
        } else {
            txn.priority_fee_per_gas(base_fee_per_gas)
        };

        let gas = match schedule {
            RefundSchedule::Capped { .. } | RefundSchedule::Floored => {
                let gas_left = self.refund_gas(schedule, txn, vm_res.gas_left, vm_res.gas_refund);
                let gas_used = txn.gas_limit - gas_left;
                let final_fee = price * U256::from(gas_used);
                self.state.add_to_balance(self.beneficiary, final_fee);
                GasSummary {
                    gas_used,
                    gas_left,
                    final_fee,
                    inclusion_fee: U256::ZERO,
                    storage_fee: U256::ZERO,
                }
            }
            RefundSchedule::Repriced => {
                let gas = gas_refund_v3(eos_evm_version, &vm_res, txn, price, inclusion_price);
                self.state.add_to_balance(self.beneficiary, gas.final_fee);
                self.state.add_to_balance(txn.from, price * U256::from(gas.gas_left));
                gas
            }
        };

        self.state.destruct_suicides();
        if revision >= Revision::SpuriousDragon {
            self.state.destruct_touched_dead();
        }
        self.state.finalize_transaction();

        self.cumulative_gas_used += gas.gas_used;

        receipt.tx_type = txn.tx_type;
        receipt.success = vm_res.status == VmStatus::Success;
        receipt.cumulative_gas_used = self.cumulative_gas_used;
        receipt.bloom = logs_bloom(self.state.logs_mut().iter());
        mem::swap(&mut receipt.logs, self.state.logs_mut());

        trace!(
            target: "evm::processor",
            gas_used = gas.gas_used,
            success = receipt.success,
            "executed transaction"
        );

        TransactionOutcome { gas, call: vm_res }
    }

    /// Pre-repricing refund handling: applies the schedule to the refund
    /// counter, credits the unused balance back to the sender, and returns
    /// the final gas left.
    fn refund_gas(
        &mut self,
        schedule: RefundSchedule,
        txn: &Transaction,
        gas_left: u64,
        gas_refund: u64,
    ) -> u64 {
        let mut gas_left = gas_left;
        match schedule {
            RefundSchedule::Capped { quotient } => {
                let max_refund = (txn.gas_limit - gas_left) / quotient;
                gas_left += core::cmp::min(gas_refund, max_refund);
            }
            RefundSchedule::Floored => {
                gas_left += gas_refund;
                let refundable = txn.gas_limit - G_TRANSACTION;
                if gas_left > refundable {
                    gas_left = refundable;
                }
            }
            RefundSchedule::Repriced => unreachable!("repriced refunds are fee-split"),
        }

        let base_fee_per_gas = self.block.header.base_fee_per_gas.unwrap_or_default();
        let effective_gas_price = txn.effective_gas_price(base_fee_per_gas);
        self.state.add_to_balance(txn.from, U256::from(gas_left) * effective_gas_price);
        gas_left
    }

    /// Executes every transaction of the block, filling `receipts` in order.
    ///
    /// No post-execution validation is performed; the first transaction that
    /// fails validation aborts the block.
    pub fn execute_block_no_post_validation(
        &mut self,
        receipts: &mut Vec<Receipt>,
        gas_params: &GasParams,
    ) -> Result<(), ValidationError> {
        let block = self.block;
        debug!(
            target: "evm::processor",
            number = block.header.number,
            transactions = block.transactions.len(),
            "executing block"
        );

        if !self.rule_set.is_trust() && self.rule_set.is_dao_block(block.header.number) {
            self.rule_set.transfer_dao_balances(self.state);
        }

        self.cumulative_gas_used = 0;
        receipts.clear();
        receipts.resize_with(block.transactions.len(), Receipt::default);

        for (txn, receipt) in block.transactions.iter().zip(receipts.iter_mut()) {
            if self.rule_set.is_reserved_address(txn.from) {
                // mirror the bridge contract's initial view of the account
                self.state.set_balance(
                    txn.from,
                    txn.value + U256::from(txn.gas_limit) * txn.max_fee_per_gas,
                );
                self.state.set_nonce(txn.from, txn.nonce);
            }
            validate_transaction(
                txn,
                self.state,
                &block.header,
                self.evm.revision(),
                self.evm.eos_evm_version(),
                self.available_gas(),
                gas_params,
            )?;
            self.execute_transaction(txn, receipt, gas_params);
            self.state.reset_reserved_objects();
        }

        self.rule_set.finalize(self.state, block);

        if self.evm.revision() >= Revision::SpuriousDragon {
            self.state.destruct_touched_dead();
        }

        Ok(())
    }

    /// Executes the block, validates cumulative gas, receipts root
    /// (Byzantium onwards) and logs bloom against the header, and commits
    /// the state at the block number.
    ///
    /// Trust rule sets skip the header comparisons: their blocks arrive
    /// validated by an external authority.
    pub fn execute_and_write_block(
        &mut self,
        receipts: &mut Vec<Receipt>,
        gas_params: &GasParams,
    ) -> Result<(), ValidationError> {
        self.execute_block_no_post_validation(receipts, gas_params)?;

        let header = &self.block.header;
        let trust = self.rule_set.is_trust();

        if !trust && self.cumulative_gas_used != header.gas_used {
            return Err(ValidationError::WrongBlockGas(GotExpected {
                got: self.cumulative_gas_used,
                expected: header.gas_used,
            }));
        }

        if !trust && self.evm.revision() >= Revision::Byzantium {
            let root = receipts_root(receipts.as_slice());
            if root != header.receipts_root {
                return Err(ValidationError::WrongReceiptsRoot(GotExpected {
                    got: root,
                    expected: header.receipts_root,
                }));
            }
        }

        let mut bloom = Bloom::ZERO;
        for receipt in &*receipts {
            bloom |= receipt.bloom;
        }
        if !trust && bloom != header.logs_bloom {
            return Err(ValidationError::WrongLogsBloom(Box::new(GotExpected {
                got: bloom,
                expected: header.logs_bloom,
            })));
        }

        self.state.write_to_db(header.number);
        Ok(())
    }
}
