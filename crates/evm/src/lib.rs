//! Block execution for the sable node.
//!
//! [`ExecutionProcessor`] drives the transactions of one block against a
//! journalled [`State`], delegating interpretation to an [`Evm`]
//! implementation and protocol policy to a [`RuleSet`]. It owns the
//! consensus-critical arithmetic around gas: intrinsic gas, the fee split
//! between sender and beneficiary, and the refund regimes of the variant
//! protocol versions.

mod errors;
mod evm;
mod gas;
mod processor;
mod refund;
mod rule_set;
mod state;
mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use errors::{TransactionError, ValidationError};
pub use evm::{CallResult, Evm, VmStatus};
pub use gas::{intrinsic_gas, GasParams, GasPrices, G_TRANSACTION};
pub use processor::{ExecutionProcessor, TransactionOutcome};
pub use refund::{gas_refund_v3, GasSummary, RefundSchedule};
pub use rule_set::RuleSet;
pub use state::State;
pub use validation::validate_transaction;
