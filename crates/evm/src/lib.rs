//! Ledger gateway backed by the deployed library, token and wrapper contracts.

mod contracts;
mod errors;
mod ledger;
mod poller;

pub use contracts::{LibToken, LibWrapper, Library};
pub use errors::{map_contract_error, map_rpc_error, revert_reason};
pub use ledger::EvmLedger;
pub use poller::{decode_log, LedgerEventPoller};
