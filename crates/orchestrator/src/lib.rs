//! Sequences ledger writes, including the two-phase approve-then-act protocol.

mod errors;
mod orchestrator;
mod precondition;

pub use errors::{OrchestratorError, TxPhase};
pub use orchestrator::{ActionReceipt, TxOrchestrator};
pub use precondition::{check_amount, check_borrowable, check_new_item};
