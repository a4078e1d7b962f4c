//! Keeps the published view of the ledger consistent with the ledger itself.
//!
//! The [`Reconciler`] owns a single [`ViewState`] and is its only writer.
//! Readers observe it through a `watch` channel obtained from the
//! [`ReconcilerHandle`]. Writes go through the transaction orchestrator and
//! are followed by a full re-fetch of whatever they may have changed.

mod error;
mod handle;
mod reconciler;
mod state;
mod task;

pub use error::ReconcileError;
pub use handle::{ReconcilerBuilder, ReconcilerHandle};
pub use reconciler::Reconciler;
pub use state::{Notice, OperationState, Section, SectionStates, Session, SessionEvent, ViewState};
