//! Call surface for the inventory and value ledgers.
//!
//! The traits here are the only way the rest of the workspace talks to the
//! remote contracts. Reads always round-trip to the ledger; writes hand back a
//! [`PendingTx`] that resolves once the ledger has confirmed or reverted the
//! transaction.

mod errors;
mod events;
#[cfg(any(test, feature = "test-utils"))]
mod memory;
mod pending;
mod traits;
mod types;

pub use errors::GatewayError;
pub use events::{EventHandler, EventKind, EventRouter, LedgerEvent, SubscriptionId};
#[cfg(any(test, feature = "test-utils"))]
pub use memory::{CallCounts, InMemoryLedger, MemoryLedgerParams};
pub use pending::PendingTx;
#[cfg(any(test, feature = "test-utils"))]
pub use traits::{MockChainClient, MockInventoryLedger, MockValueLedger};
pub use traits::{ChainClient, InventoryLedger, ValueLedger};
pub use types::{Balances, Item, ItemId, ItemRecord, TxOutcome, TxReceipt};

pub use alloy_primitives::{Address, TxHash, B256, U256};
