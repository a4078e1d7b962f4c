//! Default values used when the config file leaves a field unset.

use alloy_primitives::U256;

/// Fixed price of one borrow, 1 token with 18 decimals.
pub const DEFAULT_BORROW_PRICE: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Default ms to wait between ledger log polls.
pub const DEFAULT_EVENT_POLL_MS: u64 = 2_000;

/// Chain id assumed before a session reports its own.
pub const DEFAULT_CHAIN_ID: u64 = 1;
