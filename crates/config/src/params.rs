use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::defaults::DEFAULT_BORROW_PRICE;

/// Addresses and prices of the deployed contracts.
///
/// These must match the deployment the gateway talks to, otherwise every
/// write reverts or hits the wrong contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractParams {
    /// Inventory contract (items, copies, borrow records).
    library_address: Address,

    /// Utility token paid on borrow.
    token_address: Address,

    /// Wrapper that mints tokens for native value and burns them on unwrap.
    wrapper_address: Address,

    /// Token amount charged per borrow.
    #[serde(default = "default_borrow_price")]
    borrow_price: U256,
}

fn default_borrow_price() -> U256 {
    DEFAULT_BORROW_PRICE
}

impl ContractParams {
    pub fn new(
        library_address: Address,
        token_address: Address,
        wrapper_address: Address,
        borrow_price: U256,
    ) -> Self {
        Self {
            library_address,
            token_address,
            wrapper_address,
            borrow_price,
        }
    }

    /// Returns the inventory contract address, also the spender approved on borrow.
    pub fn library_address(&self) -> Address {
        self.library_address
    }

    pub fn token_address(&self) -> Address {
        self.token_address
    }

    /// Returns the wrapper address, also the spender approved on unwrap.
    pub fn wrapper_address(&self) -> Address {
        self.wrapper_address
    }

    pub fn borrow_price(&self) -> U256 {
        self.borrow_price
    }
}
