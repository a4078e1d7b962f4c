use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use crate::{GatewayError, ItemId, ItemRecord, PendingTx};

/// Client interface for the inventory contract.
///
/// Holds the items, their copy counts and the per-account borrow records.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait InventoryLedger: Send + Sync {
    /// Returns the number of items ever created.
    async fn count_items(&self) -> Result<u64, GatewayError>;

    /// Returns the identifier of the item created at position `index`.
    ///
    /// Enumeration order is creation order on the ledger.
    async fn item_id_at(&self, index: u64) -> Result<ItemId, GatewayError>;

    /// Returns the stored fields of an item.
    async fn item(&self, id: ItemId) -> Result<ItemRecord, GatewayError>;

    /// Returns whether `account` currently holds a copy of `id`.
    async fn is_borrowed(&self, account: Address, id: ItemId) -> Result<bool, GatewayError>;

    /// Submits creation of a new item with `copies` available copies.
    ///
    /// Only the ledger-designated owner can succeed; other accounts see the
    /// transaction revert.
    async fn create_item(&self, name: String, copies: u64) -> Result<PendingTx, GatewayError>;

    /// Submits a borrow of one copy of `id` by the signing account.
    async fn borrow_item(&self, id: ItemId) -> Result<PendingTx, GatewayError>;

    /// Submits the return of a borrowed copy of `id`.
    async fn return_item(&self, id: ItemId) -> Result<PendingTx, GatewayError>;

    /// Submits withdrawal of the token balance the contract has collected.
    ///
    /// Owner only.
    async fn withdraw_operator_balance(&self) -> Result<PendingTx, GatewayError>;
}

/// Client interface for the value ledger (token plus its wrapper).
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait ValueLedger: Send + Sync {
    /// Returns the token balance of `account`.
    async fn balance_of(&self, account: Address) -> Result<U256, GatewayError>;

    /// Returns how much `spender` may pull from `owner`.
    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, GatewayError>;

    /// Submits an approval for `spender` to pull `amount` from the signing account.
    async fn approve(&self, spender: Address, amount: U256) -> Result<PendingTx, GatewayError>;

    /// Submits a wrap, paying `amount` of native value for the same amount of tokens.
    async fn wrap(&self, amount: U256) -> Result<PendingTx, GatewayError>;

    /// Submits an unwrap of `amount` tokens back into native value.
    ///
    /// The wrapper pulls the tokens, so an approval must be confirmed first.
    async fn unwrap(&self, amount: U256) -> Result<PendingTx, GatewayError>;
}

/// Reads the identity of the chain the gateway is connected to.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn chain_id(&self) -> Result<u64, GatewayError>;
}
