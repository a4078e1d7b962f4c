use std::fmt;

use alloy::{
    contract::Error as ContractError,
    network::{Ethereum, EthereumWallet, ReceiptResponse},
    providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use async_trait::async_trait;
use biblio_config::ContractParams;
use biblio_ledger::{
    Address, ChainClient, GatewayError, InventoryLedger, ItemId, ItemRecord, PendingTx,
    TxOutcome, TxReceipt, ValueLedger, U256,
};
use tracing::{debug, warn};

use crate::{
    contracts::{
        LibToken::LibTokenInstance, LibWrapper::LibWrapperInstance, Library::LibraryInstance,
    },
    errors::{map_contract_error, map_pending_error, map_rpc_error},
    LibToken, LibWrapper, Library,
};

/// Gateway to the deployed contracts over a JSON-RPC provider.
#[derive(Clone)]
pub struct EvmLedger {
    provider: DynProvider,
    library: LibraryInstance<DynProvider>,
    token: LibTokenInstance<DynProvider>,
    wrapper: LibWrapperInstance<DynProvider>,
}

impl EvmLedger {
    pub fn new(provider: DynProvider, params: &ContractParams) -> Self {
        Self {
            library: Library::new(params.library_address(), provider.clone()),
            token: LibToken::new(params.token_address(), provider.clone()),
            wrapper: LibWrapper::new(params.wrapper_address(), provider.clone()),
            provider,
        }
    }

    /// Connects over HTTP, signing writes with `signer`.
    pub fn connect_http(url: Url, signer: PrivateKeySigner, params: &ContractParams) -> Self {
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();
        Self::new(provider, params)
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }
}

impl fmt::Debug for EvmLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvmLedger")
            .field("library", self.library.address())
            .field("token", self.token.address())
            .field("wrapper", self.wrapper.address())
            .finish_non_exhaustive()
    }
}

/// Turns a broadcast result into a handle resolving on the receipt.
fn track(
    sent: Result<PendingTransactionBuilder<Ethereum>, ContractError>,
) -> Result<PendingTx, GatewayError> {
    let pending = sent.map_err(map_contract_error)?;
    let tx_hash = *pending.tx_hash();
    debug!(%tx_hash, "transaction broadcast");

    Ok(PendingTx::new(tx_hash, async move {
        let receipt = pending.get_receipt().await.map_err(map_pending_error)?;
        if receipt.status() {
            Ok(TxOutcome::Confirmed(TxReceipt {
                tx_hash,
                block_number: receipt.block_number(),
            }))
        } else {
            warn!(%tx_hash, "transaction reverted on inclusion");
            Ok(TxOutcome::Reverted {
                tx_hash,
                reason: "transaction reverted".to_string(),
            })
        }
    }))
}

fn to_u64(value: U256, what: &str) -> Result<u64, GatewayError> {
    u64::try_from(value).map_err(|_| GatewayError::rejected(format!("{what} out of range")))
}

#[async_trait]
impl InventoryLedger for EvmLedger {
    async fn count_items(&self) -> Result<u64, GatewayError> {
        let count = self
            .library
            .viewAllBooksCount()
            .call()
            .await
            .map_err(map_contract_error)?;
        to_u64(count, "item count")
    }

    async fn item_id_at(&self, index: u64) -> Result<ItemId, GatewayError> {
        let id = self
            .library
            .allBookIDs(U256::from(index))
            .call()
            .await
            .map_err(map_contract_error)?;
        Ok(ItemId::new(id))
    }

    async fn item(&self, id: ItemId) -> Result<ItemRecord, GatewayError> {
        let book = self
            .library
            .books(id.as_b256())
            .call()
            .await
            .map_err(map_contract_error)?;
        Ok(ItemRecord {
            name: book.name,
            available_copies: to_u64(book.availableCopiesCount, "copy count")?,
        })
    }

    async fn is_borrowed(&self, account: Address, id: ItemId) -> Result<bool, GatewayError> {
        self.library
            .borrowedBooks(account, id.as_b256())
            .call()
            .await
            .map_err(map_contract_error)
    }

    async fn create_item(&self, name: String, copies: u64) -> Result<PendingTx, GatewayError> {
        track(
            self.library
                .createBook(U256::from(copies), name)
                .send()
                .await,
        )
    }

    async fn borrow_item(&self, id: ItemId) -> Result<PendingTx, GatewayError> {
        track(self.library.borrowBook(id.as_b256()).send().await)
    }

    async fn return_item(&self, id: ItemId) -> Result<PendingTx, GatewayError> {
        track(self.library.returnBook(id.as_b256()).send().await)
    }

    async fn withdraw_operator_balance(&self) -> Result<PendingTx, GatewayError> {
        track(self.library.withdrawLibraryBalance().send().await)
    }
}

#[async_trait]
impl ValueLedger for EvmLedger {
    async fn balance_of(&self, account: Address) -> Result<U256, GatewayError> {
        self.token
            .balanceOf(account)
            .call()
            .await
            .map_err(map_contract_error)
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, GatewayError> {
        self.token
            .allowance(owner, spender)
            .call()
            .await
            .map_err(map_contract_error)
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<PendingTx, GatewayError> {
        track(self.token.approve(spender, amount).send().await)
    }

    async fn wrap(&self, amount: U256) -> Result<PendingTx, GatewayError> {
        track(self.wrapper.wrap().value(amount).send().await)
    }

    async fn unwrap(&self, amount: U256) -> Result<PendingTx, GatewayError> {
        track(self.wrapper.unwrap(amount).send().await)
    }
}

#[async_trait]
impl ChainClient for EvmLedger {
    async fn chain_id(&self) -> Result<u64, GatewayError> {
        self.provider.get_chain_id().await.map_err(map_rpc_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_u64_rejects_overflow() {
        assert_eq!(to_u64(U256::from(7u64), "copy count"), Ok(7));
        assert_eq!(
            to_u64(U256::MAX, "copy count"),
            Err(GatewayError::rejected("copy count out of range"))
        );
    }
}
