//! Stateful in-memory ledger used as a test double.
//!
//! Applies the same rules the contracts enforce (owner-only creation,
//! allowance-gated borrow and unwrap, one copy per account) so tests can
//! observe realistic post-transaction state, and counts every call so tests
//! can assert which writes were attempted.

use std::{
    collections::{HashMap, HashSet},
    mem,
};

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    ChainClient, GatewayError, InventoryLedger, ItemId, ItemRecord, LedgerEvent, PendingTx,
    TxOutcome, TxReceipt, ValueLedger,
};

/// Addresses and prices the in-memory contracts are wired with.
#[derive(Debug, Clone, Copy)]
pub struct MemoryLedgerParams {
    pub owner: Address,
    pub inventory_address: Address,
    pub wrapper_address: Address,
    pub borrow_price: U256,
    pub chain_id: u64,
}

/// Number of calls made against each gateway operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub reads: usize,
    pub is_borrowed: usize,
    pub create_item: usize,
    pub borrow_item: usize,
    pub return_item: usize,
    pub withdraw: usize,
    pub approve: usize,
    pub wrap: usize,
    pub unwrap: usize,
}

impl CallCounts {
    /// Total number of write submissions.
    pub fn writes(&self) -> usize {
        self.create_item
            + self.borrow_item
            + self.return_item
            + self.withdraw
            + self.approve
            + self.wrap
            + self.unwrap
    }
}

#[derive(Debug)]
struct LedgerState {
    signer: Address,
    items: Vec<(ItemId, ItemRecord)>,
    borrowed: HashSet<(Address, ItemId)>,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    events: Vec<LedgerEvent>,
    calls: CallCounts,
    next_tx: u64,
    reads_unreachable: bool,
    writes_unreachable: bool,
    revert_next_approval: Option<String>,
    failing_borrow_queries: HashSet<ItemId>,
}

/// In-memory implementation of every gateway trait.
#[derive(Debug)]
pub struct InMemoryLedger {
    params: MemoryLedgerParams,
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    /// Creates an empty ledger where `params.owner` is also the signing account.
    pub fn new(params: MemoryLedgerParams) -> Self {
        Self {
            params,
            state: Mutex::new(LedgerState {
                signer: params.owner,
                items: Vec::new(),
                borrowed: HashSet::new(),
                balances: HashMap::new(),
                allowances: HashMap::new(),
                events: Vec::new(),
                calls: CallCounts::default(),
                next_tx: 1,
                reads_unreachable: false,
                writes_unreachable: false,
                revert_next_approval: None,
                failing_borrow_queries: HashSet::new(),
            }),
        }
    }

    pub fn params(&self) -> &MemoryLedgerParams {
        &self.params
    }

    /// Seeds an item directly, bypassing the owner check and call counters.
    pub fn seed_item(&self, id: ItemId, name: &str, copies: u64) {
        self.state.lock().items.push((
            id,
            ItemRecord {
                name: name.to_string(),
                available_copies: copies,
            },
        ));
    }

    /// Seeds a borrow record directly.
    pub fn seed_borrow(&self, account: Address, id: ItemId) {
        self.state.lock().borrowed.insert((account, id));
    }

    pub fn set_balance(&self, account: Address, amount: U256) {
        self.state.lock().balances.insert(account, amount);
    }

    /// Switches the account that signs subsequent writes.
    pub fn set_signer(&self, signer: Address) {
        self.state.lock().signer = signer;
    }

    /// Makes every read fail with [`GatewayError::Unreachable`].
    pub fn set_reads_unreachable(&self, unreachable: bool) {
        self.state.lock().reads_unreachable = unreachable;
    }

    /// Makes every write submission fail with [`GatewayError::Unreachable`].
    pub fn set_writes_unreachable(&self, unreachable: bool) {
        self.state.lock().writes_unreachable = unreachable;
    }

    /// Makes the next approval revert with `reason` at confirmation.
    pub fn revert_next_approval(&self, reason: &str) {
        self.state.lock().revert_next_approval = Some(reason.to_string());
    }

    /// Makes `is_borrowed` queries for `id` fail.
    pub fn fail_borrow_query(&self, id: ItemId) {
        self.state.lock().failing_borrow_queries.insert(id);
    }

    pub fn calls(&self) -> CallCounts {
        self.state.lock().calls
    }

    pub fn record(&self, id: ItemId) -> Option<ItemRecord> {
        self.state
            .lock()
            .items
            .iter()
            .find(|(item_id, _)| *item_id == id)
            .map(|(_, record)| record.clone())
    }

    /// Returns and clears the events emitted so far.
    pub fn take_events(&self) -> Vec<LedgerEvent> {
        mem::take(&mut self.state.lock().events)
    }

    fn read<T>(
        &self,
        f: impl FnOnce(&LedgerState) -> Result<T, GatewayError>,
    ) -> Result<T, GatewayError> {
        let mut state = self.state.lock();
        state.calls.reads += 1;
        if state.reads_unreachable {
            return Err(GatewayError::unreachable("in-memory ledger offline"));
        }
        f(&*state)
    }

    /// Applies a write and wraps its outcome into an already-resolved handle.
    fn write(
        &self,
        count: impl FnOnce(&mut CallCounts),
        apply: impl FnOnce(&Self, &mut LedgerState) -> Result<(), String>,
    ) -> Result<PendingTx, GatewayError> {
        let mut state = self.state.lock();
        count(&mut state.calls);
        if state.writes_unreachable {
            return Err(GatewayError::unreachable("in-memory ledger offline"));
        }

        let tx_hash = TxHash::left_padding_from(&state.next_tx.to_be_bytes());
        state.next_tx += 1;

        let outcome = match apply(self, &mut *state) {
            Ok(()) => TxOutcome::Confirmed(TxReceipt {
                tx_hash,
                block_number: Some(state.next_tx),
            }),
            Err(reason) => TxOutcome::Reverted { tx_hash, reason },
        };
        Ok(PendingTx::resolved(outcome))
    }
}

impl LedgerState {
    fn balance(&self, account: &Address) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn item_mut(&mut self, id: ItemId) -> Result<&mut ItemRecord, String> {
        self.items
            .iter_mut()
            .find(|(item_id, _)| *item_id == id)
            .map(|(_, record)| record)
            .ok_or_else(|| "unknown item".to_string())
    }

    /// Moves `amount` from `owner` to `recipient` using the allowance of `spender`.
    fn pull(
        &mut self,
        owner: Address,
        spender: Address,
        recipient: Option<Address>,
        amount: U256,
    ) -> Result<(), String> {
        let allowance = self.allowance(owner, spender);
        if allowance < amount {
            return Err("insufficient allowance".to_string());
        }
        let balance = self.balance(&owner);
        if balance < amount {
            return Err("insufficient funds".to_string());
        }
        self.allowances.insert((owner, spender), allowance - amount);
        self.balances.insert(owner, balance - amount);
        if let Some(recipient) = recipient {
            let credited = self.balance(&recipient) + amount;
            self.balances.insert(recipient, credited);
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryLedger for InMemoryLedger {
    async fn count_items(&self) -> Result<u64, GatewayError> {
        self.read(|state| Ok(state.items.len() as u64))
    }

    async fn item_id_at(&self, index: u64) -> Result<ItemId, GatewayError> {
        self.read(|state| {
            state
                .items
                .get(index as usize)
                .map(|(id, _)| *id)
                .ok_or_else(|| GatewayError::rejected("index out of bounds"))
        })
    }

    async fn item(&self, id: ItemId) -> Result<ItemRecord, GatewayError> {
        self.read(|state| {
            state
                .items
                .iter()
                .find(|(item_id, _)| *item_id == id)
                .map(|(_, record)| record.clone())
                .ok_or_else(|| GatewayError::rejected("unknown item"))
        })
    }

    async fn is_borrowed(&self, account: Address, id: ItemId) -> Result<bool, GatewayError> {
        self.state.lock().calls.is_borrowed += 1;
        self.read(|state| {
            if state.failing_borrow_queries.contains(&id) {
                return Err(GatewayError::rejected("borrow record unavailable"));
            }
            Ok(state.borrowed.contains(&(account, id)))
        })
    }

    async fn create_item(&self, name: String, copies: u64) -> Result<PendingTx, GatewayError> {
        self.write(
            |calls| calls.create_item += 1,
            |this, state| {
                if state.signer != this.params.owner {
                    return Err("caller is not the owner".to_string());
                }
                let id = ItemId::from_name(&name);
                if state.items.iter().any(|(item_id, _)| *item_id == id) {
                    return Err("item already exists".to_string());
                }
                state.items.push((
                    id,
                    ItemRecord {
                        name: name.clone(),
                        available_copies: copies,
                    },
                ));
                state.events.push(LedgerEvent::ItemCreated { id, name, copies });
                Ok(())
            },
        )
    }

    async fn borrow_item(&self, id: ItemId) -> Result<PendingTx, GatewayError> {
        self.write(
            |calls| calls.borrow_item += 1,
            |this, state| {
                let account = state.signer;
                if state.borrowed.contains(&(account, id)) {
                    return Err("item already borrowed".to_string());
                }
                if state.item_mut(id)?.available_copies == 0 {
                    return Err("no available copies".to_string());
                }
                state.pull(
                    account,
                    this.params.inventory_address,
                    Some(this.params.inventory_address),
                    this.params.borrow_price,
                )?;
                state.item_mut(id)?.available_copies -= 1;
                state.borrowed.insert((account, id));
                state.events.push(LedgerEvent::ItemBorrowed { id, account });
                Ok(())
            },
        )
    }

    async fn return_item(&self, id: ItemId) -> Result<PendingTx, GatewayError> {
        self.write(
            |calls| calls.return_item += 1,
            |_, state| {
                let account = state.signer;
                if !state.borrowed.remove(&(account, id)) {
                    return Err("item not borrowed".to_string());
                }
                state.item_mut(id)?.available_copies += 1;
                state.events.push(LedgerEvent::ItemReturned { id, account });
                Ok(())
            },
        )
    }

    async fn withdraw_operator_balance(&self) -> Result<PendingTx, GatewayError> {
        self.write(
            |calls| calls.withdraw += 1,
            |this, state| {
                if state.signer != this.params.owner {
                    return Err("caller is not the owner".to_string());
                }
                let collected = state.balance(&this.params.inventory_address);
                state
                    .balances
                    .insert(this.params.inventory_address, U256::ZERO);
                let credited = state.balance(&this.params.owner) + collected;
                state.balances.insert(this.params.owner, credited);
                Ok(())
            },
        )
    }
}

#[async_trait]
impl ValueLedger for InMemoryLedger {
    async fn balance_of(&self, account: Address) -> Result<U256, GatewayError> {
        self.read(|state| Ok(state.balance(&account)))
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, GatewayError> {
        self.read(|state| Ok(state.allowance(owner, spender)))
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<PendingTx, GatewayError> {
        self.write(
            |calls| calls.approve += 1,
            |_, state| {
                if let Some(reason) = state.revert_next_approval.take() {
                    return Err(reason);
                }
                let owner = state.signer;
                state.allowances.insert((owner, spender), amount);
                Ok(())
            },
        )
    }

    async fn wrap(&self, amount: U256) -> Result<PendingTx, GatewayError> {
        self.write(
            |calls| calls.wrap += 1,
            |_, state| {
                let account = state.signer;
                let credited = state.balance(&account) + amount;
                state.balances.insert(account, credited);
                Ok(())
            },
        )
    }

    async fn unwrap(&self, amount: U256) -> Result<PendingTx, GatewayError> {
        self.write(
            |calls| calls.unwrap += 1,
            |this, state| {
                let account = state.signer;
                state.pull(account, this.params.wrapper_address, None, amount)?;
                state
                    .events
                    .push(LedgerEvent::ValueUnwrapped { account, amount });
                Ok(())
            },
        )
    }
}

#[async_trait]
impl ChainClient for InMemoryLedger {
    async fn chain_id(&self) -> Result<u64, GatewayError> {
        self.read(|_| Ok(self.params.chain_id))
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::B256;

    use super::*;

    fn params() -> MemoryLedgerParams {
        MemoryLedgerParams {
            owner: Address::with_last_byte(1),
            inventory_address: Address::with_last_byte(0xa0),
            wrapper_address: Address::with_last_byte(0xb0),
            borrow_price: U256::from(10),
            chain_id: 31337,
        }
    }

    #[tokio::test]
    async fn test_borrow_requires_allowance() {
        let ledger = InMemoryLedger::new(params());
        let id = ItemId::new(B256::with_last_byte(1));
        ledger.seed_item(id, "Dune", 2);
        ledger.set_balance(params().owner, U256::from(100));

        let outcome = ledger.borrow_item(id).await.unwrap().confirm().await.unwrap();
        assert_eq!(
            outcome,
            TxOutcome::Reverted {
                tx_hash: outcome.tx_hash(),
                reason: "insufficient allowance".to_string()
            }
        );

        ledger
            .approve(params().inventory_address, U256::from(10))
            .await
            .unwrap();
        let outcome = ledger.borrow_item(id).await.unwrap().confirm().await.unwrap();
        assert!(outcome.is_confirmed());
        assert_eq!(ledger.record(id).unwrap().available_copies, 1);
        assert!(ledger.is_borrowed(params().owner, id).await.unwrap());
        assert_eq!(
            ledger.balance_of(params().inventory_address).await.unwrap(),
            U256::from(10)
        );
    }

    #[tokio::test]
    async fn test_create_is_owner_only() {
        let ledger = InMemoryLedger::new(params());
        ledger.set_signer(Address::with_last_byte(9));

        let outcome = ledger
            .create_item("Emma".to_string(), 1)
            .await
            .unwrap()
            .confirm()
            .await
            .unwrap();
        assert!(!outcome.is_confirmed());
        assert_eq!(ledger.count_items().await.unwrap(), 0);
        assert_eq!(ledger.calls().create_item, 1);
    }

    #[tokio::test]
    async fn test_unreachable_reads() {
        let ledger = InMemoryLedger::new(params());
        ledger.set_reads_unreachable(true);
        assert!(ledger.count_items().await.unwrap_err().is_unreachable());
    }
}
