use std::{
    future::Future,
    mem,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use biblio_config::ContractParams;
use biblio_ledger::{
    Address, Balances, ChainClient, EventKind, EventRouter, InventoryLedger, ItemId, LedgerEvent,
    SubscriptionId, ValueLedger, U256,
};
use biblio_orchestrator::{ActionReceipt, OrchestratorError, TxOrchestrator};
use biblio_projection::{available_items, borrowed_by_account, fetch_inventory};
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::{Notice, OperationState, ReconcileError, Section, Session, SessionEvent, ViewState};

/// What has to be re-read after a confirmed write.
#[derive(Debug, Clone, Copy)]
enum Refresh {
    Inventory,
    Balances,
    All,
}

/// Single writer of the [`ViewState`].
///
/// All methods take `&self`; section claims are made synchronously through
/// the watch sender, so two operations racing for the same section on one
/// executor cannot both get past the guard.
#[derive(Debug)]
pub struct Reconciler<TInventory, TValue, TChain> {
    inventory: Arc<TInventory>,
    value: Arc<TValue>,
    chain: Arc<TChain>,
    orchestrator: TxOrchestrator<TInventory, TValue>,
    router: Arc<EventRouter>,
    view_tx: watch::Sender<ViewState>,
    event_tx: mpsc::UnboundedSender<LedgerEvent>,
    subscriptions: Mutex<Vec<SubscriptionId>>,
    fetch_tickets: AtomicU64,
}

impl<TInventory, TValue, TChain> Reconciler<TInventory, TValue, TChain>
where
    TInventory: InventoryLedger,
    TValue: ValueLedger,
    TChain: ChainClient,
{
    pub(crate) fn new(
        inventory: Arc<TInventory>,
        value: Arc<TValue>,
        chain: Arc<TChain>,
        params: ContractParams,
        router: Arc<EventRouter>,
        view_tx: watch::Sender<ViewState>,
        event_tx: mpsc::UnboundedSender<LedgerEvent>,
    ) -> Self {
        let orchestrator = TxOrchestrator::new(inventory.clone(), value.clone(), params);
        Self {
            inventory,
            value,
            chain,
            orchestrator,
            router,
            view_tx,
            event_tx,
            subscriptions: Mutex::new(Vec::new()),
            fetch_tickets: AtomicU64::new(0),
        }
    }

    /// Returns a copy of the current view.
    pub fn view(&self) -> ViewState {
        self.view_tx.borrow().clone()
    }

    pub fn view_watcher(&self) -> watch::Receiver<ViewState> {
        self.view_tx.subscribe()
    }

    pub fn params(&self) -> &ContractParams {
        self.orchestrator.params()
    }

    /// Adopts `session`, subscribes to ledger events and runs every read.
    ///
    /// Calling this again without a reset keeps the existing subscriptions.
    pub async fn establish_session(&self, session: Session) -> Result<(), ReconcileError> {
        self.view_tx.send_modify(|view| view.session = session);
        let Some(account) = session.active_account() else {
            return Err(ReconcileError::not_connected());
        };

        self.subscribe_events();
        info!(%account, chain_id = %session.chain_id, "session established");
        self.refresh_all().await
    }

    /// Drops every subscription and returns the view to its initial state.
    pub fn reset(&self) {
        let ids = mem::take(&mut *self.subscriptions.lock());
        for id in ids {
            self.router.unsubscribe(id);
        }
        self.view_tx.send_modify(|view| *view = view.cleared());
        info!("session reset");
    }

    /// Re-reads the inventory and both item projections.
    pub async fn refresh_inventory(&self) -> Result<(), ReconcileError> {
        let (claimed, generation) =
            self.claim_idle(&[Section::AvailableItems, Section::BorrowedItems]);
        let result = self.reload_inventory().await;
        self.release(&claimed, generation, &result);
        result
    }

    /// Re-reads the account and operator balances.
    pub async fn refresh_balances(&self) -> Result<(), ReconcileError> {
        let (claimed, generation) = self.claim_idle(&[Section::ValueExchange]);
        let result = self.reload_balances().await;
        self.release(&claimed, generation, &result);
        result
    }

    /// Re-reads everything. This is the manual refresh after a partial failure.
    pub async fn refresh_all(&self) -> Result<(), ReconcileError> {
        let inventory = self.refresh_inventory().await;
        let balances = self.refresh_balances().await;
        inventory.and(balances)
    }

    /// Borrows one copy of `id` for the connected account.
    pub async fn borrow_item(&self, id: ItemId) -> Result<(), ReconcileError> {
        self.perform(Section::AvailableItems, "Item borrowed", Refresh::All, || async move {
            let available = self.view_tx.borrow().available_items.clone();
            self.orchestrator.borrow_item(id, &available).await
        })
        .await
    }

    pub async fn return_item(&self, id: ItemId) -> Result<(), ReconcileError> {
        self.perform(
            Section::BorrowedItems,
            "Item returned",
            Refresh::Inventory,
            || self.orchestrator.return_item(id),
        )
        .await
    }

    pub async fn create_item(&self, name: &str, copies: u64) -> Result<(), ReconcileError> {
        self.perform(Section::CreateItem, "Item created", Refresh::Inventory, || {
            self.orchestrator.create_item(name, copies)
        })
        .await
    }

    pub async fn wrap(&self, amount: U256) -> Result<(), ReconcileError> {
        self.perform(
            Section::ValueExchange,
            "Tokens wrapped",
            Refresh::Balances,
            || self.orchestrator.wrap(amount),
        )
        .await
    }

    pub async fn unwrap(&self, amount: U256) -> Result<(), ReconcileError> {
        self.perform(
            Section::ValueExchange,
            "Tokens unwrapped",
            Refresh::Balances,
            || self.orchestrator.unwrap(amount),
        )
        .await
    }

    pub async fn withdraw_operator_balance(&self) -> Result<(), ReconcileError> {
        self.perform(
            Section::ValueExchange,
            "Operator balance withdrawn",
            Refresh::Balances,
            || self.orchestrator.withdraw_operator_balance(),
        )
        .await
    }

    /// Reads the live copy count of a single item.
    pub async fn is_item_available(&self, id: ItemId) -> Result<bool, ReconcileError> {
        self.active_account()?;
        let record = self.inventory.item(id).await?;
        Ok(record.available_copies > 0)
    }

    pub fn dismiss_notice(&self) {
        self.view_tx.send_if_modified(|view| view.notice.take().is_some());
    }

    /// Re-reads whatever `event` may have changed.
    pub async fn handle_ledger_event(&self, event: LedgerEvent) -> Result<(), ReconcileError> {
        if self.active_account().is_err() {
            debug!(?event, "ignoring ledger event without a session");
            return Ok(());
        }
        debug!(?event, "reconciling after ledger event");

        match event {
            LedgerEvent::ItemCreated { .. } => self.refresh_inventory().await,
            LedgerEvent::ItemBorrowed { .. } | LedgerEvent::ItemReturned { .. } => {
                let inventory = self.refresh_inventory().await;
                let balances = self.refresh_balances().await;
                inventory.and(balances)
            }
            LedgerEvent::ValueUnwrapped { .. } => self.refresh_balances().await,
        }
    }

    pub async fn handle_session_event(&self, event: SessionEvent) -> Result<(), ReconcileError> {
        match event {
            SessionEvent::AccountsChanged(accounts) => match accounts.first() {
                Some(&account) => {
                    let current = self.view_tx.borrow().session;
                    let chain_id = if current.connected {
                        current.chain_id
                    } else {
                        self.chain.chain_id().await?
                    };
                    self.establish_session(Session::connected(account, chain_id))
                        .await
                }
                None => {
                    self.reset();
                    Ok(())
                }
            },
            SessionEvent::NetworkChanged(notified) => {
                let chain_id = self.chain.chain_id().await?;
                if chain_id != notified {
                    warn!(%notified, %chain_id, "network change disagrees with ledger, using ledger");
                }
                self.view_tx.send_modify(|view| view.session.chain_id = chain_id);
                if self.active_account().is_ok() {
                    self.refresh_all().await
                } else {
                    Ok(())
                }
            }
            SessionEvent::Closed => {
                self.reset();
                Ok(())
            }
        }
    }

    fn subscribe_events(&self) {
        let mut subscriptions = self.subscriptions.lock();
        if !subscriptions.is_empty() {
            return;
        }
        for kind in EventKind::ALL {
            let event_tx = self.event_tx.clone();
            let id = self.router.subscribe(kind, move |event: &LedgerEvent| {
                // Closed only once the sync task is gone.
                let _ = event_tx.send(event.clone());
            });
            subscriptions.push(id);
        }
        debug!(count = subscriptions.len(), "subscribed to ledger events");
    }

    fn active_account(&self) -> Result<Address, ReconcileError> {
        self.view_tx
            .borrow()
            .session
            .active_account()
            .ok_or_else(ReconcileError::not_connected)
    }

    fn next_ticket(&self) -> u64 {
        self.fetch_tickets.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Runs a write in `section` and reconciles after it.
    async fn perform<W, Fut>(
        &self,
        section: Section,
        success: &str,
        refresh: Refresh,
        write: W,
    ) -> Result<(), ReconcileError>
    where
        W: FnOnce() -> Fut,
        Fut: Future<Output = Result<ActionReceipt, OrchestratorError>>,
    {
        let generation = self.claim(section)?;
        let result = self.write_and_reconcile(refresh, write).await;
        self.settle(section, generation, &result, success);
        result
    }

    async fn write_and_reconcile<W, Fut>(
        &self,
        refresh: Refresh,
        write: W,
    ) -> Result<(), ReconcileError>
    where
        W: FnOnce() -> Fut,
        Fut: Future<Output = Result<ActionReceipt, OrchestratorError>>,
    {
        self.active_account()?;
        let receipt = write().await?;
        debug!(tx_hash = %receipt.action.tx_hash, ?refresh, "write confirmed, re-reading");

        let reloaded = match refresh {
            Refresh::Inventory => self.reload_inventory().await,
            Refresh::Balances => self.reload_balances().await,
            Refresh::All => match self.reload_inventory().await {
                Ok(()) => self.reload_balances().await,
                Err(err) => Err(err),
            },
        };
        reloaded.map_err(|err| {
            warn!(%err, "write confirmed but refresh failed");
            ReconcileError::partial(err)
        })
    }

    async fn reload_inventory(&self) -> Result<(), ReconcileError> {
        let account = self.active_account()?;
        let ticket = self.next_ticket();

        let items = fetch_inventory(self.inventory.as_ref()).await?;
        let borrowed = borrowed_by_account(self.inventory.as_ref(), account, &items).await;
        let available = available_items(&items);
        let count = items.len();

        let applied = self.view_tx.send_if_modified(|view| {
            view.replace_inventory(account, ticket, items, available, borrowed)
        });
        if applied {
            debug!(%ticket, %count, "inventory snapshot replaced");
        } else {
            debug!(%ticket, "discarding stale inventory snapshot");
        }
        Ok(())
    }

    async fn reload_balances(&self) -> Result<(), ReconcileError> {
        let account = self.active_account()?;
        let ticket = self.next_ticket();
        let library = self.params().library_address();

        let balances = Balances {
            balance: self.value.balance_of(account).await?,
            allowance: self.value.allowance(account, library).await?,
            operator_balance: self.value.balance_of(library).await?,
        };

        let applied = self
            .view_tx
            .send_if_modified(|view| view.replace_balances(account, ticket, balances));
        if !applied {
            debug!(%ticket, "discarding stale balances");
        }
        Ok(())
    }

    /// Moves `section` to `Loading`, or rejects if it already is.
    ///
    /// Returns the generation the claim was made in.
    fn claim(&self, section: Section) -> Result<u64, ReconcileError> {
        let mut busy = false;
        let mut generation = 0;
        self.view_tx.send_if_modified(|view| {
            generation = view.generation;
            let state = view.sections.get_mut(section);
            if state.is_loading() {
                busy = true;
                return false;
            }
            *state = OperationState::Loading;
            true
        });

        if busy {
            debug!(%section, "section busy, rejecting action");
            return Err(ReconcileError::Busy(section));
        }
        Ok(generation)
    }

    /// Moves every section in `sections` that is not loading to `Loading`,
    /// returning the ones it claimed and the generation they were claimed in.
    fn claim_idle(&self, sections: &[Section]) -> (Vec<Section>, u64) {
        let mut claimed = Vec::with_capacity(sections.len());
        let mut generation = 0;
        self.view_tx.send_if_modified(|view| {
            generation = view.generation;
            for &section in sections {
                let state = view.sections.get_mut(section);
                if !state.is_loading() {
                    *state = OperationState::Loading;
                    claimed.push(section);
                }
            }
            !claimed.is_empty()
        });
        (claimed, generation)
    }

    /// Settles sections claimed by a refresh, unless the view was reset since.
    fn release(
        &self,
        claimed: &[Section],
        generation: u64,
        result: &Result<(), ReconcileError>,
    ) {
        let applied = self.view_tx.send_if_modified(|view| {
            if view.generation != generation {
                return false;
            }
            let next = match result {
                Ok(()) => OperationState::Success,
                Err(err) => OperationState::Error(err.to_string()),
            };
            for &section in claimed {
                *view.sections.get_mut(section) = next.clone();
            }
            if let Err(err) = result {
                view.notice = Some(Notice::Error(err.to_string()));
            }
            true
        });
        if !applied {
            debug!(%generation, "view reset during refresh, dropping its outcome");
        }
    }

    /// Settles the section of a write and publishes the matching notice,
    /// unless the view was reset since the section was claimed.
    fn settle(
        &self,
        section: Section,
        generation: u64,
        result: &Result<(), ReconcileError>,
        success: &str,
    ) {
        let applied = self.view_tx.send_if_modified(|view| {
            if view.generation != generation {
                return false;
            }
            let (state, notice) = match result {
                Ok(()) => (
                    OperationState::Success,
                    Notice::Info(success.to_string()),
                ),
                Err(err) => (
                    OperationState::Error(err.to_string()),
                    Notice::Error(err.to_string()),
                ),
            };
            *view.sections.get_mut(section) = state;
            view.notice = Some(notice);
            true
        });
        if !applied {
            warn!(
                %section,
                ?result,
                "view reset while the operation was in flight, dropping its outcome"
            );
            return;
        }
        match result {
            Ok(()) => info!(%section, "{success}"),
            Err(err) => warn!(%section, %err, "operation failed"),
        }
    }
}
