use std::{future::Future, sync::Arc};

use biblio_config::ContractParams;
use biblio_ledger::{ChainClient, EventRouter, InventoryLedger, ValueLedger};
use tokio::sync::{mpsc, watch};

use crate::{reconciler::Reconciler, task::reconciler_sync_task, SessionEvent, ViewState};

/// Handle for driving the reconciler and observing the view.
#[derive(Debug)]
pub struct ReconcilerHandle<TInventory, TValue, TChain> {
    reconciler: Arc<Reconciler<TInventory, TValue, TChain>>,
    view_rx: watch::Receiver<ViewState>,
    session_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl<TInventory, TValue, TChain> ReconcilerHandle<TInventory, TValue, TChain> {
    /// Returns the reconciler, for user-initiated operations.
    pub fn reconciler(&self) -> &Arc<Reconciler<TInventory, TValue, TChain>> {
        &self.reconciler
    }

    /// Returns a watcher for view updates.
    pub fn view_watcher(&self) -> watch::Receiver<ViewState> {
        self.view_rx.clone()
    }

    /// Forwards a session change to the sync task.
    ///
    /// Returns false if the task is no longer running.
    pub fn notify_session(&self, event: SessionEvent) -> bool {
        self.session_tx.send(event).is_ok()
    }
}

/// Builder for a reconciler and its sync task.
#[derive(Debug)]
pub struct ReconcilerBuilder<TInventory, TValue, TChain> {
    inventory: Arc<TInventory>,
    value: Arc<TValue>,
    chain: Arc<TChain>,
    params: ContractParams,
    router: Arc<EventRouter>,
}

impl<TInventory, TValue, TChain> ReconcilerBuilder<TInventory, TValue, TChain> {
    /// Creates a new builder with all required fields.
    pub fn new(
        inventory: Arc<TInventory>,
        value: Arc<TValue>,
        chain: Arc<TChain>,
        params: ContractParams,
        router: Arc<EventRouter>,
    ) -> Self {
        Self {
            inventory,
            value,
            chain,
            params,
            router,
        }
    }

    /// Builds and returns the handle and the sync task.
    ///
    /// The task applies session changes and ledger events until the handle is
    /// dropped.
    pub fn build(
        self,
    ) -> (
        ReconcilerHandle<TInventory, TValue, TChain>,
        impl Future<Output = ()>,
    )
    where
        TInventory: InventoryLedger,
        TValue: ValueLedger,
        TChain: ChainClient,
    {
        let (view_tx, view_rx) = watch::channel(ViewState::default());
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (session_tx, session_rx) = mpsc::unbounded_channel();

        let reconciler = Arc::new(Reconciler::new(
            self.inventory,
            self.value,
            self.chain,
            self.params,
            self.router,
            view_tx,
            event_tx,
        ));
        let handle = ReconcilerHandle {
            reconciler: reconciler.clone(),
            view_rx,
            session_tx,
        };
        let task = reconciler_sync_task(reconciler, session_rx, event_rx);

        (handle, task)
    }
}
