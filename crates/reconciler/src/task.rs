use std::sync::Arc;

use biblio_ledger::{ChainClient, InventoryLedger, LedgerEvent, ValueLedger};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{reconciler::Reconciler, SessionEvent};

/// Applies session changes and ledger events one at a time.
///
/// Session changes take priority so a reset lands before queued events.
pub(crate) async fn reconciler_sync_task<TInventory, TValue, TChain>(
    reconciler: Arc<Reconciler<TInventory, TValue, TChain>>,
    mut session_rx: mpsc::UnboundedReceiver<SessionEvent>,
    mut event_rx: mpsc::UnboundedReceiver<LedgerEvent>,
) where
    TInventory: InventoryLedger,
    TValue: ValueLedger,
    TChain: ChainClient,
{
    loop {
        tokio::select! {
            biased;

            session_event = session_rx.recv() => {
                let Some(event) = session_event else {
                    debug!("session channel closed, stopping reconciler");
                    break;
                };
                if let Err(error) = reconciler.handle_session_event(event).await {
                    warn!(%error, "failed to apply session change");
                }
            }
            Some(event) = event_rx.recv() => {
                if let Err(error) = reconciler.handle_ledger_event(event).await {
                    warn!(%error, "failed to reconcile after ledger event");
                }
            }
        }
    }
}
