use std::{fmt, future::Future, sync::Arc};

use alloy::transports::http::reqwest::Url;
use biblio_evm::EvmLedger;
use biblio_ledger::{Address, ChainClient, EventRouter, ItemId};
use biblio_reconciler::{
    ReconcileError, Reconciler, ReconcilerBuilder, ReconcilerHandle, Session, ViewState,
};
use tracing::debug;

use crate::{
    errors::{DisplayableError, DisplayedError},
    settings::{Settings, PRIVATE_KEY_ENV},
};

pub type LedgerReconciler = Reconciler<EvmLedger, EvmLedger, EvmLedger>;

/// Live connection to the ledger with an established session.
pub struct Connection {
    pub account: Address,
    pub ledger: Arc<EvmLedger>,
    pub router: Arc<EventRouter>,
    pub handle: ReconcilerHandle<EvmLedger, EvmLedger, EvmLedger>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("account", &self.account)
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

impl Connection {
    pub fn reconciler(&self) -> &LedgerReconciler {
        self.handle.reconciler()
    }

    pub fn view(&self) -> ViewState {
        self.reconciler().view()
    }
}

/// Connects to the configured node and runs the initial reads.
///
/// Also returns the reconciler's sync task. Commands that do not follow
/// ledger events can drop it.
pub async fn connect(
    settings: &Settings,
) -> Result<(Connection, impl Future<Output = ()>), DisplayedError> {
    let signer = settings
        .signer()
        .user_error(format!("Set {PRIVATE_KEY_ENV} to the key of your account"))?;
    let account = signer.address();
    let url: Url = settings
        .ledger
        .rpc_url
        .parse()
        .user_error("Invalid rpc_url in config file")?;

    let ledger = Arc::new(EvmLedger::connect_http(
        url,
        signer,
        &settings.ledger.contracts,
    ));
    let chain_id = ledger
        .chain_id()
        .await
        .map_err(ReconcileError::from)?;
    debug!(%account, %chain_id, "connected to ledger");

    let router = Arc::new(EventRouter::new());
    let (handle, sync_task) = ReconcilerBuilder::new(
        ledger.clone(),
        ledger.clone(),
        ledger.clone(),
        settings.ledger.contracts,
        router.clone(),
    )
    .build();

    handle
        .reconciler()
        .establish_session(Session::connected(account, chain_id))
        .await?;

    Ok((
        Connection {
            account,
            ledger,
            router,
            handle,
        },
        sync_task,
    ))
}

/// Resolves an item given either its hex id or its exact name.
pub fn resolve_item(view: &ViewState, item: &str) -> Result<ItemId, DisplayedError> {
    if let Ok(id) = item.parse::<ItemId>() {
        return Ok(id);
    }
    view.items
        .iter()
        .find(|candidate| candidate.name == item)
        .map(|candidate| candidate.id)
        .ok_or_else(|| {
            DisplayedError::UserError(
                format!("No item with id or name '{item}'"),
                Box::new(item.to_string()),
            )
        })
}
