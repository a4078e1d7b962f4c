use std::time::Duration;

use argh::FromArgs;
use biblio_evm::LedgerEventPoller;
use colored::Colorize;
use tracing::info;

use crate::{connection::connect, errors::DisplayedError, render, settings::Settings};

/// Follows ledger events and prints the view whenever it changes
#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "watch")]
pub struct WatchArgs {
    /// block to start reading events from, defaults to the chain head
    #[argh(option)]
    from_block: Option<u64>,
}

pub async fn watch(args: WatchArgs, settings: Settings) -> Result<(), DisplayedError> {
    let (conn, sync_task) = connect(&settings).await?;

    let poller = LedgerEventPoller::new(
        conn.ledger.provider().clone(),
        settings.ledger.contracts,
        conn.router.clone(),
        Duration::from_millis(settings.ledger.event_poll_ms),
    );
    let poller = match args.from_block.or(settings.ledger.event_start_block) {
        Some(block) => poller.with_start_block(block),
        None => poller,
    };

    let mut view_rx = conn.handle.view_watcher();
    let mut last_seq = {
        let view = view_rx.borrow_and_update();
        render::print_view(&view);
        view.snapshot_seq
    };

    let printer = async move {
        while view_rx.changed().await.is_ok() {
            let view = view_rx.borrow_and_update().clone();
            if view.snapshot_seq == last_seq {
                continue;
            }
            last_seq = view.snapshot_seq;
            println!("\n{}", "Ledger changed".yellow());
            render::print_view(&view);
        }
    };

    info!("following ledger events");
    tokio::select! {
        _ = sync_task => {}
        _ = poller.run() => {}
        _ = printer => {}
        _ = tokio::signal::ctrl_c() => {
            println!("Stopped");
        }
    }

    Ok(())
}
