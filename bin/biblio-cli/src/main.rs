//! Biblio CLI

pub mod cmd;
pub mod connection;
pub mod errors;
pub mod render;
pub mod settings;

use biblio_common::logging::{init_logging_from_config, LoggingInitConfig};
use cmd::{
    balance::balance, borrow::borrow, borrowed::borrowed, create::create, items::items,
    return_item::return_item, unwrap::unwrap, watch::watch, withdraw::withdraw, wrap::wrap,
    Commands, TopLevel,
};
use settings::Settings;
use tracing::Level;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let TopLevel { cmd, verbose } = argh::from_env();

    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    init_logging_from_config(LoggingInitConfig {
        service_base_name: "biblio-cli",
        service_label: None,
        default_level: if verbose { Level::DEBUG } else { Level::WARN },
        log_dir: settings.log_dir.as_ref(),
        log_file_prefix: None,
        json_format: Some(settings.json_logs),
        use_stderr: true,
        default_log_prefix: "biblio",
    });

    let result = match cmd {
        Commands::Items(args) => items(args, settings).await,
        Commands::Borrowed(args) => borrowed(args, settings).await,
        Commands::Balance(args) => balance(args, settings).await,
        Commands::Create(args) => create(args, settings).await,
        Commands::Borrow(args) => borrow(args, settings).await,
        Commands::Return(args) => return_item(args, settings).await,
        Commands::Wrap(args) => wrap(args, settings).await,
        Commands::Unwrap(args) => unwrap(args, settings).await,
        Commands::Withdraw(args) => withdraw(args, settings).await,
        Commands::Watch(args) => watch(args, settings).await,
    };

    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
