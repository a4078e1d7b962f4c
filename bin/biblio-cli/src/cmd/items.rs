use argh::FromArgs;

use crate::{connection::connect, errors::DisplayedError, render, settings::Settings};

/// Lists items that can be borrowed
#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "items")]
pub struct ItemsArgs {
    /// include items with no copies left
    #[argh(switch)]
    all: bool,
}

pub async fn items(args: ItemsArgs, settings: Settings) -> Result<(), DisplayedError> {
    let (conn, _) = connect(&settings).await?;
    let view = conn.view();
    if args.all {
        render::print_items("All items", &view.items);
    } else {
        render::print_items("Available items", &view.available_items);
    }
    Ok(())
}
