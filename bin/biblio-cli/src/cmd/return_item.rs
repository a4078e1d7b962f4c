use argh::FromArgs;

use crate::{
    connection::{connect, resolve_item},
    errors::DisplayedError,
    render,
    settings::Settings,
};

/// Returns a borrowed item
#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "return")]
pub struct ReturnArgs {
    /// item id or exact name
    #[argh(positional)]
    pub item: String,
}

pub async fn return_item(args: ReturnArgs, settings: Settings) -> Result<(), DisplayedError> {
    let (conn, _) = connect(&settings).await?;
    let id = resolve_item(&conn.view(), &args.item)?;
    conn.reconciler().return_item(id).await?;

    let view = conn.view();
    render::print_notice(&view);
    render::print_items("Borrowed items", &view.borrowed_items);
    Ok(())
}
