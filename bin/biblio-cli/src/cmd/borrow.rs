use alloy::primitives::utils::format_ether;
use argh::FromArgs;

use crate::{
    connection::{connect, resolve_item},
    errors::DisplayedError,
    render,
    settings::Settings,
};

/// Borrows an item, paying the borrow price in tokens
#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "borrow")]
pub struct BorrowArgs {
    /// item id or exact name
    #[argh(positional)]
    pub item: String,
}

pub async fn borrow(args: BorrowArgs, settings: Settings) -> Result<(), DisplayedError> {
    let (conn, _) = connect(&settings).await?;
    let id = resolve_item(&conn.view(), &args.item)?;

    println!(
        "Approving {} tokens and borrowing {id}",
        format_ether(conn.reconciler().params().borrow_price())
    );
    conn.reconciler().borrow_item(id).await?;

    let view = conn.view();
    render::print_notice(&view);
    render::print_balances(view.balances.as_ref());
    Ok(())
}
