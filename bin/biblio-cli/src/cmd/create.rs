use argh::FromArgs;

use crate::{connection::connect, errors::DisplayedError, render, settings::Settings};

/// Adds a new item to the library (operator only)
#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "create")]
pub struct CreateArgs {
    /// item name
    #[argh(positional)]
    pub name: String,

    /// number of copies
    #[argh(option)]
    pub copies: u64,
}

pub async fn create(args: CreateArgs, settings: Settings) -> Result<(), DisplayedError> {
    let (conn, _) = connect(&settings).await?;
    conn.reconciler().create_item(&args.name, args.copies).await?;
    render::print_notice(&conn.view());
    Ok(())
}
