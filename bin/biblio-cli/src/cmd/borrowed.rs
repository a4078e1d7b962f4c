use argh::FromArgs;

use crate::{connection::connect, errors::DisplayedError, render, settings::Settings};

/// Lists items borrowed by your account
#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "borrowed")]
pub struct BorrowedArgs {}

pub async fn borrowed(_args: BorrowedArgs, settings: Settings) -> Result<(), DisplayedError> {
    let (conn, _) = connect(&settings).await?;
    render::print_items("Borrowed items", &conn.view().borrowed_items);
    Ok(())
}
