use argh::FromArgs;

use crate::{connection::connect, errors::DisplayedError, render, settings::Settings};

/// Prints token balance, library allowance and operator balance
#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "balance")]
pub struct BalanceArgs {}

pub async fn balance(_args: BalanceArgs, settings: Settings) -> Result<(), DisplayedError> {
    let (conn, _) = connect(&settings).await?;
    let view = conn.view();
    println!("Account {}", conn.account);
    render::print_balances(view.balances.as_ref());
    Ok(())
}
