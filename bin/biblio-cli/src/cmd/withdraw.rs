use argh::FromArgs;

use crate::{connection::connect, errors::DisplayedError, render, settings::Settings};

/// Withdraws the library's collected tokens (operator only)
#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "withdraw")]
pub struct WithdrawArgs {}

pub async fn withdraw(_args: WithdrawArgs, settings: Settings) -> Result<(), DisplayedError> {
    let (conn, _) = connect(&settings).await?;
    conn.reconciler().withdraw_operator_balance().await?;

    let view = conn.view();
    render::print_notice(&view);
    render::print_balances(view.balances.as_ref());
    Ok(())
}
