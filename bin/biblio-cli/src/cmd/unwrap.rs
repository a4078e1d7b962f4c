use argh::FromArgs;

use crate::{
    cmd::parse_amount, connection::connect, errors::DisplayedError, render, settings::Settings,
};

/// Unwraps library tokens back into native currency
#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "unwrap")]
pub struct UnwrapArgs {
    /// amount in token units, e.g. 0.5
    #[argh(positional)]
    pub amount: String,
}

pub async fn unwrap(args: UnwrapArgs, settings: Settings) -> Result<(), DisplayedError> {
    let amount = parse_amount(&args.amount)?;
    let (conn, _) = connect(&settings).await?;
    conn.reconciler().unwrap(amount).await?;

    let view = conn.view();
    render::print_notice(&view);
    render::print_balances(view.balances.as_ref());
    Ok(())
}
