use argh::FromArgs;

use crate::{
    cmd::parse_amount, connection::connect, errors::DisplayedError, render, settings::Settings,
};

/// Wraps native currency into library tokens
#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "wrap")]
pub struct WrapArgs {
    /// amount in ether units, e.g. 0.5
    #[argh(positional)]
    pub amount: String,
}

pub async fn wrap(args: WrapArgs, settings: Settings) -> Result<(), DisplayedError> {
    let amount = parse_amount(&args.amount)?;
    let (conn, _) = connect(&settings).await?;
    conn.reconciler().wrap(amount).await?;

    let view = conn.view();
    render::print_notice(&view);
    render::print_balances(view.balances.as_ref());
    Ok(())
}
