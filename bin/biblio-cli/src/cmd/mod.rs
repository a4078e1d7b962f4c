use alloy::primitives::{utils::parse_ether, U256};
use argh::FromArgs;

pub mod balance;
pub mod borrow;
pub mod borrowed;
pub mod create;
pub mod items;
pub mod return_item;
pub mod unwrap;
pub mod watch;
pub mod withdraw;
pub mod wrap;

use balance::BalanceArgs;
use borrow::BorrowArgs;
use borrowed::BorrowedArgs;
use create::CreateArgs;
use items::ItemsArgs;
use return_item::ReturnArgs;
use unwrap::UnwrapArgs;
use watch::WatchArgs;
use withdraw::WithdrawArgs;
use wrap::WrapArgs;

use crate::errors::{DisplayableError, DisplayedError};

/// A CLI for borrowing items from an on-chain lending library
#[derive(FromArgs, PartialEq, Debug)]
pub struct TopLevel {
    #[argh(subcommand)]
    pub cmd: Commands,

    /// log at debug level unless RUST_LOG is set
    #[argh(switch, short = 'v')]
    pub verbose: bool,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
pub enum Commands {
    Items(ItemsArgs),
    Borrowed(BorrowedArgs),
    Balance(BalanceArgs),
    Create(CreateArgs),
    Borrow(BorrowArgs),
    Return(ReturnArgs),
    Wrap(WrapArgs),
    Unwrap(UnwrapArgs),
    Withdraw(WithdrawArgs),
    Watch(WatchArgs),
}

/// Parses a decimal token amount with 18 decimals.
pub(crate) fn parse_amount(amount: &str) -> Result<U256, DisplayedError> {
    parse_ether(amount.trim()).user_error(format!("Invalid amount '{amount}'"))
}

#[cfg(test)]
mod tests {
    use argh::FromArgs;

    use super::*;

    #[test]
    fn test_parses_borrow_by_name() {
        let args = TopLevel::from_args(&["biblio"], &["-v", "borrow", "Dune"]).unwrap();
        assert!(args.verbose);
        assert_eq!(
            args.cmd,
            Commands::Borrow(BorrowArgs {
                item: "Dune".to_string()
            })
        );
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(
            parse_amount("1.5").unwrap(),
            U256::from(1_500_000_000_000_000_000u128)
        );
        assert!(parse_amount("lots").is_err());
    }

    #[test]
    fn test_create_requires_copies() {
        assert!(TopLevel::from_args(&["biblio"], &["create", "Dune"]).is_err());

        let args = TopLevel::from_args(&["biblio"], &["create", "Dune", "--copies", "3"]).unwrap();
        assert_eq!(
            args.cmd,
            Commands::Create(CreateArgs {
                name: "Dune".to_string(),
                copies: 3
            })
        );
    }
}
