use alloy::primitives::utils::format_ether;
use biblio_ledger::{Balances, Item};
use biblio_reconciler::{Notice, OperationState, Section, ViewState};
use colored::Colorize;

pub fn print_items(title: &str, items: &[Item]) {
    println!("{}", title.bold());
    if items.is_empty() {
        println!("  {}", "none".dimmed());
        return;
    }
    for item in items {
        println!(
            "  {} {} ({} available)",
            item.id.to_string().dimmed(),
            item.name.cyan(),
            item.available_copies
        );
    }
}

pub fn print_balances(balances: Option<&Balances>) {
    println!("{}", "Balances".bold());
    let Some(balances) = balances else {
        println!("  {}", "not loaded".dimmed());
        return;
    };
    println!("  balance:          {}", format_ether(balances.balance).green());
    println!("  library allowance: {}", format_ether(balances.allowance));
    println!("  operator balance: {}", format_ether(balances.operator_balance));
}

pub fn print_notice(view: &ViewState) {
    match &view.notice {
        Some(Notice::Info(msg)) => println!("{}", msg.green()),
        Some(Notice::Error(msg)) => eprintln!("{}", msg.red()),
        None => {}
    }
}

/// Prints sections that did not end in success or idle.
pub fn print_section_errors(view: &ViewState) {
    for section in Section::ALL {
        if let OperationState::Error(reason) = view.section(section) {
            eprintln!("{} {}: {}", "error".red().bold(), section, reason);
        }
    }
}

/// Prints the whole view, used for the initial and followed snapshots.
pub fn print_view(view: &ViewState) {
    if let Some(account) = view.session.account {
        println!(
            "{} {} on chain {}",
            "Account".bold(),
            account,
            view.session.chain_id
        );
    }
    print_items("Available items", &view.available_items);
    print_items("Borrowed items", &view.borrowed_items);
    print_balances(view.balances.as_ref());
    print_section_errors(view);
}
