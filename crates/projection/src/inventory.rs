use biblio_ledger::{Address, GatewayError, InventoryLedger, Item};
use tracing::{debug, warn};

/// Reads the full inventory snapshot in ledger enumeration order.
///
/// Every call round-trips to the ledger. Any failure aborts the whole read,
/// since a partial snapshot would show items as missing.
pub async fn fetch_inventory(ledger: &impl InventoryLedger) -> Result<Vec<Item>, GatewayError> {
    let count = ledger.count_items().await?;
    debug!(%count, "fetching inventory snapshot");

    // The count comes from the ledger, so nothing is reserved up front.
    let mut items = Vec::new();
    for index in 0..count {
        let id = ledger.item_id_at(index).await?;
        let record = ledger.item(id).await?;
        items.push(Item::new(id, record));
    }

    Ok(items)
}

/// Returns the items with at least one available copy, keeping snapshot order.
pub fn available_items(all_items: &[Item]) -> Vec<Item> {
    all_items
        .iter()
        .filter(|item| item.is_available())
        .cloned()
        .collect()
}

/// Returns the items `account` currently holds, keeping snapshot order.
///
/// Borrow records are queried one item at a time. A failed query counts as
/// "not borrowed" for that item and does not affect the others.
pub async fn borrowed_by_account(
    ledger: &impl InventoryLedger,
    account: Address,
    all_items: &[Item],
) -> Vec<Item> {
    let mut borrowed = Vec::new();

    for item in all_items {
        match ledger.is_borrowed(account, item.id).await {
            Ok(true) => borrowed.push(item.clone()),
            Ok(false) => {}
            Err(error) => {
                warn!(
                    item_id = %item.id,
                    %account,
                    %error,
                    "borrow record query failed; treating as not borrowed"
                );
            }
        }
    }

    borrowed
}
