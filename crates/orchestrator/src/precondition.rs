//! Local checks run before anything is submitted to the ledger.

use biblio_ledger::{Item, ItemId, U256};

use crate::OrchestratorError;

/// Validates the fields of an item about to be created.
pub fn check_new_item(name: &str, copies: u64) -> Result<(), OrchestratorError> {
    if name.trim().is_empty() {
        return Err(OrchestratorError::precondition("item name must not be empty"));
    }
    if copies == 0 {
        return Err(OrchestratorError::precondition(
            "copy count must be greater than zero",
        ));
    }
    Ok(())
}

/// Validates that `id` is listed with at least one copy in the available snapshot.
pub fn check_borrowable(id: ItemId, available: &[Item]) -> Result<(), OrchestratorError> {
    match available.iter().find(|item| item.id == id) {
        Some(item) if item.is_available() => Ok(()),
        Some(_) => Err(OrchestratorError::precondition(format!(
            "no available copies of {id}"
        ))),
        None => Err(OrchestratorError::precondition(format!(
            "item {id} is not available"
        ))),
    }
}

/// Validates a token or native amount.
pub fn check_amount(amount: U256) -> Result<(), OrchestratorError> {
    if amount.is_zero() {
        return Err(OrchestratorError::precondition(
            "amount must be greater than zero",
        ));
    }
    Ok(())
}
