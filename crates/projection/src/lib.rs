//! Derives displayable collections from the raw inventory snapshot.

mod inventory;

pub use inventory::{available_items, borrowed_by_account, fetch_inventory};
