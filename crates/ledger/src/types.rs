use std::{fmt, str::FromStr};

use alloy_primitives::{hex::FromHexError, keccak256, TxHash, B256, U256};
use serde::{Deserialize, Serialize};

/// Opaque identifier of an inventory item as assigned by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(B256);

impl ItemId {
    /// Wraps a raw ledger identifier.
    pub const fn new(raw: B256) -> Self {
        Self(raw)
    }

    /// Derives the identifier the inventory contract assigns to an item name.
    pub fn from_name(name: &str) -> Self {
        Self(keccak256(name.as_bytes()))
    }

    /// Returns the raw 32-byte identifier.
    pub fn as_b256(&self) -> B256 {
        self.0
    }
}

impl From<B256> for ItemId {
    fn from(raw: B256) -> Self {
        Self(raw)
    }
}

impl From<ItemId> for B256 {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ItemId {
    type Err = FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        B256::from_str(s.trim()).map(Self)
    }
}

/// Item fields as stored on the ledger, without the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub name: String,
    pub available_copies: u64,
}

/// A single entry of the inventory snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub available_copies: u64,
}

impl Item {
    pub fn new(id: ItemId, record: ItemRecord) -> Self {
        Self {
            id,
            name: record.name,
            available_copies: record.available_copies,
        }
    }

    /// Returns true if at least one copy can be borrowed.
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }
}

/// Value ledger balances scoped to the current account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    /// Token balance of the account.
    pub balance: U256,
    /// Amount the account has approved the inventory contract to spend.
    pub allowance: U256,
    /// Token balance held by the inventory contract itself.
    pub operator_balance: U256,
}

/// Receipt data of a confirmed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

/// Final outcome of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOutcome {
    /// Included with a success status.
    Confirmed(TxReceipt),
    /// Included but reverted, or dropped by the ledger with a reason.
    Reverted { tx_hash: TxHash, reason: String },
}

impl TxOutcome {
    pub fn tx_hash(&self) -> TxHash {
        match self {
            Self::Confirmed(receipt) => receipt.tx_hash,
            Self::Reverted { tx_hash, .. } => *tx_hash,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_display_parses_back() {
        let id = ItemId::from_name("Dune");
        let parsed: ItemId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_item_id_from_name_is_stable() {
        assert_eq!(ItemId::from_name("Dune"), ItemId::from_name("Dune"));
        assert_ne!(ItemId::from_name("Dune"), ItemId::from_name("Emma"));
    }

    #[test]
    fn test_item_availability() {
        let mut item = Item::new(
            ItemId::new(B256::with_last_byte(1)),
            ItemRecord {
                name: "Dune".to_string(),
                available_copies: 1,
            },
        );
        assert!(item.is_available());
        item.available_copies = 0;
        assert!(!item.is_available());
    }
}
