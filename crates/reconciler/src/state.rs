use std::fmt;

use biblio_ledger::{Address, Balances, Item, ItemId};

/// Independently guarded part of the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    AvailableItems,
    BorrowedItems,
    CreateItem,
    ValueExchange,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::AvailableItems,
        Section::BorrowedItems,
        Section::CreateItem,
        Section::ValueExchange,
    ];
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::AvailableItems => "available items",
            Section::BorrowedItems => "borrowed items",
            Section::CreateItem => "create item",
            Section::ValueExchange => "value exchange",
        };
        f.write_str(name)
    }
}

/// Progress of the latest operation in a section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OperationState {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

impl OperationState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Operation state of every section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionStates {
    pub available_items: OperationState,
    pub borrowed_items: OperationState,
    pub create_item: OperationState,
    pub value_exchange: OperationState,
}

impl SectionStates {
    pub fn get(&self, section: Section) -> &OperationState {
        match section {
            Section::AvailableItems => &self.available_items,
            Section::BorrowedItems => &self.borrowed_items,
            Section::CreateItem => &self.create_item,
            Section::ValueExchange => &self.value_exchange,
        }
    }

    pub(crate) fn get_mut(&mut self, section: Section) -> &mut OperationState {
        match section {
            Section::AvailableItems => &mut self.available_items,
            Section::BorrowedItems => &mut self.borrowed_items,
            Section::CreateItem => &mut self.create_item,
            Section::ValueExchange => &mut self.value_exchange,
        }
    }
}

/// Transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// Connection state supplied by the session layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub connected: bool,
    pub account: Option<Address>,
    pub chain_id: u64,
}

impl Session {
    pub fn connected(account: Address, chain_id: u64) -> Self {
        Self {
            connected: true,
            account: Some(account),
            chain_id,
        }
    }

    /// Returns the account if the session can be used for ledger calls.
    pub fn active_account(&self) -> Option<Address> {
        self.account.filter(|_| self.connected)
    }
}

/// Change notification from the session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The wallet's account list changed. Empty means disconnected.
    AccountsChanged(Vec<Address>),
    NetworkChanged(u64),
    Closed,
}

/// Everything the reconciler publishes.
///
/// Inventory fields are only ever replaced as a whole, together with the
/// projections derived from them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub session: Session,
    /// Every item in ledger enumeration order.
    pub items: Vec<Item>,
    pub available_items: Vec<Item>,
    pub borrowed_items: Vec<Item>,
    pub balances: Option<Balances>,
    pub sections: SectionStates,
    pub notice: Option<Notice>,
    /// Bumped on every published replacement of fetched data.
    pub snapshot_seq: u64,
    pub(crate) inventory_ticket: u64,
    pub(crate) balances_ticket: u64,
    /// Bumped by every reset. Operations settle only into the generation
    /// they claimed their section in.
    pub(crate) generation: u64,
}

impl ViewState {
    pub fn section(&self, section: Section) -> &OperationState {
        self.sections.get(section)
    }

    /// Looks up an item in the last inventory snapshot.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Replaces the inventory snapshot and its projections.
    ///
    /// Rejected if the fetch was made for another account or an inventory
    /// fetch started later has already been applied.
    pub(crate) fn replace_inventory(
        &mut self,
        account: Address,
        ticket: u64,
        items: Vec<Item>,
        available_items: Vec<Item>,
        borrowed_items: Vec<Item>,
    ) -> bool {
        if self.session.active_account() != Some(account) || ticket <= self.inventory_ticket {
            return false;
        }
        self.inventory_ticket = ticket;
        self.items = items;
        self.available_items = available_items;
        self.borrowed_items = borrowed_items;
        self.snapshot_seq += 1;
        true
    }

    /// Replaces the balances, with the same staleness rules as the inventory.
    pub(crate) fn replace_balances(
        &mut self,
        account: Address,
        ticket: u64,
        balances: Balances,
    ) -> bool {
        if self.session.active_account() != Some(account) || ticket <= self.balances_ticket {
            return false;
        }
        self.balances_ticket = ticket;
        self.balances = Some(balances);
        self.snapshot_seq += 1;
        true
    }

    /// Returns the initial state, keeping the counters so fetches started
    /// before the reset cannot land afterwards.
    pub(crate) fn cleared(&self) -> Self {
        Self {
            snapshot_seq: self.snapshot_seq + 1,
            inventory_ticket: self.inventory_ticket,
            balances_ticket: self.balances_ticket,
            generation: self.generation + 1,
            ..Self::default()
        }
    }
}
