use std::{
    collections::BTreeMap,
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use alloy_primitives::{Address, U256};
use parking_lot::Mutex;
use tracing::trace;

use crate::ItemId;

/// Notification emitted by one of the ledgers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    ItemCreated {
        id: ItemId,
        name: String,
        copies: u64,
    },
    ItemBorrowed {
        id: ItemId,
        account: Address,
    },
    ItemReturned {
        id: ItemId,
        account: Address,
    },
    ValueUnwrapped {
        account: Address,
        amount: U256,
    },
}

impl LedgerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ItemCreated { .. } => EventKind::ItemCreated,
            Self::ItemBorrowed { .. } => EventKind::ItemBorrowed,
            Self::ItemReturned { .. } => EventKind::ItemReturned,
            Self::ValueUnwrapped { .. } => EventKind::ValueUnwrapped,
        }
    }
}

/// Discriminant of [`LedgerEvent`], used to pick what a subscription receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    ItemCreated,
    ItemBorrowed,
    ItemReturned,
    ValueUnwrapped,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::ItemCreated,
        EventKind::ItemBorrowed,
        EventKind::ItemReturned,
        EventKind::ValueUnwrapped,
    ];
}

/// Receives ledger events for the kinds it was subscribed to.
///
/// Handlers run synchronously on the dispatching task and must not block.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &LedgerEvent);
}

impl<F> EventHandler for F
where
    F: Fn(&LedgerEvent) + Send + Sync,
{
    fn handle(&self, event: &LedgerEvent) {
        self(event)
    }
}

/// Identifies a subscription so it can be torn down later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

struct Subscription {
    kind: EventKind,
    handler: Arc<dyn EventHandler>,
}

/// Explicit subscription registry between event sources and consumers.
#[derive(Default)]
pub struct EventRouter {
    next_id: AtomicU64,
    subscriptions: Mutex<BTreeMap<SubscriptionId, Subscription>>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events of `kind`.
    pub fn subscribe(
        &self,
        kind: EventKind,
        handler: impl EventHandler + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions.lock().insert(
            id,
            Subscription {
                kind,
                handler: Arc::new(handler),
            },
        );
        trace!(%id, ?kind, "subscribed");
        id
    }

    /// Removes a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.subscriptions.lock().remove(&id).is_some();
        trace!(%id, %removed, "unsubscribed");
        removed
    }

    /// Delivers `event` to every matching subscription, returning how many
    /// handlers were called.
    pub fn dispatch(&self, event: &LedgerEvent) -> usize {
        let kind = event.kind();
        // Handlers are collected first so they may (un)subscribe without deadlocking.
        let handlers: Vec<_> = self
            .subscriptions
            .lock()
            .values()
            .filter(|sub| sub.kind == kind)
            .map(|sub| sub.handler.clone())
            .collect();

        for handler in &handlers {
            handler.handle(event);
        }
        handlers.len()
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().len()
    }
}

impl fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRouter")
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use alloy_primitives::B256;

    use super::*;

    fn borrowed_event() -> LedgerEvent {
        LedgerEvent::ItemBorrowed {
            id: ItemId::new(B256::with_last_byte(1)),
            account: Address::with_last_byte(2),
        }
    }

    #[test]
    fn test_dispatch_only_reaches_matching_kind() {
        let router = EventRouter::new();
        let borrowed = Arc::new(AtomicUsize::new(0));
        let returned = Arc::new(AtomicUsize::new(0));

        let counter = borrowed.clone();
        router.subscribe(EventKind::ItemBorrowed, move |_: &LedgerEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = returned.clone();
        router.subscribe(EventKind::ItemReturned, move |_: &LedgerEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(router.dispatch(&borrowed_event()), 1);
        assert_eq!(borrowed.load(Ordering::SeqCst), 1);
        assert_eq!(returned.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let router = EventRouter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let id = router.subscribe(EventKind::ItemBorrowed, move |_: &LedgerEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(router.unsubscribe(id));
        assert!(!router.unsubscribe(id));
        assert_eq!(router.dispatch(&borrowed_event()), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(router.subscription_count(), 0);
    }

    #[test]
    fn test_subscription_ids_are_unique() {
        let router = EventRouter::new();
        let a = router.subscribe(EventKind::ItemCreated, |_: &LedgerEvent| {});
        let b = router.subscribe(EventKind::ItemCreated, |_: &LedgerEvent| {});
        assert_ne!(a, b);
        assert_eq!(router.subscription_count(), 2);
    }
}
