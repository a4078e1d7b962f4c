use std::{future::Future, sync::Arc};

use biblio_config::ContractParams;
use biblio_ledger::{
    Address, GatewayError, InventoryLedger, Item, ItemId, PendingTx, TxOutcome, TxReceipt,
    ValueLedger, U256,
};
use tracing::{debug, info, warn};

use crate::{check_amount, check_borrowable, check_new_item, OrchestratorError, TxPhase};

/// Receipts of every transaction an operation confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReceipt {
    /// Present only for spend-gated operations.
    pub approval: Option<TxReceipt>,
    pub action: TxReceipt,
}

impl ActionReceipt {
    fn single(action: TxReceipt) -> Self {
        Self {
            approval: None,
            action,
        }
    }
}

/// Issues ledger writes and waits for their outcome.
///
/// Every method validates its inputs locally first and makes no ledger call
/// when validation fails. Writes are awaited to confirmation before returning.
#[derive(Debug)]
pub struct TxOrchestrator<TInventory, TValue> {
    inventory: Arc<TInventory>,
    value: Arc<TValue>,
    params: ContractParams,
}

impl<TInventory, TValue> Clone for TxOrchestrator<TInventory, TValue> {
    fn clone(&self) -> Self {
        Self {
            inventory: self.inventory.clone(),
            value: self.value.clone(),
            params: self.params,
        }
    }
}

impl<TInventory, TValue> TxOrchestrator<TInventory, TValue>
where
    TInventory: InventoryLedger,
    TValue: ValueLedger,
{
    pub fn new(inventory: Arc<TInventory>, value: Arc<TValue>, params: ContractParams) -> Self {
        Self {
            inventory,
            value,
            params,
        }
    }

    pub fn params(&self) -> &ContractParams {
        &self.params
    }

    /// Creates a new item. Owner only; other signers see the action revert.
    pub async fn create_item(
        &self,
        name: &str,
        copies: u64,
    ) -> Result<ActionReceipt, OrchestratorError> {
        check_new_item(name, copies)?;
        let name = name.trim().to_string();
        debug!(%name, %copies, "creating item");
        let receipt = submit(TxPhase::Action, self.inventory.create_item(name, copies)).await?;
        Ok(ActionReceipt::single(receipt))
    }

    /// Borrows one copy of `id`, paying the borrow price.
    ///
    /// `available` is the latest snapshot of available items; `id` must be
    /// listed there with at least one copy.
    pub async fn borrow_item(
        &self,
        id: ItemId,
        available: &[Item],
    ) -> Result<ActionReceipt, OrchestratorError> {
        check_borrowable(id, available)?;
        debug!(item_id = %id, "borrowing item");
        let inventory = &self.inventory;
        self.approve_then_act(
            self.params.library_address(),
            self.params.borrow_price(),
            || inventory.borrow_item(id),
        )
        .await
    }

    /// Returns a borrowed copy of `id`.
    pub async fn return_item(&self, id: ItemId) -> Result<ActionReceipt, OrchestratorError> {
        debug!(item_id = %id, "returning item");
        let receipt = submit(TxPhase::Action, self.inventory.return_item(id)).await?;
        Ok(ActionReceipt::single(receipt))
    }

    /// Pays `amount` of native value to the wrapper for the same amount of tokens.
    pub async fn wrap(&self, amount: U256) -> Result<ActionReceipt, OrchestratorError> {
        check_amount(amount)?;
        debug!(%amount, "wrapping");
        let receipt = submit(TxPhase::Action, self.value.wrap(amount)).await?;
        Ok(ActionReceipt::single(receipt))
    }

    /// Approves the wrapper for `amount` tokens, then unwraps them.
    pub async fn unwrap(&self, amount: U256) -> Result<ActionReceipt, OrchestratorError> {
        check_amount(amount)?;
        debug!(%amount, "unwrapping");
        let value = &self.value;
        self.approve_then_act(self.params.wrapper_address(), amount, || {
            value.unwrap(amount)
        })
        .await
    }

    /// Moves the tokens collected by the inventory contract to its owner.
    pub async fn withdraw_operator_balance(&self) -> Result<ActionReceipt, OrchestratorError> {
        debug!("withdrawing operator balance");
        let receipt =
            submit(TxPhase::Action, self.inventory.withdraw_operator_balance()).await?;
        Ok(ActionReceipt::single(receipt))
    }

    /// Approves `spender` for `amount`, then runs `act` once the approval confirmed.
    ///
    /// `act` is never invoked unless the approval reached `Confirmed`. A failed
    /// action leaves the approval in place.
    pub async fn approve_then_act<F, Fut>(
        &self,
        spender: Address,
        amount: U256,
        act: F,
    ) -> Result<ActionReceipt, OrchestratorError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<PendingTx, GatewayError>>,
    {
        let approval = submit(TxPhase::Approval, self.value.approve(spender, amount)).await?;

        match submit(TxPhase::Action, act()).await {
            Ok(action) => Ok(ActionReceipt {
                approval: Some(approval),
                action,
            }),
            Err(err) => {
                warn!(%spender, %amount, %err, "action failed after approval; approval left in place");
                Err(err)
            }
        }
    }
}

/// Submits a write, waits for it and classifies the outcome.
async fn submit<F>(phase: TxPhase, submission: F) -> Result<TxReceipt, OrchestratorError>
where
    F: Future<Output = Result<PendingTx, GatewayError>>,
{
    let pending = submission
        .await
        .map_err(|source| OrchestratorError::Gateway { phase, source })?;
    let tx_hash = pending.tx_hash();
    debug!(%phase, %tx_hash, "submitted; waiting for confirmation");

    let outcome = pending
        .confirm()
        .await
        .map_err(|source| OrchestratorError::Gateway { phase, source })?;

    match outcome {
        TxOutcome::Confirmed(receipt) => {
            info!(%phase, %tx_hash, block = ?receipt.block_number, "confirmed");
            Ok(receipt)
        }
        TxOutcome::Reverted { reason, .. } => {
            warn!(%phase, %tx_hash, %reason, "reverted");
            Err(OrchestratorError::Reverted { phase, reason })
        }
    }
}

#[cfg(test)]
mod tests {
    use biblio_ledger::{
        InMemoryLedger, MemoryLedgerParams, MockInventoryLedger, MockValueLedger, TxHash, B256,
    };
    use mockall::{predicate::eq, Sequence};

    use super::*;

    fn library() -> Address {
        Address::with_last_byte(0x11)
    }

    fn token() -> Address {
        Address::with_last_byte(0x22)
    }

    fn wrapper() -> Address {
        Address::with_last_byte(0x33)
    }

    fn price() -> U256 {
        U256::from(1_000u64)
    }

    fn params() -> ContractParams {
        ContractParams::new(library(), token(), wrapper(), price())
    }

    fn item_id(n: u8) -> ItemId {
        ItemId::new(B256::with_last_byte(n))
    }

    fn dune() -> Item {
        Item {
            id: item_id(1),
            name: "Dune".to_string(),
            available_copies: 2,
        }
    }

    fn confirmed(n: u8) -> PendingTx {
        PendingTx::resolved(TxOutcome::Confirmed(TxReceipt {
            tx_hash: TxHash::with_last_byte(n),
            block_number: Some(n as u64),
        }))
    }

    fn reverted(n: u8, reason: &str) -> PendingTx {
        PendingTx::resolved(TxOutcome::Reverted {
            tx_hash: TxHash::with_last_byte(n),
            reason: reason.to_string(),
        })
    }

    fn orchestrator(
        inventory: MockInventoryLedger,
        value: MockValueLedger,
    ) -> TxOrchestrator<MockInventoryLedger, MockValueLedger> {
        TxOrchestrator::new(Arc::new(inventory), Arc::new(value), params())
    }

    #[tokio::test]
    async fn test_borrow_approves_then_borrows() {
        let mut seq = Sequence::new();
        let mut value = MockValueLedger::new();
        let mut inventory = MockInventoryLedger::new();

        value
            .expect_approve()
            .with(eq(library()), eq(price()))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(confirmed(1)));
        inventory
            .expect_borrow_item()
            .with(eq(item_id(1)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(confirmed(2)));

        let receipt = orchestrator(inventory, value)
            .borrow_item(item_id(1), &[dune()])
            .await
            .unwrap();

        assert_eq!(
            receipt.approval.map(|r| r.tx_hash),
            Some(TxHash::with_last_byte(1))
        );
        assert_eq!(receipt.action.tx_hash, TxHash::with_last_byte(2));
    }

    #[tokio::test]
    async fn test_reverted_approval_skips_borrow() {
        let mut value = MockValueLedger::new();
        let mut inventory = MockInventoryLedger::new();

        value
            .expect_approve()
            .times(1)
            .returning(|_, _| Ok(reverted(1, "insufficient funds")));
        inventory.expect_borrow_item().times(0);

        let err = orchestrator(inventory, value)
            .borrow_item(item_id(1), &[dune()])
            .await
            .unwrap_err();

        assert_eq!(
            err,
            OrchestratorError::Reverted {
                phase: TxPhase::Approval,
                reason: "insufficient funds".to_string(),
            }
        );
        assert_eq!(err.user_message(), "insufficient funds");
    }

    #[tokio::test]
    async fn test_unconfirmed_approval_skips_borrow() {
        let mut value = MockValueLedger::new();
        let mut inventory = MockInventoryLedger::new();

        value.expect_approve().times(1).returning(|_, _| {
            Ok(PendingTx::new(TxHash::with_last_byte(1), async {
                Err(GatewayError::unreachable("connection dropped"))
            }))
        });
        inventory.expect_borrow_item().times(0);

        let err = orchestrator(inventory, value)
            .borrow_item(item_id(1), &[dune()])
            .await
            .unwrap_err();

        assert_eq!(err.phase(), Some(TxPhase::Approval));
        assert!(err.is_unreachable());
    }

    #[tokio::test]
    async fn test_unsubmitted_approval_skips_borrow() {
        let mut value = MockValueLedger::new();
        let mut inventory = MockInventoryLedger::new();

        value
            .expect_approve()
            .times(1)
            .returning(|_, _| Err(GatewayError::rejected("nonce too low")));
        inventory.expect_borrow_item().times(0);

        let err = orchestrator(inventory, value)
            .borrow_item(item_id(1), &[dune()])
            .await
            .unwrap_err();

        assert_eq!(
            err,
            OrchestratorError::Gateway {
                phase: TxPhase::Approval,
                source: GatewayError::rejected("nonce too low"),
            }
        );
    }

    #[tokio::test]
    async fn test_borrow_revert_reports_action_phase() {
        let mut value = MockValueLedger::new();
        let mut inventory = MockInventoryLedger::new();

        value
            .expect_approve()
            .times(1)
            .returning(|_, _| Ok(confirmed(1)));
        inventory
            .expect_borrow_item()
            .times(1)
            .returning(|_| Ok(reverted(2, "item already borrowed")));

        let err = orchestrator(inventory, value)
            .borrow_item(item_id(1), &[dune()])
            .await
            .unwrap_err();

        assert_eq!(err.phase(), Some(TxPhase::Action));
        assert_eq!(err.user_message(), "item already borrowed");
    }

    #[tokio::test]
    async fn test_borrow_of_unlisted_item_makes_no_calls() {
        // Mocks without expectations panic on any call.
        let orchestrator = orchestrator(MockInventoryLedger::new(), MockValueLedger::new());

        let err = orchestrator
            .borrow_item(item_id(9), &[dune()])
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::PreconditionFailed(_)));

        let exhausted = Item {
            available_copies: 0,
            ..dune()
        };
        let err = orchestrator
            .borrow_item(exhausted.id, &[exhausted])
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn test_create_with_empty_name_makes_no_calls() {
        let orchestrator = orchestrator(MockInventoryLedger::new(), MockValueLedger::new());

        let err = orchestrator.create_item("", 3).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::PreconditionFailed(_)));
        assert_eq!(err.phase(), None);
    }

    #[tokio::test]
    async fn test_create_trims_name() {
        let mut inventory = MockInventoryLedger::new();
        inventory
            .expect_create_item()
            .with(eq("Dune".to_string()), eq(3u64))
            .times(1)
            .returning(|_, _| Ok(confirmed(4)));

        let receipt = orchestrator(inventory, MockValueLedger::new())
            .create_item("  Dune ", 3)
            .await
            .unwrap();
        assert_eq!(receipt.approval, None);
    }

    #[tokio::test]
    async fn test_unwrap_approves_wrapper_for_amount() {
        let mut seq = Sequence::new();
        let mut value = MockValueLedger::new();
        let amount = U256::from(250u64);

        value
            .expect_approve()
            .with(eq(wrapper()), eq(amount))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(confirmed(1)));
        value
            .expect_unwrap()
            .with(eq(amount))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(confirmed(2)));

        orchestrator(MockInventoryLedger::new(), value)
            .unwrap(amount)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_zero_amounts_rejected() {
        let orchestrator = orchestrator(MockInventoryLedger::new(), MockValueLedger::new());

        assert!(matches!(
            orchestrator.wrap(U256::ZERO).await,
            Err(OrchestratorError::PreconditionFailed(_))
        ));
        assert!(matches!(
            orchestrator.unwrap(U256::ZERO).await,
            Err(OrchestratorError::PreconditionFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_borrow_against_memory_ledger() {
        let account = Address::with_last_byte(0xaa);
        let ledger = Arc::new(InMemoryLedger::new(MemoryLedgerParams {
            owner: Address::with_last_byte(0x01),
            inventory_address: library(),
            wrapper_address: wrapper(),
            borrow_price: price(),
            chain_id: 1,
        }));
        ledger.seed_item(item_id(1), "Dune", 2);
        ledger.set_signer(account);
        ledger.set_balance(account, U256::from(5_000u64));

        let orchestrator = TxOrchestrator::new(ledger.clone(), ledger.clone(), params());
        orchestrator
            .borrow_item(item_id(1), &[dune()])
            .await
            .unwrap();

        assert_eq!(ledger.record(item_id(1)).unwrap().available_copies, 1);
        assert!(ledger.is_borrowed(account, item_id(1)).await.unwrap());
        assert_eq!(
            ledger.balance_of(account).await.unwrap(),
            U256::from(4_000u64)
        );
        let calls = ledger.calls();
        assert_eq!((calls.approve, calls.borrow_item), (1, 1));
    }

    #[tokio::test]
    async fn test_memory_ledger_approval_revert_skips_borrow() {
        let ledger = Arc::new(InMemoryLedger::new(MemoryLedgerParams {
            owner: Address::with_last_byte(0x01),
            inventory_address: library(),
            wrapper_address: wrapper(),
            borrow_price: price(),
            chain_id: 1,
        }));
        ledger.seed_item(item_id(1), "Dune", 2);
        ledger.revert_next_approval("insufficient funds");

        let orchestrator = TxOrchestrator::new(ledger.clone(), ledger.clone(), params());
        let err = orchestrator
            .borrow_item(item_id(1), &[dune()])
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "insufficient funds");
        assert_eq!(ledger.calls().borrow_item, 0);
    }
}
