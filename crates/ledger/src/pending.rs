use std::{fmt, future::Future};

use alloy_primitives::TxHash;
use futures::future::{self, BoxFuture, FutureExt};

use crate::{GatewayError, TxOutcome};

/// Handle to a transaction that has been broadcast but not yet resolved.
///
/// Once broadcast a transaction cannot be aborted locally; dropping the handle
/// only stops waiting for it. No timeout is applied here, the handle resolves
/// whenever the ledger (or the transport) does.
pub struct PendingTx {
    tx_hash: TxHash,
    outcome: BoxFuture<'static, Result<TxOutcome, GatewayError>>,
}

impl PendingTx {
    /// Creates a handle that resolves when `outcome` does.
    pub fn new<F>(tx_hash: TxHash, outcome: F) -> Self
    where
        F: Future<Output = Result<TxOutcome, GatewayError>> + Send + 'static,
    {
        Self {
            tx_hash,
            outcome: outcome.boxed(),
        }
    }

    /// Creates a handle whose outcome is already known.
    pub fn resolved(outcome: TxOutcome) -> Self {
        Self {
            tx_hash: outcome.tx_hash(),
            outcome: future::ready(Ok(outcome)).boxed(),
        }
    }

    /// Hash of the broadcast transaction.
    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    /// Waits for the ledger to include the transaction.
    pub async fn confirm(self) -> Result<TxOutcome, GatewayError> {
        self.outcome.await
    }
}

impl fmt::Debug for PendingTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTx")
            .field("tx_hash", &self.tx_hash)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::oneshot;

    use super::*;
    use crate::TxReceipt;

    #[tokio::test]
    async fn test_resolved_handle_yields_outcome() {
        let tx_hash = TxHash::with_last_byte(7);
        let pending = PendingTx::resolved(TxOutcome::Reverted {
            tx_hash,
            reason: "out of copies".to_string(),
        });

        assert_eq!(pending.tx_hash(), tx_hash);
        let outcome = pending.confirm().await.unwrap();
        assert!(!outcome.is_confirmed());
    }

    #[tokio::test]
    async fn test_handle_waits_for_ledger() {
        let tx_hash = TxHash::with_last_byte(9);
        let (tx, rx) = oneshot::channel();
        let pending = PendingTx::new(tx_hash, async move {
            rx.await
                .map_err(|_| GatewayError::unreachable("receipt channel closed"))
        });

        tx.send(TxOutcome::Confirmed(TxReceipt {
            tx_hash,
            block_number: Some(3),
        }))
        .unwrap();

        let outcome = pending.confirm().await.unwrap();
        assert!(outcome.is_confirmed());
        assert_eq!(outcome.tx_hash(), tx_hash);
    }
}
