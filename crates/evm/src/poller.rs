use std::{sync::Arc, time::Duration};

use alloy::{
    providers::{DynProvider, Provider},
    rpc::types::{Filter, Log},
    sol_types::SolEvent,
};
use biblio_config::ContractParams;
use biblio_ledger::{EventRouter, GatewayError, ItemId, LedgerEvent};
use tracing::{debug, trace, warn};

use crate::{errors::map_rpc_error, LibWrapper, Library};

/// Polls contract logs and dispatches them as [`LedgerEvent`]s.
#[derive(Debug)]
pub struct LedgerEventPoller {
    provider: DynProvider,
    params: ContractParams,
    router: Arc<EventRouter>,
    poll_interval: Duration,
    next_block: Option<u64>,
}

impl LedgerEventPoller {
    /// Creates a poller that starts at the chain head on its first poll.
    pub fn new(
        provider: DynProvider,
        params: ContractParams,
        router: Arc<EventRouter>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            provider,
            params,
            router,
            poll_interval,
            next_block: None,
        }
    }

    /// Starts from `block` instead of the chain head.
    pub fn with_start_block(mut self, block: u64) -> Self {
        self.next_block = Some(block);
        self
    }

    /// Fetches logs up to the current head and dispatches them in order.
    ///
    /// Returns how many events were decoded.
    pub async fn poll_once(&mut self) -> Result<usize, GatewayError> {
        let head = self
            .provider
            .get_block_number()
            .await
            .map_err(map_rpc_error)?;
        let from = self.next_block.unwrap_or(head);
        if from > head {
            return Ok(0);
        }

        let filter = Filter::new()
            .address(vec![
                self.params.library_address(),
                self.params.wrapper_address(),
            ])
            .from_block(from)
            .to_block(head);
        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(map_rpc_error)?;

        let mut decoded = 0;
        for log in &logs {
            match decode_log(log) {
                Some(event) => {
                    let handlers = self.router.dispatch(&event);
                    trace!(?event, %handlers, "dispatched ledger event");
                    decoded += 1;
                }
                None => trace!(topic = ?log.topic0(), "skipping unrelated log"),
            }
        }

        debug!(%from, %head, logs = logs.len(), %decoded, "polled ledger logs");
        self.next_block = Some(head + 1);
        Ok(decoded)
    }

    /// Polls forever. Failed polls are logged and retried on the next tick.
    pub async fn run(mut self) {
        loop {
            if let Err(error) = self.poll_once().await {
                warn!(%error, "failed to poll ledger logs");
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Decodes a contract log, returning `None` for logs this gateway does not know.
pub fn decode_log(log: &Log) -> Option<LedgerEvent> {
    let topic = *log.topic0()?;

    if topic == Library::LogAddedBook::SIGNATURE_HASH {
        let event = log.log_decode::<Library::LogAddedBook>().ok()?.inner.data;
        Some(LedgerEvent::ItemCreated {
            id: ItemId::new(event.id),
            name: event.name,
            copies: event.copies.saturating_to(),
        })
    } else if topic == Library::LogBookBorrowed::SIGNATURE_HASH {
        let event = log.log_decode::<Library::LogBookBorrowed>().ok()?.inner.data;
        Some(LedgerEvent::ItemBorrowed {
            id: ItemId::new(event.id),
            account: event.borrower,
        })
    } else if topic == Library::LogBookReturned::SIGNATURE_HASH {
        let event = log.log_decode::<Library::LogBookReturned>().ok()?.inner.data;
        Some(LedgerEvent::ItemReturned {
            id: ItemId::new(event.id),
            account: event.borrower,
        })
    } else if topic == LibWrapper::LogLIBUnwrapped::SIGNATURE_HASH {
        let event = log.log_decode::<LibWrapper::LogLIBUnwrapped>().ok()?.inner.data;
        Some(LedgerEvent::ValueUnwrapped {
            account: event.sender,
            amount: event.amount,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, LogData, B256, U256};

    use super::*;

    fn rpc_log(data: LogData) -> Log {
        Log {
            inner: alloy::primitives::Log {
                address: Address::with_last_byte(0x11),
                data,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_added_book() {
        let id = B256::with_last_byte(1);
        let log = rpc_log(
            Library::LogAddedBook {
                id,
                name: "Dune".to_string(),
                copies: U256::from(2),
            }
            .encode_log_data(),
        );

        assert_eq!(
            decode_log(&log),
            Some(LedgerEvent::ItemCreated {
                id: ItemId::new(id),
                name: "Dune".to_string(),
                copies: 2,
            })
        );
    }

    #[test]
    fn test_decode_unwrapped() {
        let sender = Address::with_last_byte(0xaa);
        let log = rpc_log(
            LibWrapper::LogLIBUnwrapped {
                sender,
                amount: U256::from(5),
            }
            .encode_log_data(),
        );

        assert_eq!(
            decode_log(&log),
            Some(LedgerEvent::ValueUnwrapped {
                account: sender,
                amount: U256::from(5),
            })
        );
    }

    #[test]
    fn test_unknown_topic_is_skipped() {
        let log = rpc_log(LogData::new_unchecked(
            vec![B256::with_last_byte(0xff)],
            Default::default(),
        ));
        assert_eq!(decode_log(&log), None);
        assert_eq!(decode_log(&rpc_log(LogData::default())), None);
    }
}
