//! Classification of alloy errors into [`GatewayError`].
//!
//! JSON-RPC error responses mean a node answered and refused the call, which
//! is a rejection. Anything else at the transport level means the node could
//! not be reached.

use alloy::{
    contract::Error as ContractError,
    providers::PendingTransactionError,
    transports::{RpcError, TransportErrorKind},
};
use biblio_ledger::GatewayError;

const REVERT_PREFIX: &str = "execution reverted";

/// Strips the node's revert prefix, leaving the contract's reason.
pub fn revert_reason(message: &str) -> &str {
    match message.strip_prefix(REVERT_PREFIX) {
        Some(rest) => {
            let reason = rest.trim_start_matches(':').trim();
            if reason.is_empty() {
                message
            } else {
                reason
            }
        }
        None => message,
    }
}

pub fn map_rpc_error(err: RpcError<TransportErrorKind>) -> GatewayError {
    match err.as_error_resp() {
        Some(payload) => GatewayError::rejected(revert_reason(&payload.message)),
        None => GatewayError::unreachable(err.to_string()),
    }
}

pub fn map_contract_error(err: ContractError) -> GatewayError {
    match err {
        ContractError::TransportError(err) => map_rpc_error(err),
        ContractError::PendingTransactionError(err) => map_pending_error(err),
        other => GatewayError::rejected(other.to_string()),
    }
}

pub(crate) fn map_pending_error(err: PendingTransactionError) -> GatewayError {
    match err {
        PendingTransactionError::TransportError(err) => map_rpc_error(err),
        other => GatewayError::unreachable(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use alloy::rpc::json_rpc::ErrorPayload;

    use super::*;

    #[test]
    fn test_revert_reason_strips_prefix() {
        assert_eq!(
            revert_reason("execution reverted: insufficient funds"),
            "insufficient funds"
        );
        assert_eq!(revert_reason("execution reverted"), "execution reverted");
        assert_eq!(revert_reason("nonce too low"), "nonce too low");
    }

    #[test]
    fn test_error_response_is_rejection() {
        let err = RpcError::ErrorResp(ErrorPayload {
            code: 3,
            message: "execution reverted: insufficient allowance".into(),
            data: None,
        });
        assert_eq!(
            map_rpc_error(err),
            GatewayError::rejected("insufficient allowance")
        );
    }

    #[test]
    fn test_transport_failure_is_unreachable() {
        let err = TransportErrorKind::custom_str("connection refused");
        assert!(map_rpc_error(err).is_unreachable());
    }
}
