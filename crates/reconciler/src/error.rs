use biblio_ledger::GatewayError;
use biblio_orchestrator::OrchestratorError;
use thiserror::Error;

use crate::Section;

/// Failure of a reconciler operation, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// No usable connection or contract, or no connected account.
    #[error("ledger unreachable: {0}")]
    Unreachable(String),

    /// The ledger rejected a read or reverted a write. Shown verbatim.
    #[error("{0}")]
    RemoteRejected(String),

    /// Local validation failed; nothing was sent.
    #[error("{0}")]
    PreconditionFailed(String),

    /// The write confirmed but re-reading the ledger afterwards failed.
    #[error("transaction confirmed but the view could not be refreshed ({0}); refresh manually")]
    PartialReconcileFailure(String),

    /// The section already has an operation in flight.
    #[error("{0} is busy")]
    Busy(Section),
}

impl ReconcileError {
    pub(crate) fn not_connected() -> Self {
        Self::Unreachable("no connected account".to_string())
    }

    pub(crate) fn partial(source: ReconcileError) -> Self {
        Self::PartialReconcileFailure(source.to_string())
    }

    /// Returns true for section guard rejections.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy(_))
    }
}

impl From<GatewayError> for ReconcileError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unreachable(msg) => Self::Unreachable(msg),
            GatewayError::RemoteRejected(reason) => Self::RemoteRejected(reason),
        }
    }
}

impl From<OrchestratorError> for ReconcileError {
    fn from(err: OrchestratorError) -> Self {
        match err {
            OrchestratorError::PreconditionFailed(msg) => Self::PreconditionFailed(msg),
            OrchestratorError::Gateway { source, .. } => source.into(),
            OrchestratorError::Reverted { reason, .. } => Self::RemoteRejected(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use biblio_orchestrator::TxPhase;

    use super::*;

    #[test]
    fn test_revert_reason_displayed_verbatim() {
        let err: ReconcileError = OrchestratorError::Reverted {
            phase: TxPhase::Approval,
            reason: "insufficient funds".to_string(),
        }
        .into();
        assert_eq!(err, ReconcileError::RemoteRejected("insufficient funds".into()));
        assert_eq!(err.to_string(), "insufficient funds");
    }

    #[test]
    fn test_gateway_classification_preserved() {
        let err: ReconcileError = OrchestratorError::Gateway {
            phase: TxPhase::Action,
            source: GatewayError::unreachable("connection refused"),
        }
        .into();
        assert_eq!(err, ReconcileError::Unreachable("connection refused".into()));
    }

    #[test]
    fn test_partial_failure_mentions_manual_refresh() {
        let err = ReconcileError::partial(ReconcileError::Unreachable("timeout".into()));
        assert!(err.to_string().contains("refresh manually"));
        assert!(err.to_string().contains("timeout"));
    }
}
