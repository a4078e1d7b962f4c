use std::fmt;

use biblio_ledger::GatewayError;
use thiserror::Error;

/// Which write of an operation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxPhase {
    /// The spend approval preceding a gated action.
    Approval,
    /// The state-changing action itself.
    Action,
}

impl fmt::Display for TxPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxPhase::Approval => f.write_str("approval"),
            TxPhase::Action => f.write_str("action"),
        }
    }
}

/// Error type for orchestrated ledger writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    /// Local validation failed; nothing was sent to the ledger.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// The gateway could not submit or track the transaction.
    #[error("{phase} failed: {source}")]
    Gateway {
        phase: TxPhase,
        #[source]
        source: GatewayError,
    },

    /// The ledger included the transaction but reverted it.
    #[error("{phase} reverted: {reason}")]
    Reverted { phase: TxPhase, reason: String },
}

impl OrchestratorError {
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::PreconditionFailed(msg.into())
    }

    /// Returns the phase the failure happened in, if anything was submitted.
    pub fn phase(&self) -> Option<TxPhase> {
        match self {
            Self::PreconditionFailed(_) => None,
            Self::Gateway { phase, .. } | Self::Reverted { phase, .. } => Some(*phase),
        }
    }

    /// Returns true if the ledger could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Gateway { source, .. } if source.is_unreachable())
    }

    /// Message meant for the end user. Revert reasons are passed through verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::PreconditionFailed(msg) => msg.clone(),
            Self::Gateway { source, .. } => source.to_string(),
            Self::Reverted { reason, .. } => reason.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_is_verbatim_reason() {
        let err = OrchestratorError::Reverted {
            phase: TxPhase::Approval,
            reason: "insufficient funds".to_string(),
        };
        assert_eq!(err.user_message(), "insufficient funds");
        assert_eq!(err.to_string(), "approval reverted: insufficient funds");
        assert_eq!(err.phase(), Some(TxPhase::Approval));
    }

    #[test]
    fn test_unreachable_classification() {
        let err = OrchestratorError::Gateway {
            phase: TxPhase::Action,
            source: GatewayError::unreachable("no provider"),
        };
        assert!(err.is_unreachable());
        assert!(!OrchestratorError::precondition("empty name").is_unreachable());
    }
}
