use thiserror::Error;

/// Errors surfaced by a ledger gateway call.
///
/// The gateway never retries on its own, so every variant carries enough
/// detail for the caller to decide what the user should see.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No usable connection to the ledger (provider missing, transport down).
    #[error("ledger unreachable: {0}")]
    Unreachable(String),

    /// The ledger itself rejected the call, e.g. a revert.
    ///
    /// Displays as the bare reason so it can be shown to the user verbatim.
    #[error("{0}")]
    RemoteRejected(String),
}

impl GatewayError {
    /// Creates an unreachable error.
    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::Unreachable(msg.into())
    }

    /// Creates a remote rejection error.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::RemoteRejected(reason.into())
    }

    /// Returns true if the failure was due to missing connectivity.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }

    /// Returns the underlying message without the variant prefix.
    pub fn reason(&self) -> &str {
        match self {
            Self::Unreachable(msg) | Self::RemoteRejected(msg) => msg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_displays_reason_verbatim() {
        let err = GatewayError::rejected("insufficient funds");
        assert_eq!(err.to_string(), "insufficient funds");
        assert!(!err.is_unreachable());
    }

    #[test]
    fn test_unreachable_is_prefixed() {
        let err = GatewayError::unreachable("connection refused");
        assert_eq!(err.to_string(), "ledger unreachable: connection refused");
        assert_eq!(err.reason(), "connection refused");
        assert!(err.is_unreachable());
    }
}
