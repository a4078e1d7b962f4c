use std::fmt;

use biblio_reconciler::ReconcileError;

/// Errors displayed to the user when using the CLI
#[derive(Debug)]
pub enum DisplayedError {
    /// Errors the user can address by updating configuration or providing expected input
    UserError(String, Box<dyn fmt::Debug>),
    /// Internal errors encountered when servicing user's request.
    InternalError(String, Box<dyn fmt::Debug>),
}

#[inline]
pub fn user_error<E>(msg: impl Into<String>) -> impl FnOnce(E) -> DisplayedError
where
    E: fmt::Debug + 'static,
{
    move |e| DisplayedError::UserError(msg.into(), Box::new(e))
}

#[inline]
pub fn internal_error<E>(msg: impl Into<String>) -> impl FnOnce(E) -> DisplayedError
where
    E: fmt::Debug + 'static,
{
    move |e| DisplayedError::InternalError(msg.into(), Box::new(e))
}

pub trait DisplayableError {
    type Output;
    fn user_error(self, msg: impl Into<String>) -> Result<Self::Output, DisplayedError>;
    fn internal_error(self, msg: impl Into<String>) -> Result<Self::Output, DisplayedError>;
}

impl<T, E: fmt::Debug + 'static> DisplayableError for Result<T, E> {
    type Output = T;
    #[inline]
    fn user_error(self, msg: impl Into<String>) -> Result<Self::Output, DisplayedError> {
        self.map_err(user_error(msg))
    }
    #[inline]
    fn internal_error(self, msg: impl Into<String>) -> Result<Self::Output, DisplayedError> {
        self.map_err(internal_error(msg))
    }
}

impl From<ReconcileError> for DisplayedError {
    fn from(err: ReconcileError) -> Self {
        let msg = err.to_string();
        match err {
            ReconcileError::Unreachable(_) | ReconcileError::PartialReconcileFailure(_) => {
                DisplayedError::InternalError(msg, Box::new(err))
            }
            ReconcileError::RemoteRejected(_)
            | ReconcileError::PreconditionFailed(_)
            | ReconcileError::Busy(_) => DisplayedError::UserError(msg, Box::new(err)),
        }
    }
}

impl fmt::Display for DisplayedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayedError::UserError(msg, e) => {
                f.write_fmt(format_args!("User error: {msg}: {e:?}"))
            }
            DisplayedError::InternalError(msg, e) => {
                f.write_fmt(format_args!("Internal error: {msg}: {e:?}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revert_is_user_error() {
        let err: DisplayedError =
            ReconcileError::RemoteRejected("insufficient funds".to_string()).into();
        assert!(matches!(err, DisplayedError::UserError(ref msg, _) if msg == "insufficient funds"));
    }

    #[test]
    fn test_unreachable_is_internal_error() {
        let err: DisplayedError = ReconcileError::Unreachable("refused".to_string()).into();
        assert!(matches!(err, DisplayedError::InternalError(..)));
    }
}
