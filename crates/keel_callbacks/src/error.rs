//! Error types for callback registration and execution.

use crate::callback::CallbackKind;
use thiserror::Error;

/// Boxed error accepted from user code inside an action.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result returned by every callback action.
pub type ActionResult = Result<(), ActionError>;

/// Errors a callback action or guarded body can return.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Halts the run without raising a failure.
    ///
    /// Only a `Before` callback may halt a run. Returned from anywhere else it
    /// is reported as an ordinary failure.
    #[error("callback chain aborted")]
    Abort,

    /// The chain behind an around callback's [`Next`](crate::Next) failed.
    ///
    /// Produced by [`Next::proceed`](crate::Next::proceed) only. The failure
    /// that caused it is the one reported by [`run`](crate::CallbackRegistry::run).
    /// Callbacks return it as received and never build it themselves; one
    /// returned without an inner failure is reported as that callback's own
    /// [`RunError::Callback`].
    #[doc(hidden)]
    #[error("inner callback chain failed")]
    Propagated,

    /// The action failed with a message.
    #[error("{0}")]
    Failed(String),

    /// The action failed with an underlying error.
    #[error("{0}")]
    Other(#[from] BoxError),
}

impl ActionError {
    /// Creates a [`Failed`](Self::Failed).
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }

    /// Creates an [`Other`](Self::Other) from any error.
    pub fn other(err: impl Into<BoxError>) -> Self {
        Self::Other(err.into())
    }
}

/// Errors raised while declaring events or registering callbacks.
///
/// These surface at setup time and indicate a programming error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The event was never declared.
    #[error("event '{event}' has not been declared")]
    UnknownEvent {
        /// The event name.
        event: String,
    },

    /// The event was declared twice.
    #[error("event '{event}' is already declared")]
    DuplicateEvent {
        /// The event name.
        event: String,
    },

    /// The event was declared without this callback kind.
    #[error("event '{event}' does not accept {kind} callbacks")]
    KindNotAllowed {
        /// The event name.
        event: String,
        /// The rejected kind.
        kind: CallbackKind,
    },
}

/// Errors returned from [`run`](crate::CallbackRegistry::run).
///
/// Action failures are never retried or translated; the variant records where
/// the failure originated.
#[derive(Debug, Error)]
pub enum RunError {
    /// The event was never declared.
    #[error("event '{0}' has not been declared")]
    UnknownEvent(String),

    /// A callback action failed.
    #[error("{kind} callback '{callback}' failed during '{event}': {source}")]
    Callback {
        /// The event being run.
        event: String,
        /// Name of the failing callback.
        callback: String,
        /// Kind of the failing callback.
        kind: CallbackKind,
        /// The action's error.
        source: ActionError,
    },

    /// The guarded body failed.
    #[error("body of '{event}' failed: {source}")]
    Body {
        /// The event being run.
        event: String,
        /// The body's error.
        source: ActionError,
    },
}

impl RunError {
    /// Returns the action error behind this failure, if any.
    #[must_use]
    pub fn action_error(&self) -> Option<&ActionError> {
        match self {
            Self::UnknownEvent(_) => None,
            Self::Callback { source, .. } | Self::Body { source, .. } => Some(source),
        }
    }
}
