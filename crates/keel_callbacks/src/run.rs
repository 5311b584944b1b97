//! Execution composer.
//!
//! [`CallbackRegistry::run`] executes an event's callbacks around a body:
//!
//! 1. Before callbacks, in registration order. The first failure aborts the run.
//! 2. Around callbacks, nested so the first registered is outermost. Each
//!    receives a [`Next`] that runs the next around or, innermost, the body.
//! 3. After callbacks, in registration order, only when nothing failed.
//!
//! Failures from the body or an inner around come back out of
//! [`Next::proceed`] as [`ActionError::Propagated`], so every entered around
//! still runs its post-proceed code. The original failure is what `run`
//! returns, even if an around swallows the `Propagated` error.

use core::cell::{Cell, RefCell};

use crate::callback::{Action, Callback, CallbackKind};
use crate::error::{ActionError, ActionResult, RunError};
use crate::registry::CallbackRegistry;

// ─────────────────────────────────────────────────────────────────────────────
// RunOutcome
// ─────────────────────────────────────────────────────────────────────────────

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome<R> {
    /// The body ran and returned this value.
    Completed(R),
    /// An around callback did not proceed, so the body never ran.
    ///
    /// After callbacks still ran.
    Skipped {
        /// Name of the around callback that did not proceed.
        by: String,
    },
    /// A before callback returned [`ActionError::Abort`].
    ///
    /// Nothing after it ran.
    Halted {
        /// Name of the before callback that halted the run.
        by: String,
    },
}

impl<R> RunOutcome<R> {
    /// Returns `true` if the body ran.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Returns the body's value, if it ran.
    #[must_use]
    pub fn completed(self) -> Option<R> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Skipped { .. } | Self::Halted { .. } => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// RunState
// ─────────────────────────────────────────────────────────────────────────────

/// Per-run bookkeeping shared by every frame of the around chain.
struct RunState<'e> {
    event: &'e str,
    /// First failure raised inside the around chain.
    failure: RefCell<Option<RunError>>,
    body_ran: Cell<bool>,
    /// Innermost around that returned without proceeding.
    skipped_by: RefCell<Option<String>>,
}

impl<'e> RunState<'e> {
    fn new(event: &'e str) -> Self {
        Self {
            event,
            failure: RefCell::new(None),
            body_ran: Cell::new(false),
            skipped_by: RefCell::new(None),
        }
    }

    fn has_failed(&self) -> bool {
        self.failure.borrow().is_some()
    }

    fn fail(&self, error: RunError) -> ActionError {
        let mut failure = self.failure.borrow_mut();
        if failure.is_none() {
            *failure = Some(error);
        }
        ActionError::Propagated
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Next
// ─────────────────────────────────────────────────────────────────────────────

/// Continuation handed to an around callback.
///
/// Calling [`proceed`](Self::proceed) runs the remaining around callbacks and
/// then the body. `proceed` consumes the continuation, so the rest of the
/// chain runs at most once per around invocation. Dropping it without
/// proceeding skips the body.
pub struct Next<'a, T> {
    arounds: &'a [&'a Callback<T>],
    body: &'a mut (dyn FnMut(&mut T) -> ActionResult + 'a),
    state: &'a RunState<'a>,
}

impl<'a, T> Next<'a, T> {
    /// Runs the rest of the chain.
    ///
    /// Returns [`ActionError::Propagated`] if anything inside failed. Run any
    /// post-proceed code before returning that error.
    pub fn proceed(self, subject: &mut T) -> ActionResult {
        let Next {
            arounds,
            body,
            state,
        } = self;

        let Some((callback, rest)) = arounds.split_first() else {
            state.body_ran.set(true);
            tracing::trace!(event = state.event, "running body");
            return body(subject).map_err(|source| {
                state.fail(RunError::Body {
                    event: state.event.to_owned(),
                    source,
                })
            });
        };

        let inner = Next {
            arounds: rest,
            body,
            state,
        };

        let Action::Around(action) = &callback.action else {
            return inner.proceed(subject);
        };

        if !callback.applies_to(subject) {
            tracing::trace!(callback = callback.name(), "around callback guarded out");
            return inner.proceed(subject);
        }

        tracing::trace!(callback = callback.name(), kind = "around", "invoking callback");
        let result = action(subject, inner);

        if state.has_failed() {
            if result.is_ok() {
                tracing::warn!(
                    callback = callback.name(),
                    "around callback returned Ok after its inner chain failed; propagating the failure"
                );
            }
            return Err(ActionError::Propagated);
        }

        match result {
            Ok(()) => {
                if !state.body_ran.get() {
                    let mut skipped_by = state.skipped_by.borrow_mut();
                    if skipped_by.is_none() {
                        tracing::debug!(callback = callback.name(), "around callback did not proceed");
                        *skipped_by = Some(callback.name().to_owned());
                    }
                }
                Ok(())
            }
            Err(source) => Err(state.fail(RunError::Callback {
                event: state.event.to_owned(),
                callback: callback.name().to_owned(),
                kind: CallbackKind::Around,
                source,
            })),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CallbackRegistry::run
// ─────────────────────────────────────────────────────────────────────────────

impl<T> CallbackRegistry<T> {
    /// Runs `body` wrapped in the callbacks registered for `event`.
    ///
    /// See the [module documentation](crate::run) for the execution order. The
    /// registry is not modified, so concurrent runs against a shared registry
    /// are safe.
    ///
    /// # Errors
    ///
    /// - [`RunError::UnknownEvent`] if `event` was never declared.
    /// - [`RunError::Callback`] if a callback failed.
    /// - [`RunError::Body`] if the body failed.
    ///
    /// # Example
    ///
    /// ```
    /// use keel_callbacks::{CallbackRegistry, RunOutcome};
    ///
    /// let mut registry = CallbackRegistry::<String>::new();
    /// registry.declare("save")?;
    /// registry
    ///     .before("save", "append_suffix", |name: &mut String| {
    ///         name.push_str(" Doe");
    ///         Ok(())
    ///     })?
    ///     .after("save", "uppercase_name", |name: &mut String| {
    ///         *name = name.to_uppercase();
    ///         Ok(())
    ///     })?;
    ///
    /// let mut name = String::from("John");
    /// let outcome = registry.run("save", &mut name, |name| Ok(name.len()))?;
    ///
    /// assert_eq!(outcome, RunOutcome::Completed(8));
    /// assert_eq!(name, "JOHN DOE");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn run<R, F>(&self, event: &str, subject: &mut T, body: F) -> Result<RunOutcome<R>, RunError>
    where
        F: FnOnce(&mut T) -> Result<R, ActionError>,
    {
        let callbacks = self
            .callbacks(event)
            .ok_or_else(|| RunError::UnknownEvent(event.to_owned()))?;

        let span = tracing::debug_span!("run_callbacks", event);
        let _guard = span.enter();

        for callback in callbacks {
            let Action::Before(action) = &callback.action else {
                continue;
            };
            if !callback.applies_to(subject) {
                tracing::trace!(callback = callback.name(), "before callback guarded out");
                continue;
            }
            tracing::trace!(callback = callback.name(), kind = "before", "invoking callback");
            match action(subject) {
                Ok(()) => {}
                Err(ActionError::Abort) => {
                    tracing::debug!(callback = callback.name(), "run halted by before callback");
                    return Ok(RunOutcome::Halted {
                        by: callback.name().to_owned(),
                    });
                }
                Err(source) => {
                    return Err(RunError::Callback {
                        event: event.to_owned(),
                        callback: callback.name().to_owned(),
                        kind: CallbackKind::Before,
                        source,
                    });
                }
            }
        }

        let arounds: Vec<&Callback<T>> = callbacks
            .iter()
            .filter(|callback| callback.kind() == CallbackKind::Around)
            .collect();

        let state = RunState::new(event);
        let mut body = Some(body);
        let mut value = None;
        let mut invoke_body = |subject: &mut T| -> ActionResult {
            match body.take() {
                Some(body) => body(subject).map(|result| value = Some(result)),
                None => Ok(()),
            }
        };

        let chain = Next {
            arounds: &arounds,
            body: &mut invoke_body,
            state: &state,
        }
        .proceed(subject);

        let RunState {
            failure,
            skipped_by,
            ..
        } = state;
        if let Some(error) = failure.into_inner() {
            return Err(error);
        }
        if let Err(source) = chain {
            // Every failure inside the chain is recorded; this is unreachable
            // unless a frame returned an error without going through `fail`.
            return Err(RunError::Body {
                event: event.to_owned(),
                source,
            });
        }

        for callback in callbacks {
            let Action::After(action) = &callback.action else {
                continue;
            };
            if !callback.applies_to(subject) {
                tracing::trace!(callback = callback.name(), "after callback guarded out");
                continue;
            }
            tracing::trace!(callback = callback.name(), kind = "after", "invoking callback");
            action(subject).map_err(|source| RunError::Callback {
                event: event.to_owned(),
                callback: callback.name().to_owned(),
                kind: CallbackKind::After,
                source,
            })?;
        }

        Ok(match value {
            Some(value) => RunOutcome::Completed(value),
            None => RunOutcome::Skipped {
                by: skipped_by.into_inner().unwrap_or_default(),
            },
        })
    }
}
