//! Callback descriptors.
//!
//! A [`Callback`] pairs a [`CallbackKind`] and a name with the action to run.
//! Before and after callbacks receive the subject; around callbacks also
//! receive a [`Next`] continuation that runs the rest of the chain.

use core::fmt;

use crate::error::ActionResult;
use crate::run::Next;

// ─────────────────────────────────────────────────────────────────────────────
// CallbackKind
// ─────────────────────────────────────────────────────────────────────────────

/// Position of a callback relative to the guarded body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    /// Runs before the body, in registration order.
    Before,
    /// Wraps the body. The first registered around is outermost.
    Around,
    /// Runs after the body, in registration order, only on success.
    After,
}

impl CallbackKind {
    /// All callback kinds, in execution order.
    pub const ALL: [CallbackKind; 3] = [Self::Before, Self::Around, Self::After];

    /// Returns the lowercase name of this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::Around => "around",
            Self::After => "after",
        }
    }
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Action
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) type HookFn<T> = Box<dyn Fn(&mut T) -> ActionResult + Send + Sync>;
pub(crate) type AroundFn<T> = Box<dyn Fn(&mut T, Next<'_, T>) -> ActionResult + Send + Sync>;
type GuardFn<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Type-erased action. The variant determines the callback kind.
pub(crate) enum Action<T> {
    Before(HookFn<T>),
    Around(AroundFn<T>),
    After(HookFn<T>),
}

// ─────────────────────────────────────────────────────────────────────────────
// Callback
// ─────────────────────────────────────────────────────────────────────────────

/// A named callback for a lifecycle event.
///
/// Most callers use [`CallbackRegistry::before`](crate::CallbackRegistry::before)
/// and its siblings. Build a `Callback` directly to attach a guard with
/// [`when`](Self::when) before registering it.
///
/// # Example
///
/// ```
/// use keel_callbacks::{Callback, CallbackKind};
///
/// struct Order {
///     total: u32,
///     discounted: bool,
/// }
///
/// let callback = Callback::before("apply_discount", |order: &mut Order| {
///     order.total -= 10;
///     order.discounted = true;
///     Ok(())
/// })
/// .when(|order: &Order| order.total > 100);
///
/// assert_eq!(callback.kind(), CallbackKind::Before);
/// assert_eq!(callback.name(), "apply_discount");
/// ```
pub struct Callback<T> {
    name: String,
    pub(crate) action: Action<T>,
    guard: Option<GuardFn<T>>,
}

impl<T> Callback<T> {
    /// Creates a callback that runs before the body.
    pub fn before<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut T) -> ActionResult + Send + Sync + 'static,
    {
        Self::with_action(name, Action::Before(Box::new(action)))
    }

    /// Creates a callback that runs after a successful body.
    pub fn after<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut T) -> ActionResult + Send + Sync + 'static,
    {
        Self::with_action(name, Action::After(Box::new(action)))
    }

    /// Creates a callback that wraps the body.
    ///
    /// The action must call [`Next::proceed`] to continue the chain. Not
    /// calling it skips the body and every inner around callback.
    pub fn around<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut T, Next<'_, T>) -> ActionResult + Send + Sync + 'static,
    {
        Self::with_action(name, Action::Around(Box::new(action)))
    }

    fn with_action(name: impl Into<String>, action: Action<T>) -> Self {
        Self {
            name: name.into(),
            action,
            guard: None,
        }
    }

    /// Only runs the callback when `guard` returns `true` for the subject.
    ///
    /// The guard is evaluated at the point the callback would run. A
    /// guarded-out around callback is transparent: the chain proceeds as if
    /// it were not registered.
    #[must_use]
    pub fn when<G>(mut self, guard: G) -> Self
    where
        G: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Box::new(guard));
        self
    }

    /// Only runs the callback when `guard` returns `false` for the subject.
    #[must_use]
    pub fn unless<G>(self, guard: G) -> Self
    where
        G: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.when(move |subject| !guard(subject))
    }

    /// Returns the callback kind.
    #[must_use]
    pub fn kind(&self) -> CallbackKind {
        match self.action {
            Action::Before(_) => CallbackKind::Before,
            Action::Around(_) => CallbackKind::Around,
            Action::After(_) => CallbackKind::After,
        }
    }

    /// Returns the callback name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether a guard is attached.
    #[must_use]
    pub fn is_guarded(&self) -> bool {
        self.guard.is_some()
    }

    /// Evaluates the guard against the subject.
    pub(crate) fn applies_to(&self, subject: &T) -> bool {
        self.guard.as_ref().is_none_or(|guard| guard(subject))
    }
}

impl<T> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("guarded", &self.is_guarded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_kind() {
        let before = Callback::<u32>::before("b", |_| Ok(()));
        let after = Callback::<u32>::after("a", |_| Ok(()));
        let around = Callback::<u32>::around("r", |subject, next| next.proceed(subject));

        assert_eq!(before.kind(), CallbackKind::Before);
        assert_eq!(after.kind(), CallbackKind::After);
        assert_eq!(around.kind(), CallbackKind::Around);
    }

    #[test]
    fn unguarded_callback_always_applies() {
        let callback = Callback::<u32>::before("b", |_| Ok(()));
        assert!(!callback.is_guarded());
        assert!(callback.applies_to(&0));
    }

    #[test]
    fn when_and_unless_guards() {
        let when = Callback::<u32>::before("b", |_| Ok(())).when(|n| *n > 5);
        let unless = Callback::<u32>::before("b", |_| Ok(())).unless(|n| *n > 5);

        assert!(when.applies_to(&6));
        assert!(!when.applies_to(&5));
        assert!(!unless.applies_to(&6));
        assert!(unless.applies_to(&5));
    }

    #[test]
    fn kind_display_is_lowercase() {
        let names: Vec<String> = CallbackKind::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["before", "around", "after"]);
    }

    #[test]
    fn debug_omits_action() {
        let callback = Callback::<u32>::after("audit", |_| Ok(()));
        let debug = format!("{callback:?}");
        assert!(debug.contains("audit"));
        assert!(debug.contains("After"));
    }
}
