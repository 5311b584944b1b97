//! Callback registry.
//!
//! The [`CallbackRegistry`] maps event names to the ordered callbacks
//! registered against them. Events must be declared before callbacks can be
//! attached, mirroring class-level `define_model_callbacks` declarations.
//!
//! Registration borrows the registry mutably and [`run`](CallbackRegistry::run)
//! borrows it shared, so a registry can never change while a run is in flight.
//! Build it once at setup time, then share it (for example behind an `Arc`).
//!
//! # Example
//!
//! ```
//! use keel_callbacks::{CallbackKind, CallbackRegistry};
//!
//! struct Person {
//!     name: String,
//! }
//!
//! let mut registry = CallbackRegistry::<Person>::new();
//! registry.declare("save")?;
//! registry.declare_with("validation", [CallbackKind::Before, CallbackKind::After])?;
//!
//! registry
//!     .before("save", "strip_name", |person: &mut Person| {
//!         person.name = person.name.trim().to_owned();
//!         Ok(())
//!     })?
//!     .around("save", "logging", |person: &mut Person, next| {
//!         tracing::info!(name = %person.name, "saving");
//!         next.proceed(person)
//!     })?;
//!
//! assert_eq!(registry.callback_count("save"), 2);
//! assert!(registry.around("validation", "timer", |p: &mut Person, next| next.proceed(p)).is_err());
//! # Ok::<(), keel_callbacks::RegistrationError>(())
//! ```

use core::fmt;

use hashbrown::{HashMap, HashSet};

use crate::callback::{Callback, CallbackKind};
use crate::error::{ActionResult, RegistrationError};
use crate::run::Next;

// ─────────────────────────────────────────────────────────────────────────────
// EventEntry
// ─────────────────────────────────────────────────────────────────────────────

/// Declared event with its accepted kinds and ordered callbacks.
struct EventEntry<T> {
    kinds: HashSet<CallbackKind>,
    callbacks: Vec<Callback<T>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// CallbackRegistry
// ─────────────────────────────────────────────────────────────────────────────

/// Registry of lifecycle events and their callbacks for subjects of type `T`.
///
/// Callbacks run in registration order: before and after callbacks
/// sequentially, around callbacks nested with the first registered
/// outermost. Registering a name the event already has moves it to the end.
pub struct CallbackRegistry<T> {
    events: HashMap<String, EventEntry<T>>,
}

impl<T> Default for CallbackRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CallbackRegistry<T> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: HashMap::new(),
        }
    }

    /// Declares an event accepting every callback kind.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateEvent`] if `event` is already declared.
    pub fn declare(&mut self, event: impl Into<String>) -> Result<&mut Self, RegistrationError> {
        self.declare_with(event, CallbackKind::ALL)
    }

    /// Declares an event that only accepts the given callback kinds.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateEvent`] if `event` is already declared.
    pub fn declare_with(
        &mut self,
        event: impl Into<String>,
        kinds: impl IntoIterator<Item = CallbackKind>,
    ) -> Result<&mut Self, RegistrationError> {
        let event = event.into();
        if self.events.contains_key(&event) {
            return Err(RegistrationError::DuplicateEvent { event });
        }

        let kinds: HashSet<CallbackKind> = kinds.into_iter().collect();
        tracing::debug!(event = %event, ?kinds, "declared event");
        self.events.insert(
            event,
            EventEntry {
                kinds,
                callbacks: Vec::new(),
            },
        );
        Ok(self)
    }

    /// Appends a callback to the event's list.
    ///
    /// A callback already registered under the same name on this event is
    /// removed first, so the new one replaces it at the end of the list.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::UnknownEvent`] if `event` was never declared.
    /// - [`RegistrationError::KindNotAllowed`] if the event does not accept the callback's kind.
    pub fn register(
        &mut self,
        event: &str,
        callback: Callback<T>,
    ) -> Result<&mut Self, RegistrationError> {
        let Some(entry) = self.events.get_mut(event) else {
            return Err(RegistrationError::UnknownEvent {
                event: event.to_owned(),
            });
        };

        if !entry.kinds.contains(&callback.kind()) {
            return Err(RegistrationError::KindNotAllowed {
                event: event.to_owned(),
                kind: callback.kind(),
            });
        }

        if let Some(index) = entry
            .callbacks
            .iter()
            .position(|existing| existing.name() == callback.name())
        {
            let replaced = entry.callbacks.remove(index);
            tracing::debug!(
                event,
                callback = replaced.name(),
                kind = %replaced.kind(),
                "replaced callback"
            );
        }

        tracing::debug!(
            event,
            callback = callback.name(),
            kind = %callback.kind(),
            "registered callback"
        );
        entry.callbacks.push(callback);
        Ok(self)
    }

    /// Registers a callback that runs before the body.
    ///
    /// # Errors
    ///
    /// See [`register`](Self::register).
    pub fn before<F>(
        &mut self,
        event: &str,
        name: impl Into<String>,
        action: F,
    ) -> Result<&mut Self, RegistrationError>
    where
        F: Fn(&mut T) -> ActionResult + Send + Sync + 'static,
    {
        self.register(event, Callback::before(name, action))
    }

    /// Registers a callback that wraps the body.
    ///
    /// # Errors
    ///
    /// See [`register`](Self::register).
    pub fn around<F>(
        &mut self,
        event: &str,
        name: impl Into<String>,
        action: F,
    ) -> Result<&mut Self, RegistrationError>
    where
        F: Fn(&mut T, Next<'_, T>) -> ActionResult + Send + Sync + 'static,
    {
        self.register(event, Callback::around(name, action))
    }

    /// Registers a callback that runs after a successful body.
    ///
    /// # Errors
    ///
    /// See [`register`](Self::register).
    pub fn after<F>(
        &mut self,
        event: &str,
        name: impl Into<String>,
        action: F,
    ) -> Result<&mut Self, RegistrationError>
    where
        F: Fn(&mut T) -> ActionResult + Send + Sync + 'static,
    {
        self.register(event, Callback::after(name, action))
    }

    /// Returns the ordered callbacks for an event, or `None` if undeclared.
    #[must_use]
    pub fn callbacks(&self, event: &str) -> Option<&[Callback<T>]> {
        self.events
            .get(event)
            .map(|entry| entry.callbacks.as_slice())
    }

    /// Returns whether `event` has been declared.
    #[must_use]
    pub fn is_declared(&self, event: &str) -> bool {
        self.events.contains_key(event)
    }

    /// Returns whether `event` accepts callbacks of `kind`.
    #[must_use]
    pub fn accepts(&self, event: &str, kind: CallbackKind) -> bool {
        self.events
            .get(event)
            .is_some_and(|entry| entry.kinds.contains(&kind))
    }

    /// Returns the number of callbacks registered for `event`.
    #[must_use]
    pub fn callback_count(&self, event: &str) -> usize {
        self.callbacks(event).map_or(0, <[_]>::len)
    }

    /// Checks if a callback with the given name exists on the event.
    #[must_use]
    pub fn contains_callback(&self, event: &str, name: &str) -> bool {
        self.callbacks(event)
            .is_some_and(|callbacks| callbacks.iter().any(|callback| callback.name() == name))
    }

    /// Returns the declared event names, in no particular order.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }
}

impl<T> fmt::Debug for CallbackRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.events
                    .iter()
                    .map(|(event, entry)| (event, &entry.callbacks)),
            )
            .finish()
    }
}
