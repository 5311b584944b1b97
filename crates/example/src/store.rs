//! In-memory person store whose saves run through lifecycle callbacks.

use keel_callbacks::{
    ActionError, Callback, CallbackKind, CallbackRegistry, RegistrationError, RunError, RunOutcome,
};
use keel_dirty::{Changes, Tracked};
use serde::Serialize;

use crate::person::Person;

/// Event run before every save. Accepts before and after callbacks only.
pub const VALIDATION: &str = "validation";

/// Event wrapping the write itself.
pub const SAVE: &str = "save";

/// A row written by [`PersonStore::save`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedRecord {
    /// Row id, starting at 1.
    pub id: usize,
    /// The person as written.
    pub person: Person,
    /// Changes the write persisted.
    pub changes: Changes<String>,
}

/// Append-only store of saved people.
///
/// A save runs the [`VALIDATION`] event, then the [`SAVE`] event around the
/// write. A successful write commits the person's changes; a failed one
/// leaves them in place so the caller can retry or roll back.
pub struct PersonStore {
    callbacks: CallbackRegistry<Tracked<Person>>,
    records: Vec<SavedRecord>,
    capacity: Option<usize>,
}

impl PersonStore {
    /// Creates a store with the standard person callbacks.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistrationError`] if the callback setup is inconsistent.
    pub fn new() -> Result<Self, RegistrationError> {
        Ok(Self {
            callbacks: person_callbacks()?,
            records: Vec::new(),
            capacity: None,
        })
    }

    /// Limits the number of rows; writes beyond it fail.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Returns the callback registry.
    #[must_use]
    pub fn callbacks(&self) -> &CallbackRegistry<Tracked<Person>> {
        &self.callbacks
    }

    /// Returns the rows written so far.
    #[must_use]
    pub fn records(&self) -> &[SavedRecord] {
        &self.records
    }

    /// Validates and writes `person`.
    ///
    /// Returns the new row id, or the callback that halted or skipped the
    /// write.
    ///
    /// # Errors
    ///
    /// Returns a [`RunError`] if a callback or the write fails.
    pub fn save(&mut self, person: &mut Tracked<Person>) -> Result<RunOutcome<usize>, RunError> {
        match self.callbacks.run(VALIDATION, person, |_| Ok(()))? {
            RunOutcome::Completed(()) => {}
            RunOutcome::Halted { by } => return Ok(RunOutcome::Halted { by }),
            RunOutcome::Skipped { by } => return Ok(RunOutcome::Skipped { by }),
        }

        let records = &mut self.records;
        let capacity = self.capacity;
        self.callbacks.run(SAVE, person, |person| {
            if capacity.is_some_and(|capacity| records.len() >= capacity) {
                return Err(ActionError::failed("store is full"));
            }

            let id = records.len() + 1;
            person.modify().revision += 1;
            records.push(SavedRecord {
                id,
                person: (**person).clone(),
                changes: person.changes(),
            });
            person.save();
            tracing::debug!(id, "person written");
            Ok(id)
        })
    }
}

/// Builds the registry used by [`PersonStore`].
///
/// # Errors
///
/// Returns a [`RegistrationError`] if an event is declared twice.
pub fn person_callbacks() -> Result<CallbackRegistry<Tracked<Person>>, RegistrationError> {
    let mut registry = CallbackRegistry::new();
    registry
        .declare_with(VALIDATION, [CallbackKind::Before, CallbackKind::After])?
        .declare(SAVE)?;

    registry
        .register(
            VALIDATION,
            Callback::before("reject_blank_name", |_: &mut Tracked<Person>| {
                Err(ActionError::Abort)
            })
            .when(|person: &Tracked<Person>| person.name.trim().is_empty()),
        )?
        .register(
            SAVE,
            Callback::before("normalize_email", |person: &mut Tracked<Person>| {
                person
                    .update("email", |email| email.trim().to_lowercase())
                    .map_err(ActionError::other)?;
                Ok(())
            })
            .when(|person: &Tracked<Person>| person.is_new() || person.is_changed("email")),
        )?
        .register(
            SAVE,
            Callback::before("append_suffix", |person: &mut Tracked<Person>| {
                person
                    .update("name", |name| format!("{name} Doe"))
                    .map_err(ActionError::other)?;
                Ok(())
            })
            .when(|person: &Tracked<Person>| person.is_new()),
        )?
        .register(
            SAVE,
            Callback::before("append_suffix2", |person: &mut Tracked<Person>| {
                person
                    .update("name", |name| format!("{name} Jr."))
                    .map_err(ActionError::other)?;
                Ok(())
            })
            .when(|person: &Tracked<Person>| person.is_new()),
        )?
        .after(SAVE, "uppercase_name", |person: &mut Tracked<Person>| {
            person
                .update("name", |name| name.to_uppercase())
                .map_err(ActionError::other)?;
            Ok(())
        })?
        .around(SAVE, "logging", |person: &mut Tracked<Person>, next| {
            tracing::info!(name = %person.name, changed = ?person.changed(), "saving person");
            let result = next.proceed(person);
            tracing::info!(name = %person.name, ok = result.is_ok(), "saved person");
            result
        })?;

    Ok(registry)
}
