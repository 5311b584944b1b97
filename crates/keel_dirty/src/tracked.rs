//! Owner wrapper pairing a model with its change tracker.

use core::ops::Deref;
use std::collections::BTreeMap;

use crate::attributes::AttributeSet;
use crate::change::{Change, Changes};
use crate::error::DirtyError;
use crate::tracker::ChangeTracker;

/// A model whose attribute writes are tracked.
///
/// `Tracked` owns the model and its [`ChangeTracker`]. Reads go through
/// [`Deref`]; writes go through [`set`](Self::set), which records the
/// original value before the first real change of each attribute.
///
/// # Example
///
/// ```
/// use keel_dirty::{AttributeSet, Change, Tracked};
///
/// #[derive(AttributeSet)]
/// struct Person {
///     first_name: String,
///     last_name: String,
/// }
///
/// let mut person = Tracked::new(Person {
///     first_name: "John".into(),
///     last_name: "Doe".into(),
/// });
///
/// person.set("first_name", "Jane".into())?;
/// person.set("first_name", "Alice".into())?;
///
/// assert!(person.is_changed("first_name"));
/// assert_eq!(person.was("first_name").map(String::as_str), Some("John"));
/// assert_eq!(person.change("first_name"), Some(Change::new("John", "Alice")));
///
/// person.save();
/// assert!(!person.has_changes());
/// assert!(person.previously_changed("first_name"));
/// assert_eq!(person.first_name, "Alice");
/// # Ok::<(), keel_dirty::DirtyError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Tracked<A: AttributeSet> {
    attributes: A,
    tracker: ChangeTracker<A::Value>,
}

impl<A: AttributeSet + Default> Default for Tracked<A> {
    fn default() -> Self {
        Self::new(A::default())
    }
}

impl<A: AttributeSet> Deref for Tracked<A> {
    type Target = A;

    fn deref(&self) -> &A {
        &self.attributes
    }
}

impl<A: AttributeSet> Tracked<A> {
    /// Starts tracking `attributes` with no recorded changes.
    pub fn new(attributes: A) -> Self {
        Self {
            attributes,
            tracker: ChangeTracker::new(),
        }
    }

    /// Returns the tracker.
    #[must_use]
    pub fn tracker(&self) -> &ChangeTracker<A::Value> {
        &self.tracker
    }

    /// Stops tracking and returns the model.
    pub fn into_inner(self) -> A {
        self.attributes
    }

    /// Returns the live value of an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&A::Value> {
        self.attributes.read_attribute(name)
    }

    /// Assigns an attribute, recording the change if the value differs.
    ///
    /// Returns whether the value changed.
    ///
    /// # Errors
    ///
    /// Returns [`DirtyError::UnknownAttribute`] if `name` is not an attribute.
    pub fn set(&mut self, name: &str, value: A::Value) -> Result<bool, DirtyError> {
        let current = self
            .attributes
            .read_attribute(name)
            .ok_or_else(|| DirtyError::unknown_attribute(name))?;
        if *current == value {
            return Ok(false);
        }

        self.tracker.mark_changed(&self.attributes, name)?;
        self.attributes.write_attribute(name, value)?;
        Ok(true)
    }

    /// Assigns an attribute from a closure over its current value.
    ///
    /// # Errors
    ///
    /// Returns [`DirtyError::UnknownAttribute`] if `name` is not an attribute.
    pub fn update<F>(&mut self, name: &str, f: F) -> Result<bool, DirtyError>
    where
        F: FnOnce(&A::Value) -> A::Value,
    {
        let current = self
            .attributes
            .read_attribute(name)
            .ok_or_else(|| DirtyError::unknown_attribute(name))?;
        let value = f(current);
        self.set(name, value)
    }

    /// Marks an attribute as changed without assigning it.
    ///
    /// Use before mutating a value in place through [`modify`](Self::modify).
    ///
    /// # Errors
    ///
    /// Returns [`DirtyError::UnknownAttribute`] if `name` is not an attribute.
    pub fn will_change(&mut self, name: &str) -> Result<bool, DirtyError> {
        self.tracker.mark_changed(&self.attributes, name)
    }

    /// Gives mutable access to the model for writes that bypass tracking.
    ///
    /// Call [`will_change`](Self::will_change) first for each attribute that
    /// will be modified.
    pub fn modify(&mut self) -> &mut A {
        &mut self.attributes
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Current generation
    // ─────────────────────────────────────────────────────────────────────────

    /// See [`ChangeTracker::is_changed`].
    #[must_use]
    pub fn is_changed(&self, name: &str) -> bool {
        self.tracker.is_changed(name)
    }

    /// See [`ChangeTracker::is_changed_from_to`].
    #[must_use]
    pub fn is_changed_from_to(&self, name: &str, from: &A::Value, to: &A::Value) -> bool {
        self.tracker
            .is_changed_from_to(&self.attributes, name, from, to)
    }

    /// See [`ChangeTracker::has_changes`].
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.tracker.has_changes()
    }

    /// See [`ChangeTracker::changed`].
    #[must_use]
    pub fn changed(&self) -> Vec<&str> {
        self.tracker.changed()
    }

    /// See [`ChangeTracker::was`].
    #[must_use]
    pub fn was(&self, name: &str) -> Option<&A::Value> {
        self.tracker.was(&self.attributes, name)
    }

    /// See [`ChangeTracker::change`].
    #[must_use]
    pub fn change(&self, name: &str) -> Option<Change<A::Value>> {
        self.tracker.change(&self.attributes, name)
    }

    /// See [`ChangeTracker::changes`].
    #[must_use]
    pub fn changes(&self) -> Changes<A::Value> {
        self.tracker.changes(&self.attributes)
    }

    /// See [`ChangeTracker::changed_attributes`].
    #[must_use]
    pub fn changed_attributes(&self) -> BTreeMap<String, A::Value> {
        self.tracker.changed_attributes()
    }

    /// See [`ChangeTracker::restore`].
    ///
    /// # Errors
    ///
    /// Returns [`DirtyError::UnknownAttribute`] if the write is rejected.
    pub fn restore(&mut self, name: &str) -> Result<bool, DirtyError> {
        self.tracker.restore(&mut self.attributes, name)
    }

    /// See [`ChangeTracker::restore_many`].
    ///
    /// # Errors
    ///
    /// Returns [`DirtyError::UnknownAttribute`] if a write is rejected.
    pub fn restore_many<I, S>(&mut self, names: I) -> Result<(), DirtyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tracker.restore_many(&mut self.attributes, names)
    }

    /// See [`ChangeTracker::clear_change`].
    pub fn clear_change(&mut self, name: &str) -> bool {
        self.tracker.clear_change(name)
    }

    /// See [`ChangeTracker::clear_changes`].
    pub fn clear_changes<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tracker.clear_changes(names);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Generation boundaries
    // ─────────────────────────────────────────────────────────────────────────

    /// Commits the current changes after a successful persist.
    pub fn save(&mut self) {
        self.tracker.commit(&self.attributes);
    }

    /// Writes every original value back and clears the current changes.
    ///
    /// # Errors
    ///
    /// Returns [`DirtyError::UnknownAttribute`] if a write is rejected.
    pub fn rollback(&mut self) -> Result<(), DirtyError> {
        self.tracker.rollback(&mut self.attributes)
    }

    /// Forgets the current and previous changes, keeping live values.
    ///
    /// Call it when the model's values are replaced from storage. Use
    /// [`ChangeTracker::reload`] directly to keep the previous generation.
    pub fn reload(&mut self) {
        self.tracker.clear_all();
    }

    /// Forgets both the current and the previous changes, like
    /// [`reload`](Self::reload).
    pub fn clear_changes_information(&mut self) {
        self.tracker.clear_all();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Previous generation
    // ─────────────────────────────────────────────────────────────────────────

    /// See [`ChangeTracker::previous_was`].
    #[must_use]
    pub fn previous_was(&self, name: &str) -> Option<&A::Value> {
        self.tracker.previous_was(name)
    }

    /// See [`ChangeTracker::previous_change`].
    #[must_use]
    pub fn previous_change(&self, name: &str) -> Option<&Change<A::Value>> {
        self.tracker.previous_change(name)
    }

    /// See [`ChangeTracker::previously_changed`].
    #[must_use]
    pub fn previously_changed(&self, name: &str) -> bool {
        self.tracker.previously_changed(name)
    }

    /// See [`ChangeTracker::previously_changed_from_to`].
    #[must_use]
    pub fn previously_changed_from_to(&self, name: &str, from: &A::Value, to: &A::Value) -> bool {
        self.tracker.previously_changed_from_to(name, from, to)
    }

    /// See [`ChangeTracker::previous_changes`].
    #[must_use]
    pub fn previous_changes(&self) -> &Changes<A::Value> {
        self.tracker.previous_changes()
    }
}
