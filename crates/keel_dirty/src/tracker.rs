//! Change tracker.
//!
//! A [`ChangeTracker`] records, per attribute, the value it had before its
//! first change in the current *generation*. A generation ends with
//! [`commit`](ChangeTracker::commit), which promotes the current changes to
//! the previous-generation set, with [`rollback`](ChangeTracker::rollback),
//! which writes the originals back, or with [`reload`](ChangeTracker::reload),
//! which forgets them.
//!
//! The tracker never stores current values. Operations that need them read
//! the live attributes through [`AttributeSet`]; most callers use
//! [`Tracked`](crate::Tracked), which owns both.

use std::collections::BTreeMap;

use hashbrown::HashMap;

use crate::attributes::AttributeSet;
use crate::change::{Change, Changes};
use crate::error::DirtyError;

/// Per-object change records for the current and previous generation.
#[derive(Debug, Clone)]
pub struct ChangeTracker<V> {
    /// Attribute name to the value captured at its first change.
    originals: HashMap<String, V>,
    /// Changes promoted by the last commit.
    previous: Changes<V>,
}

impl<V> Default for ChangeTracker<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ChangeTracker<V> {
    /// Creates a tracker with no recorded changes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            originals: HashMap::new(),
            previous: Changes::new(),
        }
    }
}

impl<V: Clone + PartialEq> ChangeTracker<V> {
    // ─────────────────────────────────────────────────────────────────────────
    // Current generation
    // ─────────────────────────────────────────────────────────────────────────

    /// Records that `name` is about to change.
    ///
    /// The live value is captured as the original only on the first call in
    /// a generation; later calls leave it untouched. Call this before writing
    /// the new value. Returns whether a record was created.
    ///
    /// # Errors
    ///
    /// Returns [`DirtyError::UnknownAttribute`] if `name` is not an attribute.
    pub fn mark_changed<A>(&mut self, attributes: &A, name: &str) -> Result<bool, DirtyError>
    where
        A: AttributeSet<Value = V>,
    {
        let live = attributes
            .read_attribute(name)
            .ok_or_else(|| DirtyError::unknown_attribute(name))?;

        if self.originals.contains_key(name) {
            return Ok(false);
        }

        tracing::trace!(attribute = name, "attribute marked as changed");
        self.originals.insert(name.to_owned(), live.clone());
        Ok(true)
    }

    /// Returns whether `name` changed in the current generation.
    #[must_use]
    pub fn is_changed(&self, name: &str) -> bool {
        self.originals.contains_key(name)
    }

    /// Returns whether `name` changed from `from` to its current value `to`.
    #[must_use]
    pub fn is_changed_from_to<A>(&self, attributes: &A, name: &str, from: &V, to: &V) -> bool
    where
        A: AttributeSet<Value = V>,
    {
        self.change(attributes, name)
            .is_some_and(|change| change.from == *from && change.to == *to)
    }

    /// Returns whether any attribute changed in the current generation.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.originals.is_empty()
    }

    /// Returns the names of the changed attributes, sorted.
    #[must_use]
    pub fn changed(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.originals.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the value `name` had before its first change, or its live
    /// value if it has not changed.
    ///
    /// Returns `None` only if `name` is not an attribute.
    #[must_use]
    pub fn was<'a, A>(&'a self, attributes: &'a A, name: &str) -> Option<&'a V>
    where
        A: AttributeSet<Value = V>,
    {
        self.originals
            .get(name)
            .or_else(|| attributes.read_attribute(name))
    }

    /// Returns the original and live value of `name`, or `None` if it has
    /// not changed.
    ///
    /// An unchanged attribute reports `None`, never a pair of equal values.
    #[must_use]
    pub fn change<A>(&self, attributes: &A, name: &str) -> Option<Change<V>>
    where
        A: AttributeSet<Value = V>,
    {
        let from = self.originals.get(name)?;
        let to = attributes.read_attribute(name)?;
        Some(Change {
            from: from.clone(),
            to: to.clone(),
        })
    }

    /// Returns every current change, keyed by attribute name.
    #[must_use]
    pub fn changes<A>(&self, attributes: &A) -> Changes<V>
    where
        A: AttributeSet<Value = V>,
    {
        self.originals
            .iter()
            .filter_map(|(name, from)| {
                let to = attributes.read_attribute(name)?;
                Some((
                    name.clone(),
                    Change {
                        from: from.clone(),
                        to: to.clone(),
                    },
                ))
            })
            .collect()
    }

    /// Returns the original value of every changed attribute.
    #[must_use]
    pub fn changed_attributes(&self) -> BTreeMap<String, V> {
        self.originals
            .iter()
            .map(|(name, from)| (name.clone(), from.clone()))
            .collect()
    }

    /// Writes the original value of `name` back and forgets its change.
    ///
    /// Returns whether there was a change to restore.
    ///
    /// # Errors
    ///
    /// Returns [`DirtyError::UnknownAttribute`] if the write is rejected. The
    /// change record is kept in that case.
    pub fn restore<A>(&mut self, attributes: &mut A, name: &str) -> Result<bool, DirtyError>
    where
        A: AttributeSet<Value = V>,
    {
        let Some(original) = self.originals.get(name) else {
            return Ok(false);
        };

        attributes.write_attribute(name, original.clone())?;
        self.originals.remove(name);
        tracing::trace!(attribute = name, "attribute restored");
        Ok(true)
    }

    /// Restores each of `names`. Unchanged names are ignored.
    ///
    /// # Errors
    ///
    /// Stops at the first rejected write; see [`restore`](Self::restore).
    pub fn restore_many<A, I, S>(&mut self, attributes: &mut A, names: I) -> Result<(), DirtyError>
    where
        A: AttributeSet<Value = V>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.restore(attributes, name.as_ref())?;
        }
        Ok(())
    }

    /// Forgets the change to `name` without touching its live value.
    ///
    /// Returns whether there was a change to forget.
    pub fn clear_change(&mut self, name: &str) -> bool {
        self.originals.remove(name).is_some()
    }

    /// Forgets the changes to each of `names`.
    pub fn clear_changes<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.originals.remove(name.as_ref());
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Generation boundaries
    // ─────────────────────────────────────────────────────────────────────────

    /// Ends the generation, promoting its changes to the previous set.
    ///
    /// The previous set is replaced as a whole, even when there are no
    /// current changes.
    pub fn commit<A>(&mut self, attributes: &A)
    where
        A: AttributeSet<Value = V>,
    {
        self.previous = self.changes(attributes);
        self.originals.clear();
        tracing::trace!(committed = self.previous.len(), "changes committed");
    }

    /// Ends the generation, writing every original value back.
    ///
    /// The previous set is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DirtyError::UnknownAttribute`] if a write is rejected.
    /// Attributes restored before the failure stay restored and lose their
    /// records; the rest keep theirs.
    pub fn rollback<A>(&mut self, attributes: &mut A) -> Result<(), DirtyError>
    where
        A: AttributeSet<Value = V>,
    {
        let names: Vec<String> = self.originals.keys().cloned().collect();
        for name in &names {
            if let Some(original) = self.originals.get(name) {
                attributes.write_attribute(name, original.clone())?;
                self.originals.remove(name);
            }
        }
        tracing::trace!(restored = names.len(), "changes rolled back");
        Ok(())
    }

    /// Ends the generation, forgetting its changes without restoring them.
    ///
    /// The previous set is left untouched.
    pub fn reload(&mut self) {
        self.originals.clear();
        tracing::trace!("current changes cleared");
    }

    /// Forgets both the current and the previous changes.
    pub fn clear_all(&mut self) {
        self.originals.clear();
        self.previous.clear();
        tracing::trace!("all change information cleared");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Previous generation
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the value `name` had before the last committed change.
    #[must_use]
    pub fn previous_was(&self, name: &str) -> Option<&V> {
        self.previous.get(name).map(|change| &change.from)
    }

    /// Returns the change to `name` promoted by the last commit.
    #[must_use]
    pub fn previous_change(&self, name: &str) -> Option<&Change<V>> {
        self.previous.get(name)
    }

    /// Returns whether `name` changed in the last committed generation.
    #[must_use]
    pub fn previously_changed(&self, name: &str) -> bool {
        self.previous.contains_key(name)
    }

    /// Returns whether `name` changed from `from` to `to` in the last
    /// committed generation.
    #[must_use]
    pub fn previously_changed_from_to(&self, name: &str, from: &V, to: &V) -> bool {
        self.previous
            .get(name)
            .is_some_and(|change| change.from == *from && change.to == *to)
    }

    /// Returns every change promoted by the last commit.
    #[must_use]
    pub fn previous_changes(&self) -> &Changes<V> {
        &self.previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal hand-written attribute set.
    #[derive(Debug, Clone, PartialEq)]
    struct Pair {
        left: i32,
        right: i32,
    }

    impl AttributeSet for Pair {
        type Value = i32;

        const ATTRIBUTES: &'static [&'static str] = &["left", "right"];

        fn read_attribute(&self, name: &str) -> Option<&i32> {
            match name {
                "left" => Some(&self.left),
                "right" => Some(&self.right),
                _ => None,
            }
        }

        fn write_attribute(&mut self, name: &str, value: i32) -> Result<(), DirtyError> {
            match name {
                "left" => self.left = value,
                "right" => self.right = value,
                _ => return Err(DirtyError::unknown_attribute(name)),
            }
            Ok(())
        }
    }

    fn set(tracker: &mut ChangeTracker<i32>, pair: &mut Pair, name: &str, value: i32) {
        tracker.mark_changed(&*pair, name).unwrap();
        pair.write_attribute(name, value).unwrap();
    }

    #[test]
    fn first_mark_wins() {
        let mut tracker = ChangeTracker::<i32>::new();
        let mut pair = Pair { left: 1, right: 2 };

        set(&mut tracker, &mut pair, "left", 10);
        set(&mut tracker, &mut pair, "left", 20);

        assert!(tracker.is_changed("left"));
        assert_eq!(tracker.was(&pair, "left"), Some(&1));
        assert_eq!(tracker.change(&pair, "left"), Some(Change { from: 1, to: 20 }));
    }

    #[test]
    fn mark_reports_whether_record_was_created() {
        let mut tracker = ChangeTracker::<i32>::new();
        let pair = Pair { left: 1, right: 2 };

        assert_eq!(tracker.mark_changed(&pair, "left"), Ok(true));
        assert_eq!(tracker.mark_changed(&pair, "left"), Ok(false));
        assert_eq!(
            tracker.mark_changed(&pair, "middle"),
            Err(DirtyError::UnknownAttribute("middle".to_owned()))
        );
    }

    #[test]
    fn unchanged_attribute_reports_live_value_and_no_change() {
        let tracker = ChangeTracker::<i32>::new();
        let pair = Pair { left: 1, right: 2 };

        assert!(!tracker.is_changed("right"));
        assert_eq!(tracker.was(&pair, "right"), Some(&2));
        assert_eq!(tracker.change(&pair, "right"), None);
        assert_eq!(tracker.was(&pair, "middle"), None);
    }

    #[test]
    fn changed_from_to_checks_both_ends() {
        let mut tracker = ChangeTracker::<i32>::new();
        let mut pair = Pair { left: 1, right: 2 };
        set(&mut tracker, &mut pair, "left", 5);

        assert!(tracker.is_changed_from_to(&pair, "left", &1, &5));
        assert!(!tracker.is_changed_from_to(&pair, "left", &1, &6));
        assert!(!tracker.is_changed_from_to(&pair, "right", &2, &2));
    }

    #[test]
    fn restore_writes_original_back() {
        let mut tracker = ChangeTracker::<i32>::new();
        let mut pair = Pair { left: 1, right: 2 };
        set(&mut tracker, &mut pair, "left", 5);

        assert_eq!(tracker.restore(&mut pair, "left"), Ok(true));
        assert_eq!(pair.left, 1);
        assert!(!tracker.is_changed("left"));
        assert_eq!(tracker.restore(&mut pair, "left"), Ok(false));
    }

    #[test]
    fn clear_change_keeps_live_value() {
        let mut tracker = ChangeTracker::<i32>::new();
        let mut pair = Pair { left: 1, right: 2 };
        set(&mut tracker, &mut pair, "right", 7);

        assert!(tracker.clear_change("right"));
        assert_eq!(pair.right, 7);
        assert_eq!(tracker.was(&pair, "right"), Some(&7));
        assert_eq!(tracker.change(&pair, "right"), None);
    }

    #[test]
    fn commit_promotes_and_replaces_previous_set() {
        let mut tracker = ChangeTracker::<i32>::new();
        let mut pair = Pair { left: 1, right: 2 };
        set(&mut tracker, &mut pair, "left", 3);
        set(&mut tracker, &mut pair, "right", 4);
        tracker.commit(&pair);

        assert!(!tracker.has_changes());
        assert!(tracker.changes(&pair).is_empty());
        assert_eq!(tracker.previous_changes().len(), 2);
        assert_eq!(tracker.previous_was("left"), Some(&1));

        set(&mut tracker, &mut pair, "left", 9);
        tracker.commit(&pair);

        assert!(tracker.previously_changed("left"));
        assert!(!tracker.previously_changed("right"));
        assert!(tracker.previously_changed_from_to("left", &3, &9));
        assert_eq!(tracker.previous_change("right"), None);
    }

    #[test]
    fn empty_commit_clears_previous_set() {
        let mut tracker = ChangeTracker::<i32>::new();
        let mut pair = Pair { left: 1, right: 2 };
        set(&mut tracker, &mut pair, "left", 3);
        tracker.commit(&pair);
        tracker.commit(&pair);

        assert!(tracker.previous_changes().is_empty());
    }

    #[test]
    fn rollback_restores_all_and_keeps_previous() {
        let mut tracker = ChangeTracker::<i32>::new();
        let mut pair = Pair { left: 1, right: 2 };
        set(&mut tracker, &mut pair, "left", 3);
        tracker.commit(&pair);

        set(&mut tracker, &mut pair, "left", 4);
        set(&mut tracker, &mut pair, "right", 5);
        tracker.rollback(&mut pair).unwrap();

        assert_eq!(pair, Pair { left: 3, right: 2 });
        assert!(tracker.changes(&pair).is_empty());
        assert!(tracker.previously_changed_from_to("left", &1, &3));
    }

    /// Attribute set that refuses writes to one attribute.
    struct Sealed {
        pair: Pair,
        sealed: &'static str,
    }

    impl AttributeSet for Sealed {
        type Value = i32;

        const ATTRIBUTES: &'static [&'static str] = Pair::ATTRIBUTES;

        fn read_attribute(&self, name: &str) -> Option<&i32> {
            self.pair.read_attribute(name)
        }

        fn write_attribute(&mut self, name: &str, value: i32) -> Result<(), DirtyError> {
            if name == self.sealed {
                return Err(DirtyError::unknown_attribute(name));
            }
            self.pair.write_attribute(name, value)
        }
    }

    #[test]
    fn rejected_rollback_keeps_unrestored_records() {
        let mut tracker = ChangeTracker::<i32>::new();
        let mut pair = Pair { left: 1, right: 2 };
        set(&mut tracker, &mut pair, "left", 3);
        set(&mut tracker, &mut pair, "right", 4);

        let mut sealed = Sealed {
            pair,
            sealed: "right",
        };
        let err = tracker.rollback(&mut sealed).unwrap_err();

        assert_eq!(err, DirtyError::UnknownAttribute("right".to_owned()));
        assert_eq!(sealed.pair.right, 4);
        assert_eq!(tracker.was(&sealed.pair, "right"), Some(&2));
        // Write order is unspecified; `left` is either restored and
        // forgotten or untouched and still recorded.
        if sealed.pair.left == 1 {
            assert!(!tracker.is_changed("left"));
        } else {
            assert_eq!(tracker.was(&sealed.pair, "left"), Some(&1));
        }

        sealed.sealed = "";
        tracker.rollback(&mut sealed).unwrap();

        assert_eq!(sealed.pair, Pair { left: 1, right: 2 });
        assert!(!tracker.has_changes());
    }

    #[test]
    fn reload_forgets_without_restoring() {
        let mut tracker = ChangeTracker::<i32>::new();
        let mut pair = Pair { left: 1, right: 2 };
        set(&mut tracker, &mut pair, "left", 3);
        tracker.commit(&pair);
        set(&mut tracker, &mut pair, "left", 4);
        tracker.reload();

        assert_eq!(pair.left, 4);
        assert_eq!(tracker.was(&pair, "left"), Some(&4));
        assert!(tracker.previously_changed("left"));

        tracker.clear_all();
        assert!(!tracker.previously_changed("left"));
    }

    #[test]
    fn list_forms() {
        let mut tracker = ChangeTracker::<i32>::new();
        let mut pair = Pair { left: 1, right: 2 };
        set(&mut tracker, &mut pair, "left", 3);
        set(&mut tracker, &mut pair, "right", 4);

        assert_eq!(tracker.changed(), vec!["left", "right"]);
        assert_eq!(
            tracker.changed_attributes(),
            BTreeMap::from([("left".to_owned(), 1), ("right".to_owned(), 2)])
        );

        tracker.restore_many(&mut pair, ["left"]).unwrap();
        tracker.clear_changes(["right"]);

        assert_eq!(pair, Pair { left: 1, right: 4 });
        assert!(!tracker.has_changes());
    }
}
