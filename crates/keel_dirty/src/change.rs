//! Change records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An attribute's value before and after a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Change<V> {
    /// Value captured at the first change in the generation.
    pub from: V,
    /// Value at the time the change was read.
    pub to: V,
}

impl<V> Change<V> {
    /// Creates a change record.
    pub fn new(from: impl Into<V>, to: impl Into<V>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Returns the change as a `(from, to)` pair.
    pub fn into_pair(self) -> (V, V) {
        (self.from, self.to)
    }
}

impl<V> From<(V, V)> for Change<V> {
    fn from((from, to): (V, V)) -> Self {
        Self { from, to }
    }
}

/// Attribute name to change, ordered by name.
pub type Changes<V> = BTreeMap<String, Change<V>>;
