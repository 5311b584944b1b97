//! The example model.

use keel_dirty::AttributeSet;
use serde::{Deserialize, Serialize};

/// A person as stored by [`PersonStore`](crate::PersonStore).
///
/// `name` and `email` are tracked attributes; `revision` is bookkeeping
/// owned by the store and is not tracked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, AttributeSet)]
pub struct Person {
    /// Full name.
    pub name: String,
    /// Contact address, normalized to lowercase on save.
    pub email: String,
    /// Number of successful saves.
    #[attribute(skip)]
    pub revision: u32,
}

impl Person {
    /// Creates an unsaved person.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            revision: 0,
        }
    }

    /// Returns whether the person has never been saved.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.revision == 0
    }
}
