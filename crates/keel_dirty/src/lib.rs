//! Attribute change tracking for keel.
//!
//! `keel_dirty` records, per model instance, which attributes changed since
//! the last save, what their values were before the change, and what changed
//! in the save before that.
//!
//! # Core Concepts
//!
//! - [`AttributeSet`] - Named attributes a tracker can read and write (derivable)
//! - [`ChangeTracker`] - Original values for the current generation, plus the previous one
//! - [`Tracked`] - A model paired with its tracker; all writes go through it
//! - [`Change`] - A `from`/`to` pair reported by change queries
//!
//! # Generations
//!
//! ```text
//! set ──> current changes ──save──> previous changes
//!              │
//!              ├──rollback──> originals written back
//!              └──reload────> forgotten, with the previous changes
//! ```
//!
//! Only the first change of an attribute in a generation records its original
//! value. Assigning an equal value records nothing.

extern crate self as keel_dirty;

/// The attribute seam.
pub mod attributes;

/// Change records.
pub mod change;

/// Error types.
pub mod error;

/// Owner wrapper.
pub mod tracked;

/// The change tracker.
pub mod tracker;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use attribute_macros::AttributeSet;
    pub use crate::attributes::AttributeSet;
    pub use crate::change::{Change, Changes};
    pub use crate::error::DirtyError;
    pub use crate::tracked::Tracked;
    pub use crate::tracker::ChangeTracker;
}

// Re-export key types at crate root for convenience
pub use attribute_macros::AttributeSet;
pub use attributes::AttributeSet;
pub use change::{Change, Changes};
pub use error::DirtyError;
pub use tracked::Tracked;
pub use tracker::ChangeTracker;
