//! Example model persisted through keel.
//!
//! A [`Person`] is wrapped in [`Tracked`](keel_dirty::Tracked) so every
//! attribute write is recorded, and written to a [`PersonStore`] whose saves
//! run through lifecycle callbacks:
//!
//! ```text
//! validation: reject_blank_name
//! save:       normalize_email → append_suffix → append_suffix2
//!             → logging(pre) → write + commit → logging(post)
//!             → uppercase_name
//! ```

mod person;
mod store;

pub use person::Person;
pub use store::{PersonStore, SAVE, SavedRecord, VALIDATION, person_callbacks};
