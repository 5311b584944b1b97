//! Model lifecycle callbacks and attribute change tracking.
//!
//! - [`keel_callbacks`]: declare lifecycle events and wrap work in
//!   before, around and after callbacks.
//! - [`keel_dirty`]: track which attributes changed, from what, and what
//!   changed in the previous save.
//!
//! # Example
//!
//! ```
//! use keel::prelude::*;
//!
//! #[derive(AttributeSet)]
//! struct Person {
//!     name: String,
//! }
//!
//! let mut registry = CallbackRegistry::<Tracked<Person>>::new();
//! registry.declare("save")?;
//! registry.before("save", "append_suffix", |person: &mut Tracked<Person>| {
//!     person
//!         .update("name", |name| format!("{name} Doe"))
//!         .map_err(ActionError::other)?;
//!     Ok(())
//! })?;
//!
//! let mut person = Tracked::new(Person { name: "John".to_owned() });
//! registry.run("save", &mut person, |person| {
//!     person.save();
//!     Ok(())
//! })?;
//!
//! assert_eq!(person.name, "John Doe");
//! assert!(person.previously_changed("name"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use keel_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use keel_internal::prelude::*;
}
