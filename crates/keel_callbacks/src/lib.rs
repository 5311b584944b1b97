//! Lifecycle callbacks for keel.
//!
//! `keel_callbacks` lets a caller declare named lifecycle events, attach
//! before, around and after callbacks to them, and run a body wrapped in
//! those callbacks in a well-defined order.
//!
//! # Core Concepts
//!
//! - [`CallbackRegistry`] - Declared events and their ordered callbacks
//! - [`Callback`] - A named callback of a given [`CallbackKind`], optionally guarded
//! - [`Next`] - Continuation handed to around callbacks
//! - [`RunOutcome`] - How a run ended (completed, skipped by an around, halted by a before)
//!
//! # Execution Order
//!
//! For an event with befores `B1, B2`, arounds `A1, A2` and afters `F1, F2`:
//!
//! ```text
//! B1 → B2 → A1(pre) → A2(pre) → body → A2(post) → A1(post) → F1 → F2
//! ```
//!
//! # Example
//!
//! ```
//! use keel_callbacks::CallbackRegistry;
//!
//! struct Person {
//!     name: String,
//! }
//!
//! let mut registry = CallbackRegistry::<Person>::new();
//! registry.declare("save")?;
//! registry
//!     .before("save", "append_suffix", |p: &mut Person| {
//!         p.name.push_str(" Doe");
//!         Ok(())
//!     })?
//!     .before("save", "append_suffix2", |p: &mut Person| {
//!         p.name.push_str(" Jr.");
//!         Ok(())
//!     })?
//!     .after("save", "uppercase_name", |p: &mut Person| {
//!         p.name = p.name.to_uppercase();
//!         Ok(())
//!     })?
//!     .around("save", "logging", |p: &mut Person, next| {
//!         tracing::info!("before save");
//!         let result = next.proceed(p);
//!         tracing::info!("after save");
//!         result
//!     })?;
//!
//! let mut person = Person { name: "John".to_owned() };
//! registry.run("save", &mut person, |_| Ok(()))?;
//! assert_eq!(person.name, "JOHN DOE JR.");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Callback descriptors and kinds.
pub mod callback;

/// Error types for registration and execution.
pub mod error;

/// Event registry.
pub mod registry;

/// Execution composer.
pub mod run;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::callback::{Callback, CallbackKind};
    pub use crate::error::{ActionError, ActionResult, RegistrationError, RunError};
    pub use crate::registry::CallbackRegistry;
    pub use crate::run::{Next, RunOutcome};
}

// Re-export key types at crate root for convenience
pub use callback::{Callback, CallbackKind};
pub use error::{ActionError, ActionResult, BoxError, RegistrationError, RunError};
pub use registry::CallbackRegistry;
pub use run::{Next, RunOutcome};
