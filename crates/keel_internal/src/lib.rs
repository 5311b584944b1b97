//! # Keel Internal Library
//!
//! Re-exports the keel crates for convenience.

/// Lifecycle callbacks: events, before/around/after chains.
pub use keel_callbacks;

/// Attribute change tracking.
pub use keel_dirty;

/// Shared infrastructure (tracing setup).
pub use keel_core;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use keel_callbacks::prelude::*;
    pub use keel_core::{TracingFormat, TracingSetup};
    pub use keel_dirty::prelude::*;
}
