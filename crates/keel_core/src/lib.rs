//! Shared infrastructure for keel.
//!
//! Currently this is the `tracing` subscriber setup used by binaries and
//! tests: see [`TracingSetup`].

/// Tracing subscriber setup.
pub mod tracing_setup;

pub use tracing_setup::{TracingError, TracingFormat, TracingSetup};
