//! Error types for change tracking.

/// Errors raised when writing attributes.
///
/// Queries never fail: unknown names report the absent value instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirtyError {
    /// The name is not a tracked attribute.
    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),
}

impl DirtyError {
    /// Creates an [`UnknownAttribute`](Self::UnknownAttribute).
    pub fn unknown_attribute(name: impl Into<String>) -> Self {
        Self::UnknownAttribute(name.into())
    }
}
