//! The attribute seam between a model and its change tracker.

use crate::error::DirtyError;

/// Named, readable and writable attributes of a model.
///
/// This is the boundary the change tracker works through: it reads live
/// values to capture originals and writes originals back on restore. Derive
/// it with `#[derive(AttributeSet)]`, or implement it by hand when tracked
/// attributes do not map one-to-one onto fields.
///
/// # Example
///
/// ```
/// use keel_dirty::{AttributeSet, DirtyError};
///
/// struct Point {
///     x: i64,
///     y: i64,
/// }
///
/// impl AttributeSet for Point {
///     type Value = i64;
///
///     const ATTRIBUTES: &'static [&'static str] = &["x", "y"];
///
///     fn read_attribute(&self, name: &str) -> Option<&i64> {
///         match name {
///             "x" => Some(&self.x),
///             "y" => Some(&self.y),
///             _ => None,
///         }
///     }
///
///     fn write_attribute(&mut self, name: &str, value: i64) -> Result<(), DirtyError> {
///         match name {
///             "x" => self.x = value,
///             "y" => self.y = value,
///             _ => return Err(DirtyError::unknown_attribute(name)),
///         }
///         Ok(())
///     }
/// }
///
/// let point = Point { x: 1, y: 2 };
/// assert!(point.has_attribute("x"));
/// assert_eq!(point.read_attribute("y"), Some(&2));
/// ```
pub trait AttributeSet {
    /// Type shared by every tracked attribute.
    ///
    /// Equality decides whether an assignment counts as a change.
    type Value: Clone + PartialEq;

    /// Names of the tracked attributes.
    const ATTRIBUTES: &'static [&'static str];

    /// Returns the live value of an attribute, or `None` for unknown names.
    fn read_attribute(&self, name: &str) -> Option<&Self::Value>;

    /// Overwrites the live value of an attribute.
    ///
    /// # Errors
    ///
    /// Returns [`DirtyError::UnknownAttribute`] for names outside
    /// [`ATTRIBUTES`](Self::ATTRIBUTES).
    fn write_attribute(&mut self, name: &str, value: Self::Value) -> Result<(), DirtyError>;

    /// Returns whether `name` is a tracked attribute.
    fn has_attribute(&self, name: &str) -> bool {
        Self::ATTRIBUTES.contains(&name)
    }
}
