//! Procedural macros for `keel_dirty`.
//!
//! This crate provides `#[derive(AttributeSet)]`, which declares a struct's
//! fields as tracked attributes.

mod attribute_set;
mod crate_path;

use proc_macro::TokenStream;

/// Derive macro for the `AttributeSet` trait.
///
/// Every named field becomes a tracked attribute, addressed by its field name.
/// Tracked fields must all have the same type, which becomes
/// `AttributeSet::Value`.
///
/// # Attributes
///
/// - `#[attribute(skip)]` on a field: exclude it from tracking.
/// - `#[attribute(rename = "...")]` on a field: address it by another name.
///
/// # Example
///
/// ```ignore
/// use keel_dirty::AttributeSet;
///
/// #[derive(AttributeSet)]
/// struct Person {
///     first_name: String,
///     last_name: String,
///     #[attribute(skip)]
///     visits: u32,
/// }
/// ```
#[proc_macro_derive(AttributeSet, attributes(attribute))]
pub fn derive_attribute_set(input: TokenStream) -> TokenStream {
    attribute_set::derive_attribute_set(input)
}
