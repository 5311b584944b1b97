//! Path to `keel_dirty` as seen from the crate using the derive.
//!
//! Lookup order, read from the consumer's `Cargo.toml`:
//! - a dependency on `keel_dirty` (renames honoured), or `keel_dirty` itself
//! - the `keel` umbrella, reached as `keel::keel_dirty`
//!
//! If neither is found the plain name is emitted, so rustc reports the
//! missing dependency at the use site.

use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

const DIRECT: &str = "keel_dirty";
const UMBRELLA: &str = "keel";

/// Returns the token path for `keel_dirty` in the consuming crate.
pub(crate) fn keel_dirty_path() -> TokenStream {
    let direct = format_ident!("{}", DIRECT);

    if let Ok(found) = crate_name(DIRECT) {
        return match found {
            // `keel_dirty` declares `extern crate self as keel_dirty`.
            FoundCrate::Itself => quote!(#direct),
            FoundCrate::Name(name) => renamed(&name),
        };
    }

    let umbrella = match crate_name(UMBRELLA) {
        Ok(FoundCrate::Itself) => format_ident!("{}", UMBRELLA),
        Ok(FoundCrate::Name(name)) => format_ident!("{}", name),
        Err(_) => return quote!(#direct),
    };
    quote!(#umbrella::#direct)
}

fn renamed(name: &str) -> TokenStream {
    let ident = format_ident!("{}", name);
    quote!(#ident)
}
