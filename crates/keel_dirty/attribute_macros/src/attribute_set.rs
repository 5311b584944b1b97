//! Derive macro for the `AttributeSet` trait.

use darling::ast::Data;
use darling::util::Ignored;
use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use std::collections::HashSet;
use syn::ext::IdentExt;
use syn::{DeriveInput, parse_macro_input};

use crate::crate_path::keel_dirty_path;

/// Parsed field-level `#[attribute(...)]` options.
#[derive(FromField)]
#[darling(attributes(attribute))]
struct AttributeField {
    ident: Option<syn::Ident>,
    ty: syn::Type,

    /// Exclude the field from tracking.
    #[darling(default)]
    skip: bool,

    /// Name the attribute is addressed by. Defaults to the field name.
    #[darling(default)]
    rename: Option<String>,
}

/// Parsed input for the macro.
#[derive(FromDeriveInput)]
#[darling(supports(struct_named))]
struct AttributeSetArgs {
    ident: syn::Ident,
    generics: syn::Generics,
    data: Data<Ignored, AttributeField>,
}

/// Implementation of the `#[derive(AttributeSet)]` macro.
pub(crate) fn derive_attribute_set(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let args = match AttributeSetArgs::from_derive_input(&input) {
        Ok(args) => args,
        Err(err) => return err.write_errors().into(),
    };

    match expand(args) {
        Ok(expanded) => expanded.into(),
        Err(err) => err.write_errors().into(),
    }
}

fn expand(args: AttributeSetArgs) -> darling::Result<TokenStream2> {
    let AttributeSetArgs {
        ident: name,
        generics,
        data,
    } = args;

    let fields = data
        .take_struct()
        .ok_or_else(|| darling::Error::unsupported_shape("enum"))?;
    let tracked: Vec<AttributeField> = fields
        .fields
        .into_iter()
        .filter(|field| !field.skip)
        .collect();

    let Some(first) = tracked.first() else {
        return Err(
            darling::Error::custom("AttributeSet requires at least one tracked field")
                .with_span(&name),
        );
    };
    let value_ty = first.ty.clone();
    let expected = quote!(#value_ty).to_string();

    let mut errors = darling::Error::accumulator();
    let mut seen = HashSet::new();
    let mut idents = Vec::with_capacity(tracked.len());
    let mut names = Vec::with_capacity(tracked.len());

    for field in &tracked {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };

        let ty = &field.ty;
        if quote!(#ty).to_string() != expected {
            errors.push(
                darling::Error::custom(format!(
                    "tracked attributes must all have type `{expected}`; \
                     mark other fields with #[attribute(skip)]"
                ))
                .with_span(ty),
            );
        }

        let attribute = field
            .rename
            .clone()
            .unwrap_or_else(|| ident.unraw().to_string());
        if !seen.insert(attribute.clone()) {
            errors.push(
                darling::Error::custom(format!("duplicate attribute name `{attribute}`"))
                    .with_span(ident),
            );
        }

        idents.push(ident.clone());
        names.push(attribute);
    }
    errors.finish()?;

    let krate = keel_dirty_path();
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #krate::AttributeSet for #name #ty_generics #where_clause {
            type Value = #value_ty;

            const ATTRIBUTES: &'static [&'static str] = &[#(#names),*];

            fn read_attribute(&self, name: &str) -> ::core::option::Option<&Self::Value> {
                match name {
                    #(#names => ::core::option::Option::Some(&self.#idents),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn write_attribute(
                &mut self,
                name: &str,
                value: Self::Value,
            ) -> ::core::result::Result<(), #krate::DirtyError> {
                match name {
                    #(#names => {
                        self.#idents = value;
                        ::core::result::Result::Ok(())
                    })*
                    _ => ::core::result::Result::Err(#krate::DirtyError::unknown_attribute(name)),
                }
            }
        }
    })
}
