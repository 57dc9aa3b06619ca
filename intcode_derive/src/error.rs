//! Derive macro for error enums.
//!
//! Generates `std::fmt::Display`, `std::error::Error` and `From` implementations.
//!
//! # Usage
//!
//! ```ignore
//! use intcode_derive::Error;
//!
//! #[derive(Debug, Error)]
//! pub enum LoadError {
//!     #[error("cannot read program: {0}")]
//!     Io(#[from] std::io::Error),
//!
//!     #[error("cell {index} is not an integer: {token}")]
//!     InvalidCell {
//!         index: usize,
//!         token: String,
//!         #[source]
//!         source: std::num::ParseIntError,
//!     },
//!
//!     #[error("program is empty")]
//!     Empty,
//! }
//! ```
//!
//! # Supported Features
//!
//! - Unit variants: `#[error("message")]`
//! - Tuple variants with positional args: `#[error("error: {0}")]`
//! - Struct variants with named args: `#[error("expected {expected}")]`
//! - `#[source]` on one field links it as `Error::source()`
//! - `#[from]` does the same and also emits `From<FieldType>`; only valid on
//!   single-field variants
//!
//! Fields the message does not mention are left unbound, so a variant may carry
//! data that only shows up through `source()` or `Debug`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Field, Fields, Generics, Ident, LitStr, Variant, parse_macro_input};

/// Derives `Display`, `Error` and `From` for an enum.
pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_error_derive(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Field that `source()` returns for a variant.
struct SourceField {
    index: usize,
    /// `#[from]` rather than plain `#[source]`.
    from: bool,
}

/// A variant with its parsed attributes.
struct ErrorVariant<'a> {
    variant: &'a Variant,
    message: String,
    source: Option<SourceField>,
}

fn expand_error_derive(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Error derive only supports enums",
        ));
    };
    if data_enum.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Error derive needs at least one variant",
        ));
    }

    let variants = data_enum
        .variants
        .iter()
        .map(parse_variant)
        .collect::<syn::Result<Vec<_>>>()?;

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let display_arms = variants.iter().map(display_arm);
    let source_arms = variants.iter().map(source_arm);
    let from_impls = variants
        .iter()
        .filter_map(|v| from_impl(name, &input.generics, v));

    Ok(quote! {
        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    #(#display_arms)*
                }
            }
        }

        impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {
            fn source(&self) -> ::std::option::Option<&(dyn ::std::error::Error + 'static)> {
                match self {
                    #(#source_arms)*
                }
            }
        }

        #(#from_impls)*
    })
}

fn parse_variant(variant: &Variant) -> syn::Result<ErrorVariant<'_>> {
    let message = extract_error_message(variant)?;

    let mut source = None;
    for (index, field) in variant.fields.iter().enumerate() {
        let from = has_attr(field, "from");
        if !from && !has_attr(field, "source") {
            continue;
        }
        if source.is_some() {
            return Err(syn::Error::new_spanned(
                field,
                "only one field per variant may be marked #[from] or #[source]",
            ));
        }
        if from && variant.fields.len() != 1 {
            return Err(syn::Error::new_spanned(
                field,
                "#[from] requires a variant with exactly one field",
            ));
        }
        source = Some(SourceField { index, from });
    }

    Ok(ErrorVariant {
        variant,
        message,
        source,
    })
}

fn has_attr(field: &Field, name: &str) -> bool {
    field.attrs.iter().any(|attr| attr.path().is_ident(name))
}

/// Extracts the message from a variant's `#[error("...")]` attribute.
fn extract_error_message(variant: &Variant) -> syn::Result<String> {
    let attr = variant
        .attrs
        .iter()
        .find(|attr| attr.path().is_ident("error"))
        .ok_or_else(|| {
            syn::Error::new_spanned(
                &variant.ident,
                format!(
                    "missing #[error(\"...\")] attribute on variant `{}`; every error variant must declare a display message",
                    variant.ident
                ),
            )
        })?;

    attr.parse_args::<LitStr>()
        .map(|lit| lit.value())
        .map_err(|_| {
            syn::Error::new_spanned(
                &attr.meta,
                "invalid #[error] attribute: expected a string literal like #[error(\"invalid opcode: {0}\")]",
            )
        })
}

/// Whether `message` interpolates the argument `name`, with or without a format spec.
fn mentions(message: &str, name: &str) -> bool {
    message.contains(&format!("{{{name}}}")) || message.contains(&format!("{{{name}:"))
}

/// Rewrites positional `{0}` / `{0:?}` into the named `{f0}` / `{f0:?}` bindings.
fn positional_to_named(message: &str, field_count: usize) -> String {
    let mut result = message.to_string();
    for i in (0..field_count).rev() {
        result = result
            .replace(&format!("{{{i}}}"), &format!("{{f{i}}}"))
            .replace(&format!("{{{i}:"), &format!("{{f{i}:"));
    }
    result
}

fn display_arm(v: &ErrorVariant) -> TokenStream2 {
    let ident = &v.variant.ident;

    match &v.variant.fields {
        Fields::Unit => {
            let message = &v.message;
            quote! { Self::#ident => write!(f, #message), }
        }
        Fields::Unnamed(fields) => {
            let message = positional_to_named(&v.message, fields.unnamed.len());
            let bindings: Vec<Ident> = (0..fields.unnamed.len())
                .map(|i| format_ident!("f{}", i))
                .collect();
            let patterns = bindings.iter().map(|b| {
                if mentions(&message, &b.to_string()) {
                    quote! { #b }
                } else {
                    quote! { _ }
                }
            });
            let used: Vec<&Ident> = bindings
                .iter()
                .filter(|b| mentions(&message, &b.to_string()))
                .collect();
            quote! {
                Self::#ident(#(#patterns),*) => write!(f, #message, #(#used = #used),*),
            }
        }
        Fields::Named(fields) => {
            let message = &v.message;
            let used: Vec<&Ident> = fields
                .named
                .iter()
                .filter_map(|field| field.ident.as_ref())
                .filter(|ident| mentions(message, &ident.to_string()))
                .collect();
            quote! {
                Self::#ident { #(#used,)* .. } => write!(f, #message, #(#used = #used),*),
            }
        }
    }
}

fn source_arm(v: &ErrorVariant) -> TokenStream2 {
    let ident = &v.variant.ident;
    let Some(source) = &v.source else {
        return quote! { Self::#ident { .. } => ::std::option::Option::None, };
    };

    let pattern = match &v.variant.fields {
        Fields::Named(fields) => {
            let field = fields.named[source.index].ident.as_ref();
            quote! { Self::#ident { #field: source, .. } }
        }
        Fields::Unnamed(fields) => {
            let slots = (0..fields.unnamed.len()).map(|i| {
                if i == source.index {
                    quote! { source }
                } else {
                    quote! { _ }
                }
            });
            quote! { Self::#ident(#(#slots),*) }
        }
        Fields::Unit => unreachable!("a unit variant has no field to mark as source"),
    };

    quote! {
        #pattern => ::std::option::Option::Some(source as &(dyn ::std::error::Error + 'static)),
    }
}

fn from_impl(name: &Ident, generics: &Generics, v: &ErrorVariant) -> Option<TokenStream2> {
    let source = v.source.as_ref().filter(|s| s.from)?;
    let ident = &v.variant.ident;
    let field = v.variant.fields.iter().nth(source.index)?;
    let ty = &field.ty;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let construct = match &field.ident {
        Some(field_name) => quote! { Self::#ident { #field_name: source } },
        None => quote! { Self::#ident(source) },
    };

    Some(quote! {
        impl #impl_generics ::std::convert::From<#ty> for #name #ty_generics #where_clause {
            fn from(source: #ty) -> Self {
                #construct
            }
        }
    })
}
