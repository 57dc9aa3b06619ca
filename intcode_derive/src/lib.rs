//! Derive macros for the intcode crate.
//!
//! Provides:
//! - `#[derive(Error)]` - `Display`, `std::error::Error` and `From` boilerplate for error enums

mod error;

use proc_macro::TokenStream;

/// Implements `Display` and `Error` for an error enum, plus `From` for every
/// variant whose single field is marked `#[from]`.
#[proc_macro_derive(Error, attributes(error, from, source))]
pub fn derive_error(input: TokenStream) -> TokenStream {
    error::derive_error(input)
}
