//!
//! Procedural macros that generate the typed views over terms used by the
//! `mcrl2` crate.
//!

use proc_macro::TokenStream;

mod mcrl2_derive_terms;

use mcrl2_derive_terms::mcrl2_derive_terms_impl;

/// Generates the borrowed `<name>Ref<'a>` variant, the conversions and the
/// trait implementations for every struct in the annotated module that is
/// marked with `#[mcrl2_term(predicate)]`.
///
/// The struct must have a field `term: ATerm` and the predicate must be a
/// function `fn(&ATermRef<'_>) -> bool` that is checked in debug builds
/// whenever a term is converted into the typed view.
///
/// Implementation blocks for the struct are copied for the `Ref` variant,
/// unless they are annotated with `#[mcrl2_ignore]`.
#[proc_macro_attribute]
pub fn mcrl2_derive_terms(attributes: TokenStream, input: TokenStream) -> TokenStream {
    mcrl2_derive_terms_impl(attributes.into(), input.into()).into()
}

/// Marks a struct as a term, see [macro@mcrl2_derive_terms].
#[proc_macro_attribute]
pub fn mcrl2_term(_attributes: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Marks an implementation block that should not be copied to the `Ref`
/// variant, see [macro@mcrl2_derive_terms].
#[proc_macro_attribute]
pub fn mcrl2_ignore(_attributes: TokenStream, input: TokenStream) -> TokenStream {
    input
}
