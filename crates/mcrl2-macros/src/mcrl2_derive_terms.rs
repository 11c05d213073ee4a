use proc_macro2::TokenStream;

use quote::format_ident;
use quote::quote;
use quote::ToTokens;
use syn::parse_quote;
use syn::Attribute;
use syn::GenericParam;
use syn::Item;
use syn::ItemMod;
use syn::Path;
use syn::Type;

/// Returns true iff the attribute is the given marker, either as `name` or `mcrl2_macros::name`.
fn is_marker(attribute: &Attribute, name: &str) -> bool {
    attribute
        .path()
        .segments
        .last()
        .is_some_and(|segment| segment.ident == name)
}

pub(crate) fn mcrl2_derive_terms_impl(_attributes: TokenStream, input: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree
    let mut ast: ItemMod = match syn::parse2(input) {
        Ok(ast) => ast,
        Err(error) => return error.to_compile_error(),
    };

    if let Some((_, content)) = &mut ast.content {
        // Added code blocks are added to this list.
        let mut added = vec![];

        // We keep track of term structs since their implementation blocks must be copied.
        let mut objects = vec![];

        for item in content.iter_mut() {
            if let Item::Struct(object) = item {
                let Some(position) = object.attrs.iter().position(|attr| is_marker(attr, "mcrl2_term")) else {
                    continue;
                };

                let attribute = object.attrs.remove(position);
                let assertion: Path = match attribute.parse_args() {
                    Ok(path) => path,
                    Err(error) => return error.to_compile_error(),
                };

                // ALL term structs must contain the term.
                if !object
                    .fields
                    .iter()
                    .any(|field| field.ident.as_ref().is_some_and(|name| name == "term"))
                {
                    return syn::Error::new_spanned(
                        &object.ident,
                        format!("The struct {} has no field 'term: ATerm'", object.ident),
                    )
                    .to_compile_error();
                }

                let name = object.ident.clone();
                let name_ref = format_ident!("{}Ref", object.ident);
                let assertion_text = assertion.to_token_stream().to_string();
                objects.push(name.clone());

                // Add a <name>Ref struct that contains the ATermRef<'a> and
                // the implementation of both protect and copy. Also add
                // the conversion from and to an ATerm.
                let generated: TokenStream = quote!(
                    impl #name {
                        /// Returns a borrowed version of this term.
                        pub fn copy(&self) -> #name_ref<'_> {
                            self.term.copy().into()
                        }
                    }

                    impl From<ATerm> for #name {
                        fn from(term: ATerm) -> #name {
                            debug_assert!(#assertion(&term.copy()), "Term {:?} does not satisfy {}", term, #assertion_text);
                            #name {
                                term
                            }
                        }
                    }

                    impl From<#name> for ATerm {
                        fn from(value: #name) -> ATerm {
                            value.term
                        }
                    }

                    impl ::std::ops::Deref for #name {
                        type Target = ATerm;

                        fn deref(&self) -> &Self::Target {
                            &self.term
                        }
                    }

                    impl ::std::fmt::Debug for #name {
                        fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                            write!(f, "{}", self)
                        }
                    }

                    #[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
                    pub struct #name_ref<'a> {
                        pub(crate) term: ATermRef<'a>,
                    }

                    impl<'a> #name_ref<'a> {
                        /// Returns an owned version of this term.
                        pub fn protect(&self) -> #name {
                            self.term.protect().into()
                        }

                        /// Returns a copy with the same lifetime.
                        pub fn copy(&self) -> #name_ref<'a> {
                            *self
                        }
                    }

                    impl<'a> From<ATermRef<'a>> for #name_ref<'a> {
                        fn from(term: ATermRef<'a>) -> #name_ref<'a> {
                            debug_assert!(#assertion(&term), "Term {:?} does not satisfy {}", term, #assertion_text);
                            #name_ref {
                                term
                            }
                        }
                    }

                    impl<'a> From<#name_ref<'a>> for ATermRef<'a> {
                        fn from(value: #name_ref<'a>) -> ATermRef<'a> {
                            value.term
                        }
                    }

                    impl<'a> ::std::ops::Deref for #name_ref<'a> {
                        type Target = ATermRef<'a>;

                        fn deref(&self) -> &Self::Target {
                            &self.term
                        }
                    }

                    impl<'a> ::std::fmt::Debug for #name_ref<'a> {
                        fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                            write!(f, "{}", self)
                        }
                    }
                );

                added.push(Item::Verbatim(generated));
            }
        }

        // Copy the implementation blocks of the term structs to their Ref variant.
        for item in content.iter_mut() {
            if let Item::Impl(implementation) = item {
                if let Some(position) = implementation.attrs.iter().position(|attr| is_marker(attr, "mcrl2_ignore")) {
                    implementation.attrs.remove(position);
                    continue;
                }

                let Type::Path(path) = implementation.self_ty.as_ref() else {
                    continue;
                };

                let Some(name) = path.path.get_ident() else {
                    continue;
                };

                if objects.contains(name) {
                    let name_ref = format_ident!("{}Ref", name);
                    let mut copied = implementation.clone();

                    copied.self_ty = Box::new(parse_quote!(#name_ref<'a>));
                    copied.generics.params.insert(0, GenericParam::Lifetime(parse_quote!('a)));

                    added.push(Item::Impl(copied));
                }
            }
        }

        content.append(&mut added);
    }

    // Hand the output tokens back to the compiler
    ast.into_token_stream()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_macro() {
        let input = "
            mod anything {

                #[mcrl2_term(is_test)]
                pub struct Test {
                    term: ATerm,
                }

                impl Test {
                    pub fn name(&self) -> &str {
                        \"test\"
                    }
                }

                #[mcrl2_ignore]
                impl Test {
                    pub fn new() -> Test {
                        unimplemented!()
                    }
                }
            }
        ";

        let tokens = TokenStream::from_str(input).unwrap();
        let result = mcrl2_derive_terms_impl(TokenStream::default(), tokens).to_string();

        assert!(result.contains("pub struct TestRef"), "The Ref variant is generated");
        assert!(result.contains("TestRef < 'a >"), "The implementation block is copied");
        assert!(!result.contains("mcrl2_ignore"), "The marker attributes are removed");
        assert!(!result.contains("mcrl2_term"), "The marker attributes are removed");
    }

    #[test]
    fn test_missing_term_field() {
        let input = "
            mod anything {
                #[mcrl2_term(is_test)]
                pub struct Test {
                    value: usize,
                }
            }
        ";

        let tokens = TokenStream::from_str(input).unwrap();
        let result = mcrl2_derive_terms_impl(TokenStream::default(), tokens).to_string();

        assert!(result.contains("compile_error"), "A struct without term field is rejected");
    }
}
