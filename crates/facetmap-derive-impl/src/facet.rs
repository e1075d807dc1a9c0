// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `Facet` derive macro implementation.
//!
//! A facet is reflected like any other struct, so this derive emits the
//! `Reflect` and `FieldType` impls first and then:
//!
//! ```text
//! impl Facet for UserDto
//! ├── type Source = User
//! ├── spec()      include / rename / nested / flatten / max_depth / preserve
//! └── register()  source types, own spec, then every nested facet
//! ```
//!
//! `register` stops when the catalog already holds the spec, so facets that
//! nest themselves terminate.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

use crate::{
    parse::{FacetDef, Mapping, Origin},
    reflect
};

/// Main entry point for the Facet derive macro.
pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match FacetDef::from_derive_input(&input) {
        Ok(facet) => generate(&facet).into(),
        Err(err) => err.write_errors().into()
    }
}

/// Generate the reflection impls and the `Facet` impl.
pub fn generate(facet: &FacetDef) -> TokenStream2 {
    let reflect = reflect::generate(&facet.def);
    let ident = &facet.def.ident;
    let source = &facet.source;
    let spec = spec_body(facet);
    let nested = facet.nested_facets();

    quote! {
        #reflect

        impl ::facetmap::Facet for #ident {
            type Source = #source;

            fn spec() -> ::facetmap::ProjectionSpec {
                #spec
            }

            fn register(catalog: &mut ::facetmap::Catalog) {
                catalog.add_type::<#source>();
                if catalog.add_spec(<Self as ::facetmap::Facet>::spec()) {
                    #(<#nested as ::facetmap::Facet>::register(catalog);)*
                }
            }
        }
    }
}

fn spec_body(facet: &FacetDef) -> TokenStream2 {
    let source = &facet.source;
    let included = facet.mappings.iter().filter_map(|m| match &m.origin {
        Origin::Field(field) | Origin::Nested { field, .. } => Some(field),
        Origin::Flatten(_) => None
    });
    let steps = facet.mappings.iter().map(step);
    let max_depth = facet.max_depth.map(|depth| quote! { .max_depth(#depth) });
    let preserve = facet
        .preserve_references
        .then(|| quote! { .preserve_references() });

    quote! {
        ::facetmap::ProjectionSpec::new(
            <Self as ::facetmap::Reflect>::TYPE_NAME,
            <#source as ::facetmap::Reflect>::TYPE_NAME
        )
        .include(::std::vec::Vec::<&str>::from([#(#included),*]))
        #(#steps)*
        #max_depth
        #preserve
    }
}

fn step(mapping: &Mapping) -> TokenStream2 {
    let target = &mapping.target;
    match &mapping.origin {
        Origin::Field(field) => rename(field, target),
        Origin::Nested { field, facet } => {
            let rename = rename(field, target);
            quote! {
                .nested(#field, <#facet as ::facetmap::Reflect>::TYPE_NAME)
                #rename
            }
        }
        Origin::Flatten(path) => quote! { .flatten([#(#path),*], #target) }
    }
}

fn rename(field: &str, target: &str) -> TokenStream2 {
    if field == target {
        TokenStream2::new()
    } else {
        quote! { .rename(#field, #target) }
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    fn expand(input: DeriveInput) -> String {
        let facet = FacetDef::from_derive_input(&input).unwrap();
        generate(&facet).to_string().replace(' ', "")
    }

    #[test]
    fn emits_reflect_and_facet() {
        let out = expand(parse_quote! {
            #[facet(source = "User")]
            pub struct UserContactDto {
                pub id: u64,
                pub email: String
            }
        });
        assert!(out.contains("impl::facetmap::ReflectforUserContactDto"));
        assert!(out.contains("impl::facetmap::FacetforUserContactDto"));
        assert!(out.contains("typeSource=User;"));
        assert!(out.contains("include(::std::vec::Vec::<&str>::from([\"id\",\"email\"]))"));
        assert!(out.contains("catalog.add_type::<User>();"));
    }

    #[test]
    fn renames_and_from() {
        let out = expand(parse_quote! {
            #[facet(source = "User", rename_all = "camelCase")]
            pub struct UserDto {
                pub display_name: String,
                #[facet(from = "email_address")]
                pub email: String
            }
        });
        assert!(out.contains(".rename(\"display_name\",\"displayName\")"));
        assert!(out.contains(".rename(\"email_address\",\"email\")"));
        assert!(out.contains("from([\"display_name\",\"email_address\"])"));
    }

    #[test]
    fn nested_facets_register_recursively() {
        let out = expand(parse_quote! {
            #[facet(source = "Employee", max_depth = 3)]
            pub struct EmployeeDto {
                pub name: String,
                #[facet(nested)]
                pub manager: Option<Box<EmployeeDto>>,
                #[facet(nested = "AddressDto", rename = "home")]
                pub address: AddressDto
            }
        });
        assert!(out.contains(".nested(\"manager\",<EmployeeDtoas::facetmap::Reflect>::TYPE_NAME)"));
        assert!(out.contains(".nested(\"address\",<AddressDtoas::facetmap::Reflect>::TYPE_NAME).rename(\"address\",\"home\")"));
        assert!(out.contains(".max_depth(3usize)"));
        assert!(out.contains("<EmployeeDtoas::facetmap::Facet>::register(catalog);"));
        assert!(out.contains("<AddressDtoas::facetmap::Facet>::register(catalog);"));
        assert!(!out.contains("preserve_references"));
    }

    #[test]
    fn flatten_and_preserve() {
        let out = expand(parse_quote! {
            #[facet(source = "Employee", preserve_references)]
            pub struct EmployeeRow {
                #[facet(flatten = "address.city")]
                pub city: String,
                #[facet(skip)]
                pub note: String
            }
        });
        assert!(out.contains(".flatten([\"address\",\"city\"],\"city\")"));
        assert!(out.contains(".preserve_references()"));
        assert!(out.contains("from([])"));
        assert!(!out.contains("\"note\""));
    }
}
