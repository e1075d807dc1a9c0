// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `Reflect` derive macro implementation.
//!
//! Generates two impls for a named struct:
//!
//! | Impl | Purpose |
//! |------|---------|
//! | `Reflect` | type descriptor, conversion to and from `Object` |
//! | `FieldType` | lets the struct appear as a reference field elsewhere |
//!
//! Trait methods are always called fully qualified because both traits
//! define `to_value`, `from_value` and `register_types`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

use crate::parse::{FieldDef, TypeDef};

/// Main entry point for the Reflect derive macro.
pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match TypeDef::from_derive_input(&input) {
        Ok(def) => generate(&def).into(),
        Err(err) => err.write_errors().into()
    }
}

/// Generate the `Reflect` and `FieldType` impls.
pub fn generate(def: &TypeDef) -> TokenStream2 {
    let ident = &def.ident;
    let name = &def.name;
    let exposed: Vec<&FieldDef> = def.fields.iter().filter(|f| !f.skip).collect();

    let descriptors = exposed.iter().map(|field| {
        let fname = &field.name;
        let ty = &field.ty;
        quote! {
            .with_field(
                ::facetmap::FieldDescriptor::new(
                    #fname,
                    <#ty as ::facetmap::FieldType>::field_kind()
                )
                .optional(<#ty as ::facetmap::FieldType>::is_optional())
            )
        }
    });

    let registrations = exposed.iter().map(|field| {
        let ty = &field.ty;
        quote! { <#ty as ::facetmap::FieldType>::register_types(registry); }
    });

    let writes = exposed.iter().map(|field| {
        let fname = &field.name;
        let fident = &field.ident;
        let ty = &field.ty;
        quote! {
            .with(#fname, <#ty as ::facetmap::FieldType>::to_value(&self.#fident))
        }
    });

    let reads = def.fields.iter().map(|field| {
        let fident = &field.ident;
        let ty = &field.ty;
        if field.skip {
            quote! { #fident: ::core::default::Default::default() }
        } else {
            let fname = &field.name;
            quote! {
                #fident: ::facetmap::schema::decode_field::<#ty>(object, #name, #fname)?
            }
        }
    });

    quote! {
        impl ::facetmap::Reflect for #ident {
            const TYPE_NAME: &'static str = #name;

            fn descriptor() -> ::facetmap::TypeDescriptor {
                ::facetmap::TypeDescriptor::new(#name)
                    #(#descriptors)*
            }

            fn register_types(registry: &mut ::facetmap::TypeRegistry) {
                if registry.insert(<Self as ::facetmap::Reflect>::descriptor()) {
                    #(#registrations)*
                }
            }

            fn to_object(&self) -> ::facetmap::ObjectRef {
                ::facetmap::ObjectRef::new(
                    ::facetmap::Object::new(#name)
                        #(#writes)*
                )
            }

            fn from_object(
                object: &::facetmap::Object
            ) -> ::facetmap::ProjectionResult<Self> {
                ::core::result::Result::Ok(Self {
                    #(#reads),*
                })
            }
        }

        impl ::facetmap::FieldType for #ident {
            fn field_kind() -> ::facetmap::FieldKind {
                ::facetmap::FieldKind::reference(#name)
            }

            fn register_types(registry: &mut ::facetmap::TypeRegistry) {
                <Self as ::facetmap::Reflect>::register_types(registry);
            }

            fn to_value(&self) -> ::facetmap::Value {
                <Self as ::facetmap::Reflect>::to_value(self)
            }

            fn from_value(
                value: &::facetmap::Value
            ) -> ::facetmap::ProjectionResult<Self> {
                <Self as ::facetmap::Reflect>::from_value(value)
            }
        }
    }
}
