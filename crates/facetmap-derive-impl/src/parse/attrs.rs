// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Raw darling attribute structures.
//!
//! These mirror the attribute syntax one to one. Validation and name
//! resolution happen in [`super::def`].

use darling::{
    FromDeriveInput, FromField,
    ast::Data,
    util::{Ignored, Override}
};
use syn::{Generics, Ident, Path, Type};

use super::RenameRule;

/// `#[reflect(...)]` on a struct.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(reflect), supports(struct_named))]
pub struct ReflectAttrs {
    pub ident:      Ident,
    pub generics:   Generics,
    pub data:       Data<Ignored, ReflectFieldAttrs>,
    /// Reflected type name. Defaults to the struct name.
    #[darling(default)]
    pub name:       Option<String>,
    #[darling(default)]
    pub rename_all: RenameRule
}

/// `#[reflect(...)]` on a field.
#[derive(Debug, FromField)]
#[darling(attributes(reflect))]
pub struct ReflectFieldAttrs {
    pub ident:  Option<Ident>,
    pub ty:     Type,
    #[darling(default)]
    pub rename: Option<String>,
    #[darling(default)]
    pub skip:   bool
}

/// `#[facet(...)]` on a struct.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(facet), supports(struct_named))]
pub struct FacetAttrs {
    pub ident:               Ident,
    pub generics:            Generics,
    pub data:                Data<Ignored, FacetFieldAttrs>,
    /// Source type, e.g. `source = "User"`.
    pub source:              Path,
    /// Spec name. Defaults to the struct name.
    #[darling(default)]
    pub name:                Option<String>,
    #[darling(default)]
    pub rename_all:          RenameRule,
    #[darling(default)]
    pub max_depth:           Option<usize>,
    #[darling(default)]
    pub preserve_references: bool
}

/// `#[facet(...)]` on a field.
#[derive(Debug, FromField)]
#[darling(attributes(facet))]
pub struct FacetFieldAttrs {
    pub ident:   Option<Ident>,
    pub ty:      Type,
    #[darling(default)]
    pub rename:  Option<String>,
    #[darling(default)]
    pub skip:    bool,
    /// Source field when it differs from the Rust field name.
    #[darling(default)]
    pub from:    Option<String>,
    /// `nested` infers the facet from the field type,
    /// `nested = "AddressDto"` names it.
    #[darling(default)]
    pub nested:  Option<Override<Path>>,
    /// Dotted source path, e.g. `flatten = "address.city"`.
    #[darling(default)]
    pub flatten: Option<String>
}
