// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Derive macros for facetmap.
//!
//! Use the `facetmap` crate instead of depending on this one directly;
//! the generated code refers to `::facetmap`.
//!
//! # Attribute Quick Reference
//!
//! ## `#[derive(Reflect)]`
//!
//! ```rust,ignore
//! #[derive(Reflect)]
//! #[reflect(
//!     name = "Person",          // Optional: reflected type name (default: struct name)
//!     rename_all = "camelCase"  // Optional: "snake_case" | "camelCase" | "PascalCase" | "kebab-case"
//! )]
//! pub struct Employee {
//!     pub name: String,
//!
//!     #[reflect(rename = "mail")]   // Reflected as "mail"
//!     pub email: String,
//!
//!     #[reflect(skip)]              // Invisible to specs; Default on decode
//!     pub cache: Vec<u8>,
//!
//!     pub manager: Option<Box<Employee>>  // Reference field
//! }
//! ```
//!
//! ## `#[derive(Facet)]`
//!
//! ```rust,ignore
//! #[derive(Facet)]
//! #[facet(
//!     source = "Employee",      // Required: source type
//!     name = "EmployeeView",    // Optional: spec name (default: struct name)
//!     rename_all = "camelCase", // Optional: same values as Reflect
//!     max_depth = 2,            // Optional: nesting limit
//!     preserve_references       // Optional: shared sources stay shared
//! )]
//! pub struct EmployeeDto {
//!     pub name: String,
//!
//!     #[facet(from = "email")]              // Source field differs
//!     pub contact: String,
//!
//!     #[facet(nested)]                      // Project through EmployeeDto
//!     pub manager: Option<Box<EmployeeDto>>,
//!
//!     #[facet(nested = "AddressDto")]       // Explicit nested facet
//!     pub home: Option<AddressDto>,
//!
//!     #[facet(flatten = "address.city")]    // Pull a nested value up
//!     pub city: Option<String>,
//!
//!     #[facet(skip)]                        // Not projected; Default on decode
//!     pub note: String
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rust_2018_idioms
)]
#![deny(unsafe_code)]

mod facet;
mod parse;
mod reflect;

use proc_macro::TokenStream;

/// Derive reflection metadata and `Object` conversions for a named struct.
///
/// Implements `facetmap::Reflect` and `facetmap::FieldType`, so the struct
/// can be a projection source, a decode target and a reference field of
/// other reflected structs.
///
/// # Field Types
///
/// Every non-skipped field type must implement `FieldType`: scalars,
/// `String`, `uuid::Uuid`, `chrono::DateTime<Utc>`, other reflected
/// structs, and `Option`, `Vec` or `Box` of those.
///
/// # Errors
///
/// Compile errors for enums, tuple structs, generic structs, unknown
/// `rename_all` values and two fields reflected under the same name.
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    reflect::derive(input)
}

/// Derive a typed projection from a source type.
///
/// Implements `Reflect`, `FieldType` and `facetmap::Facet`. The generated
/// spec includes exactly the DTO's non-skipped fields, so adding a field to
/// the source never leaks it into the DTO.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `from = "field"` | Source field name when it differs from the Rust field |
/// | `rename = "name"` | Name of the field on the DTO |
/// | `nested` | Project through the facet named by the field type, peeling `Option`, `Vec` and `Box` |
/// | `nested = "Type"` | Project through an explicit facet |
/// | `flatten = "a.b"` | Read a value through single references |
/// | `skip` | Not projected; `Default` on decode |
///
/// # Errors
///
/// Compile errors for a missing `source`, `flatten` or `skip` combined with
/// another origin, flatten paths with fewer than two segments, and one
/// source field mapped twice. Unknown source fields are reported when the
/// projector is built.
#[proc_macro_derive(Facet, attributes(facet))]
pub fn derive_facet(input: TokenStream) -> TokenStream {
    facet::derive(input)
}
