// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Attribute parsing for the `Reflect` and `Facet` derives.
//!
//! # Architecture
//!
//! ```text
//! parse.rs (coordinator)
//! ├── attrs.rs  - raw darling structures (#[reflect(...)], #[facet(...)])
//! ├── def.rs    - validated TypeDef / FacetDef
//! └── rename.rs - rename_all rules
//! ```
//!
//! Both derives share one [`TypeDef`]: a facet DTO is itself a reflected
//! type whose fields are named after the projection targets.
//!
//! # Data Structures
//!
//! ```text
//! FacetDef
//! ├── def: TypeDef                (the DTO as a reflected type)
//! │   ├── ident / name
//! │   └── fields: Vec<FieldDef>   (ident, ty, name, skip)
//! ├── source: Path                (source type)
//! ├── mappings: Vec<Mapping>
//! │   └── Mapping
//! │       ├── target: String
//! │       └── origin: Field | Nested { field, facet } | Flatten(path)
//! ├── max_depth: Option<usize>
//! └── preserve_references: bool
//! ```

mod attrs;
mod def;
mod rename;

pub use def::{FacetDef, FieldDef, Mapping, Origin, TypeDef};
pub use rename::RenameRule;
