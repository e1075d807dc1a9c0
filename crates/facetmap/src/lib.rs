// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Depth- and cycle-safe DTO projection.
//!
//! Declare which fields of a domain type a DTO exposes, and the projector
//! copies exactly those, following references without looping forever on
//! cyclic graphs.
//!
//! ```rust,ignore
//! use facetmap::{Facet, Projector, Reflect};
//!
//! #[derive(Reflect)]
//! pub struct Employee {
//!     pub name: String,
//!     pub salary: u32,
//!     pub manager: Option<Box<Employee>>
//! }
//!
//! #[derive(Facet, Debug)]
//! #[facet(source = "Employee", max_depth = 2)]
//! pub struct EmployeeDto {
//!     pub name: String,
//!     #[facet(nested)]
//!     pub manager: Option<Box<EmployeeDto>>
//! }
//!
//! let projector = Projector::builder().facet::<EmployeeDto>().build()?;
//! let dto: EmployeeDto = projector.project_as(&employee)?;
//! ```
//!
//! See [`macro@Reflect`] and [`macro@Facet`] for the attribute reference.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

pub use facetmap_core::*;
pub use facetmap_derive_impl::{Facet, Reflect};
