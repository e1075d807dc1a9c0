// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Runtime for facetmap.
//!
//! This crate holds everything the `Reflect` and `Facet` derives generate code
//! against, and the projector itself. It can be used on its own with
//! hand-written type descriptors and specs.
//!
//! # Overview
//!
//! - [`Value`], [`Object`], [`ObjectRef`]: dynamic, possibly cyclic object graphs
//! - [`TypeDescriptor`], [`TypeRegistry`]: field metadata checked by specs
//! - [`ProjectionSpec`]: declarative projection (include, exclude, rename,
//!   flatten, nested, depth, reference preservation)
//! - [`Projector`]: validates specs once, then projects any number of sources
//! - [`MapHook`], [`FacetHook`]: async custom mapping after projection
//! - [`ChangeSet`]: fields changed by applying a DTO back to its entity
//! - [`Selection`]: fields a query layer must load for a spec
//! - [`prelude`]: Convenient re-exports
//!
//! # Usage
//!
//! ```rust
//! use facetmap_core::{FieldKind, Object, ProjectionSpec, Projector, TypeDescriptor, Value};
//!
//! let projector = Projector::builder()
//!     .describe(
//!         TypeDescriptor::new("Employee")
//!             .scalar("name")
//!             .scalar("salary")
//!             .field("manager", FieldKind::reference("Employee"))
//!     )
//!     .spec(
//!         ProjectionSpec::new("EmployeeDto", "Employee")
//!             .exclude(["salary"])
//!             .nested("manager", "EmployeeDto")
//!             .preserve_references()
//!     )
//!     .build()?;
//!
//! let boss = facetmap_core::ObjectRef::new(
//!     Object::new("Employee").with("name", "Ann").with("salary", 100)
//! );
//! boss.set("manager", boss.clone());
//!
//! let dto = projector.project(&Value::Object(boss), "EmployeeDto")?;
//! assert_eq!(dto.get("name"), Some(Value::from("Ann")));
//! assert_eq!(dto.get("salary"), None);
//! # Ok::<(), facetmap_core::ProjectionError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod changes;
pub mod config;
pub mod context;
pub mod error;
pub mod facet;
pub mod hook;
pub mod plan;
pub mod prelude;
pub mod projector;
pub mod schema;
pub mod selection;
pub mod spec;
pub mod value;

/// Re-export async_trait for hook implementations.
pub use async_trait::async_trait;
pub use changes::{ChangeSet, FieldChange};
pub use config::ProjectorConfig;
pub use context::{ProjectionContext, VisitedSet};
pub use error::{ProjectionError, ProjectionResult};
pub use facet::{Catalog, Facet};
pub use hook::{FacetHook, FnHook, HookError, MapHook};
pub use plan::{FieldSource, ResolvedField, ResolvedSpec};
pub use projector::{Projector, ProjectorBuilder};
pub use schema::{FieldDescriptor, FieldKind, FieldType, Reflect, TypeDescriptor, TypeRegistry};
pub use selection::Selection;
pub use spec::{PathMapping, ProjectionSpec, SpecDocument};
pub use value::{Object, ObjectId, ObjectRef, Value};
