// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Typed facets and the catalog they register into.
//!
//! A facet is a Rust DTO struct bound to a source type. `#[derive(Facet)]`
//! implements [`Facet`] so the projector can learn the spec and every type
//! involved from the DTO alone:
//!
//! ```rust,ignore
//! #[derive(Reflect)]
//! pub struct User { pub id: Uuid, pub email: String, pub password_hash: String }
//!
//! #[derive(Facet)]
//! #[facet(source = "User")]
//! pub struct UserContactDto { pub id: Uuid, pub email: String }
//!
//! let projector = Projector::builder().facet::<UserContactDto>().build()?;
//! let dto: UserContactDto = projector.project_as(&user)?;
//! ```

use indexmap::IndexMap;

use crate::{
    error::ProjectionError,
    schema::{Reflect, TypeDescriptor, TypeRegistry},
    spec::ProjectionSpec
};

/// A DTO projected from `Self::Source`.
///
/// The spec name is the DTO's [`Reflect::TYPE_NAME`], so projected objects
/// decode straight back into `Self`.
pub trait Facet: Reflect {
    /// Source type.
    type Source: Reflect;

    /// Spec equivalent to this facet's declaration.
    fn spec() -> ProjectionSpec;

    /// Add this facet's spec, its source types and every nested facet.
    fn register(catalog: &mut Catalog);
}

/// Types and specs collected before a projector is built.
///
/// Re-adding an identical type or spec is harmless. A different one under a
/// taken name keeps the first and is reported when the projector is built.
#[derive(Debug, Default)]
pub struct Catalog {
    types:     TypeRegistry,
    specs:     IndexMap<String, ProjectionSpec>,
    conflicts: Vec<ProjectionError>
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reflected type and everything it references.
    pub fn add_type<T: Reflect>(&mut self) {
        let mut reflected = TypeRegistry::new();
        reflected.register::<T>();
        for descriptor in reflected.iter() {
            self.add_descriptor(descriptor.clone());
        }
    }

    /// Register a hand-written descriptor.
    ///
    /// Returns `false` if a type with that name is already present.
    pub fn add_descriptor(&mut self, descriptor: TypeDescriptor) -> bool {
        match self.types.get(&descriptor.name) {
            Some(existing) => {
                if *existing != descriptor {
                    self.conflicts.push(ProjectionError::DuplicateType {
                        type_name: descriptor.name
                    });
                }
                false
            }
            None => self.types.insert(descriptor)
        }
    }

    /// Add a spec.
    ///
    /// Returns `false` if a spec with that name is already present.
    pub fn add_spec(&mut self, spec: ProjectionSpec) -> bool {
        match self.specs.get(&spec.name) {
            Some(existing) => {
                if *existing != spec {
                    self.conflicts.push(ProjectionError::DuplicateSpec {
                        spec: spec.name
                    });
                }
                false
            }
            None => {
                self.specs.insert(spec.name.clone(), spec);
                true
            }
        }
    }

    /// Register a facet and everything it depends on.
    pub fn add_facet<F: Facet>(&mut self) {
        F::register(self);
    }

    /// Check whether a spec is present.
    pub fn has_spec(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    /// Registered types.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Registered specs in insertion order.
    pub fn specs(&self) -> impl Iterator<Item = &ProjectionSpec> {
        self.specs.values()
    }

    pub(crate) fn into_parts(
        self
    ) -> (TypeRegistry, IndexMap<String, ProjectionSpec>, Vec<ProjectionError>) {
        (self.types, self.specs, self.conflicts)
    }
}
