// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Declarative projection specs.
//!
//! A [`ProjectionSpec`] describes one target shape: which fields of a source
//! type it keeps, how they are renamed, which reference fields are projected
//! through another spec, and how deep the projection may go.
//!
//! # Sources of specs
//!
//! | Source | Example |
//! |--------|---------|
//! | Builder | `ProjectionSpec::new("UserContactDto", "User").include(["email"])` |
//! | Derive | `#[derive(Facet)] #[facet(source = "User")] struct UserContactDto { .. }` |
//! | JSON | [`SpecDocument::from_json`] |
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "name": "EmployeeDto",
//!   "source": "Employee",
//!   "exclude": ["salary"],
//!   "rename": { "first_name": "given_name" },
//!   "nested": { "address": "AddressDto", "previous_addresses": "AddressDto" },
//!   "flatten": [{ "path": ["company", "name"], "target": "company_name" }],
//!   "max_depth": 3
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{config::ProjectorConfig, error::ProjectionResult};

/// Copy a value reached through a chain of reference fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathMapping {
    /// Field names walked from the source object, e.g. `["content_type", "description"]`.
    pub path: Vec<String>,

    /// Target field that receives the value.
    pub target: String
}

impl PathMapping {
    /// Path rendered with dots.
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }
}

/// Declarative description of one projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectionSpec {
    /// Spec name; also the type name of produced target objects.
    pub name: String,

    /// Source type name.
    pub source: String,

    /// Fields to keep. Mutually exclusive with `exclude`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,

    /// Fields to drop. Mutually exclusive with `include`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,

    /// Source field -> target field renames.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rename: BTreeMap<String, String>,

    /// Values pulled up from nested references.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flatten: Vec<PathMapping>,

    /// Source field -> nested spec name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub nested: BTreeMap<String, String>,

    /// Depth limit for nested projection. `None` means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,

    /// Reuse the target already produced for a visited source object.
    #[serde(default)]
    pub preserve_references: bool
}

impl ProjectionSpec {
    /// Create a spec that keeps every field of `source`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use facetmap_core::ProjectionSpec;
    ///
    /// let spec = ProjectionSpec::new("UserPublicDto", "User")
    ///     .exclude(["password_hash", "salary"]);
    /// assert_eq!(spec.source, "User");
    /// ```
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name:                name.into(),
            source:              source.into(),
            include:             None,
            exclude:             None,
            rename:              BTreeMap::new(),
            flatten:             Vec::new(),
            nested:              BTreeMap::new(),
            max_depth:           None,
            preserve_references: false
        }
    }

    /// Keep only these fields, in this order.
    #[must_use]
    pub fn include<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>
    {
        self.include = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Keep every field except these.
    #[must_use]
    pub fn exclude<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>
    {
        self.exclude = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Map source field `from` to target field `to`.
    #[must_use]
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rename.insert(from.into(), to.into());
        self
    }

    /// Pull the value at `path` into target field `target`.
    #[must_use]
    pub fn flatten<I, S>(mut self, path: I, target: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>
    {
        self.flatten.push(PathMapping {
            path:   path.into_iter().map(Into::into).collect(),
            target: target.into()
        });
        self
    }

    /// Project source field `field` through the spec named `spec`.
    #[must_use]
    pub fn nested(mut self, field: impl Into<String>, spec: impl Into<String>) -> Self {
        self.nested.insert(field.into(), spec.into());
        self
    }

    /// Limit nesting depth.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Enable reference preservation.
    #[must_use]
    pub const fn preserve_references(mut self) -> Self {
        self.preserve_references = true;
        self
    }

    /// Target name for a source field.
    pub fn target_name<'a>(&'a self, source_field: &'a str) -> &'a str {
        self.rename
            .get(source_field)
            .map_or(source_field, String::as_str)
    }

    /// Parse a single spec from JSON.
    ///
    /// # Errors
    ///
    /// [`ProjectionError::Document`](crate::ProjectionError::Document) on
    /// malformed input or unknown keys.
    pub fn from_json(json: &str) -> ProjectionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A configuration document: projector settings plus specs.
///
/// ```rust
/// use facetmap_core::SpecDocument;
///
/// let doc = SpecDocument::from_json(r#"{
///     "config": { "recursion_limit": 64 },
///     "specs": [
///         { "name": "OrderFacet", "source": "Order", "include": ["id", "total"] }
///     ]
/// }"#).unwrap();
/// assert_eq!(doc.config.recursion_limit, 64);
/// assert_eq!(doc.specs.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecDocument {
    /// Projector settings.
    #[serde(default)]
    pub config: ProjectorConfig,

    /// Specs to register.
    #[serde(default)]
    pub specs: Vec<ProjectionSpec>
}

impl SpecDocument {
    /// Parse a document from JSON.
    ///
    /// # Errors
    ///
    /// [`ProjectionError::Document`](crate::ProjectionError::Document) on
    /// malformed input.
    pub fn from_json(json: &str) -> ProjectionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
