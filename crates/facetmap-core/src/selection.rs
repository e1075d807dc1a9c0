// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Query push-down of a resolved spec.
//!
//! A query layer that materializes sources only needs the fields a
//! projection will read. [`Selection`] lists them, with nested selections
//! for nested fields:
//!
//! ```text
//! CustomerDto ─┬─ id
//!              ├─ name
//!              └─ orders ─┬─ id        (OrderDto)
//!                         └─ total
//!
//! paths(): ["id", "name", "orders.id", "orders.total"]
//! ```
//!
//! Self-referencing specs stop at the first repetition: the repeated field
//! is selected without a nested selection.

use indexmap::IndexMap;

use crate::plan::{FieldSource, ResolvedSpec};

/// Source fields read by a spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    spec:      String,
    source:    String,
    direct:    Vec<String>,
    flattened: Vec<Vec<String>>,
    nested:    IndexMap<String, Selection>
}

impl Selection {
    pub(crate) fn build(root: &str, specs: &IndexMap<String, ResolvedSpec>) -> Option<Self> {
        let mut stack = Vec::new();
        Self::build_inner(root, specs, &mut stack)
    }

    fn build_inner<'a>(
        name: &'a str,
        specs: &'a IndexMap<String, ResolvedSpec>,
        stack: &mut Vec<&'a str>
    ) -> Option<Self> {
        let spec = specs.get(name)?;
        stack.push(name);

        let mut direct = Vec::new();
        let mut flattened = Vec::new();
        let mut nested = IndexMap::new();
        for field in &spec.fields {
            match &field.source {
                FieldSource::Direct(source) => {
                    direct.push(source.clone());
                    let Some(inner) = field.nested.as_deref() else {
                        continue;
                    };
                    if stack.contains(&inner) {
                        continue;
                    }
                    if let Some(selection) = Self::build_inner(inner, specs, stack) {
                        nested.insert(source.clone(), selection);
                    }
                }
                FieldSource::Path(path) => flattened.push(path.clone())
            }
        }

        stack.pop();
        Some(Self {
            spec: spec.name.clone(),
            source: spec.source.clone(),
            direct,
            flattened,
            nested
        })
    }

    /// Spec this selection was derived from.
    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// Source type queried.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Top-level source fields to load, without duplicates.
    pub fn fields(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(self.direct.len() + self.flattened.len());
        let roots = self
            .direct
            .iter()
            .map(String::as_str)
            .chain(self.flattened.iter().filter_map(|p| p.first().map(String::as_str)));
        for root in roots {
            if !out.contains(&root) {
                out.push(root);
            }
        }
        out
    }

    /// Nested selection for a field.
    pub fn nested(&self, field: &str) -> Option<&Self> {
        self.nested.get(field)
    }

    /// Check if `field` is loaded at this level.
    pub fn contains(&self, field: &str) -> bool {
        self.fields().contains(&field)
    }

    /// Dotted leaf paths, e.g. `orders.total`.
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        for field in &self.direct {
            match self.nested.get(field) {
                Some(inner) => {
                    let children = inner.paths();
                    if children.is_empty() {
                        out.push(field.clone());
                    }
                    out.extend(children.into_iter().map(|c| format!("{field}.{c}")));
                }
                None => out.push(field.clone())
            }
        }
        for path in &self.flattened {
            let covered = path
                .first()
                .is_some_and(|root| self.direct.contains(root) && !self.nested.contains_key(root));
            if !covered {
                out.push(path.join("."));
            }
        }
        out
    }
}
