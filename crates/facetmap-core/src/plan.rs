// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Spec resolution.
//!
//! Turns declarative [`ProjectionSpec`]s into [`ResolvedSpec`]s: concrete,
//! ordered field lists checked against the [`TypeRegistry`]. Every
//! configuration error is raised here, so a projector that builds never
//! fails on spec shape while projecting.
//!
//! # Resolution order
//!
//! ```text
//! ProjectionSpec
//!   ├── include/exclude conflict        → ConflictingSelection
//!   ├── source type lookup              → UnknownType
//!   ├── field names (all sections)      → UnknownField
//!   ├── nested spec lookup + type check → UnknownSpec / TypeMismatch
//!   ├── flatten path walk               → InvalidPath
//!   └── target name uniqueness          → DuplicateTarget
//! all specs
//!   └── nested-spec graph cycles        → UnboundedCycle
//! ```

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::{
    error::{ProjectionError, ProjectionResult},
    schema::{FieldKind, TypeDescriptor, TypeRegistry},
    spec::{PathMapping, ProjectionSpec}
};

/// Where a resolved field reads its value from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSource {
    /// A field of the source object.
    Direct(String),

    /// A value reached by walking reference fields.
    Path(Vec<String>)
}

impl FieldSource {
    /// First source field read, used by query selections.
    pub fn root(&self) -> &str {
        match self {
            Self::Direct(name) => name,
            Self::Path(path) => path.first().map_or("", String::as_str)
        }
    }
}

/// One field of a resolved spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// Value origin.
    pub source: FieldSource,

    /// Target field name.
    pub target: String,

    /// Kind of the value read.
    pub kind: FieldKind,

    /// Nested spec applied to the value, if any.
    pub nested: Option<String>
}

impl ResolvedField {
    /// Source field name for direct fields.
    pub fn direct_source(&self) -> Option<&str> {
        match &self.source {
            FieldSource::Direct(name) => Some(name),
            FieldSource::Path(_) => None
        }
    }
}

/// A validated spec with its concrete field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpec {
    /// Spec name.
    pub name: String,

    /// Source type name.
    pub source: String,

    /// Fields in target order.
    pub fields: Vec<ResolvedField>,

    /// Depth limit.
    pub max_depth: Option<usize>,

    /// Reference preservation flag.
    pub preserve_references: bool
}

impl ResolvedSpec {
    /// Look up a field by target name.
    pub fn field(&self, target: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.target == target)
    }

    /// Target field names in order.
    pub fn target_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.target.as_str())
    }

    /// Whether this spec on its own bounds recursion through it.
    pub const fn is_bounded(&self) -> bool {
        self.max_depth.is_some() || self.preserve_references
    }
}

/// Resolve and validate every spec.
pub(crate) fn resolve_all(
    specs: &IndexMap<String, ProjectionSpec>,
    types: &TypeRegistry
) -> ProjectionResult<IndexMap<String, ResolvedSpec>> {
    let mut resolved = IndexMap::with_capacity(specs.len());
    for spec in specs.values() {
        resolved.insert(spec.name.clone(), resolve(spec, specs, types)?);
    }
    check_cycles(&resolved)?;
    Ok(resolved)
}

fn resolve(
    spec: &ProjectionSpec,
    specs: &IndexMap<String, ProjectionSpec>,
    types: &TypeRegistry
) -> ProjectionResult<ResolvedSpec> {
    if spec.include.is_some() && spec.exclude.is_some() {
        return Err(ProjectionError::ConflictingSelection {
            spec: spec.name.clone()
        });
    }

    let descriptor = lookup_type(spec, types, &spec.source)?;

    let named = spec
        .include
        .iter()
        .flatten()
        .chain(spec.exclude.iter().flatten())
        .chain(spec.rename.keys())
        .chain(spec.nested.keys());
    for name in named {
        if descriptor.get(name).is_none() {
            return Err(unknown_field(spec, &descriptor.name, name));
        }
    }

    for (field, nested) in &spec.nested {
        check_nested(spec, descriptor, field, nested, specs)?;
    }

    let selected: Vec<&str> = match (&spec.include, &spec.exclude) {
        (Some(include), _) => include.iter().map(String::as_str).collect(),
        (None, Some(exclude)) => descriptor
            .field_names()
            .filter(|name| !exclude.iter().any(|e| e.as_str() == *name))
            .collect(),
        (None, None) => descriptor.field_names().collect()
    };

    let mut fields = Vec::with_capacity(selected.len() + spec.flatten.len());
    for name in selected {
        let kind = descriptor
            .get(name)
            .map(|f| f.kind.clone())
            .ok_or_else(|| unknown_field(spec, &descriptor.name, name))?;
        fields.push(ResolvedField {
            source: FieldSource::Direct(name.to_owned()),
            target: spec.target_name(name).to_owned(),
            kind,
            nested: spec.nested.get(name).cloned()
        });
    }
    for mapping in &spec.flatten {
        fields.push(resolve_path(spec, descriptor, mapping, types)?);
    }

    let mut seen = HashSet::with_capacity(fields.len());
    for field in &fields {
        if !seen.insert(field.target.as_str()) {
            return Err(ProjectionError::DuplicateTarget {
                spec:  spec.name.clone(),
                field: field.target.clone()
            });
        }
    }

    Ok(ResolvedSpec {
        name: spec.name.clone(),
        source: spec.source.clone(),
        fields,
        max_depth: spec.max_depth,
        preserve_references: spec.preserve_references
    })
}

fn lookup_type<'a>(
    spec: &ProjectionSpec,
    types: &'a TypeRegistry,
    name: &str
) -> ProjectionResult<&'a TypeDescriptor> {
    types.get(name).ok_or_else(|| ProjectionError::UnknownType {
        spec:      spec.name.clone(),
        type_name: name.to_owned()
    })
}

fn unknown_field(spec: &ProjectionSpec, type_name: &str, field: &str) -> ProjectionError {
    ProjectionError::UnknownField {
        spec:      spec.name.clone(),
        type_name: type_name.to_owned(),
        field:     field.to_owned()
    }
}

fn check_nested(
    spec: &ProjectionSpec,
    descriptor: &TypeDescriptor,
    field: &str,
    nested: &str,
    specs: &IndexMap<String, ProjectionSpec>
) -> ProjectionResult<()> {
    let nested_spec = specs
        .get(nested)
        .ok_or_else(|| ProjectionError::UnknownSpec {
            spec: nested.to_owned()
        })?;
    let Some(kind) = descriptor.get(field).map(|f| &f.kind) else {
        return Err(unknown_field(spec, &descriptor.name, field));
    };
    match kind.target_type() {
        Some(actual) if actual == nested_spec.source => Ok(()),
        _ => Err(ProjectionError::TypeMismatch {
            spec:     spec.name.clone(),
            field:    field.to_owned(),
            expected: format!("reference to `{}`", nested_spec.source),
            found:    kind.describe()
        })
    }
}

fn resolve_path<'a>(
    spec: &ProjectionSpec,
    root: &'a TypeDescriptor,
    mapping: &PathMapping,
    types: &'a TypeRegistry
) -> ProjectionResult<ResolvedField> {
    let invalid = |reason: String| ProjectionError::InvalidPath {
        spec: spec.name.clone(),
        path: mapping.dotted(),
        reason
    };

    let Some((last, walk)) = mapping.path.split_last() else {
        return Err(invalid("path is empty".to_owned()));
    };

    let mut current = root;
    for segment in walk {
        let field = current
            .get(segment)
            .ok_or_else(|| unknown_field(spec, &current.name, segment))?;
        let FieldKind::Reference(next) = &field.kind else {
            return Err(invalid(format!(
                "`{segment}` is {}, not a single reference",
                field.kind.describe()
            )));
        };
        current = lookup_type(spec, types, next)?;
    }

    let field = current
        .get(last)
        .ok_or_else(|| unknown_field(spec, &current.name, last))?;
    if field.kind.is_reference_like() {
        return Err(invalid(format!(
            "`{last}` is {}; flattened values must be plain",
            field.kind.describe()
        )));
    }

    Ok(ResolvedField {
        source: FieldSource::Path(mapping.path.clone()),
        target: mapping.target.clone(),
        kind:   field.kind.clone(),
        nested: None
    })
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Active,
    Done
}

/// Reject cycles in the nested-spec graph made only of specs that set
/// neither `max_depth` nor `preserve_references`.
fn check_cycles(specs: &IndexMap<String, ResolvedSpec>) -> ProjectionResult<()> {
    let mut marks: IndexMap<&str, Mark> = IndexMap::new();
    for name in specs.keys() {
        visit(name, specs, &mut marks)?;
    }
    Ok(())
}

fn visit<'a>(
    name: &'a str,
    specs: &'a IndexMap<String, ResolvedSpec>,
    marks: &mut IndexMap<&'a str, Mark>
) -> ProjectionResult<()> {
    let Some(spec) = specs.get(name) else {
        return Ok(());
    };
    if spec.is_bounded() {
        return Ok(());
    }
    match marks.get(name) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Active) => {
            return Err(ProjectionError::UnboundedCycle {
                spec: name.to_owned()
            });
        }
        None => {}
    }
    marks.insert(name, Mark::Active);
    for nested in spec.fields.iter().filter_map(|f| f.nested.as_deref()) {
        visit(nested, specs, marks)?;
    }
    marks.insert(name, Mark::Done);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TypeRegistry {
        let mut types = TypeRegistry::new();
        types.insert(
            TypeDescriptor::new("Employee")
                .scalar("id")
                .scalar("first_name")
                .scalar("salary")
                .field("address", FieldKind::reference("Address"))
                .field(
                    "previous_addresses",
                    FieldKind::collection(FieldKind::reference("Address"))
                )
                .field("company", FieldKind::reference("Company"))
                .field("manager", FieldKind::reference("Employee"))
        );
        types.insert(TypeDescriptor::new("Address").scalar("street").scalar("city"));
        types.insert(TypeDescriptor::new("Company").scalar("name"));
        types
    }

    fn run(specs: Vec<ProjectionSpec>) -> ProjectionResult<IndexMap<String, ResolvedSpec>> {
        let specs: IndexMap<String, ProjectionSpec> =
            specs.into_iter().map(|s| (s.name.clone(), s)).collect();
        resolve_all(&specs, &registry())
    }

    #[test]
    fn include_keeps_given_order() {
        let resolved = run(vec![
            ProjectionSpec::new("EmployeeContact", "Employee").include(["first_name", "id"]),
        ])
        .unwrap();
        let names: Vec<&str> = resolved["EmployeeContact"].target_names().collect();
        assert_eq!(names, vec!["first_name", "id"]);
    }

    #[test]
    fn exclude_keeps_declaration_order() {
        let resolved = run(vec![
            ProjectionSpec::new("EmployeeDto", "Employee").exclude([
                "salary",
                "address",
                "previous_addresses",
                "company",
                "manager",
            ]),
        ])
        .unwrap();
        let names: Vec<&str> = resolved["EmployeeDto"].target_names().collect();
        assert_eq!(names, vec!["id", "first_name"]);
    }

    #[test]
    fn rename_and_flatten() {
        let resolved = run(vec![
            ProjectionSpec::new("EmployeeRow", "Employee")
                .include(["first_name"])
                .rename("first_name", "given_name")
                .flatten(["company", "name"], "company_name"),
        ])
        .unwrap();
        let spec = &resolved["EmployeeRow"];
        let names: Vec<&str> = spec.target_names().collect();
        assert_eq!(names, vec!["given_name", "company_name"]);
        assert_eq!(
            spec.field("company_name").map(|f| &f.source),
            Some(&FieldSource::Path(vec!["company".into(), "name".into()]))
        );
        assert_eq!(spec.field("given_name").and_then(ResolvedField::direct_source), Some("first_name"));
    }

    #[test]
    fn conflicting_selection() {
        let err = run(vec![
            ProjectionSpec::new("Bad", "Employee")
                .include(["id"])
                .exclude(["salary"]),
        ])
        .unwrap_err();
        assert!(matches!(err, ProjectionError::ConflictingSelection { .. }));
    }

    #[test]
    fn unknown_field_in_any_section() {
        for spec in [
            ProjectionSpec::new("Bad", "Employee").include(["nope"]),
            ProjectionSpec::new("Bad", "Employee").exclude(["nope"]),
            ProjectionSpec::new("Bad", "Employee").rename("nope", "x"),
            ProjectionSpec::new("Bad", "Employee").flatten(["company", "nope"], "x"),
        ] {
            let err = run(vec![spec]).unwrap_err();
            assert!(matches!(err, ProjectionError::UnknownField { .. }), "{err}");
        }
    }

    #[test]
    fn unknown_source_type() {
        let err = run(vec![ProjectionSpec::new("Bad", "Ghost")]).unwrap_err();
        assert!(matches!(err, ProjectionError::UnknownType { .. }));
    }

    #[test]
    fn unknown_nested_spec() {
        let err = run(vec![
            ProjectionSpec::new("EmployeeDto", "Employee").nested("address", "Missing"),
        ])
        .unwrap_err();
        assert!(matches!(err, ProjectionError::UnknownSpec { .. }));
    }

    #[test]
    fn nested_type_mismatch() {
        let err = run(vec![
            ProjectionSpec::new("CompanyDto", "Company"),
            ProjectionSpec::new("EmployeeDto", "Employee").nested("address", "CompanyDto"),
        ])
        .unwrap_err();
        assert!(matches!(err, ProjectionError::TypeMismatch { .. }));
    }

    #[test]
    fn nested_on_scalar_is_mismatch() {
        let err = run(vec![
            ProjectionSpec::new("AddressDto", "Address"),
            ProjectionSpec::new("EmployeeDto", "Employee").nested("salary", "AddressDto"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ProjectionError::TypeMismatch { ref found, .. } if found == "scalar"
        ));
    }

    #[test]
    fn nested_collection_matches_element_type() {
        let resolved = run(vec![
            ProjectionSpec::new("AddressDto", "Address"),
            ProjectionSpec::new("EmployeeDto", "Employee")
                .include(["previous_addresses"])
                .nested("previous_addresses", "AddressDto"),
        ])
        .unwrap();
        assert_eq!(
            resolved["EmployeeDto"].fields[0].nested.as_deref(),
            Some("AddressDto")
        );
    }

    #[test]
    fn duplicate_target() {
        let err = run(vec![
            ProjectionSpec::new("Bad", "Employee")
                .include(["id", "first_name"])
                .rename("first_name", "id"),
        ])
        .unwrap_err();
        assert!(matches!(err, ProjectionError::DuplicateTarget { .. }));
    }

    #[test]
    fn flatten_through_collection_is_invalid() {
        let err = run(vec![
            ProjectionSpec::new("Bad", "Employee")
                .include(["id"])
                .flatten(["previous_addresses", "city"], "city"),
        ])
        .unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidPath { .. }));
    }

    #[test]
    fn flatten_to_reference_is_invalid() {
        let err = run(vec![
            ProjectionSpec::new("Bad", "Employee")
                .include(["id"])
                .flatten(["manager", "address"], "manager_address"),
        ])
        .unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidPath { .. }));
    }

    #[test]
    fn empty_flatten_path_is_invalid() {
        let err = run(vec![
            ProjectionSpec::new("Bad", "Employee").flatten(Vec::<String>::new(), "x"),
        ])
        .unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidPath { .. }));
    }

    #[test]
    fn unbounded_self_reference_is_rejected() {
        let err = run(vec![
            ProjectionSpec::new("EmployeeDto", "Employee")
                .include(["id", "manager"])
                .nested("manager", "EmployeeDto"),
        ])
        .unwrap_err();
        assert!(matches!(err, ProjectionError::UnboundedCycle { .. }));
    }

    #[test]
    fn bounded_self_reference_is_accepted() {
        for spec in [
            ProjectionSpec::new("EmployeeDto", "Employee")
                .include(["id", "manager"])
                .nested("manager", "EmployeeDto")
                .max_depth(3),
            ProjectionSpec::new("EmployeeDto", "Employee")
                .include(["id", "manager"])
                .nested("manager", "EmployeeDto")
                .preserve_references(),
        ] {
            assert!(run(vec![spec]).is_ok());
        }
    }

    #[test]
    fn indirect_cycle_needs_one_bounded_member() {
        let a = ProjectionSpec::new("A", "Employee")
            .include(["manager"])
            .nested("manager", "B");
        let b = ProjectionSpec::new("B", "Employee")
            .include(["manager"])
            .nested("manager", "A");

        let err = run(vec![a.clone(), b.clone()]).unwrap_err();
        assert!(matches!(err, ProjectionError::UnboundedCycle { .. }));

        assert!(run(vec![a, b.max_depth(4)]).is_ok());
    }

    #[test]
    fn excluded_nested_field_does_not_form_cycle() {
        let resolved = run(vec![
            ProjectionSpec::new("EmployeeDto", "Employee")
                .include(["id"])
                .nested("manager", "EmployeeDto"),
        ]);
        assert!(resolved.is_ok());
    }
}
