// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Validated definitions consumed by the generators.

use std::collections::HashSet;

use darling::{FromDeriveInput, util::Override};
use syn::{DeriveInput, GenericArgument, Ident, Path, PathArguments, Type, ext::IdentExt};

use super::{
    RenameRule,
    attrs::{FacetAttrs, FacetFieldAttrs, ReflectAttrs, ReflectFieldAttrs}
};

/// Wrapper types peeled when inferring a nested facet from a field type.
const WRAPPERS: &[&str] = &["Option", "Vec", "Box"];

/// A reflected struct.
#[derive(Debug)]
pub struct TypeDef {
    /// Struct name.
    pub ident:  Ident,
    /// Reflected type name.
    pub name:   String,
    /// Fields in declaration order, skipped ones included.
    pub fields: Vec<FieldDef>
}

/// A reflected field.
#[derive(Debug)]
pub struct FieldDef {
    pub ident: Ident,
    pub ty:    Type,
    /// Reflected field name.
    pub name:  String,
    pub skip:  bool
}

/// Where a facet field takes its value from.
#[derive(Debug)]
pub enum Origin {
    /// Source field copied as is.
    Field(String),
    /// Source field projected through another facet.
    Nested { field: String, facet: Path },
    /// Value at a dotted source path.
    Flatten(Vec<String>)
}

/// One non-skipped facet field.
#[derive(Debug)]
pub struct Mapping {
    /// Field name on the DTO.
    pub target: String,
    pub origin: Origin
}

/// A facet struct.
#[derive(Debug)]
pub struct FacetDef {
    /// The DTO as a reflected type.
    pub def:                 TypeDef,
    pub source:              Path,
    pub mappings:            Vec<Mapping>,
    pub max_depth:           Option<usize>,
    pub preserve_references: bool
}

impl FacetDef {
    /// Nested facet types, deduplicated in declaration order.
    #[must_use]
    pub fn nested_facets(&self) -> Vec<&Path> {
        let mut out: Vec<&Path> = Vec::new();
        for mapping in &self.mappings {
            if let Origin::Nested { facet, .. } = &mapping.origin
                && !out.contains(&facet)
            {
                out.push(facet);
            }
        }
        out
    }
}

impl TypeDef {
    /// Parse and validate a `#[derive(Reflect)]` input.
    pub fn from_derive_input(input: &DeriveInput) -> darling::Result<Self> {
        let attrs = ReflectAttrs::from_derive_input(input)?;
        reject_generics(&attrs.ident, !attrs.generics.params.is_empty(), "Reflect")?;

        let raw = attrs
            .data
            .take_struct()
            .ok_or_else(|| {
                darling::Error::custom("Reflect requires a struct").with_span(&attrs.ident)
            })?
            .fields;

        let fields = raw
            .into_iter()
            .map(|field| reflect_field(field, attrs.rename_all))
            .collect::<darling::Result<Vec<_>>>()?;

        let name = attrs.name.unwrap_or_else(|| attrs.ident.to_string());
        check_unique(&fields)?;

        Ok(Self {
            ident: attrs.ident,
            name,
            fields
        })
    }
}

impl FacetDef {
    /// Parse and validate a `#[derive(Facet)]` input.
    pub fn from_derive_input(input: &DeriveInput) -> darling::Result<Self> {
        let attrs = FacetAttrs::from_derive_input(input)?;
        reject_generics(&attrs.ident, !attrs.generics.params.is_empty(), "Facet")?;

        let raw = attrs
            .data
            .take_struct()
            .ok_or_else(|| {
                darling::Error::custom("Facet requires a struct").with_span(&attrs.ident)
            })?
            .fields;

        let mut fields = Vec::with_capacity(raw.len());
        let mut mappings = Vec::new();
        for field in raw {
            let (def, mapping) = facet_field(field, attrs.rename_all)?;
            if let Some(mapping) = mapping {
                mappings.push(mapping);
            }
            fields.push(def);
        }

        let name = attrs.name.unwrap_or_else(|| attrs.ident.to_string());
        check_unique(&fields)?;
        check_sources(&attrs.ident, &mappings)?;

        Ok(Self {
            def: TypeDef {
                ident: attrs.ident,
                name,
                fields
            },
            source: attrs.source,
            mappings,
            max_depth: attrs.max_depth,
            preserve_references: attrs.preserve_references
        })
    }
}

fn reject_generics(ident: &Ident, generic: bool, derive: &str) -> darling::Result<()> {
    if generic {
        return Err(
            darling::Error::custom(format!("{derive} cannot be derived for generic types"))
                .with_span(ident)
        );
    }
    Ok(())
}

fn named(ident: Option<Ident>, ty: &Type) -> darling::Result<Ident> {
    ident.ok_or_else(|| darling::Error::custom("fields must be named").with_span(ty))
}

fn reflect_field(field: ReflectFieldAttrs, rule: RenameRule) -> darling::Result<FieldDef> {
    let ident = named(field.ident, &field.ty)?;
    let name = field
        .rename
        .unwrap_or_else(|| rule.apply(&ident.unraw().to_string()));

    Ok(FieldDef {
        ident,
        ty: field.ty,
        name,
        skip: field.skip
    })
}

fn facet_field(
    field: FacetFieldAttrs,
    rule: RenameRule
) -> darling::Result<(FieldDef, Option<Mapping>)> {
    let ident = named(field.ident, &field.ty)?;
    let rust_name = ident.unraw().to_string();
    let name = field.rename.unwrap_or_else(|| rule.apply(&rust_name));

    if field.skip && (field.from.is_some() || field.nested.is_some() || field.flatten.is_some()) {
        return Err(darling::Error::custom(
            "`skip` cannot be combined with `from`, `nested` or `flatten`"
        )
        .with_span(&ident));
    }
    if field.flatten.is_some() && (field.from.is_some() || field.nested.is_some()) {
        return Err(darling::Error::custom(
            "`flatten` names its own source path and cannot be combined with `from` or `nested`"
        )
        .with_span(&ident));
    }

    let mapping = if field.skip {
        None
    } else if let Some(path) = field.flatten {
        Some(Mapping {
            target: name.clone(),
            origin: Origin::Flatten(parse_path(&path, &ident)?)
        })
    } else {
        let source = field.from.unwrap_or_else(|| rust_name.clone());
        let origin = match field.nested {
            Some(Override::Explicit(facet)) => Origin::Nested {
                field: source,
                facet
            },
            Some(Override::Inherit) => Origin::Nested {
                field: source,
                facet: innermost_path(&field.ty).ok_or_else(|| {
                    darling::Error::custom(
                        "cannot infer the nested facet from this type; use `nested = \"Type\"`"
                    )
                    .with_span(&field.ty)
                })?
            },
            None => Origin::Field(source)
        };
        Some(Mapping {
            target: name.clone(),
            origin
        })
    };

    let def = FieldDef {
        ident,
        ty: field.ty,
        name,
        skip: field.skip
    };
    Ok((def, mapping))
}

/// Split `"a.b.c"` into segments.
pub fn parse_path(path: &str, ident: &Ident) -> darling::Result<Vec<String>> {
    let segments: Vec<String> = path.split('.').map(|s| s.trim().to_owned()).collect();
    if segments.iter().any(String::is_empty) {
        return Err(
            darling::Error::custom(format!("invalid flatten path `{path}`")).with_span(ident)
        );
    }
    if segments.len() < 2 {
        return Err(darling::Error::custom(
            "flatten path needs at least two segments; use `from` to read a direct field"
        )
        .with_span(ident));
    }
    Ok(segments)
}

/// Peel `Option`, `Vec` and `Box` down to the element type.
pub fn innermost_path(ty: &Type) -> Option<Path> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let last = type_path.path.segments.last()?;
    if WRAPPERS.contains(&last.ident.to_string().as_str())
        && let PathArguments::AngleBracketed(args) = &last.arguments
    {
        return args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(inner) => innermost_path(inner),
            _ => None
        });
    }
    Some(type_path.path.clone())
}

fn check_unique(fields: &[FieldDef]) -> darling::Result<()> {
    let mut seen = HashSet::new();
    for field in fields.iter().filter(|f| !f.skip) {
        if !seen.insert(field.name.as_str()) {
            return Err(darling::Error::custom(format!(
                "field name `{}` is used more than once",
                field.name
            ))
            .with_span(&field.ident));
        }
    }
    Ok(())
}

fn check_sources(ident: &Ident, mappings: &[Mapping]) -> darling::Result<()> {
    let mut seen = HashSet::new();
    for mapping in mappings {
        let source = match &mapping.origin {
            Origin::Field(field) | Origin::Nested { field, .. } => field,
            Origin::Flatten(_) => continue
        };
        if !seen.insert(source.as_str()) {
            return Err(darling::Error::custom(format!(
                "source field `{source}` is mapped more than once"
            ))
            .with_span(ident));
        }
    }
    Ok(())
}
