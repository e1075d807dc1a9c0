// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! The projector.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ ProjectorBuilder                                              │
//! │   register::<T>() / describe(..)  ──► TypeRegistry            │
//! │   spec(..) / facet::<F>() / document(..) ──► ProjectionSpecs  │
//! │   build() ──► resolve + validate ──► Projector                │
//! └───────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │ Projector (immutable, Send + Sync)                            │
//! │   project(source, spec)                                       │
//! │     ├─ Null                    → Null                         │
//! │     ├─ preserved & visited     → previous target              │
//! │     ├─ allocate target, record in VisitedSet                  │
//! │     └─ per field                                              │
//! │          ├─ depth exhausted & reference-like → Null / []      │
//! │          ├─ nested             → recurse (level + 1)          │
//! │          └─ otherwise          → copy                         │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sources are only read. Targets are fresh objects whose type name is the
//! spec name.

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::{
    changes::{ChangeSet, FieldChange},
    config::ProjectorConfig,
    context::ProjectionContext,
    error::{ProjectionError, ProjectionResult},
    facet::{Catalog, Facet},
    hook::{FacetHook, HookError, MapHook},
    plan::{FieldSource, ResolvedSpec, resolve_all},
    schema::{Reflect, TypeDescriptor, TypeRegistry},
    selection::Selection,
    spec::{ProjectionSpec, SpecDocument},
    value::{Object, ObjectRef, Value}
};

const ROOT: &str = "(root)";

/// Collects types, specs and settings, then validates them into a
/// [`Projector`].
///
/// Errors from individual steps are kept and reported by
/// [`build`](Self::build), so calls can be chained.
#[derive(Debug, Default)]
pub struct ProjectorBuilder {
    catalog: Catalog,
    config:  ProjectorConfig,
    error:   Option<ProjectionError>
}

impl ProjectorBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reflected type and everything it references.
    #[must_use]
    pub fn register<T: Reflect>(mut self) -> Self {
        self.catalog.add_type::<T>();
        self
    }

    /// Register a hand-written type descriptor.
    ///
    /// A different descriptor under an already registered name fails the
    /// build with [`ProjectionError::DuplicateType`].
    #[must_use]
    pub fn describe(mut self, descriptor: TypeDescriptor) -> Self {
        self.catalog.add_descriptor(descriptor);
        self
    }

    /// Add a spec. A second spec with the same name fails the build.
    #[must_use]
    pub fn spec(mut self, spec: ProjectionSpec) -> Self {
        if self.catalog.has_spec(&spec.name) {
            self.fail(ProjectionError::DuplicateSpec {
                spec: spec.name
            });
        } else {
            self.catalog.add_spec(spec);
        }
        self
    }

    /// Add a facet with its source types and nested facets.
    #[must_use]
    pub fn facet<F: Facet>(mut self) -> Self {
        self.catalog.add_facet::<F>();
        self
    }

    /// Replace the settings.
    #[must_use]
    pub fn config(mut self, config: ProjectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Take settings and specs from a document.
    #[must_use]
    pub fn document(mut self, document: SpecDocument) -> Self {
        self.config = document.config;
        for spec in document.specs {
            self = self.spec(spec);
        }
        self
    }

    /// Parse a JSON [`SpecDocument`] and take its settings and specs.
    #[must_use]
    pub fn document_json(mut self, json: &str) -> Self {
        match SpecDocument::from_json(json) {
            Ok(document) => self.document(document),
            Err(err) => {
                self.fail(err);
                self
            }
        }
    }

    fn fail(&mut self, err: ProjectionError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Resolve and validate every spec.
    ///
    /// # Errors
    ///
    /// The first configuration error found; see
    /// [`ProjectionError::is_configuration`].
    pub fn build(self) -> ProjectionResult<Projector> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let (types, specs, conflicts) = self.catalog.into_parts();
        if let Some(err) = conflicts.into_iter().next() {
            return Err(err);
        }
        let specs = resolve_all(&specs, &types)?;
        debug!(specs = specs.len(), types = types.len(), "projector built");
        Ok(Projector {
            types,
            specs,
            config: self.config
        })
    }
}

/// Validated set of projection specs.
///
/// Immutable after [`ProjectorBuilder::build`]; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Projector {
    types:  TypeRegistry,
    specs:  IndexMap<String, ResolvedSpec>,
    config: ProjectorConfig
}

impl Projector {
    /// Start building a projector.
    pub fn builder() -> ProjectorBuilder {
        ProjectorBuilder::new()
    }

    /// Settings in effect.
    pub const fn config(&self) -> &ProjectorConfig {
        &self.config
    }

    /// Registered types.
    pub const fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Resolved spec by name.
    pub fn spec(&self, name: &str) -> Option<&ResolvedSpec> {
        self.specs.get(name)
    }

    /// Spec names in registration order.
    pub fn spec_names(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    fn lookup(&self, name: &str) -> ProjectionResult<&ResolvedSpec> {
        self.specs
            .get(name)
            .ok_or_else(|| ProjectionError::UnknownSpec {
                spec: name.to_owned()
            })
    }

    /// Fresh context seeded with a spec's depth limit and preservation flag.
    ///
    /// # Errors
    ///
    /// [`ProjectionError::UnknownSpec`].
    pub fn context(&self, spec: &str) -> ProjectionResult<ProjectionContext> {
        self.lookup(spec).map(ProjectionContext::for_spec)
    }

    /// Project `source` through `spec` with a fresh context.
    ///
    /// Lists are projected element-wise; `Null` projects to `Null`.
    ///
    /// # Errors
    ///
    /// [`ProjectionError::UnknownSpec`], [`ProjectionError::TypeMismatch`]
    /// for non-object sources, [`ProjectionError::RecursionLimit`].
    #[tracing::instrument(skip_all, fields(spec = %spec))]
    pub fn project(&self, source: &Value, spec: &str) -> ProjectionResult<Value> {
        let resolved = self.lookup(spec)?;
        let mut ctx = ProjectionContext::for_spec(resolved);
        self.project_value(source, resolved, &mut ctx, ROOT)
    }

    /// Project with a caller-owned context, sharing preserved targets
    /// across calls.
    ///
    /// # Errors
    ///
    /// As [`project`](Self::project).
    #[tracing::instrument(skip_all, fields(spec = %spec))]
    pub fn project_with(
        &self,
        source: &Value,
        spec: &str,
        ctx: &mut ProjectionContext
    ) -> ProjectionResult<Value> {
        let resolved = self.lookup(spec)?;
        self.project_value(source, resolved, ctx, ROOT)
    }

    /// Project each source independently, keeping order.
    ///
    /// # Errors
    ///
    /// The first element error.
    #[tracing::instrument(skip_all, fields(spec = %spec, count = sources.len()))]
    pub fn project_many(&self, sources: &[Value], spec: &str) -> ProjectionResult<Vec<Value>> {
        let resolved = self.lookup(spec)?;
        sources
            .iter()
            .map(|source| {
                let mut ctx = ProjectionContext::for_spec(resolved);
                self.project_value(source, resolved, &mut ctx, ROOT)
            })
            .collect()
    }

    /// Project a batch through one shared context, so an object reachable
    /// from several elements maps to one target when preservation is on.
    ///
    /// # Errors
    ///
    /// The first element error.
    #[tracing::instrument(skip_all, fields(spec = %spec, count = sources.len()))]
    pub fn project_many_shared(
        &self,
        sources: &[Value],
        spec: &str
    ) -> ProjectionResult<Vec<Value>> {
        let resolved = self.lookup(spec)?;
        let mut ctx = ProjectionContext::for_spec(resolved);
        sources
            .iter()
            .map(|source| self.project_value(source, resolved, &mut ctx, ROOT))
            .collect()
    }

    /// Project and render as JSON.
    ///
    /// # Errors
    ///
    /// As [`project`](Self::project), plus
    /// [`ProjectionError::CyclicValue`] for cyclic results.
    pub fn project_json(&self, source: &Value, spec: &str) -> ProjectionResult<serde_json::Value> {
        self.project(source, spec)?.to_json()
    }

    /// Project a typed source into facet `T`.
    ///
    /// # Errors
    ///
    /// As [`project`](Self::project), plus [`ProjectionError::CyclicValue`]
    /// when the result graph is cyclic and [`ProjectionError::Decode`] when
    /// it does not fit `T`.
    pub fn project_as<T: Facet>(&self, source: &T::Source) -> ProjectionResult<T> {
        let value = <T::Source as Reflect>::to_value(source);
        let projected = self.project(&value, T::TYPE_NAME)?;
        projected.ensure_acyclic()?;
        <T as Reflect>::from_value(&projected)
    }

    /// Project, then let `hook` produce the final target.
    ///
    /// # Errors
    ///
    /// [`HookError::Projection`] if projection fails (the hook is not
    /// called), [`HookError::Hook`] with the hook's error unchanged.
    pub async fn project_async<H: MapHook>(
        &self,
        source: &Value,
        spec: &str,
        hook: &H
    ) -> Result<Value, HookError<H::Error>> {
        let target = self.project(source, spec)?;
        hook.map(source, target).await.map_err(HookError::Hook)
    }

    /// Typed projection followed by a typed hook.
    ///
    /// # Errors
    ///
    /// As [`project_async`](Self::project_async).
    pub async fn project_as_async<T, H>(
        &self,
        source: &T::Source,
        hook: &H
    ) -> Result<T, HookError<H::Error>>
    where
        T: Facet + Send + 'static,
        T::Source: Sync,
        H: FacetHook<T::Source, T>
    {
        let target = self.project_as::<T>(source)?;
        hook.map(source, target).await.map_err(HookError::Hook)
    }

    /// Fields a query layer must load for `spec`.
    ///
    /// # Errors
    ///
    /// [`ProjectionError::UnknownSpec`].
    pub fn selection(&self, spec: &str) -> ProjectionResult<Selection> {
        Selection::build(spec, &self.specs).ok_or_else(|| ProjectionError::UnknownSpec {
            spec: spec.to_owned()
        })
    }

    /// Write a DTO's values back onto its source entity.
    ///
    /// Only fields that map directly onto a plain source field are written;
    /// nested and flattened fields are left alone, as are fields missing
    /// from the DTO. Returns the fields whose value changed.
    ///
    /// # Errors
    ///
    /// [`ProjectionError::UnknownSpec`], [`ProjectionError::TypeMismatch`]
    /// when `dto` is not an object or `entity` has the wrong type.
    #[tracing::instrument(skip_all, fields(spec = %spec))]
    pub fn apply(&self, entity: &ObjectRef, dto: &Value, spec: &str) -> ProjectionResult<ChangeSet> {
        let resolved = self.lookup(spec)?;
        let Value::Object(dto) = dto else {
            return Err(ProjectionError::TypeMismatch {
                spec:     spec.to_owned(),
                field:    ROOT.to_owned(),
                expected: "object".to_owned(),
                found:    dto.kind_name().to_owned()
            });
        };
        self.check_type(entity, resolved, ROOT)?;

        let updates: Vec<(String, Value)> = {
            let dto = dto.read();
            resolved
                .fields
                .iter()
                .filter(|f| f.nested.is_none() && !f.kind.is_reference_like())
                .filter_map(|f| {
                    let source = f.direct_source()?;
                    let value = dto.get(&f.target)?;
                    Some((source.to_owned(), value.clone()))
                })
                .collect()
        };

        let mut changes = ChangeSet::new();
        for (field, new) in updates {
            let old = entity.get(&field).unwrap_or_default();
            changes.record(FieldChange::new(field, old, new));
        }
        if !changes.is_empty() {
            let mut entity = entity.write();
            for change in &changes {
                entity.set(change.field.clone(), change.new.clone());
            }
        }
        debug!(changed = changes.len(), "applied projection");
        Ok(changes)
    }

    /// Typed [`apply`](Self::apply): update `entity` in place from facet
    /// `dto`.
    ///
    /// # Errors
    ///
    /// As [`apply`](Self::apply), plus [`ProjectionError::Decode`] if the
    /// updated entity no longer decodes.
    pub fn update_from<E, D>(&self, entity: &mut E, dto: &D) -> ProjectionResult<ChangeSet>
    where
        E: Reflect,
        D: Facet<Source = E>
    {
        let object = entity.to_object();
        let changes = self.apply(&object, &<D as Reflect>::to_value(dto), D::TYPE_NAME)?;
        if !changes.is_empty() {
            *entity = E::from_object(&object.read())?;
        }
        Ok(changes)
    }

    fn project_value(
        &self,
        source: &Value,
        spec: &ResolvedSpec,
        ctx: &mut ProjectionContext,
        field: &str
    ) -> ProjectionResult<Value> {
        match source {
            Value::Null => Ok(Value::Null),
            Value::Object(obj) => self.project_object(obj, spec, ctx).map(Value::Object),
            Value::List(items) => items
                .iter()
                .map(|item| self.project_value(item, spec, ctx, field))
                .collect::<ProjectionResult<Vec<_>>>()
                .map(Value::List),
            other => Err(ProjectionError::TypeMismatch {
                spec:     spec.name.clone(),
                field:    field.to_owned(),
                expected: format!("object of type `{}`", spec.source),
                found:    other.kind_name().to_owned()
            })
        }
    }

    fn project_object(
        &self,
        source: &ObjectRef,
        spec: &ResolvedSpec,
        ctx: &mut ProjectionContext
    ) -> ProjectionResult<ObjectRef> {
        if ctx.preserves(spec)
            && let Some(target) = ctx.visited().get(source, &spec.name)
        {
            trace!(spec = %spec.name, source = %source.id(), "reused preserved target");
            return Ok(target.clone());
        }

        if ctx.level() > self.config.recursion_limit {
            warn!(
                spec = %spec.name,
                limit = self.config.recursion_limit,
                "recursion limit exceeded"
            );
            return Err(ProjectionError::RecursionLimit {
                spec:  spec.name.clone(),
                limit: self.config.recursion_limit
            });
        }

        self.check_type(source, spec, ROOT)?;

        let target = ObjectRef::new(Object::new(spec.name.clone()));
        let mark = ctx.visited().mark();
        ctx.visited_mut().insert(source, &spec.name, target.clone());

        let saved = ctx.tighten(spec.max_depth);
        let filled = self.fill(source, spec, ctx);
        ctx.restore(saved);

        match filled {
            Ok(fields) => {
                target.write().replace_fields(fields);
                trace!(
                    spec = %spec.name,
                    source = %source.id(),
                    level = ctx.level(),
                    "projected object"
                );
                Ok(target)
            }
            Err(err) => {
                // Children filled before the failure may point at `target`.
                ctx.visited_mut().rollback(mark);
                Err(err)
            }
        }
    }

    fn check_type(
        &self,
        object: &ObjectRef,
        spec: &ResolvedSpec,
        field: &str
    ) -> ProjectionResult<()> {
        if !self.config.strict_types {
            return Ok(());
        }
        let type_name = object.type_name();
        if type_name.is_empty() || type_name == spec.source {
            return Ok(());
        }
        Err(ProjectionError::TypeMismatch {
            spec:     spec.name.clone(),
            field:    field.to_owned(),
            expected: format!("`{}`", spec.source),
            found:    format!("`{type_name}`")
        })
    }

    fn fill(
        &self,
        source: &ObjectRef,
        spec: &ResolvedSpec,
        ctx: &mut ProjectionContext
    ) -> ProjectionResult<IndexMap<String, Value>> {
        // Snapshot under the lock; nested projection may read this object again.
        let roots: Vec<Value> = {
            let guard = source.read();
            spec.fields
                .iter()
                .map(|f| guard.get(f.source.root()).cloned().unwrap_or_default())
                .collect()
        };

        let mut fields = IndexMap::with_capacity(spec.fields.len());
        for (field, root) in spec.fields.iter().zip(roots) {
            let value = match &field.source {
                FieldSource::Direct(_) => root,
                FieldSource::Path(path) => self.walk(root, &path[1..], spec, &field.target)?
            };

            let projected = if field.kind.is_reference_like() && ctx.is_exhausted() {
                if field.kind.is_collection() {
                    Value::List(Vec::new())
                } else {
                    Value::Null
                }
            } else if let Some(nested) = &field.nested {
                let nested = self.lookup(nested)?;
                let saved = ctx.descend();
                let result = self.project_value(&value, nested, ctx, &field.target);
                ctx.ascend(saved);
                result?
            } else {
                value
            };
            fields.insert(field.target.clone(), projected);
        }
        Ok(fields)
    }

    fn walk(
        &self,
        mut value: Value,
        rest: &[String],
        spec: &ResolvedSpec,
        target: &str
    ) -> ProjectionResult<Value> {
        for segment in rest {
            value = match value {
                Value::Null => return Ok(Value::Null),
                Value::Object(obj) => obj.get(segment).unwrap_or_default(),
                other => {
                    return Err(ProjectionError::TypeMismatch {
                        spec:     spec.name.clone(),
                        field:    target.to_owned(),
                        expected: "object".to_owned(),
                        found:    other.kind_name().to_owned()
                    });
                }
            };
        }
        Ok(value)
    }
}
