// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Per-call projection state.
//!
//! A [`ProjectionContext`] lives for one top-level projection (or one batch
//! when the caller wants references shared across elements). It tracks:
//!
//! - the [`VisitedSet`] of source identities already projected,
//! - the current nesting level,
//! - the remaining depth budget.
//!
//! The remaining budget only ever shrinks along a recursive path: entering a
//! nested field consumes one level, and entering a spec with its own
//! `max_depth` can tighten the budget but never widen it.

use std::collections::HashMap;

use crate::{
    plan::ResolvedSpec,
    value::{ObjectId, ObjectRef}
};

/// Source identities already projected, keyed by `(identity, spec)`.
///
/// Each entry keeps the source handle alive, so an address cannot be freed
/// and reused by another object while the set holds it.
///
/// Inserts are journaled: [`mark`](Self::mark) and
/// [`rollback`](Self::rollback) undo everything recorded after a point, so a
/// failed projection leaves no entry pointing into its unfinished targets.
#[derive(Debug, Default)]
pub struct VisitedSet {
    entries: HashMap<VisitKey, Visit>,
    journal: Vec<(VisitKey, Option<Visit>)>
}

type VisitKey = (ObjectId, String);

#[derive(Debug)]
struct Visit {
    _source: ObjectRef,
    target:  ObjectRef
}

impl VisitedSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `source` was projected through `spec` into `target`.
    pub fn insert(&mut self, source: &ObjectRef, spec: &str, target: ObjectRef) {
        let key = (source.id(), spec.to_owned());
        let previous = self.entries.insert(
            key.clone(),
            Visit {
                _source: source.clone(),
                target
            }
        );
        self.journal.push((key, previous));
    }

    /// Position in the insert journal, for a later [`rollback`](Self::rollback).
    pub fn mark(&self) -> usize {
        self.journal.len()
    }

    /// Undo every insert made since `mark`, newest first.
    pub fn rollback(&mut self, mark: usize) {
        while self.journal.len() > mark {
            let Some((key, previous)) = self.journal.pop() else {
                break;
            };
            match previous {
                Some(visit) => {
                    self.entries.insert(key, visit);
                }
                None => {
                    self.entries.remove(&key);
                }
            }
        }
    }

    /// Target previously produced for `source` through `spec`.
    pub fn get(&self, source: &ObjectRef, spec: &str) -> Option<&ObjectRef> {
        self.entries
            .get(&(source.id(), spec.to_owned()))
            .map(|visit| &visit.target)
    }

    /// Check whether `source` was projected through `spec`.
    pub fn contains(&self, source: &ObjectRef, spec: &str) -> bool {
        self.get(source, spec).is_some()
    }

    /// Number of recorded projections.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.journal.clear();
    }
}

/// Mutable state threaded through one projection.
///
/// Obtain one from [`Projector::context`](crate::Projector::context) to
/// share preserved references across several calls:
///
/// ```rust,ignore
/// let mut ctx = projector.context("PersonDto")?;
/// let a = projector.project_with(&alice, "PersonDto", &mut ctx)?;
/// let b = projector.project_with(&bob, "PersonDto", &mut ctx)?;
/// // a shared manager is one target object in both results
/// ```
#[derive(Debug, Default)]
pub struct ProjectionContext {
    visited:   VisitedSet,
    level:     usize,
    remaining: Option<usize>,
    preserve:  bool
}

impl ProjectionContext {
    /// Unbounded context without reference preservation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context seeded with a root spec's depth limit and preservation flag.
    ///
    /// The flag covers the whole call: when the root spec preserves
    /// references, every nested spec projected through this context does too,
    /// including nested specs that do not set `preserve_references`
    /// themselves. A nested spec that sets it still preserves under a root
    /// that does not.
    pub fn for_spec(spec: &ResolvedSpec) -> Self {
        Self {
            remaining: spec.max_depth,
            preserve: spec.preserve_references,
            ..Self::default()
        }
    }

    /// Set a depth limit.
    #[must_use]
    pub const fn with_max_depth(mut self, depth: usize) -> Self {
        self.remaining = Some(depth);
        self
    }

    /// Enable reference preservation for every spec projected in this context.
    #[must_use]
    pub const fn with_preserve_references(mut self, preserve: bool) -> Self {
        self.preserve = preserve;
        self
    }

    /// Current nesting level; the root object is level 0.
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Remaining depth budget; `None` means unbounded.
    pub const fn remaining_depth(&self) -> Option<usize> {
        self.remaining
    }

    /// Check if reference-bearing fields must be emptied at this level.
    pub const fn is_exhausted(&self) -> bool {
        matches!(self.remaining, Some(0))
    }

    /// Check if reference preservation applies to `spec`.
    pub const fn preserves(&self, spec: &ResolvedSpec) -> bool {
        self.preserve || spec.preserve_references
    }

    /// Visited sources.
    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub(crate) fn visited_mut(&mut self) -> &mut VisitedSet {
        &mut self.visited
    }

    /// Apply a spec's own depth limit, returning the budget to restore.
    pub(crate) fn tighten(&mut self, limit: Option<usize>) -> Option<usize> {
        let saved = self.remaining;
        self.remaining = match (self.remaining, limit) {
            (Some(current), Some(limit)) => Some(current.min(limit)),
            (current, limit) => current.or(limit)
        };
        saved
    }

    /// Step into a nested field.
    pub(crate) fn descend(&mut self) -> Option<usize> {
        let saved = self.remaining;
        self.level += 1;
        self.remaining = self.remaining.map(|r| r.saturating_sub(1));
        saved
    }

    /// Step back out of a nested field.
    pub(crate) fn ascend(&mut self, saved: Option<usize>) {
        self.level = self.level.saturating_sub(1);
        self.remaining = saved;
    }

    pub(crate) fn restore(&mut self, saved: Option<usize>) {
        self.remaining = saved;
    }
}
