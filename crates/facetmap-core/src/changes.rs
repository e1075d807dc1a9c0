// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Change-sets produced by applying a projection back onto its source.
//!
//! The data-store writer only needs the fields that actually changed, so
//! [`Projector::apply`](crate::Projector::apply) records a [`FieldChange`]
//! per differing field and skips the rest.
//!
//! ```rust
//! use facetmap_core::{ChangeSet, FieldChange, Value};
//!
//! let mut changes = ChangeSet::new();
//! changes.record(FieldChange::new("email", "old@x.com", "a@x.com"));
//! changes.record(FieldChange::new("display_name", "Ann", "Ann"));
//!
//! assert_eq!(changes.fields().collect::<Vec<_>>(), vec!["email"]);
//! ```

use crate::value::Value;

/// Old and new value of one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    /// Source field name.
    pub field: String,

    /// Value before the update.
    pub old: Value,

    /// Value after the update.
    pub new: Value
}

impl FieldChange {
    /// Create a change record.
    pub fn new(field: impl Into<String>, old: impl Into<Value>, new: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            old:   old.into(),
            new:   new.into()
        }
    }

    /// Check if old and new differ.
    pub fn is_changed(&self) -> bool {
        self.old != self.new
    }
}

/// Ordered set of field changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<FieldChange>
}

impl ChangeSet {
    /// Create an empty change-set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a change if it actually changes something.
    ///
    /// Returns whether the change was kept.
    pub fn record(&mut self, change: FieldChange) -> bool {
        if !change.is_changed() {
            return false;
        }
        self.changes.push(change);
        true
    }

    /// Check if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changed fields.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Check whether a field changed.
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Change for a field.
    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.changes.iter().find(|c| c.field == field)
    }

    /// Changed field names in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.changes.iter().map(|c| c.field.as_str())
    }

    /// Iterate changes in order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldChange> {
        self.changes.iter()
    }
}

impl IntoIterator for ChangeSet {
    type Item = FieldChange;
    type IntoIter = std::vec::IntoIter<FieldChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a FieldChange;
    type IntoIter = std::slice::Iter<'a, FieldChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}
