// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Error type for spec resolution and projection.
//!
//! Errors fall in two groups:
//!
//! | Group | Raised | Variants |
//! |-------|--------|----------|
//! | Configuration | [`ProjectorBuilder::build`](crate::ProjectorBuilder::build), before any object is touched | `ConflictingSelection`, `UnknownField`, `UnknownType`, `UnknownSpec`, `TypeMismatch`, `UnboundedCycle`, `DuplicateTarget`, `DuplicateSpec`, `DuplicateType`, `InvalidPath` |
//! | Runtime | while projecting or decoding | `RecursionLimit`, `Decode`, `CyclicValue`, `Document` |
//!
//! `UnknownSpec` and `TypeMismatch` can also surface at runtime when a caller
//! names a spec that was never registered or passes a non-object source.

use thiserror::Error;

/// Unified error type for the projector.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// Both `include` and `exclude` were set on one spec.
    #[error("spec `{spec}` sets both include and exclude")]
    ConflictingSelection {
        /// Spec name.
        spec: String
    },

    /// A spec names a field the source type does not declare.
    #[error("spec `{spec}` references unknown field `{field}` on `{type_name}`")]
    UnknownField {
        /// Spec name.
        spec:      String,
        /// Type name.
        type_name: String,
        /// Field name.
        field:     String
    },

    /// A spec names a source type that was never registered.
    #[error("spec `{spec}` uses unregistered type `{type_name}`")]
    UnknownType {
        /// Spec name.
        spec:      String,
        /// Type name.
        type_name: String
    },

    /// A spec name could not be resolved.
    #[error("unknown projection spec `{spec}`")]
    UnknownSpec {
        /// Spec name.
        spec: String
    },

    /// A field's actual type does not match what the spec expects.
    #[error("spec `{spec}` field `{field}`: expected {expected}, found {found}")]
    TypeMismatch {
        /// Spec name.
        spec:     String,
        /// Field name.
        field:    String,
        /// Expected shape.
        expected: String,
        /// Actual shape.
        found:    String
    },

    /// A self-referencing spec graph has neither a depth limit nor
    /// reference preservation.
    #[error("spec `{spec}` is self-referencing and needs max_depth or preserve_references")]
    UnboundedCycle {
        /// Spec name.
        spec: String
    },

    /// Two fields of a spec map to the same target name.
    #[error("spec `{spec}` maps more than one field to target `{field}`")]
    DuplicateTarget {
        /// Spec name.
        spec:  String,
        /// Field name.
        field: String
    },

    /// Two specs share a name.
    #[error("projection spec `{spec}` is registered twice")]
    DuplicateSpec {
        /// Spec name.
        spec: String
    },

    /// Two different descriptors share a type name.
    #[error("type `{type_name}` is described twice with different fields")]
    DuplicateType {
        /// Type name.
        type_name: String
    },

    /// A flatten path is empty or crosses a non-reference field.
    #[error("spec `{spec}` has invalid flatten path `{path}`: {reason}")]
    InvalidPath {
        /// Spec name.
        spec:   String,
        /// Dotted path.
        path:   String,
        /// What went wrong.
        reason: String
    },

    /// Recursion went deeper than the configured limit.
    #[error("recursion limit of {limit} exceeded while projecting `{spec}`")]
    RecursionLimit {
        /// Spec name.
        spec:  String,
        /// Configured limit.
        limit: usize
    },

    /// A value could not be converted to a Rust type.
    #[error("cannot decode `{type_name}`: {reason}")]
    Decode {
        /// Type name.
        type_name: String,
        /// What went wrong.
        reason:    String
    },

    /// A value graph with a cycle was rendered to a tree format.
    #[error("value graph contains a cycle through `{type_name}`")]
    CyclicValue {
        /// Type name.
        type_name: String
    },

    /// A spec document could not be parsed.
    #[error("invalid spec document: {0}")]
    Document(#[from] serde_json::Error)
}

impl ProjectionError {
    /// Check if this error comes from an invalid spec rather than from the
    /// data being projected.
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConflictingSelection { .. }
                | Self::UnknownField { .. }
                | Self::UnknownType { .. }
                | Self::UnknownSpec { .. }
                | Self::TypeMismatch { .. }
                | Self::UnboundedCycle { .. }
                | Self::DuplicateTarget { .. }
                | Self::DuplicateSpec { .. }
                | Self::DuplicateType { .. }
                | Self::InvalidPath { .. }
        )
    }

    /// Shorthand for a decode failure.
    pub fn decode(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            type_name: type_name.into(),
            reason:    reason.into()
        }
    }

    /// Prefix a decode failure with the field it happened in.
    ///
    /// Other variants pass through unchanged.
    #[must_use]
    pub fn in_field(self, type_name: &str, field: &str) -> Self {
        match self {
            Self::Decode {
                reason, ..
            } => Self::Decode {
                type_name: type_name.to_owned(),
                reason:    format!("field `{field}`: {reason}")
            },
            other => other
        }
    }
}

/// Result alias used across the crate.
pub type ProjectionResult<T> = Result<T, ProjectionError>;
