// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Projector settings.

use serde::{Deserialize, Serialize};

/// Default maximum nesting level of a single projection call.
pub const DEFAULT_RECURSION_LIMIT: usize = 256;

fn default_recursion_limit() -> usize {
    DEFAULT_RECURSION_LIMIT
}

fn default_strict_types() -> bool {
    true
}

/// Settings shared by every projection a [`Projector`](crate::Projector) runs.
///
/// | Field | Default | Effect |
/// |-------|---------|--------|
/// | `recursion_limit` | 256 | Hard cap on nesting, independent of spec `max_depth` |
/// | `strict_types` | `true` | Reject source objects whose type name differs from the spec's source |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectorConfig {
    /// Maximum nesting level before a projection aborts with
    /// [`ProjectionError::RecursionLimit`](crate::ProjectionError::RecursionLimit).
    #[serde(default = "default_recursion_limit")]
    pub recursion_limit: usize,

    /// Check runtime object type names against spec sources.
    ///
    /// Anonymous objects (empty type name) always pass.
    #[serde(default = "default_strict_types")]
    pub strict_types: bool
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            recursion_limit: default_recursion_limit(),
            strict_types:    default_strict_types()
        }
    }
}

impl ProjectorConfig {
    /// Override the recursion limit.
    #[must_use]
    pub const fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Toggle type-name checks.
    #[must_use]
    pub const fn with_strict_types(mut self, strict: bool) -> Self {
        self.strict_types = strict;
        self
    }
}
