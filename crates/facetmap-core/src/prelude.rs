// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Convenient re-exports for common usage.
//!
//! # Usage
//!
//! ```rust,ignore
//! use facetmap_core::prelude::*;
//! ```

pub use crate::{
    ChangeSet, Facet, FacetHook, FieldType, HookError, MapHook, Object, ObjectRef,
    ProjectionError, ProjectionResult, ProjectionSpec, Projector, Reflect, Value, async_trait
};
