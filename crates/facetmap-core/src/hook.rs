// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Custom mapping hooks.
//!
//! A hook sees the source and the default projection and returns the final
//! target. It runs once per top-level call, after the projection finished,
//! and is the only step allowed to suspend (a lookup, a remote call).
//!
//! | Trait | Works on | Used by |
//! |-------|----------|---------|
//! | [`MapHook`] | [`Value`] | [`Projector::project_async`](crate::Projector::project_async) |
//! | [`FacetHook`] | typed source and DTO | [`Projector::project_as_async`](crate::Projector::project_as_async) |
//!
//! # Example
//!
//! ```rust,ignore
//! struct Greeting;
//!
//! #[async_trait]
//! impl FacetHook<User, UserDto> for Greeting {
//!     type Error = std::convert::Infallible;
//!
//!     async fn map(&self, source: &User, mut target: UserDto) -> Result<UserDto, Self::Error> {
//!         target.greeting = format!("Hello, {}", source.name);
//!         Ok(target)
//!     }
//! }
//! ```

use std::{fmt, marker::PhantomData};

use async_trait::async_trait;

use crate::{error::ProjectionError, value::Value};

/// Error of a hooked projection.
#[derive(Debug)]
pub enum HookError<E> {
    /// Projection failed before the hook ran.
    Projection(ProjectionError),
    /// The hook itself failed.
    Hook(E)
}

impl<E> HookError<E> {
    /// Check if the projection failed.
    pub const fn is_projection(&self) -> bool {
        matches!(self, Self::Projection(_))
    }

    /// Check if the hook failed.
    pub const fn is_hook(&self) -> bool {
        matches!(self, Self::Hook(_))
    }

    /// Hook error, if the hook failed.
    pub fn into_hook(self) -> Option<E> {
        match self {
            Self::Hook(e) => Some(e),
            Self::Projection(_) => None
        }
    }
}

impl<E> From<ProjectionError> for HookError<E> {
    fn from(err: ProjectionError) -> Self {
        Self::Projection(err)
    }
}

impl<E: fmt::Display> fmt::Display for HookError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Projection(e) => write!(f, "projection failed: {}", e),
            Self::Hook(e) => write!(f, "mapping hook failed: {}", e)
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for HookError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Projection(e) => Some(e),
            Self::Hook(e) => Some(e)
        }
    }
}

/// Hook over dynamic values.
#[async_trait]
pub trait MapHook: Send + Sync {
    /// Error returned by the hook.
    type Error: std::error::Error + Send + Sync;

    /// Produce the final target from the source and the default projection.
    async fn map(&self, source: &Value, target: Value) -> Result<Value, Self::Error>;
}

/// Hook over a typed source and DTO.
#[async_trait]
pub trait FacetHook<S, T>: Send + Sync
where
    S: Sync,
    T: Send + 'static
{
    /// Error returned by the hook.
    type Error: std::error::Error + Send + Sync;

    /// Produce the final DTO from the source and the default projection.
    async fn map(&self, source: &S, target: T) -> Result<T, Self::Error>;
}

/// Adapts a synchronous closure into a [`MapHook`].
///
/// ```rust
/// use facetmap_core::{FnHook, Value};
///
/// let hook = FnHook::new(|_source: &Value, target: Value| {
///     Ok::<_, std::convert::Infallible>(target)
/// });
/// # let _ = hook;
/// ```
pub struct FnHook<F, E> {
    f:       F,
    _marker: PhantomData<fn() -> E>
}

impl<F, E> FnHook<F, E>
where
    F: Fn(&Value, Value) -> Result<Value, E> + Send + Sync
{
    /// Wrap a closure.
    pub const fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData
        }
    }
}

impl<F, E> fmt::Debug for FnHook<F, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHook").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, E> MapHook for FnHook<F, E>
where
    F: Fn(&Value, Value) -> Result<Value, E> + Send + Sync,
    E: std::error::Error + Send + Sync
{
    type Error = E;

    async fn map(&self, source: &Value, target: Value) -> Result<Value, Self::Error> {
        (self.f)(source, target)
    }
}
