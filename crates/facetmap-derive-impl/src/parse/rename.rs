// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Field naming rules.
//!
//! This module defines [`RenameRule`], which controls how Rust field names
//! are exposed as reflected field names.

use convert_case::{Case, Casing};
use darling::FromMeta;

/// Container-level naming rule for reflected fields.
///
/// # Variants
///
/// | Rule | Attribute value | `display_name` becomes |
/// |------|-----------------|------------------------|
/// | `Snake` | `"snake_case"` | `display_name` |
/// | `Camel` | `"camelCase"` | `displayName` |
/// | `Pascal` | `"PascalCase"` | `DisplayName` |
/// | `Kebab` | `"kebab-case"` | `display-name` |
///
/// An explicit `#[reflect(rename = "...")]` or `#[facet(rename = "...")]` on
/// a field always wins over the container rule.
///
/// # Examples
///
/// ```rust,ignore
/// #[derive(Reflect)]
/// #[reflect(rename_all = "camelCase")]
/// pub struct Profile {
///     pub display_name: String
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenameRule {
    /// Keep Rust names as they are.
    #[default]
    Snake,

    /// `lowerCamelCase`.
    Camel,

    /// `UpperCamelCase`.
    Pascal,

    /// `kebab-case`.
    Kebab
}

impl RenameRule {
    /// Apply the rule to a Rust field name.
    #[must_use]
    pub fn apply(self, name: &str) -> String {
        match self {
            Self::Snake => name.to_owned(),
            Self::Camel => name.to_case(Case::Camel),
            Self::Pascal => name.to_case(Case::Pascal),
            Self::Kebab => name.to_case(Case::Kebab)
        }
    }
}

impl FromMeta for RenameRule {
    fn from_string(value: &str) -> darling::Result<Self> {
        match value {
            "snake_case" => Ok(Self::Snake),
            "camelCase" => Ok(Self::Camel),
            "PascalCase" => Ok(Self::Pascal),
            "kebab-case" => Ok(Self::Kebab),
            _ => Err(darling::Error::unknown_value(value))
        }
    }
}
