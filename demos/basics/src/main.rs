// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Basics Example with facetmap
//!
//! Demonstrates:
//! - `#[derive(Reflect)]` on domain types
//! - `#[derive(Facet)]` DTOs with `from`, `rename_all`, `flatten` and `skip`
//! - the same projection declared at runtime in a JSON spec document
//! - query-layer field selection

use facetmap::{Facet, Projector, Reflect, Value};
use uuid::Uuid;

// ============================================================================
// Domain
// ============================================================================

/// Postal address.
#[derive(Debug, Clone, Reflect)]
pub struct Address {
    pub street: String,
    pub city:   String
}

/// User entity with a field that must never leave the service.
#[derive(Debug, Clone, Reflect)]
pub struct User {
    pub id:            Uuid,
    pub email:         String,
    pub display_name:  String,
    pub password_hash: String,
    pub address:       Option<Box<Address>>
}

// ============================================================================
// Facets
// ============================================================================

/// Public profile: no email, no password.
#[derive(Debug, Facet)]
#[facet(source = "User", rename_all = "camelCase")]
pub struct PublicProfile {
    pub id:           Uuid,
    pub display_name: String,
    #[facet(flatten = "address.city")]
    pub city:         Option<String>,
    #[facet(skip)]
    pub badge:        String
}

/// Contact card with a renamed field.
#[derive(Debug, Facet)]
#[facet(source = "User")]
pub struct ContactCard {
    #[facet(from = "display_name")]
    pub name:  String,
    pub email: String
}

const DOCUMENT: &str = r#"{
    "config": { "recursion_limit": 64 },
    "specs": [
        {
            "name": "UserSummary",
            "source": "User",
            "exclude": ["password_hash", "address"],
            "rename": { "display_name": "name" }
        }
    ]
}"#;

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("demo_basics=info,facetmap_core=debug")
        .init();

    let projector = Projector::builder()
        .facet::<PublicProfile>()
        .facet::<ContactCard>()
        .document_json(DOCUMENT)
        .build()?;

    let user = User {
        id:            Uuid::new_v4(),
        email:         "ann@example.com".into(),
        display_name:  "Ann".into(),
        password_hash: "$argon2id$...".into(),
        address:       Some(Box::new(Address {
            street: "Karl Johans gate 1".into(),
            city:   "Oslo".into()
        }))
    };

    let profile: PublicProfile = projector.project_as(&user)?;
    tracing::info!(?profile, "public profile");

    let card: ContactCard = projector.project_as(&user)?;
    tracing::info!(?card, "contact card");

    let source = <User as Reflect>::to_value(&user);
    let summary = projector.project_json(&source, "UserSummary")?;
    tracing::info!(%summary, "runtime spec from JSON document");

    let many = projector.project_many(&[source.clone(), Value::Null], "UserSummary")?;
    tracing::info!(count = many.len(), absent = many[1].is_null(), "batch projection");

    let selection = projector.selection(&PublicProfile::spec().name)?;
    tracing::info!(paths = ?selection.paths(), "columns to load for PublicProfile");

    Ok(())
}
