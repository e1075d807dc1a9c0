// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Async Hooks Example with facetmap
//!
//! Demonstrates:
//! - a typed `FacetHook` that completes a DTO from an external service
//! - a dynamic `FnHook` over `Value`
//! - writing an edited DTO back onto its entity and reading the change set

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use facetmap::{Facet, FacetHook, FnHook, HookError, Projector, Reflect, Value};
use uuid::Uuid;

// ============================================================================
// Domain
// ============================================================================

/// Account entity.
#[derive(Debug, Clone, Reflect)]
pub struct Account {
    pub id:           Uuid,
    pub email:        String,
    pub display_name: String,
    pub banned:       bool
}

/// Profile card; `followers` is not stored on the account.
#[derive(Debug, Facet)]
#[facet(source = "Account")]
pub struct ProfileCard {
    pub id:           Uuid,
    pub display_name: String,
    #[facet(skip)]
    pub followers:    u64
}

/// Settings form as sent by a client.
#[derive(Debug, Facet)]
#[facet(source = "Account", rename_all = "PascalCase")]
pub struct SettingsForm {
    pub email:        String,
    pub display_name: String
}

// ============================================================================
// Hooks
// ============================================================================

#[derive(Debug, thiserror::Error)]
#[error("social graph unavailable for {0}")]
pub struct GraphError(Uuid);

/// Stand-in for a remote social graph service.
pub struct SocialGraph {
    followers: HashMap<Uuid, u64>
}

#[async_trait]
impl FacetHook<Account, ProfileCard> for SocialGraph {
    type Error = GraphError;

    async fn map(
        &self,
        source: &Account,
        mut card: ProfileCard
    ) -> Result<ProfileCard, Self::Error> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        card.followers = *self.followers.get(&source.id).ok_or(GraphError(source.id))?;
        Ok(card)
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("demo_async_hooks=info,facetmap_core=debug")
        .init();

    let projector = Projector::builder()
        .facet::<ProfileCard>()
        .facet::<SettingsForm>()
        .build()?;

    let mut account = Account {
        id:           Uuid::new_v4(),
        email:        "old@x.com".into(),
        display_name: "Ann".into(),
        banned:       false
    };

    let graph = SocialGraph {
        followers: HashMap::from([(account.id, 42)])
    };
    let card = projector
        .project_as_async::<ProfileCard, _>(&account, &graph)
        .await?;
    tracing::info!(?card, "profile card with followers");

    let stranger = Account {
        id: Uuid::new_v4(),
        ..account.clone()
    };
    match projector
        .project_as_async::<ProfileCard, _>(&stranger, &graph)
        .await
    {
        Err(HookError::Hook(err)) => tracing::warn!(%err, "hook failed, no card produced"),
        Err(HookError::Projection(err)) => return Err(err.into()),
        Ok(card) => tracing::info!(?card, "unexpected card")
    }

    let badge = FnHook::new(|source: &Value, target: Value| {
        let banned = matches!(source.get("banned"), Some(Value::Bool(true)));
        if let Some(obj) = target.as_object() {
            obj.set("status", if banned { "banned" } else { "active" });
        }
        Ok::<_, std::convert::Infallible>(target)
    });
    let dynamic = projector
        .project_async(&<Account as Reflect>::to_value(&account), "ProfileCard", &badge)
        .await?;
    tracing::info!(json = %dynamic.to_json()?, "dynamic hook output");

    let form = SettingsForm {
        email:        "a@x.com".into(),
        display_name: "Ann".into()
    };
    let changes = projector.update_from(&mut account, &form)?;
    for change in &changes {
        tracing::info!(field = %change.field, old = ?change.old, new = ?change.new, "changed");
    }
    tracing::info!(
        email = %account.email,
        display_name_changed = changes.contains("display_name"),
        "account updated"
    );

    Ok(())
}
