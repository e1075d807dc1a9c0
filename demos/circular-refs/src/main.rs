// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Circular References Example with facetmap
//!
//! Demonstrates:
//! - `preserve_references`: a cyclic org chart projects without looping and
//!   keeps its shape
//! - `max_depth`: a long management chain is cut off at a fixed level
//! - build-time rejection of self-referencing specs with neither

use facetmap::{Facet, Object, ObjectRef, ProjectionSpec, Projector, Reflect, Value};

// ============================================================================
// Domain
// ============================================================================

/// Employee in an org chart; managers and reports point back at each other.
#[derive(Debug, Clone, Reflect)]
pub struct Employee {
    pub name:    String,
    pub salary:  u32,
    pub manager: Option<Box<Employee>>,
    pub reports: Vec<Employee>
}

// ============================================================================
// Facets
// ============================================================================

/// Whole graph, shared nodes stay shared.
#[derive(Debug, Facet)]
#[facet(source = "Employee", preserve_references)]
pub struct OrgNode {
    pub name:    String,
    #[facet(nested)]
    pub manager: Option<Box<OrgNode>>,
    #[facet(nested)]
    pub reports: Vec<OrgNode>
}

/// Management chain, two levels up at most.
#[derive(Debug, Facet)]
#[facet(source = "Employee", max_depth = 2)]
pub struct ChainLink {
    pub name:    String,
    #[facet(nested)]
    pub manager: Option<Box<ChainLink>>
}

fn employee(name: &str) -> ObjectRef {
    ObjectRef::new(
        Object::new("Employee")
            .with("name", name)
            .with("salary", 100)
            .with("manager", Value::Null)
            .with("reports", Value::List(Vec::new()))
    )
}

fn link(manager: &ObjectRef, report: &ObjectRef) {
    report.set("manager", manager.clone());
    let mut reports = manager
        .get("reports")
        .and_then(|r| r.as_list().map(<[Value]>::to_vec))
        .unwrap_or_default();
    reports.push(Value::Object(report.clone()));
    manager.set("reports", Value::List(reports));
}

fn manager_of(value: &Value) -> Option<ObjectRef> {
    value
        .as_object()?
        .get("manager")
        .and_then(|m| m.as_object().cloned())
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("demo_circular_refs=info,facetmap_core=debug")
        .init();

    let projector = Projector::builder()
        .facet::<OrgNode>()
        .facet::<ChainLink>()
        .build()?;

    // ceo <-> cto <-> dev: every manager lists its reports, every report
    // points at its manager.
    let ceo = employee("ceo");
    let cto = employee("cto");
    let dev = employee("dev");
    link(&ceo, &cto);
    link(&cto, &dev);

    let org = projector.project(&Value::Object(dev.clone()), "OrgNode")?;
    let cto_out = manager_of(&org).ok_or("dev has a manager")?;
    let first_report = cto_out
        .get("reports")
        .and_then(|r| r.as_list().and_then(|l| l.first().cloned()))
        .and_then(|r| r.as_object().cloned())
        .ok_or("cto has reports")?;
    let same = org.as_object().is_some_and(|dev_out| dev_out.ptr_eq(&first_report));
    tracing::info!(same, "cto's report is the projected dev itself");
    tracing::info!(cyclic = org.ensure_acyclic().is_err(), "projected org chart");

    // Two sources reaching the same manager share one target when projected
    // through one context.
    let ops = employee("ops");
    link(&ceo, &ops);
    let batch = projector
        .project_many_shared(&[Value::Object(cto.clone()), Value::Object(ops)], "OrgNode")?;
    let shared = match (manager_of(&batch[0]), manager_of(&batch[1])) {
        (Some(a), Some(b)) => a.ptr_eq(&b),
        _ => false
    };
    tracing::info!(shared, "batch keeps one ceo target");

    // The chain spec stops two levels up: dev -> cto -> ceo, ceo.manager empty.
    let chain = projector.project(&Value::Object(dev), "ChainLink")?;
    tracing::info!(chain = %chain.to_json()?, "depth-limited chain");

    // No depth limit and no preservation on a self-referencing spec.
    let rejected = Projector::builder()
        .register::<Employee>()
        .spec(ProjectionSpec::new("Loop", "Employee").nested("manager", "Loop"))
        .build();
    if let Err(err) = rejected {
        tracing::info!(%err, configuration = err.is_configuration(), "rejected at build time");
    }

    Ok(())
}
