// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Derived facets driven through the projector.

use std::sync::atomic::{AtomicUsize, Ordering};

use facetmap::{
    Facet, FacetHook, HookError, Object, ObjectRef, ProjectionError, ProjectionSpec, Projector,
    Reflect, Value, async_trait
};
use uuid::Uuid;

#[derive(Reflect, Debug, Clone)]
pub struct User {
    pub id:            Uuid,
    pub email:         String,
    pub password_hash: String
}

#[derive(Facet, Debug)]
#[facet(source = "User")]
pub struct UserContactDto {
    pub id:    Uuid,
    pub email: String
}

#[derive(Reflect, Debug, Clone)]
pub struct Address {
    pub city:   String,
    pub street: String
}

#[derive(Reflect, Debug, Clone)]
pub struct Employee {
    pub name:    String,
    pub salary:  u32,
    pub address: Option<Box<Address>>,
    pub manager: Option<Box<Employee>>,
    pub reports: Vec<Employee>
}

#[derive(Facet, Debug)]
#[facet(source = "Employee", max_depth = 2)]
pub struct EmployeeDto {
    pub name:    String,
    #[facet(nested)]
    pub manager: Option<Box<EmployeeDto>>,
    #[facet(nested)]
    pub reports: Vec<EmployeeDto>
}

#[derive(Facet, Debug)]
#[facet(source = "Employee")]
pub struct EmployeeRow {
    #[facet(from = "name")]
    pub label: String,
    #[facet(flatten = "address.city")]
    pub city:  Option<String>
}

#[derive(Reflect, Debug, Clone)]
pub struct Node {
    pub name:     String,
    pub next:     Option<Box<Node>>,
    pub children: Vec<Node>
}

#[derive(Facet, Debug)]
#[facet(source = "Node", preserve_references)]
pub struct NodeDto {
    pub name:     String,
    #[facet(nested)]
    pub next:     Option<Box<NodeDto>>,
    #[facet(nested)]
    pub children: Vec<NodeDto>
}

#[derive(Reflect, Debug, Clone)]
pub struct Account {
    pub id:           u64,
    pub email:        String,
    pub display_name: String
}

#[derive(Facet, Debug)]
#[facet(source = "Account", rename_all = "PascalCase")]
pub struct AccountForm {
    pub email:        String,
    pub display_name: String
}

fn employee(name: &str, manager: Option<Employee>) -> Employee {
    Employee {
        name:    name.into(),
        salary:  100,
        address: None,
        manager: manager.map(Box::new),
        reports: Vec::new()
    }
}

fn projector() -> Projector {
    Projector::builder()
        .facet::<UserContactDto>()
        .facet::<EmployeeDto>()
        .facet::<EmployeeRow>()
        .facet::<NodeDto>()
        .facet::<AccountForm>()
        .build()
        .unwrap()
}

#[test]
fn contact_facet_exposes_only_declared_fields() {
    let user = User {
        id:            Uuid::new_v4(),
        email:         "ann@x.com".into(),
        password_hash: "secret".into()
    };
    let projector = projector();

    let json: serde_json::Value = projector
        .project_json(&<User as Reflect>::to_value(&user), "UserContactDto")
        .unwrap();
    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["email", "id"]);

    let dto: UserContactDto = projector.project_as(&user).unwrap();
    assert_eq!(dto.id, user.id);
    assert_eq!(dto.email, "ann@x.com");
}

#[test]
fn derived_spec_matches_hand_written_spec() {
    let expected = ProjectionSpec::new("EmployeeRow", "Employee")
        .include(["name"])
        .rename("name", "label")
        .flatten(["address", "city"], "city");
    assert_eq!(EmployeeRow::spec(), expected);

    let nested = EmployeeDto::spec();
    assert_eq!(nested.nested.get("manager").map(String::as_str), Some("EmployeeDto"));
    assert_eq!(nested.max_depth, Some(2));
}

#[test]
fn depth_limit_empties_deepest_level() {
    let chain = employee(
        "a",
        Some(employee("b", Some(employee("c", Some(employee("d", None))))))
    );

    let dto: EmployeeDto = projector().project_as(&chain).unwrap();
    let b = dto.manager.expect("level 1 populated");
    let c = b.manager.expect("level 2 populated");
    assert_eq!(c.name, "c");
    assert!(c.manager.is_none());
    assert!(c.reports.is_empty());
}

#[test]
fn empty_collection_stays_empty() {
    let dto: EmployeeDto = projector().project_as(&employee("a", None)).unwrap();
    assert!(dto.reports.is_empty());

    let value = projector()
        .project(&<Employee as Reflect>::to_value(&employee("a", None)), "EmployeeDto")
        .unwrap();
    assert_eq!(value.get("reports"), Some(Value::List(Vec::new())));
}

#[test]
fn reports_keep_order() {
    let mut boss = employee("boss", None);
    boss.reports = vec![employee("x", None), employee("y", None), employee("z", None)];

    let dto: EmployeeDto = projector().project_as(&boss).unwrap();
    let names: Vec<&str> = dto.reports.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["x", "y", "z"]);
}

#[test]
fn flatten_reads_through_and_tolerates_null() {
    let mut bob = employee("bob", None);
    let row: EmployeeRow = projector().project_as(&bob).unwrap();
    assert_eq!(row.label, "bob");
    assert_eq!(row.city, None);

    bob.address = Some(Box::new(Address {
        city:   "Oslo".into(),
        street: "Main".into()
    }));
    let row: EmployeeRow = projector().project_as(&bob).unwrap();
    assert_eq!(row.city.as_deref(), Some("Oslo"));
}

#[test]
fn preserved_cycle_keeps_shape() {
    let node = |name: &str| {
        ObjectRef::new(
            Object::new("Node")
                .with("name", name)
                .with("next", Value::Null)
                .with("children", Value::List(Vec::new()))
        )
    };
    let a = node("a");
    let b = node("b");
    a.set("next", b.clone());
    b.set("next", a.clone());
    a.set("children", Value::List(vec![Value::Object(b.clone())]));

    let out = projector().project(&Value::Object(a), "NodeDto").unwrap();
    let root = out.as_object().unwrap().clone();
    let b_out = root.get("next").and_then(|v| v.as_object().cloned()).unwrap();
    let back = b_out.get("next").and_then(|v| v.as_object().cloned()).unwrap();
    assert!(back.ptr_eq(&root));

    let child = root.get("children").unwrap();
    let child = child.as_list().unwrap()[0].as_object().unwrap().clone();
    assert!(child.ptr_eq(&b_out));

    assert!(matches!(out.ensure_acyclic(), Err(ProjectionError::CyclicValue { .. })));
}

#[test]
fn update_from_reports_only_changed_fields() {
    let mut account = Account {
        id:           7,
        email:        "old@x.com".into(),
        display_name: "Ann".into()
    };
    let form = AccountForm {
        email:        "a@x.com".into(),
        display_name: "Ann".into()
    };

    let changes = projector().update_from(&mut account, &form).unwrap();
    assert_eq!(changes.len(), 1);
    assert!(changes.contains("email"));
    assert!(!changes.contains("display_name"));
    assert_eq!(account.email, "a@x.com");
    assert_eq!(account.id, 7);

    let again = projector().update_from(&mut account, &form).unwrap();
    assert!(again.is_empty());
}

#[test]
fn unknown_source_field_fails_build() {
    #[derive(Facet, Debug)]
    #[facet(source = "User")]
    pub struct Nickname {
        pub nickname: String
    }

    let err = Projector::builder().facet::<Nickname>().build().unwrap_err();
    assert!(matches!(err, ProjectionError::UnknownField { ref field, .. } if field == "nickname"));
    assert!(err.is_configuration());
}

#[test]
fn unbounded_self_reference_fails_build() {
    #[derive(Facet, Debug)]
    #[facet(source = "Node")]
    pub struct Chain {
        pub name: String,
        #[facet(nested)]
        pub next: Option<Box<Chain>>
    }

    let err = Projector::builder().facet::<Chain>().build().unwrap_err();
    assert!(matches!(err, ProjectionError::UnboundedCycle { .. }));
}

#[test]
fn selection_lists_declared_fields() {
    let selection = projector().selection("EmployeeDto").unwrap();
    assert_eq!(selection.source(), "Employee");
    assert!(selection.contains("name"));
    assert!(selection.contains("manager"));
    assert!(!selection.contains("salary"));
}

struct Avatar {
    calls: AtomicUsize
}

#[derive(Facet, Debug)]
#[facet(source = "User")]
pub struct UserCard {
    pub email:  String,
    #[facet(skip)]
    pub avatar: String
}

#[async_trait]
impl FacetHook<User, UserCard> for Avatar {
    type Error = std::io::Error;

    async fn map(&self, source: &User, mut target: UserCard) -> Result<UserCard, Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if source.email.is_empty() {
            return Err(std::io::Error::other("no email"));
        }
        target.avatar = format!("avatar:{}", source.id);
        Ok(target)
    }
}

fn user(email: &str) -> User {
    User {
        id:            Uuid::nil(),
        email:         email.into(),
        password_hash: String::new()
    }
}

#[tokio::test]
async fn typed_hook_runs_once() {
    let projector = Projector::builder().facet::<UserCard>().build().unwrap();
    let hook = Avatar {
        calls: AtomicUsize::new(0)
    };

    let card = projector
        .project_as_async::<UserCard, _>(&user("ann@x.com"), &hook)
        .await
        .unwrap();
    assert_eq!(card.email, "ann@x.com");
    assert_eq!(card.avatar, format!("avatar:{}", Uuid::nil()));
    assert_eq!(hook.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn typed_hook_failure_surfaces_unchanged() {
    let projector = Projector::builder().facet::<UserCard>().build().unwrap();
    let hook = Avatar {
        calls: AtomicUsize::new(0)
    };

    let err = projector
        .project_as_async::<UserCard, _>(&user(""), &hook)
        .await
        .unwrap_err();
    assert!(err.is_hook());
    match err {
        HookError::Hook(e) => assert_eq!(e.to_string(), "no email"),
        HookError::Projection(e) => panic!("unexpected projection error: {e}")
    }
}
