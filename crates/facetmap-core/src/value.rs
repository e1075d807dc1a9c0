// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Dynamic value model used by the projector.
//!
//! Sources and targets are both represented as [`Value`] trees whose object
//! nodes are shared [`ObjectRef`] handles. Because handles are shared, a value
//! graph may contain cycles (a manager whose reports list contains the
//! manager again), which is exactly what the projector has to survive.
//!
//! # Identity
//!
//! ```text
//! ObjectRef ──► Arc<RwLock<Object>>
//!                 │
//!                 └── allocation address == ObjectId
//! ```
//!
//! Two handles are the *same object* when they point at the same allocation
//! ([`ObjectRef::ptr_eq`]). Structural equality ([`PartialEq`] on [`Value`])
//! is a separate question and is answered without looping on cycles.

use std::{collections::HashSet, fmt, sync::Arc};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::error::ProjectionError;

/// A dynamically typed value.
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,

    /// Boolean.
    Bool(bool),

    /// Signed integer.
    Int(i64),

    /// Unsigned integer above `i64::MAX`.
    ///
    /// Smaller unsigned values convert to [`Value::Int`]; the two variants
    /// compare equal when they hold the same number.
    UInt(u64),

    /// Floating point number.
    Float(f64),

    /// UTF-8 text.
    Text(String),

    /// UUID.
    Uuid(Uuid),

    /// UTC timestamp.
    Timestamp(DateTime<Utc>),

    /// Ordered collection.
    List(Vec<Value>),

    /// Shared object node.
    Object(ObjectRef)
}

impl Value {
    /// Check if this value is [`Value::Null`].
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, used in error messages.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::UInt(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Uuid(_) => "uuid",
            Self::Timestamp(_) => "timestamp",
            Self::List(_) => "list",
            Self::Object(_) => "object"
        }
    }

    /// Borrow the object handle, if this is an object.
    pub const fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None
        }
    }

    /// Borrow the list items, if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None
        }
    }

    /// Borrow the text, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None
        }
    }

    /// Read a field of an object value.
    ///
    /// Returns `None` for non-objects and missing fields.
    pub fn get(&self, field: &str) -> Option<Value> {
        self.as_object().and_then(|obj| obj.get(field))
    }

    /// Render an acyclic value as JSON.
    ///
    /// Objects become JSON objects in field order; the type name is not
    /// emitted. Non-finite floats become `null`.
    ///
    /// # Errors
    ///
    /// [`ProjectionError::CyclicValue`] if an object is reachable from itself.
    pub fn to_json(&self) -> Result<serde_json::Value, ProjectionError> {
        let mut path = Vec::new();
        to_json_inner(self, &mut path)
    }

    /// Check that no object is reachable from itself.
    ///
    /// Shared references (the same object reached twice along different
    /// paths) are fine.
    ///
    /// # Errors
    ///
    /// [`ProjectionError::CyclicValue`] naming the first object found on a
    /// cycle.
    pub fn ensure_acyclic(&self) -> Result<(), ProjectionError> {
        let mut path = Vec::new();
        let mut done = HashSet::new();
        ensure_acyclic_inner(self, &mut path, &mut done)
    }
}

fn ensure_acyclic_inner(
    value: &Value,
    path: &mut Vec<ObjectId>,
    done: &mut HashSet<ObjectId>
) -> Result<(), ProjectionError> {
    match value {
        Value::List(items) => items
            .iter()
            .try_for_each(|item| ensure_acyclic_inner(item, path, done)),
        Value::Object(obj) => {
            let id = obj.id();
            if done.contains(&id) {
                return Ok(());
            }
            if path.contains(&id) {
                return Err(ProjectionError::CyclicValue {
                    type_name: obj.type_name()
                });
            }
            path.push(id);
            let fields: Vec<Value> = obj.read().iter().map(|(_, v)| v.clone()).collect();
            for field in &fields {
                ensure_acyclic_inner(field, path, done)?;
            }
            path.pop();
            done.insert(id);
            Ok(())
        }
        _ => Ok(())
    }
}

fn to_json_inner(
    value: &Value,
    path: &mut Vec<ObjectId>
) -> Result<serde_json::Value, ProjectionError> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::from(*i),
        Value::UInt(u) => serde_json::Value::from(*u),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Uuid(u) => serde_json::Value::String(u.to_string()),
        Value::Timestamp(t) => serde_json::Value::String(t.to_rfc3339()),
        Value::List(items) => serde_json::Value::Array(
            items
                .iter()
                .map(|item| to_json_inner(item, path))
                .collect::<Result<_, _>>()?
        ),
        Value::Object(obj) => {
            let id = obj.id();
            if path.contains(&id) {
                return Err(ProjectionError::CyclicValue {
                    type_name: obj.type_name()
                });
            }
            path.push(id);
            let entries: Vec<(String, Value)> = obj
                .read()
                .iter()
                .map(|(k, v)| (k.to_owned(), v.clone()))
                .collect();
            let mut map = serde_json::Map::with_capacity(entries.len());
            for (key, field) in &entries {
                map.insert(key.clone(), to_json_inner(field, path)?);
            }
            path.pop();
            serde_json::Value::Object(map)
        }
    })
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let mut assumed = HashSet::new();
        deep_eq(self, other, &mut assumed)
    }
}

/// Structural equality that treats a pair of objects already under
/// comparison as equal, so cyclic graphs compare in finite time.
fn deep_eq(a: &Value, b: &Value, assumed: &mut HashSet<(ObjectId, ObjectId)>) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::UInt(x), Value::UInt(y)) => x == y,
        (Value::Int(i), Value::UInt(u)) | (Value::UInt(u), Value::Int(i)) => {
            u64::try_from(*i).is_ok_and(|i| i == *u)
        }
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Text(x), Value::Text(y)) => x == y,
        (Value::Uuid(x), Value::Uuid(y)) => x == y,
        (Value::Timestamp(x), Value::Timestamp(y)) => x == y,
        (Value::List(xs), Value::List(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_eq(x, y, assumed))
        }
        (Value::Object(x), Value::Object(y)) => {
            if x.ptr_eq(y) || !assumed.insert((x.id(), y.id())) {
                return true;
            }
            let left: Vec<(String, Value)> = x
                .read()
                .iter()
                .map(|(k, v)| (k.to_owned(), v.clone()))
                .collect();
            let right = y.read().clone();
            left.len() == right.len()
                && x.type_name() == right.type_name()
                && left.iter().all(|(k, v)| {
                    right
                        .get(k)
                        .is_some_and(|other| deep_eq(v, other, assumed))
                })
        }
        _ => false
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Int(i) => write!(f, "Int({i})"),
            Self::UInt(u) => write!(f, "UInt({u})"),
            Self::Float(x) => write!(f, "Float({x})"),
            Self::Text(s) => write!(f, "Text({s:?})"),
            Self::Uuid(u) => write!(f, "Uuid({u})"),
            Self::Timestamp(t) => write!(f, "Timestamp({t})"),
            Self::List(items) => f.debug_list().entries(items).finish(),
            Self::Object(obj) => fmt::Debug::fmt(obj, f)
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

macro_rules! impl_from_small_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_small_int!(i8, i16, i32, u8, u16, u32);

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Self::UInt(value), Self::Int)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Self::Object(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Self::Object(ObjectRef::new(value))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A typed record: type name plus ordered fields.
#[derive(Debug, Clone, Default)]
pub struct Object {
    type_name: String,
    fields:    IndexMap<String, Value>
}

impl Object {
    /// Create an empty object of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields:    IndexMap::new()
        }
    }

    /// Builder-style field insertion.
    ///
    /// ```rust
    /// use facetmap_core::{Object, Value};
    ///
    /// let user = Object::new("User")
    ///     .with("name", "Ann")
    ///     .with("age", 31);
    /// assert_eq!(user.get("name"), Some(&Value::from("Ann")));
    /// ```
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Type name (empty for anonymous objects).
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Borrow a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Set a field, returning the previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Check whether a field is present.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the object has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn replace_fields(&mut self, fields: IndexMap<String, Value>) {
        self.fields = fields;
    }
}

/// Identity of an object: the address of its shared allocation.
///
/// Only meaningful while some [`ObjectRef`] to the object is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

/// Shared, interior-mutable handle to an [`Object`].
///
/// Cloning the handle clones the pointer, not the object.
#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<Object>>);

impl ObjectRef {
    /// Allocate a new shared object.
    pub fn new(object: Object) -> Self {
        Self(Arc::new(RwLock::new(object)))
    }

    /// Identity of the underlying allocation.
    pub fn id(&self) -> ObjectId {
        ObjectId(Arc::as_ptr(&self.0) as *const () as usize)
    }

    /// Check whether both handles point to the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Acquire a read guard.
    pub fn read(&self) -> RwLockReadGuard<'_, Object> {
        self.0.read()
    }

    /// Acquire a write guard.
    pub fn write(&self) -> RwLockWriteGuard<'_, Object> {
        self.0.write()
    }

    /// Owned copy of the type name.
    pub fn type_name(&self) -> String {
        self.read().type_name.clone()
    }

    /// Clone a field value out of the object.
    pub fn get(&self, field: &str) -> Option<Value> {
        self.read().get(field).cloned()
    }

    /// Set a field, returning the previous value.
    pub fn set(&self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.write().set(field, value)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.read();
        let mut s = f.debug_struct(&format!("{}{}", guard.type_name, self.id()));
        for (name, value) in guard.iter() {
            s.field(name, &Shallow(value));
        }
        s.finish()
    }
}

/// Debug adapter that prints nested objects as their ids.
struct Shallow<'a>(&'a Value);

impl fmt::Debug for Shallow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Object(obj) => write!(f, "{}", obj.id()),
            Value::List(items) => f.debug_list().entries(items.iter().map(Shallow)).finish(),
            other => fmt::Debug::fmt(other, f)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str) -> ObjectRef {
        ObjectRef::new(Object::new("Person").with("name", name))
    }

    #[test]
    fn object_builder_keeps_order() {
        let obj = Object::new("User")
            .with("id", 1)
            .with("name", "Ann")
            .with("email", "a@x.com");
        let names: Vec<&str> = obj.field_names().collect();
        assert_eq!(names, vec!["id", "name", "email"]);
        assert_eq!(obj.len(), 3);
        assert!(!obj.is_empty());
    }

    #[test]
    fn identity_differs_from_equality() {
        let a = person("Ann");
        let b = person("Ann");
        assert!(!a.ptr_eq(&b));
        assert_ne!(a.id(), b.id());
        assert_eq!(Value::Object(a.clone()), Value::Object(b));
        assert!(a.ptr_eq(&a.clone()));
    }

    #[test]
    fn equality_on_cyclic_graphs_terminates() {
        let a = person("Ann");
        a.set("manager", a.clone());
        let b = person("Ann");
        b.set("manager", b.clone());
        assert_eq!(Value::Object(a), Value::Object(b));
    }

    #[test]
    fn equality_detects_field_difference() {
        let a = Object::new("User").with("name", "Ann");
        let b = Object::new("User").with("name", "Bob");
        assert_ne!(Value::from(a), Value::from(b));
    }

    #[test]
    fn equality_checks_type_name() {
        let a = Object::new("User").with("name", "Ann");
        let b = Object::new("Admin").with("name", "Ann");
        assert_ne!(Value::from(a), Value::from(b));
    }

    #[test]
    fn to_json_renders_nested_values() {
        let address = Object::new("Address").with("city", "Oslo");
        let user = Value::from(
            Object::new("User")
                .with("name", "Ann")
                .with("tags", vec!["a", "b"])
                .with("address", address)
                .with("nickname", Value::Null)
        );
        let json = user.to_json().unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Ann",
                "tags": ["a", "b"],
                "address": { "city": "Oslo" },
                "nickname": null
            })
        );
    }

    #[test]
    fn to_json_rejects_cycles() {
        let a = person("Ann");
        a.set("self", a.clone());
        let err = Value::Object(a).to_json().unwrap_err();
        assert!(matches!(err, ProjectionError::CyclicValue { .. }));
    }

    #[test]
    fn to_json_allows_shared_acyclic_references() {
        let shared = person("Ann");
        let root = Object::new("Pair")
            .with("left", shared.clone())
            .with("right", shared);
        assert!(Value::from(root).to_json().is_ok());
    }

    #[test]
    fn ensure_acyclic_distinguishes_sharing_from_cycles() {
        let shared = person("Ann");
        let pair = Value::from(
            Object::new("Pair")
                .with("left", shared.clone())
                .with("right", vec![Value::Object(shared)])
        );
        assert!(pair.ensure_acyclic().is_ok());

        let a = person("Ann");
        let b = person("Bob");
        a.set("friends", vec![Value::Object(b.clone())]);
        b.set("friends", vec![Value::Object(a.clone())]);
        let err = Value::Object(a).ensure_acyclic().unwrap_err();
        assert!(matches!(err, ProjectionError::CyclicValue { .. }));
    }

    #[test]
    fn debug_output_is_shallow() {
        let a = person("Ann");
        a.set("self", a.clone());
        let rendered = format!("{:?}", Value::Object(a));
        assert!(rendered.contains("Person#"));
        assert!(rendered.contains("Ann"));
    }

    #[test]
    fn option_and_vec_conversions() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(3_i64)), Value::Int(3));
        assert_eq!(
            Value::from(vec![1_i64, 2]),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn large_unsigned_values_keep_their_magnitude() {
        assert_eq!(Value::from(7_u64), Value::Int(7));
        assert_eq!(Value::from(u64::MAX), Value::UInt(u64::MAX));
        assert_eq!(Value::UInt(7), Value::Int(7));
        assert_ne!(Value::UInt(u64::MAX), Value::Int(i64::MAX));
        assert_ne!(Value::Int(-1), Value::UInt(u64::MAX));
        assert_eq!(
            Value::from(u64::MAX).to_json().unwrap(),
            serde_json::Value::from(u64::MAX)
        );
    }

    #[test]
    fn kind_names() {
        assert_eq!(Value::Null.kind_name(), "null");
        assert_eq!(Value::from("x").kind_name(), "text");
        assert_eq!(Value::List(vec![]).kind_name(), "list");
    }
}
