// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Type metadata and Rust <-> [`Value`] conversion traits.
//!
//! Spec resolution validates field names and nested-spec types against
//! [`TypeDescriptor`]s held in a [`TypeRegistry`]. Descriptors are either
//! written by hand (for purely dynamic data) or produced by
//! `#[derive(Reflect)]` for Rust structs.
//!
//! # Field kinds
//!
//! | Rust type | [`FieldKind`] |
//! |-----------|---------------|
//! | `String`, integers, floats, `bool`, `Uuid`, `DateTime<Utc>` | `Scalar` |
//! | `#[derive(Reflect)] struct Address` | `Reference("Address")` |
//! | `Vec<T>` | `Collection(kind of T)` |
//! | `Option<T>`, `Box<T>` | kind of `T` |

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::{ProjectionError, ProjectionResult},
    value::{Object, ObjectRef, Value}
};

/// Shape of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Plain value copied as-is.
    Scalar,

    /// Reference to an object of the named type.
    Reference(String),

    /// Ordered collection of elements of the inner kind.
    Collection(Box<FieldKind>)
}

impl FieldKind {
    /// Reference to `type_name`.
    pub fn reference(type_name: impl Into<String>) -> Self {
        Self::Reference(type_name.into())
    }

    /// Collection of `element`.
    pub fn collection(element: Self) -> Self {
        Self::Collection(Box::new(element))
    }

    /// Type name of the object this field ultimately points to, looking
    /// through collections.
    pub fn target_type(&self) -> Option<&str> {
        match self {
            Self::Scalar => None,
            Self::Reference(name) => Some(name),
            Self::Collection(inner) => inner.target_type()
        }
    }

    /// Check if the field can lead to another object.
    pub fn is_reference_like(&self) -> bool {
        self.target_type().is_some()
    }

    /// Check if this is a collection.
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }

    /// Human-readable description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Scalar => "scalar".to_owned(),
            Self::Reference(name) => format!("reference to `{name}`"),
            Self::Collection(inner) => format!("collection of {}", inner.describe())
        }
    }
}

/// Metadata for one field of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name as it appears in [`Object`]s.
    pub name: String,

    /// Field shape.
    pub kind: FieldKind,

    /// Whether the field may be null.
    pub optional: bool
}

impl FieldDescriptor {
    /// Create a required field descriptor.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            optional: false
        }
    }

    /// Mark the field as optional.
    #[must_use]
    pub const fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }
}

/// Metadata for a source or target type.
///
/// ```rust
/// use facetmap_core::{FieldKind, TypeDescriptor};
///
/// let customer = TypeDescriptor::new("Customer")
///     .scalar("id")
///     .scalar("name")
///     .field("orders", FieldKind::collection(FieldKind::reference("Order")));
/// assert_eq!(customer.field_names().count(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Type name.
    pub name: String,

    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>
}

impl TypeDescriptor {
    /// Create a descriptor without fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name:   name.into(),
            fields: Vec::new()
        }
    }

    /// Append a field descriptor.
    #[must_use]
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Append a required field of the given kind.
    #[must_use]
    pub fn field(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.with_field(FieldDescriptor::new(name, kind))
    }

    /// Append a required scalar field.
    #[must_use]
    pub fn scalar(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Scalar)
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// Registry of type descriptors keyed by name.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor.
    ///
    /// Returns `false` and keeps the existing entry if the name is already
    /// registered. Recursive registration relies on this to terminate on
    /// self-referencing types.
    pub fn insert(&mut self, descriptor: TypeDescriptor) -> bool {
        if self.types.contains_key(&descriptor.name) {
            return false;
        }
        self.types.insert(descriptor.name.clone(), descriptor);
        true
    }

    /// Register a reflected type and everything it references.
    pub fn register<T: Reflect>(&mut self) {
        T::register_types(self);
    }

    /// Look up a descriptor.
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    /// Check whether a type is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered descriptors, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }
}

/// Rust types that can appear as fields of a reflected struct.
///
/// Implemented here for scalars and the standard wrappers, and by
/// `#[derive(Reflect)]` / `#[derive(Facet)]` for user structs.
pub trait FieldType: Sized {
    /// Field shape for descriptors.
    fn field_kind() -> FieldKind;

    /// Whether the field may be null.
    fn is_optional() -> bool {
        false
    }

    /// Register any reflected types this field type refers to.
    fn register_types(registry: &mut TypeRegistry) {
        let _ = registry;
    }

    /// Convert to a [`Value`].
    fn to_value(&self) -> Value;

    /// Convert from a [`Value`].
    ///
    /// # Errors
    ///
    /// [`ProjectionError::Decode`] when the value has the wrong shape.
    fn from_value(value: &Value) -> ProjectionResult<Self>;
}

/// Structs with a name, a descriptor and object conversions.
///
/// Generated by `#[derive(Reflect)]`:
///
/// ```rust,ignore
/// #[derive(Reflect)]
/// pub struct Address {
///     pub street: String,
///     pub city: String
/// }
///
/// let obj = Address { street: "Main".into(), city: "Oslo".into() }.to_object();
/// assert_eq!(obj.type_name(), "Address");
/// ```
pub trait Reflect: Sized {
    /// Type name used in descriptors, objects and specs.
    const TYPE_NAME: &'static str;

    /// Descriptor of this type.
    fn descriptor() -> TypeDescriptor;

    /// Register this type and every reflected type reachable from its fields.
    fn register_types(registry: &mut TypeRegistry);

    /// Convert into a freshly allocated object.
    fn to_object(&self) -> ObjectRef;

    /// Rebuild from an object.
    ///
    /// # Errors
    ///
    /// [`ProjectionError::Decode`] when a field is missing or mistyped.
    fn from_object(object: &Object) -> ProjectionResult<Self>;

    /// Convert into a [`Value::Object`].
    fn to_value(&self) -> Value {
        Value::Object(self.to_object())
    }

    /// Rebuild from a value that must be an object.
    ///
    /// # Errors
    ///
    /// [`ProjectionError::Decode`] for non-objects and bad fields.
    fn from_value(value: &Value) -> ProjectionResult<Self> {
        match value {
            Value::Object(obj) => Self::from_object(&obj.read()),
            other => Err(ProjectionError::decode(
                Self::TYPE_NAME,
                format!("expected object, found {}", other.kind_name())
            ))
        }
    }
}

/// Read a required field out of an object for generated `from_object` code.
///
/// A missing field decodes as [`Value::Null`], so `Option` fields tolerate
/// absence while required fields report a decode error.
#[doc(hidden)]
pub fn decode_field<T: FieldType>(
    object: &Object,
    type_name: &str,
    field: &str
) -> ProjectionResult<T> {
    let value = object.get(field).unwrap_or(&Value::Null);
    T::from_value(value).map_err(|e| e.in_field(type_name, field))
}

fn mismatch(expected: &str, found: &Value) -> ProjectionError {
    ProjectionError::decode(
        expected,
        format!("expected {expected}, found {}", found.kind_name())
    )
}

impl FieldType for bool {
    fn field_kind() -> FieldKind {
        FieldKind::Scalar
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> ProjectionResult<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(mismatch("bool", other))
        }
    }
}

macro_rules! impl_int_field {
    ($($ty:ty),*) => {
        $(
            impl FieldType for $ty {
                fn field_kind() -> FieldKind {
                    FieldKind::Scalar
                }

                fn to_value(&self) -> Value {
                    Value::from(*self)
                }

                fn from_value(value: &Value) -> ProjectionResult<Self> {
                    let out_of_range = |n: &dyn std::fmt::Display| {
                        ProjectionError::decode(stringify!($ty), format!("{n} is out of range"))
                    };
                    match value {
                        Value::Int(i) => <$ty>::try_from(*i).map_err(|_| out_of_range(i)),
                        Value::UInt(u) => <$ty>::try_from(*u).map_err(|_| out_of_range(u)),
                        other => Err(mismatch(stringify!($ty), other))
                    }
                }
            }
        )*
    };
}

impl_int_field!(i8, i16, i32, i64, u8, u16, u32, u64);

impl FieldType for f64 {
    fn field_kind() -> FieldKind {
        FieldKind::Scalar
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: &Value) -> ProjectionResult<Self> {
        match value {
            Value::Float(f) => Ok(*f),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(i) => Ok(*i as f64),
            #[allow(clippy::cast_precision_loss)]
            Value::UInt(u) => Ok(*u as f64),
            other => Err(mismatch("f64", other))
        }
    }
}

impl FieldType for f32 {
    fn field_kind() -> FieldKind {
        FieldKind::Scalar
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn from_value(value: &Value) -> ProjectionResult<Self> {
        match value {
            Value::Float(f) => Ok(*f as f32),
            Value::Int(i) => Ok(*i as f32),
            Value::UInt(u) => Ok(*u as f32),
            other => Err(mismatch("f32", other))
        }
    }
}

impl FieldType for String {
    fn field_kind() -> FieldKind {
        FieldKind::Scalar
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: &Value) -> ProjectionResult<Self> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            other => Err(mismatch("String", other))
        }
    }
}

impl FieldType for Uuid {
    fn field_kind() -> FieldKind {
        FieldKind::Scalar
    }

    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }

    fn from_value(value: &Value) -> ProjectionResult<Self> {
        match value {
            Value::Uuid(u) => Ok(*u),
            Value::Text(s) => {
                Uuid::parse_str(s).map_err(|e| ProjectionError::decode("Uuid", e.to_string()))
            }
            other => Err(mismatch("Uuid", other))
        }
    }
}

impl FieldType for DateTime<Utc> {
    fn field_kind() -> FieldKind {
        FieldKind::Scalar
    }

    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }

    fn from_value(value: &Value) -> ProjectionResult<Self> {
        match value {
            Value::Timestamp(t) => Ok(*t),
            Value::Text(s) => DateTime::parse_from_rfc3339(s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| ProjectionError::decode("DateTime<Utc>", e.to_string())),
            other => Err(mismatch("DateTime<Utc>", other))
        }
    }
}

impl<T: FieldType> FieldType for Option<T> {
    fn field_kind() -> FieldKind {
        T::field_kind()
    }

    fn is_optional() -> bool {
        true
    }

    fn register_types(registry: &mut TypeRegistry) {
        T::register_types(registry);
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, FieldType::to_value)
    }

    fn from_value(value: &Value) -> ProjectionResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some)
        }
    }
}

impl<T: FieldType> FieldType for Vec<T> {
    fn field_kind() -> FieldKind {
        FieldKind::collection(T::field_kind())
    }

    fn register_types(registry: &mut TypeRegistry) {
        T::register_types(registry);
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldType::to_value).collect())
    }

    fn from_value(value: &Value) -> ProjectionResult<Self> {
        match value {
            Value::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    T::from_value(item).map_err(|e| e.in_field("Vec", &format!("[{i}]")))
                })
                .collect(),
            other => Err(mismatch("list", other))
        }
    }
}

impl<T: FieldType> FieldType for Box<T> {
    fn field_kind() -> FieldKind {
        T::field_kind()
    }

    fn is_optional() -> bool {
        T::is_optional()
    }

    fn register_types(registry: &mut TypeRegistry) {
        T::register_types(registry);
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn from_value(value: &Value) -> ProjectionResult<Self> {
        T::from_value(value).map(Box::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_kind_target_type_looks_through_collections() {
        let kind = FieldKind::collection(FieldKind::collection(FieldKind::reference("Order")));
        assert_eq!(kind.target_type(), Some("Order"));
        assert!(kind.is_reference_like());
        assert!(kind.is_collection());
        assert_eq!(FieldKind::Scalar.target_type(), None);
        assert!(!FieldKind::collection(FieldKind::Scalar).is_reference_like());
    }

    #[test]
    fn field_kind_describe() {
        let kind = FieldKind::collection(FieldKind::reference("Address"));
        assert_eq!(kind.describe(), "collection of reference to `Address`");
    }

    #[test]
    fn u64_round_trips_above_i64_max() {
        for n in [0, 42, i64::MAX as u64, i64::MAX as u64 + 1, u64::MAX] {
            assert_eq!(u64::from_value(&n.to_value()).unwrap(), n);
        }
        let err = i64::from_value(&u64::MAX.to_value()).unwrap_err();
        assert!(matches!(err, ProjectionError::Decode { .. }));
        assert!(u64::from_value(&Value::Int(-1)).is_err());
    }

    #[test]
    fn wrapper_kinds() {
        assert_eq!(<Option<String>>::field_kind(), FieldKind::Scalar);
        assert!(<Option<String>>::is_optional());
        assert!(!<String>::is_optional());
        assert_eq!(
            <Vec<i64>>::field_kind(),
            FieldKind::collection(FieldKind::Scalar)
        );
        assert_eq!(<Box<bool>>::field_kind(), FieldKind::Scalar);
    }

    #[test]
    fn registry_insert_is_first_wins() {
        let mut registry = TypeRegistry::new();
        assert!(registry.insert(TypeDescriptor::new("User").scalar("id")));
        assert!(!registry.insert(TypeDescriptor::new("User")));
        assert_eq!(registry.get("User").map(|d| d.fields.len()), Some(1));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("User"));
    }

    #[test]
    fn descriptor_lookup() {
        let desc = TypeDescriptor::new("User")
            .scalar("id")
            .with_field(FieldDescriptor::new("nickname", FieldKind::Scalar).optional(true));
        assert!(desc.get("nickname").is_some_and(|f| f.optional));
        assert!(desc.get("missing").is_none());
    }

    #[test]
    fn scalar_conversions() {
        assert_eq!(42_i32.to_value(), Value::Int(42));
        assert_eq!(i32::from_value(&Value::Int(42)).unwrap(), 42);
        assert!(u8::from_value(&Value::Int(300)).is_err());
        assert!(String::from_value(&Value::Int(1)).is_err());
        assert_eq!(f64::from_value(&Value::Int(2)).unwrap(), 2.0);
        assert!(bool::from_value(&Value::Bool(true)).unwrap());
    }

    #[test]
    fn uuid_parses_from_text() {
        let id = Uuid::nil();
        assert_eq!(Uuid::from_value(&Value::Text(id.to_string())).unwrap(), id);
        assert!(Uuid::from_value(&Value::Text("nope".into())).is_err());
    }

    #[test]
    fn option_and_vec_conversions() {
        let none: Option<String> = None;
        assert_eq!(none.to_value(), Value::Null);
        assert_eq!(<Option<String>>::from_value(&Value::Null).unwrap(), None);

        let items = vec![1_i64, 2, 3];
        let value = items.to_value();
        assert_eq!(<Vec<i64>>::from_value(&value).unwrap(), items);
    }

    #[test]
    fn vec_decode_error_names_index() {
        let value = Value::List(vec![Value::Int(1), Value::Text("x".into())]);
        let err = <Vec<i64>>::from_value(&value).unwrap_err();
        assert!(err.to_string().contains("[1]"));
    }

    #[test]
    fn decode_field_reports_field_name() {
        let obj = Object::new("User").with("age", "old");
        let err = decode_field::<i64>(&obj, "User", "age").unwrap_err();
        assert!(err.to_string().contains("field `age`"));

        let missing: Option<String> = decode_field(&obj, "User", "nickname").unwrap();
        assert_eq!(missing, None);
    }
}
