//! Value Module
//!
//! Dynamic value model for cached payloads. Containers are shared by
//! reference: cloning a [`Value`] hands out another reference to the same
//! array or object, while [`DeepClone`] produces an independent copy.

mod deep_clone;

use std::any::Any;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

pub use deep_clone::DeepClone;

// == Shared Container ==
/// Reference-counted, interior-mutable container used for arrays and objects.
pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    /// Wraps a value in a new shared container.
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Locks the container for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the container for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns true if both handles point at the same container.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.read().fmt(f)
    }
}

// == Extension Traits ==
/// A UI-node-like object that knows how to copy itself.
pub trait NodeLike: Send + Sync + fmt::Debug {
    /// Copies this node; `deep` includes all descendants.
    fn clone_node(&self, deep: bool) -> Arc<dyn NodeLike>;
}

/// A custom object that provides its own clone.
///
/// This is the extension point for teaching [`DeepClone`] about new types.
pub trait CloneValue: Send + Sync + fmt::Debug {
    fn clone_value(&self) -> Value;
}

// == Pattern ==
/// A regular-expression-like value: source text plus flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub source: String,
    pub flags: String,
}

impl Pattern {
    pub fn new(source: impl Into<String>, flags: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            flags: flags.into(),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

// == Value ==
/// A cached payload of any shape.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Date(DateTime<Utc>),
    Pattern(Pattern),
    Array(Shared<Vec<Value>>),
    Object(Shared<IndexMap<String, Value>>),
    Node(Arc<dyn NodeLike>),
    Custom(Arc<dyn CloneValue>),
    /// Anything else (closures, foreign handles); never deep-copied
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Builds an array value.
    pub fn array<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Array(Shared::new(items.into_iter().map(Into::into).collect()))
    }

    /// Builds an object value, keeping the field order.
    pub fn object<I, K, T>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<Value>,
    {
        Value::Object(Shared::new(
            fields
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        ))
    }

    /// Wraps an arbitrary value that is always shared by reference.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Value::Opaque(Arc::new(value))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Shared<Vec<Value>>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Shared<IndexMap<String, Value>>> {
        match self {
            Value::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Reads one field of an object value.
    pub fn field(&self, key: &str) -> Option<Value> {
        self.as_object()
            .and_then(|fields| fields.read().get(key).cloned())
    }

    /// Returns true if both values are the same reference.
    ///
    /// Primitives, dates and patterns are immutable and compare by value.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Node(a), Value::Node(b)) => same_arc(a, b),
            (Value::Custom(a), Value::Custom(b)) => same_arc(a, b),
            (Value::Opaque(a), Value::Opaque(b)) => same_arc(a, b),
            _ => self == other,
        }
    }

    /// Converts plain data into JSON. Non-data variants become `null`.
    ///
    /// Integral numbers that are exactly representable come back as JSON
    /// integers, so `1` and `1.0` both serialize as `1`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Undefined | Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                Json::from(*n as i64)
            }
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::String(s) => Json::String(s.clone()),
            Value::Date(date) => Json::String(date.to_rfc3339()),
            Value::Pattern(pattern) => Json::String(pattern.to_string()),
            Value::Array(items) => Json::Array(items.read().iter().map(Value::to_json).collect()),
            Value::Object(fields) => Json::Object(
                fields
                    .read()
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Value::Node(_) | Value::Custom(_) | Value::Opaque(_) => Json::Null,
        }
    }
}

// Largest integer an f64 holds without rounding.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

// Compares the data pointers only; vtables may differ across codegen units.
fn same_arc<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Structural equality: primitives and containers by content, trait objects by reference.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Pattern(a), Value::Pattern(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b) || *a.read() == *b.read(),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b) || *a.read() == *b.read(),
            (Value::Node(a), Value::Node(b)) => same_arc(a, b),
            (Value::Custom(a), Value::Custom(b)) => same_arc(a, b),
            (Value::Opaque(a), Value::Opaque(b)) => same_arc(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Date(date) => write!(f, "Date({})", date.to_rfc3339()),
            Value::Pattern(pattern) => write!(f, "{}", pattern),
            Value::Array(items) => items.fmt(f),
            Value::Object(fields) => fields.fmt(f),
            Value::Node(node) => node.fmt(f),
            Value::Custom(custom) => custom.fmt(f),
            Value::Opaque(_) => f.write_str("<opaque>"),
        }
    }
}

// == Conversions ==
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_number {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Number(n as f64)
            }
        })*
    };
}

impl_from_number!(i32, i64, u32, u64, usize, f32, f64);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(date: DateTime<Utc>) -> Self {
        Value::Date(date)
    }
}

impl From<Pattern> for Value {
    fn from(pattern: Pattern) -> Self {
        Value::Pattern(pattern)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Shared::new(items))
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(fields: IndexMap<String, Value>) -> Self {
        Value::Object(Shared::new(fields))
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::array(items),
            Json::Object(fields) => Value::object(fields),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clone_shares_containers() {
        let value = Value::object([("foo", "foo")]);
        let alias = value.clone();

        alias
            .as_object()
            .unwrap()
            .write()
            .insert("foo".to_string(), "bar".into());

        assert!(value.ptr_eq(&alias));
        assert_eq!(value.field("foo"), Some(Value::from("bar")));
    }

    #[test]
    fn test_structural_equality() {
        let a = Value::object([("foo", Value::array([1, 2]))]);
        let b = Value::object([("foo", Value::array([1, 2]))]);

        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
        assert_ne!(Value::Null, Value::Undefined);
        assert_ne!(Value::from(0), Value::from(false));
    }

    #[test]
    fn test_primitives_ptr_eq_by_value() {
        assert!(Value::from("bar").ptr_eq(&Value::from("bar")));
        assert!(Value::Null.ptr_eq(&Value::Null));
        assert!(!Value::from(0).ptr_eq(&Value::from(1)));
    }

    #[test]
    fn test_opaque_identity() {
        let f = Value::opaque(|| 42);
        assert!(f.ptr_eq(&f.clone()));
        assert_ne!(f, Value::opaque(|| 42));
    }

    #[test]
    fn test_json_round_trip() {
        let source = json!({"name": "foo", "tags": ["a", "b"], "n": 1.5, "none": null});
        let value = Value::from(source.clone());

        assert_eq!(value.field("name"), Some(Value::from("foo")));
        assert_eq!(value.to_json(), source);
    }

    #[test]
    fn test_json_integers_stay_integers() {
        let source = json!({"count": 1, "negative": -42, "big": 9_007_199_254_740_991i64});
        let value = Value::from(source.clone());

        assert_eq!(value.to_json(), source);
        assert_eq!(Value::from(2.0).to_json(), json!(2));
        assert_eq!(Value::from(1e300).to_json(), json!(1e300));
        assert_eq!(Value::from(f64::NAN).to_json(), json!(null));
    }

    #[test]
    fn test_object_keeps_field_order() {
        let value = Value::object([("z", 1), ("a", 2)]);
        let keys: Vec<String> = value.as_object().unwrap().read().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }
}
