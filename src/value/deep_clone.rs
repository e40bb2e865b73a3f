//! Deep Clone Module
//!
//! Recursive copies for copy-on-read and copy-on-write cache access.
//!
//! Isolation is only guaranteed for plain data (arrays, objects, primitives)
//! and the recognized built-ins. Opaque values are shared by reference.
//! There is no cycle detection: an array or object that contains itself
//! recurses until the stack is exhausted.

use std::sync::Arc;

use super::{Shared, Value};

// == Deep Clone Trait ==
/// Produces a copy that shares no mutable state with the original.
pub trait DeepClone {
    fn deep_clone(&self) -> Self;
}

impl DeepClone for Value {
    fn deep_clone(&self) -> Self {
        match self {
            Value::Node(node) => Value::Node(node.clone_node(true)),
            Value::Date(date) => Value::Date(*date),
            Value::Pattern(pattern) => Value::Pattern(pattern.clone()),
            Value::Array(items) => {
                let copy = items.read().iter().map(DeepClone::deep_clone).collect();
                Value::Array(Shared::new(copy))
            }
            Value::Object(fields) => {
                let copy = fields
                    .read()
                    .iter()
                    .map(|(key, value)| (key.clone(), value.deep_clone()))
                    .collect();
                Value::Object(Shared::new(copy))
            }
            Value::Custom(custom) => custom.clone_value(),
            // primitives are immutable, opaque values are shared
            other => other.clone(),
        }
    }
}

macro_rules! impl_deep_clone_by_value {
    ($($t:ty),*) => {
        $(impl DeepClone for $t {
            fn deep_clone(&self) -> Self {
                self.clone()
            }
        })*
    };
}

impl_deep_clone_by_value!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String
);

impl<T: DeepClone> DeepClone for Vec<T> {
    fn deep_clone(&self) -> Self {
        self.iter().map(DeepClone::deep_clone).collect()
    }
}

impl<T: DeepClone> DeepClone for Option<T> {
    fn deep_clone(&self) -> Self {
        self.as_ref().map(DeepClone::deep_clone)
    }
}

impl<T: DeepClone> DeepClone for Arc<T> {
    fn deep_clone(&self) -> Self {
        Arc::new(T::deep_clone(self))
    }
}
