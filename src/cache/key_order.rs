//! Key Order Module
//!
//! Tracks insertion order for oldest-first capacity eviction.

use std::collections::VecDeque;

// == Key Order ==
/// Keys in insertion order.
///
/// - Front = oldest insertion
/// - Back = newest insertion
///
/// Updating an existing key does not move it.
#[derive(Debug, Default)]
pub struct KeyOrder {
    order: VecDeque<String>,
}

impl KeyOrder {
    // == Constructor ==
    /// Creates a new empty key order.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Push ==
    /// Appends a newly inserted key.
    pub fn push(&mut self, key: String) {
        self.order.push_back(key);
    }

    // == Remove ==
    /// Removes the first occurrence of a key. Returns true if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.order.iter().position(|k| k == key) {
            Some(index) => {
                self.order.remove(index);
                true
            }
            None => false,
        }
    }

    // == Oldest ==
    /// Returns the oldest key without removing it.
    pub fn oldest(&self) -> Option<&String> {
        self.order.front()
    }

    /// Iterates keys from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }

    /// Drops every key.
    pub fn clear(&mut self) {
        self.order.clear();
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn order_of(keys: &[&str]) -> KeyOrder {
        let mut order = KeyOrder::new();
        for key in keys {
            order.push(key.to_string());
        }
        order
    }

    #[test]
    fn test_order_new() {
        let order = KeyOrder::new();
        assert!(order.is_empty());
        assert_eq!(order.len(), 0);
        assert_eq!(order.oldest(), None);
    }

    #[test]
    fn test_oldest_is_first_pushed() {
        let order = order_of(&["key1", "key2", "key3"]);

        assert_eq!(order.len(), 3);
        assert_eq!(order.oldest(), Some(&"key1".to_string()));
    }

    #[test]
    fn test_remove() {
        let mut order = order_of(&["key1", "key2", "key3"]);

        assert!(order.remove("key2"));

        assert_eq!(order.len(), 2);
        assert!(!order.contains("key2"));
        assert!(order.contains("key1"));
        assert!(order.contains("key3"));
    }

    #[test]
    fn test_remove_oldest_advances_front() {
        let mut order = order_of(&["a", "b", "c"]);

        assert!(order.remove("a"));
        assert_eq!(order.oldest(), Some(&"b".to_string()));
    }

    #[test]
    fn test_remove_nonexistent_key() {
        let mut order = order_of(&["key1", "key2"]);

        assert!(!order.remove("nonexistent"));
        assert_eq!(order.len(), 2);
    }

    #[test]
    fn test_iter_oldest_to_newest() {
        let order = order_of(&["a", "b", "c"]);
        let keys: Vec<&str> = order.iter().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_clear() {
        let mut order = order_of(&["a", "b"]);
        order.clear();
        assert!(order.is_empty());
    }
}
