//! Ordered, case-insensitive scopes
//!
//! A [`Scope`] is the single container used for the This, Variables and
//! Static roles of an instance, for annotations and documentation, and for
//! struct values and bound arguments.

use std::fmt;
use std::hash::BuildHasherDefault;

use indexmap::IndexMap;
use rustc_hash::FxHasher;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{ObjResult, ObjectError};
use crate::key::Key;
use crate::value::Value;

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Maximum number of keys listed in a `KeyNotFound` message
pub const MAX_LISTED_KEYS: usize = 50;

/// Ordered mapping from [`Key`] to [`Value`], preserving insertion order.
#[derive(Clone, Default, PartialEq)]
pub struct Scope {
    entries: FxIndexMap<Key, Value>,
}

impl Scope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scope with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Scope {
            entries: FxIndexMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check for an empty scope
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check whether `key` is bound
    pub fn contains_key(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    /// Get the value bound to `key`
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Get a mutable reference to the value bound to `key`
    pub fn get_mut(&mut self, key: &Key) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Bind `key`, returning the previous value
    pub fn put(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Bind `key` only when it is not bound yet; returns true if inserted
    pub fn put_if_absent(&mut self, key: &Key, value: &Value) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(key.clone(), value.clone());
        true
    }

    /// Remove `key`, keeping the order of the remaining entries
    pub fn remove(&mut self, key: &Key) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Copy every entry of `other` whose key is not bound here
    pub fn add_all_absent(&mut self, other: &Scope) {
        for (key, value) in other.iter() {
            self.put_if_absent(key, value);
        }
    }

    /// Copy every entry of `other`, overwriting existing bindings
    pub fn add_all(&mut self, other: &Scope) {
        for (key, value) in other.iter() {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter()
    }

    /// Iterate keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }

    /// Iterate values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    /// Value at insertion position `index`
    pub fn get_index(&self, index: usize) -> Option<(&Key, &Value)> {
        self.entries.get_index(index)
    }

    /// Comma-separated key list, truncated after [`MAX_LISTED_KEYS`]
    pub fn keys_as_string(&self) -> String {
        let mut listed: Vec<&str> = self
            .entries
            .keys()
            .take(MAX_LISTED_KEYS)
            .map(|k| k.name())
            .collect();
        if self.entries.len() > MAX_LISTED_KEYS {
            listed.push("...");
        }
        listed.join(", ")
    }

    /// Look up `key`, failing with `KeyNotFound` unless `safe`
    pub fn dereference(&self, key: &Key, safe: bool) -> ObjResult<Value> {
        match self.entries.get(key) {
            Some(value) => Ok(value.clone()),
            None if safe => Ok(Value::Null),
            None => Err(ObjectError::KeyNotFound {
                key: key.name().to_string(),
                valid_keys: self.keys_as_string(),
            }),
        }
    }

    /// Annotation-style boolean read: `true`/`false`, `"yes"`/`"no"`, numbers,
    /// and a bare (empty string) annotation counting as true.
    pub fn get_flag(&self, key: &Key) -> Option<bool> {
        match self.entries.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => Some(*n != 0.0),
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() || s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes") {
                    Some(true)
                } else if s.eq_ignore_ascii_case("false") || s.eq_ignore_ascii_case("no") {
                    Some(false)
                } else {
                    s.parse::<f64>().ok().map(|n| n != 0.0)
                }
            }
            _ => None,
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k.name(), v)))
            .finish()
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for Scope {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut scope = Scope::new();
        for (k, v) in iter {
            scope.put(k, v);
        }
        scope
    }
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in self.entries.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_case_insensitive() {
        let mut scope = Scope::new();
        scope.put("Name", "Ada");
        assert_eq!(scope.get(&Key::new("NAME")), Some(&Value::from("Ada")));
        assert!(scope.contains_key(&Key::new("name")));
        scope.put("name", "Grace");
        assert_eq!(scope.len(), 1);
        assert_eq!(scope.get(&Key::new("Name")), Some(&Value::from("Grace")));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let scope: Scope = [("b", 1), ("a", 2), ("c", 3)].into_iter().collect();
        let keys: Vec<&str> = scope.keys().map(|k| k.name()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(scope.keys_as_string(), "b, a, c");
    }

    #[test]
    fn test_add_all_absent_keeps_existing() {
        let mut sub: Scope = [("x", 1)].into_iter().collect();
        let sup: Scope = [("x", 2), ("y", 3)].into_iter().collect();
        sub.add_all_absent(&sup);
        assert_eq!(sub.get(&Key::new("x")), Some(&Value::from(1)));
        assert_eq!(sub.get(&Key::new("y")), Some(&Value::from(3)));
    }

    #[test]
    fn test_dereference_safe_and_strict() {
        let scope: Scope = [("a", 1)].into_iter().collect();
        assert_eq!(scope.dereference(&Key::new("missing"), true).unwrap(), Value::Null);
        match scope.dereference(&Key::new("missing"), false) {
            Err(ObjectError::KeyNotFound { key, valid_keys }) => {
                assert_eq!(key, "missing");
                assert_eq!(valid_keys, "a");
            }
            other => panic!("Expected KeyNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_key_list_truncated() {
        let scope: Scope = (0..60).map(|i| (format!("k{}", i), i)).collect();
        let listed = scope.keys_as_string();
        assert!(listed.ends_with("k49, ..."));
    }

    #[test]
    fn test_get_flag() {
        let scope: Scope = [
            ("bare", Value::from("")),
            ("no", Value::from("no")),
            ("yes", Value::from(true)),
            ("zero", Value::from(0)),
        ]
        .into_iter()
        .collect();
        assert_eq!(scope.get_flag(&Key::new("bare")), Some(true));
        assert_eq!(scope.get_flag(&Key::new("no")), Some(false));
        assert_eq!(scope.get_flag(&Key::new("yes")), Some(true));
        assert_eq!(scope.get_flag(&Key::new("zero")), Some(false));
        assert_eq!(scope.get_flag(&Key::new("absent")), None);
    }
}
