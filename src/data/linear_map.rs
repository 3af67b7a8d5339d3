//! This module contains the definition of a map-like structure that stores
//! its unique-key associations in a contiguous vector. Register memories are
//! tiny, so linear scans beat hashing here, and keeping the underlying pairs
//! in a vector makes canonical key ordering a single sort away.

use serde::{Deserialize, Serialize};

/// A map-like structure based on a vector of key-value pairs with unique
/// keys.
///
/// Insertion order is preserved until [`Self::sort_keys`] is called, at which
/// point the pairs are brought into the canonical ascending-key order.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct LinearMap<K, V> {
    /// The actual associations stored in the container.
    pairs: Vec<(K, V)>,
}

impl<K, V> LinearMap<K, V>
where
    K: Eq,
{
    /// Creates a new, empty, `LinearMap`.
    #[must_use]
    pub fn new() -> Self {
        let pairs = Vec::new();
        Self { pairs }
    }

    /// Creates a new, empty, `LinearMap` that is guaranteed to have a
    /// large-enough underlying allocation to store _at least_ `capacity`
    /// associations before needing to reallocate.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let pairs = Vec::with_capacity(capacity);
        Self { pairs }
    }

    /// Inserts the provided `value` into the map under `key`.
    ///
    /// If an association for `key` already exists its value is overwritten,
    /// keeping keys unique.
    pub fn insert(&mut self, key: K, value: V) {
        match self.pairs.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, existing_value)) => *existing_value = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Gets the value in the map for the provided `key` or [`None`] if there
    /// is no association for `key` in the map.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.pairs
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Gets the number of associations currently in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Checks whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// An iterator visiting all key-value pairs in the map's current order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.pairs.iter().map(|(key, value)| (key, value))
    }

    /// An iterator visiting all keys in the map's current order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.pairs.iter().map(|(key, _)| key)
    }

    /// An iterator visiting all values in the map's current order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.pairs.iter().map(|(_, value)| value)
    }
}

impl<K, V> LinearMap<K, V>
where
    K: Ord,
{
    /// Sorts the associations into the canonical ascending order of their
    /// keys.
    ///
    /// Keys are unique, so this order is a total one and two maps holding the
    /// same associations compare equal after sorting regardless of the order
    /// in which they were built.
    pub fn sort_keys(&mut self) {
        self.pairs.sort_by(|(left, _), (right, _)| left.cmp(right));
    }
}

impl<K, V> Default for LinearMap<K, V>
where
    K: Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> From<Vec<(K, V)>> for LinearMap<K, V>
where
    K: Eq,
{
    fn from(value: Vec<(K, V)>) -> Self {
        let mut map = LinearMap::new();

        for (key, val) in value {
            map.insert(key, val);
        }

        map
    }
}

#[cfg(test)]
mod test {
    use itertools::Itertools;

    use crate::data::linear_map::test::util::LinearMap;

    #[test]
    fn construction() {
        let map = LinearMap::new();
        assert!(map.is_empty());
    }

    #[test]
    fn insert() {
        let mut map = LinearMap::new();
        assert!(map.is_empty());

        map.insert("a", 10);
        assert_eq!(map.len(), 1);

        map.insert("b", 20);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn insert_overwrites() {
        let mut map = LinearMap::new();
        map.insert("a", 10);
        map.insert("a", 20);

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&"a"), Some(&20));
    }

    #[test]
    fn get() {
        let mut map = LinearMap::new();
        map.insert("a", 10);

        assert_eq!(map.get(&"a"), Some(&10));
        assert!(map.get(&"b").is_none());
    }

    #[test]
    fn iter_preserves_insertion_order() {
        let mut map = LinearMap::new();
        map.insert("b", 20);
        map.insert("a", 10);

        let pairs = map.iter().map(|(k, v)| (*k, *v)).collect_vec();
        assert_eq!(pairs, vec![("b", 20), ("a", 10)]);
    }

    #[test]
    fn sort_keys_produces_canonical_order() {
        let mut left = LinearMap::new();
        left.insert("b", 20);
        left.insert("a", 10);

        let mut right = LinearMap::new();
        right.insert("a", 10);
        right.insert("b", 20);

        assert_ne!(left, right);

        left.sort_keys();
        right.sort_keys();
        assert_eq!(left, right);
    }

    /// Utilities for testing the linear map.
    mod util {
        use crate::data::linear_map::LinearMap as ActualLinearMap;

        /// A type of the map to make testing easier.
        pub type LinearMap = ActualLinearMap<Key, Value>;

        /// A key type for testing.
        pub type Key = &'static str;

        /// A value type for testing.
        pub type Value = usize;
    }
}
