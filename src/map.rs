//! Implementation of maps, backed by an AVL tree
#![warn(missing_docs)]

extern crate alloc;

use alloc::vec::Vec;
use compact_str::CompactString;
use core::{fmt, iter::FusedIterator, mem};
use tracing::debug;

use crate::util::{Slot, Tree};

//-----------------------------------------------------------------------------------------------//

/// An ordered map between keys and values, implemented using an AVL tree.
///
/// Inserting a key that is already present leaves the stored value untouched. Use `replace` or
/// `get_mut` to update a value in place.
#[derive(Clone)]
pub struct Map<K, V>
where
    K: Ord,
{
    tree: Tree,
    key_value: Vec<(K, V)>,
}

impl<K, V> Map<K, V>
where
    K: Ord,
{
    /// Constructor
    pub fn new() -> Map<K, V> {
        Map {
            tree: Tree::new(),
            key_value: Vec::new(),
        }
    }

    /// Constructor
    pub fn with_capacity(capacity: usize) -> Map<K, V> {
        Map {
            tree: Tree::with_capacity(capacity),
            key_value: Vec::with_capacity(capacity),
        }
    }

    /// Get the number of key/value pairs in the `Map`
    #[inline]
    pub fn count(&self) -> usize {
        self.tree.count()
    }

    /// Check if there are any key/value pairs in the `Map`
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Get the height of the underlying tree
    #[inline]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Remove all key/value pairs from the `Map`
    pub fn clear(&mut self) {
        self.tree.clear();
        self.key_value.truncate(0);
    }

    /// Reserves capacity for at least `additional` more key/value pairs
    pub fn reserve(&mut self, additional: usize) {
        debug_assert_eq!(self.key_value.len(), self.tree.count());

        self.tree.reserve(additional);
        self.key_value.reserve(additional);
    }

    /// Get a value by key.
    ///
    /// If the key is not in the tree then `None` is returned.
    pub fn get(&self, key: &K) -> Option<&V> {
        let leaf = self.leaf(key);
        if !leaf == 0 {
            return None;
        }
        Some(&self.key_value[leaf].1)
    }

    /// Get a mutable reference by key.
    ///
    /// If the key is not in the tree then `None` is returned - this function will not create a key
    /// if it does not exist. In this case use `insert` instead.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let leaf = self.leaf(key);
        if !leaf == 0 {
            return None;
        }
        Some(&mut self.key_value[leaf].1)
    }

    /// Check if a key is in the `Map`
    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        !self.leaf(key) != 0
    }

    /// Insert a key/value pair.
    ///
    /// Returns `true` if the key was new. If the key is already in the map then nothing changes,
    /// the existing value is kept and `value` is dropped.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let key_value = &self.key_value;
        match self.tree.insert_by(|leaf| key.cmp(&key_value[leaf].0)) {
            Slot::Occupied(leaf) => {
                debug!(leaf, "key already present, insert ignored");
                false
            }
            Slot::Vacant(leaf) => {
                self.store(leaf, (key, value));
                true
            }
        }
    }

    /// Insert a key/value pair, replacing any existing value.
    ///
    /// The previous value is returned if the key was already present.
    pub fn replace(&mut self, key: K, value: V) -> Option<V> {
        let key_value = &self.key_value;
        match self.tree.insert_by(|leaf| key.cmp(&key_value[leaf].0)) {
            Slot::Occupied(leaf) => Some(mem::replace(&mut self.key_value[leaf].1, value)),
            Slot::Vacant(leaf) => {
                self.store(leaf, (key, value));
                None
            }
        }
    }

    /// Remove a key/value pair by key, returning the value.
    ///
    /// If the key does not exist, then this function has no effect and returns `None`.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let leaf = self.leaf(key);
        if !leaf == 0 {
            debug!("key not present, remove ignored");
            return None;
        }

        Some(self.take(leaf).1)
    }

    /// Get the first key in the map
    pub fn first(&self) -> Option<(&K, &V)> {
        self.entry(self.tree.first())
    }

    /// Get the last key in the map
    pub fn last(&self) -> Option<(&K, &V)> {
        self.entry(self.tree.last())
    }

    /// Pop the first key/value pair from the map
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let leaf = self.tree.first();
        if !leaf == 0 {
            return None;
        }
        Some(self.take(leaf))
    }

    /// Pop the last key/value pair from the map
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let leaf = self.tree.last();
        if !leaf == 0 {
            return None;
        }
        Some(self.take(leaf))
    }

    /// Iterate over the key/value pairs in the `Map`, in ascending key order
    pub fn iter(&self) -> MapIterator<'_, K, V> {
        MapIterator {
            map: self,
            front: self.tree.first(),
            back: self.tree.last(),
            count: self.tree.count(),
        }
    }

    #[inline]
    fn leaf(&self, key: &K) -> usize {
        self.tree.get_by(|leaf| key.cmp(&self.key_value[leaf].0))
    }

    fn entry(&self, leaf: usize) -> Option<(&K, &V)> {
        if !leaf == 0 {
            None
        } else {
            let key_value = &self.key_value[leaf];
            Some((&key_value.0, &key_value.1))
        }
    }

    fn store(&mut self, leaf: usize, key_value: (K, V)) {
        debug_assert_eq!(leaf, self.key_value.len());
        self.key_value.push(key_value);
    }

    // Unlink a leaf from the tree and move its pair out of storage
    fn take(&mut self, leaf: usize) -> (K, V) {
        let leaf = self.tree.remove(leaf, |a, b| self.key_value.swap(a, b));
        self.key_value.swap_remove(leaf)
    }
}

impl<K, V> Default for Map<K, V>
where
    K: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for Map<K, V>
where
    K: Ord + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a Map<K, V>
where
    K: Ord,
{
    type Item = (&'a K, &'a V);
    type IntoIter = MapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Map<K, V>
where
    K: Ord,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V> Extend<(K, V)> for Map<K, V>
where
    K: Ord,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

//-----------------------------------------------------------------------------------------------//

/// Iterator over a `Map`
pub struct MapIterator<'a, K, V>
where
    K: Ord,
{
    map: &'a Map<K, V>,
    front: usize,
    back: usize,
    count: usize,
}

impl<'a, K, V> Iterator for MapIterator<'a, K, V>
where
    K: Ord,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        if self.count == 0 {
            return None;
        }

        let leaf = self.front;
        self.front = self.map.tree.next(leaf);
        self.count -= 1;

        self.map.entry(leaf)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.count, Some(self.count))
    }
}

impl<'a, K, V> DoubleEndedIterator for MapIterator<'a, K, V>
where
    K: Ord,
{
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        if self.count == 0 {
            return None;
        }

        let leaf = self.back;
        self.back = self.map.tree.prev(leaf);
        self.count -= 1;

        self.map.entry(leaf)
    }
}

impl<K, V> ExactSizeIterator for MapIterator<'_, K, V> where K: Ord {}

impl<K, V> FusedIterator for MapIterator<'_, K, V> where K: Ord {}

//-----------------------------------------------------------------------------------------------//

/// An ordered map between strings and values, implemented using an AVL tree.
///
/// This is specialised version of `Map` that stores keys as a compact string and is queried with
/// `&str`.
#[derive(Clone)]
pub struct StringMap<V> {
    tree: Tree,
    key_value: Vec<(CompactString, V)>,
}

impl<V> StringMap<V> {
    /// Constructor
    pub fn new() -> StringMap<V> {
        StringMap {
            tree: Tree::new(),
            key_value: Vec::new(),
        }
    }

    /// Constructor
    pub fn with_capacity(capacity: usize) -> StringMap<V> {
        StringMap {
            tree: Tree::with_capacity(capacity),
            key_value: Vec::with_capacity(capacity),
        }
    }

    /// Get the number of string/value pairs in the `StringMap`
    #[inline]
    pub fn count(&self) -> usize {
        self.tree.count()
    }

    /// Check if there are any string/value pairs in the `StringMap`
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Get the height of the underlying tree
    #[inline]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Remove all string/value pairs from the `StringMap`
    pub fn clear(&mut self) {
        self.tree.clear();
        self.key_value.truncate(0);
    }

    /// Reserves capacity for at least `additional` more string/value pairs
    pub fn reserve(&mut self, additional: usize) {
        debug_assert_eq!(self.key_value.len(), self.tree.count());

        self.tree.reserve(additional);
        self.key_value.reserve(additional);
    }

    /// Get a value by string.
    ///
    /// If the string is not in the tree then `None` is returned.
    pub fn get(&self, key: &str) -> Option<&V> {
        let leaf = self.leaf(key);
        if !leaf == 0 {
            return None;
        }
        Some(&self.key_value[leaf].1)
    }

    /// Get a mutable reference by string.
    ///
    /// If the string is not in the tree then `None` is returned - this function will not create a
    /// string if it does not exist. In this case use `insert` instead.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let leaf = self.leaf(key);
        if !leaf == 0 {
            return None;
        }
        Some(&mut self.key_value[leaf].1)
    }

    /// Check if a string is in the `StringMap`
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        !self.leaf(key) != 0
    }

    /// Insert a string/value pair.
    ///
    /// Returns `true` if the string was new. An existing value is never overwritten.
    pub fn insert(&mut self, key: &str, value: V) -> bool {
        let key_value = &self.key_value;
        match self.tree.insert_by(|leaf| key.cmp(key_value[leaf].0.as_str())) {
            Slot::Occupied(leaf) => {
                debug!(leaf, key, "string already present, insert ignored");
                false
            }
            Slot::Vacant(leaf) => {
                self.store(leaf, (CompactString::new(key), value));
                true
            }
        }
    }

    /// Insert a string/value pair, replacing any existing value.
    ///
    /// The previous value is returned if the string was already present.
    pub fn replace(&mut self, key: &str, value: V) -> Option<V> {
        let key_value = &self.key_value;
        match self.tree.insert_by(|leaf| key.cmp(key_value[leaf].0.as_str())) {
            Slot::Occupied(leaf) => Some(mem::replace(&mut self.key_value[leaf].1, value)),
            Slot::Vacant(leaf) => {
                self.store(leaf, (CompactString::new(key), value));
                None
            }
        }
    }

    /// Remove a string/value pair by string, returning the value.
    ///
    /// If the string does not exist, then this function has no effect and returns `None`.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let leaf = self.leaf(key);
        if !leaf == 0 {
            debug!(key, "string not present, remove ignored");
            return None;
        }

        Some(self.take(leaf).1)
    }

    /// Get the first string in the map
    pub fn first(&self) -> Option<(&str, &V)> {
        self.entry(self.tree.first())
    }

    /// Get the last string in the map
    pub fn last(&self) -> Option<(&str, &V)> {
        self.entry(self.tree.last())
    }

    /// Pop the first string/value pair from the map
    pub fn pop_first(&mut self) -> Option<(CompactString, V)> {
        let leaf = self.tree.first();
        if !leaf == 0 {
            return None;
        }
        Some(self.take(leaf))
    }

    /// Pop the last string/value pair from the map
    pub fn pop_last(&mut self) -> Option<(CompactString, V)> {
        let leaf = self.tree.last();
        if !leaf == 0 {
            return None;
        }
        Some(self.take(leaf))
    }

    /// Iterate over the string/value pairs in the `StringMap`, in ascending order
    pub fn iter(&self) -> StringMapIterator<'_, V> {
        StringMapIterator {
            map: self,
            front: self.tree.first(),
            back: self.tree.last(),
            count: self.tree.count(),
        }
    }

    #[inline]
    fn leaf(&self, key: &str) -> usize {
        self.tree.get_by(|leaf| key.cmp(self.key_value[leaf].0.as_str()))
    }

    fn entry(&self, leaf: usize) -> Option<(&str, &V)> {
        if !leaf == 0 {
            None
        } else {
            let key_value = &self.key_value[leaf];
            Some((&key_value.0, &key_value.1))
        }
    }

    fn store(&mut self, leaf: usize, key_value: (CompactString, V)) {
        debug_assert_eq!(leaf, self.key_value.len());
        self.key_value.push(key_value);
    }

    fn take(&mut self, leaf: usize) -> (CompactString, V) {
        let leaf = self.tree.remove(leaf, |a, b| self.key_value.swap(a, b));
        self.key_value.swap_remove(leaf)
    }
}

impl<V> Default for StringMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for StringMap<V>
where
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, V> IntoIterator for &'a StringMap<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = StringMapIterator<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V> FromIterator<(&'a str, V)> for StringMap<V> {
    fn from_iter<I: IntoIterator<Item = (&'a str, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut map = Self::with_capacity(iter.size_hint().0);
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

//-----------------------------------------------------------------------------------------------//

/// Iterator over a `StringMap`
pub struct StringMapIterator<'a, V> {
    map: &'a StringMap<V>,
    front: usize,
    back: usize,
    count: usize,
}

impl<'a, V> Iterator for StringMapIterator<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<(&'a str, &'a V)> {
        if self.count == 0 {
            return None;
        }

        let leaf = self.front;
        self.front = self.map.tree.next(leaf);
        self.count -= 1;

        self.map.entry(leaf)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.count, Some(self.count))
    }
}

impl<'a, V> DoubleEndedIterator for StringMapIterator<'a, V> {
    fn next_back(&mut self) -> Option<(&'a str, &'a V)> {
        if self.count == 0 {
            return None;
        }

        let leaf = self.back;
        self.back = self.map.tree.prev(leaf);
        self.count -= 1;

        self.map.entry(leaf)
    }
}

impl<V> ExactSizeIterator for StringMapIterator<'_, V> {}

impl<V> FusedIterator for StringMapIterator<'_, V> {}

//-----------------------------------------------------------------------------------------------//

#[cfg(test)]
// Clone the contents of a map in order
fn test_collect<K: Ord + Clone, V: Clone>(map: &Map<K, V>) -> Vec<(K, V)> {
    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

#[test]
// A very simple test of inserting into a map
fn test_map_0() {
    use alloc::{string::ToString, vec};

    let mut map = Map::new();

    map.insert(5, "Five".to_string());
    map.insert(1, "One".to_string());
    map.insert(9, "Nine".to_string());

    assert_eq!(map.get(&5), Some(&"Five".to_string()));
    assert_eq!(map.get(&4), None);

    assert_eq!(
        test_collect(&map),
        vec![
            (1, "One".to_string()),
            (5, "Five".to_string()),
            (9, "Nine".to_string())
        ]
    );
}

#[test]
// Product IDs inserted out of order come back sorted, and survive a removal
fn test_map_products() {
    use alloc::vec;

    let mut map = Map::new();

    map.insert(101, "Laptop");
    map.insert(102, "Table");
    map.insert(100, "Chair");
    map.insert(103, "Bookshelf");

    let keys: Vec<i32> = map.iter().map(|(k, _)| *k).collect();
    assert_eq!(keys, vec![100, 101, 102, 103]);

    assert_eq!(map.remove(&102), Some("Table"));

    let keys: Vec<i32> = map.iter().map(|(k, _)| *k).collect();
    assert_eq!(keys, vec![100, 101, 103]);
    assert_eq!(map.get(&101), Some(&"Laptop"));
    assert_eq!(map.get(&103), Some(&"Bookshelf"));
    map.tree.check();
}

#[test]
// Ascending insertion does not degenerate into a list
fn test_map_ascending() {
    let map: Map<i32, i32> = (1..=7).map(|k| (k, k * 10)).collect();

    assert_eq!(map.height(), 3);
    assert_eq!(map.tree.check(), 3);
    assert_eq!(map.count(), 7);
}

#[test]
// Inserting an existing key keeps the original value
fn test_map_duplicate() {
    use alloc::string::ToString;

    let mut map = Map::new();

    assert!(map.insert("Chair".to_string(), 50_000));
    assert!(!map.insert("Chair".to_string(), 75_000));

    assert_eq!(map.get(&"Chair".to_string()), Some(&50_000));
    assert_eq!(map.count(), 1);

    assert_eq!(map.replace("Chair".to_string(), 75_000), Some(50_000));
    assert_eq!(map.replace("Table".to_string(), 120_000), None);
    assert_eq!(map.get(&"Chair".to_string()), Some(&75_000));
    assert_eq!(map.count(), 2);

    *map.get_mut(&"Table".to_string()).unwrap() += 1;
    assert_eq!(map.get(&"Table".to_string()), Some(&120_001));
}

#[test]
// Removing an absent key leaves the map unchanged
fn test_map_remove_absent() {
    let mut map: Map<i32, i32> = (0..20).map(|k| (k * 2, k)).collect();
    let before = test_collect(&map);

    assert_eq!(map.remove(&7), None);
    assert_eq!(map.remove(&100), None);

    assert_eq!(test_collect(&map), before);
    assert_eq!(map.remove(&6), Some(3));
    assert!(!map.contains_key(&6));
    assert_eq!(map.get(&6), None);
}

#[test]
// Removed pairs are handed back or dropped, never kept in storage
fn test_map_remove_drops_value() {
    use alloc::rc::Rc;

    let value = Rc::new(0);

    let mut map = Map::new();
    for k in 0..16 {
        map.insert(k, Rc::clone(&value));
    }
    assert_eq!(Rc::strong_count(&value), 17);

    // Two children, so the successor is swapped in first
    let removed = map.remove(&7).unwrap();
    drop(removed);
    assert_eq!(Rc::strong_count(&value), 16);

    map.remove(&3);
    map.pop_first();
    map.pop_last();
    assert_eq!(Rc::strong_count(&value), 13);
    assert_eq!(map.key_value.len(), map.count());
    map.tree.check();

    map.clear();
    assert_eq!(Rc::strong_count(&value), 1);

    let mut map = Map::new();
    map.insert(1, Rc::clone(&value));
    assert_eq!(Rc::strong_count(&value), 2);
    assert!(map.remove(&1).is_some());
    assert_eq!(Rc::strong_count(&value), 1);
}

#[test]
// Iterating from both ends meets in the middle
fn test_map_double_ended() {
    use alloc::vec;

    let map: Map<u8, ()> = (0..10).map(|k| (k, ())).collect();

    let mut iter = map.iter();
    assert_eq!(iter.len(), 10);
    assert_eq!(iter.next().map(|(k, _)| *k), Some(0));
    assert_eq!(iter.next_back().map(|(k, _)| *k), Some(9));

    let rest: Vec<u8> = iter.map(|(k, _)| *k).collect();
    assert_eq!(rest, vec![1, 2, 3, 4, 5, 6, 7, 8]);

    let reversed: Vec<u8> = map.iter().rev().map(|(k, _)| *k).collect();
    assert_eq!(reversed, (0..10).rev().collect::<Vec<u8>>());
}

#[test]
fn test_map_first_last() {
    let mut map = Map::new();
    assert_eq!(map.first(), None);
    assert_eq!(map.pop_last(), None);

    for k in [4, 8, 2, 6] {
        map.insert(k, k * 100);
    }

    assert_eq!(map.first(), Some((&2, &200)));
    assert_eq!(map.last(), Some((&8, &800)));
    assert_eq!(map.pop_first(), Some((2, 200)));
    assert_eq!(map.pop_last(), Some((8, 800)));
    assert_eq!(map.count(), 2);
    assert_eq!(map.first(), Some((&4, &400)));
    map.tree.check();
}

#[test]
fn test_map_debug() {
    let map: Map<i32, &str> = [(2, "b"), (1, "a")].into_iter().collect();
    assert_eq!(alloc::format!("{map:?}"), "{1: \"a\", 2: \"b\"}");
}

#[test]
// A stress test with inserting and getting
fn test_map_2() {
    use alloc::string::ToString;
    use rand::prelude::*;

    const COUNT: usize = 100000;

    let mut rng = SmallRng::seed_from_u64(1234567890);

    let mut map = Map::new();
    for _ in 0..COUNT {
        let key = rng.random_range(0..usize::MAX);
        let value = key.to_string();
        map.insert(key, value);
    }

    assert_eq!(map.count(), COUNT);
    map.tree.check();

    let mut rng = SmallRng::seed_from_u64(1234567890);

    for _ in 0..COUNT {
        let key = rng.random_range(0..usize::MAX);
        let value = key.to_string();
        assert_eq!(map.get(&key), Some(&value));
    }
}

#[test]
// A stress test with inserting and popping from both ends
fn test_map_3() {
    use alloc::string::ToString;
    use rand::prelude::*;

    const COUNT: usize = 100000;

    let mut rng = SmallRng::seed_from_u64(9876543210);

    let mut map = Map::new();
    for _ in 0..COUNT {
        let key = rng.random_range(0..usize::MAX);
        let value = key.to_string();
        map.insert(key, value);
    }

    let mut last = 0;
    for _ in 0..COUNT / 2 {
        let (key, value) = map.pop_first().unwrap();
        assert_eq!(key.to_string(), value);
        assert!(key >= last);
        last = key;
    }

    let mut last = usize::MAX;
    for _ in 0..COUNT / 2 {
        let (key, value) = map.pop_last().unwrap();
        assert_eq!(key.to_string(), value);
        assert!(key <= last);
        last = key;
    }

    assert_eq!(map.count(), 0);
    assert_eq!(map.height(), 0);
    assert!(map.key_value.is_empty());
}

#[test]
// A stress test with inserting and removing
fn test_map_5() {
    use rand::prelude::*;

    const COUNT: usize = 100000;

    let mut rng = SmallRng::seed_from_u64(5678901234);

    let mut map = Map::new();
    for _ in 0..COUNT {
        let key = rng.random_range(0..usize::MAX);
        map.insert(key, key);
    }

    let mut rng = SmallRng::seed_from_u64(5678901234);

    for i in 0..COUNT {
        let key = rng.random_range(0..usize::MAX);
        assert_eq!(map.remove(&key), Some(key));
        if i % 10000 == 0 {
            map.tree.check();
            assert_eq!(map.key_value.len(), map.count());
        }
    }

    assert_eq!(map.count(), 0);
    assert!(map.key_value.is_empty());
}

#[test]
// A simple test of a map keyed by category name
fn test_string_map_0() {
    use alloc::{
        string::{String, ToString},
        vec,
    };

    let mut map = StringMap::new();

    map.insert("Furniture", vec!["Wooden Chair"]);
    map.insert("Electronics", vec!["Laptop"]);
    map.insert("Clothing", vec![]);

    map.get_mut("Electronics").unwrap().push("Phone");

    assert!(!map.insert("Clothing", vec!["Scarf"]));
    assert_eq!(map.get("Clothing"), Some(&vec![]));
    assert_eq!(map.get("Toys"), None);

    let v: Vec<(String, usize)> = map
        .iter()
        .map(|(k, v)| (k.to_string(), v.len()))
        .collect();
    assert_eq!(
        v,
        vec![
            ("Clothing".to_string(), 0),
            ("Electronics".to_string(), 2),
            ("Furniture".to_string(), 1)
        ]
    );

    assert_eq!(map.remove("Electronics"), Some(vec!["Laptop", "Phone"]));
    assert_eq!(map.remove("Electronics"), None);
    assert_eq!(map.first().map(|(k, _)| k), Some("Clothing"));

    let (name, products) = map.pop_last().unwrap();
    assert_eq!(name, "Furniture");
    assert_eq!(products, vec!["Wooden Chair"]);
    assert_eq!(map.count(), 1);
    map.tree.check();
}

#[test]
fn test_string_map_replace() {
    let mut map: StringMap<u32> = [("b", 2), ("a", 1)].into_iter().collect();

    assert_eq!(map.replace("a", 10), Some(1));
    assert_eq!(map.replace("c", 3), None);
    assert!(map.contains_key("c"));
    assert_eq!(alloc::format!("{map:?}"), "{\"a\": 10, \"b\": 2, \"c\": 3}");
}

#[test]
// Removed strings and values are dropped along with their pair
fn test_string_map_remove_drops_value() {
    use alloc::rc::Rc;

    let value = Rc::new(());

    let mut map = StringMap::new();
    for name in ["Electronics", "Furniture", "Clothing", "Toys", "Garden"] {
        map.insert(name, Rc::clone(&value));
    }
    assert_eq!(Rc::strong_count(&value), 6);

    assert!(map.remove("Furniture").is_some());
    assert_eq!(Rc::strong_count(&value), 5);

    let (name, _) = map.pop_first().unwrap();
    assert_eq!(name, "Clothing");
    assert_eq!(Rc::strong_count(&value), 4);

    assert_eq!(map.key_value.len(), 3);
    map.tree.check();
}

//-----------------------------------------------------------------------------------------------//

#[cfg(test)]
// Run a script of inserts (`true`) and removes (`false`) against both a `Map` and a `BTreeMap`,
// checking the tree shape after every step
fn test_replay(
    ops: &[(bool, u8)],
) -> (Map<u8, usize>, alloc::collections::BTreeMap<u8, usize>) {
    use alloc::collections::BTreeMap;

    let mut map = Map::new();
    let mut model = BTreeMap::new();

    for (i, &(insert, key)) in ops.iter().enumerate() {
        if insert {
            let new = !model.contains_key(&key);
            model.entry(key).or_insert(i);
            assert_eq!(map.insert(key, i), new);
        } else {
            assert_eq!(map.remove(&key), model.remove(&key));
        }
        map.tree.check();
        assert_eq!(map.key_value.len(), model.len());
    }

    (map, model)
}

#[cfg(test)]
quickcheck::quickcheck! {
    fn prop_matches_btree_map(ops: Vec<(bool, u8)>) -> bool {
        let (map, model) = test_replay(&ops);
        map.count() == model.len()
            && map.iter().map(|(k, v)| (*k, *v)).eq(model.iter().map(|(k, v)| (*k, *v)))
    }

    fn prop_ascending_keys(ops: Vec<(bool, u8)>) -> bool {
        let (map, _) = test_replay(&ops);
        let keys: Vec<u8> = map.iter().map(|(k, _)| *k).collect();
        keys.windows(2).all(|w| w[0] < w[1])
    }

    fn prop_round_trip(keys: Vec<u16>, key: u16) -> bool {
        let mut map: Map<u16, u16> = keys.iter().map(|k| (*k, k.wrapping_mul(3))).collect();
        let present = map.insert(key, 7) || map.get(&key).is_some();
        let expected = if keys.contains(&key) { key.wrapping_mul(3) } else { 7 };
        let found = map.get(&key) == Some(&expected);
        let removed = map.remove(&key) == Some(expected);
        present && found && removed && map.get(&key).is_none()
    }

    fn prop_size_conservation(keys: Vec<u16>, skip: usize) -> bool {
        let mut unique = keys.clone();
        unique.sort();
        unique.dedup();

        let mut map: Map<u16, ()> = keys.iter().map(|k| (*k, ())).collect();
        let removed: Vec<u16> = unique.iter().copied().step_by(skip % 4 + 1).collect();
        for k in &removed {
            map.remove(k);
        }
        map.tree.check();
        map.iter().count() == unique.len() - removed.len()
    }

    fn prop_remove_absent_is_noop(keys: Vec<u8>, absent: u8) -> bool {
        let mut map: Map<u16, u8> = keys.iter().map(|k| (*k as u16 * 2, *k)).collect();
        let before = test_collect(&map);
        let height = map.height();
        let removed = map.remove(&(absent as u16 * 2 + 1));
        removed.is_none() && test_collect(&map) == before && map.height() == height
    }
}
