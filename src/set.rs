//! Implementation of sets, backed by an AVL tree
#![warn(missing_docs)]

extern crate alloc;

use alloc::vec::Vec;
use core::{fmt, iter::FusedIterator};
use tracing::debug;

use crate::util::{Slot, Tree};

//-----------------------------------------------------------------------------------------------//

/// An ordered set of keys, implemented using an AVL tree.
#[derive(Clone)]
pub struct Set<K>
where
    K: Ord,
{
    tree: Tree,
    key_slice: Vec<K>,
}

impl<K> Set<K>
where
    K: Ord,
{
    /// Constructor
    pub fn new() -> Set<K> {
        Set {
            tree: Tree::new(),
            key_slice: Vec::new(),
        }
    }

    /// Constructor
    pub fn with_capacity(capacity: usize) -> Set<K> {
        Set {
            tree: Tree::with_capacity(capacity),
            key_slice: Vec::with_capacity(capacity),
        }
    }

    /// Get the number of keys in the `Set`
    #[inline]
    pub fn count(&self) -> usize {
        self.tree.count()
    }

    /// Check if there are any keys in the `Set`
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Get the height of the underlying tree
    #[inline]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Remove all keys from the `Set`
    pub fn clear(&mut self) {
        self.tree.clear();
        self.key_slice.truncate(0);
    }

    /// Reserves capacity for at least `additional` more keys
    pub fn reserve(&mut self, additional: usize) {
        debug_assert_eq!(self.key_slice.len(), self.tree.count());

        self.tree.reserve(additional);
        self.key_slice.reserve(additional);
    }

    /// Get the stored key equal to `key`, or `None`
    pub fn get(&self, key: &K) -> Option<&K> {
        self.entry(self.leaf(key))
    }

    /// Check if a key is in the `Set`
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        !self.leaf(key) != 0
    }

    /// Insert a key, returning `true` if it was not already present
    pub fn insert(&mut self, key: K) -> bool {
        let key_slice = &self.key_slice;
        match self.tree.insert_by(|leaf| key.cmp(&key_slice[leaf])) {
            Slot::Occupied(leaf) => {
                debug!(leaf, "key already present, insert ignored");
                false
            }
            Slot::Vacant(leaf) => {
                debug_assert_eq!(leaf, self.key_slice.len());
                self.key_slice.push(key);
                true
            }
        }
    }

    /// Remove a key, returning `true` if it was present
    pub fn remove(&mut self, key: &K) -> bool {
        let leaf = self.leaf(key);
        if !leaf == 0 {
            debug!("key not present, remove ignored");
            return false;
        }

        self.take(leaf);
        true
    }

    /// Get the first key in the set
    pub fn first(&self) -> Option<&K> {
        self.entry(self.tree.first())
    }

    /// Get the last key in the set
    pub fn last(&self) -> Option<&K> {
        self.entry(self.tree.last())
    }

    /// Pop the first key from the set
    pub fn pop_first(&mut self) -> Option<K> {
        let leaf = self.tree.first();
        if !leaf == 0 {
            return None;
        }
        Some(self.take(leaf))
    }

    /// Pop the last key from the set
    pub fn pop_last(&mut self) -> Option<K> {
        let leaf = self.tree.last();
        if !leaf == 0 {
            return None;
        }
        Some(self.take(leaf))
    }

    /// Iterate over the keys in the `Set`, in ascending order
    pub fn iter(&self) -> SetIterator<'_, K> {
        SetIterator {
            set: self,
            front: self.tree.first(),
            back: self.tree.last(),
            count: self.tree.count(),
        }
    }

    #[inline]
    fn leaf(&self, key: &K) -> usize {
        self.tree.get_by(|leaf| key.cmp(&self.key_slice[leaf]))
    }

    #[inline]
    fn entry(&self, leaf: usize) -> Option<&K> {
        if !leaf == 0 {
            None
        } else {
            Some(&self.key_slice[leaf])
        }
    }

    fn take(&mut self, leaf: usize) -> K {
        let leaf = self.tree.remove(leaf, |a, b| self.key_slice.swap(a, b));
        self.key_slice.swap_remove(leaf)
    }
}

impl<K> Default for Set<K>
where
    K: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for Set<K>
where
    K: Ord + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, K> IntoIterator for &'a Set<K>
where
    K: Ord,
{
    type Item = &'a K;
    type IntoIter = SetIterator<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K> FromIterator<K> for Set<K>
where
    K: Ord,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<K> Extend<K> for Set<K>
where
    K: Ord,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for key in iter {
            self.insert(key);
        }
    }
}

//-----------------------------------------------------------------------------------------------//

/// Iterator over a `Set`
pub struct SetIterator<'a, K>
where
    K: Ord,
{
    set: &'a Set<K>,
    front: usize,
    back: usize,
    count: usize,
}

impl<'a, K> Iterator for SetIterator<'a, K>
where
    K: Ord,
{
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        if self.count == 0 {
            return None;
        }

        let leaf = self.front;
        self.front = self.set.tree.next(leaf);
        self.count -= 1;

        self.set.entry(leaf)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.count, Some(self.count))
    }
}

impl<'a, K> DoubleEndedIterator for SetIterator<'a, K>
where
    K: Ord,
{
    fn next_back(&mut self) -> Option<&'a K> {
        if self.count == 0 {
            return None;
        }

        let leaf = self.back;
        self.back = self.set.tree.prev(leaf);
        self.count -= 1;

        self.set.entry(leaf)
    }
}

impl<K> ExactSizeIterator for SetIterator<'_, K> where K: Ord {}

impl<K> FusedIterator for SetIterator<'_, K> where K: Ord {}

//-----------------------------------------------------------------------------------------------//

#[test]
// A very simple test of a set
fn test_set_0() {
    use alloc::vec;

    let mut set = Set::new();

    assert!(set.insert(5));
    assert!(set.insert(1));
    assert!(set.insert(9));
    assert!(!set.insert(5));

    assert_eq!(set.get(&5), Some(&5));
    assert_eq!(set.get(&4), None);
    assert!(set.contains(&9));

    let v: Vec<i32> = set.iter().copied().collect();
    assert_eq!(v, vec![1, 5, 9]);
    assert_eq!(alloc::format!("{set:?}"), "{1, 5, 9}");
}

#[test]
// A stress test with inserting and popping from the start
fn test_set_3() {
    use rand::prelude::*;

    const COUNT: usize = 100000;

    let mut rng = SmallRng::seed_from_u64(9876543210);

    let mut set = Set::new();
    for _ in 0..COUNT {
        let key = rng.random_range(0..usize::MAX);
        set.insert(key);
    }

    assert_eq!(set.count(), COUNT);
    set.tree.check();

    let mut last = 0;
    for _ in 0..COUNT {
        let key = set.pop_first().unwrap();
        assert!(key >= last);
        last = key;
    }

    assert_eq!(set.count(), 0);
    assert_eq!(set.first(), None);
}

#[test]
// A stress test with inserting and removing over a small key range
fn test_set_5() {
    use rand::prelude::*;

    const COUNT: usize = 100000;

    let mut rng = SmallRng::seed_from_u64(5678901234);

    let keys: Vec<usize> = (0..COUNT).map(|_| rng.random_range(0..1000)).collect();

    let mut set = Set::new();
    for (i, key) in keys.iter().enumerate() {
        if i % 3 == 0 {
            set.remove(key);
        } else {
            set.insert(*key);
        }
    }

    set.tree.check();
    assert!(set.count() <= 1000);
    assert_eq!(set.key_slice.len(), set.count());
    assert!(set.iter().zip(set.iter().skip(1)).all(|(a, b)| a < b));
}

#[test]
// Removed keys are dropped, not kept in storage
fn test_set_remove_drops_key() {
    use alloc::rc::Rc;

    let mut set = Set::new();
    let keys: Vec<Rc<i32>> = (0..8).map(Rc::new).collect();
    for key in &keys {
        set.insert(Rc::clone(key));
    }

    assert!(set.remove(&keys[3]));
    assert_eq!(Rc::strong_count(&keys[3]), 1);

    assert_eq!(set.pop_first().as_deref(), Some(&0));
    assert_eq!(Rc::strong_count(&keys[0]), 1);
    assert_eq!(set.pop_last().as_deref(), Some(&7));
    assert_eq!(Rc::strong_count(&keys[7]), 1);

    set.tree.check();
    assert_eq!(set.key_slice.len(), 5);
    assert!(keys.iter().filter(|key| set.contains(key)).all(|key| Rc::strong_count(key) == 2));
}
