//! ## Introduction
//!
//! This crate implements ordered collections based on AVL trees. An AVL tree is a binary search
//! tree that keeps the heights of the two subtrees of every leaf within one of each other, by
//! rotating leaves after every insertion and removal. Lookups, insertions and removals are all
//! logarithmic in the worst case, including for keys that arrive already sorted.
//!
//! ## Benefits
//!
//! - Keys stored in the collections do not need to be hashable, only `Ord`.
//! - Keys are kept in ascending order, and iteration is lazy, in order and from either end.
//! - Lookups never change the shape of the tree, so they only need `&self`.
//! - The crate is small and `#![no_std]`.
//! - Keys and values are stored as (key, value) pairs in a single array, separate from the
//!   structure of the tree. They are moved when inserted, and once when a removal needs the
//!   in-order successor to take the place of the removed key, but otherwise stay put while the
//!   tree rotates around them. Removal moves the last pair into the vacated slot, so the array
//!   stays dense and removed pairs are handed back to the caller.
//!
//! ## Contents
//!
//! <center>
//!
//! | Type        | Stores       | Sorts By | Iterator            |
//! |:------------|:-------------|:---------|---------------------|
//! | `Map`       | Key/Value    | Ord      | `MapIterator`       |
//! | `StringMap` | String/Value | Ord      | `StringMapIterator` |
//! | `Set`       | Key          | Ord      | `SetIterator`       |
//!
//! </center>
//!
//! Inserting a key that is already present is a no-op that returns `false`: the stored value is
//! kept. `replace` and `get_mut` are there for updating a value in place. `remove` returns the
//! removed value, and removing an absent key is likewise a no-op that returns `None`.
//!
//! ```
//! use copse::Map;
//!
//! let mut products = Map::new();
//! products.insert(101, "Laptop");
//! products.insert(102, "Table");
//! products.insert(100, "Chair");
//! products.insert(103, "Bookshelf");
//!
//! assert_eq!(products.remove(&102), Some("Table"));
//!
//! let ids: Vec<i32> = products.iter().map(|(id, _)| *id).collect();
//! assert_eq!(ids, [100, 101, 103]);
//! assert_eq!(products.get(&102), None);
//! ```
//!
//! The crate exposes an additional type `util::Tree` that provides the foundation of the other
//! types. This can be thought of as a utility that manages a set of `usize` indices into an
//! external vector of data, without storing the vector itself. It is provided to support
//! development of additional collection types.
//!
//! Rotations and ignored operations are reported through `tracing` at `trace` and `debug` level.
//! The crate never installs a subscriber.

#![no_std]
#![warn(missing_docs)]

mod map;
mod set;
pub mod util;

pub use map::*;
pub use set::*;
