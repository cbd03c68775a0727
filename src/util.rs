//! Utility types to support AVL balanced binary trees

#![warn(missing_docs)]

extern crate alloc;
use alloc::vec::Vec;

use core::{cmp::Ordering, fmt::Display};
use tracing::trace;

//-----------------------------------------------------------------------------------------------//

// A leaf in an AVL tree
#[derive(Clone)]
struct Leaf {
    parent: usize,
    left: usize,
    right: usize,
    height: usize,
}

//-----------------------------------------------------------------------------------------------//

/// The outcome of inserting a key into a `Tree`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// The key was already present in the leaf given. The tree has not been modified.
    Occupied(usize),
    /// A new leaf was linked into the tree and the tree rebalanced. The caller must store the key
    /// in the slot with this index.
    Vacant(usize),
}

// How to choose between a single and a double rotation at an unbalanced leaf
#[derive(Clone, Copy)]
enum Retrace {
    // Walking up after an insertion: `child` is the leaf we arrived from and `grandchild` is the
    // leaf we arrived at `child` from. Their relationship records which side the new key went.
    Insert { child: usize, grandchild: usize },
    // Walking up after a removal: the heavy child's own balance decides.
    Remove,
}

//-----------------------------------------------------------------------------------------------//

/// A tree of integer leaves, kept height balanced
///
/// Each leaf is a `usize` index, and the owner of the tree keeps its keys (or key/value pairs) in
/// a vector addressed by the same index. The tree never looks at the keys itself, every search is
/// driven by a closure that compares the sought key with the key stored in a given slot.
///
/// Leaves are kept dense: leaf `n` is always pushed at index `n`, and removal moves the last leaf
/// into the hole, the same way `Vec::swap_remove` does. An owner that pushes on insertion and
/// calls `swap_remove` with the index returned from `remove` stays in step with the tree.
#[derive(Clone)]
pub struct Tree {
    leaf: Vec<Leaf>,
    root: usize,
}

impl Tree {
    /// Construct an empty tree
    pub fn new() -> Tree {
        Tree {
            leaf: Vec::new(),
            root: !0,
        }
    }

    /// Construct an empty tree, pre-allocating a given capacity
    pub fn with_capacity(capacity: usize) -> Tree {
        Tree {
            leaf: Vec::with_capacity(capacity),
            root: !0,
        }
    }

    /// Get the number of leaves in the tree
    #[inline]
    pub fn count(&self) -> usize {
        self.leaf.len()
    }

    /// Check if there are any leaves in the tree
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.leaf.is_empty()
    }

    /// Get the height of the tree. An empty tree has height 0 and a single leaf has height 1.
    #[inline]
    pub fn height(&self) -> usize {
        height(&self.leaf, self.root)
    }

    /// Remove all leaves from the tree
    pub fn clear(&mut self) {
        self.leaf.truncate(0);
        self.root = !0;
    }

    /// Reserves capacity for at least `additional` more leaves
    pub fn reserve(&mut self, additional: usize) {
        self.leaf.reserve(additional);
    }

    /// Get a leaf by comparison
    ///
    /// `compare(leaf)` must return the ordering of the sought key relative to the key stored for
    /// `leaf`. If the key is not found, then `usize::MAX` is returned. The tree is not modified.
    pub fn get_by<F>(&self, compare: F) -> usize
    where
        F: Fn(usize) -> Ordering,
    {
        let mut x = self.root;
        while !x != 0 {
            match compare(x) {
                Ordering::Equal => return x,
                Ordering::Less => x = self.leaf[x].left,
                Ordering::Greater => x = self.leaf[x].right,
            }
        }
        !0
    }

    /// Insert a leaf by comparison
    ///
    /// If the key is already present nothing changes and `Slot::Occupied` is returned. Otherwise a
    /// new leaf is linked in and every leaf on the path back to the root has its height recomputed
    /// and is rebalanced. The new leaf is always the next index, equal to `count()` before the call.
    pub fn insert_by<F>(&mut self, compare: F) -> Slot
    where
        F: Fn(usize) -> Ordering,
    {
        let x = match locate(&self.leaf, self.root, compare) {
            Location::Found(leaf) => return Slot::Occupied(leaf),
            Location::Root => {
                let leaf = self.alloc(!0);
                self.root = leaf;
                return Slot::Vacant(leaf);
            }
            Location::Left(parent) => {
                let leaf = self.alloc(parent);
                self.leaf[parent].left = leaf;
                leaf
            }
            Location::Right(parent) => {
                let leaf = self.alloc(parent);
                self.leaf[parent].right = leaf;
                leaf
            }
        };

        let mut grandchild = !0;
        let mut child = x;
        let mut y = self.leaf[x].parent;
        while !y != 0 {
            let up = self.leaf[y].parent;
            let top = self.rebalance(y, Retrace::Insert { child, grandchild });
            grandchild = child;
            child = top;
            y = up;
        }

        Slot::Vacant(x)
    }

    /// Remove a leaf
    ///
    /// A leaf with two children is not unlinked itself. Instead `swap(leaf, successor)` is called
    /// so the owner moves the contents of the in-order successor into `leaf`'s slot (and the
    /// removed contents into the successor's slot), and the successor's position is unlinked
    /// instead. Every leaf on the path back to the root is then rebalanced.
    ///
    /// The index of the slot that now holds the removed contents is returned. The last leaf has
    /// been moved into that index, so the owner must `swap_remove` it from its own vector.
    pub fn remove<S>(&mut self, leaf: usize, mut swap: S) -> usize
    where
        S: FnMut(usize, usize),
    {
        debug_assert!(!leaf != 0);

        let mut x = leaf;
        if !self.leaf[x].left != 0 && !self.leaf[x].right != 0 {
            let s = leftmost(&self.leaf, self.leaf[x].right);
            trace!(leaf = x, successor = s, "swap with successor");
            swap(x, s);
            x = s;
        }

        // `x` has at most one child now
        let a = if !self.leaf[x].left == 0 {
            self.leaf[x].right
        } else {
            self.leaf[x].left
        };
        let mut y = self.leaf[x].parent;

        if !a != 0 {
            self.leaf[a].parent = y;
        }
        self.relink(y, x, a);

        while !y != 0 {
            let up = self.leaf[y].parent;
            self.rebalance(y, Retrace::Remove);
            y = up;
        }

        self.free(x);
        x
    }

    /// Get the root leaf, or `usize::MAX` for an empty tree
    #[cfg(test)]
    pub(crate) fn root(&self) -> usize {
        self.root
    }

    /// Get the first leaf (the left-most)
    #[inline]
    pub fn first(&self) -> usize {
        leftmost(&self.leaf, self.root)
    }

    /// Get the last leaf (the right-most)
    #[inline]
    pub fn last(&self) -> usize {
        rightmost(&self.leaf, self.root)
    }

    /// Get the logical predecessor to a leaf, or `usize::MAX` at the start
    #[inline]
    pub fn prev(&self, leaf: usize) -> usize {
        prev(&self.leaf, leaf)
    }

    /// Get the logical successor to a leaf, or `usize::MAX` at the end
    #[inline]
    pub fn next(&self, leaf: usize) -> usize {
        next(&self.leaf, leaf)
    }

    // Allocate and initialise a new leaf
    fn alloc(&mut self, parent: usize) -> usize {
        let leaf = self.leaf.len();
        self.leaf.push(Leaf {
            parent,
            left: !0,
            right: !0,
            height: 1,
        });

        leaf
    }

    // Free an unlinked leaf, moving the last leaf into its index
    fn free(&mut self, leaf: usize) {
        let last = self.leaf.len() - 1;
        self.leaf.swap_remove(leaf);
        if leaf == last {
            return;
        }

        let Leaf {
            parent,
            left,
            right,
            ..
        } = self.leaf[leaf];

        if !left != 0 {
            self.leaf[left].parent = leaf;
        }
        if !right != 0 {
            self.leaf[right].parent = leaf;
        }
        self.relink(parent, last, leaf);
    }

    // Point whichever link referred to `old` (a child of `parent`, or the root) at `new`
    fn relink(&mut self, parent: usize, old: usize, new: usize) {
        if !parent == 0 {
            self.root = new;
        } else if self.leaf[parent].left == old {
            self.leaf[parent].left = new;
        } else {
            debug_assert_eq!(self.leaf[parent].right, old);
            self.leaf[parent].right = new;
        }
    }

    // Recompute the height of `x` and restore its balance, returning the leaf now at its position
    fn rebalance(&mut self, x: usize, retrace: Retrace) -> usize {
        let leaf = &mut self.leaf;
        update(leaf, x);

        let factor = balance(leaf, x);
        let parent = leaf[x].parent;

        let top = if factor > 1 {
            let y = leaf[x].left;
            let single = match retrace {
                Retrace::Insert { child, grandchild } => {
                    debug_assert_eq!(child, y);
                    leaf[y].left == grandchild
                }
                Retrace::Remove => balance(leaf, y) >= 0,
            };
            if !single {
                leaf[x].left = rotate_left(leaf, y);
            }
            rotate_right(leaf, x)
        } else if factor < -1 {
            let y = leaf[x].right;
            let single = match retrace {
                Retrace::Insert { child, grandchild } => {
                    debug_assert_eq!(child, y);
                    leaf[y].right == grandchild
                }
                Retrace::Remove => balance(leaf, y) <= 0,
            };
            if !single {
                leaf[x].right = rotate_right(leaf, y);
            }
            rotate_left(leaf, x)
        } else {
            return x;
        };

        self.relink(parent, x, top);
        top
    }

    // Verify the links, cached heights and balance of every leaf, returning the tree height
    #[cfg(test)]
    pub(crate) fn check(&self) -> usize {
        debug_assert!(!self.root == 0 || self.leaf[self.root].parent == !0);
        let (height, count) = check_leaf(&self.leaf, self.root);
        debug_assert_eq!(count, self.leaf.len());
        height
    }
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new()
    }
}

impl Display for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[ ")?;
        let mut leaf = self.first();
        while !leaf != 0 {
            write!(f, "{leaf} ")?;
            leaf = self.next(leaf);
        }
        write!(f, "]")?;
        Ok(())
    }
}

//-----------------------------------------------------------------------------------------------//

// IMPLEMENTATION NOTE
//
// The functions below are low level. They are not 'unsafe' in the Rust sense, but they manipulate
// links without fixing up the parent's reference to the subtree, or the root. Use with caution.

enum Location {
    Found(usize),
    Root,
    Left(usize),
    Right(usize),
}

// Locate a leaf in a tree, or if not found identify where to insert it
fn locate<F>(leaf: &[Leaf], mut x: usize, compare: F) -> Location
where
    F: Fn(usize) -> Ordering,
{
    // `x` should be a root
    debug_assert!(!x == 0 || leaf[x].parent == !0);

    if !x == 0 {
        return Location::Root;
    }

    loop {
        match compare(x) {
            Ordering::Equal => return Location::Found(x),
            Ordering::Less => {
                let y = leaf[x].left;
                if !y == 0 {
                    return Location::Left(x);
                }
                x = y;
            }
            Ordering::Greater => {
                let y = leaf[x].right;
                if !y == 0 {
                    return Location::Right(x);
                }
                x = y;
            }
        }
    }
}

#[inline]
fn height(leaf: &[Leaf], x: usize) -> usize {
    if !x == 0 {
        0
    } else {
        leaf[x].height
    }
}

// Height of the left subtree minus height of the right subtree
#[inline]
fn balance(leaf: &[Leaf], x: usize) -> isize {
    if !x == 0 {
        return 0;
    }
    height(leaf, leaf[x].left) as isize - height(leaf, leaf[x].right) as isize
}

#[inline]
fn update(leaf: &mut [Leaf], x: usize) {
    leaf[x].height = 1 + height(leaf, leaf[x].left).max(height(leaf, leaf[x].right));
}

// Rotate the subtree at `z` to the right, returning its new top
//
//         z            y
//        / \          / \
//       y   d   =>   a   z
//      / \              / \
//     a   c            c   d
//
// The new top inherits `z`'s parent, but the parent's own link to the subtree is left to the
// caller.
fn rotate_right(leaf: &mut [Leaf], z: usize) -> usize {
    let y = leaf[z].left;
    debug_assert!(!y != 0);
    trace!(leaf = z, pivot = y, "rotate right");

    let c = leaf[y].right;
    let parent = leaf[z].parent;

    leaf[z].left = c;
    if !c != 0 {
        leaf[c].parent = z;
    }

    leaf[y].right = z;
    leaf[z].parent = y;
    leaf[y].parent = parent;

    update(leaf, z);
    update(leaf, y);
    y
}

// Rotate the subtree at `z` to the left, returning its new top
fn rotate_left(leaf: &mut [Leaf], z: usize) -> usize {
    let y = leaf[z].right;
    debug_assert!(!y != 0);
    trace!(leaf = z, pivot = y, "rotate left");

    let b = leaf[y].left;
    let parent = leaf[z].parent;

    leaf[z].right = b;
    if !b != 0 {
        leaf[b].parent = z;
    }

    leaf[y].left = z;
    leaf[z].parent = y;
    leaf[y].parent = parent;

    update(leaf, z);
    update(leaf, y);
    y
}

// Get the left-most leaf below `x`
fn leftmost(leaf: &[Leaf], mut x: usize) -> usize {
    if !x == 0 {
        return !0;
    }

    loop {
        let y = leaf[x].left;
        if !y == 0 {
            return x;
        }
        x = y;
    }
}

// Get the right-most leaf below `x`
fn rightmost(leaf: &[Leaf], mut x: usize) -> usize {
    if !x == 0 {
        return !0;
    }

    loop {
        let y = leaf[x].right;
        if !y == 0 {
            return x;
        }
        x = y;
    }
}

// Get the logical predecessor to a leaf
fn prev(leaf: &[Leaf], mut x: usize) -> usize {
    let y = leaf[x].left;
    if !y != 0 {
        return rightmost(leaf, y);
    }

    loop {
        let y = leaf[x].parent;
        if !y == 0 {
            return !0;
        }
        if leaf[y].right == x {
            return y;
        }
        debug_assert_eq!(leaf[y].left, x);
        x = y;
    }
}

// Get the logical successor to a leaf
fn next(leaf: &[Leaf], mut x: usize) -> usize {
    let y = leaf[x].right;
    if !y != 0 {
        return leftmost(leaf, y);
    }

    loop {
        let y = leaf[x].parent;
        if !y == 0 {
            return !0;
        }
        if leaf[y].left == x {
            return y;
        }
        debug_assert_eq!(leaf[y].right, x);
        x = y;
    }
}

//-----------------------------------------------------------------------------------------------//

// DEBUG : Check a subtree, returning its height and number of leaves
#[cfg(test)]
fn check_leaf(leaf: &[Leaf], x: usize) -> (usize, usize) {
    if !x == 0 {
        return (0, 0);
    }

    let y = leaf[x].left;
    let z = leaf[x].right;

    if !y != 0 {
        assert_eq!(leaf[y].parent, x);
    }
    if !z != 0 {
        assert_eq!(leaf[z].parent, x);
    }

    let (hl, cl) = check_leaf(leaf, y);
    let (hr, cr) = check_leaf(leaf, z);

    assert!(hl.abs_diff(hr) <= 1, "leaf {x} is unbalanced: {hl} vs {hr}");

    let h = 1 + hl.max(hr);
    assert_eq!(leaf[x].height, h, "leaf {x} has a stale height");

    (h, 1 + cl + cr)
}

//-----------------------------------------------------------------------------------------------//

// TEST : Insert into a tree with keys held in `keys`, the way the collections do
#[cfg(test)]
fn test_insert(tree: &mut Tree, keys: &mut Vec<i32>, key: i32) -> Slot {
    let slot = tree.insert_by(|leaf| key.cmp(&keys[leaf]));
    if let Slot::Vacant(leaf) = slot {
        debug_assert_eq!(leaf, keys.len());
        keys.push(key);
    }
    slot
}

// TEST : Remove from a tree with keys held in `keys`, returning the removed key
#[cfg(test)]
fn test_remove(tree: &mut Tree, keys: &mut Vec<i32>, key: i32) -> Option<i32> {
    let leaf = tree.get_by(|leaf| key.cmp(&keys[leaf]));
    if !leaf == 0 {
        return None;
    }
    let leaf = tree.remove(leaf, |a, b| keys.swap(a, b));
    Some(keys.swap_remove(leaf))
}

// TEST : Collect the keys in order
#[cfg(test)]
fn test_in_order(tree: &Tree, keys: &[i32]) -> Vec<i32> {
    let mut v = Vec::new();
    let mut leaf = tree.first();
    while !leaf != 0 {
        v.push(keys[leaf]);
        leaf = tree.next(leaf);
    }
    v
}

#[test]
// A single right rotation for a left-left insertion
fn test_tree_left_left() {
    use alloc::vec;

    let mut tree = Tree::new();
    let mut keys = Vec::new();

    for key in [3, 2, 1] {
        test_insert(&mut tree, &mut keys, key);
    }

    assert_eq!(tree.check(), 2);
    assert_eq!(keys[tree.root()], 2);
    assert_eq!(test_in_order(&tree, &keys), vec![1, 2, 3]);
}

#[test]
// A double rotation for a left-right insertion
fn test_tree_left_right() {
    use alloc::vec;

    let mut tree = Tree::new();
    let mut keys = Vec::new();

    for key in [3, 1, 2] {
        test_insert(&mut tree, &mut keys, key);
    }

    assert_eq!(tree.check(), 2);
    assert_eq!(keys[tree.root()], 2);
    assert_eq!(test_in_order(&tree, &keys), vec![1, 2, 3]);
}

#[test]
// A double rotation for a right-left insertion
fn test_tree_right_left() {
    let mut tree = Tree::new();
    let mut keys = Vec::new();

    for key in [1, 3, 2] {
        test_insert(&mut tree, &mut keys, key);
    }

    assert_eq!(tree.check(), 2);
    assert_eq!(keys[tree.root()], 2);
}

#[test]
// Inserting a key twice leaves the tree alone
fn test_tree_duplicate() {
    let mut tree = Tree::new();
    let mut keys = Vec::new();

    assert_eq!(test_insert(&mut tree, &mut keys, 7), Slot::Vacant(0));
    assert_eq!(test_insert(&mut tree, &mut keys, 7), Slot::Occupied(0));
    assert_eq!(tree.count(), 1);
}

#[test]
// Removing a leaf with two children moves its successor into its slot
fn test_tree_remove_two_children() {
    use alloc::vec;

    let mut tree = Tree::new();
    let mut keys = Vec::new();

    for key in [101, 102, 100, 103] {
        test_insert(&mut tree, &mut keys, key);
    }
    assert_eq!(tree.check(), 3);
    assert_eq!(keys[tree.root()], 101);

    assert_eq!(test_remove(&mut tree, &mut keys, 101), Some(101));
    assert_eq!(keys[tree.root()], 102);
    assert_eq!(test_in_order(&tree, &keys), vec![100, 102, 103]);
    assert_eq!(tree.check(), 2);
    assert_eq!(keys.len(), 3);
}

#[test]
// Removal rebalances on the way back to the root
fn test_tree_remove_rebalance() {
    use alloc::vec;

    let mut tree = Tree::new();
    let mut keys = Vec::new();

    for key in [2, 1, 3, 4] {
        test_insert(&mut tree, &mut keys, key);
    }

    assert_eq!(test_remove(&mut tree, &mut keys, 1), Some(1));
    assert_eq!(tree.check(), 2);
    assert_eq!(keys[tree.root()], 3);
    assert_eq!(test_in_order(&tree, &keys), vec![2, 3, 4]);
    assert_eq!(test_remove(&mut tree, &mut keys, 1), None);
}

#[test]
// Removal keeps the leaves dense, moving the last leaf into the freed index
fn test_tree_dense() {
    use alloc::vec;

    let mut tree = Tree::new();
    let mut keys = Vec::new();

    for key in 0..10 {
        test_insert(&mut tree, &mut keys, key);
    }

    assert_eq!(test_remove(&mut tree, &mut keys, 4), Some(4));
    assert_eq!(tree.count(), 9);
    assert_eq!(keys.len(), 9);
    tree.check();

    assert_eq!(test_remove(&mut tree, &mut keys, 9), Some(9));
    assert_eq!(test_remove(&mut tree, &mut keys, 0), Some(0));
    tree.check();

    assert_eq!(test_insert(&mut tree, &mut keys, 40), Slot::Vacant(7));
    assert_eq!(test_in_order(&tree, &keys), vec![1, 2, 3, 5, 6, 7, 8, 40]);
    tree.check();

    for key in [1, 2, 3, 5, 6, 7, 8, 40] {
        assert!(test_remove(&mut tree, &mut keys, key).is_some());
        tree.check();
    }
    assert!(tree.is_empty());
    assert_eq!(tree.root(), !0);
}

#[test]
fn test_tree_display() {
    use alloc::string::ToString;

    let mut tree = Tree::new();
    let mut keys = Vec::new();

    for key in [20, 10, 30] {
        test_insert(&mut tree, &mut keys, key);
    }

    assert_eq!(tree.to_string(), "[ 1 0 2 ]");
    tree.clear();
    assert_eq!(tree.to_string(), "[ ]");
    assert_eq!(tree.height(), 0);
}
