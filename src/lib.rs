//! # An ordered map on an AVL tree
//!
//! `avltree` provides [`AvlTree`], an associative container that keeps its
//! entries sorted by key.  Unlike [`std::collections::BTreeMap`], the order is
//! not taken from an `Ord` impl but from a comparison function supplied when
//! the tree is built, so the same key type can be stored under different
//! orders.
//!
//! Lookup, insertion and removal take `O(log n)` time.  The tree also answers
//! strict predecessor/successor queries and walks its entries, or a key range
//! of them, in either direction without recursion.
//!
//! ```
//! use avltree::{AvlTree, Direction};
//!
//! let mut t = AvlTree::new(|a: &i32, b: &i32| b.cmp(a)); // reversed order
//! for k in [3, 1, 2] {
//!     t.insert(k, k * 10).unwrap();
//! }
//! assert_eq!(t.first(), Some((&3, &30)));
//!
//! let mut seen = Vec::new();
//! t.enumerate(Direction::Ascending, |k, _| {
//!     seen.push(*k);
//!     true
//! });
//! assert_eq!(seen, [3, 2, 1]);
//! ```

mod avl;
pub use avl::{AvlTree, Direction, Iter, Range};

mod error;
pub use error::{CheckError, Error};
