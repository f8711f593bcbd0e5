#![warn(missing_docs)]
use std::cmp::Ordering::{self, *};
use std::fmt::{Debug, Formatter};
use std::ops::{Index, IndexMut, Not};

use tracing::debug;

use crate::CheckError;

mod dump;
mod erase;
mod insert;
mod iter;
mod rotate;

pub use iter::{Direction, Iter, Range};

type Link<K, V> = Option<Box<Node<K, V>>>;

// The two child links of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Dir {
    Left,
    Right,
}

impl Dir {
    // Equal keys go right: erase relies on this to walk from the target on to
    // its in-order successor.
    fn of(ord: Ordering) -> Self {
        match ord {
            Less => Dir::Left,
            Equal | Greater => Dir::Right,
        }
    }
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Dir {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

// Not a height difference.  `Heavy(d)` says the `d` subtree is one level
// taller than its sibling; while an insert is in flight it also marks the
// frontier below which no imbalance has started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Balance {
    Balanced,
    Heavy(Dir),
}

impl Balance {
    fn heavy_side(self) -> Option<Dir> {
        match self {
            Balance::Balanced => None,
            Balance::Heavy(d) => Some(d),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Balance::Balanced => "balanced",
            Balance::Heavy(Dir::Left) => "left-heavy",
            Balance::Heavy(Dir::Right) => "right-heavy",
        }
    }
}

#[derive(Clone)]
struct Links<K, V>([Link<K, V>; 2]);

impl<K, V> Links<K, V> {
    fn children(&self) -> impl DoubleEndedIterator<Item = &Node<K, V>> {
        self.0.iter().filter_map(|l| l.as_deref())
    }
}

impl<K, V> Default for Links<K, V> {
    fn default() -> Self {
        Links([None, None])
    }
}

impl<K, V> Index<Dir> for Links<K, V> {
    type Output = Link<K, V>;

    fn index(&self, d: Dir) -> &Link<K, V> {
        &self.0[d as usize]
    }
}

impl<K, V> IndexMut<Dir> for Links<K, V> {
    fn index_mut(&mut self, d: Dir) -> &mut Link<K, V> {
        &mut self.0[d as usize]
    }
}

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    val: V,
    links: Links<K, V>,
    balance: Balance,
}

impl<K, V> Node<K, V> {
    fn new(key: K, val: V) -> Self {
        Node {
            key,
            val,
            links: Links::default(),
            balance: Balance::Balanced,
        }
    }

    // Follows `d` links for as long as they lead somewhere.
    fn edge(&self, d: Dir) -> &Self {
        let mut n = self;
        while let Some(c) = n.links[d].as_deref() {
            n = c;
        }
        n
    }

    fn entry(&self) -> (&K, &V) {
        (&self.key, &self.val)
    }
}

// prerequisite: the link is occupied.  Every link on a route recorded by a
// walk from the root is.
fn node_mut<K, V>(link: &mut Link<K, V>) -> &mut Node<K, V> {
    match link {
        Some(n) => n,
        None => unreachable!("empty link on a recorded route"),
    }
}

fn take_node<K, V>(link: &mut Link<K, V>) -> Box<Node<K, V>> {
    match link.take() {
        Some(n) => n,
        None => unreachable!("empty link on a recorded route"),
    }
}

// Follows `route` down from `link` and returns the link it ends on.
fn descend<'a, K, V>(
    mut link: &'a mut Link<K, V>,
    route: &[Dir],
) -> &'a mut Link<K, V> {
    for &d in route {
        link = &mut node_mut(link).links[d];
    }
    link
}

fn height<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map_or(0, |n| {
        1 + height(&n.links[Dir::Left]).max(height(&n.links[Dir::Right]))
    })
}

// The tallest an AVL tree with `len` nodes can be.  The sparsest tree of
// height h has N(h) = N(h-1) + N(h-2) + 1 nodes.
fn max_height(len: usize) -> usize {
    let (mut h, mut sparsest, mut next) = (0, 0usize, 1usize);
    while next <= len {
        let Some(after) = next.checked_add(sparsest + 1) else {
            return h + 1;
        };
        sparsest = next;
        next = after;
        h += 1;
    }
    h
}

// Returns the subtree's height and node count.
fn check_node<K, V>(
    n: Option<&Node<K, V>>,
) -> Result<(usize, usize), CheckError> {
    let Some(n) = n else {
        return Ok((0, 0));
    };

    let (left, lf_len) = check_node(n.links[Dir::Left].as_deref())?;
    let (right, rt_len) = check_node(n.links[Dir::Right].as_deref())?;

    if left.abs_diff(right) > 1 {
        return Err(CheckError::Unbalanced { left, right });
    }

    let expected = match left.cmp(&right) {
        Less => Balance::Heavy(Dir::Right),
        Equal => Balance::Balanced,
        Greater => Balance::Heavy(Dir::Left),
    };
    if n.balance != expected {
        return Err(CheckError::StaleTag {
            tag: n.balance.name(),
            left,
            right,
        });
    }

    Ok((1 + left.max(right), lf_len + 1 + rt_len))
}

/// A map from keys to values, sorted by a comparison function.
///
/// The comparison function is fixed when the tree is built and must be a total
/// order that stays the same for the life of the tree.  Keys that compare
/// `Equal` are the same key: a tree never holds two of them.
///
/// Internally, the map is an [AVL tree](https://en.wikipedia.org/wiki/AVL_tree)
/// whose nodes carry a three-state balance tag rather than a height.  Lookups,
/// insertions and removals walk a single root-to-leaf path; the traversals use
/// an explicit stack bounded by the tree height, never recursion.
///
/// The tree is not synchronized.  Sharing one between threads needs an
/// external lock, which the borrow checker will insist on anyway.
///
/// # Examples
/// ```
/// use avltree::AvlTree;
///
/// let mut t = AvlTree::ordered();
/// t.insert("b", 2).unwrap();
/// t.insert("a", 1).unwrap();
/// assert!(t.insert("a", 3).is_err());
/// assert_eq!(t.get(&"a"), Some(&1));
/// assert_eq!(t.remove(&"b"), Ok(2));
/// assert_eq!(t.len(), 1);
/// ```
#[derive(Clone)]
pub struct AvlTree<K, V, C = fn(&K, &K) -> Ordering> {
    root: Link<K, V>,
    len: usize,
    compare: C,
}

impl<K: Ord, V> AvlTree<K, V> {
    /// Creates an empty tree ordered by the keys' [`Ord`] impl.
    ///
    /// # Examples
    /// ```
    /// use avltree::AvlTree;
    /// let t: AvlTree<u32, &str> = AvlTree::ordered();
    /// assert!(t.is_empty());
    /// ```
    pub fn ordered() -> Self {
        Self::new(K::cmp)
    }
}

impl<K: Ord, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::ordered()
    }
}

impl<K, V, C> AvlTree<K, V, C> {
    /// Returns the number of entries in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        debug!(dropped = self.len, "clearing tree");
        self.root = None;
        self.len = 0;
    }

    /// Returns the entry with the least key.
    ///
    /// # Examples
    /// ```
    /// use avltree::AvlTree;
    ///
    /// let mut t = AvlTree::ordered();
    /// assert_eq!(t.first(), None);
    /// t.insert(2, 'b').unwrap();
    /// t.insert(1, 'a').unwrap();
    /// assert_eq!(t.first(), Some((&1, &'a')));
    /// ```
    pub fn first(&self) -> Option<(&K, &V)> {
        self.root.as_deref().map(|n| n.edge(Dir::Left).entry())
    }

    /// Returns the entry with the greatest key.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.root.as_deref().map(|n| n.edge(Dir::Right).entry())
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        height(&self.root)
    }
}

impl<K, V, C> AvlTree<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    /// Creates an empty tree ordered by `compare`.
    ///
    /// # Examples
    /// ```
    /// use avltree::AvlTree;
    ///
    /// let mut by_len = AvlTree::new(|a: &&str, b: &&str| a.len().cmp(&b.len()));
    /// by_len.insert("ccc", 3).unwrap();
    /// by_len.insert("a", 1).unwrap();
    /// assert!(by_len.insert("b", 2).is_err()); // same length as "a"
    /// assert_eq!(by_len.first(), Some((&"a", &1)));
    /// ```
    pub fn new(compare: C) -> Self {
        AvlTree {
            root: None,
            len: 0,
            compare,
        }
    }

    fn find(&self, key: &K) -> Option<&Node<K, V>> {
        let mut curr = self.root.as_deref();
        while let Some(n) = curr {
            match (self.compare)(key, &n.key) {
                Less => curr = n.links[Dir::Left].as_deref(),
                Equal => return Some(n),
                Greater => curr = n.links[Dir::Right].as_deref(),
            }
        }

        None
    }

    /// Tests if the tree holds an entry for `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Returns a reference to the value stored for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|n| &n.val)
    }

    /// Returns the stored key and value for `key`.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.find(key).map(Node::entry)
    }

    /// Returns a mutable reference to the value stored for `key`.
    ///
    /// # Example
    /// ```
    /// use avltree::AvlTree;
    ///
    /// let mut t = AvlTree::ordered();
    /// t.insert(1, 7).unwrap();
    ///
    /// *t.get_mut(&1).unwrap() = 2;
    /// assert_eq!(t.get(&1), Some(&2));
    /// ```
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let mut curr = self.root.as_deref_mut();
        while let Some(n) = curr {
            match (self.compare)(key, &n.key) {
                Less => curr = n.links[Dir::Left].as_deref_mut(),
                Equal => return Some(&mut n.val),
                Greater => curr = n.links[Dir::Right].as_deref_mut(),
            }
        }

        None
    }

    /// Returns the entry with the greatest key strictly less than `key`.
    ///
    /// `key` need not be in the tree.
    ///
    /// # Examples
    /// ```
    /// use avltree::AvlTree;
    ///
    /// let mut t = AvlTree::ordered();
    /// for k in [10, 20, 30] {
    ///     t.insert(k, ()).unwrap();
    /// }
    /// assert_eq!(t.find_prev(&20), Some((&10, &())));
    /// assert_eq!(t.find_prev(&25), Some((&20, &())));
    /// assert_eq!(t.find_prev(&10), None);
    /// ```
    pub fn find_prev(&self, key: &K) -> Option<(&K, &V)> {
        self.neighbor(key, Dir::Left).map(Node::entry)
    }

    /// Returns the entry with the least key strictly greater than `key`.
    pub fn find_next(&self, key: &K) -> Option<(&K, &V)> {
        self.neighbor(key, Dir::Right).map(Node::entry)
    }

    // The closest node to `key` on its `side` (Left: predecessor).
    fn neighbor(&self, key: &K, side: Dir) -> Option<&Node<K, V>> {
        let toward = match side {
            Dir::Left => Less,
            Dir::Right => Greater,
        };

        let mut candidate = None;
        let mut curr = self.root.as_deref();
        while let Some(n) = curr {
            let ord = (self.compare)(key, &n.key);
            if ord == toward {
                curr = n.links[side].as_deref();
            } else if ord == Equal {
                return match n.links[side].as_deref() {
                    Some(c) => Some(c.edge(!side)),
                    None => candidate,
                };
            } else {
                candidate = Some(n);
                curr = n.links[!side].as_deref();
            }
        }

        candidate
    }

    /// Verifies the tree's invariants and returns its height.
    ///
    /// Checks that keys are strictly increasing under the comparator, that no
    /// two sibling subtrees differ in height by more than one, that every
    /// balance tag agrees with the heights below it and that the cached length
    /// is the number of nodes.
    pub fn check(&self) -> Result<usize, CheckError> {
        let (height, counted) = check_node(self.root.as_deref())?;
        if counted != self.len {
            return Err(CheckError::LenMismatch {
                cached: self.len,
                counted,
            });
        }

        let mut prev: Option<&K> = None;
        for (position, (k, _)) in self.iter().enumerate() {
            if prev.is_some_and(|p| (self.compare)(p, k) != Less) {
                return Err(CheckError::OutOfOrder { position });
            }
            prev = Some(k);
        }

        Ok(height)
    }
}

impl<K, V, C> std::ops::Index<&K> for AvlTree<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    type Output = V;

    fn index(&self, key: &K) -> &Self::Output {
        match self.get(key) {
            Some(v) => v,
            None => panic!("Key not found in AvlTree"),
        }
    }
}

impl<K: Debug, V: Debug, C> Debug for AvlTree<K, V, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
