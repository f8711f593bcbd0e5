use std::cmp::Ordering::{self, *};
use std::iter::FusedIterator;
use std::ops::{Bound, RangeBounds};

use super::{max_height, AvlTree, Dir, Node};
use crate::Error;

/// The order of a walk over a tree's entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Least key first.
    #[default]
    Ascending,
    /// Greatest key first.
    Descending,
}

impl Direction {
    // The child visited before a node.
    fn near(self) -> Dir {
        match self {
            Direction::Ascending => Dir::Left,
            Direction::Descending => Dir::Right,
        }
    }
}

/// An iterator over the entries of an [`AvlTree`], created by
/// [`AvlTree::iter`] and [`AvlTree::iter_in`].
pub struct Iter<'a, K, V> {
    // nodes whose own entry and far subtree are still to come
    pending: Vec<&'a Node<K, V>>,
    near: Dir,
    len: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new<C>(tree: &'a AvlTree<K, V, C>, direction: Direction) -> Self {
        let mut iter = Iter {
            pending: Vec::with_capacity(max_height(tree.len)),
            near: direction.near(),
            len: tree.len,
        };
        iter.descend(tree.root.as_deref());
        iter
    }

    fn descend(&mut self, mut curr: Option<&'a Node<K, V>>) {
        while let Some(n) = curr {
            self.pending.push(n);
            curr = n.links[self.near].as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.pending.pop()?;
        self.descend(n.links[!self.near].as_deref());
        self.len -= 1;
        Some(n.entry())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

// Derive would needlessly require K: Clone and V: Clone.
impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Iter {
            pending: self.pending.clone(),
            near: self.near,
            len: self.len,
        }
    }
}

/// An iterator over the entries of an [`AvlTree`] whose keys fall in a range.
///
/// Created by [`AvlTree::range`] and [`AvlTree::range_in`].
pub struct Range<'a, K, V, C, R> {
    pending: Vec<&'a Node<K, V>>,
    near: Dir,
    bounds: R,
    compare: &'a C,
}

// Tests if `key` is beyond `fence` on the `side` it guards (Less for a lower
// bound).
fn outside<K, C>(compare: &C, key: &K, fence: Bound<&K>, side: Ordering) -> bool
where
    C: Fn(&K, &K) -> Ordering,
{
    match fence {
        Bound::Unbounded => false,
        Bound::Included(b) => compare(key, b) == side,
        Bound::Excluded(b) => compare(key, b) != side.reverse(),
    }
}

impl<'a, K, V, C, R> Range<'a, K, V, C, R>
where
    C: Fn(&K, &K) -> Ordering,
    R: RangeBounds<K>,
{
    // The bound met first and the side of it that is out of range.
    fn near_fence(&self) -> (Bound<&K>, Ordering) {
        match self.near {
            Dir::Left => (self.bounds.start_bound(), Less),
            Dir::Right => (self.bounds.end_bound(), Greater),
        }
    }

    fn far_fence(&self) -> (Bound<&K>, Ordering) {
        match self.near {
            Dir::Left => (self.bounds.end_bound(), Greater),
            Dir::Right => (self.bounds.start_bound(), Less),
        }
    }

    // Stacks the path to the first in-range node, skipping the subtrees that
    // lie wholly before the near fence.
    fn seek(&mut self, mut curr: Option<&'a Node<K, V>>) {
        while let Some(n) = curr {
            let (fence, side) = self.near_fence();
            if outside(self.compare, &n.key, fence, side) {
                curr = n.links[!self.near].as_deref();
            } else {
                self.pending.push(n);
                curr = n.links[self.near].as_deref();
            }
        }
    }

    fn descend(&mut self, mut curr: Option<&'a Node<K, V>>) {
        while let Some(n) = curr {
            self.pending.push(n);
            curr = n.links[self.near].as_deref();
        }
    }
}

impl<'a, K, V, C, R> Iterator for Range<'a, K, V, C, R>
where
    C: Fn(&K, &K) -> Ordering,
    R: RangeBounds<K>,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.pending.pop()?;
        let (fence, side) = self.far_fence();
        if outside(self.compare, &n.key, fence, side) {
            self.pending.clear();
            return None;
        }

        self.descend(n.links[!self.near].as_deref());
        Some(n.entry())
    }
}

impl<'a, K, V, C, R> FusedIterator for Range<'a, K, V, C, R>
where
    C: Fn(&K, &K) -> Ordering,
    R: RangeBounds<K>,
{
}

impl<K, V, C> AvlTree<K, V, C> {
    /// Returns an iterator over the entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self, Direction::Ascending)
    }

    /// Returns an iterator over the entries in the given order.
    ///
    /// # Examples
    /// ```
    /// use avltree::{AvlTree, Direction};
    ///
    /// let mut t = AvlTree::ordered();
    /// for k in [2, 3, 1] {
    ///     t.insert(k, ()).unwrap();
    /// }
    /// let ks: Vec<_> = t.iter_in(Direction::Descending).map(|e| *e.0).collect();
    /// assert_eq!(ks, [3, 2, 1]);
    /// ```
    pub fn iter_in(&self, direction: Direction) -> Iter<'_, K, V> {
        Iter::new(self, direction)
    }

    /// Returns an iterator over the keys in ascending order.
    pub fn keys(
        &self,
    ) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator + '_ {
        Keys {
            fwd: self.iter(),
            rev: self.iter_in(Direction::Descending),
        }
        .map(|(k, _)| k)
    }

    /// Returns an iterator over the values in ascending key order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Calls `visit` on each entry in the given order until it returns false.
    ///
    /// # Examples
    /// ```
    /// use avltree::{AvlTree, Direction};
    ///
    /// let mut t = AvlTree::ordered();
    /// for k in 0..10 {
    ///     t.insert(k, ()).unwrap();
    /// }
    ///
    /// let mut seen = Vec::new();
    /// t.enumerate(Direction::Descending, |k, _| {
    ///     seen.push(*k);
    ///     seen.len() < 3
    /// });
    /// assert_eq!(seen, [9, 8, 7]);
    /// ```
    pub fn enumerate<F>(&self, direction: Direction, mut visit: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        for (k, v) in self.iter_in(direction) {
            if !visit(k, v) {
                break;
            }
        }
    }
}

// Pairs a forward and a backward walk so `keys` can be reversed; the two meet
// in the middle through the shared count.
struct Keys<'a, K, V> {
    fwd: Iter<'a, K, V>,
    rev: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.fwd.len == 0 {
            return None;
        }
        self.rev.len -= 1;
        self.fwd.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.fwd.len, Some(self.fwd.len))
    }
}

impl<'a, K, V> ExactSizeIterator for Keys<'a, K, V> {}

impl<'a, K, V> DoubleEndedIterator for Keys<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.rev.len == 0 {
            return None;
        }
        self.fwd.len -= 1;
        self.rev.next()
    }
}

impl<K, V, C> AvlTree<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    /// Returns an ascending iterator over the entries whose keys fall in
    /// `bounds`.
    ///
    /// # Panics
    ///
    /// Panics if the range's start is greater than its end, as
    /// [`BTreeMap::range`](std::collections::BTreeMap::range) does.  Use
    /// [`range_in`](Self::range_in) to get an error instead.
    ///
    /// # Examples
    /// ```
    /// use avltree::AvlTree;
    ///
    /// let mut t = AvlTree::ordered();
    /// for k in 0..10 {
    ///     t.insert(k, k * k).unwrap();
    /// }
    /// let sq: Vec<_> = t.range(3..6).map(|(_, v)| *v).collect();
    /// assert_eq!(sq, [9, 16, 25]);
    /// ```
    pub fn range<R>(&self, bounds: R) -> Range<'_, K, V, C, R>
    where
        R: RangeBounds<K>,
    {
        match self.range_in(bounds, Direction::Ascending) {
            Ok(r) => r,
            Err(e) => panic!("{e}"),
        }
    }

    /// Returns an iterator, in the given order, over the entries whose keys
    /// fall in `bounds`.
    ///
    /// Fails with [`Error::InvalidRange`] if the tree is not empty and the
    /// range's start is greater than its end.
    pub fn range_in<R>(
        &self,
        bounds: R,
        direction: Direction,
    ) -> Result<Range<'_, K, V, C, R>, Error>
    where
        R: RangeBounds<K>,
    {
        if self.root.is_some() {
            if let (
                Bound::Included(lo) | Bound::Excluded(lo),
                Bound::Included(hi) | Bound::Excluded(hi),
            ) = (bounds.start_bound(), bounds.end_bound())
            {
                if (self.compare)(lo, hi) == Greater {
                    return Err(Error::InvalidRange);
                }
            }
        }

        let mut range = Range {
            pending: Vec::with_capacity(max_height(self.len)),
            near: direction.near(),
            bounds,
            compare: &self.compare,
        };
        range.seek(self.root.as_deref());
        Ok(range)
    }

    /// Calls `visit`, in the given order, on each entry whose key lies between
    /// `low` and `high` inclusive, until it returns false.
    ///
    /// A missing bound leaves that end of the walk open.  Fails with
    /// [`Error::InvalidRange`], before visiting anything, if both bounds are
    /// given, the tree is not empty and `low` is greater than `high`.
    ///
    /// # Examples
    /// ```
    /// use avltree::{AvlTree, Direction, Error};
    ///
    /// let mut t = AvlTree::ordered();
    /// for k in (0..=100).step_by(5) {
    ///     t.insert(k, ()).unwrap();
    /// }
    ///
    /// let mut seen = Vec::new();
    /// t.enumerate_range(Some(&12), Some(&31), Direction::Descending, |k, _| {
    ///     seen.push(*k);
    ///     true
    /// })
    /// .unwrap();
    /// assert_eq!(seen, [30, 25, 20, 15]);
    ///
    /// let up = Direction::Ascending;
    /// let r = t.enumerate_range(Some(&9), Some(&1), up, |_, _| true);
    /// assert_eq!(r, Err(Error::InvalidRange));
    /// ```
    pub fn enumerate_range<F>(
        &self,
        low: Option<&K>,
        high: Option<&K>,
        direction: Direction,
        mut visit: F,
    ) -> Result<(), Error>
    where
        F: FnMut(&K, &V) -> bool,
    {
        let bounds = (
            low.map_or(Bound::Unbounded, Bound::Included),
            high.map_or(Bound::Unbounded, Bound::Included),
        );
        for (k, v) in self.range_in(bounds, direction)? {
            if !visit(k, v) {
                break;
            }
        }
        Ok(())
    }
}

impl<'a, K, V, C> IntoIterator for &'a AvlTree<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::ops::Bound::*;

    fn step_five() -> AvlTree<i32, ()> {
        let mut t = AvlTree::ordered();
        for k in (0..=100).step_by(5) {
            t.insert(k, ()).unwrap();
        }
        t
    }

    fn range_keys<R: RangeBounds<i32>>(
        t: &AvlTree<i32, ()>,
        r: R,
        dir: Direction,
    ) -> Vec<i32> {
        t.range_in(r, dir).unwrap().map(|(k, _)| *k).collect()
    }

    #[test]
    fn iter_both_ways() {
        let t = step_five();
        let up: Vec<_> = t.iter().map(|(k, _)| *k).collect();
        let mut down: Vec<_> =
            t.iter_in(Direction::Descending).map(|(k, _)| *k).collect();
        assert_eq!(up.len(), 21);
        assert_eq!(t.iter().len(), 21);
        down.reverse();
        assert_eq!(up, down);
    }

    #[test]
    fn iter_empty() {
        let t: AvlTree<i32, ()> = AvlTree::ordered();
        assert_eq!(t.iter().next(), None);
        assert_eq!(t.range(..).next(), None);
        assert_eq!(t.keys().next_back(), None);
    }

    #[test]
    fn keys_meet_in_middle() {
        let t = step_five();
        let mut ks = t.keys();
        assert_eq!(ks.next(), Some(&0));
        assert_eq!(ks.next_back(), Some(&100));
        let rest: Vec<_> = ks.collect();
        assert_eq!(rest.len(), 19);
        assert_eq!(*rest[0], 5);
        assert_eq!(*rest[18], 95);
    }

    #[test]
    fn keys_and_values_exact_len() {
        let t = step_five();
        let mut ks = t.keys();
        assert_eq!(ks.len(), 21);
        assert_eq!(ks.size_hint(), (21, Some(21)));
        ks.next();
        ks.next_back();
        assert_eq!(ks.len(), 19);
        assert_eq!(ks.by_ref().count(), 19);
        assert_eq!(ks.size_hint(), (0, Some(0)));
        assert_eq!(t.values().len(), 21);
    }

    #[test]
    fn range_fences() {
        let t = step_five();
        let asc = Direction::Ascending;
        let desc = Direction::Descending;

        assert_eq!(range_keys(&t, 12..=31, asc), [15, 20, 25, 30]);
        assert_eq!(range_keys(&t, 12..=31, desc), [30, 25, 20, 15]);
        assert_eq!(range_keys(&t, 15..30, asc), [15, 20, 25]);
        assert_eq!(range_keys(&t, 15..30, desc), [25, 20, 15]);
        assert_eq!(range_keys(&t, (Excluded(15), Included(30)), asc), [20, 25, 30]);
        assert_eq!(range_keys(&t, (Excluded(15), Included(30)), desc), [30, 25, 20]);
        assert_eq!(range_keys(&t, 95.., asc), [95, 100]);
        assert_eq!(range_keys(&t, ..=5, desc), [5, 0]);
        assert_eq!(range_keys(&t, 101.., asc), [] as [i32; 0]);
        assert_eq!(range_keys(&t, ..0, desc), [] as [i32; 0]);
        assert_eq!(range_keys(&t, 11..14, asc), [] as [i32; 0]);
        assert_eq!(range_keys(&t, (Excluded(20), Excluded(20)), asc), [] as [i32; 0]);
        assert_eq!(range_keys(&t, .., desc).len(), 21);
    }

    #[test]
    fn inverted_range() {
        let t = step_five();
        assert!(matches!(
            t.range_in(40..=20, Direction::Ascending),
            Err(Error::InvalidRange)
        ));
        let visited = t.enumerate_range(
            Some(&40),
            Some(&20),
            Direction::Descending,
            |_, _| panic!("visited"),
        );
        assert_eq!(visited, Err(Error::InvalidRange));

        let empty: AvlTree<i32, ()> = AvlTree::ordered();
        let asc = Direction::Ascending;
        assert_eq!(
            empty.enumerate_range(Some(&40), Some(&20), asc, |_, _| true),
            Ok(())
        );
    }

    #[test]
    #[should_panic(expected = "lower bound is greater")]
    fn range_panics_when_inverted() {
        let t = step_five();
        let _ = t.range(30..10);
    }

    #[test]
    fn enumerate_stops_early() {
        let t = step_five();
        let mut seen = Vec::new();
        t.enumerate_range(Some(&10), None, Direction::Ascending, |k, _| {
            seen.push(*k);
            *k < 20
        })
        .unwrap();
        assert_eq!(seen, [10, 15, 20]);

        let mut count = 0;
        t.enumerate(Direction::Ascending, |_, _| {
            count += 1;
            false
        });
        assert_eq!(count, 1);
    }

    #[test]
    fn iter_stack_stays_bounded() {
        let mut t = AvlTree::ordered();
        for k in 0..10_000 {
            t.insert(k, ()).unwrap();
        }
        let cap = max_height(t.len());
        let mut it = t.iter();
        while it.next().is_some() {
            assert!(it.pending.len() <= cap);
        }
    }
}
