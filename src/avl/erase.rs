use std::cmp::Ordering::{self, Equal};
use std::mem;

use tracing::trace;

use super::rotate::{rotate2, rotate3};
use super::{descend, node_mut, take_node, AvlTree, Balance, Dir, Link, Node};
use crate::Error;

impl<K, V, C> AvlTree<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    /// Removes the entry for `key` and returns its value.
    ///
    /// Fails with [`Error::KeyNotFound`] and leaves the tree untouched if no
    /// stored key compares equal to `key`.
    ///
    /// # Examples
    /// ```
    /// use avltree::{AvlTree, Error};
    ///
    /// let mut t = AvlTree::ordered();
    /// t.insert(1, 'a').unwrap();
    /// assert_eq!(t.remove(&1), Ok('a'));
    /// assert_eq!(t.remove(&1), Err(Error::KeyNotFound));
    /// ```
    pub fn remove(&mut self, key: &K) -> Result<V, Error> {
        // Walk to the node that will be unlinked: the target itself if it
        // lacks a right child, otherwise its in-order successor.  The last step
        // on the route points at the unlinked node's missing child.  `top` is
        // the deepest node whose height survives the removal.
        let mut route = Vec::new();
        let mut top = 0;
        let mut target = None;
        let mut curr = self.root.as_deref();
        while let Some(n) = curr {
            let d = match target {
                Some(_) => Dir::Left,
                None => {
                    let ord = (self.compare)(key, &n.key);
                    if ord == Equal {
                        target = Some(route.len());
                    }
                    Dir::of(ord)
                }
            };

            if n.links[d].is_none() {
                route.push(d);
                break;
            }
            if is_safe(n, d) {
                top = route.len();
            }
            route.push(d);
            curr = n.links[d].as_deref();
        }

        let Some(target) = target else {
            return Err(Error::KeyNotFound);
        };
        let last = route.len() - 1;

        // Shrink each subtree from `top` down.  A rotation pushes the node
        // being fixed one level deeper, so the route actually taken can be
        // longer than the recorded one.
        let mut actual = route[..top].to_vec();
        let mut target_depth = target;
        let mut link = descend(&mut self.root, &route[..top]);
        for (i, &d) in route.iter().enumerate().take(last).skip(top) {
            if shrink(link, d) {
                link = &mut node_mut(link).links[d];
                actual.push(d);
            }
            if i == target {
                target_depth = actual.len();
            }
            actual.push(d);
            link = &mut node_mut(link).links[d];
        }
        if target == last {
            target_depth = actual.len();
        }

        let mut unlinked = take_node(link);
        *link = unlinked.links[!route[last]].take();

        let removed = if target_depth == actual.len() {
            unlinked
        } else {
            let slot = descend(&mut self.root, &actual[..target_depth]);
            let mut old = take_node(slot);
            unlinked.links = mem::take(&mut old.links);
            unlinked.balance = old.balance;
            *slot = Some(unlinked);
            old
        };

        self.len -= 1;
        trace!(depth = actual.len(), len = self.len, "removed");
        Ok(removed.val)
    }
}

// Tests if removing a node below `n` on side `d` leaves `n`'s height alone.
fn is_safe<K, V>(n: &Node<K, V>, d: Dir) -> bool {
    match n.balance {
        Balance::Balanced => true,
        Balance::Heavy(h) if h == d => false,
        Balance::Heavy(h) => n.links[h]
            .as_deref()
            .is_some_and(|c| c.balance == Balance::Balanced),
    }
}

// Updates the node in `link` after its `d` subtree lost a level.  Returns true
// if it rotated, in which case the node now sits at `link`'s child on side
// `d`.
fn shrink<K, V>(link: &mut Link<K, V>, d: Dir) -> bool {
    let n = node_mut(link);
    let balance = n.balance;
    match balance {
        Balance::Balanced => {
            n.balance = Balance::Heavy(!d);
            false
        }
        Balance::Heavy(h) if h == d => {
            n.balance = Balance::Balanced;
            false
        }
        Balance::Heavy(_) => {
            let sibling = node_mut(&mut n.links[!d]);
            let sibling_balance = sibling.balance;
            let inner = sibling.links[d]
                .as_deref()
                .and_then(|c| c.balance.heavy_side());

            match sibling_balance {
                Balance::Heavy(s) if s == d => rotate3(link, !d, inner),
                Balance::Balanced => {
                    rotate2(link, !d);
                    let top = node_mut(link);
                    top.balance = Balance::Heavy(d);
                    node_mut(&mut top.links[d]).balance = Balance::Heavy(!d);
                }
                Balance::Heavy(_) => rotate2(link, !d),
            }
            true
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{AvlTree, Error};

    #[test]
    fn remove_everything_both_orders() {
        let mut t = AvlTree::ordered();
        for k in 0..200 {
            t.insert(k, k).unwrap();
        }
        for k in (0..200).step_by(2) {
            assert_eq!(t.remove(&k), Ok(k));
            assert!(t.check().is_ok());
        }
        for k in (1..200).step_by(2).rev() {
            assert_eq!(t.remove(&k), Ok(k));
            assert!(t.check().is_ok());
        }
        assert!(t.is_empty());
        assert_eq!(t.first(), None);
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut t = AvlTree::ordered();
        for k in [5, 3, 8] {
            t.insert(k, ()).unwrap();
        }
        assert_eq!(t.remove(&4), Err(Error::KeyNotFound));
        assert_eq!(t.remove(&9), Err(Error::KeyNotFound));
        assert_eq!(t.len(), 3);
        assert_eq!(t.check(), Ok(2));
    }

    #[test]
    fn remove_root_repeatedly() {
        let mut t = AvlTree::ordered();
        for k in 0..100 {
            t.insert(k, ()).unwrap();
        }
        while let Some(k) = t.root.as_ref().map(|n| n.key) {
            assert_eq!(t.remove(&k), Ok(()));
            assert!(t.check().is_ok());
            assert!(!t.contains(&k));
        }
        assert_eq!(t.len(), 0);
    }
}
