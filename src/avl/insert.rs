use std::cmp::Ordering::{self, Equal};

use tracing::trace;

use super::rotate::{rotate2, rotate3};
use super::{descend, node_mut, AvlTree, Balance, Dir, Link, Node};
use crate::Error;

impl<K, V, C> AvlTree<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    /// Adds an entry for `key`.
    ///
    /// Fails with [`Error::DuplicateKey`] if the tree already holds a key that
    /// compares equal to `key`; the stored entry is left alone and the given
    /// key and value are dropped.
    ///
    /// # Examples
    /// ```
    /// use avltree::{AvlTree, Error};
    ///
    /// let mut t = AvlTree::ordered();
    /// assert_eq!(t.insert(5, "five"), Ok(()));
    /// assert_eq!(t.insert(5, "cinq"), Err(Error::DuplicateKey));
    /// assert_eq!(t[&5], "five");
    /// ```
    pub fn insert(&mut self, key: K, val: V) -> Result<(), Error> {
        // Walk down to the empty slot, remembering the deepest node that is
        // already heavy.  Nothing above it changes height, so rebalancing
        // starts there.
        let mut route = Vec::new();
        let mut top = 0;
        let mut curr = self.root.as_deref();
        while let Some(n) = curr {
            let ord = (self.compare)(&key, &n.key);
            if ord == Equal {
                return Err(Error::DuplicateKey);
            }
            if n.balance != Balance::Balanced {
                top = route.len();
            }
            let d = Dir::of(ord);
            route.push(d);
            curr = n.links[d].as_deref();
        }

        let top_link = descend(&mut self.root, &route[..top]);
        let leaf = descend(&mut *top_link, &route[top..]);
        *leaf = Some(Box::new(Node::new(key, val)));
        rebalance(top_link, &route[top..]);

        self.len += 1;
        trace!(depth = route.len(), len = self.len, "inserted");
        Ok(())
    }
}

// Fixes the tags between `top` and the newly added leaf at the end of `path`,
// rotating at `top` if it was already heavy toward the leaf.
fn rebalance<K, V>(top: &mut Link<K, V>, path: &[Dir]) {
    let Some((&first, rest)) = path.split_first() else {
        // the leaf is the new root
        return;
    };

    let balance = node_mut(top).balance;
    match balance {
        Balance::Balanced => mark(top, path),
        Balance::Heavy(h) if h != first => {
            let n = node_mut(top);
            n.balance = Balance::Balanced;
            mark(&mut n.links[first], rest);
        }
        Balance::Heavy(_) => {
            let second = rest[0];
            if second == first {
                rotate2(top, first);
                mark(descend(top, &[first]), &path[2..]);
            } else {
                let third = path.get(2).copied();
                rotate3(top, first, third);
                match third {
                    None => {}
                    Some(t) if t == first => {
                        mark(descend(top, &[first, !first]), &path[3..])
                    }
                    Some(_) => mark(descend(top, &[!first, first]), &path[3..]),
                }
            }
        }
    }
}

// Tags each node along `path` as heavy toward the next step.  The nodes were
// balanced and each subtree on the path grew by one level.
fn mark<K, V>(mut link: &mut Link<K, V>, path: &[Dir]) {
    for &d in path {
        let n = node_mut(link);
        n.balance = Balance::Heavy(d);
        link = &mut n.links[d];
    }
}
