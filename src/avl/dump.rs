use std::fmt::Display;
use std::io::{self, Write};

use super::{max_height, AvlTree, Node};

impl<K: Display, V, C> AvlTree<K, V, C> {
    /// Writes the tree's shape as a Graphviz digraph.
    ///
    /// Each node gets one line, in pre-order, naming its present children.
    ///
    /// # Examples
    /// ```
    /// use avltree::AvlTree;
    ///
    /// let mut t = AvlTree::ordered();
    /// for k in [2, 1] {
    ///     t.insert(k, ()).unwrap();
    /// }
    /// let mut out = Vec::new();
    /// t.write_dot(&mut out).unwrap();
    /// assert_eq!(
    ///     String::from_utf8(out).unwrap(),
    ///     "digraph BST {\n\"2\"-> { \"1\" }\n\"1\"-> { }\n}\n"
    /// );
    /// ```
    pub fn write_dot<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "digraph BST {{")?;

        let mut todo: Vec<&Node<K, V>> =
            Vec::with_capacity(max_height(self.len) + 1);
        todo.extend(self.root.as_deref());
        while let Some(n) = todo.pop() {
            write!(w, "\"{}\"-> {{ ", n.key)?;
            for c in n.links.children() {
                write!(w, "\"{}\" ", c.key)?;
            }
            writeln!(w, "}}")?;
            todo.extend(n.links.children().rev());
        }

        writeln!(w, "}}")
    }
}
