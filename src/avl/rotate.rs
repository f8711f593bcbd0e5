//! Restructuring steps shared by insert and erase.
//!
//! Both rotations leave the in-order sequence of the subtree unchanged and
//! replace the node in `root` with the subtree's new top.

use tracing::trace;

use super::{take_node, Balance, Dir, Link};

/// Two-point rotation on the path `dir`, `dir`.
///
/// ```text
///       B                 D
///     /   \             /   \
///    A     D    =>     B     E
///        /   \       /   \
///       C     E     A     C
/// ```
/// (drawn for `dir == Right`).  Both B and D come out balanced; erase fixes
/// up the tags itself when D was balanced beforehand.
pub(super) fn rotate2<K, V>(root: &mut Link<K, V>, dir: Dir) {
    let mut b = take_node(root);
    let mut d = take_node(&mut b.links[dir]);
    trace!(?dir, "two-point rotation");

    b.links[dir] = d.links[!dir].take();
    b.balance = Balance::Balanced;
    d.balance = Balance::Balanced;
    d.links[!dir] = Some(b);
    *root = Some(d);
}

/// Three-point rotation on the path `dir`, `!dir`.
///
/// ```text
///       B                   D
///     /   \              /     \
///    A     F            B       F
///        /   \    =>   / \     / \
///       D     G       A   C   E   G
///      / \
///     C   E
/// ```
/// (drawn for `dir == Right`).  `third` is the side of D that was the taller
/// one before the rotation, if any; it decides which of B and F ends up heavy.
pub(super) fn rotate3<K, V>(
    root: &mut Link<K, V>,
    dir: Dir,
    third: Option<Dir>,
) {
    let mut b = take_node(root);
    let mut f = take_node(&mut b.links[dir]);
    let mut d = take_node(&mut f.links[!dir]);
    trace!(?dir, ?third, "three-point rotation");

    b.links[dir] = d.links[!dir].take();
    f.links[!dir] = d.links[dir].take();

    b.balance = Balance::Balanced;
    f.balance = Balance::Balanced;
    d.balance = Balance::Balanced;
    match third {
        None => {}
        Some(t) if t == dir => b.balance = Balance::Heavy(!dir),
        Some(_) => f.balance = Balance::Heavy(dir),
    }

    d.links[!dir] = Some(b);
    d.links[dir] = Some(f);
    *root = Some(d);
}
