use avltree::AvlTree;
use proptest::prelude::*;
use std::ops::Bound;

#[allow(dead_code)]
pub(super) fn assert_eq_iters<I: Iterator, J: Iterator<Item = I::Item>>(
    mut i: I,
    mut j: J,
) where
    I::Item: std::fmt::Debug + Eq, // same inferred for J::Item
{
    loop {
        match (i.next(), j.next()) {
            (None, None) => return,
            (a, b) => assert_eq!(a, b),
        }
    }
}

// Routes the tree's trace events to the test output; set RUST_LOG to see them.
#[allow(dead_code)]
pub(super) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Builds a tree from the pairs, keeping the first value seen for each key.
#[allow(dead_code)]
pub(super) fn tree_from<K: Ord, V>(
    pairs: impl IntoIterator<Item = (K, V)>,
) -> AvlTree<K, V> {
    let mut t = AvlTree::ordered();
    for (k, v) in pairs {
        let _ = t.insert(k, v);
    }
    t
}

#[allow(dead_code)]
pub(super) fn chk<K, V, C>(t: &AvlTree<K, V, C>)
where
    C: Fn(&K, &K) -> std::cmp::Ordering,
{
    if let Err(e) = t.check() {
        panic!("tree invariant violated: {e}");
    }
}

#[allow(dead_code)]
pub(super) type SmallIntPairs = Vec<(u16, u16)>;

#[allow(dead_code)]
pub(super) fn small_int_pairs() -> impl Strategy<Value = SmallIntPairs> {
    prop::collection::vec((0u16..1024u16, 0u16..1024u16), 0..512)
}

#[allow(dead_code)]
pub(super) fn string_u16_pairs() -> impl Strategy<Value = Vec<(String, u16)>> {
    prop::collection::vec(("[a-z]{0,2}", 0u16..1024u16), 0..512)
}

// Pairs of bounds with the lower one never above the upper one.
#[allow(dead_code)]
pub(super) fn range_bounds_1k(
) -> impl Strategy<Value = (Bound<u16>, Bound<u16>)> {
    use Bound::*;

    (1u16..1023)
        .prop_flat_map(|n| {
            (
                prop_oneof![
                    Just(Bound::Unbounded),
                    (0u16..=n).prop_map(Bound::Excluded),
                    (0u16..=n).prop_map(Bound::Included),
                ],
                prop_oneof![
                    Just(Bound::Unbounded),
                    (n..1024).prop_map(Bound::Excluded),
                    (n..1024).prop_map(Bound::Included),
                ],
            )
        })
        .prop_map(|(lb, ub)| match (lb, ub) {
            // std panics on this one
            (Excluded(x), Excluded(y)) if x == y => (Included(x), Excluded(y)),
            xy => xy,
        })
}

// Optional inclusive bounds in 0..1024, in either order.
#[allow(dead_code)]
pub(super) fn opt_bounds_1k() -> impl Strategy<Value = (Option<u16>, Option<u16>)>
{
    (
        prop::option::of(0u16..1024),
        prop::option::of(0u16..1024),
    )
}
