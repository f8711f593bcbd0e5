/// Failures reported by the fallible [`AvlTree`](crate::AvlTree) operations.
///
/// Every failure leaves the tree exactly as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// `insert` was given a key that compares equal to a stored key.
    #[error("the tree already contains the key")]
    DuplicateKey,

    /// `remove` was given a key that is not stored in the tree.
    #[error("the key is not in the tree")]
    KeyNotFound,

    /// A ranged walk was given a lower bound greater than its upper bound.
    #[error("the range's lower bound is greater than its upper bound")]
    InvalidRange,
}

/// An invariant violation found by [`AvlTree::check`](crate::AvlTree::check).
///
/// Normal use of the tree never produces these; seeing one means the
/// comparator is not a total order or the tree has a bug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    #[error("in-order walk is not strictly increasing at position {position}")]
    OutOfOrder { position: usize },

    #[error("sibling subtree heights {left} and {right} differ by more than one")]
    Unbalanced { left: usize, right: usize },

    #[error("balance tag `{tag}` disagrees with heights {left} and {right}")]
    StaleTag {
        tag: &'static str,
        left: usize,
        right: usize,
    },

    #[error("tree caches length {cached} but {counted} nodes are reachable")]
    LenMismatch { cached: usize, counted: usize },
}
