/// A one-based rank into the sorted order of a set.
///
/// `Rank(1)` is the smallest key and `Rank(set.len())` the largest.
///
/// # Examples
///
/// ```
/// use osavl_tree::{OSAvlSet, Rank};
///
/// let set = OSAvlSet::from(["a", "b", "c"]);
///
/// assert_eq!(set[Rank(1)], "a");
/// assert_eq!(set[Rank(3)], "c");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
