use core::borrow::Borrow;
use core::ops::Index;

use super::OSAvlSet;
use crate::{Error, Rank};

impl<T> OSAvlSet<T> {
    /// Returns the key at one-based position `index` in sorted order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] unless `1 <= index <= len`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use osavl_tree::{Error, OSAvlSet};
    ///
    /// let set = OSAvlSet::from([10, 20, 30]);
    /// assert_eq!(set.select(1), Ok(&10));
    /// assert_eq!(set.select(3), Ok(&30));
    /// assert_eq!(set.select(0), Err(Error::IndexOutOfRange { index: 0, len: 3 }));
    /// assert_eq!(set.select(4), Err(Error::IndexOutOfRange { index: 4, len: 3 }));
    /// ```
    pub fn select(&self, index: usize) -> Result<&T, Error> {
        self.raw.select(index).map(|handle| self.raw.key(handle))
    }
}

impl<T: Ord> OSAvlSet<T> {
    /// Returns the one-based position of `value` in sorted order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if `value` is not present.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use osavl_tree::{Error, OSAvlSet};
    ///
    /// let set = OSAvlSet::from([10, 20]);
    /// assert_eq!(set.rank(&20), Ok(2));
    /// assert_eq!(set.rank(&15), Err(Error::KeyNotFound));
    /// ```
    pub fn rank<Q>(&self, value: &Q) -> Result<usize, Error>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.find(value).map(|handle| self.raw.rank(handle)).ok_or(Error::KeyNotFound)
    }

    /// Returns the number of stored keys strictly less than `value`.
    ///
    /// `value` itself need not be present.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use osavl_tree::OSAvlSet;
    ///
    /// let set = OSAvlSet::from([1, 5, 6, 9]);
    /// assert_eq!(set.count_less_than(&6), 2);
    /// assert_eq!(set.count_less_than(&7), 3);
    /// assert_eq!(set.count_less_than(&0), 0);
    /// assert_eq!(set.count_less_than(&100), 4);
    /// ```
    #[must_use]
    pub fn count_less_than<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.count_less_than(value)
    }
}

/// Indexes into the set by one-based rank.
///
/// # Panics
///
/// Panics if `rank` is not in `1..=len`.
///
/// # Examples
///
/// ```
/// use osavl_tree::{OSAvlSet, Rank};
///
/// let set = OSAvlSet::from([10, 20, 30]);
/// assert_eq!(set[Rank(2)], 20);
/// ```
impl<T> Index<Rank> for OSAvlSet<T> {
    type Output = T;

    fn index(&self, rank: Rank) -> &Self::Output {
        self.select(rank.0).expect("rank out of bounds")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use crate::{Error, OSAvlSet, Rank};

    #[test]
    fn select_and_rank_agree() {
        let set: OSAvlSet<u32> = (0..64).map(|k| k * 3).collect();
        for index in 1..=set.len() {
            let key = set.select(index).unwrap();
            assert_eq!(set.rank(key), Ok(index));
            assert_eq!(set.count_less_than(key), index - 1);
        }
        assert_eq!(set.rank(&1), Err(Error::KeyNotFound));
    }

    #[test]
    fn select_on_empty_set() {
        let set: OSAvlSet<u32> = OSAvlSet::new();
        assert_eq!(set.select(1), Err(Error::IndexOutOfRange { index: 1, len: 0 }));
        assert_eq!(set.count_less_than(&7), 0);
    }

    #[test]
    #[should_panic(expected = "rank out of bounds")]
    fn index_by_rank_zero_panics() {
        let set = OSAvlSet::from([1]);
        let _ = set[Rank(0)];
    }
}
