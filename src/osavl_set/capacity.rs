use super::OSAvlSet;
use crate::raw::RawAvlTree;

impl<T> OSAvlSet<T> {
    /// Creates an empty set with node storage for at least `capacity` keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use osavl_tree::OSAvlSet;
    ///
    /// let set: OSAvlSet<i32> = OSAvlSet::with_capacity(16);
    /// assert!(set.is_empty());
    /// assert!(set.capacity() >= 16);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        OSAvlSet {
            raw: RawAvlTree::with_capacity(capacity),
        }
    }

    /// Returns the number of keys the set can hold without reallocating.
    ///
    /// Slots freed by erasures are reused before the storage grows.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use crate::OSAvlSet;

    #[test]
    fn erased_slots_are_reused() {
        let mut set = OSAvlSet::with_capacity(4);
        for key in 0..4 {
            set.insert(key).unwrap();
        }
        let capacity = set.capacity();
        set.erase(&1).unwrap();
        set.erase(&2).unwrap();
        set.insert(10).unwrap();
        set.insert(11).unwrap();
        assert_eq!(set.capacity(), capacity);
        assert_eq!(set.len(), 4);
    }
}
