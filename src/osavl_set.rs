use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::ops::{Bound, RangeBounds};

use crate::Error;
use crate::raw::{Handle, RawAvlTree};

mod capacity;
mod cursor;
mod order_statistic;

pub use cursor::{Cursor, Position};

/// An ordered set based on an AVL tree with subtree-size augmentation.
///
/// Besides the usual ordered-set operations, every node caches the size of its
/// subtree, so [`select`](OSAvlSet::select), [`rank`](OSAvlSet::rank) and
/// [`count_less_than`](OSAvlSet::count_less_than) run in O(log n).
///
/// Keys are unique: inserting a key that compares equal to a stored one fails with
/// [`Error::DuplicateKey`] and leaves the set unchanged.
///
/// It is a logic error for a key to be modified in such a way that its ordering
/// relative to any other key, as determined by the [`Ord`] trait, changes while it is
/// in the set. The behavior resulting from such a logic error is not specified, but
/// will not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use osavl_tree::{Error, OSAvlSet};
///
/// let mut set = OSAvlSet::new();
/// for key in [5, 1, 9, 3] {
///     set.insert(key).unwrap();
/// }
/// assert_eq!(set.insert(3).unwrap_err(), Error::DuplicateKey);
///
/// // One-based order statistics.
/// assert_eq!(set.select(2), Ok(&3));
/// assert_eq!(set.rank(&9), Ok(4));
/// assert_eq!(set.count_less_than(&6), 3);
///
/// let keys: Vec<_> = set.iter().copied().collect();
/// assert_eq!(keys, [1, 3, 5, 9]);
/// ```
pub struct OSAvlSet<T> {
    raw: RawAvlTree<T>,
}

/// An iterator over the keys of an `OSAvlSet`, in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`OSAvlSet`].
///
/// [`iter`]: OSAvlSet::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T: 'a> {
    // `None` only for a default-constructed, empty iterator.
    tree: Option<&'a RawAvlTree<T>>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

/// An owning iterator over the keys of an `OSAvlSet`, in ascending order.
///
/// This `struct` is created by the [`into_iter`] method on [`OSAvlSet`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: OSAvlSet#method.into_iter
pub struct IntoIter<T> {
    tree: RawAvlTree<T>,
}

/// An iterator over a sub-range of keys in an `OSAvlSet`.
///
/// This `struct` is created by the [`range`] method on [`OSAvlSet`].
///
/// [`range`]: OSAvlSet::range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, T: 'a> {
    inner: Iter<'a, T>,
}

impl<T> OSAvlSet<T> {
    /// Makes a new, empty `OSAvlSet`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use osavl_tree::OSAvlSet;
    ///
    /// let set: OSAvlSet<i32> = OSAvlSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[must_use]
    pub const fn new() -> OSAvlSet<T> {
        OSAvlSet { raw: RawAvlTree::new() }
    }

    /// Returns the number of keys in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the set contains no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the set, removing all keys.
    ///
    /// Every node lives in one arena, so this releases the whole tree in one step
    /// regardless of its depth.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns a reference to the smallest key, or `None` if the set is empty.
    ///
    /// # Complexity
    ///
    /// O(1); the minimum is cached.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.raw.first().map(|handle| self.raw.key(handle))
    }

    /// Returns a reference to the largest key, or `None` if the set is empty.
    ///
    /// # Complexity
    ///
    /// O(1); the maximum is cached.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.raw.last().map(|handle| self.raw.key(handle))
    }

    /// Removes and returns the smallest key, if any.
    pub fn pop_first(&mut self) -> Option<T> {
        self.raw.pop_first()
    }

    /// Removes and returns the largest key, if any.
    pub fn pop_last(&mut self) -> Option<T> {
        self.raw.pop_last()
    }

    /// Removes the key at `position` and returns it.
    ///
    /// Returns `None` and does nothing when `position` is the end position. Positions of
    /// all other keys stay valid, even if the erase rebalanced the tree.
    ///
    /// # Panics
    ///
    /// May panic if the key at `position` was already removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use osavl_tree::OSAvlSet;
    ///
    /// let mut set = OSAvlSet::from([1, 2, 3, 4]);
    /// let two = set.find(&2).position();
    /// let four = set.find(&4).position();
    ///
    /// assert_eq!(set.erase_at(two), Some(2));
    /// assert_eq!(set.cursor_at(four).get(), Some(&4));
    /// assert_eq!(set.erase_at(set.end().position()), None);
    /// ```
    pub fn erase_at(&mut self, position: Position) -> Option<T> {
        position.handle().map(|handle| self.raw.remove(handle))
    }

    /// Returns a cursor at the smallest key, or at the end if the set is empty.
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(&self.raw, self.raw.first())
    }

    /// Returns a cursor at the end position, one past the largest key.
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(&self.raw, None)
    }

    /// Returns a cursor at the largest key, or at the end if the set is empty.
    pub fn rbegin(&self) -> Cursor<'_, T> {
        Cursor::new(&self.raw, self.raw.last())
    }

    /// Returns the cursor that terminates a reverse walk.
    ///
    /// The end position sits on both sides of the sorted sequence, so this is the same
    /// position as [`end`](OSAvlSet::end): stepping back from the smallest key reaches it.
    pub fn rend(&self) -> Cursor<'_, T> {
        self.end()
    }

    /// Returns a cursor at a previously obtained position.
    ///
    /// # Panics
    ///
    /// Panics if the key at `position` has been removed and its slot not reused.
    pub fn cursor_at(&self, position: Position) -> Cursor<'_, T> {
        if let Some(handle) = position.handle() {
            assert!(self.raw.contains_handle(handle), "`OSAvlSet::cursor_at()` - position refers to a removed key");
        }
        Cursor::new(&self.raw, position.handle())
    }

    /// Gets an iterator that visits the keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use osavl_tree::OSAvlSet;
    ///
    /// let set = OSAvlSet::from([3, 1, 2]);
    /// let mut iter = set.iter();
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next_back(), Some(&3));
    /// assert_eq!(iter.next(), Some(&2));
    /// assert_eq!(iter.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            tree: Some(&self.raw),
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.raw.len(),
        }
    }
}

impl<T: Ord> OSAvlSet<T> {
    /// Adds a key to the set and returns a cursor at it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if an equal key is already present; the set is
    /// not modified.
    ///
    /// # Complexity
    ///
    /// O(log n), with at most one single or double rotation.
    ///
    /// # Examples
    ///
    /// ```
    /// use osavl_tree::{Error, OSAvlSet};
    ///
    /// let mut set = OSAvlSet::new();
    /// assert_eq!(set.insert(1).unwrap().get(), Some(&1));
    /// assert_eq!(set.insert(1).unwrap_err(), Error::DuplicateKey);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> Result<Cursor<'_, T>, Error> {
        let handle = self.raw.insert(value)?;
        Ok(Cursor::new(&self.raw, Some(handle)))
    }

    /// Removes the key equal to `value` and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if no such key is present; the set is not
    /// modified.
    ///
    /// # Complexity
    ///
    /// O(log n). Unlike insertion, an erase may rotate at several levels.
    pub fn erase<Q>(&mut self, value: &Q) -> Result<T, Error>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.erase(value)
    }

    /// Returns `true` if the set contains a key equal to `value`.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.find(value).is_some()
    }

    /// Returns a reference to the stored key equal to `value`, if any.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.find(value).map(|handle| self.raw.key(handle))
    }

    /// Returns a cursor at the key equal to `value`, or the end cursor if absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use osavl_tree::OSAvlSet;
    ///
    /// let set = OSAvlSet::from([10, 20]);
    /// assert_eq!(set.find(&20).get(), Some(&20));
    /// assert!(set.find(&15).is_end());
    /// ```
    pub fn find<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor::new(&self.raw, self.raw.find(value))
    }

    /// Returns a cursor at the first key not less than `value`.
    pub fn lower_bound<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor::new(&self.raw, self.raw.lower_bound(value))
    }

    /// Returns a cursor at the first key greater than `value`.
    pub fn upper_bound<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor::new(&self.raw, self.raw.upper_bound(value))
    }

    /// Returns the greatest key not greater than `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyContainer`] if every stored key is greater than `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use osavl_tree::{Error, OSAvlSet};
    ///
    /// let set = OSAvlSet::from([10, 20, 30]);
    /// assert_eq!(set.closest_left(&25), Ok(&20));
    /// assert_eq!(set.closest_left(&20), Ok(&20));
    /// assert_eq!(set.closest_left(&5), Err(Error::EmptyContainer));
    /// ```
    pub fn closest_left<Q>(&self, value: &Q) -> Result<&T, Error>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.closest_left(value).map(|handle| self.raw.key(handle)).ok_or(Error::EmptyContainer)
    }

    /// Returns the least key greater than `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyContainer`] if no stored key is greater than `value`.
    pub fn closest_right<Q>(&self, value: &Q) -> Result<&T, Error>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.upper_bound(value).map(|handle| self.raw.key(handle)).ok_or(Error::EmptyContainer)
    }

    /// Constructs a double-ended iterator over a sub-range of keys.
    ///
    /// A range whose start lies after its end yields nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use osavl_tree::OSAvlSet;
    ///
    /// let set: OSAvlSet<i32> = (1..=10).collect();
    /// let evens: Vec<_> = set.range(4..8).copied().collect();
    /// assert_eq!(evens, [4, 5, 6, 7]);
    /// assert_eq!(set.range(2..=3).len(), 2);
    /// ```
    pub fn range<K, R>(&self, range: R) -> Range<'_, T>
    where
        K: ?Sized + Ord,
        T: Borrow<K>,
        R: RangeBounds<K>,
    {
        let raw = &self.raw;
        let front = match range.start_bound() {
            Bound::Included(start) => raw.lower_bound(start),
            Bound::Excluded(start) => raw.upper_bound(start),
            Bound::Unbounded => raw.first(),
        };
        let back = match range.end_bound() {
            Bound::Included(end) => raw.closest_left(end),
            Bound::Excluded(end) => raw.lower_bound(end).map_or(raw.last(), |bound| raw.predecessor(bound)),
            Bound::Unbounded => raw.last(),
        };

        let remaining = match (front, back) {
            (Some(front), Some(back)) => {
                let (first, last) = (raw.rank(front), raw.rank(back));
                if first <= last { last - first + 1 } else { 0 }
            }
            _ => 0,
        };

        Range {
            inner: Iter {
                tree: Some(raw),
                front,
                back,
                remaining,
            },
        }
    }
}

impl<T: Clone> Clone for OSAvlSet<T> {
    fn clone(&self) -> Self {
        OSAvlSet { raw: self.raw.clone() }
    }
}

impl<T: fmt::Debug> fmt::Debug for OSAvlSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> Default for OSAvlSet<T> {
    fn default() -> Self {
        OSAvlSet::new()
    }
}

impl<T: PartialEq> PartialEq for OSAvlSet<T> {
    fn eq(&self, other: &OSAvlSet<T>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for OSAvlSet<T> {}

impl<T: Hash> Hash for OSAvlSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for key in self {
            key.hash(state);
        }
    }
}

impl<T: PartialOrd> PartialOrd for OSAvlSet<T> {
    fn partial_cmp(&self, other: &OSAvlSet<T>) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for OSAvlSet<T> {
    fn cmp(&self, other: &OSAvlSet<T>) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

/// Duplicate keys in the source are skipped.
impl<T: Ord> FromIterator<T> for OSAvlSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = OSAvlSet::new();
        set.extend(iter);
        set
    }
}

impl<T: Ord> Extend<T> for OSAvlSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            // Keys already present are left as they are.
            let _ = self.raw.insert(value);
        }
    }
}

impl<'a, T: 'a + Ord + Copy> Extend<&'a T> for OSAvlSet<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for OSAvlSet<T> {
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<T> IntoIterator for OSAvlSet<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Gets an iterator for moving out the set's keys in ascending order.
    fn into_iter(self) -> IntoIter<T> {
        IntoIter { tree: self.raw }
    }
}

impl<'a, T> IntoIterator for &'a OSAvlSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let (tree, handle) = (self.tree?, self.front?);
        self.remaining -= 1;
        self.front = tree.successor(handle);
        Some(tree.key(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let (tree, handle) = (self.tree?, self.back?);
        self.remaining -= 1;
        self.back = tree.predecessor(handle);
        Some(tree.key(handle))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<T> Default for Iter<'_, T> {
    /// Creates an empty `osavl_set::Iter`.
    ///
    /// ```
    /// # use osavl_tree::osavl_set;
    /// let iter: osavl_set::Iter<'_, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        Iter {
            tree: None,
            front: None,
            back: None,
            remaining: 0,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.tree.pop_first()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tree.len(), Some(self.tree.len()))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.tree.pop_last()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.tree.len()
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter").field("remaining", &self.tree.len()).finish()
    }
}

impl<'a, T> Iterator for Range<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }
}

impl<'a, T> DoubleEndedIterator for Range<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for Range<'_, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for Range<'_, T> {}

impl<T> Clone for Range<'_, T> {
    fn clone(&self) -> Self {
        Range {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for Range<'_, T> {
    /// Creates an empty `osavl_set::Range`.
    ///
    /// ```
    /// # use osavl_tree::osavl_set;
    /// let iter: osavl_set::Range<'_, u8> = Default::default();
    /// assert_eq!(iter.count(), 0);
    /// ```
    fn default() -> Self {
        Range { inner: Iter::default() }
    }
}

impl<T: fmt::Debug> fmt::Debug for Range<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
