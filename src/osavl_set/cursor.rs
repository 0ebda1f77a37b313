use core::fmt;

use crate::raw::{Handle, RawAvlTree};

/// A detached position in an [`OSAvlSet`](crate::OSAvlSet): either a stored key or
/// the end position.
///
/// Unlike a [`Cursor`], a `Position` does not borrow the set, so it can be held across
/// mutations. Inserting or erasing *other* keys never moves it, even when the tree
/// rotates. Once its own key is erased the position is stale, and using it is a logic
/// error.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct Position(Option<Handle>);

impl Position {
    pub(crate) const fn handle(self) -> Option<Handle> {
        self.0
    }

    /// Returns `true` if this is the end position.
    #[must_use]
    pub const fn is_end(self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(handle) => f.debug_tuple("Position").field(&handle).finish(),
            None => f.write_str("Position(End)"),
        }
    }
}

/// A read-only bidirectional cursor over an [`OSAvlSet`](crate::OSAvlSet).
///
/// The cursor points at a key or at the end position, a "ghost" that sits between the
/// largest and the smallest key. Moving forward from the largest key reaches the ghost,
/// and moving forward again wraps to the smallest key; moving backward mirrors this.
///
/// Each step costs O(1) amortized and O(log n) in the worst case.
///
/// # Examples
///
/// ```
/// use osavl_tree::OSAvlSet;
///
/// let set = OSAvlSet::from([1, 2, 3]);
/// let mut cursor = set.begin();
/// assert_eq!(cursor.get(), Some(&1));
/// cursor.move_next();
/// assert_eq!(cursor.get(), Some(&2));
///
/// let mut cursor = set.end();
/// cursor.move_prev();
/// assert_eq!(cursor.get(), Some(&3));
/// ```
pub struct Cursor<'a, T: 'a> {
    tree: &'a RawAvlTree<T>,
    current: Option<Handle>,
}

impl<'a, T> Cursor<'a, T> {
    pub(crate) const fn new(tree: &'a RawAvlTree<T>, current: Option<Handle>) -> Self {
        Self { tree, current }
    }

    /// Returns the key under the cursor, or `None` at the end position.
    #[must_use]
    pub fn get(&self) -> Option<&'a T> {
        let tree = self.tree;
        self.current.map(|handle| tree.key(handle))
    }

    /// Returns the detached position of this cursor.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position(self.current)
    }

    /// Returns `true` if the cursor is at the end position.
    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Moves to the next key in ascending order.
    pub fn move_next(&mut self) {
        self.current = self.next_handle();
    }

    /// Moves to the previous key in ascending order.
    pub fn move_prev(&mut self) {
        self.current = self.prev_handle();
    }

    /// Returns the key the cursor would reach with [`move_next`](Cursor::move_next).
    #[must_use]
    pub fn peek_next(&self) -> Option<&'a T> {
        let tree = self.tree;
        self.next_handle().map(|handle| tree.key(handle))
    }

    /// Returns the key the cursor would reach with [`move_prev`](Cursor::move_prev).
    #[must_use]
    pub fn peek_prev(&self) -> Option<&'a T> {
        let tree = self.tree;
        self.prev_handle().map(|handle| tree.key(handle))
    }

    fn next_handle(&self) -> Option<Handle> {
        match self.current {
            Some(handle) => self.tree.successor(handle),
            None => self.tree.first(),
        }
    }

    fn prev_handle(&self) -> Option<Handle> {
        match self.current {
            Some(handle) => self.tree.predecessor(handle),
            None => self.tree.last(),
        }
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.tree, other.tree) && self.current == other.current
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.get()).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use crate::OSAvlSet;
    use alloc::format;
    use alloc::vec::Vec;

    #[test]
    fn ghost_wraps_in_both_directions() {
        let set = OSAvlSet::from([1, 2, 3]);

        let mut cursor = set.rbegin();
        cursor.move_next();
        assert!(cursor.is_end());
        cursor.move_next();
        assert_eq!(cursor.get(), Some(&1));

        cursor.move_prev();
        assert_eq!(cursor, set.rend());
        cursor.move_prev();
        assert_eq!(cursor.get(), Some(&3));
    }

    #[test]
    fn empty_set_cursors_are_all_end() {
        let set: OSAvlSet<i32> = OSAvlSet::new();
        assert!(set.begin().is_end());
        assert!(set.rbegin().is_end());
        assert_eq!(set.begin(), set.end());

        let mut cursor = set.end();
        cursor.move_next();
        assert!(cursor.is_end());
        assert_eq!(cursor.peek_prev(), None);
    }

    #[test]
    fn walking_forward_visits_sorted_keys() {
        let set: OSAvlSet<u8> = [9, 4, 7, 1, 3].into_iter().collect();
        let mut keys = Vec::new();
        let mut cursor = set.begin();
        while let Some(key) = cursor.get() {
            assert_eq!(cursor.peek_next().copied(), set.upper_bound(key).get().copied());
            keys.push(*key);
            cursor.move_next();
        }
        assert_eq!(keys, [1, 3, 4, 7, 9]);
    }

    #[test]
    fn debug_output() {
        let set = OSAvlSet::from([5]);
        assert_eq!(format!("{:?}", set.begin()), "Cursor(Some(5))");
        assert_eq!(format!("{:?}", set.end().position()), "Position(End)");
        assert_eq!(format!("{:?}", set.begin().position()), "Position(#0)");
    }
}
