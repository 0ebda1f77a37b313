use super::handle::Handle;

/// Which child slot of a parent a node occupies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// The balance-factor delta caused by growing this side by one level.
    #[inline]
    pub(crate) const fn lean(self) -> i8 {
        match self {
            Side::Left => -1,
            Side::Right => 1,
        }
    }
}

/// An AVL node.
///
/// Children are owned by the arena, not by the node; `parent` is a lookup-only
/// back-link and is `None` exactly for the root.
#[derive(Clone, Debug)]
pub(crate) struct AvlNode<K> {
    key: K,
    // height(right) - height(left). Only ever +-2 transiently inside a fix-up.
    balance: i8,
    // Number of nodes in the subtree rooted here, including this one.
    size: usize,
    parent: Option<Handle>,
    left: Option<Handle>,
    right: Option<Handle>,
}

impl<K> AvlNode<K> {
    /// Creates a detached leaf.
    pub(crate) const fn leaf(key: K) -> Self {
        Self {
            key,
            balance: 0,
            size: 1,
            parent: None,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub(crate) const fn key(&self) -> &K {
        &self.key
    }

    pub(crate) fn into_key(self) -> K {
        self.key
    }

    #[inline]
    pub(crate) const fn balance(&self) -> i8 {
        self.balance
    }

    #[inline]
    pub(crate) fn set_balance(&mut self, balance: i8) {
        self.balance = balance;
    }

    #[inline]
    pub(crate) const fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub(crate) fn set_size(&mut self, size: usize) {
        self.size = size;
    }

    #[inline]
    pub(crate) const fn parent(&self) -> Option<Handle> {
        self.parent
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) const fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) const fn right(&self) -> Option<Handle> {
        self.right
    }

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    /// Returns which side `child` hangs from, or `None` if it is not a child of this node.
    pub(crate) fn side_of(&self, child: Handle) -> Option<Side> {
        if self.left == Some(child) {
            Some(Side::Left)
        } else if self.right == Some(child) {
            Some(Side::Right)
        } else {
            None
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn leaf_starts_balanced_and_detached() {
        let node = AvlNode::leaf(3);
        assert_eq!(*node.key(), 3);
        assert_eq!(node.balance(), 0);
        assert_eq!(node.size(), 1);
        assert!(node.parent().is_none());
        assert!(node.left().is_none() && node.right().is_none());
    }

    #[test]
    fn side_of_identifies_children() {
        let mut node = AvlNode::leaf('m');
        let left = Handle::from_index(1);
        let right = Handle::from_index(2);
        node.set_child(Side::Left, Some(left));
        node.set_child(Side::Right, Some(right));

        assert_eq!(node.side_of(left), Some(Side::Left));
        assert_eq!(node.side_of(right), Some(Side::Right));
        assert_eq!(node.side_of(Handle::from_index(3)), None);
        assert_eq!(node.child(Side::Right), Some(right));
        assert_eq!(Side::Left.lean(), -1);
        assert_eq!(Side::Right.lean(), 1);
        assert_eq!(Side::Left.opposite(), Side::Right);
    }
}
