use core::borrow::Borrow;
use core::cmp::Ordering;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{AvlNode, Side};
use crate::Error;

/// The core AVL tree backing `OSAvlSet`.
#[derive(Clone)]
pub(crate) struct RawAvlTree<K> {
    /// Arena storing all tree nodes.
    nodes: Arena<AvlNode<K>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Handle to the minimum node, for O(1) `begin()`.
    leftmost: Option<Handle>,
    /// Handle to the maximum node, for O(1) `rbegin()`.
    rightmost: Option<Handle>,
}

/// Result of descending the tree towards a key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SearchResult {
    /// The key is stored at this node.
    Found(Handle),
    /// The key is absent. It would be linked on `side` of `parent`, or become the
    /// root when `parent` is `None`.
    Vacant { parent: Option<Handle>, side: Side },
}

impl<K> RawAvlTree<K> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            leftmost: None,
            rightmost: None,
        }
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            ..Self::new()
        }
    }

    /// Returns the number of keys in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree contains no keys.
    pub(crate) const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Drops every node at once.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.leftmost = None;
        self.rightmost = None;
    }

    pub(crate) const fn first(&self) -> Option<Handle> {
        self.leftmost
    }

    pub(crate) const fn last(&self) -> Option<Handle> {
        self.rightmost
    }

    /// Returns true if `handle` addresses a live node.
    pub(crate) fn contains_handle(&self, handle: Handle) -> bool {
        self.nodes.contains(handle)
    }

    #[inline]
    pub(crate) fn key(&self, handle: Handle) -> &K {
        self.nodes.get(handle).key()
    }

    #[inline]
    fn node(&self, handle: Handle) -> &AvlNode<K> {
        self.nodes.get(handle)
    }

    #[inline]
    fn node_mut(&mut self, handle: Handle) -> &mut AvlNode<K> {
        self.nodes.get_mut(handle)
    }

    #[inline]
    fn size_of(&self, handle: Option<Handle>) -> usize {
        handle.map_or(0, |h| self.node(h).size())
    }

    fn child_of(&self, handle: Handle, side: Side) -> Handle {
        self.node(handle).child(side).expect("`RawAvlTree::child_of()` - missing child during rebalance!")
    }

    fn side_in_parent(&self, parent: Handle, child: Handle) -> Side {
        self.node(parent)
            .side_of(child)
            .expect("`RawAvlTree::side_in_parent()` - node is not a child of its parent!")
    }

    /// Recomputes a node's size from its children's cached sizes.
    fn refresh_size(&mut self, handle: Handle) {
        let node = self.node(handle);
        let size = 1 + self.size_of(node.left()) + self.size_of(node.right());
        self.node_mut(handle).set_size(size);
    }

    /// Points the slot that held `old` (a child of `parent`, or the root) at `new`.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let side = self.side_in_parent(parent, old);
                self.node_mut(parent).set_child(side, new);
            }
        }
    }

    fn minimum(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.node(handle).left() {
            handle = left;
        }
        handle
    }

    fn maximum(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.node(handle).right() {
            handle = right;
        }
        handle
    }

    /// Returns the in-order successor of `handle`, or `None` past the maximum.
    pub(crate) fn successor(&self, handle: Handle) -> Option<Handle> {
        if let Some(right) = self.node(handle).right() {
            return Some(self.minimum(right));
        }

        let mut current = handle;
        while let Some(parent) = self.node(current).parent() {
            if self.node(parent).left() == Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// Returns the in-order predecessor of `handle`, or `None` before the minimum.
    pub(crate) fn predecessor(&self, handle: Handle) -> Option<Handle> {
        if let Some(left) = self.node(handle).left() {
            return Some(self.maximum(left));
        }

        let mut current = handle;
        while let Some(parent) = self.node(current).parent() {
            if self.node(parent).right() == Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    // ─── Rotation primitives ────────────────────────────────────────────────

    /// Lifts the child on `pivot_side` of `node` into `node`'s slot and returns it.
    ///
    /// Only links and the two affected sizes change; balance factors are left to the
    /// caller because they depend on which case triggered the rotation.
    fn rotate(&mut self, node: Handle, pivot_side: Side) -> Handle {
        let inner_side = pivot_side.opposite();
        let pivot = self.child_of(node, pivot_side);
        let middle = self.node(pivot).child(inner_side);
        let parent = self.node(node).parent();

        self.node_mut(node).set_child(pivot_side, middle);
        if let Some(middle) = middle {
            self.node_mut(middle).set_parent(Some(node));
        }

        self.node_mut(pivot).set_parent(parent);
        self.replace_child(parent, node, Some(pivot));

        self.node_mut(pivot).set_child(inner_side, Some(node));
        self.node_mut(node).set_parent(Some(pivot));

        // `node` is now below `pivot`, so it must be refreshed first.
        self.refresh_size(node);
        self.refresh_size(pivot);

        #[cfg(feature = "tracing")]
        tracing::trace!(?node, ?pivot, ?pivot_side, "rotate");

        pivot
    }

    fn rotate_left(&mut self, node: Handle) -> Handle {
        self.rotate(node, Side::Right)
    }

    fn rotate_right(&mut self, node: Handle) -> Handle {
        self.rotate(node, Side::Left)
    }

    /// Rotates `node.left` left, then `node` right. Returns the new subtree root.
    fn rotate_left_right(&mut self, node: Handle) -> Handle {
        let left = self.child_of(node, Side::Left);
        let inner = self.child_of(left, Side::Right);
        let inner_balance = self.node(inner).balance();

        self.rotate_left(left);
        let pivot = self.rotate_right(node);
        self.set_double_rotation_balances(pivot, left, node, inner_balance);
        pivot
    }

    /// Rotates `node.right` right, then `node` left. Returns the new subtree root.
    fn rotate_right_left(&mut self, node: Handle) -> Handle {
        let right = self.child_of(node, Side::Right);
        let inner = self.child_of(right, Side::Left);
        let inner_balance = self.node(inner).balance();

        self.rotate_right(right);
        let pivot = self.rotate_left(node);
        self.set_double_rotation_balances(pivot, node, right, inner_balance);
        pivot
    }

    /// After a double rotation the old inner grandchild is the subtree root with
    /// `left` and `right` below it; their factors follow from its old factor alone.
    fn set_double_rotation_balances(&mut self, pivot: Handle, left: Handle, right: Handle, inner_balance: i8) {
        let (left_balance, right_balance) = match inner_balance {
            -1 => (0, 1),
            1 => (-1, 0),
            0 => (0, 0),
            other => unreachable!("`RawAvlTree::set_double_rotation_balances()` - unexpected balance factor {other}"),
        };
        self.node_mut(pivot).set_balance(0);
        self.node_mut(left).set_balance(left_balance);
        self.node_mut(right).set_balance(right_balance);
    }

    /// Repairs a node whose left subtree outgrew its right by two after an insert.
    fn fix_left_imbalance_insert(&mut self, node: Handle) -> Handle {
        let left = self.child_of(node, Side::Left);
        let left_balance = self.node(left).balance();
        debug_assert!(left_balance != 0, "`fix_left_imbalance_insert()` - grown child cannot be balanced");

        if left_balance < 0 {
            let pivot = self.rotate_right(node);
            self.node_mut(node).set_balance(0);
            self.node_mut(pivot).set_balance(0);
            pivot
        } else {
            self.rotate_left_right(node)
        }
    }

    /// Repairs a node whose right subtree outgrew its left by two after an insert.
    fn fix_right_imbalance_insert(&mut self, node: Handle) -> Handle {
        let right = self.child_of(node, Side::Right);
        let right_balance = self.node(right).balance();
        debug_assert!(right_balance != 0, "`fix_right_imbalance_insert()` - grown child cannot be balanced");

        if right_balance > 0 {
            let pivot = self.rotate_left(node);
            self.node_mut(node).set_balance(0);
            self.node_mut(pivot).set_balance(0);
            pivot
        } else {
            self.rotate_right_left(node)
        }
    }

    /// Repairs a node left-heavy by two after its right subtree shrank.
    ///
    /// Returns the new subtree root and whether the subtree got shorter.
    fn fix_left_imbalance_erase(&mut self, node: Handle) -> (Handle, bool) {
        let left = self.child_of(node, Side::Left);
        match self.node(left).balance() {
            -1 => {
                let pivot = self.rotate_right(node);
                self.node_mut(node).set_balance(0);
                self.node_mut(pivot).set_balance(0);
                (pivot, true)
            }
            0 => {
                let pivot = self.rotate_right(node);
                self.node_mut(node).set_balance(-1);
                self.node_mut(pivot).set_balance(1);
                (pivot, false)
            }
            _ => (self.rotate_left_right(node), true),
        }
    }

    /// Repairs a node right-heavy by two after its left subtree shrank.
    ///
    /// Returns the new subtree root and whether the subtree got shorter.
    fn fix_right_imbalance_erase(&mut self, node: Handle) -> (Handle, bool) {
        let right = self.child_of(node, Side::Right);
        match self.node(right).balance() {
            1 => {
                let pivot = self.rotate_left(node);
                self.node_mut(node).set_balance(0);
                self.node_mut(pivot).set_balance(0);
                (pivot, true)
            }
            0 => {
                let pivot = self.rotate_left(node);
                self.node_mut(node).set_balance(1);
                self.node_mut(pivot).set_balance(-1);
                (pivot, false)
            }
            _ => (self.rotate_right_left(node), true),
        }
    }

    // ─── Rebalancing loops ──────────────────────────────────────────────────

    /// Walks up from `node`, whose `grown` subtree just got one level taller.
    fn rebalance_after_insert(&mut self, mut node: Handle, mut grown: Side) {
        loop {
            let balance = self.node(node).balance();
            let lean = grown.lean();

            if balance == -lean {
                // The shorter side caught up; height above is unchanged.
                self.node_mut(node).set_balance(0);
                return;
            }

            if balance == 0 {
                self.node_mut(node).set_balance(lean);
                match self.node(node).parent() {
                    Some(parent) => {
                        grown = self.side_in_parent(parent, node);
                        node = parent;
                    }
                    None => return,
                }
                continue;
            }

            self.node_mut(node).set_balance(balance + lean);
            #[cfg(feature = "tracing")]
            tracing::trace!(?node, ?grown, "rebalance after insert");
            match grown {
                Side::Left => self.fix_left_imbalance_insert(node),
                Side::Right => self.fix_right_imbalance_insert(node),
            };
            return;
        }
    }

    /// Walks up from `node`, whose `shrunk` subtree just got one level shorter.
    fn rebalance_after_erase(&mut self, mut node: Handle, mut shrunk: Side) {
        loop {
            let balance = self.node(node).balance();
            let lean = shrunk.lean();

            let (subtree, shorter) = if balance == 0 {
                // Only one side shrank; the subtree keeps its height.
                self.node_mut(node).set_balance(-lean);
                (node, false)
            } else if balance == lean {
                self.node_mut(node).set_balance(0);
                (node, true)
            } else {
                self.node_mut(node).set_balance(balance - lean);
                #[cfg(feature = "tracing")]
                tracing::trace!(?node, ?shrunk, "rebalance after erase");
                match shrunk {
                    Side::Left => self.fix_right_imbalance_erase(node),
                    Side::Right => self.fix_left_imbalance_erase(node),
                }
            };

            if !shorter {
                return;
            }
            match self.node(subtree).parent() {
                Some(parent) => {
                    shrunk = self.side_in_parent(parent, subtree);
                    node = parent;
                }
                None => return,
            }
        }
    }

    /// Grows or shrinks by one the size of `handle` and all of its ancestors.
    fn adjust_sizes_to_root(&mut self, mut handle: Option<Handle>, grow: bool) {
        while let Some(current) = handle {
            let node = self.node_mut(current);
            let size = if grow { node.size() + 1 } else { node.size() - 1 };
            node.set_size(size);
            handle = node.parent();
        }
    }

    // ─── Erase ──────────────────────────────────────────────────────────────

    /// Unlinks `target` from the tree, rebalances, and returns its key.
    ///
    /// A node with two children is replaced by relinking its in-order successor into
    /// its slot, so every other node keeps its handle (and any position pointing at it).
    pub(crate) fn remove(&mut self, target: Handle) -> K {
        if self.leftmost == Some(target) {
            self.leftmost = self.successor(target);
        }
        if self.rightmost == Some(target) {
            self.rightmost = self.predecessor(target);
        }

        let node = self.node(target);
        let (parent, left, right) = (node.parent(), node.left(), node.right());
        let (balance, size) = (node.balance(), node.size());

        // Where a subtree got one level shorter, for the rebalancing walk.
        let shortened: Option<(Handle, Side)> = match (left, right) {
            (Some(left), Some(right)) => {
                let successor = self.minimum(right);
                let start = if successor == right {
                    (successor, Side::Right)
                } else {
                    let successor_parent = self.node(successor).parent().expect("`RawAvlTree::remove()` - successor below `right` must have a parent!");
                    let successor_right = self.node(successor).right();
                    self.node_mut(successor_parent).set_child(Side::Left, successor_right);
                    if let Some(successor_right) = successor_right {
                        self.node_mut(successor_right).set_parent(Some(successor_parent));
                    }
                    self.node_mut(successor).set_child(Side::Right, Some(right));
                    self.node_mut(right).set_parent(Some(successor));
                    (successor_parent, Side::Left)
                };

                self.node_mut(successor).set_child(Side::Left, Some(left));
                self.node_mut(left).set_parent(Some(successor));
                self.node_mut(successor).set_parent(parent);
                self.replace_child(parent, target, Some(successor));

                let successor_node = self.node_mut(successor);
                successor_node.set_balance(balance);
                successor_node.set_size(size);
                Some(start)
            }
            (child, None) | (None, child) => {
                let side = parent.map(|parent| self.side_in_parent(parent, target));
                self.replace_child(parent, target, child);
                if let Some(child) = child {
                    self.node_mut(child).set_parent(parent);
                }
                parent.zip(side)
            }
        };

        if let Some((start, side)) = shortened {
            self.adjust_sizes_to_root(Some(start), false);
            self.rebalance_after_erase(start, side);
        }

        self.nodes.take(target).into_key()
    }

    /// Removes and returns the minimum key.
    pub(crate) fn pop_first(&mut self) -> Option<K> {
        let first = self.leftmost?;
        Some(self.remove(first))
    }

    /// Removes and returns the maximum key.
    pub(crate) fn pop_last(&mut self) -> Option<K> {
        let last = self.rightmost?;
        Some(self.remove(last))
    }

    // ─── Order statistics ───────────────────────────────────────────────────

    /// Returns the node at one-based sorted position `index`.
    pub(crate) fn select(&self, index: usize) -> Result<Handle, Error> {
        let len = self.len();
        if index == 0 || index > len {
            return Err(Error::IndexOutOfRange { index, len });
        }

        let mut remaining = index;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            let local_rank = self.size_of(node.left()) + 1;
            match remaining.cmp(&local_rank) {
                Ordering::Equal => return Ok(handle),
                Ordering::Less => current = node.left(),
                Ordering::Greater => {
                    remaining -= local_rank;
                    current = node.right();
                }
            }
        }

        unreachable!("`RawAvlTree::select()` - size cache disagrees with tree shape")
    }

    /// Returns the one-based sorted position of the node at `handle`.
    pub(crate) fn rank(&self, handle: Handle) -> usize {
        let mut rank = self.size_of(self.node(handle).left()) + 1;
        let mut current = handle;
        while let Some(parent) = self.node(current).parent() {
            let parent_node = self.node(parent);
            if parent_node.right() == Some(current) {
                rank += self.size_of(parent_node.left()) + 1;
            }
            current = parent;
        }
        rank
    }
}

impl<K: Ord> RawAvlTree<K> {
    /// Descends from the root towards `key`.
    pub(crate) fn search<Q>(&self, key: &Q) -> SearchResult
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut parent = None;
        let mut side = Side::Left;
        let mut current = self.root;

        while let Some(handle) = current {
            let node = self.node(handle);
            side = match key.cmp(node.key().borrow()) {
                Ordering::Equal => return SearchResult::Found(handle),
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };
            parent = Some(handle);
            current = node.child(side);
        }

        SearchResult::Vacant { parent, side }
    }

    pub(crate) fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.search(key) {
            SearchResult::Found(handle) => Some(handle),
            SearchResult::Vacant { .. } => None,
        }
    }

    /// Inserts `key` as a new leaf and rebalances. Fails, leaving the tree
    /// untouched, if an equal key is already stored.
    pub(crate) fn insert(&mut self, key: K) -> Result<Handle, Error> {
        let (parent, side) = match self.search(&key) {
            SearchResult::Found(_existing) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(existing = ?_existing, "insert rejected duplicate key");
                return Err(Error::DuplicateKey);
            }
            SearchResult::Vacant { parent, side } => (parent, side),
        };

        let handle = self.nodes.alloc(AvlNode::leaf(key));

        let Some(parent) = parent else {
            self.root = Some(handle);
            self.leftmost = Some(handle);
            self.rightmost = Some(handle);
            return Ok(handle);
        };

        self.node_mut(handle).set_parent(Some(parent));
        self.node_mut(parent).set_child(side, Some(handle));

        match side {
            Side::Left if self.leftmost == Some(parent) => self.leftmost = Some(handle),
            Side::Right if self.rightmost == Some(parent) => self.rightmost = Some(handle),
            _ => {}
        }

        self.adjust_sizes_to_root(Some(parent), true);
        self.rebalance_after_insert(parent, side);
        Ok(handle)
    }

    /// First node whose key is not less than `key`.
    pub(crate) fn lower_bound<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.descend_bound(|node_key| node_key.borrow().cmp(key) != Ordering::Less)
    }

    /// First node whose key is greater than `key`.
    pub(crate) fn upper_bound<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.descend_bound(|node_key| node_key.borrow().cmp(key) == Ordering::Greater)
    }

    /// Last node whose key is not greater than `key`.
    pub(crate) fn closest_left<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut bound = None;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            if node.key().borrow().cmp(key) != Ordering::Greater {
                bound = Some(handle);
                current = node.right();
            } else {
                current = node.left();
            }
        }
        bound
    }

    /// Lowest node for which `goes_left` holds, assuming it is monotone in key order.
    fn descend_bound(&self, goes_left: impl Fn(&K) -> bool) -> Option<Handle> {
        let mut bound = None;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            if goes_left(node.key()) {
                bound = Some(handle);
                current = node.left();
            } else {
                current = node.right();
            }
        }
        bound
    }

    /// Number of stored keys strictly less than `key`.
    pub(crate) fn count_less_than<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some(closest) = self.closest_left(key) else {
            return 0;
        };
        let rank = self.rank(closest);
        if self.key(closest).borrow().cmp(key) == Ordering::Equal { rank - 1 } else { rank }
    }

    /// Unlinks the node holding `key`, if any, and returns its key.
    pub(crate) fn erase<Q>(&mut self, key: &Q) -> Result<K, Error>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.find(key) {
            Some(handle) => Ok(self.remove(handle)),
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!("erase of a missing key");
                Err(Error::KeyNotFound)
            }
        }
    }
}
