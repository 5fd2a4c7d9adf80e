//! Order-statistics AVL tree
//!
//! A height-balanced binary search tree whose nodes also record the size of
//! their subtree, so that rank queries run in O(log n) next to the usual
//! ordered insert/remove/lookup.
//!
//! ## Layout
//! Nodes live in a dense arena (`Vec<Node<K>>`) and link to each other by
//! index. Removing a node swaps the last arena slot into the freed one and
//! re-points the single link that referenced it, so the arena never has
//! holes.
//!
//! ```text
//!   B                                D
//! ┌─┴───┐      rotate-left       ┌───┴─┐
//! a     D     ─────────────►     B     e
//!     ┌─┴─┐   ◄─────────────   ┌─┴─┐
//!     c   e    rotate-right    a   c
//! ```

use std::cmp::Ordering;

type NodeId = usize;

#[derive(Debug)]
struct Node<K> {
    key: K,
    left: Option<NodeId>,
    right: Option<NodeId>,
    /// Height of the subtree rooted here (a leaf has height 1)
    height: u32,
    /// Number of nodes in the subtree rooted here
    size: usize,
}

impl<K> Node<K> {
    fn leaf(key: K) -> Self {
        Self {
            key,
            left: None,
            right: None,
            height: 1,
            size: 1,
        }
    }
}

/// Balanced ordered set with rank queries.
///
/// Keys are unique under `Ord`; inserting an equal key is rejected.
#[derive(Debug)]
pub struct OrderStatTree<K> {
    nodes: Vec<Node<K>>,
    root: Option<NodeId>,
}

impl<K: Ord> OrderStatTree<K> {
    /// Create an empty tree
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Number of keys in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every key
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    // =========================================================================
    // Public operations
    // =========================================================================

    /// Insert `key` in order.
    ///
    /// Returns `false` (and drops `key`) if an equal key is already present.
    pub fn insert(&mut self, key: K) -> bool {
        let (root, inserted) = self.insert_at(self.root, key);
        self.root = Some(root);
        inserted
    }

    /// Remove the key equal to `key`, returning it.
    pub fn remove(&mut self, key: &K) -> Option<K> {
        let (root, detached) = self.remove_at(self.root, key);
        self.root = root;
        detached.map(|id| self.release(id))
    }

    /// Exact lookup
    pub fn get(&self, key: &K) -> Option<&K> {
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = &self.nodes[id];
            cur = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(&node.key),
            };
        }
        None
    }

    /// Lower-bound seek: the first key not less than `key`, with its rank.
    ///
    /// When every key is smaller, returns `(len, None)`.
    pub fn lower_bound(&self, key: &K) -> (usize, Option<&K>) {
        let mut rank = 0;
        let mut found = None;
        let mut cur = self.root;

        while let Some(id) = cur {
            let node = &self.nodes[id];
            let left_size = self.size_of(node.left);
            if node.key >= *key {
                found = Some((rank + left_size, &node.key));
                cur = node.left;
            } else {
                rank += left_size + 1;
                cur = node.right;
            }
        }

        match found {
            Some((rank, key)) => (rank, Some(key)),
            None => (self.len(), None),
        }
    }

    /// Key at zero-based `rank`
    pub fn select(&self, rank: usize) -> Option<&K> {
        let mut rank = rank;
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = &self.nodes[id];
            let left_size = self.size_of(node.left);
            match rank.cmp(&left_size) {
                Ordering::Less => cur = node.left,
                Ordering::Equal => return Some(&node.key),
                Ordering::Greater => {
                    rank -= left_size + 1;
                    cur = node.right;
                }
            }
        }
        None
    }

    /// In-order iteration starting at `rank`.
    ///
    /// Costs O(log n) to position and amortized O(1) per step.
    pub fn iter_from(&self, rank: usize) -> Iter<'_, K> {
        let mut stack = Vec::new();
        let mut rank = rank;
        let mut cur = self.root;

        while let Some(id) = cur {
            let node = &self.nodes[id];
            let left_size = self.size_of(node.left);
            match rank.cmp(&left_size) {
                Ordering::Less => {
                    stack.push(id);
                    cur = node.left;
                }
                Ordering::Equal => {
                    stack.push(id);
                    break;
                }
                Ordering::Greater => {
                    rank -= left_size + 1;
                    cur = node.right;
                }
            }
        }

        Iter { tree: self, stack }
    }

    /// In-order iteration over all keys
    pub fn iter(&self) -> Iter<'_, K> {
        self.iter_from(0)
    }

    // =========================================================================
    // Node bookkeeping
    // =========================================================================

    fn height_of(&self, id: Option<NodeId>) -> u32 {
        id.map_or(0, |id| self.nodes[id].height)
    }

    fn size_of(&self, id: Option<NodeId>) -> usize {
        id.map_or(0, |id| self.nodes[id].size)
    }

    /// Recompute height and subtree size from the children
    fn update(&mut self, id: NodeId) {
        let (left, right) = (self.nodes[id].left, self.nodes[id].right);
        let height = 1 + self.height_of(left).max(self.height_of(right));
        let size = 1 + self.size_of(left) + self.size_of(right);
        let node = &mut self.nodes[id];
        node.height = height;
        node.size = size;
    }

    fn rotate_left(&mut self, id: NodeId) -> NodeId {
        let Some(new_root) = self.nodes[id].right else {
            return id;
        };
        let inner = self.nodes[new_root].left;
        self.nodes[id].right = inner;
        self.nodes[new_root].left = Some(id);
        self.update(id);
        self.update(new_root);
        new_root
    }

    fn rotate_right(&mut self, id: NodeId) -> NodeId {
        let Some(new_root) = self.nodes[id].left else {
            return id;
        };
        let inner = self.nodes[new_root].right;
        self.nodes[id].left = inner;
        self.nodes[new_root].right = Some(id);
        self.update(id);
        self.update(new_root);
        new_root
    }

    /// Restore the AVL property at `id` after one of its subtrees changed
    /// height by at most one. Returns the new subtree root.
    fn rebalance(&mut self, id: NodeId) -> NodeId {
        self.update(id);
        let left = self.nodes[id].left;
        let right = self.nodes[id].right;
        let (lh, rh) = (self.height_of(left), self.height_of(right));

        if lh > rh + 1 {
            if let Some(l) = left {
                // left-right case
                if self.height_of(self.nodes[l].left) < self.height_of(self.nodes[l].right) {
                    let rotated = self.rotate_left(l);
                    self.nodes[id].left = Some(rotated);
                }
            }
            return self.rotate_right(id);
        }

        if rh > lh + 1 {
            if let Some(r) = right {
                // right-left case
                if self.height_of(self.nodes[r].right) < self.height_of(self.nodes[r].left) {
                    let rotated = self.rotate_right(r);
                    self.nodes[id].right = Some(rotated);
                }
            }
            return self.rotate_left(id);
        }

        id
    }

    fn insert_at(&mut self, at: Option<NodeId>, key: K) -> (NodeId, bool) {
        let Some(id) = at else {
            self.nodes.push(Node::leaf(key));
            return (self.nodes.len() - 1, true);
        };

        match key.cmp(&self.nodes[id].key) {
            Ordering::Equal => (id, false),
            Ordering::Less => {
                let (child, inserted) = self.insert_at(self.nodes[id].left, key);
                self.nodes[id].left = Some(child);
                if !inserted {
                    return (id, false);
                }
                (self.rebalance(id), true)
            }
            Ordering::Greater => {
                let (child, inserted) = self.insert_at(self.nodes[id].right, key);
                self.nodes[id].right = Some(child);
                if !inserted {
                    return (id, false);
                }
                (self.rebalance(id), true)
            }
        }
    }

    /// Unlink the node equal to `key` from the subtree at `at`.
    ///
    /// Returns the new subtree root and the id of the detached node, which
    /// is still allocated in the arena.
    fn remove_at(&mut self, at: Option<NodeId>, key: &K) -> (Option<NodeId>, Option<NodeId>) {
        let Some(id) = at else {
            return (None, None);
        };

        match key.cmp(&self.nodes[id].key) {
            Ordering::Less => {
                let (child, detached) = self.remove_at(self.nodes[id].left, key);
                if detached.is_none() {
                    return (Some(id), None);
                }
                self.nodes[id].left = child;
                (Some(self.rebalance(id)), detached)
            }
            Ordering::Greater => {
                let (child, detached) = self.remove_at(self.nodes[id].right, key);
                if detached.is_none() {
                    return (Some(id), None);
                }
                self.nodes[id].right = child;
                (Some(self.rebalance(id)), detached)
            }
            Ordering::Equal => {
                let (left, right) = (self.nodes[id].left, self.nodes[id].right);
                let replacement = match (left, right) {
                    (None, None) => None,
                    (Some(child), None) | (None, Some(child)) => Some(child),
                    (Some(_), Some(right)) => {
                        // splice the in-order successor into this position
                        let (rest, successor) = self.detach_min(right);
                        self.nodes[successor].left = left;
                        self.nodes[successor].right = rest;
                        Some(self.rebalance(successor))
                    }
                };
                self.nodes[id].left = None;
                self.nodes[id].right = None;
                (replacement, Some(id))
            }
        }
    }

    /// Unlink the smallest node of the subtree at `id`.
    ///
    /// Returns the new subtree root and the unlinked node.
    fn detach_min(&mut self, id: NodeId) -> (Option<NodeId>, NodeId) {
        match self.nodes[id].left {
            None => {
                let right = self.nodes[id].right;
                self.nodes[id].right = None;
                (right, id)
            }
            Some(left) => {
                let (rest, min) = self.detach_min(left);
                self.nodes[id].left = rest;
                (Some(self.rebalance(id)), min)
            }
        }
    }

    /// Free an unlinked arena slot and hand back its key.
    ///
    /// The last slot is moved into `id`; whichever link pointed at it is
    /// rewritten.
    fn release(&mut self, id: NodeId) -> K {
        let last = self.nodes.len() - 1;
        if id != last {
            match self.parent_of(last) {
                None => self.root = Some(id),
                Some(parent) => {
                    let node = &mut self.nodes[parent];
                    if node.left == Some(last) {
                        node.left = Some(id);
                    } else {
                        node.right = Some(id);
                    }
                }
            }
        }
        self.nodes.swap_remove(id).key
    }

    /// Parent of a linked node, found by descending on its key.
    fn parent_of(&self, target: NodeId) -> Option<NodeId> {
        let key = &self.nodes[target].key;
        let mut parent = None;
        let mut cur = self.root;
        while let Some(id) = cur {
            if id == target {
                return parent;
            }
            parent = Some(id);
            cur = match key.cmp(&self.nodes[id].key) {
                Ordering::Less => self.nodes[id].left,
                _ => self.nodes[id].right,
            };
        }
        parent
    }
}

impl<K: Ord> Default for OrderStatTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// In-order iterator produced by [`OrderStatTree::iter_from`]
pub struct Iter<'a, K> {
    tree: &'a OrderStatTree<K>,
    /// Nodes still to visit; the top is the next one yielded
    stack: Vec<NodeId>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let nodes = &self.tree.nodes;
        let mut cur = nodes[id].right;
        while let Some(child) = cur {
            self.stack.push(child);
            cur = nodes[child].left;
        }
        Some(&nodes[id].key)
    }
}
