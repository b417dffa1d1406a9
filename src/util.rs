//! Utility types to support rank-indexed self balancing binary splay trees

#![warn(missing_docs)]

extern crate alloc;
use alloc::vec::Vec;

use core::cmp::max;
use core::mem::swap;

use crate::Error;

//-----------------------------------------------------------------------------------------------//

// Index of the reserved nil record. Slot 0 of every arena holds a node with `size = 0`,
// `sum = 0`, `best = NEG` and `prefix = suffix = 0`, so aggregate recomputation never needs to
// branch on missing children. The nil record itself is never relinked, tagged or refreshed.
pub(crate) const NIL: usize = 0;

// A value low enough never to win a best-run comparison, with enough headroom that a subtree sum
// including a couple of boundary nodes cannot wrap.
pub(crate) const NEG: i64 = i64::MIN / 4;

//-----------------------------------------------------------------------------------------------//

// A node in a splay tree
#[derive(Clone)]
struct Node {
    parent: usize,
    left: usize,
    right: usize,
    value: i64,
    size: usize,
    sum: i64,
    best: i64,
    prefix: i64,
    suffix: i64,
    assign: Option<i64>,
    reversed: bool,
}

impl Node {
    // The reserved record stored at slot 0
    fn nil() -> Node {
        Node {
            parent: NIL,
            left: NIL,
            right: NIL,
            value: 0,
            size: 0,
            sum: 0,
            best: NEG,
            prefix: 0,
            suffix: 0,
            assign: None,
            reversed: false,
        }
    }

    // A detached single-node subtree holding `value`
    fn fresh(value: i64) -> Node {
        Node {
            parent: NIL,
            left: NIL,
            right: NIL,
            value,
            size: 1,
            sum: value,
            best: value,
            prefix: max(value, 0),
            suffix: max(value, 0),
            assign: None,
            reversed: false,
        }
    }
}

//-----------------------------------------------------------------------------------------------//

/// A tree of integer values addressed by in-order rank
///
/// The tree owns an arena of nodes referenced by `usize` indices, with slot 0 reserved as a nil
/// record and removed slots threaded onto an internal recycle list for reuse. Every node carries
/// the aggregates of its subtree (size, sum, best run, best prefix run, best suffix run) and two
/// lazy range tags (uniform assignment and reversal), so contiguous runs of the in-order
/// sequence can be assigned, reversed and summed in amortised logarithmic time.
///
/// Ranks are 1-based over every node the tree currently holds. The range methods (`insert_at`,
/// `remove_at`, `assign_at`, `reverse_at` and `sum_at`) isolate a run by splaying the node just
/// before it to the root and the node just after it to the root's right child, so the caller
/// must keep permanent boundary nodes at both ends of the live data; `Sequence` does exactly
/// that. Ranks passed to any method of this type must be valid for the current tree - the
/// results are undefined if they are not.
#[derive(Clone)]
pub struct Tree {
    node: Vec<Node>,
    root: usize,
    recycle: usize,
    count: usize,
    limit: usize,
}

impl Tree {
    /// Construct an empty tree that can hold at most `limit` nodes
    pub fn new(limit: usize) -> Tree {
        let mut node = Vec::with_capacity(limit + 1);
        node.push(Node::nil());
        Tree {
            node,
            root: NIL,
            recycle: NIL,
            count: 0,
            limit,
        }
    }

    /// Get the number of nodes in the tree
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Check if the tree holds any nodes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Get the maximum number of nodes the tree can hold
    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Get the number of nodes that can still be allocated before the limit is reached
    #[inline]
    pub fn spare(&self) -> usize {
        self.limit - self.count
    }

    /// Build the tree from a slice of values
    ///
    /// The values become the in-order sequence of a balanced subtree replacing the current root.
    /// The tree must be empty. Fails with `CapacityExhausted` if the slice is larger than the
    /// limit, in which case the tree is left untouched.
    pub fn rebuild(&mut self, values: &[i64]) -> Result<(), Error> {
        debug_assert_eq!(self.root, NIL);
        self.root = self.build(values)?;
        Ok(())
    }

    /// Insert a block of values between the nodes at ranks `rank` and `rank + 1`
    ///
    /// Both ranks must exist. The block is built as a balanced subtree, so the cost is
    /// O(log n) amortised plus O(k) for the block itself. Fails with `CapacityExhausted` if the
    /// block does not fit under the limit, in which case the tree is left untouched.
    pub fn insert_at(&mut self, rank: usize, values: &[i64]) -> Result<(), Error> {
        let sub = self.build(values)?;
        if sub == NIL {
            return Ok(());
        }

        let slot = self.expose(rank, rank + 1);
        self.node[slot].left = sub;
        self.node[sub].parent = slot;
        pull(&mut self.node, slot);
        pull(&mut self.node, self.root);
        Ok(())
    }

    /// Remove the `count` nodes starting at `rank`, recycling their slots
    ///
    /// The nodes at ranks `rank - 1` and `rank + count` must exist.
    pub fn remove_at(&mut self, rank: usize, count: usize) {
        if count == 0 {
            return;
        }

        let slot = self.expose(rank - 1, rank + count);
        let sub = self.node[slot].left;
        self.node[slot].left = NIL;
        self.scrap(sub);
        pull(&mut self.node, slot);
        pull(&mut self.node, self.root);
    }

    /// Assign `value` to the `count` nodes starting at `rank`
    ///
    /// The nodes at ranks `rank - 1` and `rank + count` must exist. The assignment is recorded
    /// as a lazy tag on the isolated run and resolved one level at a time as later operations
    /// descend into it.
    pub fn assign_at(&mut self, rank: usize, count: usize, value: i64) {
        if count == 0 {
            return;
        }

        let slot = self.expose(rank - 1, rank + count);
        let sub = self.node[slot].left;
        fill(&mut self.node, sub, value);
        pull(&mut self.node, slot);
        pull(&mut self.node, self.root);
    }

    /// Reverse the order of the `count` nodes starting at `rank`
    ///
    /// The nodes at ranks `rank - 1` and `rank + count` must exist. The reversal is recorded as
    /// a lazy tag on the isolated run.
    pub fn reverse_at(&mut self, rank: usize, count: usize) {
        if count == 0 {
            return;
        }

        let slot = self.expose(rank - 1, rank + count);
        let sub = self.node[slot].left;
        flip(&mut self.node, sub);
        pull(&mut self.node, slot);
        pull(&mut self.node, self.root);
    }

    /// Get the sum of the values of the `count` nodes starting at `rank`
    ///
    /// The nodes at ranks `rank - 1` and `rank + count` must exist.
    pub fn sum_at(&mut self, rank: usize, count: usize) -> i64 {
        if count == 0 {
            return 0;
        }

        let slot = self.expose(rank - 1, rank + count);
        let sub = self.node[slot].left;
        self.node[sub].sum
    }

    /// Get the largest sum of any non-empty contiguous run of the whole in-order sequence
    ///
    /// This is a field read on the root; no restructuring takes place. Boundary nodes count as
    /// ordinary nodes here, which is why `Sequence` gives them values that can never win.
    #[inline]
    pub fn best(&self) -> i64 {
        self.node[self.root].best
    }

    /// Get the value of the node at `rank`, promoting it to the root
    ///
    /// The rank must exist.
    pub fn value_at(&mut self, rank: usize) -> i64 {
        let x = select(&mut self.node, self.root, rank);
        self.promote(x, NIL);
        self.node[x].value
    }

    /// Collect the in-order sequence of values into a vector
    ///
    /// Pending tags are resolved along the walk: the in-order sequence is preserved, but
    /// resolving a reversal swaps children, so the tree shape may change. O(n).
    pub fn collect(&mut self) -> Vec<i64> {
        let mut out = Vec::with_capacity(self.count);
        if self.root == NIL {
            return out;
        }

        // In-order walk with an explicit stack; the `expanded` flag marks frames whose left
        // side has already been emitted.
        let mut stack = alloc::vec![(self.root, false)];
        while let Some((x, expanded)) = stack.pop() {
            if x == NIL {
                continue;
            }
            if expanded {
                out.push(self.node[x].value);
            } else {
                push(&mut self.node, x);
                stack.push((self.node[x].right, false));
                stack.push((x, true));
                stack.push((self.node[x].left, false));
            }
        }
        out
    }

    // Splay the node at rank `lo` to the root and the node at rank `hi` to its right child, so
    // that the run strictly between them hangs as the left child of the returned node. Requires
    // `lo < hi` and both ranks valid.
    fn expose(&mut self, lo: usize, hi: usize) -> usize {
        debug_assert!(lo < hi);

        let x = select(&mut self.node, self.root, lo);
        self.promote(x, NIL);
        let y = select(&mut self.node, self.root, hi);
        self.promote(y, x);

        debug_assert_eq!(self.node[x].right, y);
        y
    }

    // Splay `x` until it is a direct child of `target`, or the root if `target` is nil
    fn promote(&mut self, x: usize, target: usize) {
        promote(&mut self.node, x, target);
        if target == NIL {
            self.root = x;
        }
    }

    // Build a balanced detached subtree from a slice of values and return its root
    //
    // Capacity is checked up front so a partially built subtree can never be left behind.
    // An explicit work stack is used instead of recursion so arbitrarily large slices cannot
    // overflow the call stack; parents are created before their children, so refreshing the
    // created nodes in reverse order satisfies the child-before-ancestor rule.
    fn build(&mut self, values: &[i64]) -> Result<usize, Error> {
        if values.is_empty() {
            return Ok(NIL);
        }
        if self.spare() < values.len() {
            return Err(Error::CapacityExhausted {
                capacity: self.limit,
            });
        }

        let mut made = Vec::with_capacity(values.len());
        let mut stack = alloc::vec![(0usize, values.len(), NIL, false)];
        let mut sub = NIL;

        while let Some((lo, hi, parent, left_side)) = stack.pop() {
            if lo >= hi {
                continue;
            }

            let mid = lo + (hi - lo) / 2;
            let x = self.alloc(values[mid]);

            self.node[x].parent = parent;
            if parent == NIL {
                sub = x;
            } else if left_side {
                self.node[parent].left = x;
            } else {
                self.node[parent].right = x;
            }

            made.push(x);
            stack.push((lo, mid, x, true));
            stack.push((mid + 1, hi, x, false));
        }

        for &x in made.iter().rev() {
            pull(&mut self.node, x);
        }

        Ok(sub)
    }

    // Return every node of a detached subtree to the recycle list. O(subtree size), with an
    // explicit stack rather than recursion.
    fn scrap(&mut self, sub: usize) {
        if sub == NIL {
            return;
        }

        let mut stack = alloc::vec![sub];
        while let Some(x) = stack.pop() {
            let (l, r) = (self.node[x].left, self.node[x].right);
            if l != NIL {
                stack.push(l);
            }
            if r != NIL {
                stack.push(r);
            }
            self.free(x);
        }
    }

    // Allocate and initialise a new node, preferring a recycled slot
    //
    // The caller must have checked the limit; `build` is the only allocation path and always
    // reserves the whole block first.
    fn alloc(&mut self, value: i64) -> usize {
        debug_assert!(self.count < self.limit);
        self.count += 1;

        // Recycle an old node
        let x = self.recycle;
        if x != NIL {
            self.recycle = self.node[x].parent;
            self.node[x] = Node::fresh(value);
            return x;
        }

        // Initialise a new one
        let x = self.node.len();
        self.node.push(Node::fresh(value));
        x
    }

    // Free a node and add it to the recycle queue
    fn free(&mut self, x: usize) {
        self.count -= 1;
        self.node[x].parent = self.recycle;
        self.recycle = x;
    }

    // Check the structural invariants: parent/child links agree and every node's size is one
    // more than the sizes of its children. Sizes are maintained eagerly (neither tag defers
    // them), so this holds regardless of pending tags.
    #[allow(dead_code)]
    pub(crate) fn check(&self) {
        if self.root == NIL {
            debug_assert_eq!(self.count, 0);
            return;
        }

        debug_assert_eq!(self.node[self.root].parent, NIL);
        debug_assert_eq!(self.node[self.root].size, self.count);

        let mut stack = alloc::vec![self.root];
        while let Some(x) = stack.pop() {
            let (l, r) = (self.node[x].left, self.node[x].right);

            debug_assert_eq!(self.node[x].size, self.node[l].size + self.node[r].size + 1);

            if l != NIL {
                debug_assert_eq!(self.node[l].parent, x);
                stack.push(l);
            }
            if r != NIL {
                debug_assert_eq!(self.node[r].parent, x);
                stack.push(r);
            }
        }
    }
}

//-----------------------------------------------------------------------------------------------//

// IMPLEMENTATION NOTE
//
// The functions below are low level. They are not 'unsafe' in the Rust sense, but they implement
// very low level operations on the node arena. Use with caution. Two rules hold throughout:
// tags are pushed down before the structure below a node is read or rearranged, and aggregates
// are refreshed child-before-ancestor after any relink.

// Refresh the aggregates of `x` from its two children. O(1). Both children must already be
// up to date and must not carry tags that `x`'s aggregates depend on having been resolved -
// which is guaranteed because a tagged child's own aggregates are rewritten the moment the tag
// is applied to it.
fn pull(node: &mut [Node], x: usize) {
    debug_assert_ne!(x, NIL);

    let l = node[x].left;
    let r = node[x].right;

    let (lsize, lsum, lbest, lpre, lsuf) = {
        let n = &node[l];
        (n.size, n.sum, n.best, n.prefix, n.suffix)
    };
    let (rsize, rsum, rbest, rpre, rsuf) = {
        let n = &node[r];
        (n.size, n.sum, n.best, n.prefix, n.suffix)
    };

    let n = &mut node[x];
    n.size = lsize + rsize + 1;
    n.sum = lsum + n.value + rsum;
    n.prefix = max(lpre, lsum + n.value + rpre);
    n.suffix = max(rsuf, rsum + n.value + lsuf);
    n.best = max(max(lbest, rbest), lsuf + n.value + rpre);
}

// Record a uniform assignment on the subtree rooted at `x`
//
// The node's own value and aggregates are rewritten immediately from `value` and the subtree
// size; the children only learn about it when the tag is pushed down.
fn fill(node: &mut [Node], x: usize, value: i64) {
    if x == NIL {
        return;
    }

    let size = node[x].size as i64;
    let n = &mut node[x];
    n.value = value;
    n.sum = value * size;
    if value > 0 {
        n.prefix = n.sum;
        n.suffix = n.sum;
        n.best = n.sum;
    } else {
        n.prefix = 0;
        n.suffix = 0;
        n.best = value;
    }
    n.assign = Some(value);
}

// Record a reversal on the subtree rooted at `x`
//
// Sum and best run are symmetric under reversal; only the prefix/suffix pair changes hands.
// The children are swapped when the tag is pushed down.
fn flip(node: &mut [Node], x: usize) {
    if x == NIL {
        return;
    }

    let n = &mut node[x];
    n.reversed = !n.reversed;
    swap(&mut n.prefix, &mut n.suffix);
}

// Push the pending tags of `x` one level down
//
// Assignment is resolved before reversal: a freshly uniform subtree is value-insensitive to
// orientation, so the order is safe, and it keeps the children's tag state canonical.
fn push(node: &mut [Node], x: usize) {
    debug_assert_ne!(x, NIL);

    if let Some(value) = node[x].assign.take() {
        let (l, r) = (node[x].left, node[x].right);
        fill(node, l, value);
        fill(node, r, value);
    }

    if node[x].reversed {
        node[x].reversed = false;
        let l = node[x].left;
        let r = node[x].right;
        node[x].left = r;
        node[x].right = l;
        flip(node, l);
        flip(node, r);
    }
}

// Rotate `x` over its parent, preserving the in-order sequence
//
// The caller must already have pushed the tags of every node involved. Aggregates are
// refreshed for the demoted parent first, then for `x`.
fn rotate(node: &mut [Node], x: usize) {
    let f = node[x].parent;
    let g = node[f].parent;
    debug_assert_ne!(f, NIL);

    let left_side = node[f].left == x;
    let b = if left_side {
        node[x].right
    } else {
        node[x].left
    };

    if left_side {
        node[f].left = b;
        node[x].right = f;
    } else {
        node[f].right = b;
        node[x].left = f;
    }

    if b != NIL {
        node[b].parent = f;
    }
    node[f].parent = x;
    node[x].parent = g;

    if g != NIL {
        if node[g].left == f {
            node[g].left = x;
        } else {
            debug_assert_eq!(node[g].right, f);
            node[g].right = x;
        }
    }

    pull(node, f);
    pull(node, x);
}

// Promote `x` to be a direct child of `target` by repeated rotation
//
// Every node on the path from `target` down to `x` has its tags pushed first: rotation
// reassigns which node is left or right of whom, and an unresolved tag above `x` would apply
// to the wrong substructure afterwards. A straight-line step rotates the parent first, a bent
// step rotates `x` twice. It is the responsibility of the caller to store the new root when
// `target` is nil.
fn promote(node: &mut [Node], x: usize, target: usize) {
    settle(node, x, target);

    while node[x].parent != target {
        let f = node[x].parent;
        let g = node[f].parent;

        if g != target {
            if (node[g].left == f) == (node[f].left == x) {
                rotate(node, f);
            } else {
                rotate(node, x);
            }
        }
        rotate(node, x);
    }
}

// Push the pending tags of every node strictly below `target` on the path down to `x`,
// top-down. The path is collected by walking parent links and replayed in reverse.
fn settle(node: &mut [Node], x: usize, target: usize) {
    let mut path = Vec::new();
    let mut y = x;
    while y != target {
        path.push(y);
        y = node[y].parent;
    }
    while let Some(y) = path.pop() {
        push(node, y);
    }
}

// Descend from `x` to the node at in-order rank `rank`, pushing tags along the way so that
// left/right always reflect the true structure. The rank must exist below `x`.
fn select(node: &mut [Node], mut x: usize, mut rank: usize) -> usize {
    loop {
        debug_assert_ne!(x, NIL);
        push(node, x);

        let ls = node[node[x].left].size;
        if rank == ls + 1 {
            return x;
        }
        if rank <= ls {
            x = node[x].left;
        } else {
            rank -= ls + 1;
            x = node[x].right;
        }
    }
}
