use std::iter::FusedIterator;
use std::slice;

use crate::interval::Interval;
use crate::node::{Arena, Entry, NodeId, NodeRef};

/// Walks the intervals of a built tree node by node, in order.
///
/// Each node hands out its own intervals by ascending `(begin, end)` before the
/// walk moves on to the in-order successor node, which is found from the node
/// links alone. Intervals with the same bounds come out in insertion order.
///
/// Created by [`IntervalTree::iter`](crate::interval_tree::IntervalTree::iter).
/// The iterator borrows the tree, so it can never observe a rebuild.
pub struct Iter<'a, I: Interval> {
    arena: &'a Arena<I::Position>,
    intervals: &'a [I],
    started: bool,
    node: Option<NodeId>,
    entries: slice::Iter<'a, Entry<I::Position>>,
    pending: slice::Iter<'a, usize>,
    remaining: usize,
}

impl<'a, I: Interval> Iter<'a, I> {
    /// `len` is the number of intervals `arena` was built from.
    pub(crate) fn new(arena: &'a Arena<I::Position>, intervals: &'a [I], len: usize) -> Self {
        Iter {
            arena,
            intervals,
            started: false,
            node: None,
            entries: (&[]).iter(),
            pending: (&[]).iter(),
            remaining: len,
        }
    }

    fn advance_node(&mut self) -> Option<NodeId> {
        self.node = if self.started {
            self.arena.successor(self.node?)
        } else {
            self.started = true;
            self.arena.root().and_then(|root| self.arena.minimum(root))
        };
        self.node
    }
}

impl<'a, I: Interval> Iterator for Iter<'a, I> {
    type Item = &'a I;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(&i) = self.pending.next() {
                self.remaining -= 1;
                return Some(&self.intervals[i]);
            }
            if let Some(entry) = self.entries.next() {
                self.pending = entry.items.iter();
                continue;
            }
            let id = self.advance_node()?;
            self.entries = self.arena.node(id).entries.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, I: Interval> ExactSizeIterator for Iter<'a, I> {}

impl<'a, I: Interval> FusedIterator for Iter<'a, I> {}

/// Walks the nodes of a built tree in order.
///
/// Created by [`IntervalTree::nodes`](crate::interval_tree::IntervalTree::nodes).
pub struct Nodes<'a, I: Interval> {
    next: Option<NodeRef<'a, I>>,
}

impl<'a, I: Interval> Nodes<'a, I> {
    pub(crate) fn new(root: Option<NodeRef<'a, I>>) -> Self {
        Nodes {
            next: root.and_then(|root| root.minimum()),
        }
    }
}

impl<'a, I: Interval> Iterator for Nodes<'a, I> {
    type Item = NodeRef<'a, I>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.successor();
        Some(current)
    }
}

impl<'a, I: Interval> FusedIterator for Nodes<'a, I> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::SimpleInterval;

    fn bounds<'a>(it: impl Iterator<Item = &'a SimpleInterval<i32>>) -> Vec<(i32, i32)> {
        it.map(|iv| (iv.begin(), iv.end())).collect()
    }

    #[test]
    fn iterates_node_by_node() {
        let intervals: Vec<_> = (0..9).map(|i| SimpleInterval::new(i, i + 3)).collect();
        let arena = Arena::build(&intervals);
        let iter = Iter::new(&arena, &intervals, intervals.len());

        assert_eq!(9, iter.len());
        assert_eq!(
            vec![(0, 3), (1, 4), (2, 5), (3, 6), (4, 7), (5, 8), (6, 9), (7, 10), (8, 11)],
            bounds(iter)
        );
    }

    #[test]
    fn skips_nodes_without_own_intervals() {
        // The root splits at 5 and owns nothing.
        let intervals = vec![SimpleInterval::new(10, 11), SimpleInterval::new(0, 1)];
        let arena = Arena::build(&intervals);
        assert!(arena.node(arena.root().unwrap()).entries.is_empty());

        let mut iter = Iter::new(&arena, &intervals, intervals.len());
        assert_eq!(Some(&intervals[1]), iter.next());
        assert_eq!(1, iter.len());
        assert_eq!(Some(&intervals[0]), iter.next());
        assert_eq!(None, iter.next());
        assert_eq!(None, iter.next());
    }

    #[test]
    fn empty() {
        let intervals: Vec<SimpleInterval<i32>> = Vec::new();
        let arena = Arena::build(&intervals);

        assert_eq!(0, Iter::new(&arena, &intervals, intervals.len()).count());

        let root = arena.root().map(|id| NodeRef::new(&arena, &intervals, id));
        assert_eq!(0, Nodes::new(root).count());
        assert_eq!(0, Nodes::<SimpleInterval<i32>>::new(None).count());
    }

    #[test]
    fn nodes_in_order() {
        let intervals: Vec<_> = (0..9).map(|i| SimpleInterval::new(i, i + 3)).collect();
        let arena = Arena::build(&intervals);
        let root = arena.root().map(|id| NodeRef::new(&arena, &intervals, id));

        let nodes: Vec<String> = Nodes::new(root).map(|node| node.to_string()).collect();
        assert_eq!(
            vec![
                "ITNode(intervals=[(0,3),(1,4)])",
                "ITNode(intervals=[(2,5),(3,6),(4,7)])",
                "ITNode(intervals=[(5,8),(6,9),(7,10)])",
                "ITNode(intervals=[(8,11)])",
            ],
            nodes
        );
    }
}
