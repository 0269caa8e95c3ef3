use std::fmt;

use crate::interval::{cmp_positions, Coordinate, Interval};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

impl NodeId {
    /// Every build, even of no intervals, creates the root first.
    pub const ROOT: NodeId = NodeId(0);
}

/// Intervals of one node sharing the same bounds.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Entry<K> {
    pub begin: K,
    pub end: K,
    pub items: Vec<usize>, // Positions in the tree's backing sequence, in insertion order.
}

impl<K: Coordinate> Interval for Entry<K> {
    type Position = K;

    fn begin(&self) -> K {
        self.begin
    }

    fn end(&self) -> K {
        self.end
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Node<K> {
    pub center: Option<K>,
    pub entries: Vec<Entry<K>>, // Sorted by (begin, end).
    pub parent: Option<NodeId>,
    pub left: Option<NodeId>,  // Every interval ends before `center`.
    pub right: Option<NodeId>, // Every interval begins at or after `center`.
}

impl<K> Node<K> {
    fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.left.is_none() && self.right.is_none()
    }
}

#[derive(Clone, Copy, Debug)]
enum Side {
    Left,
    Right,
}

/// Owns every node of one build. The root, if any, is the first node.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Arena<K> {
    nodes: Vec<Node<K>>,
}

impl<K> Default for Arena<K> {
    fn default() -> Self {
        Arena { nodes: Vec::new() }
    }
}

/// Median of the distinct endpoints of `members`, floored.
fn center_of<I: Interval>(intervals: &[I], members: &[usize]) -> Option<I::Position> {
    let mut endpoints: Vec<I::Position> = members
        .iter()
        .flat_map(|&i| [intervals[i].begin(), intervals[i].end()])
        .collect();
    endpoints.sort_by(cmp_positions);
    endpoints.dedup();

    let n = endpoints.len();
    if n == 0 {
        return None;
    }
    let mid = n / 2;
    if n % 2 == 1 {
        Some(endpoints[mid].floored())
    } else {
        Some(endpoints[mid - 1].midpoint_floor(endpoints[mid]))
    }
}

impl<K: Coordinate> Arena<K> {
    /// Partitions `intervals` around medians until every interval is owned by
    /// exactly one node.
    pub fn build<I>(intervals: &[I]) -> Arena<K>
    where
        I: Interval<Position = K>,
    {
        let mut arena = Arena {
            nodes: Vec::new(),
        };
        let mut pending: Vec<(Option<(NodeId, Side)>, Vec<usize>)> =
            vec![(None, (0..intervals.len()).collect())];

        while let Some((link, members)) = pending.pop() {
            let id = NodeId(arena.nodes.len());
            let parent = link.map(|(parent, _)| parent);
            let (node, left, right) = Self::partition(intervals, members, parent);
            arena.nodes.push(node);

            if let Some((parent, side)) = link {
                let parent = &mut arena.nodes[parent.0];
                match side {
                    Side::Left => parent.left = Some(id),
                    Side::Right => parent.right = Some(id),
                }
            }
            if !left.is_empty() {
                pending.push((Some((id, Side::Left)), left));
            }
            if !right.is_empty() {
                pending.push((Some((id, Side::Right)), right));
            }
        }

        arena
    }

    /// Builds a single node from `members` and returns the members left for
    /// its left and right children.
    fn partition<I>(
        intervals: &[I],
        members: Vec<usize>,
        parent: Option<NodeId>,
    ) -> (Node<K>, Vec<usize>, Vec<usize>)
    where
        I: Interval<Position = K>,
    {
        let mut node = Node {
            center: center_of(intervals, &members),
            entries: Vec::new(),
            parent,
            left: None,
            right: None,
        };
        let center = match node.center {
            Some(center) => center,
            None => return (node, Vec::new(), Vec::new()),
        };

        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut inner = Vec::new();
        for i in members {
            let interval = &intervals[i];
            if interval.end() < center {
                left.push(i);
            } else if interval.begin() >= center {
                right.push(i);
            } else {
                inner.push(i);
            }
        }
        // A child receiving every member would split them the same way again.
        if inner.is_empty() && (left.is_empty() || right.is_empty()) {
            inner.append(&mut left);
            inner.append(&mut right);
        }

        // Stable, so equal bounds keep their insertion order.
        inner.sort_by(|&a, &b| intervals[a].cmp_bounds(&intervals[b]));
        for i in inner {
            let interval = &intervals[i];
            match node.entries.last_mut() {
                Some(entry) if entry.same_bounds(interval) => entry.items.push(i),
                _ => node.entries.push(Entry {
                    begin: interval.begin(),
                    end: interval.end(),
                    items: vec![i],
                }),
            }
        }

        (node, left, right)
    }

    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId::ROOT)
        }
    }

    pub fn node(&self, id: NodeId) -> &Node<K> {
        &self.nodes[id.0]
    }

    pub fn search<'a, I>(&self, intervals: &'a [I], position: K) -> Vec<&'a I>
    where
        I: Interval<Position = K>,
    {
        let mut results = Vec::new();
        let mut cursor = self.root();

        while let Some(id) = cursor {
            let node = self.node(id);
            for entry in &node.entries {
                if entry.contains(position) {
                    results.extend(entry.items.iter().map(|&i| &intervals[i]));
                } else if entry.begin > position {
                    break;
                }
            }
            cursor = match node.center {
                Some(center) if position < center => node.left,
                Some(_) => node.right,
                None => None,
            };
        }

        results
    }

    pub fn get_overlaps<'a, I>(&self, intervals: &'a [I], begin: K, end: K) -> Vec<&'a I>
    where
        I: Interval<Position = K>,
    {
        let mut results = Vec::new();
        let mut stack: Vec<NodeId> = self.root().into_iter().collect();

        while let Some(id) = stack.pop() {
            let node = self.node(id);
            for entry in &node.entries {
                if entry.intersects(begin, end) {
                    results.extend(entry.items.iter().map(|&i| &intervals[i]));
                } else if entry.begin >= end {
                    break;
                }
            }
            if let Some(center) = node.center {
                // Right first, so the left subtree is reported before it.
                if end > center {
                    stack.extend(node.right);
                }
                if begin <= center {
                    stack.extend(node.left);
                }
            }
        }

        results
    }

    /// Leftmost node of the subtree rooted at `id`, or `None` for an empty node.
    pub fn minimum(&self, id: NodeId) -> Option<NodeId> {
        if self.node(id).is_empty() {
            return None;
        }
        let mut id = id;
        while let Some(left) = self.node(id).left {
            id = left;
        }
        Some(id)
    }

    pub fn maximum(&self, id: NodeId) -> Option<NodeId> {
        if self.node(id).is_empty() {
            return None;
        }
        let mut id = id;
        while let Some(right) = self.node(id).right {
            id = right;
        }
        Some(id)
    }

    /// Next node in order, found through child and parent links only.
    pub fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.node(id).right {
            return self.minimum(right);
        }
        let mut child = id;
        let mut parent = self.node(id).parent;
        while let Some(up) = parent {
            if self.node(up).right != Some(child) {
                break;
            }
            child = up;
            parent = self.node(up).parent;
        }
        parent
    }

    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(left) = self.node(id).left {
            return self.maximum(left);
        }
        let mut child = id;
        let mut parent = self.node(id).parent;
        while let Some(up) = parent {
            if self.node(up).left != Some(child) {
                break;
            }
            child = up;
            parent = self.node(up).parent;
        }
        parent
    }
}

/// A borrowed view of one node of a built [`IntervalTree`](crate::interval_tree::IntervalTree).
///
/// A node owns the intervals that straddle its center: those that neither end
/// before it nor begin at or after it. Its left subtree holds the intervals
/// ending before the center, its right subtree those beginning at or after it.
pub struct NodeRef<'a, I: Interval> {
    arena: &'a Arena<I::Position>,
    intervals: &'a [I],
    id: NodeId,
}

impl<'a, I: Interval> Clone for NodeRef<'a, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, I: Interval> Copy for NodeRef<'a, I> {}

impl<'a, I: Interval> NodeRef<'a, I> {
    pub(crate) fn new(arena: &'a Arena<I::Position>, intervals: &'a [I], id: NodeId) -> Self {
        NodeRef {
            arena,
            intervals,
            id,
        }
    }

    fn node(&self) -> &'a Node<I::Position> {
        self.arena.node(self.id)
    }

    fn at(&self, id: NodeId) -> Self {
        NodeRef::new(self.arena, self.intervals, id)
    }

    /// The split point of this node. `None` only for the root of an empty tree.
    pub fn center(&self) -> Option<I::Position> {
        self.node().center
    }

    /// Number of distinct `(begin, end)` keys owned by this node.
    pub fn len(&self) -> usize {
        self.node().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node().entries.is_empty()
    }

    /// The distinct `(begin, end)` keys owned by this node, in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = (I::Position, I::Position)> + 'a {
        self.node().entries.iter().map(|entry| (entry.begin, entry.end))
    }

    /// The intervals owned by this node, in ascending order. Intervals with the
    /// same bounds come in insertion order.
    pub fn intervals(&self) -> impl Iterator<Item = &'a I> + 'a {
        let intervals = self.intervals;
        self.node()
            .entries
            .iter()
            .flat_map(move |entry| entry.items.iter().map(move |&i| &intervals[i]))
    }

    /// First interval of the smallest key.
    pub fn min_value(&self) -> Option<&'a I> {
        let intervals = self.intervals;
        let entry = self.node().entries.first()?;
        entry.items.first().map(|&i| &intervals[i])
    }

    /// First interval of the largest key.
    pub fn max_value(&self) -> Option<&'a I> {
        let intervals = self.intervals;
        let entry = self.node().entries.last()?;
        entry.items.first().map(|&i| &intervals[i])
    }

    pub fn left(&self) -> Option<Self> {
        self.node().left.map(|id| self.at(id))
    }

    pub fn right(&self) -> Option<Self> {
        self.node().right.map(|id| self.at(id))
    }

    pub fn parent(&self) -> Option<Self> {
        self.node().parent.map(|id| self.at(id))
    }

    /// Leftmost node below this one (possibly itself). `None` if this is the
    /// root of an empty tree.
    pub fn minimum(&self) -> Option<Self> {
        self.arena.minimum(self.id).map(|id| self.at(id))
    }

    /// Rightmost node below this one (possibly itself). `None` if this is the
    /// root of an empty tree.
    pub fn maximum(&self) -> Option<Self> {
        self.arena.maximum(self.id).map(|id| self.at(id))
    }

    pub fn successor(&self) -> Option<Self> {
        self.arena.successor(self.id).map(|id| self.at(id))
    }

    pub fn predecessor(&self) -> Option<Self> {
        self.arena.predecessor(self.id).map(|id| self.at(id))
    }
}

impl<'a, I: Interval> fmt::Debug for NodeRef<'a, I> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("center", &self.center())
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<'a, I: Interval> fmt::Display for NodeRef<'a, I> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let keys: Vec<String> = self
            .keys()
            .map(|(begin, end)| format!("({},{})", begin, end))
            .collect();
        write!(f, "ITNode(intervals=[{}])", keys.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::SimpleInterval;

    // (0,3), (1,4), ..., (8,11)
    fn steps(begin: i32, end: i32, n: i32) -> Vec<SimpleInterval<i32>> {
        (0..n).map(|i| SimpleInterval::new(begin + i, end + i)).collect()
    }

    fn keys_of(arena: &Arena<i32>, id: NodeId) -> Vec<(i32, i32)> {
        arena.node(id).entries.iter().map(|e| (e.begin, e.end)).collect()
    }

    fn subtree(arena: &Arena<i32>, id: Option<NodeId>) -> Vec<usize> {
        let mut members = Vec::new();
        let mut stack: Vec<NodeId> = id.into_iter().collect();
        while let Some(id) = stack.pop() {
            let node = arena.node(id);
            members.extend(node.entries.iter().flat_map(|e| e.items.iter().copied()));
            stack.extend(node.left);
            stack.extend(node.right);
        }
        members.sort();
        members
    }

    #[test]
    fn center_is_floored_median_of_distinct_endpoints() {
        let two = [SimpleInterval::new(1, 2), SimpleInterval::new(3, 4)];
        assert_eq!(Some(2), center_of(&two, &[0, 1]));

        let three = [
            SimpleInterval::new(1, 2),
            SimpleInterval::new(3, 4),
            SimpleInterval::new(4, 5),
        ];
        assert_eq!(Some(3), center_of(&three, &[0, 1, 2]));

        let floats = [SimpleInterval::new(0.5, 2.0)];
        assert_eq!(Some(1.0), center_of(&floats, &[0]));

        assert_eq!(None, center_of::<SimpleInterval<i32>>(&[], &[]));
    }

    #[test]
    fn partition_layout() {
        let intervals = steps(0, 3, 9);
        let arena = Arena::build(&intervals);
        let root = arena.root().unwrap();

        assert_eq!(Some(5), arena.node(root).center);
        assert_eq!(vec![(2, 5), (3, 6), (4, 7)], keys_of(&arena, root));

        let left = arena.node(root).left.unwrap();
        assert_eq!(vec![(0, 3), (1, 4)], keys_of(&arena, left));
        assert_eq!(Some(root), arena.node(left).parent);

        let right = arena.node(root).right.unwrap();
        assert_eq!(vec![(5, 8), (6, 9), (7, 10)], keys_of(&arena, right));
        assert_eq!(Some(root), arena.node(right).parent);
    }

    #[test]
    fn every_interval_lands_in_exactly_one_node() {
        let mut intervals = steps(0, 3, 9);
        intervals.extend(steps(-40, 2, 7));
        intervals.push(SimpleInterval::new(4, 5));
        intervals.push(SimpleInterval::new(4, 5));
        let arena = Arena::build(&intervals);

        assert_eq!((0..intervals.len()).collect::<Vec<_>>(), subtree(&arena, arena.root()));

        for (i, node) in arena.nodes.iter().enumerate() {
            let center = node.center.unwrap();
            for &m in &subtree(&arena, node.left) {
                assert!(intervals[m].end() < center, "node {}: {:?}", i, intervals[m]);
            }
            for &m in &subtree(&arena, node.right) {
                assert!(intervals[m].begin() >= center, "node {}: {:?}", i, intervals[m]);
            }
        }
    }

    #[test]
    fn duplicates_are_grouped_in_insertion_order() {
        let intervals = [
            SimpleInterval::new(0, 10),
            SimpleInterval::new(2, 8),
            SimpleInterval::new(2, 8),
            SimpleInterval::new(1, 9),
            SimpleInterval::new(2, 8),
        ];
        let arena = Arena::build(&intervals);
        let root = arena.node(arena.root().unwrap());

        assert_eq!(Some(5), root.center);
        assert_eq!(3, root.entries.len());
        assert_eq!(vec![0], root.entries[0].items);
        assert_eq!(vec![3], root.entries[1].items);
        assert_eq!(vec![1, 2, 4], root.entries[2].items);
    }

    #[test]
    fn degenerate_intervals_stay_in_one_node() {
        // Every interval begins at the center, so none of them straddles it.
        let intervals = [SimpleInterval::new(5, 5), SimpleInterval::new(5, 5)];
        let arena = Arena::build(&intervals);

        assert_eq!(1, arena.nodes.len());
        assert_eq!(vec![0, 1], arena.nodes[0].entries[0].items);
        assert!(arena.search(&intervals, 5).is_empty());
        assert_eq!(vec![&intervals[0], &intervals[1]], arena.get_overlaps(&intervals, 4, 6));

        let floats = [SimpleInterval::new(0.25, 0.5), SimpleInterval::new(0.5, 0.75)];
        let arena = Arena::build(&floats);
        assert_eq!(1, arena.nodes.len());
        assert_eq!(vec![&floats[1]], arena.search(&floats, 0.6));
    }

    #[test]
    fn empty_arena_has_an_empty_root() {
        let intervals: Vec<SimpleInterval<i32>> = Vec::new();
        let arena = Arena::build(&intervals);
        let root = arena.root().unwrap();

        assert_eq!(None, arena.node(root).center);
        assert_eq!(None, arena.minimum(root));
        assert_eq!(None, arena.maximum(root));
        assert!(arena.search(&intervals, 3).is_empty());
        assert!(arena.get_overlaps(&intervals, 0, 10).is_empty());
    }

    #[test]
    fn minimum_and_maximum() {
        let intervals = steps(0, 3, 9);
        let arena = Arena::build(&intervals);
        let root = arena.root().unwrap();

        let min = arena.minimum(root).unwrap();
        assert_eq!(vec![(0, 3), (1, 4)], keys_of(&arena, min));
        let max = arena.maximum(root).unwrap();
        assert_eq!(vec![(8, 11)], keys_of(&arena, max));
    }

    #[test]
    fn successor_and_predecessor_walk_all_nodes() {
        let intervals = steps(0, 3, 9);
        let arena = Arena::build(&intervals);
        let root = arena.root().unwrap();

        let mut forward = Vec::new();
        let mut cursor = arena.minimum(root);
        while let Some(id) = cursor {
            forward.push(id);
            cursor = arena.successor(id);
        }
        assert_eq!(arena.nodes.len(), forward.len());

        let mut backward = Vec::new();
        let mut cursor = arena.maximum(root);
        while let Some(id) = cursor {
            backward.push(id);
            cursor = arena.predecessor(id);
        }
        backward.reverse();
        assert_eq!(forward, backward);

        let firsts: Vec<(i32, i32)> = forward.iter().map(|&id| keys_of(&arena, id)[0]).collect();
        let mut sorted = firsts.clone();
        sorted.sort();
        assert_eq!(sorted, firsts);
    }

    #[test]
    fn node_view() {
        let intervals = steps(0, 3, 9);
        let arena = Arena::build(&intervals);
        let root = NodeRef::new(&arena, &intervals, arena.root().unwrap());

        assert_eq!("ITNode(intervals=[(2,5),(3,6),(4,7)])", root.to_string());
        assert_eq!(Some(&SimpleInterval::new(2, 5)), root.min_value());
        assert_eq!(Some(&SimpleInterval::new(4, 7)), root.max_value());
        assert_eq!(3, root.len());
        assert!(root.parent().is_none());

        let left = root.left().unwrap();
        assert_eq!(Some(&SimpleInterval::new(0, 3)), left.min_value());
        assert_eq!("ITNode(intervals=[(0,3),(1,4)])", left.minimum().unwrap().to_string());
        assert_eq!(root.to_string(), left.parent().unwrap().to_string());
        assert_eq!(root.to_string(), left.successor().unwrap().to_string());
        assert_eq!(
            Some(&SimpleInterval::new(7, 10)),
            root.right().unwrap().max_value()
        );
        assert_eq!("ITNode(intervals=[(8,11)])", root.maximum().unwrap().to_string());
    }
}
