use std::fmt;

use log::{debug, trace};
#[cfg(feature="serde")]
use serde::{Serialize, Deserialize};

use crate::error::{check_fraction, IntervalTreeError, Result};
use crate::interval::{Coordinate, Interval, SimpleInterval};
use crate::iter::{Iter, Nodes};
use crate::metrics::{boundary_margin, jaccard_coefficient};
use crate::node::{Arena, NodeId, NodeRef};

/// Whether the nodes reflect every interval inserted so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum State {
    Fresh,
    #[default]
    Stale,
}

/// An interval tree that partitions its intervals around median centers.
///
/// The tree is built once from an initial set of intervals. Later inserts are
/// only recorded; the whole structure is rebuilt from scratch by the next
/// query, so bursts of inserts are cheap and the first query after them pays
/// for one rebuild. No rebalancing happens otherwise, and intervals cannot be
/// removed.
///
/// Because any query may rebuild, queries take `&mut self` and return
/// references into the tree. Sharing a tree between threads needs a lock
/// around every call.
///
/// # Examples
///
/// ```
/// use centered_interval_tree::{IntervalTree, SimpleInterval};
///
/// let mut tree = IntervalTree::new(vec![
///     SimpleInterval::new(0, 40),
///     SimpleInterval::new(10, 20),
///     SimpleInterval::new(25, 35),
/// ]);
///
/// // Point queries exclude `begin` and include `end`.
/// assert_eq!(vec![&SimpleInterval::new(0, 40), &SimpleInterval::new(25, 35)], tree.search(35).unwrap());
///
/// // Range queries exclude touching endpoints.
/// assert_eq!(vec![&SimpleInterval::new(0, 40)], tree.get_overlaps(20, 25));
///
/// tree.insert(SimpleInterval::new(35, 45));
/// assert_eq!(2, tree.search(40).unwrap().len());
/// ```
#[cfg_attr(feature="serde", derive(Serialize, Deserialize))]
#[derive(Clone)]
pub struct IntervalTree<I: Interval> {
    intervals: Vec<I>,
    #[cfg_attr(feature="serde", serde(skip))]
    nodes: Arena<I::Position>,
    #[cfg_attr(feature="serde", serde(skip))]
    state: State,
    #[cfg_attr(feature="serde", serde(skip))]
    size: usize, // Number of intervals the nodes were built from.
}

impl<I: Interval> IntervalTree<I> {
    /// Builds a tree from `intervals` right away.
    pub fn new(intervals: Vec<I>) -> IntervalTree<I> {
        let mut tree = IntervalTree {
            intervals,
            nodes: Arena::default(),
            state: State::Stale,
            size: 0,
        };
        tree.build();
        tree
    }

    /// Rebuilds the nodes from every interval inserted so far, unless they are
    /// already up to date.
    ///
    /// Every query calls this first, so it only needs to be called directly to
    /// pay for the rebuild at a convenient time.
    pub fn build(&mut self) {
        if self.state == State::Fresh {
            return;
        }
        trace!("rebuilding interval tree from {} intervals", self.intervals.len());
        self.nodes = Arena::build(&self.intervals);
        self.size = self.intervals.len();
        self.state = State::Fresh;
    }

    /// Adds `interval` to the tree. The nodes are rebuilt by the next query.
    pub fn insert(&mut self, interval: I) {
        self.intervals.push(interval);
        self.state = State::Stale;
    }

    /// Returns `true` if intervals were inserted since the last build.
    pub fn is_stale(&self) -> bool {
        self.state == State::Stale
    }

    /// Returns every interval containing `position`, that is every interval
    /// with `end >= position > begin`.
    ///
    /// # Errors
    ///
    /// Fails if `position` is `NaN`.
    pub fn search(&mut self, position: I::Position) -> Result<Vec<&I>> {
        if !position.is_valid() {
            return Err(IntervalTreeError::InvalidPosition {
                value: format!("{:?}", position),
                type_name: <I::Position as Coordinate>::TYPE_NAME,
            });
        }
        self.build();
        Ok(self.nodes.search(&self.intervals, position))
    }

    /// Returns every interval overlapping `begin..end`. Intervals that only
    /// touch the query at an endpoint are not included.
    ///
    /// The result is not sorted as a whole.
    pub fn get_overlaps(&mut self, begin: I::Position, end: I::Position) -> Vec<&I> {
        self.build();
        self.nodes.get_overlaps(&self.intervals, begin, end)
    }

    /// Returns the intervals overlapping `begin..end` whose bounds are close
    /// enough to the query to cover at least `coverage` of it.
    ///
    /// Both query bounds may be off by the
    /// [`boundary_margin`](crate::metrics::boundary_margin) of the query:
    /// candidates are looked up in the query widened by the margin, and only
    /// those spanning the query narrowed by the margin are kept. A `coverage`
    /// of `1.0` keeps only intervals spanning the whole query.
    ///
    /// # Errors
    ///
    /// Fails if `coverage` is not within `[0, 1]`.
    pub fn fuzzy_query(
        &mut self,
        begin: I::Position,
        end: I::Position,
        coverage: f64,
    ) -> Result<Vec<&I>> {
        check_fraction(coverage, IntervalTreeError::InvalidCoverage)?;

        self.build();
        let margin = boundary_margin(begin, end, coverage);
        debug!(
            "Returning intervals [{}+-{:.2}, {}+-{:.2}]",
            begin, margin, end, margin
        );

        let distal_begin = I::Position::lower_from_f64(begin.as_f64() - margin);
        let distal_end = I::Position::upper_from_f64(end.as_f64() + margin);
        let proximal_begin = I::Position::lower_from_f64(begin.as_f64() + margin);
        let proximal_end = I::Position::upper_from_f64(end.as_f64() - margin);

        let mut results = self.nodes.get_overlaps(&self.intervals, distal_begin, distal_end);
        results.retain(|interval| {
            interval.begin() <= proximal_begin && interval.end() >= proximal_end
        });
        Ok(results)
    }

    /// Returns the intervals overlapping `begin..end` whose
    /// [Jaccard index](crate::metrics::jaccard_coefficient) with the query is
    /// at least `min_jaccard`.
    ///
    /// # Errors
    ///
    /// Fails if `min_jaccard` is not within `[0, 1]`.
    pub fn jaccard_query(
        &mut self,
        begin: I::Position,
        end: I::Position,
        min_jaccard: f64,
    ) -> Result<Vec<&I>> {
        check_fraction(min_jaccard, IntervalTreeError::InvalidJaccard)?;

        self.build();
        let query = SimpleInterval::new(begin, end);
        let mut results = self.nodes.get_overlaps(&self.intervals, begin, end);
        results.retain(|interval| jaccard_coefficient(*interval, &query) >= min_jaccard);
        Ok(results)
    }

    /// Number of intervals in the tree, including those not yet built into it.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// The intervals in insertion order.
    pub fn intervals(&self) -> &[I] {
        &self.intervals
    }

    pub fn into_intervals(self) -> Vec<I> {
        self.intervals
    }

    /// The root node of the built tree.
    pub fn root(&mut self) -> NodeRef<'_, I> {
        self.build();
        NodeRef::new(&self.nodes, &self.intervals, NodeId::ROOT)
    }

    /// Iterates over all intervals, one node at a time in node order. See [`Iter`].
    pub fn iter(&mut self) -> Iter<'_, I> {
        self.build();
        Iter::new(&self.nodes, &self.intervals, self.size)
    }

    /// Iterates over the nodes of the built tree in order.
    pub fn nodes(&mut self) -> Nodes<'_, I> {
        let root = self.root();
        Nodes::new(Some(root))
    }
}

impl<I: Interval> Default for IntervalTree<I> {
    fn default() -> Self {
        IntervalTree::new(Vec::new())
    }
}

impl<I: Interval> FromIterator<I> for IntervalTree<I> {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        IntervalTree::new(iter.into_iter().collect())
    }
}

impl<I: Interval> Extend<I> for IntervalTree<I> {
    fn extend<T: IntoIterator<Item = I>>(&mut self, iter: T) {
        self.intervals.extend(iter);
        self.state = State::Stale;
    }
}

impl<'a, I: Interval> IntoIterator for &'a mut IntervalTree<I> {
    type Item = &'a I;
    type IntoIter = Iter<'a, I>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<I: Interval> fmt::Display for IntervalTree<I> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "IntervalTree(size={})", self.len())
    }
}

impl<I> fmt::Debug for IntervalTree<I>
where
    I: Interval + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("IntervalTree")
            .field("intervals", &self.intervals)
            .field("state", &self.state)
            .finish()
    }
}
