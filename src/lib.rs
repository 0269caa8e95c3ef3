//! Implementation of a centered interval tree ([`interval_tree::IntervalTree`]) for
//! intervals on a numeric axis, such as genomic coordinates. Each node splits its
//! intervals around the median of their endpoints: intervals ending before the
//! center go left, intervals beginning at or after it go right, and the node keeps
//! the ones straddling it. It provides methods for point queries ("which intervals
//! contain position `p`?"), range queries ("which intervals overlap `begin..end`?"),
//! and approximate queries that only keep intervals covering most of the query.
//!
//! The tree is tuned for sets that are queried far more often than they change:
//! inserts are recorded, and the whole tree is rebuilt lazily by the next query.
//!
//! Any type implementing [`interval::Interval`] can be stored in this tree. Positions
//! can be any primitive integer or float (see [`interval::Coordinate`]).

/// The interval contract and a plain interval type.
pub mod interval;
/// An interval tree partitioned around median centers.
pub mod interval_tree;
pub mod error;
pub mod iter;
pub mod metrics;
mod node;

pub use error::{IntervalTreeError, Result};
pub use interval::{Coordinate, Interval, SimpleInterval};
pub use interval_tree::IntervalTree;
pub use node::NodeRef;
