//! Overlap-quality measures used by the approximate queries of
//! [`IntervalTree`](crate::interval_tree::IntervalTree).

use crate::interval::{Coordinate, Interval};

/// Distance by which both ends of the query `begin..end` may be off while an
/// interval still covers `coverage` of the query.
///
/// The margin is `(end - begin) * (1 - coverage) / 2`: zero at full coverage,
/// and it grows as the required coverage shrinks.
///
/// ```
/// use centered_interval_tree::metrics::boundary_margin;
///
/// assert_eq!(0.0, boundary_margin(0, 100, 1.0));
/// assert!((boundary_margin(0, 100, 0.95) - 2.5).abs() < 1e-9);
/// ```
pub fn boundary_margin<T: Coordinate>(begin: T, end: T, coverage: f64) -> f64 {
    (end.as_f64() - begin.as_f64()) * (1.0 - coverage) / 2.0
}

/// Jaccard index of two intervals: the size of their intersection divided by
/// the size of their union.
///
/// Follows [`Interval::intersection`], so any overlap counts for at least one
/// unit, but measures in `f64` so that wide intervals cannot overflow.
/// Returns `0.0` if both intervals are empty.
pub fn jaccard_coefficient<I, J>(a: &I, b: &J) -> f64
where
    I: Interval + ?Sized,
    J: Interval<Position = I::Position> + ?Sized,
{
    let (a_begin, a_end) = (a.begin().as_f64(), a.end().as_f64());
    let (b_begin, b_end) = (b.begin().as_f64(), b.end().as_f64());

    let intersection = if a_end <= b_begin || b_end <= a_begin {
        0.0
    } else {
        (a_end.min(b_end) - a_begin.max(b_begin)).max(1.0)
    };
    let union = (a_end - a_begin) + (b_end - b_begin) - intersection;
    if union <= 0.0 {
        return 0.0;
    }
    intersection / union
}
