use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;

use num_traits::{Num, NumCast, One, Zero};
#[cfg(feature="serde")]
use serde::{Serialize, Deserialize};

/// A position on the numeric axis intervals live on.
///
/// Implemented for every primitive integer as well as `f32` and `f64`.
/// Beyond plain arithmetic, the tree needs to floor medians when it picks a
/// node center, and to map fractional fuzzy-query margins back onto the axis.
pub trait Coordinate: Copy + PartialOrd + fmt::Debug + fmt::Display + Num + NumCast {
    /// Name of the type, reported in validation errors.
    const TYPE_NAME: &'static str;

    /// Returns `false` if the value cannot be ordered against other positions (`NaN`).
    fn is_valid(self) -> bool {
        true
    }

    /// Rounds towards negative infinity. Identity on integers.
    fn floored(self) -> Self;

    /// `floor((self + other) / 2)`, without overflowing on integers.
    fn midpoint_floor(self, other: Self) -> Self;

    /// The largest position that is not greater than `x`, saturating at the
    /// bounds of the type.
    fn lower_from_f64(x: f64) -> Self;

    /// The smallest position that is not less than `x`, saturating at the
    /// bounds of the type.
    fn upper_from_f64(x: f64) -> Self;

    fn as_f64(self) -> f64;
}

macro_rules! impl_integer_coordinate {
    ($($t:ty),*) => {
        $(
            impl Coordinate for $t {
                const TYPE_NAME: &'static str = stringify!($t);

                #[inline]
                fn floored(self) -> Self {
                    self
                }

                #[inline]
                fn midpoint_floor(self, other: Self) -> Self {
                    // `>>` floors on signed integers too.
                    (self >> 1) + (other >> 1) + (self & other & 1)
                }

                #[inline]
                fn lower_from_f64(x: f64) -> Self {
                    x.floor() as $t
                }

                #[inline]
                fn upper_from_f64(x: f64) -> Self {
                    x.ceil() as $t
                }

                #[inline]
                fn as_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

macro_rules! impl_float_coordinate {
    ($($t:ty),*) => {
        $(
            impl Coordinate for $t {
                const TYPE_NAME: &'static str = stringify!($t);

                #[inline]
                fn is_valid(self) -> bool {
                    !self.is_nan()
                }

                #[inline]
                fn floored(self) -> Self {
                    self.floor()
                }

                #[inline]
                fn midpoint_floor(self, other: Self) -> Self {
                    ((self + other) / 2.0).floor()
                }

                #[inline]
                fn lower_from_f64(x: f64) -> Self {
                    x as $t
                }

                #[inline]
                fn upper_from_f64(x: f64) -> Self {
                    x as $t
                }

                #[inline]
                fn as_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_integer_coordinate!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_float_coordinate!(f32, f64);

/// Total order over positions. Unordered values (`NaN`) compare equal.
#[inline]
pub(crate) fn cmp_positions<T: PartialOrd>(a: &T, b: &T) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// A value that spans `begin..end` on a numeric axis and can be stored in an
/// [`IntervalTree`](crate::interval_tree::IntervalTree).
///
/// Only `begin` and `end` have to be provided. The tree treats two values with
/// the same bounds as the same key, no matter what else they carry.
///
/// Note that the predicates are not symmetric on purpose: [`Interval::contains`]
/// excludes `begin` and includes `end`, while [`Interval::intersects`] excludes
/// both ends of both ranges.
pub trait Interval {
    type Position: Coordinate;

    fn begin(&self) -> Self::Position;

    fn end(&self) -> Self::Position;

    /// `end - begin`.
    fn length(&self) -> Self::Position {
        self.end() - self.begin()
    }

    /// Returns `true` if `end >= position > begin`.
    fn contains(&self, position: Self::Position) -> bool {
        self.end() >= position && position > self.begin()
    }

    /// Returns `true` if `begin..end` and this interval share more than an endpoint.
    fn intersects(&self, begin: Self::Position, end: Self::Position) -> bool {
        end > self.begin() && begin < self.end()
    }

    /// Size of the overlap with `other`.
    ///
    /// Any genuine overlap counts as at least one unit, so two intervals that
    /// overlap by a fraction of a unit still report `1`.
    fn intersection<J>(&self, other: &J) -> Self::Position
    where
        J: Interval<Position = Self::Position> + ?Sized,
    {
        if self.end() <= other.begin() || other.end() <= self.begin() {
            return Self::Position::zero();
        }
        let lo = if self.begin() >= other.begin() { self.begin() } else { other.begin() };
        let hi = if self.end() <= other.end() { self.end() } else { other.end() };
        let size = hi - lo;
        if size < Self::Position::one() {
            Self::Position::one()
        } else {
            size
        }
    }

    /// Orders by `begin`, then by `end`.
    fn cmp_bounds<J>(&self, other: &J) -> Ordering
    where
        J: Interval<Position = Self::Position> + ?Sized,
    {
        cmp_positions(&self.begin(), &other.begin())
            .then_with(|| cmp_positions(&self.end(), &other.end()))
    }

    fn same_bounds<J>(&self, other: &J) -> bool
    where
        J: Interval<Position = Self::Position> + ?Sized,
    {
        self.begin() == other.begin() && self.end() == other.end()
    }
}

impl<I> Interval for &I
where
    I: Interval + ?Sized,
{
    type Position = I::Position;

    fn begin(&self) -> Self::Position {
        (**self).begin()
    }

    fn end(&self) -> Self::Position {
        (**self).end()
    }
}

impl<T: Coordinate> Interval for Range<T> {
    type Position = T;

    fn begin(&self) -> T {
        self.start
    }

    fn end(&self) -> T {
        self.end
    }
}

/// A plain interval carrying nothing but its bounds.
///
/// Equality, hashing and ordering only look at `(begin, end)`.
#[cfg_attr(feature="serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimpleInterval<T> {
    begin: T,
    end: T,
}

impl<T> SimpleInterval<T> {
    pub const fn new(begin: T, end: T) -> Self {
        Self { begin, end }
    }
}

impl<T: Coordinate> Interval for SimpleInterval<T> {
    type Position = T;

    #[inline]
    fn begin(&self) -> T {
        self.begin
    }

    #[inline]
    fn end(&self) -> T {
        self.end
    }
}

impl<T> From<(T, T)> for SimpleInterval<T> {
    fn from((begin, end): (T, T)) -> Self {
        Self::new(begin, end)
    }
}

impl<T> From<Range<T>> for SimpleInterval<T> {
    fn from(range: Range<T>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl<T: fmt::Display> fmt::Display for SimpleInterval<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.begin, self.end)
    }
}
