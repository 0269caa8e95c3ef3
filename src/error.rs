use std::fmt;

/// Errors raised when a query is given arguments it cannot work with.
///
/// Validation always happens before the tree is touched, so a failed call
/// leaves no trace.
#[derive(Clone, Debug, PartialEq)]
pub enum IntervalTreeError {
    /// A point query was given a position that cannot be ordered (`NaN`).
    InvalidPosition {
        /// The rejected value, as printed by `Debug`.
        value: String,
        /// The coordinate type, e.g. `"f64"`.
        type_name: &'static str,
    },
    /// The requested coverage of a fuzzy query is not within `[0, 1]`.
    InvalidCoverage(f64),
    /// The requested Jaccard index of a query is not within `[0, 1]`.
    InvalidJaccard(f64),
}

pub type Result<T> = std::result::Result<T, IntervalTreeError>;

impl fmt::Display for IntervalTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPosition { value, type_name } => {
                write!(f, "Expected a number but `{}` is `{}`", value, type_name)
            }
            Self::InvalidCoverage(coverage) => {
                write!(f, "coverage must be within [0,1], got {}", coverage)
            }
            Self::InvalidJaccard(min_jaccard) => {
                write!(f, "min_jaccard must be within [0,1], got {}", min_jaccard)
            }
        }
    }
}

impl std::error::Error for IntervalTreeError {}

/// Checks that `value` is a fraction in `[0, 1]`. `NaN` is rejected.
pub(crate) fn check_fraction(
    value: f64,
    err: impl FnOnce(f64) -> IntervalTreeError,
) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(err(value))
    }
}
