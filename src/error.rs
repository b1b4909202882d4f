//! Hard errors: misuse that must not propagate silently.
//!
//! Domain violations (`sqrt(-1)`, `log(0)`, …) are *not* errors. They flow
//! through as NaN/∞ and are reported on the [`domain`](crate::domain)
//! diagnostic channel instead.

use thiserror::Error;

/// Errors raised when AD objects are constructed or combined inconsistently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Two multivariate numbers were built over input spaces of different size.
    #[error("dimension mismatch in {op}: left operand has n = {left}, right operand has n = {right}")]
    DimensionMismatch {
        op: &'static str,
        left: usize,
        right: usize,
    },

    /// Output counts differ and neither side is a single output that could broadcast.
    #[error("output mismatch in {op}: {left} outputs cannot be combined with {right} outputs")]
    OutputMismatch {
        op: &'static str,
        left: usize,
        right: usize,
    },

    #[error("variable index k = {k} is out of range for an input space of n = {n} (expected 1..={n})")]
    InvalidVariableIndex { k: usize, n: usize },

    #[error("a variable needs at least one output value")]
    NoOutputs,

    #[error("input space must have at least one variable")]
    EmptyInputSpace,

    #[error("seed has {found} entries, expected {expected}")]
    SeedLength { expected: usize, found: usize },

    #[error("jacobian is {rows}x{cols}, expected {expected_rows}x{expected_cols}")]
    JacobianShape {
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },

    #[error("vectorize needs at least one component")]
    EmptyVectorize,

    /// Nested dual numbers of different order were combined.
    #[error("order mismatch in {op}: order {left} cannot be combined with order {right}")]
    OrderMismatch {
        op: &'static str,
        left: usize,
        right: usize,
    },

    /// Nested dual numbers seeded over a different number of variables were combined.
    #[error("lane mismatch in {op}: {left} lanes cannot be combined with {right} lanes")]
    LaneMismatch {
        op: &'static str,
        left: usize,
        right: usize,
    },

    #[error("nesting order must be at least 1, got {order}")]
    InvalidOrder { order: usize },

    #[error("coefficient path of depth {depth} exceeds nesting order {order}")]
    PathTooDeep { depth: usize, order: usize },

    #[error("lane {lane} is out of range for a node with {lanes} lanes")]
    LaneOutOfRange { lane: usize, lanes: usize },

    #[error("expected an order-1 leaf with scalar parts")]
    NotALeaf,

    #[error("{input:?} is not a number")]
    NonNumeric { input: String },
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Unwrap the result of an operation whose operator form cannot fail.
///
/// Shape errors on the `Variable` and `NestedDual` operators mirror
/// nalgebra's dimension mismatch panics; the `checked_*` methods return
/// them instead.
pub(crate) fn or_panic<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("{e}"),
    }
}
