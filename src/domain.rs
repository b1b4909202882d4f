//! Non-fatal diagnostics for evaluations outside a function's domain.
//!
//! Out-of-domain inputs never abort a computation: values and derivatives
//! become NaN or ±∞ exactly as IEEE arithmetic dictates. Each offending
//! user-level operation emits one `log::warn!` on the `dualdiff::domain`
//! target and bumps a thread-local counter, so a caller sweeping many
//! points can log or count the violations without stopping.

use std::cell::Cell;
use std::fmt::Display;

use log::warn;

use crate::float::Float;

/// Log target used for every domain diagnostic.
pub const TARGET: &str = "dualdiff::domain";

/// Where an input falls relative to a function's domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Domain {
    /// Value and derivative are finite real numbers.
    Regular,
    /// Value exists but the derivative diverges (e.g. `sqrt` at 0).
    Singular,
    /// Value is not a real number (e.g. `sqrt` of a negative).
    Undefined,
}

impl Domain {
    #[inline]
    pub fn is_regular(self) -> bool {
        self == Domain::Regular
    }

    /// The more severe of two classifications.
    #[inline]
    pub fn worst(self, other: Domain) -> Domain {
        match (self, other) {
            (Domain::Undefined, _) | (_, Domain::Undefined) => Domain::Undefined,
            (Domain::Singular, _) | (_, Domain::Singular) => Domain::Singular,
            _ => Domain::Regular,
        }
    }
}

thread_local! {
    static VIOLATIONS: Cell<usize> = const { Cell::new(0) };
    static QUIET_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Number of domain violations reported on this thread since the last reset.
pub fn violation_count() -> usize {
    VIOLATIONS.with(Cell::get)
}

/// Reset this thread's violation counter to zero.
pub fn reset_violation_count() {
    VIOLATIONS.with(|c| c.set(0));
}

/// RAII guard that silences domain reports on this thread until dropped.
///
/// Guards nest. Rule evaluation inside an already-reported operation runs
/// under one of these so a nested number yields a single diagnostic; callers
/// may also hold one to mute an intentionally out-of-domain sweep.
pub struct Quiet {
    _private: (),
}

impl Quiet {
    pub fn new() -> Self {
        QUIET_DEPTH.with(|d| d.set(d.get() + 1));
        Quiet { _private: () }
    }
}

impl Default for Quiet {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Quiet {
    fn drop(&mut self) {
        QUIET_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

fn is_quiet() -> bool {
    QUIET_DEPTH.with(Cell::get) > 0
}

/// Emit a diagnostic for `op` at `input` unless `domain` is regular or a
/// [`Quiet`] guard is active.
pub(crate) fn report(op: &str, input: impl Display, domain: Domain) {
    if domain.is_regular() || is_quiet() {
        return;
    }
    VIOLATIONS.with(|c| c.set(c.get() + 1));
    match domain {
        Domain::Singular => warn!(target: TARGET, "{op}: derivative diverges at {input}"),
        Domain::Undefined => warn!(target: TARGET, "{op}: undefined at {input}"),
        Domain::Regular => {}
    }
}

/// Classify a divisor: dividing by zero is singular.
pub(crate) fn division<F: Float>(divisor: F) -> Domain {
    if divisor.is_zero() {
        Domain::Singular
    } else {
        Domain::Regular
    }
}

/// Classify `base^exponent` for a constant exponent.
///
/// A negative base has no real non-integer power; a zero base makes the
/// derivative diverge for exponents below one.
pub(crate) fn power<F: Float>(base: F, exponent: F) -> Domain {
    if base < F::zero() && !exponent.fract().is_zero() {
        Domain::Undefined
    } else if base.is_zero() && exponent < F::one() && !exponent.is_zero() {
        Domain::Singular
    } else {
        Domain::Regular
    }
}

/// Classify the base of a power whose exponent carries a derivative.
///
/// The `ln|base|` term diverges at a zero base.
pub(crate) fn power_base<F: Float>(base: F, exponent: F) -> Domain {
    if base.is_zero() {
        Domain::Singular
    } else {
        power(base, exponent)
    }
}

/// Classify the base of a logarithm (`logbase`).
pub(crate) fn log_base<F: Float>(base: F) -> Domain {
    if base <= F::zero() || base.is_nan() {
        Domain::Undefined
    } else if base == F::one() {
        Domain::Singular
    } else {
        Domain::Regular
    }
}
