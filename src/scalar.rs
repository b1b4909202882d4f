//! The [`Scalar`] trait for writing AD-generic numeric code.
//!
//! Functions written as `fn f<T: Scalar>(x: T) -> T` work transparently with plain
//! `f64`, `Dual<f64>`, nested `Dual<Dual<f64>>`, and the runtime-order
//! [`NestedDual`](crate::NestedDual). The propagation rules themselves are
//! written once against this trait, which is what lets them recurse into
//! nested numbers until they bottom out at a primitive float.

use std::fmt::{Debug, Display};
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_traits::{Float as NumFloat, FromPrimitive};

use crate::elemental::Elemental;
use crate::float::Float;

/// The central trait for AD-generic numeric code.
///
/// Methods on this trait are the *raw* rules: they never emit domain
/// diagnostics. The user-facing entry points (free functions in
/// [`crate::elemental`], inherent methods on the number types, the `/`
/// operator) report first and then evaluate these under a
/// [`Quiet`](crate::domain::Quiet) guard.
pub trait Scalar:
    Clone
    + Debug
    + Display
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// The underlying primitive float type.
    type Float: Float;

    /// Lift a plain float to this scalar (constant, zero derivative).
    fn from_f(val: Self::Float) -> Self;

    /// Extract the innermost primal value.
    fn value(&self) -> Self::Float;

    /// Apply an elemental function's value rule (and, for AD types, its
    /// derivative rule via the chain rule).
    fn apply(self, f: Elemental) -> Self;

    /// `self^n` for a constant exponent.
    fn pow_const(self, n: Self::Float) -> Self;

    /// `self^n` where the exponent may carry derivatives too.
    fn pow_var(self, n: Self) -> Self;

    /// Lift an `f64` literal (rule constants such as `2` or `0.5`).
    #[inline]
    fn lit(val: f64) -> Self {
        let f = <Self::Float as FromPrimitive>::from_f64(val)
            .unwrap_or_else(<Self::Float as NumFloat>::nan);
        Self::from_f(f)
    }
}

macro_rules! impl_scalar_for_float {
    ($f:ty) => {
        impl Scalar for $f {
            type Float = $f;

            #[inline]
            fn from_f(val: $f) -> Self {
                val
            }

            #[inline]
            fn value(&self) -> $f {
                *self
            }

            #[inline]
            fn apply(self, f: Elemental) -> Self {
                f.eval(self)
            }

            #[inline]
            fn pow_const(self, n: $f) -> Self {
                <$f>::powf(self, n)
            }

            #[inline]
            fn pow_var(self, n: Self) -> Self {
                <$f>::powf(self, n)
            }
        }
    };
}

impl_scalar_for_float!(f32);
impl_scalar_for_float!(f64);
