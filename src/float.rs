use std::fmt::{Debug, Display};

use num_traits::{Float as NumFloat, FloatConst, FromPrimitive};

use crate::scalar::Scalar;

/// Marker trait for base floating-point types (`f32`, `f64`).
///
/// Bundles the numeric and utility traits the AD types need from their
/// innermost primal. Only primitive float types implement this; a base float
/// is also the terminal [`Scalar`] of every nested number, which is what lets
/// rule code written against `Scalar` run on plain floats too.
pub trait Float:
    NumFloat
    + FloatConst
    + FromPrimitive
    + Scalar<Float = Self>
    + Copy
    + Send
    + Sync
    + Default
    + Debug
    + Display
    + 'static
{
}

impl Float for f32 {}
impl Float for f64 {}
