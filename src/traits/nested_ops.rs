use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::domain::{self, Quiet};
use crate::error::{or_panic, Result};
use crate::float::Float;
use crate::nested::{
    add_tree, div_tree, is_zero_tree, mul_tree, neg_tree, pow_tree, sub_tree, NestedDual,
};

// ──────────────────────────────────────────────
//  Checked arithmetic
// ──────────────────────────────────────────────

impl<F: Float> NestedDual<F> {
    /// `self + rhs`, failing if both sides are trees of different shape.
    pub fn checked_add(&self, rhs: &Self) -> Result<Self> {
        add_tree(self, rhs)
    }

    pub fn checked_sub(&self, rhs: &Self) -> Result<Self> {
        sub_tree(self, rhs)
    }

    pub fn checked_mul(&self, rhs: &Self) -> Result<Self> {
        mul_tree(self, rhs)
    }

    /// `self / rhs`. A zero divisor is reported, not rejected.
    pub fn checked_div(&self, rhs: &Self) -> Result<Self> {
        let v = rhs.primal();
        domain::report("div", v, domain::division(v));
        let _quiet = Quiet::new();
        div_tree(self, rhs)
    }

    /// `self ^ rhs` with `b·a^(b−1)·da + a^b·ln|a|·db` propagated through
    /// every order.
    pub fn checked_pow(&self, rhs: &Self) -> Result<Self> {
        let (x, e) = (self.primal(), rhs.primal());
        let constant_exponent = match rhs {
            NestedDual::Scalar(_) => true,
            NestedDual::Node { dual, .. } => dual.iter().all(is_zero_tree),
        };
        let class = if constant_exponent {
            domain::power(x, e)
        } else {
            domain::power_base(x, e)
        };
        domain::report("pow", x, class);
        let _quiet = Quiet::new();
        pow_tree(self, rhs)
    }
}

// ──────────────────────────────────────────────
//  Operators (panic on shape mismatch)
// ──────────────────────────────────────────────

macro_rules! impl_nested_binop {
    ($trait:ident, $method:ident, $checked:ident) => {
        impl<F: Float> $trait for NestedDual<F> {
            type Output = NestedDual<F>;
            #[inline]
            fn $method(self, rhs: NestedDual<F>) -> NestedDual<F> {
                or_panic(self.$checked(&rhs))
            }
        }

        impl<'a, F: Float> $trait<&'a NestedDual<F>> for &'a NestedDual<F> {
            type Output = NestedDual<F>;
            #[inline]
            fn $method(self, rhs: &'a NestedDual<F>) -> NestedDual<F> {
                or_panic(self.$checked(rhs))
            }
        }
    };
}

impl_nested_binop!(Add, add, checked_add);
impl_nested_binop!(Sub, sub, checked_sub);
impl_nested_binop!(Mul, mul, checked_mul);
impl_nested_binop!(Div, div, checked_div);

impl<F: Float> Neg for NestedDual<F> {
    type Output = NestedDual<F>;
    #[inline]
    fn neg(self) -> NestedDual<F> {
        neg_tree(&self)
    }
}

impl<F: Float> Neg for &NestedDual<F> {
    type Output = NestedDual<F>;
    #[inline]
    fn neg(self) -> NestedDual<F> {
        neg_tree(self)
    }
}

// Mixed ops with primitive floats: the float is a constant of any order.
macro_rules! impl_nested_scalar_ops {
    ($f:ty) => {
        impl Add<$f> for NestedDual<$f> {
            type Output = NestedDual<$f>;
            fn add(self, rhs: $f) -> NestedDual<$f> {
                or_panic(add_tree(&self, &NestedDual::Scalar(rhs)))
            }
        }

        impl Add<NestedDual<$f>> for $f {
            type Output = NestedDual<$f>;
            fn add(self, rhs: NestedDual<$f>) -> NestedDual<$f> {
                or_panic(add_tree(&NestedDual::Scalar(self), &rhs))
            }
        }

        impl Sub<$f> for NestedDual<$f> {
            type Output = NestedDual<$f>;
            fn sub(self, rhs: $f) -> NestedDual<$f> {
                or_panic(sub_tree(&self, &NestedDual::Scalar(rhs)))
            }
        }

        impl Sub<NestedDual<$f>> for $f {
            type Output = NestedDual<$f>;
            fn sub(self, rhs: NestedDual<$f>) -> NestedDual<$f> {
                or_panic(sub_tree(&NestedDual::Scalar(self), &rhs))
            }
        }

        impl Mul<$f> for NestedDual<$f> {
            type Output = NestedDual<$f>;
            fn mul(self, rhs: $f) -> NestedDual<$f> {
                or_panic(mul_tree(&self, &NestedDual::Scalar(rhs)))
            }
        }

        impl Mul<NestedDual<$f>> for $f {
            type Output = NestedDual<$f>;
            fn mul(self, rhs: NestedDual<$f>) -> NestedDual<$f> {
                or_panic(mul_tree(&NestedDual::Scalar(self), &rhs))
            }
        }

        impl Div<$f> for NestedDual<$f> {
            type Output = NestedDual<$f>;
            fn div(self, rhs: $f) -> NestedDual<$f> {
                or_panic(self.checked_div(&NestedDual::Scalar(rhs)))
            }
        }

        impl Div<NestedDual<$f>> for $f {
            type Output = NestedDual<$f>;
            fn div(self, rhs: NestedDual<$f>) -> NestedDual<$f> {
                or_panic(NestedDual::Scalar(self).checked_div(&rhs))
            }
        }
    };
}

impl_nested_scalar_ops!(f32);
impl_nested_scalar_ops!(f64);
