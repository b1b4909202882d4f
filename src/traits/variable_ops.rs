use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::domain::{self, Domain, Quiet};
use crate::error::{or_panic, Result};
use crate::float::Float;
use crate::variable::Variable;

// ──────────────────────────────────────────────
//  Checked arithmetic
// ──────────────────────────────────────────────

impl<F: Float> Variable<F> {
    /// `self + rhs`, failing on an input-space or output-count mismatch.
    pub fn checked_add(&self, rhs: &Self) -> Result<Self> {
        self.zip_with(rhs, "add", |u, v| u + v, |_, du, _, dv| du + dv)
    }

    pub fn checked_sub(&self, rhs: &Self) -> Result<Self> {
        self.zip_with(rhs, "sub", |u, v| u - v, |_, du, _, dv| du - dv)
    }

    pub fn checked_mul(&self, rhs: &Self) -> Result<Self> {
        self.zip_with(rhs, "mul", |u, v| u * v, |u, du, v, dv| u * dv + du * v)
    }

    /// `self / rhs`. A zero divisor is reported, not rejected.
    pub fn checked_div(&self, rhs: &Self) -> Result<Self> {
        report_first("div", rhs.value().iter().map(|&v| (v, domain::division(v))));
        let _quiet = Quiet::new();
        self.zip_with(
            rhs,
            "div",
            |u, v| u / v,
            |u, du, v, dv| (du * v - u * dv) / (v * v),
        )
    }

    /// `self ^ rhs` with `v·u^(v−1)·du + u^v·ln|u|·dv`.
    ///
    /// The `ln|u|` term is dropped wherever `dv` is zero, so a zero base
    /// raised to a constant exponent keeps a finite derivative.
    pub fn checked_pow(&self, rhs: &Self) -> Result<Self> {
        let broadcast = |len: usize, i: usize| if len == 1 { 0 } else { i };
        let rows = self.outputs().max(rhs.outputs());
        report_first(
            "pow",
            (0..rows).map(|i| {
                let (l, r) = (broadcast(self.outputs(), i), broadcast(rhs.outputs(), i));
                let (Some(&u), Some(&v)) = (self.value().get(l), rhs.value().get(r)) else {
                    return (F::zero(), Domain::Regular);
                };
                let class = if rhs.row_is_constant(r) {
                    domain::power(u, v)
                } else {
                    domain::power_base(u, v)
                };
                (u, class)
            }),
        );
        let _quiet = Quiet::new();
        self.zip_with(
            rhs,
            "pow",
            |u, v| u.powf(v),
            |u, du, v, dv| {
                let base_term = if du.is_zero() {
                    F::zero()
                } else {
                    v * u.powf(v - F::one()) * du
                };
                if dv.is_zero() {
                    base_term
                } else {
                    base_term + u.powf(v) * u.abs().ln() * dv
                }
            },
        )
    }
}

fn report_first<F: Float>(op: &str, mut classified: impl Iterator<Item = (F, Domain)>) {
    if let Some((x, d)) = classified.find(|(_, d)| !d.is_regular()) {
        domain::report(op, x, d);
    }
}

// ──────────────────────────────────────────────
//  Operators (panic on shape mismatch)
// ──────────────────────────────────────────────

macro_rules! impl_variable_binop {
    ($trait:ident, $method:ident, $checked:ident) => {
        impl<F: Float> $trait for Variable<F> {
            type Output = Variable<F>;
            #[inline]
            fn $method(self, rhs: Variable<F>) -> Variable<F> {
                or_panic(self.$checked(&rhs))
            }
        }

        impl<'a, F: Float> $trait<&'a Variable<F>> for &'a Variable<F> {
            type Output = Variable<F>;
            #[inline]
            fn $method(self, rhs: &'a Variable<F>) -> Variable<F> {
                or_panic(self.$checked(rhs))
            }
        }
    };
}

impl_variable_binop!(Add, add, checked_add);
impl_variable_binop!(Sub, sub, checked_sub);
impl_variable_binop!(Mul, mul, checked_mul);
impl_variable_binop!(Div, div, checked_div);

impl<F: Float> Neg for Variable<F> {
    type Output = Variable<F>;
    #[inline]
    fn neg(self) -> Variable<F> {
        self.map_tangent(|x| -x, |_| -F::one())
    }
}

impl<F: Float> Neg for &Variable<F> {
    type Output = Variable<F>;
    #[inline]
    fn neg(self) -> Variable<F> {
        self.map_tangent(|x| -x, |_| -F::one())
    }
}

// Mixed ops with primitive floats on either side.
macro_rules! impl_variable_scalar_ops {
    ($f:ty) => {
        impl Add<$f> for Variable<$f> {
            type Output = Variable<$f>;
            fn add(self, rhs: $f) -> Variable<$f> {
                self.map_tangent(|x| x + rhs, |_| 1.0)
            }
        }

        impl Add<Variable<$f>> for $f {
            type Output = Variable<$f>;
            fn add(self, rhs: Variable<$f>) -> Variable<$f> {
                rhs.map_tangent(|x| self + x, |_| 1.0)
            }
        }

        impl Sub<$f> for Variable<$f> {
            type Output = Variable<$f>;
            fn sub(self, rhs: $f) -> Variable<$f> {
                self.map_tangent(|x| x - rhs, |_| 1.0)
            }
        }

        impl Sub<Variable<$f>> for $f {
            type Output = Variable<$f>;
            fn sub(self, rhs: Variable<$f>) -> Variable<$f> {
                rhs.map_tangent(|x| self - x, |_| -1.0)
            }
        }

        impl Mul<$f> for Variable<$f> {
            type Output = Variable<$f>;
            fn mul(self, rhs: $f) -> Variable<$f> {
                self.map_tangent(|x| x * rhs, |_| rhs)
            }
        }

        impl Mul<Variable<$f>> for $f {
            type Output = Variable<$f>;
            fn mul(self, rhs: Variable<$f>) -> Variable<$f> {
                rhs.map_tangent(|x| self * x, |_| self)
            }
        }

        impl Div<$f> for Variable<$f> {
            type Output = Variable<$f>;
            fn div(self, rhs: $f) -> Variable<$f> {
                domain::report("div", rhs, domain::division(rhs));
                self.map_tangent(|x| x / rhs, |_| 1.0 / rhs)
            }
        }

        impl Div<Variable<$f>> for $f {
            type Output = Variable<$f>;
            fn div(self, rhs: Variable<$f>) -> Variable<$f> {
                report_first("div", rhs.value().iter().map(|&v| (v, domain::division(v))));
                rhs.map_tangent(|x| self / x, |x| -self / (x * x))
            }
        }
    };
}

impl_variable_scalar_ops!(f32);
impl_variable_scalar_ops!(f64);
