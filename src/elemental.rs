//! Elementary functions: one value rule and one derivative rule per function.
//!
//! Every function follows the same pattern, `value = f(x)`,
//! `derivative = f'(x)·dx`. [`Elemental`] is the rule table; each number type
//! applies it through its [`Scalar::apply`] implementation, so the table is
//! written once and is correct at any nesting depth.
//!
//! The free functions ([`sin`], [`log`], [`logbase`], …) accept anything
//! [`Differentiable`]: AD numbers come back as AD numbers, plain floats come
//! back as plain floats.

use num_traits::{Float as NumFloat, FloatConst, One, Zero};

use crate::domain::{self, Domain, Quiet};
use crate::float::Float;
use crate::scalar::Scalar;

/// An elementary function with a known derivative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Elemental {
    Sin,
    Cos,
    Tan,
    Arcsin,
    Arccos,
    Arctan,
    Sinh,
    Cosh,
    Tanh,
    Arcsinh,
    Arccosh,
    Arctanh,
    Exp,
    Log,
    Log10,
    Sqrt,
    Logistic,
    Abs,
}

impl Elemental {
    /// Every elemental, in table order.
    pub const ALL: [Elemental; 18] = [
        Elemental::Sin,
        Elemental::Cos,
        Elemental::Tan,
        Elemental::Arcsin,
        Elemental::Arccos,
        Elemental::Arctan,
        Elemental::Sinh,
        Elemental::Cosh,
        Elemental::Tanh,
        Elemental::Arcsinh,
        Elemental::Arccosh,
        Elemental::Arctanh,
        Elemental::Exp,
        Elemental::Log,
        Elemental::Log10,
        Elemental::Sqrt,
        Elemental::Logistic,
        Elemental::Abs,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Elemental::Sin => "sin",
            Elemental::Cos => "cos",
            Elemental::Tan => "tan",
            Elemental::Arcsin => "arcsin",
            Elemental::Arccos => "arccos",
            Elemental::Arctan => "arctan",
            Elemental::Sinh => "sinh",
            Elemental::Cosh => "cosh",
            Elemental::Tanh => "tanh",
            Elemental::Arcsinh => "arcsinh",
            Elemental::Arccosh => "arccosh",
            Elemental::Arctanh => "arctanh",
            Elemental::Exp => "exp",
            Elemental::Log => "log",
            Elemental::Log10 => "log10",
            Elemental::Sqrt => "sqrt",
            Elemental::Logistic => "logistic",
            Elemental::Abs => "abs",
        }
    }

    /// Value rule on a primitive float.
    pub fn eval<F: Float>(self, x: F) -> F {
        let x = if self.unsigned_zero() { x + F::zero() } else { x };
        match self {
            Elemental::Sin => x.sin(),
            Elemental::Cos => x.cos(),
            Elemental::Tan => {
                if tan_pole(x) {
                    F::nan()
                } else {
                    x.tan()
                }
            }
            Elemental::Arcsin => x.asin(),
            Elemental::Arccos => x.acos(),
            Elemental::Arctan => x.atan(),
            Elemental::Sinh => x.sinh(),
            Elemental::Cosh => x.cosh(),
            Elemental::Tanh => x.tanh(),
            Elemental::Arcsinh => x.asinh(),
            Elemental::Arccosh => x.acosh(),
            Elemental::Arctanh => x.atanh(),
            Elemental::Exp => x.exp(),
            Elemental::Log => x.ln(),
            Elemental::Log10 => x.log10(),
            Elemental::Sqrt => x.sqrt(),
            Elemental::Logistic => F::one() / (F::one() + (-x).exp()),
            Elemental::Abs => NumFloat::abs(x),
        }
    }

    /// Derivative rule `f'(x)`, computed in `T`'s own arithmetic.
    ///
    /// When `T` is itself an AD number this yields the derivative of the
    /// derivative as well, which is what makes nesting work.
    pub fn derivative<T: Scalar>(self, x: &T) -> T {
        let unsigned;
        let x = if self.unsigned_zero() {
            unsigned = x.clone() + T::from_f(T::Float::zero());
            &unsigned
        } else {
            x
        };
        let one = || T::from_f(T::Float::one());
        let square = || x.clone() * x.clone();
        match self {
            Elemental::Sin => x.clone().apply(Elemental::Cos),
            Elemental::Cos => -x.clone().apply(Elemental::Sin),
            Elemental::Tan => {
                if tan_pole(x.value()) {
                    T::from_f(T::Float::nan())
                } else {
                    let c = x.clone().apply(Elemental::Cos);
                    one() / (c.clone() * c)
                }
            }
            Elemental::Arcsin => one() / (one() - square()).apply(Elemental::Sqrt),
            Elemental::Arccos => -(one() / (one() - square()).apply(Elemental::Sqrt)),
            Elemental::Arctan => one() / (one() + square()),
            Elemental::Sinh => x.clone().apply(Elemental::Cosh),
            Elemental::Cosh => x.clone().apply(Elemental::Sinh),
            Elemental::Tanh => {
                let c = x.clone().apply(Elemental::Cosh);
                one() / (c.clone() * c)
            }
            Elemental::Arcsinh => one() / (square() + one()).apply(Elemental::Sqrt),
            Elemental::Arccosh => one() / (square() - one()).apply(Elemental::Sqrt),
            Elemental::Arctanh => one() / (one() - square()),
            Elemental::Exp => x.clone().apply(Elemental::Exp),
            Elemental::Log => one() / x.clone(),
            Elemental::Log10 => one() / (x.clone() * T::from_f(T::Float::LN_10())),
            Elemental::Sqrt => one() / (T::lit(2.0) * x.clone().apply(Elemental::Sqrt)),
            Elemental::Logistic => {
                let s = x.clone().apply(Elemental::Logistic);
                s.clone() * (one() - s)
            }
            Elemental::Abs => x.clone() / x.clone().apply(Elemental::Abs),
        }
    }

    /// Functions whose rules treat `-0.0` as `+0.0`: `x + 0` clears the
    /// sign of a zero and leaves every other value unchanged.
    fn unsigned_zero(self) -> bool {
        matches!(self, Elemental::Log | Elemental::Log10 | Elemental::Sqrt)
    }

    /// Classify a primal input against this function's domain.
    pub fn domain<F: Float>(self, x: F) -> Domain {
        let one = F::one();
        match self {
            Elemental::Tan if tan_pole(x) => Domain::Undefined,
            Elemental::Arcsin | Elemental::Arccos | Elemental::Arctanh => {
                if x.abs() > one {
                    Domain::Undefined
                } else if x.abs() == one {
                    Domain::Singular
                } else {
                    Domain::Regular
                }
            }
            Elemental::Arccosh => {
                if x < one {
                    Domain::Undefined
                } else if x == one {
                    Domain::Singular
                } else {
                    Domain::Regular
                }
            }
            Elemental::Log | Elemental::Log10 | Elemental::Sqrt => {
                if x < F::zero() {
                    Domain::Undefined
                } else if x.is_zero() {
                    Domain::Singular
                } else {
                    Domain::Regular
                }
            }
            Elemental::Abs if x.is_zero() => Domain::Singular,
            _ => Domain::Regular,
        }
    }
}

/// `x` is a multiple of π/2 but not of π, where tan has its asymptotes.
fn tan_pole<F: Float>(x: F) -> bool {
    (x % F::FRAC_PI_2()).is_zero() && !(x % F::PI()).is_zero()
}

/// Anything an elementary function can be applied to.
///
/// Implemented for every [`Scalar`] (plain floats, [`Dual`](crate::Dual),
/// [`NestedDual`](crate::NestedDual)) and for
/// [`Variable`](crate::Variable).
pub trait Differentiable: Sized {
    type Float: Float;

    /// Apply `f` without emitting diagnostics.
    fn apply_elemental(self, f: Elemental) -> Self;

    /// Report the first primal this number carries that `classify` flags.
    fn report_domain<C>(&self, op: &str, classify: C)
    where
        C: Fn(Self::Float) -> Domain;

    /// Multiply by a constant.
    fn scale(self, k: Self::Float) -> Self;

    /// Apply `f`, reporting out-of-domain inputs once.
    fn elemental(self, f: Elemental) -> Self {
        self.report_domain(f.name(), |x| f.domain(x));
        let _quiet = Quiet::new();
        self.apply_elemental(f)
    }

    /// Logarithm in an arbitrary constant base: `ln(x) / ln(base)`.
    fn log_base(self, base: Self::Float) -> Self {
        domain::report("logbase", base, domain::log_base(base));
        self.report_domain("logbase", |x| Elemental::Log.domain(x));
        let _quiet = Quiet::new();
        let inv_ln_base = Self::Float::one() / base.ln();
        self.apply_elemental(Elemental::Log).scale(inv_ln_base)
    }
}

impl<T: Scalar> Differentiable for T {
    type Float = T::Float;

    #[inline]
    fn apply_elemental(self, f: Elemental) -> Self {
        self.apply(f)
    }

    fn report_domain<C>(&self, op: &str, classify: C)
    where
        C: Fn(Self::Float) -> Domain,
    {
        let x = self.value();
        domain::report(op, x, classify(x));
    }

    #[inline]
    fn scale(self, k: Self::Float) -> Self {
        self * T::from_f(k)
    }
}

/// Inherent elemental methods shared by every AD number type.
macro_rules! elemental_methods {
    () => {
        #[inline]
        pub fn sin(self) -> Self {
            $crate::elemental::Differentiable::elemental(self, $crate::Elemental::Sin)
        }

        #[inline]
        pub fn cos(self) -> Self {
            $crate::elemental::Differentiable::elemental(self, $crate::Elemental::Cos)
        }

        /// Tangent. NaN (with a diagnostic) at odd multiples of π/2.
        #[inline]
        pub fn tan(self) -> Self {
            $crate::elemental::Differentiable::elemental(self, $crate::Elemental::Tan)
        }

        #[inline]
        pub fn asin(self) -> Self {
            $crate::elemental::Differentiable::elemental(self, $crate::Elemental::Arcsin)
        }

        #[inline]
        pub fn acos(self) -> Self {
            $crate::elemental::Differentiable::elemental(self, $crate::Elemental::Arccos)
        }

        #[inline]
        pub fn atan(self) -> Self {
            $crate::elemental::Differentiable::elemental(self, $crate::Elemental::Arctan)
        }

        #[inline]
        pub fn sinh(self) -> Self {
            $crate::elemental::Differentiable::elemental(self, $crate::Elemental::Sinh)
        }

        #[inline]
        pub fn cosh(self) -> Self {
            $crate::elemental::Differentiable::elemental(self, $crate::Elemental::Cosh)
        }

        #[inline]
        pub fn tanh(self) -> Self {
            $crate::elemental::Differentiable::elemental(self, $crate::Elemental::Tanh)
        }

        #[inline]
        pub fn asinh(self) -> Self {
            $crate::elemental::Differentiable::elemental(self, $crate::Elemental::Arcsinh)
        }

        #[inline]
        pub fn acosh(self) -> Self {
            $crate::elemental::Differentiable::elemental(self, $crate::Elemental::Arccosh)
        }

        #[inline]
        pub fn atanh(self) -> Self {
            $crate::elemental::Differentiable::elemental(self, $crate::Elemental::Arctanh)
        }

        #[inline]
        pub fn exp(self) -> Self {
            $crate::elemental::Differentiable::elemental(self, $crate::Elemental::Exp)
        }

        /// Natural logarithm.
        #[inline]
        pub fn ln(self) -> Self {
            $crate::elemental::Differentiable::elemental(self, $crate::Elemental::Log)
        }

        #[inline]
        pub fn log10(self) -> Self {
            $crate::elemental::Differentiable::elemental(self, $crate::Elemental::Log10)
        }

        #[inline]
        pub fn log_base(self, base: <Self as $crate::elemental::Differentiable>::Float) -> Self {
            $crate::elemental::Differentiable::log_base(self, base)
        }

        #[inline]
        pub fn sqrt(self) -> Self {
            $crate::elemental::Differentiable::elemental(self, $crate::Elemental::Sqrt)
        }

        /// Logistic sigmoid `1 / (1 + e^(-x))`.
        #[inline]
        pub fn logistic(self) -> Self {
            $crate::elemental::Differentiable::elemental(self, $crate::Elemental::Logistic)
        }

        /// Absolute value. The derivative is undefined (NaN) at zero.
        #[inline]
        pub fn abs(self) -> Self {
            $crate::elemental::Differentiable::elemental(self, $crate::Elemental::Abs)
        }
    };
}

pub(crate) use elemental_methods;

pub fn sin<T: Differentiable>(x: T) -> T {
    x.elemental(Elemental::Sin)
}

pub fn cos<T: Differentiable>(x: T) -> T {
    x.elemental(Elemental::Cos)
}

pub fn tan<T: Differentiable>(x: T) -> T {
    x.elemental(Elemental::Tan)
}

pub fn arcsin<T: Differentiable>(x: T) -> T {
    x.elemental(Elemental::Arcsin)
}

pub fn arccos<T: Differentiable>(x: T) -> T {
    x.elemental(Elemental::Arccos)
}

pub fn arctan<T: Differentiable>(x: T) -> T {
    x.elemental(Elemental::Arctan)
}

pub fn sinh<T: Differentiable>(x: T) -> T {
    x.elemental(Elemental::Sinh)
}

pub fn cosh<T: Differentiable>(x: T) -> T {
    x.elemental(Elemental::Cosh)
}

pub fn tanh<T: Differentiable>(x: T) -> T {
    x.elemental(Elemental::Tanh)
}

pub fn arcsinh<T: Differentiable>(x: T) -> T {
    x.elemental(Elemental::Arcsinh)
}

pub fn arccosh<T: Differentiable>(x: T) -> T {
    x.elemental(Elemental::Arccosh)
}

pub fn arctanh<T: Differentiable>(x: T) -> T {
    x.elemental(Elemental::Arctanh)
}

pub fn exp<T: Differentiable>(x: T) -> T {
    x.elemental(Elemental::Exp)
}

/// Natural logarithm.
pub fn log<T: Differentiable>(x: T) -> T {
    x.elemental(Elemental::Log)
}

pub fn log10<T: Differentiable>(x: T) -> T {
    x.elemental(Elemental::Log10)
}

/// Logarithm of `x` in a constant `base`. Derivative `1 / (x·ln base)`.
///
/// A base that is not positive, or equal to one, has no real logarithm and
/// is reported like any other domain violation.
pub fn logbase<T: Differentiable>(x: T, base: T::Float) -> T {
    x.log_base(base)
}

pub fn sqrt<T: Differentiable>(x: T) -> T {
    x.elemental(Elemental::Sqrt)
}

pub fn logistic<T: Differentiable>(x: T) -> T {
    x.elemental(Elemental::Logistic)
}

pub fn abs<T: Differentiable>(x: T) -> T {
    x.elemental(Elemental::Abs)
}
