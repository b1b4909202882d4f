use std::fmt::{self, Display};
use std::str::FromStr;

use num_traits::{One, Zero};

use crate::domain::{self, Quiet};
use crate::elemental::{elemental_methods, Elemental};
use crate::error::{Error, Result};
use crate::float::Float;
use crate::nested::NestedDual;
use crate::scalar::Scalar;

/// Forward-mode dual number: a value paired with its tangent (derivative).
///
/// `Dual { re, eps }` represents `re + eps·ε` where `ε² = 0`. The parts may
/// themselves be dual numbers, so `Dual<Dual<f64>>` carries second
/// derivatives: seed it with [`Dual::variable`] at both levels and read
/// `f''` from `eps.eps`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dual<T = f64> {
    /// Primal (real) value.
    pub re: T,
    /// Tangent (derivative) value along the seeded direction.
    pub eps: T,
}

impl<T: Display> Display for Dual<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}ε", self.re, self.eps)
    }
}

impl<T: Scalar> Dual<T> {
    /// Create a new dual number from a value and a derivative seed.
    #[inline]
    pub fn new(re: T, eps: T) -> Self {
        Dual { re, eps }
    }

    /// Create a constant (zero derivative).
    #[inline]
    pub fn constant(re: T) -> Self {
        Dual {
            re,
            eps: T::from_f(T::Float::zero()),
        }
    }

    /// Create a variable (unit derivative) for differentiation.
    #[inline]
    pub fn variable(re: T) -> Self {
        Dual {
            re,
            eps: T::from_f(T::Float::one()),
        }
    }

    elemental_methods!();

    /// `self^n` for a constant exponent: derivative `n·x^(n−1)·dx`.
    pub fn powf(self, n: T::Float) -> Self {
        let x = self.value();
        domain::report("pow", x, domain::power(x, n));
        let _quiet = Quiet::new();
        self.powf_rule(n)
    }

    #[inline]
    pub fn powi(self, n: i32) -> Self {
        self.powf(<T::Float as Scalar>::lit(f64::from(n)))
    }

    /// `self^n` where both base and exponent carry derivatives:
    /// `n·x^(n−1)·dx + x^n·ln|x|·dn`.
    pub fn pow(self, n: Self) -> Self {
        let (x, e) = (self.value(), n.value());
        let class = if n.eps == T::from_f(T::Float::zero()) {
            domain::power(x, e)
        } else {
            domain::power_base(x, e)
        };
        domain::report("pow", x, class);
        let _quiet = Quiet::new();
        self.pow_rule(n)
    }

    /// `base^self` for a constant base: derivative `ln(base)·base^x·dx`.
    pub fn rpow(self, base: T::Float) -> Self {
        domain::report("pow", base, domain::power_base(base, self.value()));
        let _quiet = Quiet::new();
        Self::from_f(base).pow_rule(self)
    }

    /// Reciprocal `1/x`.
    pub fn recip(self) -> Self {
        Self::from_f(T::Float::one()) / self
    }

    fn powf_rule(self, n: T::Float) -> Self {
        let deriv = if n.is_zero() {
            T::from_f(T::Float::zero())
        } else {
            T::from_f(n) * self.re.clone().pow_const(n - T::Float::one())
        };
        Dual {
            re: self.re.pow_const(n),
            eps: self.eps * deriv,
        }
    }

    fn pow_rule(self, n: Self) -> Self {
        let one = T::from_f(T::Float::one());
        if n.eps == T::from_f(T::Float::zero()) {
            // Constant exponent: skip the ln|x| term so x = 0 stays finite.
            let deriv = n.re.clone() * self.re.clone().pow_var(n.re.clone() - one);
            return Dual {
                re: self.re.pow_var(n.re),
                eps: self.eps * deriv,
            };
        }
        let val = self.re.clone().pow_var(n.re.clone());
        let ln_abs = self.re.clone().apply(Elemental::Abs).apply(Elemental::Log);
        let eps = n.re.clone() * self.re.pow_var(n.re - one) * self.eps + val.clone() * ln_abs * n.eps;
        Dual { re: val, eps }
    }
}

impl<F: Float> Dual<F> {
    /// Expand this order-1 dual number into a nested dual of depth `order`.
    ///
    /// The result tracks derivatives up to `order` along `eps`; see
    /// [`NestedDual::variable`].
    pub fn make_highest_order(self, order: usize) -> Result<NestedDual<F>> {
        NestedDual::variable(self.re, &[self.eps], order)
    }
}

impl<T: Scalar> Scalar for Dual<T> {
    type Float = T::Float;

    #[inline]
    fn from_f(val: T::Float) -> Self {
        Dual::constant(T::from_f(val))
    }

    #[inline]
    fn value(&self) -> T::Float {
        self.re.value()
    }

    fn apply(self, f: Elemental) -> Self {
        let deriv = f.derivative(&self.re);
        Dual {
            re: self.re.apply(f),
            eps: self.eps * deriv,
        }
    }

    #[inline]
    fn pow_const(self, n: T::Float) -> Self {
        self.powf_rule(n)
    }

    #[inline]
    fn pow_var(self, n: Self) -> Self {
        self.pow_rule(n)
    }
}

/// Parses either a plain number (a constant) or the `Display` form
/// `"re + epsε"`.
impl<F: Float> FromStr for Dual<F> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let non_numeric = || Error::NonNumeric {
            input: s.to_string(),
        };
        let parse = |part: &str| F::from_str_radix(part.trim(), 10).map_err(|_| non_numeric());
        match s.trim().strip_suffix('ε') {
            Some(body) => {
                let (re, eps) = body.split_once(" + ").ok_or_else(non_numeric)?;
                Ok(Dual::new(parse(re)?, parse(eps)?))
            }
            None => Ok(Dual::constant(parse(s)?)),
        }
    }
}
