//! Runtime-order nested dual numbers.
//!
//! `Dual<Dual<f64>>` fixes its depth in the type. [`NestedDual`] builds the
//! same structure at runtime: a node of order `k` holds a real part and one
//! dual part per independent variable ("lane"), each of order `k − 1`, and
//! the recursion bottoms out at a plain float. Derivatives of order up to `k`
//! along any combination of lanes are read back by walking a [`Branch`]
//! path: `[Dual(i), Dual(j)]` is `∂²f/∂xᵢ∂xⱼ`, `[Dual(i), Real]` is `∂f/∂xᵢ`,
//! `[Real, Real]` is `f`.

use std::fmt::{self, Display};

use log::trace;
use crate::domain::{self, Quiet};
use crate::elemental::{elemental_methods, Elemental};
use crate::error::{or_panic, Error, Result};
use crate::float::Float;
use crate::scalar::Scalar;

/// A dual number whose nesting depth is chosen at runtime.
///
/// Trees built by [`NestedDual::variable`] and [`NestedDual::constant`] are
/// uniform: every node at the same depth has the same order and lane count.
/// Arithmetic preserves that shape. A bare [`NestedDual::Scalar`] combines
/// with a tree of any order as a constant.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NestedDual<F> {
    /// Order 0: a plain value.
    Scalar(F),
    /// Order `k ≥ 1`: `real + Σᵢ dual[i]·εᵢ` with children of order `k − 1`.
    Node {
        real: Box<NestedDual<F>>,
        dual: Vec<NestedDual<F>>,
    },
}

/// One step of a read-out path through a [`NestedDual`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Branch {
    /// Descend into the real part.
    Real,
    /// Descend into the dual part for the given variable.
    Dual(usize),
}

impl<F: Float> NestedDual<F> {
    /// An order-1 variable: value `value`, one lane per seed entry.
    pub fn leaf(value: F, seed: &[F]) -> Result<Self> {
        Self::variable(value, seed, 1)
    }

    /// A variable tracked to `order` derivatives.
    ///
    /// The real part recurses on the same value and seed; every dual lane is
    /// the constant seed entry one order lower. Differentiating `x` once
    /// along lane `i` gives `seed[i]`, and again gives zero.
    pub fn variable(value: F, seed: &[F], order: usize) -> Result<Self> {
        if seed.is_empty() {
            return Err(Error::EmptyInputSpace);
        }
        if order == 0 {
            return Err(Error::InvalidOrder { order });
        }
        trace!(
            "nested variable: value={value}, lanes={}, order={order}",
            seed.len()
        );
        Ok(Self::build(value, seed, order))
    }

    fn build(value: F, seed: &[F], order: usize) -> Self {
        if order == 0 {
            return NestedDual::Scalar(value);
        }
        NestedDual::Node {
            real: Box::new(Self::build(value, seed, order - 1)),
            dual: seed
                .iter()
                .map(|&s| Self::constant(s, order - 1, seed.len()))
                .collect(),
        }
    }

    /// A constant of the given order and lane count: every dual part is zero.
    pub fn constant(value: F, order: usize, lanes: usize) -> Self {
        if order == 0 {
            return NestedDual::Scalar(value);
        }
        let zero = Self::constant(F::zero(), order - 1, lanes);
        NestedDual::Node {
            real: Box::new(Self::constant(value, order - 1, lanes)),
            dual: vec![zero; lanes],
        }
    }

    /// Re-seed an order-1 leaf at a higher order, keeping its value and seed.
    ///
    /// Fails with [`Error::NotALeaf`] unless `self` is an order-1 node whose
    /// parts are all plain values.
    pub fn make_highest_order(&self, order: usize) -> Result<Self> {
        match self {
            NestedDual::Node { real, dual } => {
                let value = match &**real {
                    NestedDual::Scalar(v) => *v,
                    NestedDual::Node { .. } => return Err(Error::NotALeaf),
                };
                let seed = dual
                    .iter()
                    .map(|d| match d {
                        NestedDual::Scalar(s) => Ok(*s),
                        NestedDual::Node { .. } => Err(Error::NotALeaf),
                    })
                    .collect::<Result<Vec<F>>>()?;
                Self::variable(value, &seed, order)
            }
            NestedDual::Scalar(_) => Err(Error::NotALeaf),
        }
    }

    /// Nesting depth: 0 for a plain value.
    pub fn order(&self) -> usize {
        match self {
            NestedDual::Scalar(_) => 0,
            NestedDual::Node { real, .. } => 1 + real.order(),
        }
    }

    /// Number of dual lanes at the top level.
    pub fn lanes(&self) -> usize {
        match self {
            NestedDual::Scalar(_) => 0,
            NestedDual::Node { dual, .. } => dual.len(),
        }
    }

    /// The innermost real value, following `Real` all the way down.
    pub fn primal(&self) -> F {
        match self {
            NestedDual::Scalar(v) => *v,
            NestedDual::Node { real, .. } => real.primal(),
        }
    }

    /// The subtree reached by following `path`.
    pub fn at(&self, path: &[Branch]) -> Result<&Self> {
        let order = self.order();
        let mut node = self;
        for step in path {
            let NestedDual::Node { real, dual } = node else {
                return Err(Error::PathTooDeep {
                    depth: path.len(),
                    order,
                });
            };
            node = match *step {
                Branch::Real => &**real,
                Branch::Dual(lane) => dual.get(lane).ok_or(Error::LaneOutOfRange {
                    lane,
                    lanes: dual.len(),
                })?,
            };
        }
        Ok(node)
    }

    /// The coefficient at `path`.
    ///
    /// A path shorter than the tree is padded with `Real`, so `[Dual(0)]` on
    /// an order-3 tree reads the first derivative.
    pub fn coefficient_at(&self, path: &[Branch]) -> Result<F> {
        self.at(path).map(Self::primal)
    }

    /// Univariate Taylor-style coefficients `[f, f', …, f⁽ⁿ⁾]` along lane 0.
    pub fn coefficients(&self, order: usize) -> Result<Coefficients<F>> {
        self.coefficients_along(0, order)
    }

    /// Derivatives `[f, ∂f, ∂²f, …]` of order `0..=order` along one lane.
    ///
    /// Entry `i` is read at `[Dual(lane); i]`; these are plain derivatives,
    /// not divided by `i!`.
    pub fn coefficients_along(&self, lane: usize, order: usize) -> Result<Coefficients<F>> {
        if order > self.order() {
            return Err(Error::PathTooDeep {
                depth: order,
                order: self.order(),
            });
        }
        let path = vec![Branch::Dual(lane); order];
        (0..=order)
            .map(|i| self.coefficient_at(&path[..i]))
            .collect::<Result<Vec<F>>>()
            .map(Coefficients)
    }

    elemental_methods!();

    /// `self^n` for a constant exponent.
    pub fn powf(self, n: F) -> Self {
        let x = self.primal();
        domain::report("pow", x, domain::power(x, n));
        let _quiet = Quiet::new();
        Scalar::pow_const(self, n)
    }

    #[inline]
    pub fn powi(self, n: i32) -> Self {
        self.powf(F::lit(f64::from(n)))
    }

    /// `self^n` where the exponent may carry derivatives too.
    ///
    /// # Panics
    ///
    /// Panics if both operands are trees of different order or lane count;
    /// see [`NestedDual::checked_pow`].
    pub fn pow(self, n: Self) -> Self {
        or_panic(self.checked_pow(&n))
    }

    /// `base^self` for a constant base.
    pub fn rpow(self, base: F) -> Self {
        domain::report("pow", base, domain::power_base(base, self.primal()));
        let _quiet = Quiet::new();
        or_panic(pow_tree(&NestedDual::Scalar(base), &self))
    }

    /// Apply an elemental to every node: `f(real) + f'(real)·dual`.
    pub(crate) fn apply_tree(&self, f: Elemental) -> Result<Self> {
        match self {
            NestedDual::Scalar(x) => Ok(NestedDual::Scalar(f.eval(*x))),
            NestedDual::Node { real, dual } => {
                let deriv = f.derivative(&**real);
                Ok(NestedDual::Node {
                    real: Box::new(real.apply_tree(f)?),
                    dual: dual
                        .iter()
                        .map(|d| mul_tree(d, &deriv))
                        .collect::<Result<_>>()?,
                })
            }
        }
    }

    pub(crate) fn pow_const_tree(&self, n: F) -> Result<Self> {
        match self {
            NestedDual::Scalar(x) => Ok(NestedDual::Scalar(x.powf(n))),
            NestedDual::Node { real, dual } => {
                let deriv = if n.is_zero() {
                    NestedDual::Scalar(F::zero())
                } else {
                    mul_tree(&NestedDual::Scalar(n), &real.pow_const_tree(n - F::one())?)?
                };
                Ok(NestedDual::Node {
                    real: Box::new(real.pow_const_tree(n)?),
                    dual: dual
                        .iter()
                        .map(|d| mul_tree(d, &deriv))
                        .collect::<Result<_>>()?,
                })
            }
        }
    }
}

/// Shape check shared by every binary operation on two trees.
pub(crate) fn check_shape<F: Float>(
    op: &'static str,
    a: &NestedDual<F>,
    b: &NestedDual<F>,
) -> Result<()> {
    if a.order() != b.order() {
        return Err(Error::OrderMismatch {
            op,
            left: a.order(),
            right: b.order(),
        });
    }
    if a.lanes() != b.lanes() {
        return Err(Error::LaneMismatch {
            op,
            left: a.lanes(),
            right: b.lanes(),
        });
    }
    Ok(())
}

fn map_dual<F, G>(dual: &[NestedDual<F>], g: G) -> Result<Vec<NestedDual<F>>>
where
    F: Float,
    G: Fn(&NestedDual<F>) -> Result<NestedDual<F>>,
{
    dual.iter().map(g).collect()
}

pub(crate) fn neg_tree<F: Float>(a: &NestedDual<F>) -> NestedDual<F> {
    match a {
        NestedDual::Scalar(x) => NestedDual::Scalar(-*x),
        NestedDual::Node { real, dual } => NestedDual::Node {
            real: Box::new(neg_tree(real)),
            dual: dual.iter().map(neg_tree).collect(),
        },
    }
}

pub(crate) fn add_tree<F: Float>(a: &NestedDual<F>, b: &NestedDual<F>) -> Result<NestedDual<F>> {
    use NestedDual::{Node, Scalar as S};
    match (a, b) {
        (S(x), S(y)) => Ok(S(*x + *y)),
        (Node { real, dual }, S(_)) => Ok(Node {
            real: Box::new(add_tree(real, b)?),
            dual: dual.clone(),
        }),
        (S(_), Node { real, dual }) => Ok(Node {
            real: Box::new(add_tree(a, real)?),
            dual: dual.clone(),
        }),
        (Node { real: ra, dual: da }, Node { real: rb, dual: db }) => {
            check_shape("add", a, b)?;
            Ok(Node {
                real: Box::new(add_tree(ra, rb)?),
                dual: da
                    .iter()
                    .zip(db)
                    .map(|(x, y)| add_tree(x, y))
                    .collect::<Result<_>>()?,
            })
        }
    }
}

pub(crate) fn sub_tree<F: Float>(a: &NestedDual<F>, b: &NestedDual<F>) -> Result<NestedDual<F>> {
    if let (NestedDual::Node { .. }, NestedDual::Node { .. }) = (a, b) {
        check_shape("sub", a, b)?;
    }
    add_tree(a, &neg_tree(b))
}

pub(crate) fn mul_tree<F: Float>(a: &NestedDual<F>, b: &NestedDual<F>) -> Result<NestedDual<F>> {
    use NestedDual::{Node, Scalar as S};
    match (a, b) {
        (S(x), S(y)) => Ok(S(*x * *y)),
        (Node { real, dual }, S(_)) => Ok(Node {
            real: Box::new(mul_tree(real, b)?),
            dual: map_dual(dual, |d| mul_tree(d, b))?,
        }),
        (S(_), Node { real, dual }) => Ok(Node {
            real: Box::new(mul_tree(a, real)?),
            dual: map_dual(dual, |d| mul_tree(a, d))?,
        }),
        (Node { real: ra, dual: da }, Node { real: rb, dual: db }) => {
            check_shape("mul", a, b)?;
            // (u + du·ε)(v + dv·ε) = uv + (u·dv + du·v)ε
            let dual = da
                .iter()
                .zip(db)
                .map(|(du, dv)| add_tree(&mul_tree(ra, dv)?, &mul_tree(du, rb)?))
                .collect::<Result<_>>()?;
            Ok(Node {
                real: Box::new(mul_tree(ra, rb)?),
                dual,
            })
        }
    }
}

pub(crate) fn div_tree<F: Float>(a: &NestedDual<F>, b: &NestedDual<F>) -> Result<NestedDual<F>> {
    use NestedDual::{Node, Scalar as S};
    match (a, b) {
        (S(x), S(y)) => Ok(S(*x / *y)),
        (Node { real, dual }, S(_)) => Ok(Node {
            real: Box::new(div_tree(real, b)?),
            dual: map_dual(dual, |d| div_tree(d, b))?,
        }),
        (S(_), Node { real, dual }) => {
            // c/v: derivative −c·dv/v²
            let v2 = mul_tree(real, real)?;
            Ok(Node {
                real: Box::new(div_tree(a, real)?),
                dual: map_dual(dual, |dv| div_tree(&neg_tree(&mul_tree(a, dv)?), &v2))?,
            })
        }
        (Node { real: ra, dual: da }, Node { real: rb, dual: db }) => {
            check_shape("div", a, b)?;
            // (du·v − u·dv) / v²
            let v2 = mul_tree(rb, rb)?;
            let dual = da
                .iter()
                .zip(db)
                .map(|(du, dv)| div_tree(&sub_tree(&mul_tree(du, rb)?, &mul_tree(ra, dv)?)?, &v2))
                .collect::<Result<_>>()?;
            Ok(Node {
                real: Box::new(div_tree(ra, rb)?),
                dual,
            })
        }
    }
}

/// `a^b` with derivative `b·a^(b−1)·da + a^b·ln|a|·db`.
pub(crate) fn pow_tree<F: Float>(a: &NestedDual<F>, b: &NestedDual<F>) -> Result<NestedDual<F>> {
    use NestedDual::{Node, Scalar as S};
    match (a, b) {
        (S(x), S(y)) => Ok(S(x.powf(*y))),
        (_, S(n)) => a.pow_const_tree(*n),
        (S(c), Node { real, dual }) => {
            // c^v: derivative c^v·ln|c|·dv
            let val = pow_tree(a, real)?;
            let factor = mul_tree(&val, &S(c.abs().ln()))?;
            Ok(Node {
                real: Box::new(val),
                dual: map_dual(dual, |dv| mul_tree(&factor, dv))?,
            })
        }
        (Node { real: ra, dual: da }, Node { real: rb, dual: db }) => {
            check_shape("pow", a, b)?;
            let val = pow_tree(ra, rb)?;
            let base_factor = mul_tree(rb, &pow_tree(ra, &sub_tree(rb, &S(F::one()))?)?)?;
            let ln_abs = ra.apply_tree(Elemental::Abs)?.apply_tree(Elemental::Log)?;
            let exp_factor = mul_tree(&val, &ln_abs)?;
            let dual = da
                .iter()
                .zip(db)
                .map(|(du, dn)| {
                    let base_term = mul_tree(&base_factor, du)?;
                    if is_zero_tree(dn) {
                        // Constant along this lane: keep x = 0 finite.
                        Ok(base_term)
                    } else {
                        add_tree(&base_term, &mul_tree(&exp_factor, dn)?)
                    }
                })
                .collect::<Result<_>>()?;
            Ok(Node {
                real: Box::new(val),
                dual,
            })
        }
    }
}

pub(crate) fn is_zero_tree<F: Float>(a: &NestedDual<F>) -> bool {
    match a {
        NestedDual::Scalar(x) => x.is_zero(),
        NestedDual::Node { real, dual } => is_zero_tree(real) && dual.iter().all(is_zero_tree),
    }
}

impl<F: Float> Scalar for NestedDual<F> {
    type Float = F;

    #[inline]
    fn from_f(val: F) -> Self {
        NestedDual::Scalar(val)
    }

    #[inline]
    fn value(&self) -> F {
        self.primal()
    }

    fn apply(self, f: Elemental) -> Self {
        or_panic(self.apply_tree(f))
    }

    fn pow_const(self, n: F) -> Self {
        or_panic(self.pow_const_tree(n))
    }

    fn pow_var(self, n: Self) -> Self {
        or_panic(pow_tree(&self, &n))
    }
}

impl<F: Display> Display for NestedDual<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NestedDual::Scalar(v) => write!(f, "{v}"),
            NestedDual::Node { real, dual } => {
                write_part(f, real)?;
                for (i, d) in dual.iter().enumerate() {
                    f.write_str(" + ")?;
                    write_part(f, d)?;
                    if dual.len() == 1 {
                        f.write_str("ε")?;
                    } else {
                        write!(f, "ε{i}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn write_part<F: Display>(f: &mut fmt::Formatter<'_>, part: &NestedDual<F>) -> fmt::Result {
    match part {
        NestedDual::Scalar(v) => write!(f, "{v}"),
        NestedDual::Node { .. } => write!(f, "({part})"),
    }
}

/// Derivatives `[f, f', f'', …]` read along one lane of a [`NestedDual`].
///
/// Displays as a polynomial in ε: `c0 + c1ε + c2ε^2`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coefficients<F>(pub Vec<F>);

impl<F> Coefficients<F> {
    pub fn as_slice(&self) -> &[F] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<F> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<F> std::ops::Index<usize> for Coefficients<F> {
    type Output = F;

    fn index(&self, i: usize) -> &F {
        &self.0[i]
    }
}

impl<F: Display> Display for Coefficients<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.0.iter().enumerate() {
            match i {
                0 => write!(f, "{c}")?,
                1 => write!(f, " + {c}ε")?,
                _ => write!(f, " + {c}ε^{i}")?,
            }
        }
        Ok(())
    }
}
