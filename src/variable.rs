//! Seeded multivariate numbers backed by dense nalgebra storage.
//!
//! A [`Variable`] carries one or more output values, the derivative
//! accumulated along the seed direction, and the full jacobian
//! `∂outputᵢ/∂xⱼ` over an `n`-dimensional input space. Every operation
//! applies the same calculus rule to the derivative and to each jacobian
//! column, so after evaluating an expression the jacobian is complete in a
//! single pass.

use std::fmt::{self, Display};

use log::trace;
use nalgebra::{DMatrix, DVector};

use crate::domain::{self, Domain, Quiet};
use crate::elemental::{elemental_methods, Differentiable, Elemental};
use crate::error::{or_panic, Error, Result};
use crate::float::Float;

/// A value (or stacked column of values) with its derivative and jacobian.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable<F: Float = f64> {
    value: DVector<F>,
    derivative: DMatrix<F>,
    jacobian: DMatrix<F>,
}

impl<F: Float> Variable<F> {
    /// Independent variable number `k` (1-based) of an `n`-dimensional input
    /// space.
    ///
    /// `value` holds one entry per output and `seed` the matching derivative
    /// seeds. The jacobian is one-hot in column `k − 1`; the derivative is
    /// the seed placed in that column.
    pub fn new(value: &[F], seed: &[F], n: usize, k: usize) -> Result<Self> {
        if value.is_empty() {
            return Err(Error::NoOutputs);
        }
        if seed.len() != value.len() {
            return Err(Error::SeedLength {
                expected: value.len(),
                found: seed.len(),
            });
        }
        if n == 0 {
            return Err(Error::EmptyInputSpace);
        }
        if k == 0 || k > n {
            return Err(Error::InvalidVariableIndex { k, n });
        }
        trace!("variable x{k} of {n}: outputs={}", value.len());
        let m = value.len();
        let col = k - 1;
        Ok(Variable {
            value: DVector::from_column_slice(value),
            derivative: DMatrix::from_fn(m, n, |i, j| if j == col { seed[i] } else { F::zero() }),
            jacobian: DMatrix::from_fn(m, n, |_, j| if j == col { F::one() } else { F::zero() }),
        })
    }

    /// Single-output shorthand for [`Variable::new`].
    pub fn scalar(value: F, seed: F, n: usize, k: usize) -> Result<Self> {
        Self::new(&[value], &[seed], n, k)
    }

    /// A constant over an `n`-dimensional input space.
    pub fn constant(value: F, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::EmptyInputSpace);
        }
        Ok(Variable {
            value: DVector::from_element(1, value),
            derivative: DMatrix::zeros(1, n),
            jacobian: DMatrix::zeros(1, n),
        })
    }

    /// An already-composed number with an explicit derivative and jacobian.
    ///
    /// Both matrices must be `outputs × n`.
    pub fn from_parts(value: DVector<F>, derivative: DMatrix<F>, jacobian: DMatrix<F>) -> Result<Self> {
        let m = value.len();
        if m == 0 {
            return Err(Error::NoOutputs);
        }
        let n = jacobian.ncols();
        if n == 0 {
            return Err(Error::EmptyInputSpace);
        }
        for part in [&jacobian, &derivative] {
            if part.shape() != (m, n) {
                return Err(Error::JacobianShape {
                    rows: part.nrows(),
                    cols: part.ncols(),
                    expected_rows: m,
                    expected_cols: n,
                });
            }
        }
        Ok(Variable {
            value,
            derivative,
            jacobian,
        })
    }

    #[inline]
    pub fn value(&self) -> &DVector<F> {
        &self.value
    }

    /// The first output value; the whole value for a scalar function.
    #[inline]
    pub fn primal(&self) -> F {
        self.value[0]
    }

    #[inline]
    pub fn derivative(&self) -> &DMatrix<F> {
        &self.derivative
    }

    #[inline]
    pub fn jacobian(&self) -> &DMatrix<F> {
        &self.jacobian
    }

    /// Dimension of the input space.
    #[inline]
    pub fn n(&self) -> usize {
        self.jacobian.ncols()
    }

    /// Number of stacked outputs.
    #[inline]
    pub fn outputs(&self) -> usize {
        self.value.len()
    }

    pub fn into_parts(self) -> (DVector<F>, DMatrix<F>, DMatrix<F>) {
        (self.value, self.derivative, self.jacobian)
    }

    elemental_methods!();

    /// `self^n` for a constant exponent, elementwise.
    pub fn powf(self, n: F) -> Self {
        self.report_domain("pow", |x| domain::power(x, n));
        let _quiet = Quiet::new();
        self.pow_const(n)
    }

    #[inline]
    pub fn powi(self, n: i32) -> Self {
        self.powf(F::lit(f64::from(n)))
    }

    /// `self^n` where the exponent carries derivatives too.
    ///
    /// # Panics
    ///
    /// Panics on a shape mismatch; see [`Variable::checked_pow`].
    pub fn pow(self, n: Self) -> Self {
        or_panic(self.checked_pow(&n))
    }

    /// `base^self` for a constant base.
    pub fn rpow(self, base: F) -> Self {
        self.report_domain("pow", |x| domain::power_base(base, x));
        let _quiet = Quiet::new();
        let ln_base = base.ln();
        self.map_tangent(|x| base.powf(x), |x| base.powf(x) * ln_base)
    }

    pub fn recip(self) -> Self {
        self.report_domain("div", domain::division);
        let _quiet = Quiet::new();
        self.map_tangent(|x| F::one() / x, |x| -F::one() / (x * x))
    }

    pub(crate) fn pow_const(self, n: F) -> Self {
        self.map_tangent(
            |x| x.powf(n),
            |x| if n.is_zero() { F::zero() } else { n * x.powf(n - F::one()) },
        )
    }

    /// Elementwise `value = g(x)`, tangent rows scaled by `dg(x)`.
    pub(crate) fn map_tangent<G, D>(&self, g: G, dg: D) -> Self
    where
        G: Fn(F) -> F,
        D: Fn(F) -> F,
    {
        let scales: Vec<F> = self.value.iter().map(|&x| dg(x)).collect();
        let scale_rows = |m: &DMatrix<F>| DMatrix::from_fn(m.nrows(), m.ncols(), |i, j| m[(i, j)] * scales[i]);
        Variable {
            value: self.value.map(g),
            derivative: scale_rows(&self.derivative),
            jacobian: scale_rows(&self.jacobian),
        }
    }

    /// Combine two numbers output by output.
    ///
    /// `tangent` receives `(u, du, v, dv)` for one output and one column. A
    /// single-output operand is broadcast against a multi-output one.
    pub(crate) fn zip_with<G, D>(&self, rhs: &Self, op: &'static str, g: G, tangent: D) -> Result<Self>
    where
        G: Fn(F, F) -> F,
        D: Fn(F, F, F, F) -> F,
    {
        if self.n() != rhs.n() {
            return Err(Error::DimensionMismatch {
                op,
                left: self.n(),
                right: rhs.n(),
            });
        }
        let (ml, mr) = (self.outputs(), rhs.outputs());
        let m = if ml == mr || mr == 1 {
            ml
        } else if ml == 1 {
            mr
        } else {
            return Err(Error::OutputMismatch {
                op,
                left: ml,
                right: mr,
            });
        };
        let li = |i: usize| if ml == 1 { 0 } else { i };
        let ri = |i: usize| if mr == 1 { 0 } else { i };
        let n = self.n();
        let combine = |a: &DMatrix<F>, b: &DMatrix<F>| {
            DMatrix::from_fn(m, n, |i, j| {
                let (l, r) = (li(i), ri(i));
                tangent(self.value[l], a[(l, j)], rhs.value[r], b[(r, j)])
            })
        };
        Ok(Variable {
            value: DVector::from_fn(m, |i, _| g(self.value[li(i)], rhs.value[ri(i)])),
            derivative: combine(&self.derivative, &rhs.derivative),
            jacobian: combine(&self.jacobian, &rhs.jacobian),
        })
    }

    /// Whether output `i` has no sensitivity to any input.
    pub(crate) fn row_is_constant(&self, i: usize) -> bool {
        self.jacobian.row(i).iter().all(|x| x.is_zero()) && self.derivative.row(i).iter().all(|x| x.is_zero())
    }
}

impl<F: Float> Differentiable for Variable<F> {
    type Float = F;

    fn apply_elemental(self, f: Elemental) -> Self {
        self.map_tangent(|x| f.eval(x), |x| f.derivative(&x))
    }

    fn report_domain<C>(&self, op: &str, classify: C)
    where
        C: Fn(Self::Float) -> Domain,
    {
        let first = self
            .value
            .iter()
            .map(|&x| (x, classify(x)))
            .find(|(_, d)| !d.is_regular());
        if let Some((x, d)) = first {
            domain::report(op, x, d);
        }
    }

    fn scale(self, k: F) -> Self {
        self.map_tangent(|x| x * k, |_| k)
    }
}

/// Stack several component functions into one vector-valued number.
///
/// `output_dimension` is the number of outputs each component holds: 1 for
/// a scalar function, `k` for a component evaluated at `k` points. Every
/// component must hold exactly that many outputs and share the input
/// dimension `n`. Rows are stacked in component order.
pub fn vectorize<F: Float>(components: &[Variable<F>], output_dimension: usize, n: usize) -> Result<Variable<F>> {
    if components.is_empty() {
        return Err(Error::EmptyVectorize);
    }
    if n == 0 {
        return Err(Error::EmptyInputSpace);
    }
    if let Some(c) = components.iter().find(|c| c.n() != n) {
        return Err(Error::DimensionMismatch {
            op: "vectorize",
            left: n,
            right: c.n(),
        });
    }
    if let Some(c) = components.iter().find(|c| c.outputs() != output_dimension) {
        return Err(Error::OutputMismatch {
            op: "vectorize",
            left: output_dimension,
            right: c.outputs(),
        });
    }
    let total = components.len() * output_dimension;
    let values: Vec<F> = components.iter().flat_map(|c| c.value.iter().copied()).collect();
    let stack = |part: fn(&Variable<F>) -> &DMatrix<F>| {
        let rows: Vec<F> = components
            .iter()
            .flat_map(|c| {
                let m = part(c);
                (0..m.nrows()).flat_map(move |i| (0..n).map(move |j| m[(i, j)]))
            })
            .collect();
        DMatrix::from_row_slice(total, n, &rows)
    };
    Ok(Variable {
        value: DVector::from_vec(values),
        derivative: stack(Variable::derivative),
        jacobian: stack(Variable::jacobian),
    })
}

impl<F: Float> Display for Variable<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Value: ")?;
        write_list(f, self.value.iter())?;
        f.write_str(", Derivative: ")?;
        write_rows(f, &self.derivative)?;
        f.write_str(", Jacobian: ")?;
        write_rows(f, &self.jacobian)
    }
}

fn write_list<'a, F: Float>(f: &mut fmt::Formatter<'_>, items: impl Iterator<Item = &'a F>) -> fmt::Result {
    f.write_str("[")?;
    for (i, x) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{x}")?;
    }
    f.write_str("]")
}

fn write_rows<F: Float>(f: &mut fmt::Formatter<'_>, m: &DMatrix<F>) -> fmt::Result {
    f.write_str("[")?;
    for i in 0..m.nrows() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_list(f, m.row(i).iter())?;
    }
    f.write_str("]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_is_one_hot() {
        let y = Variable::scalar(3.0_f64, 2.0, 3, 2).unwrap();
        assert_eq!(y.jacobian().as_slice(), &[0.0, 1.0, 0.0]);
        assert_eq!(y.derivative().as_slice(), &[0.0, 2.0, 0.0]);
        assert_eq!(y.n(), 3);
        assert_eq!(y.outputs(), 1);
    }

    #[test]
    fn construction_errors() {
        assert_eq!(Variable::scalar(1.0_f64, 1.0, 2, 0), Err(Error::InvalidVariableIndex { k: 0, n: 2 }));
        assert_eq!(Variable::scalar(1.0_f64, 1.0, 2, 3), Err(Error::InvalidVariableIndex { k: 3, n: 2 }));
        assert_eq!(Variable::scalar(1.0_f64, 1.0, 0, 1), Err(Error::EmptyInputSpace));
        assert_eq!(
            Variable::new(&[1.0_f64, 2.0], &[1.0], 2, 1),
            Err(Error::SeedLength { expected: 2, found: 1 })
        );
        assert_eq!(Variable::<f64>::new(&[], &[], 2, 1), Err(Error::NoOutputs));
    }

    #[test]
    fn from_parts_checks_shapes() {
        let err = Variable::from_parts(
            DVector::from_vec(vec![1.0_f64]),
            DMatrix::zeros(1, 3),
            DMatrix::zeros(1, 2),
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::JacobianShape {
                rows: 1,
                cols: 3,
                expected_rows: 1,
                expected_cols: 2
            }
        );
    }

    #[test]
    fn broadcast_single_output() {
        let v = Variable::new(&[1.0_f64, 2.0], &[1.0, 1.0], 1, 1).unwrap();
        let c = Variable::constant(10.0_f64, 1).unwrap();
        let s = v.zip_with(&c, "add", |a, b| a + b, |_, da, _, db| da + db).unwrap();
        assert_eq!(s.value().as_slice(), &[11.0, 12.0]);
        assert_eq!(s.jacobian().as_slice(), &[1.0, 1.0]);
    }

    #[test]
    fn display_lists_all_parts() {
        let x = Variable::scalar(2.0_f64, 1.0, 2, 1).unwrap();
        assert_eq!(x.to_string(), "Value: [2], Derivative: [[1, 0]], Jacobian: [[1, 0]]");
    }
}
