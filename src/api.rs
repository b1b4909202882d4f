//! One-call drivers over the number types.
//!
//! Each driver seeds the inputs, evaluates `f` once (or once per input for
//! plain [`Dual`]s), and reads the derivatives back out.

use nalgebra::{DMatrix, DVector};

use crate::dual::Dual;
use crate::error::{Error, Result};
use crate::float::Float;
use crate::hessian::Hessian;
use crate::nested::{Coefficients, NestedDual};
use crate::variable::Variable;

/// Jacobian-vector product: `(f(x), J·v)` in a single forward pass.
///
/// ```
/// let (y, dy) = dualdiff::jvp(|x| vec![x[0] * x[1]], &[3.0, 4.0], &[1.0, 0.0]).unwrap();
/// assert_eq!(y, vec![12.0]);
/// assert_eq!(dy, vec![4.0]);
/// ```
pub fn jvp<F: Float>(f: impl Fn(&[Dual<F>]) -> Vec<Dual<F>>, x: &[F], v: &[F]) -> Result<(Vec<F>, Vec<F>)> {
    if x.len() != v.len() {
        return Err(Error::SeedLength {
            expected: x.len(),
            found: v.len(),
        });
    }
    let inputs: Vec<Dual<F>> = x.iter().zip(v).map(|(&xi, &vi)| Dual::new(xi, vi)).collect();
    let outputs = f(&inputs);
    let values = outputs.iter().map(|d| d.re).collect();
    let tangents = outputs.iter().map(|d| d.eps).collect();
    Ok((values, tangents))
}

/// Full Jacobian of `f : ℝⁿ → ℝᵐ` with one [`Dual`] pass per input.
///
/// Returns `(f(x), J)` with `J[(i, j)] = ∂fᵢ/∂xⱼ`.
pub fn jacobian<F: Float>(f: impl Fn(&[Dual<F>]) -> Vec<Dual<F>>, x: &[F]) -> Result<(DVector<F>, DMatrix<F>)> {
    let n = x.len();
    if n == 0 {
        return Err(Error::EmptyInputSpace);
    }
    let mut values = Vec::new();
    let mut columns: Vec<Vec<F>> = Vec::with_capacity(n);
    for j in 0..n {
        let inputs: Vec<Dual<F>> = x
            .iter()
            .enumerate()
            .map(|(k, &xk)| if k == j { Dual::variable(xk) } else { Dual::constant(xk) })
            .collect();
        let outputs = f(&inputs);
        if j == 0 {
            values = outputs.iter().map(|d| d.re).collect();
        } else if outputs.len() != values.len() {
            return Err(Error::OutputMismatch {
                op: "jacobian",
                left: values.len(),
                right: outputs.len(),
            });
        }
        columns.push(outputs.iter().map(|d| d.eps).collect());
    }
    let m = values.len();
    let jac = DMatrix::from_fn(m, n, |i, j| columns[j][i]);
    Ok((DVector::from_vec(values), jac))
}

/// Seed one [`Variable`] per input: `x[k]` becomes variable `k + 1` of `n`.
fn seeded_inputs<F: Float>(x: &[F]) -> Result<Vec<Variable<F>>> {
    let n = x.len();
    if n == 0 {
        return Err(Error::EmptyInputSpace);
    }
    x.iter()
        .enumerate()
        .map(|(k, &xk)| Variable::scalar(xk, F::one(), n, k + 1))
        .collect()
}

/// Value and gradient of a scalar function in one seeded pass.
pub fn gradient<F: Float>(f: impl Fn(&[Variable<F>]) -> Variable<F>, x: &[F]) -> Result<(F, DVector<F>)> {
    let inputs = seeded_inputs(x)?;
    let out = f(&inputs);
    if out.n() != x.len() {
        return Err(Error::DimensionMismatch {
            op: "gradient",
            left: x.len(),
            right: out.n(),
        });
    }
    Ok((out.primal(), out.jacobian().row(0).transpose()))
}

/// Value and Jacobian of a vector-valued function (build the output with
/// [`vectorize`](crate::vectorize)) in one seeded pass.
pub fn jacobian_seeded<F: Float>(
    f: impl Fn(&[Variable<F>]) -> Variable<F>,
    x: &[F],
) -> Result<(DVector<F>, DMatrix<F>)> {
    let inputs = seeded_inputs(x)?;
    let out = f(&inputs);
    if out.n() != x.len() {
        return Err(Error::DimensionMismatch {
            op: "jacobian_seeded",
            left: x.len(),
            right: out.n(),
        });
    }
    let (value, _, jac) = out.into_parts();
    Ok((value, jac))
}

/// Value, gradient and Hessian of a scalar function via order-2 nesting.
///
/// Input `i` is seeded with the unit vector `eᵢ`.
pub fn hessian<F: Float>(f: impl Fn(&[NestedDual<F>]) -> NestedDual<F>, x: &[F]) -> Result<Hessian<F>> {
    let n = x.len();
    let inputs = x
        .iter()
        .enumerate()
        .map(|(i, &xi)| {
            let seed: Vec<F> = (0..n).map(|j| if i == j { F::one() } else { F::zero() }).collect();
            NestedDual::variable(xi, &seed, 2)
        })
        .collect::<Result<Vec<_>>>()?;
    Hessian::from_nested(&f(&inputs))
}

/// `[f(x), f'(x), …, f⁽ᵒʳᵈᵉʳ⁾(x)]` for a univariate function.
pub fn taylor_coefficients<F: Float>(
    f: impl Fn(NestedDual<F>) -> NestedDual<F>,
    x: F,
    order: usize,
) -> Result<Coefficients<F>> {
    let input = NestedDual::variable(x, &[F::one()], order)?;
    f(input).coefficients(order)
}
