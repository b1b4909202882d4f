//! Second-order read-out from an order-2 [`NestedDual`].

use std::fmt::{self, Display};

use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};
use crate::float::Float;
use crate::nested::{Branch, NestedDual};

/// Value, gradient and Hessian of a scalar function at one point.
///
/// `hessian[(i, j)]` is `∂²f/∂xᵢ∂xⱼ`, read at path `[Dual(i), Dual(j)]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hessian<F: Float = f64> {
    pub value: F,
    pub gradient: DVector<F>,
    pub hessian: DMatrix<F>,
}

impl<F: Float> Hessian<F> {
    /// Read value, gradient and Hessian from a nested result of order ≥ 2.
    ///
    /// The number of variables is the result's lane count.
    pub fn from_nested(f: &NestedDual<F>) -> Result<Self> {
        if f.order() < 2 {
            return Err(Error::PathTooDeep {
                depth: 2,
                order: f.order(),
            });
        }
        let n = f.lanes();
        let value = f.coefficient_at(&[Branch::Real, Branch::Real])?;
        let gradient = (0..n)
            .map(|i| f.coefficient_at(&[Branch::Dual(i), Branch::Real]))
            .collect::<Result<Vec<F>>>()?;
        let mut entries = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                entries.push(f.coefficient_at(&[Branch::Dual(i), Branch::Dual(j)])?);
            }
        }
        Ok(Hessian {
            value,
            gradient: DVector::from_vec(gradient),
            hessian: DMatrix::from_row_slice(n, n, &entries),
        })
    }

    /// The gradient `[∂f/∂x₀, ∂f/∂x₁, …]`.
    #[inline]
    pub fn first_derivative(&self) -> &DVector<F> {
        &self.gradient
    }

    /// Whether `H[i][j]` and `H[j][i]` agree to within `tol` everywhere.
    pub fn is_symmetric(&self, tol: F) -> bool {
        let n = self.hessian.nrows();
        (0..n).all(|i| (i + 1..n).all(|j| (self.hessian[(i, j)] - self.hessian[(j, i)]).abs() <= tol))
    }
}

impl<F: Float> Display for Hessian<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "value: {}", self.value)?;
        write!(f, "gradient: [")?;
        for (i, g) in self.gradient.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{g}")?;
        }
        writeln!(f, "]")?;
        write!(f, "hessian:{}", self.hessian)
    }
}
