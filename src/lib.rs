//! Forward-mode automatic differentiation.
//!
//! Three number types share one table of propagation rules:
//!
//! - [`Dual`]: a value and one tangent. Nest it (`Dual<Dual<f64>>`) for
//!   higher derivatives fixed at compile time.
//! - [`Variable`]: a seeded multivariate number whose jacobian over all `n`
//!   inputs is complete after a single evaluation.
//! - [`NestedDual`]: a dual number nested to a depth chosen at runtime, read
//!   back by path for gradients, [`Hessian`]s and higher-order coefficients.
//!
//! ```
//! use dualdiff::{sin, Dual64};
//!
//! let x = Dual64::variable(0.5);
//! let y = sin(x) * x;
//! assert!((y.eps - (0.5_f64.cos() * 0.5 + 0.5_f64.sin())).abs() < 1e-15);
//! ```
//!
//! Out-of-domain evaluations (`sqrt(-1)`, `log(0)`, `tan(π/2)`) do not fail:
//! they yield NaN or ±∞ and are reported through the [`domain`] diagnostic
//! channel. Combining numbers of incompatible shape is an [`Error`].

pub mod api;
pub mod domain;
pub mod dual;
pub mod elemental;
pub mod error;
pub mod float;
pub mod hessian;
pub mod nested;
pub mod scalar;
mod traits;
pub mod variable;

pub use api::{gradient, hessian, jacobian, jacobian_seeded, jvp, taylor_coefficients};
pub use dual::Dual;
pub use elemental::{
    abs, arccos, arccosh, arcsin, arcsinh, arctan, arctanh, cos, cosh, exp, log, log10, logbase, logistic, sin,
    sinh, sqrt, tan, tanh, Differentiable, Elemental,
};
pub use error::{Error, Result};
pub use float::Float;
pub use hessian::Hessian;
pub use nested::{Branch, Coefficients, NestedDual};
pub use scalar::Scalar;
pub use variable::{vectorize, Variable};

/// Type alias for forward-mode dual numbers over `f64`.
pub type Dual64 = Dual<f64>;
/// Type alias for forward-mode dual numbers over `f32`.
pub type Dual32 = Dual<f32>;
/// Type alias for seeded multivariate numbers over `f64`.
pub type Variable64 = Variable<f64>;
/// Type alias for runtime-order nested duals over `f64`.
pub type NestedDual64 = NestedDual<f64>;
