//! Hessians and higher-order coefficients from runtime-order nested duals.

use approx::assert_relative_eq;
use dualdiff::{exp, sin, Branch, Error, Hessian, NestedDual, NestedDual64};
use nalgebra::DMatrix;
use std::f64::consts::E;

fn pair(x: f64, y: f64) -> (NestedDual64, NestedDual64) {
    let x = NestedDual::leaf(x, &[1.0, 0.0]).unwrap().make_highest_order(2).unwrap();
    let y = NestedDual::leaf(y, &[0.0, 1.0]).unwrap().make_highest_order(2).unwrap();
    (x, y)
}

#[test]
fn x_squared_times_exp_y() {
    let (x, y) = pair(3.0, 1.0);
    let f = &(&x * &x) * &exp(y);
    let h = Hessian::from_nested(&f).unwrap();

    assert_relative_eq!(h.value, 9.0 * E, max_relative = 1e-12);
    assert_relative_eq!(h.first_derivative()[0], 6.0 * E, max_relative = 1e-12);
    assert_relative_eq!(h.first_derivative()[1], 9.0 * E, max_relative = 1e-12);
    let expected = DMatrix::from_row_slice(2, 2, &[2.0 * E, 6.0 * E, 6.0 * E, 9.0 * E]);
    assert_relative_eq!(h.hessian, expected, max_relative = 1e-12);
    assert!(h.is_symmetric(1e-12));
}

#[test]
fn mixed_partials_by_path() {
    // f = x·y + sin(x)
    let (x, y) = pair(0.4, 2.0);
    let f = &x * &y + sin(x.clone());
    let dxdy = f.coefficient_at(&[Branch::Dual(0), Branch::Dual(1)]).unwrap();
    let dydx = f.coefficient_at(&[Branch::Dual(1), Branch::Dual(0)]).unwrap();
    assert_eq!(dxdy, 1.0);
    assert_eq!(dydx, 1.0);
    let dxx = f.coefficient_at(&[Branch::Dual(0), Branch::Dual(0)]).unwrap();
    assert_relative_eq!(dxx, -(0.4_f64.sin()), max_relative = 1e-12);
}

#[test]
fn quotient_and_power_through_nesting() {
    // f = x / y, f_xy = -1/y², f_yy = 2x/y³
    let (x, y) = pair(3.0, 2.0);
    let h = Hessian::from_nested(&(&x / &y)).unwrap();
    assert_relative_eq!(h.hessian[(0, 1)], -0.25, max_relative = 1e-12);
    assert_relative_eq!(h.hessian[(1, 1)], 0.75, max_relative = 1e-12);
    assert_eq!(h.hessian[(0, 0)], 0.0);

    // g = x^y, g_xy = x^(y-1)(1 + y ln x)
    let g = x.pow(y);
    let h = Hessian::from_nested(&g).unwrap();
    let expected = 3.0 * (1.0 + 2.0 * 3.0_f64.ln());
    assert_relative_eq!(h.hessian[(0, 1)], expected, max_relative = 1e-12);
    assert!(h.is_symmetric(1e-10));
}

#[test]
fn univariate_coefficients_to_fourth_order() {
    // d^k/dx^k e^(2x) = 2^k e^(2x)
    let x = NestedDual::variable(0.5_f64, &[1.0], 4).unwrap();
    let c = exp(2.0 * x).coefficients(4).unwrap();
    for (k, ck) in c.as_slice().iter().enumerate() {
        assert_relative_eq!(*ck, 2.0_f64.powi(k as i32) * E, max_relative = 1e-12);
    }
}

#[test]
fn coefficients_along_second_lane() {
    let (x, y) = pair(1.0, 3.0);
    let f = &x * &(&y * &y);
    let c = f.coefficients_along(1, 2).unwrap();
    assert_eq!(c.as_slice(), &[9.0, 6.0, 2.0]);
}

#[test]
fn coefficients_display_as_polynomial() {
    let x = NestedDual::variable(2.0_f64, &[1.0], 2).unwrap();
    let c = (x.clone() * x).coefficients(2).unwrap();
    assert_eq!(c.to_string(), "4 + 4ε + 2ε^2");
}

#[test]
fn structural_errors() {
    let (x, _) = pair(1.0, 1.0);
    let deep = NestedDual::variable(1.0_f64, &[1.0, 0.0], 3).unwrap();
    assert!(matches!(x.checked_add(&deep), Err(Error::OrderMismatch { .. })));
    assert_eq!(
        x.coefficients(3).unwrap_err(),
        Error::PathTooDeep { depth: 3, order: 2 }
    );
    let one_lane = NestedDual::variable(1.0_f64, &[1.0], 2).unwrap();
    assert!(matches!(x.checked_mul(&one_lane), Err(Error::LaneMismatch { .. })));
}

#[test]
fn constant_tree_has_no_derivatives() {
    let c = NestedDual::constant(5.0_f64, 2, 2);
    let h = Hessian::from_nested(&c).unwrap();
    assert_eq!(h.value, 5.0);
    assert_eq!(h.hessian, DMatrix::zeros(2, 2));
}

#[test]
fn hessian_for_three_variables() {
    // f = x·y·z: every off-diagonal second partial is the third variable.
    let seed = |i: usize| {
        let mut s = vec![0.0; 3];
        s[i] = 1.0;
        s
    };
    let x = NestedDual::variable(2.0_f64, &seed(0), 2).unwrap();
    let y = NestedDual::variable(3.0_f64, &seed(1), 2).unwrap();
    let z = NestedDual::variable(5.0_f64, &seed(2), 2).unwrap();
    let h = Hessian::from_nested(&(&(&x * &y) * &z)).unwrap();
    let expected = DMatrix::from_row_slice(3, 3, &[0.0, 5.0, 3.0, 5.0, 0.0, 2.0, 3.0, 2.0, 0.0]);
    assert_eq!(h.hessian, expected);
    assert_eq!(h.gradient.as_slice(), &[15.0, 10.0, 6.0]);
}
