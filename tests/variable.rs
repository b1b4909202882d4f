use approx::assert_relative_eq;
use dualdiff::{arcsinh, exp, log, sin, sqrt, vectorize, Error, Variable, Variable64};
use nalgebra::{DMatrix, DVector};

fn leaf(value: f64, n: usize, k: usize) -> Variable64 {
    Variable::scalar(value, 1.0, n, k).unwrap()
}

#[test]
fn linear_combination_of_three_leaves() {
    let x = leaf(3.0, 3, 1);
    let y = leaf(2.0, 3, 2);
    let z = leaf(-1.0, 3, 3);
    let f = 3.0 * x + 2.0 * y + 4.0 * z;
    assert_eq!(f.primal(), 9.0);
    assert_eq!(f.jacobian().as_slice(), &[3.0, 2.0, 4.0]);
}

#[test]
fn seeded_derivative_is_scaled() {
    let x = Variable::scalar(5.0_f64, 2.0, 1, 1).unwrap();
    let f = &x + &x;
    assert_eq!(f.primal(), 10.0);
    assert_eq!(f.derivative()[(0, 0)], 4.0);
    assert_eq!(f.jacobian()[(0, 0)], 2.0);
}

#[test]
fn self_power_and_arcsinh() {
    let x = leaf(2.0, 1, 1);
    let f = x.clone().pow(x);
    assert_relative_eq!(f.primal(), 4.0, max_relative = 1e-12);
    assert_relative_eq!(f.derivative()[(0, 0)], 4.0 + 16.0_f64.ln(), max_relative = 1e-12);

    let s = Variable::scalar(0.5_f64, 2.0, 1, 1).unwrap();
    let g = arcsinh(s);
    assert_relative_eq!(g.primal(), 0.4812, epsilon = 1e-4);
    assert_relative_eq!(g.derivative()[(0, 0)], 2.0 / 1.25_f64.sqrt(), max_relative = 1e-12);
    assert_relative_eq!(g.jacobian()[(0, 0)], 1.0 / 1.25_f64.sqrt(), max_relative = 1e-12);
}

#[test]
fn gradient_of_nonlinear_function() {
    // f(x, y) = sin(x)·exp(y) + ln(x·y)
    let (xv, yv) = (0.7, 1.3);
    let x = leaf(xv, 2, 1);
    let y = leaf(yv, 2, 2);
    let f = sin(x.clone()) * exp(y.clone()) + log(&x * &y);
    let j = f.jacobian();
    assert_relative_eq!(j[(0, 0)], xv.cos() * yv.exp() + 1.0 / xv, max_relative = 1e-12);
    assert_relative_eq!(j[(0, 1)], xv.sin() * yv.exp() + 1.0 / yv, max_relative = 1e-12);
}

#[test]
fn constant_operand_leaves_jacobian_unchanged() {
    let x = leaf(4.0, 2, 2);
    let f = (x.clone() + 1.0) - 1.0;
    assert_eq!(f.jacobian(), x.jacobian());
    let g = 10.0 - x.clone();
    assert_eq!(g.jacobian().as_slice(), &[0.0, -1.0]);
    let h = 8.0 / x;
    assert_relative_eq!(h.jacobian()[(0, 1)], -0.5);
}

#[test]
fn powf_powi_rpow() {
    let x = leaf(2.0, 1, 1);
    assert_relative_eq!(x.clone().powf(3.0).jacobian()[(0, 0)], 12.0);
    assert_relative_eq!(x.clone().powi(-1).jacobian()[(0, 0)], -0.25);
    assert_relative_eq!(
        x.rpow(2.0).jacobian()[(0, 0)],
        4.0 * 2.0_f64.ln(),
        max_relative = 1e-12
    );
}

#[test]
fn vectorize_stacks_component_rows() {
    let x = leaf(1.0, 2, 1);
    let y = leaf(2.0, 2, 2);
    let f1 = &x * &y;
    let f2 = &x + &y;
    let f3 = sqrt(y.clone());
    let f = vectorize(&[f1, f2, f3], 1, 2).unwrap();

    assert_eq!(f.outputs(), 3);
    assert_eq!(f.value(), &DVector::from_vec(vec![2.0, 3.0, 2.0_f64.sqrt()]));
    let expected = DMatrix::from_row_slice(3, 2, &[2.0, 1.0, 1.0, 1.0, 0.0, 0.5 / 2.0_f64.sqrt()]);
    assert_relative_eq!(f.jacobian().clone(), expected, max_relative = 1e-12);
}

#[test]
fn vectorize_errors() {
    let x = leaf(1.0, 2, 1);
    let w = leaf(1.0, 3, 1);
    assert_eq!(vectorize::<f64>(&[], 0, 2), Err(Error::EmptyVectorize));
    assert_eq!(
        vectorize(&[x.clone(), w], 1, 2),
        Err(Error::DimensionMismatch {
            op: "vectorize",
            left: 2,
            right: 3
        })
    );
    assert_eq!(
        vectorize(&[x.clone(), x], 2, 2),
        Err(Error::OutputMismatch {
            op: "vectorize",
            left: 2,
            right: 1
        })
    );
}

#[test]
fn vectorize_one_output_per_component() {
    let x = leaf(2.0, 3, 1);
    let y = leaf(1.0, 3, 2);
    let z = leaf(0.5, 3, 3);
    let fs = [
        3.0 * x.clone() + 2.0 * y.clone() + 4.0 * z,
        &x - &y,
        x.clone() / 2.0,
        2.0 * x - 2.0 * y,
    ];
    let f = vectorize(&fs, 1, 3).unwrap();

    assert_eq!(f.outputs(), 4);
    assert_eq!(f.value().as_slice(), &[10.0, 1.0, 1.0, 2.0]);
    let expected = DMatrix::from_row_slice(
        4,
        3,
        &[3.0, 2.0, 4.0, 1.0, -1.0, 0.0, 0.5, 0.0, 0.0, 2.0, -2.0, 0.0],
    );
    assert_eq!(f.jacobian(), &expected);
}

#[test]
fn vectorize_components_evaluated_at_several_points() {
    // Each component holds two outputs: x at two points and x·y broadcast over them.
    let x = Variable::new(&[1.0_f64, 2.0], &[1.0, 1.0], 2, 1).unwrap();
    let y = leaf(3.0, 2, 2);
    let xy = &x * &y;
    let f = vectorize(&[x, xy], 2, 2).unwrap();

    assert_eq!(f.outputs(), 4);
    assert_eq!(f.value().as_slice(), &[1.0, 2.0, 3.0, 6.0]);
    let expected = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 1.0, 0.0, 3.0, 1.0, 3.0, 2.0]);
    assert_eq!(f.jacobian(), &expected);
    assert_eq!(
        vectorize(&[f.clone(), y], 4, 2),
        Err(Error::OutputMismatch {
            op: "vectorize",
            left: 4,
            right: 1
        })
    );
}

#[test]
fn elementals_apply_rowwise_to_vector_values() {
    let v = Variable::new(&[0.0_f64, 1.0], &[1.0, 1.0], 1, 1).unwrap();
    let s = sin(v);
    assert_relative_eq!(s.value()[1], 1.0_f64.sin());
    assert_relative_eq!(s.jacobian()[(0, 0)], 1.0);
    assert_relative_eq!(s.jacobian()[(1, 0)], 1.0_f64.cos());
}

#[test]
fn broadcast_against_single_output() {
    let v = Variable::new(&[1.0_f64, 2.0, 3.0], &[1.0, 1.0, 1.0], 2, 1).unwrap();
    let y = leaf(10.0, 2, 2);
    let f = &v * &y;
    assert_eq!(f.value().as_slice(), &[10.0, 20.0, 30.0]);
    let column = |j: usize| f.jacobian().column(j).iter().copied().collect::<Vec<f64>>();
    assert_eq!(column(0), vec![10.0, 10.0, 10.0]);
    assert_eq!(column(1), vec![1.0, 2.0, 3.0]);
}

#[test]
fn from_parts_builds_internal_node() {
    let node = Variable::from_parts(
        DVector::from_vec(vec![1.0, 2.0]),
        DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]),
        DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]),
    )
    .unwrap();
    assert_eq!(node.n(), 2);
    assert_eq!(node.outputs(), 2);
}

#[test]
fn structural_equality() {
    assert_eq!(leaf(1.0, 2, 1), leaf(1.0, 2, 1));
    assert_ne!(leaf(1.0, 2, 1), leaf(1.0, 2, 2));
    assert_ne!(leaf(1.0, 2, 1), Variable::scalar(1.0_f64, 3.0, 2, 1).unwrap());
}
