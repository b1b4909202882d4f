//! Algebraic laws that hold for every input, checked on random samples.

use dualdiff::{cos, exp, hessian, sin, Dual, Dual64, NestedDual, Variable};
use proptest::prelude::*;

/// Relative tolerance for derivatives that go through a transcendental call.
const REL_EPSILON: f64 = 1e-12;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= REL_EPSILON * a.abs().max(b.abs()).max(1.0)
}

fn dual() -> impl Strategy<Value = Dual64> {
    (-1e3..1e3_f64, -1e3..1e3_f64).prop_map(|(re, eps)| Dual::new(re, eps))
}

fn nonzero_dual() -> impl Strategy<Value = Dual64> {
    dual().prop_filter("zero primal", |d| d.re.abs() > 1e-6)
}

/// `(n, k)` with `1 <= k <= n`.
fn dimension_and_index() -> impl Strategy<Value = (usize, usize)> {
    (1usize..12).prop_flat_map(|n| (Just(n), 1..=n))
}

/// Two seeded leaves over the same input space, possibly on the same index.
fn variable_pair() -> impl Strategy<Value = (Variable<f64>, Variable<f64>)> {
    (1usize..8)
        .prop_flat_map(|n| (Just(n), 1..=n, 1..=n, -1e3..1e3_f64, -1e3..1e3_f64, -5.0..5.0_f64))
        .prop_map(|(n, j, k, a, b, seed)| {
            let x = Variable::scalar(a, seed, n, j).unwrap();
            let y = Variable::scalar(b, 1.0, n, k).unwrap();
            (x, y)
        })
}

/// Two leaves of the same order over a two-lane space, seeded on each lane.
fn nested_pair() -> impl Strategy<Value = (NestedDual<f64>, NestedDual<f64>, usize)> {
    (1usize..4, -1e2..1e2_f64, -1e2..1e2_f64).prop_map(|(order, a, b)| {
        let x = NestedDual::variable(a, &[1.0, 0.0], order).unwrap();
        let y = NestedDual::variable(b, &[0.0, 1.0], order).unwrap();
        (x, y, order)
    })
}

proptest! {
    #[test]
    fn negation_is_scaling_by_minus_one(x in dual()) {
        prop_assert_eq!(-1.0 * x, -x);
        prop_assert_eq!(x * -1.0, -x);
    }

    #[test]
    fn self_difference_vanishes(x in dual()) {
        let d = x - x;
        prop_assert_eq!(d.re, 0.0);
        prop_assert_eq!(d.eps, 0.0);
    }

    #[test]
    fn self_quotient_is_one(x in nonzero_dual()) {
        let q = x / x;
        prop_assert_eq!(q.re, 1.0);
        prop_assert_eq!(q.eps, 0.0);
    }

    #[test]
    fn sum_and_product_commute(a in dual(), b in dual()) {
        prop_assert_eq!(a + b, b + a);
        prop_assert_eq!(a * b, b * a);
        prop_assert_eq!(a + 2.5, 2.5 + a);
        prop_assert_eq!(a * 2.5, 2.5 * a);
    }

    #[test]
    fn chain_rule_scales_by_seed(x in -10.0..10.0_f64, seed in -5.0..5.0_f64) {
        let d = Dual::new(x, seed);
        prop_assert!(close(sin(d).eps, x.cos() * seed));
        prop_assert!(close(cos(d).eps, -x.sin() * seed));
        prop_assert!(close(exp(d).eps, x.exp() * seed));
    }

    #[test]
    fn leaf_jacobian_is_one_hot((n, k) in dimension_and_index(), value in -1e3..1e3_f64) {
        let v = Variable::scalar(value, 1.0, n, k).unwrap();
        prop_assert_eq!(v.n(), n);
        for j in 0..n {
            let expected = if j + 1 == k { 1.0 } else { 0.0 };
            prop_assert_eq!(v.jacobian()[(0, j)], expected);
        }
    }

    #[test]
    fn variable_self_quotient_has_zero_jacobian(
        (n, k) in dimension_and_index(),
        value in prop_oneof![-1e3..-1e-3_f64, 1e-3..1e3_f64],
    ) {
        let v = Variable::scalar(value, 1.0, n, k).unwrap();
        let q = &v / &v;
        prop_assert_eq!(q.primal(), 1.0);
        prop_assert!(q.jacobian().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn variable_negation_is_scaling_by_minus_one((x, _) in variable_pair()) {
        prop_assert_eq!(-1.0 * x.clone(), -&x);
        prop_assert_eq!(x.clone() * -1.0, -x);
    }

    #[test]
    fn variable_self_difference_vanishes((x, _) in variable_pair()) {
        let d = &x - &x;
        prop_assert_eq!(d.primal(), 0.0);
        prop_assert!(d.derivative().iter().all(|&v| v == 0.0));
        prop_assert!(d.jacobian().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn variable_sum_and_product_commute((x, y) in variable_pair()) {
        prop_assert_eq!(&x + &y, &y + &x);
        prop_assert_eq!(&x * &y, &y * &x);
        prop_assert_eq!(x.clone() + 2.5, 2.5 + x.clone());
        prop_assert_eq!(x.clone() * 2.5, 2.5 * x);
    }

    #[test]
    fn nested_negation_is_scaling_by_minus_one((x, _, _) in nested_pair()) {
        prop_assert_eq!(-1.0 * x.clone(), -&x);
        prop_assert_eq!(x.clone() * -1.0, -x);
    }

    #[test]
    fn nested_self_difference_vanishes((x, _, order) in nested_pair()) {
        prop_assert_eq!(&x - &x, NestedDual::constant(0.0, order, 2));
    }

    #[test]
    fn nested_sum_and_product_commute((x, y, _) in nested_pair()) {
        prop_assert_eq!(&x + &y, &y + &x);
        prop_assert_eq!(&x * &y, &y * &x);
        prop_assert_eq!(x.clone() + 2.5, 2.5 + x.clone());
        prop_assert_eq!(x.clone() * 2.5, 2.5 * x);
    }

    #[test]
    fn hessian_is_symmetric(x in -2.0..2.0_f64, y in -2.0..2.0_f64) {
        let h = hessian(|v| &(&v[0] * &v[1]) * &sin(v[0].clone()) + exp(&v[0] * &v[1]), &[x, y]).unwrap();
        prop_assert!(h.is_symmetric(1e-9));
    }
}
