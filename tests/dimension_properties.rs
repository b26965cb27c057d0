//! Property-based tests for the dimension vector and the power invariant
//! (SPEC_FULL.md §8, universal properties 1-2), using the teacher's
//! `proptest` dev-dependency.

use docexpr_core::core::dimension::Dim;
use docexpr_core::core::value::Value;
use docexpr_core::{Coordinate, RuntimeError};
use proptest::array::uniform7;
use proptest::prelude::*;

fn c() -> Coordinate {
    Coordinate::new(1, 1)
}

fn axis_exponents() -> impl Strategy<Value = [i32; 7]> {
    uniform7(-4i32..=4)
}

proptest! {
    /// `add` then `sub` of the same dimension is the identity.
    #[test]
    fn add_sub_round_trip(a in axis_exponents(), b in axis_exponents()) {
        let a = Dim(a);
        let b = Dim(b);
        prop_assert_eq!(a.add(&b).sub(&b), a);
    }

    /// `+`/`-` between Numbers of equal dimension always succeeds and
    /// preserves that dimension.
    #[test]
    fn addition_of_equal_dimensions_preserves_dimension(exps in axis_exponents(), x in -1e6f64..1e6, y in -1e6f64..1e6) {
        let dim = Dim(exps);
        let a = Value::number(x, dim);
        let b = Value::number(y, dim);
        let sum = a.add(&b, c()).unwrap();
        prop_assert_eq!(sum, Value::number(x + y, dim));
    }

    /// Power invariant: for a dimensional base and integer exponent `n`, the
    /// result's dimension is `dim(a) * n`.
    #[test]
    fn power_scales_dimension_by_integer_exponent(exps in axis_exponents(), base_value in 1.0f64..100.0, n in -3i32..=3) {
        let dim = Dim(exps);
        let base = Value::number(base_value, dim);
        let exponent = Value::dimensionless(n as f64);
        let result = base.pow(&exponent, c()).unwrap();
        let expected_dim = dim.scale(n);
        match result {
            Value::Number(result_n) => prop_assert_eq!(result_n.dim, expected_dim),
            _ => prop_assert!(false, "pow must return a Number"),
        }
    }

    /// A dimensionless base accepts any real exponent and always yields a
    /// dimensionless result.
    #[test]
    fn power_of_dimensionless_base_is_always_dimensionless(base_value in 0.1f64..10.0, exp in -5.0f64..5.0) {
        let base = Value::dimensionless(base_value);
        let exponent = Value::dimensionless(exp);
        let result = base.pow(&exponent, c()).unwrap();
        match result {
            Value::Number(n) => prop_assert!(n.dim.is_dimensionless()),
            _ => prop_assert!(false, "pow must return a Number"),
        }
    }

    /// Addition across mismatched dimensions always fails with `UnitError`.
    #[test]
    fn addition_of_mismatched_dimensions_always_errors(a in axis_exponents(), b in axis_exponents()) {
        prop_assume!(a != b);
        let x = Value::number(1.0, Dim(a));
        let y = Value::number(1.0, Dim(b));
        prop_assert!(matches!(x.add(&y, c()), Err(RuntimeError::UnitError { .. })));
    }
}
