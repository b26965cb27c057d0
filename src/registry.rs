//! Unit, constant, and builtin-function registries, keyed by LaTeX control
//! sequence. Grounded on `mathhook-core/src/parser/constants.rs`'s
//! `once_cell::sync::Lazy` static-table pattern.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The seven base SI units, mapped to their axis index in `Dim`.
pub static UNITS: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("m", 0);
    m.insert("kg", 1);
    m.insert("s", 2);
    m.insert("A", 3);
    m.insert("K", 4);
    m.insert("mol", 5);
    m.insert("cd", 6);
    m
});

/// Named dimensionless constants.
pub static CONSTANTS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("\\pi", std::f64::consts::PI);
    m.insert("\\e", std::f64::consts::E);
    m
});

/// Unary builtins. `\floor` is the only one allowed a dimensional argument
/// (see `crate::evaluator`'s `KEYWORD` handling).
pub static UNARY_BUILTINS: Lazy<HashMap<&'static str, fn(f64) -> f64>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, fn(f64) -> f64> = HashMap::new();
    m.insert("\\sin", f64::sin);
    m.insert("\\cos", f64::cos);
    m.insert("\\tan", f64::tan);
    m.insert("\\sqrt", f64::sqrt);
    m.insert("\\ln", f64::ln);
    m.insert("\\exp", f64::exp);
    m.insert("\\floor", f64::floor);
    m
});

/// Binary builtins: `\log` takes `(base, value)`.
pub static BINARY_BUILTINS: Lazy<HashMap<&'static str, fn(f64, f64) -> f64>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, fn(f64, f64) -> f64> = HashMap::new();
    m.insert("\\max", f64::max);
    m.insert("\\min", f64::min);
    m.insert("\\log", |base, value| value.log(base));
    m
});

pub fn unary_arity() -> usize {
    1
}

pub fn binary_arity() -> usize {
    2
}
