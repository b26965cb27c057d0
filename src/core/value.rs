//! The three-variant runtime value domain: `Number`, `Matrix`, `Function`.
//!
//! Exhaustive pattern matching is used at every dispatch site instead of a
//! runtime class hierarchy; see `value::arithmetic` and `value::matrix` for
//! the operations.

pub mod arithmetic;
pub mod function;
pub mod matrix;

use crate::ast::Node;
use crate::core::dimension::Dim;
use crate::core::scope::NameTable;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// A numeric leaf: an `f64` paired with its dimension vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumberValue {
    pub value: f64,
    pub dim: Dim,
}

impl NumberValue {
    pub fn new(value: f64, dim: Dim) -> Self {
        NumberValue { value, dim }
    }

    pub fn dimensionless(value: f64) -> Self {
        NumberValue { value, dim: Dim::DIMENSIONLESS }
    }
}

/// A rectangular, at-least-1x1 matrix of Values, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixValue {
    pub rows: Vec<Vec<Value>>,
}

/// A user-defined function: parameter names, a captured scope snapshot, and
/// a shared, already deep-copied body (see DESIGN.md for the `Rc` rationale).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionValue {
    pub params: Vec<String>,
    pub captured: NameTable,
    pub body: Rc<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(NumberValue),
    Matrix(MatrixValue),
    Function(FunctionValue),
}

impl Value {
    pub fn number(value: f64, dim: Dim) -> Self {
        Value::Number(NumberValue::new(value, dim))
    }

    pub fn dimensionless(value: f64) -> Self {
        Value::Number(NumberValue::dimensionless(value))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::Matrix(_) => "Matrix",
            Value::Function(_) => "Function",
        }
    }

    pub fn as_number(&self) -> Option<&NumberValue> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&MatrixValue> {
        match self {
            Value::Matrix(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionValue> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Truthiness used by `IF`/`WHILE`/`NOT`/`AND`/`OR`: a Number is truthy
    /// when nonzero. Only meaningful for Numbers; callers check the variant.
    pub fn is_truthy_number(&self) -> Option<bool> {
        self.as_number().map(|n| n.value != 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_rectangularity_invariant_helper() {
        let m = MatrixValue {
            rows: vec![
                vec![Value::dimensionless(1.0), Value::dimensionless(2.0)],
                vec![Value::dimensionless(3.0), Value::dimensionless(4.0)],
            ],
        };
        let len = m.rows[0].len();
        assert!(m.rows.iter().all(|r| r.len() == len));
    }

    #[test]
    fn type_name_matches_variant() {
        assert_eq!(Value::dimensionless(1.0).type_name(), "Number");
    }
}
