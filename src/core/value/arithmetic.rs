//! Arithmetic, comparison, and logical operators over `Value`.
//!
//! Every operation takes the source `Coordinate` of the operator node so
//! failures can be reported with a position, matching the original
//! `Value::plus`/`Value::sub`/... static methods.

use crate::ast::Coordinate;
use crate::core::dimension::Dim;
use crate::core::value::matrix;
use crate::core::value::Value;
use crate::error::{RuntimeError, RuntimeResult};

fn type_error(coord: Coordinate, reason: impl Into<String>) -> RuntimeError {
    RuntimeError::TypeError { coord, reason: reason.into() }
}

fn unit_error(coord: Coordinate, reason: impl Into<String>) -> RuntimeError {
    RuntimeError::UnitError { coord, reason: reason.into() }
}

impl Value {
    pub fn add(&self, other: &Value, coord: Coordinate) -> RuntimeResult<Value> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => {
                if a.dim != b.dim {
                    return Err(unit_error(coord, "addition of different dimensions"));
                }
                Ok(Value::number(a.value + b.value, a.dim))
            }
            (Value::Matrix(a), Value::Matrix(b)) => matrix::elementwise(a, b, coord, |x, y, c| x.add(y, c)),
            _ => Err(type_error(coord, format!("cannot add {} and {}", self.type_name(), other.type_name()))),
        }
    }

    pub fn sub(&self, other: &Value, coord: Coordinate) -> RuntimeResult<Value> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => {
                if a.dim != b.dim {
                    return Err(unit_error(coord, "subtraction of different dimensions"));
                }
                Ok(Value::number(a.value - b.value, a.dim))
            }
            (Value::Matrix(a), Value::Matrix(b)) => matrix::elementwise(a, b, coord, |x, y, c| x.sub(y, c)),
            _ => Err(type_error(coord, format!("cannot subtract {} and {}", self.type_name(), other.type_name()))),
        }
    }

    pub fn neg(&self, coord: Coordinate) -> RuntimeResult<Value> {
        match self {
            Value::Number(a) => Ok(Value::number(-a.value, a.dim)),
            Value::Matrix(m) => {
                let rows = m
                    .rows
                    .iter()
                    .map(|row| row.iter().map(|v| v.neg(coord)).collect::<RuntimeResult<Vec<_>>>())
                    .collect::<RuntimeResult<Vec<_>>>()?;
                Ok(Value::Matrix(crate::core::value::MatrixValue { rows }))
            }
            Value::Function(_) => Err(type_error(coord, "cannot negate a function")),
        }
    }

    pub fn abs(&self, coord: Coordinate) -> RuntimeResult<Value> {
        match self {
            Value::Number(a) => Ok(Value::number(a.value.abs(), a.dim)),
            _ => Err(type_error(coord, format!("cannot take absolute value of a {}", self.type_name()))),
        }
    }

    pub fn mul(&self, other: &Value, coord: Coordinate) -> RuntimeResult<Value> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::number(a.value * b.value, a.dim.add(&b.dim))),
            (Value::Number(_), Value::Matrix(m)) | (Value::Matrix(m), Value::Number(_)) => {
                let scalar = if let Value::Number(_) = self { self.clone() } else { other.clone() };
                let rows = m
                    .rows
                    .iter()
                    .map(|row| row.iter().map(|v| v.mul(&scalar, coord)).collect::<RuntimeResult<Vec<_>>>())
                    .collect::<RuntimeResult<Vec<_>>>()?;
                Ok(Value::Matrix(crate::core::value::MatrixValue { rows }))
            }
            (Value::Matrix(a), Value::Matrix(b)) => matrix::multiply(a, b, coord),
            _ => Err(type_error(coord, format!("cannot multiply {} and {}", self.type_name(), other.type_name()))),
        }
    }

    pub fn div(&self, other: &Value, coord: Coordinate) -> RuntimeResult<Value> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => {
                if b.value == 0.0 {
                    return Err(RuntimeError::DomainError {
                        coord,
                        reason: "division by zero".to_string(),
                    });
                }
                Ok(Value::number(a.value / b.value, a.dim.sub(&b.dim)))
            }
            (Value::Matrix(_), Value::Matrix(_)) => Err(type_error(coord, "division by a matrix is forbidden")),
            (Value::Matrix(m), Value::Number(k)) => {
                if k.value == 0.0 {
                    return Err(RuntimeError::DomainError {
                        coord,
                        reason: "division by zero".to_string(),
                    });
                }
                let scale = Value::dimensionless(1.0 / k.value);
                let rows = m
                    .rows
                    .iter()
                    .map(|row| row.iter().map(|v| v.mul(&scale, coord)).collect::<RuntimeResult<Vec<_>>>())
                    .collect::<RuntimeResult<Vec<_>>>()?;
                Ok(Value::Matrix(crate::core::value::MatrixValue { rows }))
            }
            _ => Err(type_error(coord, format!("cannot divide {} by {}", self.type_name(), other.type_name()))),
        }
    }

    pub fn pow(&self, other: &Value, coord: Coordinate) -> RuntimeResult<Value> {
        let (base, exp) = match (self, other) {
            (Value::Number(a), Value::Number(b)) => (a, b),
            _ => return Err(type_error(coord, "power requires two Numbers")),
        };
        if !exp.dim.is_dimensionless() {
            return Err(unit_error(coord, "exponent must be dimensionless"));
        }
        if base.dim.is_dimensionless() {
            return Ok(Value::number(base.value.powf(exp.value), Dim::DIMENSIONLESS));
        }
        if exp.value.fract() != 0.0 {
            return Err(unit_error(coord, "power of a dimensional base requires an integer exponent"));
        }
        let n = exp.value as i32;
        Ok(Value::number(base.value.powf(exp.value), base.dim.scale(n)))
    }

    /// Runtime `==`/`!=` per §4.1: cross-variant is `false`; Numbers compare
    /// bit-equal `value` regardless of dimension; Matrices compare shape and
    /// elementwise equality; Functions are never equal.
    pub fn runtime_eq(&self, other: &Value, coord: Coordinate) -> RuntimeResult<bool> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(a.value == b.value),
            (Value::Matrix(a), Value::Matrix(b)) => {
                if a.rows.len() != b.rows.len() || a.rows.first().map(|r| r.len()) != b.rows.first().map(|r| r.len()) {
                    return Ok(false);
                }
                for (ra, rb) in a.rows.iter().zip(b.rows.iter()) {
                    for (va, vb) in ra.iter().zip(rb.iter()) {
                        if !va.runtime_eq(vb, coord)? {
                            return Ok(false);
                        }
                    }
                }
                Ok(true)
            }
            (Value::Function(_), Value::Function(_)) => Ok(false),
            _ => Ok(false),
        }
    }

    pub fn eq_value(&self, other: &Value, coord: Coordinate) -> RuntimeResult<Value> {
        Ok(Value::dimensionless(if self.runtime_eq(other, coord)? { 1.0 } else { 0.0 }))
    }

    pub fn neq_value(&self, other: &Value, coord: Coordinate) -> RuntimeResult<Value> {
        Ok(Value::dimensionless(if self.runtime_eq(other, coord)? { 0.0 } else { 1.0 }))
    }

    fn as_cmp_number(&self, coord: Coordinate) -> RuntimeResult<f64> {
        self.as_number()
            .map(|n| n.value)
            .ok_or_else(|| type_error(coord, format!("cannot compare a {} with < <= >= >", self.type_name())))
    }

    pub fn lt(&self, other: &Value, coord: Coordinate) -> RuntimeResult<Value> {
        Ok(Value::dimensionless((self.as_cmp_number(coord)? < other.as_cmp_number(coord)?) as i32 as f64))
    }

    pub fn leq(&self, other: &Value, coord: Coordinate) -> RuntimeResult<Value> {
        Ok(Value::dimensionless((self.as_cmp_number(coord)? <= other.as_cmp_number(coord)?) as i32 as f64))
    }

    pub fn gt(&self, other: &Value, coord: Coordinate) -> RuntimeResult<Value> {
        Ok(Value::dimensionless((self.as_cmp_number(coord)? > other.as_cmp_number(coord)?) as i32 as f64))
    }

    pub fn geq(&self, other: &Value, coord: Coordinate) -> RuntimeResult<Value> {
        Ok(Value::dimensionless((self.as_cmp_number(coord)? >= other.as_cmp_number(coord)?) as i32 as f64))
    }

    fn as_logical(&self, coord: Coordinate) -> RuntimeResult<bool> {
        self.as_number()
            .map(|n| n.value != 0.0)
            .ok_or_else(|| type_error(coord, format!("cannot use a {} as a logical operand", self.type_name())))
    }

    pub fn and(&self, other: &Value, coord: Coordinate) -> RuntimeResult<Value> {
        Ok(Value::dimensionless((self.as_logical(coord)? && other.as_logical(coord)?) as i32 as f64))
    }

    pub fn or(&self, other: &Value, coord: Coordinate) -> RuntimeResult<Value> {
        Ok(Value::dimensionless((self.as_logical(coord)? || other.as_logical(coord)?) as i32 as f64))
    }

    pub fn not(&self, coord: Coordinate) -> RuntimeResult<Value> {
        Ok(Value::dimensionless(!self.as_logical(coord)? as i32 as f64))
    }
}
