//! Matrix-specific operations: construction, shape-checked elementwise ops,
//! general and dot-product multiplication, transpose, and indexing.

use crate::ast::Coordinate;
use crate::core::value::{MatrixValue, Value};
use crate::error::{RuntimeError, RuntimeResult};

fn shape_error(coord: Coordinate, reason: impl Into<String>) -> RuntimeError {
    RuntimeError::ShapeError { coord, reason: reason.into() }
}

fn type_error(coord: Coordinate, reason: impl Into<String>) -> RuntimeError {
    RuntimeError::TypeError { coord, reason: reason.into() }
}

impl MatrixValue {
    /// Builds a matrix from evaluated rows, rejecting ragged shapes — every
    /// Matrix produced by any operation must be rectangular (§8 property 5).
    pub fn from_rows(rows: Vec<Vec<Value>>, coord: Coordinate) -> RuntimeResult<MatrixValue> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err(shape_error(coord, "matrix must be at least 1x1"));
        }
        let width = rows[0].len();
        if rows.iter().any(|row| row.len() != width) {
            return Err(shape_error(coord, "matrix rows must all have equal length"));
        }
        Ok(MatrixValue { rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.rows[0].len()
    }

    pub fn is_row_vector(&self) -> bool {
        self.row_count() == 1
    }

    pub fn is_col_vector(&self) -> bool {
        self.col_count() == 1
    }

    pub fn transpose(&self) -> MatrixValue {
        let rows_n = self.row_count();
        let cols_n = self.col_count();
        let mut out = vec![Vec::with_capacity(rows_n); cols_n];
        for row in &self.rows {
            for (j, value) in row.iter().enumerate() {
                out[j].push(value.clone());
            }
        }
        MatrixValue { rows: out }
    }

    /// Single-argument indexing: row-vector indexes the column, column-vector
    /// indexes the row; any other shape is an error.
    pub fn index1(&self, idx: f64, coord: Coordinate) -> RuntimeResult<Value> {
        let i = non_negative_index(idx, coord)?;
        if self.is_row_vector() {
            self.get(0, i, coord)
        } else if self.is_col_vector() {
            self.get(i, 0, coord)
        } else {
            Err(shape_error(coord, "single index requires a row or column vector"))
        }
    }

    pub fn index2(&self, i: f64, j: f64, coord: Coordinate) -> RuntimeResult<Value> {
        let i = non_negative_index(i, coord)?;
        let j = non_negative_index(j, coord)?;
        self.get(i, j, coord)
    }

    pub fn get(&self, i: usize, j: usize, coord: Coordinate) -> RuntimeResult<Value> {
        if i >= self.row_count() || j >= self.col_count() {
            return Err(shape_error(coord, "index is out of range"));
        }
        Ok(self.rows[i][j].clone())
    }

    pub fn set(&mut self, i: usize, j: usize, value: Value, coord: Coordinate) -> RuntimeResult<()> {
        if i >= self.row_count() || j >= self.col_count() {
            return Err(shape_error(coord, "index is out of range"));
        }
        self.rows[i][j] = value;
        Ok(())
    }

    /// Mirrors `index1`'s row-vector/column-vector dispatch for assignment.
    pub fn set_index1(&mut self, idx: f64, value: Value, coord: Coordinate) -> RuntimeResult<()> {
        let i = non_negative_index(idx, coord)?;
        if self.is_row_vector() {
            self.set(0, i, value, coord)
        } else if self.is_col_vector() {
            self.set(i, 0, value, coord)
        } else {
            Err(shape_error(coord, "single index requires a row or column vector"))
        }
    }

    pub fn set_index2(&mut self, i: f64, j: f64, value: Value, coord: Coordinate) -> RuntimeResult<()> {
        let i = non_negative_index(i, coord)?;
        let j = non_negative_index(j, coord)?;
        self.set(i, j, value, coord)
    }
}

fn non_negative_index(idx: f64, coord: Coordinate) -> RuntimeResult<usize> {
    if idx < 0.0 {
        return Err(shape_error(coord, "negative index"));
    }
    Ok(idx as usize)
}

pub fn elementwise(
    a: &MatrixValue,
    b: &MatrixValue,
    coord: Coordinate,
    op: impl Fn(&Value, &Value, Coordinate) -> RuntimeResult<Value>,
) -> RuntimeResult<Value> {
    if a.row_count() != b.row_count() || a.col_count() != b.col_count() {
        return Err(shape_error(coord, "matrix dimensions mismatch"));
    }
    let rows = a
        .rows
        .iter()
        .zip(b.rows.iter())
        .map(|(ra, rb)| ra.iter().zip(rb.iter()).map(|(x, y)| op(x, y, coord)).collect::<RuntimeResult<Vec<_>>>())
        .collect::<RuntimeResult<Vec<_>>>()?;
    Ok(Value::Matrix(MatrixValue { rows }))
}

/// General matrix product, falling back to the original's row-vector /
/// column-vector dot-product special cases when inner dimensions disagree.
pub fn multiply(a: &MatrixValue, b: &MatrixValue, coord: Coordinate) -> RuntimeResult<Value> {
    if a.col_count() == b.row_count() {
        let mut rows = Vec::with_capacity(a.row_count());
        for i in 0..a.row_count() {
            let mut row = Vec::with_capacity(b.col_count());
            for j in 0..b.col_count() {
                let mut acc = a.rows[i][0].mul(&b.rows[0][j], coord)?;
                for k in 1..b.row_count() {
                    acc = acc.add(&a.rows[i][k].mul(&b.rows[k][j], coord)?, coord)?;
                }
                row.push(acc);
            }
            rows.push(row);
        }
        return Ok(Value::Matrix(MatrixValue { rows }));
    }

    if a.is_row_vector() && b.is_row_vector() && a.col_count() == b.col_count() {
        let product = multiply(a, &b.transpose(), coord)?;
        return Ok(product.as_matrix().unwrap().rows[0][0].clone());
    }
    if a.is_col_vector() && b.is_col_vector() && a.row_count() == b.row_count() {
        let product = multiply(&a.transpose(), b, coord)?;
        return Ok(product.as_matrix().unwrap().rows[0][0].clone());
    }

    Err(type_error(coord, "matrix/vector dimensions mismatch"))
}
