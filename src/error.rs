//! Error types for the semantic analyser and evaluator
//!
//! Both error types carry the source `Coordinate` of the violation, so the
//! downward collaborator can report `{line, column, message}` directly.

use crate::ast::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors raised by the single-pass semantic analyser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnalysisError {
    /// Unknown unit, unit mismatch under `+`/`-`/comparison, dimensional
    /// operand under `SUM`/`PRODUCT`/`POW`.
    UnitError { coord: Coordinate, reason: String },
    /// Wrong variant for an operation (function in arithmetic, matrix in
    /// divisor).
    TypeError { coord: Coordinate, reason: String },
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::UnitError { coord, reason } => write!(f, "{}: {}", coord, reason),
            AnalysisError::TypeError { coord, reason } => write!(f, "{}: {}", coord, reason),
        }
    }
}

impl std::error::Error for AnalysisError {}

impl AnalysisError {
    pub fn coord(&self) -> Coordinate {
        match self {
            AnalysisError::UnitError { coord, .. } => *coord,
            AnalysisError::TypeError { coord, .. } => *coord,
        }
    }
}

/// Errors raised during evaluation, matching the six kinds of §7.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuntimeError {
    UnitError { coord: Coordinate, reason: String },
    TypeError { coord: Coordinate, reason: String },
    ShapeError { coord: Coordinate, reason: String },
    NameError { coord: Coordinate, reason: String },
    DefinitionError { coord: Coordinate, reason: String },
    DomainError { coord: Coordinate, reason: String },
}

impl RuntimeError {
    pub fn coord(&self) -> Coordinate {
        match self {
            RuntimeError::UnitError { coord, .. }
            | RuntimeError::TypeError { coord, .. }
            | RuntimeError::ShapeError { coord, .. }
            | RuntimeError::NameError { coord, .. }
            | RuntimeError::DefinitionError { coord, .. }
            | RuntimeError::DomainError { coord, .. } => *coord,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            RuntimeError::UnitError { reason, .. }
            | RuntimeError::TypeError { reason, .. }
            | RuntimeError::ShapeError { reason, .. }
            | RuntimeError::NameError { reason, .. }
            | RuntimeError::DefinitionError { reason, .. }
            | RuntimeError::DomainError { reason, .. } => reason,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.coord(), self.message())
    }
}

impl std::error::Error for RuntimeError {}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_coordinate() {
        let err = RuntimeError::DomainError {
            coord: Coordinate::new(3, 7),
            reason: "division by zero".to_string(),
        };
        assert_eq!(err.to_string(), "3:7: division by zero");
    }

    #[test]
    fn analysis_error_coord_accessor() {
        let err = AnalysisError::UnitError {
            coord: Coordinate::new(1, 1),
            reason: "unit not basic".to_string(),
        };
        assert_eq!(err.coord(), Coordinate::new(1, 1));
    }
}
