//! Core value domain: dimensions, the three-variant `Value`, and scope.

pub mod dimension;
pub mod scope;
pub mod value;

pub use dimension::Dim;
pub use scope::NameTable;
pub use value::{FunctionValue, MatrixValue, NumberValue, Value};
