//! Function value construction helpers.
//!
//! Invocation (binding arguments into a mutable copy of the captured scope
//! and evaluating the body) lives in `crate::evaluator`, since it needs the
//! recursive tree walk; this module only owns construction and the
//! no-duplicate-parameters invariant.

use crate::ast::{Coordinate, Node};
use crate::core::scope::NameTable;
use crate::core::value::FunctionValue;
use crate::error::{RuntimeError, RuntimeResult};
use std::rc::Rc;

impl FunctionValue {
    pub fn new(params: Vec<String>, captured: NameTable, body: Rc<Node>, coord: Coordinate) -> RuntimeResult<FunctionValue> {
        for (i, name) in params.iter().enumerate() {
            if params[..i].contains(name) {
                return Err(RuntimeError::DefinitionError {
                    coord,
                    reason: format!("duplicate function argument: {name}"),
                });
            }
        }
        Ok(FunctionValue { params, captured, body })
    }
}
