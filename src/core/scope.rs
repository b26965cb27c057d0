//! Two-tier name lookup: a process-wide global table and a per-activation
//! local table inherited from the defining scope at function-definition time.

use crate::ast::Coordinate;
use crate::core::value::Value;
use crate::error::{RuntimeError, RuntimeResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A value-owning name → Value mapping. Two instances exist in a running
/// evaluation: the long-lived global table and short-lived per-call locals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameTable(HashMap<String, Value>);

impl NameTable {
    pub fn new() -> Self {
        NameTable(HashMap::new())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.0.get_mut(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }
}

/// `lookup(name, local?)`: local, if present and containing `name`, wins;
/// otherwise fall back to `global`; undefined names are a `NameError`.
pub fn lookup(name: &str, local: Option<&NameTable>, global: &NameTable, coord: Coordinate) -> RuntimeResult<Value> {
    if let Some(local) = local {
        if let Some(v) = local.get(name) {
            return Ok(v.clone());
        }
    }
    global
        .get(name)
        .cloned()
        .ok_or_else(|| RuntimeError::NameError { coord, reason: format!("undefined name: {name}") })
}

/// `lookup_mut(name, local?) → &mut Value`: same precedence as `lookup`, but
/// returns a mutable handle for in-place matrix-cell assignment (`SET` with
/// index fields). Never creates a binding; undefined names are a `NameError`.
pub fn lookup_mut<'a>(
    name: &str,
    local: Option<&'a mut NameTable>,
    global: &'a mut NameTable,
    coord: Coordinate,
) -> RuntimeResult<&'a mut Value> {
    if let Some(local) = local {
        if local.contains(name) {
            return Ok(local.get_mut(name).expect("checked contains above"));
        }
    }
    global.get_mut(name).ok_or_else(|| RuntimeError::NameError { coord, reason: format!("undefined name: {name}") })
}

/// `def(name, value, local?)`: assigns into `local` only when `local` is
/// present AND `global` does not already bind `name` — existing globals
/// dominate. This is the source's surprising "assignments inside a function
/// scope go local unless a global of that name already exists" policy,
/// preserved exactly (see DESIGN.md Open Questions).
pub fn def(name: &str, value: Value, local: Option<&mut NameTable>, global: &mut NameTable) {
    if let Some(local) = local {
        if !global.contains(name) {
            local.insert(name, value);
            return;
        }
    }
    global.insert(name, value);
}

/// `snapshot(local?)`: a by-value copy of whichever mapping is currently in
/// force, bound into a Function's captured scope. Must not alias the
/// enclosing activation's table.
pub fn snapshot(local: Option<&NameTable>, global: &NameTable) -> NameTable {
    match local {
        Some(local) => local.clone(),
        None => global.clone(),
    }
}
