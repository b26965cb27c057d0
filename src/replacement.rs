//! Replacement registry: the evaluator's only non-return output channel.
//!
//! Grounded on `Replacement`/`Node::save_rep`/`Node::reps` in `Value.h`. The
//! registry is an explicit output parameter threaded through evaluation
//! rather than module-level state, per DESIGN.md.

use crate::ast::Coordinate;
use crate::core::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A placeholder or `\graphic` hole and the value computed to fill it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replacement {
    pub begin: usize,
    pub end: usize,
    pub value: Option<Value>,
}

impl Replacement {
    pub fn new(begin: usize, end: usize) -> Self {
        Replacement { begin, end, value: None }
    }
}

/// Coordinate-keyed mapping from document holes to their materialised
/// values. Insertion happens when the parser builds `PLACEHOLDER`/`GRAPHIC`
/// skeletons (upstream of this crate; see `ReplacementRegistry::reserve`)
/// and population happens during evaluation (`ReplacementRegistry::fill`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplacementRegistry(BTreeMap<Coordinate, Replacement>);

impl ReplacementRegistry {
    pub fn new() -> Self {
        ReplacementRegistry(BTreeMap::new())
    }

    /// Registers an empty skeleton at `coord`, as the parser does when it
    /// builds a `PLACEHOLDER` (span `(end-2, end)`) or `GRAPHIC` node.
    pub fn reserve(&mut self, coord: Coordinate, begin: usize, end: usize) {
        self.0.insert(coord, Replacement::new(begin, end));
    }

    /// Fills in the value computed during evaluation. Creates the skeleton
    /// on demand if `reserve` was never called (defensive; the contract is
    /// that the parser always reserves first).
    pub fn fill(&mut self, coord: Coordinate, value: Value) {
        self.0.entry(coord).or_insert_with(|| Replacement::new(0, 0)).value = Some(value);
    }

    pub fn get(&self, coord: &Coordinate) -> Option<&Replacement> {
        self.0.get(coord)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Coordinate, &Replacement)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// JSON encoding handed back to the document splicer this crate doesn't
    /// implement. Grounded on `MathSerializer::stringify`/`::parse` in the
    /// teacher's `parsing/serialize.rs`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }

    pub fn from_json(data: &str) -> serde_json::Result<ReplacementRegistry> {
        let map: BTreeMap<Coordinate, Replacement> = serde_json::from_str(data)?;
        Ok(ReplacementRegistry(map))
    }
}
