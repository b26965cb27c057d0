//! Recursive tree-walking evaluator. Grounded on `Node::exec` in the original
//! `Value.h`, reworked tag-by-tag into idiomatic `Result`-returning Rust
//! instead of the source's raw-pointer scope juggling and C++ exceptions.

use crate::ast::{Coordinate, Node, Tag};
use crate::core::dimension::Dim;
use crate::core::scope::{self, NameTable};
use crate::core::value::{FunctionValue, MatrixValue, Value};
use crate::error::{RuntimeError, RuntimeResult};
use crate::registry::{BINARY_BUILTINS, CONSTANTS, UNARY_BUILTINS, UNITS};
use crate::replacement::ReplacementRegistry;
use std::rc::Rc;

/// Safety valve for runaway `WHILE`/`PRODUCT` loops. Off by default; not part
/// of the evaluator's documented contract (see DESIGN.md).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluatorConfig {
    pub max_loop_iterations: Option<u64>,
}

/// Owns the two pieces of state a program evaluation threads through: the
/// process-wide global `NameTable` and the replacement registry. Local scopes
/// are per-activation and live only on the Rust call stack.
#[derive(Debug)]
pub struct Evaluator {
    global: NameTable,
    replacements: ReplacementRegistry,
    config: EvaluatorConfig,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator { global: NameTable::new(), replacements: ReplacementRegistry::new(), config: EvaluatorConfig::default() }
    }

    pub fn with_config(config: EvaluatorConfig) -> Self {
        Evaluator { global: NameTable::new(), replacements: ReplacementRegistry::new(), config }
    }

    pub fn global(&self) -> &NameTable {
        &self.global
    }

    pub fn replacements(&self) -> &ReplacementRegistry {
        &self.replacements
    }

    /// Evaluates a whole statement or program tree under an empty local scope.
    pub fn evaluate(&mut self, node: &Node) -> RuntimeResult<Value> {
        self.eval(node, None)
    }

    fn eval(&mut self, node: &Node, mut local: Option<&mut NameTable>) -> RuntimeResult<Value> {
        match node.tag {
            Tag::Number => node
                .label
                .parse::<f64>()
                .map(Value::dimensionless)
                .map_err(|_| RuntimeError::TypeError { coord: node.coord, reason: format!("invalid numeric literal: {}", node.label) }),

            Tag::Ident => self.eval_ident(node, local),

            Tag::Func => self.eval_call(node, local),

            Tag::Uadd | Tag::Lparen => {
                let right = required(&node.right, node.coord, "missing operand")?;
                self.eval(right, local)
            }
            Tag::Usub => {
                let right = required(&node.right, node.coord, "missing operand")?;
                let v = self.eval(right, local)?;
                v.neg(node.coord)
            }
            Tag::Not => {
                let right = required(&node.right, node.coord, "missing operand")?;
                let v = self.eval(right, local)?;
                v.not(node.coord)
            }
            Tag::Abs => {
                let right = required(&node.right, node.coord, "missing operand")?;
                let v = self.eval(right, local)?;
                v.abs(node.coord)
            }

            Tag::Set => self.eval_set(node, local),

            Tag::Eq => self.eval_eq(node, local),

            Tag::Add | Tag::Sub | Tag::Mul | Tag::Div | Tag::Frac | Tag::Pow | Tag::Neq | Tag::Leq | Tag::Geq | Tag::Lt
            | Tag::Gt | Tag::And | Tag::Or => {
                let left = required(&node.left, node.coord, "missing left operand")?;
                let right = required(&node.right, node.coord, "missing right operand")?;
                let lval = self.eval(left, local.as_deref_mut())?;
                let rval = self.eval(right, local.as_deref_mut())?;
                match node.tag {
                    Tag::Add => lval.add(&rval, node.coord),
                    Tag::Sub => lval.sub(&rval, node.coord),
                    Tag::Mul => lval.mul(&rval, node.coord),
                    Tag::Div | Tag::Frac => lval.div(&rval, node.coord),
                    Tag::Pow => lval.pow(&rval, node.coord),
                    Tag::Neq => lval.neq_value(&rval, node.coord),
                    Tag::Leq => lval.leq(&rval, node.coord),
                    Tag::Geq => lval.geq(&rval, node.coord),
                    Tag::Lt => lval.lt(&rval, node.coord),
                    Tag::Gt => lval.gt(&rval, node.coord),
                    Tag::And => lval.and(&rval, node.coord),
                    Tag::Or => lval.or(&rval, node.coord),
                    _ => unreachable!(),
                }
            }

            Tag::Root | Tag::Beginb => {
                let mut result = Value::dimensionless(0.0);
                for field in &node.fields {
                    result = self.eval(field, local.as_deref_mut())?;
                }
                Ok(result)
            }

            Tag::Beginm => {
                let mut rows = Vec::with_capacity(node.fields.len());
                for row_node in &node.fields {
                    let mut row = Vec::with_capacity(row_node.fields.len());
                    for cell in &row_node.fields {
                        row.push(self.eval(cell, local.as_deref_mut())?);
                    }
                    rows.push(row);
                }
                MatrixValue::from_rows(rows, node.coord).map(Value::Matrix)
            }

            Tag::Beginc => {
                for field in &node.fields {
                    let matched = match &field.cond {
                        None => true,
                        Some(cond) => {
                            let c = self.eval(cond, local.as_deref_mut())?;
                            require_truthy(&c, field.coord)?
                        }
                    };
                    if matched {
                        let right = required(&field.right, field.coord, "case branch missing expression")?;
                        return self.eval(right, local);
                    }
                }
                Ok(Value::dimensionless(0.0))
            }

            Tag::If => {
                let cond = required(&node.cond, node.coord, "if missing condition")?;
                let c = self.eval(cond, local.as_deref_mut())?;
                if require_truthy(&c, node.coord)? {
                    let right = required(&node.right, node.coord, "if missing then-branch")?;
                    self.eval(right, local)
                } else if let Some(left) = &node.left {
                    self.eval(left, local)
                } else {
                    Ok(Value::dimensionless(0.0))
                }
            }

            Tag::While | Tag::Product => {
                let cond = required(&node.cond, node.coord, "loop missing condition")?;
                let right = required(&node.right, node.coord, "loop missing body")?;
                let mut result = Value::dimensionless(0.0);
                let mut iterations: u64 = 0;
                loop {
                    let c = self.eval(cond, local.as_deref_mut())?;
                    if !require_truthy(&c, node.coord)? {
                        break;
                    }
                    result = self.eval(right, local.as_deref_mut())?;
                    iterations += 1;
                    if let Some(max) = self.config.max_loop_iterations {
                        if iterations >= max {
                            return Err(RuntimeError::DomainError { coord: node.coord, reason: "loop iteration cap exceeded".to_string() });
                        }
                    }
                }
                Ok(result)
            }

            Tag::Transp => {
                let left = required(&node.left, node.coord, "transpose missing operand")?;
                let v = self.eval(left, local)?;
                let m = v.as_matrix().ok_or_else(|| type_error(node.coord, "transpose requires a Matrix"))?;
                Ok(Value::Matrix(m.transpose()))
            }

            // SUM is checked for dimensional consistency by the analyser but
            // has no execution case in the source this was ported from --
            // it always falls through to the same dimensionless-zero default
            // as every other unhandled tag there.
            Tag::Sum => Ok(Value::dimensionless(0.0)),

            Tag::Range => self.eval_range(node, local),

            Tag::Graphic => self.eval_graphic(node, local),

            Tag::Keyword => self.eval_keyword(node, local),

            Tag::Dimension => match UNITS.get(node.label.as_str()) {
                Some(&axis) => Ok(Value::number(1.0, Dim::base(axis))),
                None => Err(unit_error(node.coord, "this unit is not basic")),
            },

            Tag::Placeholder => Err(type_error(node.coord, "placeholder cannot be evaluated outside of an equation")),
        }
    }

    fn eval_ident(&mut self, node: &Node, mut local: Option<&mut NameTable>) -> RuntimeResult<Value> {
        match node.fields.len() {
            0 => scope::lookup(&node.label, local.as_deref(), &self.global, node.coord),
            1 => {
                let v = scope::lookup(&node.label, local.as_deref(), &self.global, node.coord)?;
                let idx = self.eval(&node.fields[0], local.as_deref_mut())?;
                let idx = require_number(&idx, node.fields[0].coord)?;
                let m = v.as_matrix().ok_or_else(|| type_error(node.coord, format!("{} is not a Matrix", node.label)))?;
                m.index1(idx, node.coord)
            }
            2 => {
                let v = scope::lookup(&node.label, local.as_deref(), &self.global, node.coord)?;
                let i = self.eval(&node.fields[0], local.as_deref_mut())?;
                let i = require_number(&i, node.fields[0].coord)?;
                let j = self.eval(&node.fields[1], local.as_deref_mut())?;
                let j = require_number(&j, node.fields[1].coord)?;
                let m = v.as_matrix().ok_or_else(|| type_error(node.coord, format!("{} is not a Matrix", node.label)))?;
                m.index2(i, j, node.coord)
            }
            _ => Err(RuntimeError::ShapeError { coord: node.coord, reason: "identifier indexing takes one or two fields".to_string() }),
        }
    }

    fn eval_call(&mut self, node: &Node, mut local: Option<&mut NameTable>) -> RuntimeResult<Value> {
        let callee = scope::lookup(&node.label, local.as_deref(), &self.global, node.coord)?;
        let func = callee.as_function().ok_or_else(|| type_error(node.coord, format!("{} is not a Function", node.label)))?.clone();
        if func.params.len() != node.fields.len() {
            return Err(RuntimeError::NameError { coord: node.coord, reason: format!("{} expects {} argument(s)", node.label, func.params.len()) });
        }
        let mut args = Vec::with_capacity(node.fields.len());
        for field in &node.fields {
            args.push(self.eval(field, local.as_deref_mut())?);
        }
        self.call_function(&func, args)
    }

    /// Binds `args` into a mutable copy of the function's captured scope and
    /// evaluates its body there; the caller's scope is never touched.
    fn call_function(&mut self, func: &FunctionValue, args: Vec<Value>) -> RuntimeResult<Value> {
        let mut activation = func.captured.clone();
        for (param, value) in func.params.iter().zip(args) {
            activation.insert(param.clone(), value);
        }
        let body = Rc::clone(&func.body);
        self.eval(&body, Some(&mut activation))
    }

    fn eval_set(&mut self, node: &Node, mut local: Option<&mut NameTable>) -> RuntimeResult<Value> {
        let left = required(&node.left, node.coord, "assignment missing left-hand side")?;
        match left.tag {
            Tag::Ident if left.fields.is_empty() => {
                let right = required(&node.right, node.coord, "assignment missing right-hand side")?;
                let value = self.eval(right, local.as_deref_mut())?;
                scope::def(&left.label, value, local, &mut self.global);
                Ok(Value::dimensionless(0.0))
            }
            Tag::Ident => {
                let mut indices = Vec::with_capacity(left.fields.len());
                for field in &left.fields {
                    let v = self.eval(field, local.as_deref_mut())?;
                    indices.push(require_number(&v, field.coord)?);
                }
                let right = required(&node.right, node.coord, "assignment missing right-hand side")?;
                let value = self.eval(right, local.as_deref_mut())?;
                let target = scope::lookup_mut(&left.label, local, &mut self.global, left.coord)?;
                let matrix = match target {
                    Value::Matrix(m) => m,
                    other => return Err(type_error(left.coord, format!("{} is not a Matrix", other.type_name()))),
                };
                match indices.len() {
                    1 => matrix.set_index1(indices[0], value, left.coord)?,
                    2 => matrix.set_index2(indices[0], indices[1], value, left.coord)?,
                    _ => return Err(RuntimeError::ShapeError { coord: left.coord, reason: "identifier indexing takes one or two fields".to_string() }),
                }
                Ok(Value::dimensionless(0.0))
            }
            Tag::Func => {
                let mut params = Vec::with_capacity(left.fields.len());
                for field in &left.fields {
                    if field.tag != Tag::Ident || !field.fields.is_empty() {
                        return Err(RuntimeError::DefinitionError { coord: field.coord, reason: "function parameter must be a bare identifier".to_string() });
                    }
                    params.push(field.label.clone());
                }
                let right = required(&node.right, node.coord, "function definition missing body")?;
                let body = Rc::new((**right).clone());
                let captured = scope::snapshot(local.as_deref(), &self.global);
                let function = FunctionValue::new(params, captured, body, node.coord)?;
                scope::def(&left.label, Value::Function(function), local, &mut self.global);
                Ok(Value::dimensionless(0.0))
            }
            _ => Err(RuntimeError::DefinitionError { coord: left.coord, reason: "left-hand side is not assignable".to_string() }),
        }
    }

    /// `EQ` doubles as placeholder binding: when the right child is a bare
    /// `PLACEHOLDER`, or `placeholder \cdot unit`, evaluation records into the
    /// replacement registry instead of comparing.
    fn eval_eq(&mut self, node: &Node, mut local: Option<&mut NameTable>) -> RuntimeResult<Value> {
        let left = required(&node.left, node.coord, "equation missing left-hand side")?;
        let right = required(&node.right, node.coord, "equation missing right-hand side")?;
        let lval = self.eval(left, local.as_deref_mut())?;

        if right.tag == Tag::Placeholder {
            self.replacements.fill(right.coord, lval.clone());
            return Ok(Value::dimensionless(1.0));
        }

        let placeholder_pattern = right.tag == Tag::Mul && right.left.as_ref().map(|l| l.tag == Tag::Placeholder).unwrap_or(false);
        if placeholder_pattern {
            let placeholder_coord = right.left.as_ref().expect("checked above").coord;
            let unit_node = required(&right.right, right.coord, "missing unit expression")?;
            let unit_val = self.eval(unit_node, local.as_deref_mut())?;
            let stripped = lval.div(&unit_val, right.coord)?;
            self.replacements.fill(placeholder_coord, stripped);
            return Ok(Value::dimensionless(1.0));
        }

        let rval = self.eval(right, local)?;
        lval.eq_value(&rval, node.coord)
    }

    fn eval_range(&mut self, node: &Node, mut local: Option<&mut NameTable>) -> RuntimeResult<Value> {
        let left = required(&node.left, node.coord, "range missing start")?;
        let right = required(&node.right, node.coord, "range missing end")?;
        let a = self.eval(left, local.as_deref_mut())?;
        let a = require_number(&a, left.coord)?;
        let b = self.eval(right, local.as_deref_mut())?;
        let b = require_number(&b, right.coord)?;
        let step = match &node.cond {
            Some(cond) => {
                let v = self.eval(cond, local)?;
                require_number(&v, cond.coord)?
            }
            None => 0.1,
        };
        if step <= 0.0 {
            return Err(RuntimeError::ShapeError { coord: node.coord, reason: "range step must be positive".to_string() });
        }
        let count = ((b - a) / step + 1e-9).floor();
        if count < 0.0 {
            return Err(RuntimeError::ShapeError { coord: node.coord, reason: "empty range".to_string() });
        }
        let count = count as i64;
        let row: Vec<Value> = (0..=count).map(|i| Value::dimensionless(a + i as f64 * step)).collect();
        MatrixValue::from_rows(vec![row], node.coord).map(Value::Matrix)
    }

    fn eval_graphic(&mut self, node: &Node, mut local: Option<&mut NameTable>) -> RuntimeResult<Value> {
        let callee = scope::lookup(&node.label, local.as_deref(), &self.global, node.coord)?;
        let func = callee.as_function().ok_or_else(|| type_error(node.coord, format!("{} is not a Function", node.label)))?.clone();
        if func.params.len() != node.fields.len() {
            return Err(RuntimeError::NameError { coord: node.coord, reason: format!("{} expects {} argument(s)", node.label, func.params.len()) });
        }

        let mut range_index = None;
        for (i, field) in node.fields.iter().enumerate() {
            if field.tag == Tag::Range {
                if range_index.is_some() {
                    return Err(RuntimeError::ShapeError { coord: node.coord, reason: "more than one parameter range".to_string() });
                }
                range_index = Some(i);
            }
        }
        let range_index = range_index.ok_or_else(|| RuntimeError::ShapeError { coord: node.coord, reason: "no range parameter".to_string() })?;

        let mut fixed_args: Vec<Option<Value>> = Vec::with_capacity(node.fields.len());
        for (i, field) in node.fields.iter().enumerate() {
            if i == range_index {
                fixed_args.push(None);
            } else {
                fixed_args.push(Some(self.eval(field, local.as_deref_mut())?));
            }
        }
        let range_value = self.eval(&node.fields[range_index], local.as_deref_mut())?;
        let range_matrix = match range_value {
            Value::Matrix(m) => m,
            other => return Err(type_error(node.coord, format!("range parameter evaluated to a {}, not a Matrix", other.type_name()))),
        };

        let mut rows = Vec::with_capacity(range_matrix.col_count());
        for col in 0..range_matrix.col_count() {
            let x = range_matrix.get(0, col, node.coord)?;
            let mut args = fixed_args.clone();
            args[range_index] = Some(x.clone());
            let args: Vec<Value> = args.into_iter().map(|a| a.expect("every position filled")).collect();
            let y = self.call_function(&func, args)?;
            let y_magnitude = require_number(&y, node.coord)?;
            rows.push(vec![x, Value::dimensionless(y_magnitude)]);
        }
        let matrix = MatrixValue::from_rows(rows, node.coord)?;
        self.replacements.fill(node.coord, Value::Matrix(matrix));
        Ok(Value::dimensionless(0.0))
    }

    fn eval_keyword(&mut self, node: &Node, mut local: Option<&mut NameTable>) -> RuntimeResult<Value> {
        if let Some(&value) = CONSTANTS.get(node.label.as_str()) {
            return Ok(Value::dimensionless(value));
        }
        match node.fields.len() {
            1 => {
                let f = UNARY_BUILTINS
                    .get(node.label.as_str())
                    .ok_or_else(|| RuntimeError::NameError { coord: node.coord, reason: format!("undefined keyword: {}", node.label) })?;
                let arg = self.eval(&node.fields[0], local.as_deref_mut())?;
                let n = arg.as_number().ok_or_else(|| type_error(node.coord, format!("{} requires a Number argument", node.label)))?;
                if node.label != "\\floor" && !n.dim.is_dimensionless() {
                    return Err(unit_error(node.coord, format!("{} requires a dimensionless argument", node.label)));
                }
                let dim = if node.label == "\\floor" { n.dim } else { Dim::DIMENSIONLESS };
                Ok(Value::number(f(n.value), dim))
            }
            2 => {
                let f = BINARY_BUILTINS
                    .get(node.label.as_str())
                    .ok_or_else(|| RuntimeError::NameError { coord: node.coord, reason: format!("undefined keyword: {}", node.label) })?;
                let a = self.eval(&node.fields[0], local.as_deref_mut())?;
                let an = *a.as_number().ok_or_else(|| type_error(node.coord, format!("{} requires Number arguments", node.label)))?;
                let b = self.eval(&node.fields[1], local)?;
                let bn = *b.as_number().ok_or_else(|| type_error(node.coord, format!("{} requires Number arguments", node.label)))?;
                if !an.dim.is_dimensionless() || !bn.dim.is_dimensionless() {
                    return Err(unit_error(node.coord, format!("{} requires dimensionless arguments", node.label)));
                }
                Ok(Value::dimensionless(f(an.value, bn.value)))
            }
            n => Err(RuntimeError::NameError { coord: node.coord, reason: format!("{} takes 1 or 2 arguments, got {n}", node.label) }),
        }
    }
}

fn required<'a>(child: &'a Option<Box<Node>>, coord: Coordinate, reason: &str) -> RuntimeResult<&'a Node> {
    child.as_deref().ok_or_else(|| RuntimeError::DefinitionError { coord, reason: reason.to_string() })
}

fn require_number(value: &Value, coord: Coordinate) -> RuntimeResult<f64> {
    value.as_number().map(|n| n.value).ok_or_else(|| type_error(coord, format!("expected a Number, got {}", value.type_name())))
}

fn require_truthy(value: &Value, coord: Coordinate) -> RuntimeResult<bool> {
    value.is_truthy_number().ok_or_else(|| type_error(coord, format!("expected a Number condition, got {}", value.type_name())))
}

fn type_error(coord: Coordinate, reason: impl Into<String>) -> RuntimeError {
    RuntimeError::TypeError { coord, reason: reason.into() }
}

fn unit_error(coord: Coordinate, reason: impl Into<String>) -> RuntimeError {
    RuntimeError::UnitError { coord, reason: reason.into() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Coordinate;

    fn c() -> Coordinate {
        Coordinate::new(1, 1)
    }

    fn num(label: &str) -> Node {
        Node::leaf(Tag::Number, c(), label)
    }

    fn ident(name: &str) -> Node {
        Node::leaf(Tag::Ident, c(), name)
    }

    #[test]
    fn number_parses_as_dimensionless() {
        let mut ev = Evaluator::new();
        let v = ev.evaluate(&num("3.5")).unwrap();
        assert_eq!(v, Value::dimensionless(3.5));
    }

    #[test]
    fn set_then_lookup_round_trips() {
        let mut ev = Evaluator::new();
        let set = Node::binary(Tag::Set, c(), ident("x"), num("7"));
        ev.evaluate(&set).unwrap();
        let v = ev.evaluate(&ident("x")).unwrap();
        assert_eq!(v, Value::dimensionless(7.0));
    }

    #[test]
    fn addition_of_numbers() {
        let mut ev = Evaluator::new();
        let add = Node::binary(Tag::Add, c(), num("2"), num("3"));
        assert_eq!(ev.evaluate(&add).unwrap(), Value::dimensionless(5.0));
    }

    #[test]
    fn addition_of_mismatched_dimensions_is_a_runtime_unit_error() {
        let mut ev = Evaluator::new();
        let meters = Node::binary(Tag::Mul, c(), num("3"), Node::leaf(Tag::Dimension, c(), "m"));
        let seconds = Node::binary(Tag::Mul, c(), num("2"), Node::leaf(Tag::Dimension, c(), "s"));
        let add = Node::binary(Tag::Add, c(), meters, seconds);
        assert!(matches!(ev.evaluate(&add), Err(RuntimeError::UnitError { .. })));
    }

    #[test]
    fn function_definition_and_call() {
        let mut ev = Evaluator::new();
        let square_body = Node::binary(Tag::Pow, c(), ident("x"), num("2"));
        let def_left = Node::with_fields(Tag::Func, c(), "f", vec![ident("x")]);
        let def = Node::binary(Tag::Set, c(), def_left, square_body);
        ev.evaluate(&def).unwrap();
        let call = Node::with_fields(Tag::Func, c(), "f", vec![num("3")]);
        assert_eq!(ev.evaluate(&call).unwrap(), Value::dimensionless(9.0));
    }

    #[test]
    fn function_call_does_not_leak_argument_binding() {
        let mut ev = Evaluator::new();
        let def_left = Node::with_fields(Tag::Func, c(), "f", vec![ident("x")]);
        let def = Node::binary(Tag::Set, c(), def_left, ident("x"));
        ev.evaluate(&def).unwrap();
        let call = Node::with_fields(Tag::Func, c(), "f", vec![num("5")]);
        ev.evaluate(&call).unwrap();
        assert!(matches!(ev.evaluate(&ident("x")), Err(RuntimeError::NameError { .. })));
    }

    #[test]
    fn matrix_literal_and_index() {
        let mut ev = Evaluator::new();
        let row0 = Node::with_fields(Tag::Beginb, c(), "", vec![num("1"), num("2")]);
        let row1 = Node::with_fields(Tag::Beginb, c(), "", vec![num("3"), num("4")]);
        let matrix = Node::with_fields(Tag::Beginm, c(), "", vec![row0, row1]);
        let def = Node::binary(Tag::Set, c(), ident("M"), matrix);
        ev.evaluate(&def).unwrap();
        let index = Node::with_fields(Tag::Ident, c(), "M", vec![num("1"), num("0")]);
        assert_eq!(ev.evaluate(&index).unwrap(), Value::dimensionless(3.0));
    }

    #[test]
    fn matrix_index_assignment_mutates_in_place() {
        let mut ev = Evaluator::new();
        let row = Node::with_fields(Tag::Beginb, c(), "", vec![num("1"), num("2")]);
        let matrix = Node::with_fields(Tag::Beginm, c(), "", vec![row]);
        let def = Node::binary(Tag::Set, c(), ident("v"), matrix);
        ev.evaluate(&def).unwrap();
        let set_cell = Node::binary(
            Tag::Set,
            c(),
            Node::with_fields(Tag::Ident, c(), "v", vec![num("1")]),
            num("99"),
        );
        ev.evaluate(&set_cell).unwrap();
        let index = Node::with_fields(Tag::Ident, c(), "v", vec![num("1")]);
        assert_eq!(ev.evaluate(&index).unwrap(), Value::dimensionless(99.0));
    }

    #[test]
    fn equation_binds_placeholder() {
        let mut ev = Evaluator::new();
        let placeholder = Node::leaf(Tag::Placeholder, Coordinate::new(2, 9), "");
        let eq = Node::binary(Tag::Eq, c(), num("7"), placeholder);
        let result = ev.evaluate(&eq).unwrap();
        assert_eq!(result, Value::dimensionless(1.0));
        let rep = ev.replacements().get(&Coordinate::new(2, 9)).unwrap();
        assert_eq!(rep.value, Some(Value::dimensionless(7.0)));
    }

    #[test]
    fn equation_strips_unit_from_placeholder_product() {
        let mut ev = Evaluator::new();
        let placeholder = Node::leaf(Tag::Placeholder, Coordinate::new(3, 1), "");
        let unit = Node::leaf(Tag::Dimension, c(), "m");
        let rhs = Node::binary(Tag::Mul, c(), placeholder, unit);
        let lhs = Node::binary(Tag::Mul, c(), num("5"), Node::leaf(Tag::Dimension, c(), "m"));
        let eq = Node::binary(Tag::Eq, c(), lhs, rhs);
        ev.evaluate(&eq).unwrap();
        let rep = ev.replacements().get(&Coordinate::new(3, 1)).unwrap();
        assert_eq!(rep.value, Some(Value::dimensionless(5.0)));
    }

    #[test]
    fn while_loop_accumulates_until_condition_fails() {
        let mut ev = Evaluator::new();
        ev.evaluate(&Node::binary(Tag::Set, c(), ident("i"), num("0"))).unwrap();
        let cond = Node::binary(Tag::Lt, c(), ident("i"), num("3"));
        let body = Node::binary(Tag::Set, c(), ident("i"), Node::binary(Tag::Add, c(), ident("i"), num("1")));
        let while_node = Node { tag: Tag::While, coord: c(), left: None, right: Some(Box::new(body)), cond: Some(Box::new(cond)), fields: vec![], label: String::new() };
        ev.evaluate(&while_node).unwrap();
        assert_eq!(ev.evaluate(&ident("i")).unwrap(), Value::dimensionless(3.0));
    }

    #[test]
    fn loop_iteration_cap_aborts_runaway_loop() {
        let mut ev = Evaluator::with_config(EvaluatorConfig { max_loop_iterations: Some(5) });
        let cond = num("1");
        let body = num("0");
        let while_node = Node { tag: Tag::While, coord: c(), left: None, right: Some(Box::new(body)), cond: Some(Box::new(cond)), fields: vec![], label: String::new() };
        assert!(matches!(ev.evaluate(&while_node), Err(RuntimeError::DomainError { .. })));
    }

    #[test]
    fn range_produces_inclusive_row_vector() {
        let mut ev = Evaluator::new();
        let range = Node { tag: Tag::Range, coord: c(), left: Some(Box::new(num("0"))), right: Some(Box::new(num("1"))), cond: Some(Box::new(num("0.5"))), fields: vec![], label: String::new() };
        let v = ev.evaluate(&range).unwrap();
        let m = v.as_matrix().unwrap();
        assert_eq!(m.rows[0], vec![Value::dimensionless(0.0), Value::dimensionless(0.5), Value::dimensionless(1.0)]);
    }

    #[test]
    fn graphic_materialises_points_into_replacement_registry() {
        let mut ev = Evaluator::new();
        let def_left = Node::with_fields(Tag::Func, c(), "f", vec![ident("x")]);
        let def = Node::binary(Tag::Set, c(), def_left, ident("x"));
        ev.evaluate(&def).unwrap();
        let range = Node { tag: Tag::Range, coord: c(), left: Some(Box::new(num("0"))), right: Some(Box::new(num("1"))), cond: Some(Box::new(num("0.5"))), fields: vec![], label: String::new() };
        let graphic = Node::with_fields(Tag::Graphic, Coordinate::new(4, 1), "f", vec![range]);
        ev.evaluate(&graphic).unwrap();
        let rep = ev.replacements().get(&Coordinate::new(4, 1)).unwrap();
        let matrix = rep.value.as_ref().unwrap().as_matrix().unwrap();
        assert_eq!(matrix.rows.len(), 3);
        assert_eq!(matrix.rows[1], vec![Value::dimensionless(0.5), Value::dimensionless(0.5)]);
    }

    #[test]
    fn graphic_strips_dimension_from_sampled_points() {
        let mut ev = Evaluator::new();
        let meters = Node::binary(Tag::Mul, c(), ident("x"), Node::leaf(Tag::Dimension, c(), "m"));
        let def_left = Node::with_fields(Tag::Func, c(), "f", vec![ident("x")]);
        let def = Node::binary(Tag::Set, c(), def_left, meters);
        ev.evaluate(&def).unwrap();
        let range = Node { tag: Tag::Range, coord: c(), left: Some(Box::new(num("0"))), right: Some(Box::new(num("1"))), cond: Some(Box::new(num("0.5"))), fields: vec![], label: String::new() };
        let graphic = Node::with_fields(Tag::Graphic, Coordinate::new(5, 1), "f", vec![range]);
        ev.evaluate(&graphic).unwrap();
        let rep = ev.replacements().get(&Coordinate::new(5, 1)).unwrap();
        let matrix = rep.value.as_ref().unwrap().as_matrix().unwrap();
        assert_eq!(matrix.rows[1], vec![Value::dimensionless(0.5), Value::dimensionless(0.5)]);
    }

    #[test]
    fn keyword_constant_and_unary_builtin() {
        let mut ev = Evaluator::new();
        let pi = Node::leaf(Tag::Keyword, c(), "\\pi");
        let pi_value = ev.evaluate(&pi).unwrap();
        assert_eq!(pi_value, Value::dimensionless(std::f64::consts::PI));

        let floor_call = Node::with_fields(Tag::Keyword, c(), "\\floor", vec![num("3.7")]);
        assert_eq!(ev.evaluate(&floor_call).unwrap(), Value::dimensionless(3.0));
    }

    #[test]
    fn unary_builtin_rejects_dimensional_argument() {
        let mut ev = Evaluator::new();
        let dimensional = Node::binary(Tag::Mul, c(), num("3"), Node::leaf(Tag::Dimension, c(), "m"));
        let sin_call = Node::with_fields(Tag::Keyword, c(), "\\sin", vec![dimensional]);
        assert!(matches!(ev.evaluate(&sin_call), Err(RuntimeError::UnitError { .. })));
    }

    #[test]
    fn dimension_leaf_sets_one_axis() {
        let mut ev = Evaluator::new();
        let v = ev.evaluate(&Node::leaf(Tag::Dimension, c(), "s")).unwrap();
        assert_eq!(v, Value::number(1.0, Dim::base(2)));
    }

    #[test]
    fn unknown_unit_is_a_runtime_unit_error() {
        let mut ev = Evaluator::new();
        assert!(matches!(ev.evaluate(&Node::leaf(Tag::Dimension, c(), "parsec")), Err(RuntimeError::UnitError { .. })));
    }

    #[test]
    fn beginc_picks_first_matching_case() {
        let mut ev = Evaluator::new();
        let branch1 = Node { tag: Tag::Root, coord: c(), left: None, right: Some(Box::new(num("1"))), cond: Some(Box::new(Node::binary(Tag::Eq, c(), num("0"), num("1")))), fields: vec![], label: String::new() };
        let branch2 = Node { tag: Tag::Root, coord: c(), left: None, right: Some(Box::new(num("2"))), cond: None, fields: vec![], label: String::new() };
        let beginc = Node::with_fields(Tag::Beginc, c(), "", vec![branch1, branch2]);
        assert_eq!(ev.evaluate(&beginc).unwrap(), Value::dimensionless(2.0));
    }

    #[test]
    fn transpose_swaps_matrix_shape() {
        let mut ev = Evaluator::new();
        let row = Node::with_fields(Tag::Beginb, c(), "", vec![num("1"), num("2")]);
        let matrix = Node::with_fields(Tag::Beginm, c(), "", vec![row]);
        let transp = Node { tag: Tag::Transp, coord: c(), left: Some(Box::new(matrix)), right: None, cond: None, fields: vec![], label: String::new() };
        let t = ev.evaluate(&transp).unwrap();
        let m = t.as_matrix().unwrap();
        assert_eq!(m.row_count(), 2);
        assert_eq!(m.col_count(), 1);
    }
}
