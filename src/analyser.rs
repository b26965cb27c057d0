//! Single-pass semantic analyser: a purely structural walk over the AST that
//! rejects dimensionally or type-inconsistent programs before evaluation.
//! Grounded on `Node::semantic_analysis`/`Node::have_dimensions`/
//! `Node::calculate_dimensions`/`Node::get_type` in the original `Value.h`.

use crate::ast::{Node, Tag};
use crate::core::dimension::Dim;
use crate::error::{AnalysisError, AnalysisResult};
use crate::registry::UNITS;

/// The "type of a subtree" predicate: `Function` if it contains a `FUNC`
/// invocation, `Matrix` if it contains an `IDENT` with index fields, else
/// `None` — first matching kind wins in left-to-right traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubtreeType {
    None,
    Matrix,
    Function,
}

fn subtree_type(node: &Node) -> SubtreeType {
    if node.tag == Tag::Func {
        return SubtreeType::Function;
    }
    if node.tag == Tag::Ident && !node.fields.is_empty() {
        return SubtreeType::Matrix;
    }
    if let Some(left) = &node.left {
        let t = subtree_type(left);
        if t != SubtreeType::None {
            return t;
        }
    }
    if let Some(right) = &node.right {
        let t = subtree_type(right);
        if t != SubtreeType::None {
            return t;
        }
    }
    for field in &node.fields {
        let t = subtree_type(field);
        if t != SubtreeType::None {
            return t;
        }
    }
    SubtreeType::None
}

/// Pure recursive aggregator: a `DIMENSION` leaf contributes `+1` on its
/// axis in a multiplicative position and `-1` under the right side of a
/// division; `MUL` propagates the ambient position to both children, `DIV`/
/// `FRAC` flip it for the right child; every other node just propagates.
fn accumulate(node: &Node, multiplicative: bool, sig: &mut Dim) {
    match node.tag {
        Tag::Dimension => {
            if let Some(&axis) = UNITS.get(node.label.as_str()) {
                sig.0[axis] += if multiplicative { 1 } else { -1 };
            }
        }
        Tag::Mul => {
            if let Some(l) = &node.left {
                accumulate(l, multiplicative, sig);
            }
            if let Some(r) = &node.right {
                accumulate(r, multiplicative, sig);
            }
        }
        Tag::Div | Tag::Frac => {
            if let Some(l) = &node.left {
                accumulate(l, multiplicative, sig);
            }
            if let Some(r) = &node.right {
                accumulate(r, !multiplicative, sig);
            }
        }
        _ => {
            if let Some(l) = &node.left {
                accumulate(l, multiplicative, sig);
            }
            if let Some(r) = &node.right {
                accumulate(r, multiplicative, sig);
            }
            if let Some(c) = &node.cond {
                accumulate(c, multiplicative, sig);
            }
            for field in &node.fields {
                accumulate(field, multiplicative, sig);
            }
        }
    }
}

fn dimension_signature(node: &Node) -> Dim {
    let mut sig = Dim::DIMENSIONLESS;
    accumulate(node, true, &mut sig);
    sig
}

fn require_equal_dims(node: &Node, op_name: &str) -> AnalysisResult<()> {
    let left = node.left.as_ref().expect("binary operator has a left child");
    let right = node.right.as_ref().expect("binary operator has a right child");
    let left_dim = dimension_signature(left);
    let right_dim = dimension_signature(right);
    if left_dim != right_dim {
        return Err(AnalysisError::UnitError {
            coord: node.coord,
            reason: format!("{op_name} of different dimensions"),
        });
    }
    Ok(())
}

fn require_no_function_operand(node: &Node, op_name: &str) -> AnalysisResult<()> {
    let left_is_fn = node.left.as_ref().map(|l| subtree_type(l) == SubtreeType::Function).unwrap_or(false);
    let right_is_fn = node.right.as_ref().map(|r| subtree_type(r) == SubtreeType::Function).unwrap_or(false);
    if left_is_fn || right_is_fn {
        return Err(AnalysisError::TypeError {
            coord: node.coord,
            reason: format!("function operand to {op_name}"),
        });
    }
    Ok(())
}

/// Runs the analyser on a whole program (or statement) tree, returning the
/// first violation encountered.
pub fn analyse(root: &Node) -> AnalysisResult<()> {
    analyse_node(root)
}

fn analyse_node(node: &Node) -> AnalysisResult<()> {
    match node.tag {
        Tag::Sum | Tag::Product => {
            if let Some(coord) = node.first_dimension_coord() {
                let reason = if node.tag == Tag::Product {
                    "element of product is not allowed to be dimensional"
                } else {
                    "lower or higher bound of sum is not allowed to be dimensional"
                };
                return Err(AnalysisError::UnitError { coord, reason: reason.to_string() });
            }
        }
        Tag::Dimension => {
            if !UNITS.contains_key(node.label.as_str()) {
                return Err(AnalysisError::UnitError { coord: node.coord, reason: "this unit is not basic".to_string() });
            }
        }
        Tag::Pow => {
            if let Some(right) = &node.right {
                if let Some(coord) = right.first_dimension_coord() {
                    return Err(AnalysisError::UnitError {
                        coord,
                        reason: "power of a dimensional number is not defined".to_string(),
                    });
                }
            }
        }
        Tag::Add => {
            require_no_function_operand(node, "addition")?;
            require_equal_dims(node, "addition")?;
        }
        Tag::Sub => {
            require_no_function_operand(node, "subtraction")?;
            require_equal_dims(node, "subtraction")?;
        }
        Tag::Lt | Tag::Leq | Tag::Geq | Tag::Gt | Tag::Eq | Tag::Neq => {
            require_equal_dims(node, "comparison")?;
        }
        Tag::Mul => {
            require_no_function_operand(node, "multiplication")?;
        }
        Tag::Div | Tag::Frac => {
            require_no_function_operand(node, "division")?;
            let right_is_matrix = node.right.as_ref().map(|r| subtree_type(r) == SubtreeType::Matrix).unwrap_or(false);
            if right_is_matrix {
                return Err(AnalysisError::TypeError { coord: node.coord, reason: "division by a matrix".to_string() });
            }
        }
        Tag::Usub => {
            if node.right.as_ref().map(|r| subtree_type(r) == SubtreeType::Function).unwrap_or(false) {
                return Err(AnalysisError::TypeError { coord: node.coord, reason: "unary minus of a function".to_string() });
            }
        }
        _ => {}
    }

    if let Some(left) = &node.left {
        analyse_node(left)?;
    }
    if let Some(right) = &node.right {
        analyse_node(right)?;
    }
    if let Some(cond) = &node.cond {
        analyse_node(cond)?;
    }
    for field in &node.fields {
        analyse_node(field)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Coordinate;

    fn c() -> Coordinate {
        Coordinate::new(1, 1)
    }

    fn dim_leaf(unit: &str) -> Node {
        Node::leaf(Tag::Dimension, c(), unit)
    }

    fn num_leaf() -> Node {
        Node::leaf(Tag::Number, c(), "3")
    }

    #[test]
    fn unknown_unit_is_rejected() {
        let node = dim_leaf("parsec");
        assert!(matches!(analyse(&node), Err(AnalysisError::UnitError { .. })));
    }

    #[test]
    fn known_unit_is_accepted() {
        let node = dim_leaf("m");
        assert!(analyse(&node).is_ok());
    }

    #[test]
    fn addition_of_matching_dimensions_is_accepted() {
        // (3 * m) + (4 * m)
        let left = Node::binary(Tag::Mul, c(), num_leaf(), dim_leaf("m"));
        let right = Node::binary(Tag::Mul, c(), num_leaf(), dim_leaf("m"));
        let add = Node::binary(Tag::Add, c(), left, right);
        assert!(analyse(&add).is_ok());
    }

    #[test]
    fn addition_of_different_dimensions_is_rejected() {
        // (3 * m) + (2 * s)
        let left = Node::binary(Tag::Mul, c(), num_leaf(), dim_leaf("m"));
        let right = Node::binary(Tag::Mul, c(), num_leaf(), dim_leaf("s"));
        let add = Node::binary(Tag::Add, c(), left, right);
        assert!(matches!(analyse(&add), Err(AnalysisError::UnitError { .. })));
    }

    #[test]
    fn sum_with_dimensional_bound_is_rejected() {
        let bound = Node::binary(Tag::Mul, c(), num_leaf(), dim_leaf("m"));
        let sum = Node {
            tag: Tag::Sum,
            coord: c(),
            left: Some(Box::new(bound)),
            right: Some(Box::new(num_leaf())),
            cond: None,
            fields: vec![],
            label: "i".to_string(),
        };
        assert!(matches!(analyse(&sum), Err(AnalysisError::UnitError { .. })));
    }

    #[test]
    fn power_with_dimensional_exponent_is_rejected() {
        let exponent = dim_leaf("m");
        let pow = Node::binary(Tag::Pow, c(), num_leaf(), exponent);
        assert!(matches!(analyse(&pow), Err(AnalysisError::UnitError { .. })));
    }

    #[test]
    fn division_by_matrix_is_rejected() {
        let matrix_ident = Node::with_fields(Tag::Ident, c(), "M", vec![num_leaf()]);
        let div = Node::binary(Tag::Div, c(), num_leaf(), matrix_ident);
        assert!(matches!(analyse(&div), Err(AnalysisError::TypeError { .. })));
    }

    #[test]
    fn function_operand_to_addition_is_rejected() {
        let call = Node::with_fields(Tag::Func, c(), "f", vec![num_leaf()]);
        let add = Node::binary(Tag::Add, c(), call, num_leaf());
        assert!(matches!(analyse(&add), Err(AnalysisError::TypeError { .. })));
    }

    #[test]
    fn recurses_into_nested_expressions() {
        // (3 * m + 2 * s) * 1 -- the unit violation is nested under MUL, not
        // at the root, and must still be found.
        let left = Node::binary(Tag::Mul, c(), num_leaf(), dim_leaf("m"));
        let right = Node::binary(Tag::Mul, c(), num_leaf(), dim_leaf("s"));
        let inner_add = Node::binary(Tag::Add, c(), left, right);
        let outer = Node::binary(Tag::Mul, c(), inner_add, num_leaf());
        assert!(matches!(analyse(&outer), Err(AnalysisError::UnitError { .. })));
    }
}
