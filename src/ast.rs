//! AST node shapes consumed from the (external) lexer/parser.
//!
//! The parser that builds these trees is out of scope for this crate; this
//! module owns the type definitions because the analyser and evaluator are
//! typed against them.

use serde::{Deserialize, Serialize};

/// One-based source position, attached to every node and carried into every
/// error and replacement key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub line: u32,
    pub column: u32,
}

impl Coordinate {
    pub fn new(line: u32, column: u32) -> Self {
        Coordinate { line, column }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Number,
    Ident,
    Func,
    Uadd,
    Usub,
    Not,
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Frac,
    Pow,
    Eq,
    Neq,
    Leq,
    Geq,
    Lt,
    Gt,
    And,
    Or,
    Abs,
    Root,
    Beginb,
    Beginm,
    Beginc,
    If,
    While,
    Sum,
    Product,
    Transp,
    Range,
    Graphic,
    Keyword,
    Dimension,
    Placeholder,
    Lparen,
}

/// An AST node: tag, source coordinate, up to three named children, an
/// ordered `fields` list for variadic shapes, and a label for leaf text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub tag: Tag,
    pub coord: Coordinate,
    pub left: Option<Box<Node>>,
    pub right: Option<Box<Node>>,
    pub cond: Option<Box<Node>>,
    pub fields: Vec<Node>,
    pub label: String,
}

impl Node {
    pub fn leaf(tag: Tag, coord: Coordinate, label: impl Into<String>) -> Self {
        Node {
            tag,
            coord,
            left: None,
            right: None,
            cond: None,
            fields: Vec::new(),
            label: label.into(),
        }
    }

    pub fn unary(tag: Tag, coord: Coordinate, right: Node) -> Self {
        Node {
            tag,
            coord,
            left: None,
            right: Some(Box::new(right)),
            cond: None,
            fields: Vec::new(),
            label: String::new(),
        }
    }

    pub fn binary(tag: Tag, coord: Coordinate, left: Node, right: Node) -> Self {
        Node {
            tag,
            coord,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
            cond: None,
            fields: Vec::new(),
            label: String::new(),
        }
    }

    pub fn with_fields(tag: Tag, coord: Coordinate, label: impl Into<String>, fields: Vec<Node>) -> Self {
        Node {
            tag,
            coord,
            left: None,
            right: None,
            cond: None,
            fields,
            label: label.into(),
        }
    }

    /// `DIMENSION` descendants anywhere under this node (depth-first,
    /// left-to-right), used by the analyser's bound checks.
    pub fn has_dimension(&self) -> bool {
        self.first_dimension_coord().is_some()
    }

    pub fn first_dimension_coord(&self) -> Option<Coordinate> {
        if self.tag == Tag::Dimension {
            return Some(self.coord);
        }
        if let Some(l) = &self.left {
            if let Some(c) = l.first_dimension_coord() {
                return Some(c);
            }
        }
        if let Some(r) = &self.right {
            if let Some(c) = r.first_dimension_coord() {
                return Some(c);
            }
        }
        if let Some(c) = &self.cond {
            if let Some(c) = c.first_dimension_coord() {
                return Some(c);
            }
        }
        for field in &self.fields {
            if let Some(c) = field.first_dimension_coord() {
                return Some(c);
            }
        }
        None
    }
}
