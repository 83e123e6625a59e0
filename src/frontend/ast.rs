//! Abstract Syntax Tree definitions for the conditional command language
//!
//! Nodes are purely syntactic. Inferred types live in a side table keyed by [`NodeId`]
//! (see `frontend::semantic::TypeMap`), so a tree never changes after parsing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::Position;

/// Identity of a node within one parse. Ids are assigned in creation order starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// A syntax tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub pos: Position,
    pub kind: NodeKind,
}

/// Node variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node")]
pub enum NodeKind {
    /// name = expr
    Assignment {
        identifier: String,
        expr: Box<Node>,
    },
    /// left op right
    BinOp {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// if (condition) then_branch else else_branch
    If {
        condition: Box<Node>,
        then_branch: Box<Node>,
        else_branch: Box<Node>,
    },
    Identifier { name: String },
    NumberLiteral { raw: String },
    FloatLiteral { raw: String },
    /// Content between the quotes, escapes undecoded
    StringLiteral { raw: String },
    CharLiteral { raw: String },
}

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Node {
    pub fn new(id: NodeId, pos: Position, kind: NodeKind) -> Self {
        Self { id, pos, kind }
    }

    /// Direct children in source order
    pub fn children(&self) -> Vec<&Node> {
        match &self.kind {
            NodeKind::Assignment { expr, .. } => vec![expr.as_ref()],
            NodeKind::BinOp { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            NodeKind::If { condition, then_branch, else_branch } => {
                vec![condition.as_ref(), then_branch.as_ref(), else_branch.as_ref()]
            }
            NodeKind::Identifier { .. }
            | NodeKind::NumberLiteral { .. }
            | NodeKind::FloatLiteral { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::CharLiteral { .. } => Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including `self`
    pub fn count(&self) -> usize {
        1 + self.children().into_iter().map(Node::count).sum::<usize>()
    }

    /// Pre-order walk over the subtree
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Structural equality that ignores ids and positions
    pub fn same_shape(&self, other: &Node) -> bool {
        let own = self.children();
        let theirs = other.children();
        let same_head = match (&self.kind, &other.kind) {
            (NodeKind::Assignment { identifier: a, .. }, NodeKind::Assignment { identifier: b, .. }) => a == b,
            (NodeKind::BinOp { op: a, .. }, NodeKind::BinOp { op: b, .. }) => a == b,
            (NodeKind::If { .. }, NodeKind::If { .. }) => true,
            (NodeKind::Identifier { name: a }, NodeKind::Identifier { name: b }) => a == b,
            (NodeKind::NumberLiteral { raw: a }, NodeKind::NumberLiteral { raw: b })
            | (NodeKind::FloatLiteral { raw: a }, NodeKind::FloatLiteral { raw: b })
            | (NodeKind::StringLiteral { raw: a }, NodeKind::StringLiteral { raw: b })
            | (NodeKind::CharLiteral { raw: a }, NodeKind::CharLiteral { raw: b }) => a == b,
            _ => false,
        };
        same_head
            && own.len() == theirs.len()
            && own.iter().zip(theirs.iter()).all(|(a, b)| a.same_shape(b))
    }
}
