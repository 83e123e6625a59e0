//! Tree Printer - ASCII rendering of syntax trees
//!
//! One line per node. The root has no prefix; a node at depth `d` is prefixed with
//! `d - 1` copies of `"│  "` followed by `"├─ "`. Children of structured nodes carry a
//! label naming their role:
//!
//! ```text
//! IF
//! ├─ Condition: ID(x)
//! ├─ Then: ASSIGN(y)
//! │  ├─ Expression: NUMBER(1)
//! ├─ Else: ASSIGN(y)
//! │  ├─ Expression: NUMBER(2)
//! ```

use crate::frontend::ast::{Node, NodeKind};
use crate::frontend::semantic::TypeMap;

/// Render a tree. A missing tree renders as the empty string.
pub fn render(ast: Option<&Node>) -> String {
    TreePrinter::new(None).print(ast)
}

/// Render a tree with each node's inferred type appended, e.g. `ID(x) : NUMBER`.
/// Nodes analysis never reached are shown without a type.
pub fn render_typed(ast: Option<&Node>, types: &TypeMap) -> String {
    TreePrinter::new(Some(types)).print(ast)
}

/// Short tag for a node's own line
pub fn node_tag(node: &Node) -> String {
    match &node.kind {
        NodeKind::Identifier { name } => format!("ID({})", name),
        NodeKind::NumberLiteral { raw } => format!("NUMBER({})", raw),
        NodeKind::FloatLiteral { raw } => format!("FLOAT({})", raw),
        NodeKind::StringLiteral { raw } => format!("STRING({})", raw),
        NodeKind::CharLiteral { raw } => format!("CHAR({})", raw),
        NodeKind::BinOp { op, .. } => format!("BINOP({})", op),
        NodeKind::Assignment { identifier, .. } => format!("ASSIGN({})", identifier),
        NodeKind::If { .. } => "IF".to_string(),
    }
}

struct TreePrinter<'t> {
    output: String,
    types: Option<&'t TypeMap>,
}

impl<'t> TreePrinter<'t> {
    fn new(types: Option<&'t TypeMap>) -> Self {
        Self { output: String::new(), types }
    }

    fn print(mut self, ast: Option<&Node>) -> String {
        if let Some(root) = ast {
            self.print_node(root, 0, None);
        }
        self.output
    }

    fn print_node(&mut self, node: &Node, depth: usize, label: Option<&str>) {
        if depth > 0 {
            for _ in 1..depth {
                self.output.push_str("│  ");
            }
            self.output.push_str("├─ ");
        }
        if let Some(label) = label {
            self.output.push_str(label);
            self.output.push_str(": ");
        }
        self.output.push_str(&node_tag(node));
        if let Some(ty) = self.types.and_then(|types| types.type_of(node)) {
            self.output.push_str(" : ");
            self.output.push_str(ty.as_str());
        }
        self.output.push('\n');

        match &node.kind {
            NodeKind::If { condition, then_branch, else_branch } => {
                self.print_node(condition, depth + 1, Some("Condition"));
                self.print_node(then_branch, depth + 1, Some("Then"));
                self.print_node(else_branch, depth + 1, Some("Else"));
            }
            NodeKind::Assignment { expr, .. } => {
                self.print_node(expr, depth + 1, Some("Expression"));
            }
            NodeKind::BinOp { left, right, .. } => {
                self.print_node(left, depth + 1, Some("Left"));
                self.print_node(right, depth + 1, Some("Right"));
            }
            NodeKind::Identifier { .. }
            | NodeKind::NumberLiteral { .. }
            | NodeKind::FloatLiteral { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::CharLiteral { .. } => {}
        }
    }
}
