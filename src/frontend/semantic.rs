//! Semantic Analysis for the conditional command language
//!
//! Performs:
//! - Identifier resolution against a scoped symbol table
//! - Type inference and checking for assignments, arithmetic and conditions
//!
//! Every `analyze` call works on a fresh symbol table (seeded with the analyzer's
//! globals), so one analyzer can be shared between threads.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::frontend::ast::{Node, NodeId, NodeKind};
use crate::frontend::symbols::{Symbol, SymbolTable};
use crate::utils::Error;

// ==================== Types ====================

/// Type assigned to a node by analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SemanticType {
    Number,
    Float,
    String,
    Char,
    /// Sentinel for nodes whose type could not be determined, and for if-statements,
    /// which have no value
    Error,
}

impl SemanticType {
    /// Integer or float
    pub fn is_numeric(&self) -> bool {
        matches!(self, SemanticType::Number | SemanticType::Float)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SemanticType::Error)
    }

    /// Parse a declarable type name (`number`, `float`, `string`, `char`), case-insensitive
    pub fn from_name(name: &str) -> Option<SemanticType> {
        match name.to_ascii_lowercase().as_str() {
            "number" => Some(SemanticType::Number),
            "float" => Some(SemanticType::Float),
            "string" => Some(SemanticType::String),
            "char" => Some(SemanticType::Char),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Number => "NUMBER",
            SemanticType::Float => "FLOAT",
            SemanticType::String => "STRING",
            SemanticType::Char => "CHAR",
            SemanticType::Error => "ERROR",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inferred types keyed by node id. Each node is typed at most once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeMap {
    types: BTreeMap<NodeId, SemanticType>,
}

impl TypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> Option<SemanticType> {
        self.types.get(&id).copied()
    }

    /// Type of `node`, or `None` if analysis never reached it
    pub fn type_of(&self, node: &Node) -> Option<SemanticType> {
        self.get(node.id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, SemanticType)> + '_ {
        self.types.iter().map(|(id, ty)| (*id, *ty))
    }

    fn record(&mut self, id: NodeId, ty: SemanticType) {
        let previous = self.types.insert(id, ty);
        debug_assert!(previous.is_none(), "node {:?} typed twice", id);
    }
}

/// Result of analysing one tree
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub errors: Vec<Error>,
    pub types: TypeMap,
}

// ==================== Semantic Analyzer ====================

/// Semantic analyzer
#[derive(Debug, Clone, Default)]
pub struct SemanticAnalyzer {
    /// Symbols pre-declared in the global scope of every analysis
    globals: Vec<Symbol>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzer whose global scope starts out with `globals`
    pub fn with_globals(globals: Vec<Symbol>) -> Self {
        Self { globals }
    }

    pub fn globals(&self) -> &[Symbol] {
        &self.globals
    }

    /// Analyze a tree. A missing tree yields no errors and no types.
    pub fn analyze(&self, ast: Option<&Node>) -> Analysis {
        let mut checker = Checker::new(&self.globals);
        if let Some(root) = ast {
            checker.check(root);
        }
        debug!(
            "semantic analysis typed {} node(s), found {} error(s)",
            checker.types.len(),
            checker.errors.len()
        );
        Analysis {
            errors: checker.errors,
            types: checker.types,
        }
    }
}

/// Per-call analysis state
struct Checker {
    symbols: SymbolTable,
    errors: Vec<Error>,
    types: TypeMap,
}

impl Checker {
    fn new(globals: &[Symbol]) -> Self {
        let mut symbols = SymbolTable::new();
        for symbol in globals {
            if !symbols.declare(symbol.clone()) {
                debug!("ignoring duplicate global '{}'", symbol.name);
            }
        }
        Self {
            symbols,
            errors: Vec::new(),
            types: TypeMap::new(),
        }
    }

    /// Check a node, record its type and return it
    fn check(&mut self, node: &Node) -> SemanticType {
        let ty = match &node.kind {
            NodeKind::NumberLiteral { .. } => SemanticType::Number,
            NodeKind::FloatLiteral { .. } => SemanticType::Float,
            NodeKind::StringLiteral { .. } => SemanticType::String,
            NodeKind::CharLiteral { .. } => SemanticType::Char,
            NodeKind::Identifier { name } => match self.symbols.lookup(name) {
                Some(symbol) => symbol.declared_type,
                None => {
                    self.errors.push(Error::UndeclaredIdentifier {
                        name: name.clone(),
                        pos: node.pos,
                    });
                    SemanticType::Error
                }
            },
            NodeKind::Assignment { identifier, expr } => self.check_assignment(node, identifier, expr),
            NodeKind::BinOp { op, left, right } => {
                let left_ty = self.check(left);
                let right_ty = self.check(right);
                if left_ty == right_ty && left_ty.is_numeric() {
                    left_ty
                } else {
                    self.errors.push(Error::IncompatibleTypes {
                        left: left_ty,
                        right: right_ty,
                        op: op.symbol().to_string(),
                        pos: node.pos,
                    });
                    SemanticType::Error
                }
            }
            NodeKind::If { condition, then_branch, else_branch } => {
                let cond_ty = self.check(condition);
                if !cond_ty.is_numeric() {
                    self.errors.push(Error::NonNumericCondition { ty: cond_ty, pos: node.pos });
                }

                // Branches get separate scopes and cannot see each other
                self.symbols.enter_scope();
                self.check(then_branch);
                self.symbols.exit_scope();

                self.symbols.enter_scope();
                self.check(else_branch);
                self.symbols.exit_scope();

                SemanticType::Error
            }
        };

        self.types.record(node.id, ty);
        ty
    }

    fn check_assignment(&mut self, node: &Node, identifier: &str, expr: &Node) -> SemanticType {
        let Some(declared) = self.symbols.lookup(identifier).map(|s| s.declared_type) else {
            // The right-hand side is left unchecked when the target is unknown
            self.errors.push(Error::UndeclaredVariable {
                name: identifier.to_string(),
                pos: node.pos,
            });
            return SemanticType::Error;
        };

        let actual = self.check(expr);
        if actual != declared {
            self.errors.push(Error::TypeMismatch {
                name: identifier.to_string(),
                expected: declared,
                got: actual,
                pos: node.pos,
            });
        }
        declared
    }
}

/// Analyze `ast` against an empty global scope
pub fn analyze(ast: Option<&Node>) -> Analysis {
    SemanticAnalyzer::new().analyze(ast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::BinaryOp;
    use crate::frontend::lexer::tokenize;
    use crate::frontend::parser::parse_tokens;
    use crate::utils::Position;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Node {
        let outcome = parse_tokens(tokenize(source).unwrap());
        assert!(outcome.errors.is_empty(), "syntax errors: {:?}", outcome.errors);
        outcome.ast.unwrap()
    }

    fn messages(analysis: &Analysis) -> Vec<String> {
        analysis.errors.iter().map(|e| e.to_string()).collect()
    }

    fn global(name: &str, ty: SemanticType) -> Symbol {
        Symbol::new(name, ty, Position::start())
    }

    fn leaf(id: u32, line: usize, column: usize, kind: NodeKind) -> Box<Node> {
        Box::new(Node::new(NodeId(id), Position::new(line, column), kind))
    }

    #[test]
    fn test_assignment_to_undeclared() {
        let ast = parse("x = 42");
        let analysis = analyze(Some(&ast));
        assert_eq!(
            messages(&analysis),
            vec!["Semantic error [line 1, column 1]: undeclared variable 'x'"]
        );
        assert_eq!(analysis.types.type_of(&ast), Some(SemanticType::Error));
    }

    #[test]
    fn test_undeclared_target_skips_right_hand_side() {
        // `y` and the string/number mix on the right are never visited
        let ast = parse("x = y + \"s\"");
        let analysis = analyze(Some(&ast));
        assert_eq!(analysis.errors.len(), 1);
        assert!(matches!(analysis.errors[0], Error::UndeclaredVariable { .. }));
        assert_eq!(analysis.types.len(), 1);
    }

    #[test]
    fn test_undeclared_identifier_in_expression() {
        // y + 1, built by hand
        let ast = Node::new(
            NodeId(2),
            Position::new(2, 5),
            NodeKind::BinOp {
                op: BinaryOp::Add,
                left: leaf(0, 2, 3, NodeKind::Identifier { name: "y".to_string() }),
                right: leaf(1, 2, 7, NodeKind::NumberLiteral { raw: "1".to_string() }),
            },
        );
        let analysis = analyze(Some(&ast));
        let errors = messages(&analysis);
        assert!(errors.iter().any(|e| e.contains("undeclared identifier 'y'")), "{errors:?}");
        // The error operand also makes the operator fail
        assert!(errors.iter().any(|e| e.contains("incompatible types ERROR and NUMBER")), "{errors:?}");
    }

    #[test]
    fn test_binop_type_mismatch() {
        let ast = Node::new(
            NodeId(2),
            Position::new(3, 4),
            NodeKind::BinOp {
                op: BinaryOp::Add,
                left: leaf(0, 3, 2, NodeKind::NumberLiteral { raw: "1".to_string() }),
                right: leaf(1, 3, 6, NodeKind::StringLiteral { raw: "two".to_string() }),
            },
        );
        let analysis = analyze(Some(&ast));
        assert_eq!(
            messages(&analysis),
            vec!["Semantic error [line 3, column 4]: incompatible types NUMBER and STRING for operator '+'"]
        );
        assert_eq!(analysis.types.type_of(&ast), Some(SemanticType::Error));
    }

    #[test]
    fn test_mixed_numeric_types_are_incompatible() {
        let analysis = SemanticAnalyzer::with_globals(vec![global("x", SemanticType::Float)])
            .analyze(Some(&parse("x = 1 + 2.0")));
        let errors = messages(&analysis);
        assert!(errors[0].contains("incompatible types NUMBER and FLOAT for operator '+'"));
        assert!(errors[1].contains("type mismatch on 'x' - expected FLOAT but got ERROR"));
    }

    #[test]
    fn test_homogeneous_float_arithmetic() {
        let ast = parse("z = 2.5 * 4.0");
        let analyzer = SemanticAnalyzer::with_globals(vec![global("z", SemanticType::Float)]);
        let analysis = analyzer.analyze(Some(&ast));
        assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);

        let NodeKind::Assignment { expr, .. } = &ast.kind else {
            panic!("expected assignment, got {:?}", ast.kind);
        };
        assert_eq!(analysis.types.type_of(expr), Some(SemanticType::Float));
    }

    #[test]
    fn test_assignment_type_mismatch_keeps_declared_type() {
        let ast = parse("x = \"hello\"");
        let analysis = SemanticAnalyzer::with_globals(vec![global("x", SemanticType::Number)])
            .analyze(Some(&ast));
        assert_eq!(
            messages(&analysis),
            vec!["Semantic error [line 1, column 1]: type mismatch on 'x' - expected NUMBER but got STRING"]
        );
        assert_eq!(analysis.types.type_of(&ast), Some(SemanticType::Number));
    }

    #[test]
    fn test_non_numeric_condition() {
        let ast = parse("if(\"no\") x=1 else x=2");
        let analysis = SemanticAnalyzer::with_globals(vec![global("x", SemanticType::Number)])
            .analyze(Some(&ast));
        assert_eq!(
            messages(&analysis),
            vec!["Semantic error [line 1, column 1]: non-numeric if condition of type STRING"]
        );
    }

    #[test]
    fn test_if_branches_are_visited_with_scopes() {
        let ast = parse("if(x) y = 1 else y = 'c'");
        let globals = vec![global("x", SemanticType::Number), global("y", SemanticType::Number)];
        let analysis = SemanticAnalyzer::with_globals(globals).analyze(Some(&ast));
        assert_eq!(analysis.errors.len(), 1);
        assert!(messages(&analysis)[0].contains("expected NUMBER but got CHAR"));
        assert_eq!(analysis.types.type_of(&ast), Some(SemanticType::Error));
    }

    #[test]
    fn test_declared_program_is_fully_typed() {
        let ast = parse("if (a - 1) b = (a + 2) * 3 else if (c) b = a / 4 else d = 'q'");
        let globals = vec![
            global("a", SemanticType::Number),
            global("b", SemanticType::Number),
            global("c", SemanticType::Float),
            global("d", SemanticType::Char),
        ];
        let analysis = SemanticAnalyzer::with_globals(globals).analyze(Some(&ast));
        assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);

        let mut untyped = Vec::new();
        ast.walk(&mut |node| {
            let ty = analysis.types.type_of(node);
            let is_if = matches!(node.kind, NodeKind::If { .. });
            if ty.is_none() || (!is_if && ty == Some(SemanticType::Error)) {
                untyped.push(node.id);
            }
        });
        assert!(untyped.is_empty(), "untyped nodes: {untyped:?}");
        assert_eq!(analysis.types.len(), ast.count());
    }

    #[test]
    fn test_missing_tree() {
        let analysis = analyze(None);
        assert!(analysis.errors.is_empty());
        assert!(analysis.types.is_empty());
    }

    #[test]
    fn test_analysis_does_not_leak_between_calls() {
        let ast = parse("a = 1");
        let analyzer = SemanticAnalyzer::new();
        let first = messages(&analyzer.analyze(Some(&ast)));
        let second = messages(&analyzer.analyze(Some(&ast)));
        assert_eq!(first, second);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(SemanticType::from_name("Number"), Some(SemanticType::Number));
        assert_eq!(SemanticType::from_name("char"), Some(SemanticType::Char));
        assert_eq!(SemanticType::from_name("error"), None);
        assert_eq!(SemanticType::from_name("int"), None);
    }
}
