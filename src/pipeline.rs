//! Pipeline - lexer, parser and semantic analysis behind a single call
//!
//! A lexical error stops the run before parsing. Otherwise the parser always runs,
//! semantic analysis runs on whatever tree it produced, and errors are reported in
//! stage order. FIRST/FOLLOW sets are attached to every response.

use log::{debug, error, warn};
use serde::Serialize;

use crate::feedback::Diagnostic;
use crate::frontend::ast::Node;
use crate::frontend::lexer::Lexer;
use crate::frontend::parser::Parser;
use crate::frontend::semantic::{SemanticAnalyzer, TypeMap};
use crate::frontend::symbols::Symbol;
use crate::grammar::{FirstFollow, SymbolSets};

/// Everything one run produces
#[derive(Debug, Clone, Serialize)]
pub struct ParserResponse {
    pub ast: Option<Node>,
    /// Error messages in stage order; a lexical error is prefixed with "Lexical error: "
    pub errors: Vec<String>,
    /// The same errors in structured form
    pub diagnostics: Vec<Diagnostic>,
    pub first_sets: SymbolSets,
    pub follow_sets: SymbolSets,
    /// Inferred type of each analysed node
    pub types: TypeMap,
    /// Number of tokens lexed, including EOF; 0 after a lexical error
    pub token_count: usize,
}

impl ParserResponse {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Reusable pipeline. Each `run` works on fresh lexer, parser and checker state.
#[derive(Debug, Clone)]
pub struct Pipeline {
    analyzer: SemanticAnalyzer,
    sets: &'static FirstFollow,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_globals(Vec::new())
    }

    /// Pipeline whose semantic analysis starts with `globals` declared
    pub fn with_globals(globals: Vec<Symbol>) -> Self {
        Self {
            analyzer: SemanticAnalyzer::with_globals(globals),
            sets: FirstFollow::shared(),
        }
    }

    pub fn sets(&self) -> &'static FirstFollow {
        self.sets
    }

    pub fn run(&self, input: &str) -> ParserResponse {
        let first_sets = self.sets.first_sets().clone();
        let follow_sets = self.sets.follow_sets().clone();

        let tokens = match Lexer::new(input).tokenize() {
            Ok(tokens) => tokens,
            Err(err) => {
                error!("lexing failed: {}", err);
                return ParserResponse {
                    ast: None,
                    errors: vec![format!("Lexical error: {}", err)],
                    diagnostics: vec![Diagnostic::from_error(&err)],
                    first_sets,
                    follow_sets,
                    types: TypeMap::new(),
                    token_count: 0,
                };
            }
        };
        let token_count = tokens.len();
        debug!("lexed {} token(s)", token_count);

        let outcome = Parser::new(tokens).parse();
        match &outcome.ast {
            Some(ast) => debug!("parsed tree with {} node(s)", ast.count()),
            None => debug!("no tree after syntax recovery"),
        }

        let analysis = self.analyzer.analyze(outcome.ast.as_ref());

        let all_errors: Vec<_> = outcome.errors.iter().chain(analysis.errors.iter()).collect();
        for err in &all_errors {
            warn!("{}", err);
        }

        ParserResponse {
            ast: outcome.ast,
            errors: all_errors.iter().map(|e| e.to_string()).collect(),
            diagnostics: all_errors.iter().map(|e| Diagnostic::from_error(e)).collect(),
            first_sets,
            follow_sets,
            types: analysis.types,
            token_count,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the full pipeline on `input` with an empty global scope
pub fn parse(input: &str) -> ParserResponse {
    Pipeline::new().run(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::semantic::SemanticType;
    use crate::utils::{Position, Stage};
    use pretty_assertions::assert_eq;

    fn declare(name: &str, ty: SemanticType) -> Symbol {
        Symbol::new(name, ty, Position::start())
    }

    #[test]
    fn test_lexical_error_short_circuits() {
        let response = parse("x = 1 @ 2");
        assert!(response.ast.is_none());
        assert_eq!(response.errors, vec!["Lexical error: Invalid character '@' at 1:7"]);
        assert_eq!(response.token_count, 0);
        assert!(response.types.is_empty());
        assert_eq!(response.first_sets.len(), 4);
        assert_eq!(response.follow_sets.len(), 4);
    }

    #[test]
    fn test_syntax_errors_precede_semantic_errors() {
        let response = parse("x = 1 y");
        assert!(response.ast.is_some());
        let stages: Vec<Stage> = response.diagnostics.iter().map(|d| d.stage).collect();
        assert_eq!(stages, vec![Stage::Syntax, Stage::Semantic]);
        assert!(response.errors[0].contains("expected 'EOF' but found 'ID'"));
        assert!(response.errors[1].contains("undeclared variable 'x'"));
    }

    #[test]
    fn test_clean_run_with_globals() {
        let pipeline = Pipeline::with_globals(vec![
            declare("x", SemanticType::Number),
            declare("ratio", SemanticType::Float),
        ]);
        let response = pipeline.run("if (x) ratio = 1.5 * ratio else x = x + 1");
        assert!(response.is_success(), "{:?}", response.errors);
        assert!(response.diagnostics.is_empty());

        let ast = response.ast.as_ref().unwrap();
        assert_eq!(response.types.len(), ast.count());
        assert_eq!(response.types.type_of(ast), Some(SemanticType::Error));
    }

    #[test]
    fn test_no_tree_means_no_semantic_errors() {
        let response = parse("if (a b = 1 else b = 2");
        assert!(response.ast.is_none());
        assert!(response.diagnostics.iter().all(|d| d.stage == Stage::Syntax));
        assert!(response.types.is_empty());
    }

    #[test]
    fn test_pipeline_is_reusable() {
        let pipeline = Pipeline::new();
        let first = pipeline.run("a = b + 'c'");
        let second = pipeline.run("a = b + 'c'");
        assert_eq!(first.errors, second.errors);
        assert_eq!(first.ast, second.ast);
        assert_eq!(first.types, second.types);
    }

    #[test]
    fn test_pipeline_is_shareable_across_threads() {
        let pipeline = Pipeline::with_globals(vec![declare("n", SemanticType::Number)]);
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let pipeline = &pipeline;
                    scope.spawn(move || pipeline.run(&format!("n = n * {}", i)))
                })
                .collect();
            for handle in handles {
                let response = handle.join().unwrap();
                assert!(response.is_success(), "{:?}", response.errors);
            }
        });
    }
}
