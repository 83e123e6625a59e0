//! Structured Feedback
//!
//! Machine-readable form of a pipeline run:
//! - one [`Diagnostic`] per error with code, stage, position and an optional hint
//! - a [`Report`] bundling the tree, diagnostics, statistics and FIRST/FOLLOW sets

use serde::{Deserialize, Serialize};

use crate::frontend::ast::Node;
use crate::grammar::SymbolSets;
use crate::pipeline::ParserResponse;
use crate::utils::{Error, Stage};

// ==================== Diagnostics ====================

/// A single error in structured form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable error code (e.g. "E0201")
    pub code: String,
    pub stage: Stage,
    pub message: String,
    pub line: usize,
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Diagnostic {
    pub fn from_error(error: &Error) -> Self {
        let pos = error.position();
        let (code, hint) = error_info(error);
        Self {
            code: code.to_string(),
            stage: error.stage(),
            message: error.to_string(),
            line: pos.line,
            column: pos.column,
            hint,
        }
    }
}

fn error_info(error: &Error) -> (&'static str, Option<String>) {
    match error {
        // ========== Lexical ==========
        Error::InvalidCharacter { ch, .. } => (
            "E0001",
            Some(format!("'{}' is not part of the language; remove it", ch)),
        ),
        Error::UnterminatedString { .. } => ("E0002", Some("close the string with '\"'".to_string())),
        Error::UnterminatedChar { .. } => (
            "E0003",
            Some("a char literal holds exactly one character or escape, e.g. 'a' or '\\t'".to_string()),
        ),
        Error::UnterminatedComment { .. } => ("E0004", Some("close the comment with '*/'".to_string())),

        // ========== Syntax ==========
        Error::UnexpectedToken { expected, .. } => ("E0101", token_hint(expected.as_str())),
        Error::ExpectedOperand { .. } => (
            "E0102",
            Some("an operand is a parenthesized expression, identifier or literal".to_string()),
        ),
        Error::NestingTooDeep { limit, .. } => (
            "E0103",
            Some(format!("split the input so no part nests more than {} levels", limit)),
        ),

        // ========== Semantic ==========
        Error::UndeclaredIdentifier { name, .. } => (
            "E0201",
            Some(format!("declare '{}' before analysis (e.g. --declare {}:number)", name, name)),
        ),
        Error::UndeclaredVariable { name, .. } => (
            "E0202",
            Some(format!("declare '{}' before analysis (e.g. --declare {}:number)", name, name)),
        ),
        Error::TypeMismatch { expected, .. } => (
            "E0203",
            Some(format!("assign a value of type {}", expected)),
        ),
        Error::IncompatibleTypes { .. } => (
            "E0204",
            Some("both operands must have the same numeric type".to_string()),
        ),
        Error::NonNumericCondition { .. } => (
            "E0205",
            Some("use a NUMBER or FLOAT expression as the condition".to_string()),
        ),
    }
}

fn token_hint(expected: &str) -> Option<String> {
    match expected {
        "RPAREN" => Some("add the missing ')'".to_string()),
        "ELSE" => Some("every if needs an else branch".to_string()),
        "EQUALS" => Some("a statement is either an if or an assignment 'name = expr'".to_string()),
        "EOF" => Some("only one statement is allowed".to_string()),
        _ => None,
    }
}

// ==================== Report ====================

/// Counts describing one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub token_count: usize,
    pub node_count: usize,
    pub typed_nodes: usize,
    pub error_count: usize,
}

/// Complete result of one run, ready for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub success: bool,
    /// Where the input came from (file path or "<expr>")
    pub source: String,
    pub ast: Option<Node>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: Stats,
    pub first_sets: SymbolSets,
    pub follow_sets: SymbolSets,
}

impl Report {
    pub fn from_response(source: impl Into<String>, response: &ParserResponse) -> Self {
        Self {
            success: response.errors.is_empty(),
            source: source.into(),
            ast: response.ast.clone(),
            diagnostics: response.diagnostics.clone(),
            stats: Stats {
                token_count: response.token_count,
                node_count: response.ast.as_ref().map_or(0, Node::count),
                typed_nodes: response.types.len(),
                error_count: response.errors.len(),
            },
            first_sets: response.first_sets.clone(),
            follow_sets: response.follow_sets.clone(),
        }
    }

    /// Output as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Output as compact JSON
    pub fn to_json_compact(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::parse;
    use crate::utils::Position;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_diagnostic_from_error() {
        let error = Error::UndeclaredVariable {
            name: "a".to_string(),
            pos: Position::new(2, 4),
        };
        let diagnostic = Diagnostic::from_error(&error);
        assert_eq!(diagnostic.code, "E0202");
        assert_eq!(diagnostic.stage, Stage::Semantic);
        assert_eq!((diagnostic.line, diagnostic.column), (2, 4));
        assert_eq!(diagnostic.message, error.to_string());
        assert!(diagnostic.hint.unwrap().contains("--declare a:number"));
    }

    #[test]
    fn test_report_json() {
        let report = Report::from_response("<expr>", &parse("a = 1"));
        assert!(!report.success);
        assert_eq!(report.stats.error_count, 1);
        assert_eq!(report.stats.token_count, 4);
        assert_eq!(report.stats.node_count, 2);

        let value: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(value["source"], "<expr>");
        assert_eq!(value["diagnostics"][0]["stage"], "semantic");
        assert_eq!(value["diagnostics"][0]["code"], "E0202");
        assert_eq!(value["ast"]["kind"]["node"], "Assignment");
        assert_eq!(value["follow_sets"]["S"], serde_json::json!(["$", "else"]));
    }

    #[test]
    fn test_lexical_failure_report() {
        let report = Report::from_response("<expr>", &parse("a = #"));
        assert!(report.ast.is_none());
        assert_eq!(report.stats.node_count, 0);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].stage, Stage::Lexical);
        assert!(report.to_json_compact().starts_with("{\"success\":false"));
    }
}
