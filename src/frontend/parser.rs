//! Parser for the conditional command language
//!
//! Recursive descent over the grammar
//!
//! ```text
//! S -> "if" "(" E ")" S "else" S | ID "=" E
//! E -> T (("+" | "-") T)*
//! T -> F (("*" | "/") F)*
//! F -> "(" E ")" | ID | NUMBER | FLOAT | STRING | CHAR
//! ```
//!
//! A syntax error anywhere inside the top-level statement aborts that statement. The
//! error is recorded, tokens are skipped up to the next `if`, identifier or EOF, and the
//! statement yields no tree. End of input is then required in every case.
//!
//! Both the parser's own recursion (statements and parentheses) and the height of the
//! tree it builds are capped at [`MAX_NESTING`]. Deeper input is a syntax error, which
//! keeps every recursive pass over the tree within a bounded stack.

use log::debug;

use crate::frontend::ast::{BinaryOp, Node, NodeId, NodeKind};
use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Position, Result};

/// Token kinds the parser resumes at after a top-level syntax error
const SYNC_SET: [TokenKind; 3] = [TokenKind::If, TokenKind::Id, TokenKind::Eof];

/// Deepest nesting the parser accepts
pub const MAX_NESTING: usize = 256;

/// Parse result: the tree, if the statement parsed, and every syntax error in order
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub ast: Option<Node>,
    pub errors: Vec<Error>,
}

/// The parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    next_id: u32,
    /// Height of every node built so far, indexed by node id
    heights: Vec<usize>,
    /// Open statements and parentheses. Left unbalanced by an error; the statement is
    /// abandoned then.
    depth: usize,
}

impl Parser {
    /// Create a parser over a token stream. A missing trailing EOF is supplied.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let pos = tokens.last().map_or(Position::start(), |t| t.pos);
            tokens.push(Token::eof(pos));
        }
        Self {
            tokens,
            pos: 0,
            next_id: 0,
            heights: Vec::new(),
            depth: 0,
        }
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> &Token {
        // `new` guarantees a trailing EOF, and the cursor never moves past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Consume a token of the expected kind or fail naming what was found
    fn expect(&mut self, expected: TokenKind) -> Result<Token> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            Err(Error::UnexpectedToken {
                expected,
                found: self.current_kind(),
                pos: self.current().pos,
            })
        }
    }

    /// Skip tokens until one in `sync` (or EOF) is current
    fn synchronize(&mut self, sync: &[TokenKind]) {
        while !self.check(TokenKind::Eof) && !sync.contains(&self.current_kind()) {
            self.advance();
        }
    }

    /// Go one nesting level deeper, failing at the current token past the limit
    fn enter(&mut self) -> Result<()> {
        if self.depth >= MAX_NESTING {
            return Err(Error::NestingTooDeep {
                limit: MAX_NESTING,
                pos: self.current().pos,
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Build a node, failing if it would make the tree taller than the limit
    fn make_node(&mut self, pos: Position, kind: NodeKind) -> Result<Node> {
        let node = Node::new(NodeId(self.next_id), pos, kind);
        let height = 1 + node
            .children()
            .iter()
            .map(|child| self.heights.get(child.id.0 as usize).copied().unwrap_or(0))
            .max()
            .unwrap_or(0);
        if height > MAX_NESTING {
            return Err(Error::NestingTooDeep { limit: MAX_NESTING, pos });
        }

        self.next_id += 1;
        self.heights.push(height);
        Ok(node)
    }

    // ==================== Parsing Methods ====================

    /// Parse a complete input: one statement followed by end of input
    pub fn parse(mut self) -> ParseOutcome {
        let mut errors = Vec::new();

        let ast = match self.parse_statement() {
            Ok(node) => Some(node),
            Err(err) => {
                debug!("recovering from syntax error: {}", err);
                errors.push(err);
                self.synchronize(&SYNC_SET);
                None
            }
        };

        if let Err(err) = self.expect(TokenKind::Eof) {
            errors.push(err);
        }

        ParseOutcome { ast, errors }
    }

    /// S -> if-statement | assignment
    fn parse_statement(&mut self) -> Result<Node> {
        self.enter()?;
        let node = if self.check(TokenKind::If) {
            self.parse_if()?
        } else {
            self.parse_assignment()?
        };
        self.depth -= 1;
        Ok(node)
    }

    fn parse_if(&mut self) -> Result<Node> {
        let start = self.expect(TokenKind::If)?.pos;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let then_branch = self.parse_statement()?;
        self.expect(TokenKind::Else)?;
        let else_branch = self.parse_statement()?;

        self.make_node(
            start,
            NodeKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
        )
    }

    fn parse_assignment(&mut self) -> Result<Node> {
        let target = self.expect(TokenKind::Id)?;
        self.expect(TokenKind::Equals)?;
        let expr = self.parse_expr()?;

        self.make_node(
            target.pos,
            NodeKind::Assignment {
                identifier: target.lexeme,
                expr: Box::new(expr),
            },
        )
    }

    /// E -> T (("+" | "-") T)*, left-associative
    fn parse_expr(&mut self) -> Result<Node> {
        let mut node = self.parse_term()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let op_pos = self.advance().pos;
            let right = self.parse_term()?;
            node = self.make_node(
                op_pos,
                NodeKind::BinOp { op, left: Box::new(node), right: Box::new(right) },
            )?;
        }

        Ok(node)
    }

    /// T -> F (("*" | "/") F)*, left-associative
    fn parse_term(&mut self) -> Result<Node> {
        let mut node = self.parse_factor()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Times => BinaryOp::Mul,
                TokenKind::Divide => BinaryOp::Div,
                _ => break,
            };
            let op_pos = self.advance().pos;
            let right = self.parse_factor()?;
            node = self.make_node(
                op_pos,
                NodeKind::BinOp { op, left: Box::new(node), right: Box::new(right) },
            )?;
        }

        Ok(node)
    }

    /// F -> "(" E ")" | ID | NUMBER | FLOAT | STRING | CHAR
    fn parse_factor(&mut self) -> Result<Node> {
        let token = self.current().clone();
        let kind = match token.kind {
            TokenKind::LParen => {
                self.enter()?;
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                self.depth -= 1;
                return Ok(inner);
            }
            TokenKind::Id => NodeKind::Identifier { name: token.lexeme },
            TokenKind::Number => NodeKind::NumberLiteral { raw: token.lexeme },
            TokenKind::Float => NodeKind::FloatLiteral { raw: token.lexeme },
            TokenKind::String => NodeKind::StringLiteral { raw: token.lexeme },
            TokenKind::Char => NodeKind::CharLiteral { raw: token.lexeme },
            found => return Err(Error::ExpectedOperand { found, pos: token.pos }),
        };

        self.advance();
        self.make_node(token.pos, kind)
    }
}

/// Parse a token stream with a fresh parser
pub fn parse_tokens(tokens: Vec<Token>) -> ParseOutcome {
    Parser::new(tokens).parse()
}
