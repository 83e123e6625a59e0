//! Lexer for the conditional command language
//!
//! Converts source text into a stream of tokens terminated by a single EOF token.
//! Scanning is driven by a small state machine:
//! - `Default`: whitespace, literals, identifiers and operators
//! - `String`: inside a double-quoted literal
//! - `LineComment`: after `//` until end of line
//! - `BlockComment`: between `/*` and `*/`

use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Position, Result};

/// Scanner state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Default,
    String,
    LineComment,
    BlockComment,
}

/// The lexer state
pub struct Lexer {
    /// Source code as chars
    source: Vec<char>,
    /// Current index into `source`
    pos: usize,
    line: usize,
    column: usize,
    state: LexState,
    /// Where the string literal or block comment being scanned started
    start: Position,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            state: LexState::Default,
            start: Position::start(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source.get(self.pos + offset).copied()
    }

    /// Advance one character, keeping line/column in sync
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn current_pos(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Consume `len` chars and return them as a string
    fn take(&mut self, len: usize) -> String {
        let mut text = String::with_capacity(len);
        for _ in 0..len {
            if let Some(c) = self.advance() {
                text.push(c);
            }
        }
        text
    }

    /// Tokenize the entire source and return all tokens, ending with EOF
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        while !self.is_at_end() {
            match self.state {
                LexState::Default => {
                    if let Some(token) = self.scan_default()? {
                        tokens.push(token);
                    }
                }
                LexState::String => tokens.push(self.scan_string()?),
                LexState::LineComment => self.skip_line_comment(),
                LexState::BlockComment => self.skip_block_comment()?,
            }
        }

        // Input ran out right after an opening delimiter
        match self.state {
            LexState::String => return Err(Error::UnterminatedString { pos: self.start }),
            LexState::BlockComment => return Err(Error::UnterminatedComment { pos: self.start }),
            LexState::Default | LexState::LineComment => {}
        }

        tokens.push(Token::eof(self.current_pos()));
        Ok(tokens)
    }

    /// Scan in the default state. Returns `None` when only whitespace was consumed or the
    /// state changed.
    fn scan_default(&mut self) -> Result<Option<Token>> {
        let Some(c) = self.peek() else {
            return Ok(None);
        };
        let pos = self.current_pos();

        if is_blank(c) {
            self.advance();
            return Ok(None);
        }

        match c {
            '"' => {
                self.start = pos;
                self.advance();
                self.state = LexState::String;
                Ok(None)
            }
            '/' if self.peek_at(1) == Some('/') => {
                self.take(2);
                self.state = LexState::LineComment;
                Ok(None)
            }
            '/' if self.peek_at(1) == Some('*') => {
                self.start = pos;
                self.take(2);
                self.state = LexState::BlockComment;
                Ok(None)
            }
            c if c.is_ascii_digit() => Ok(Some(self.read_number(pos))),
            '\'' => self.read_char(pos).map(Some),
            c if c.is_ascii_alphabetic() || c == '_' => Ok(Some(self.read_identifier(pos))),
            c => match TokenKind::from_symbol(c) {
                Some(kind) => {
                    self.advance();
                    Ok(Some(Token::new(kind, c.to_string(), pos)))
                }
                None => Err(Error::InvalidCharacter { ch: c, pos }),
            },
        }
    }

    /// Read a number literal. A float (`\d+\.\d+`) wins over an integer prefix.
    fn read_number(&mut self, pos: Position) -> Token {
        let mut len = 0;
        while self.peek_at(len).is_some_and(|c| c.is_ascii_digit()) {
            len += 1;
        }

        let mut kind = TokenKind::Number;
        if self.peek_at(len) == Some('.') && self.peek_at(len + 1).is_some_and(|c| c.is_ascii_digit()) {
            kind = TokenKind::Float;
            len += 1;
            while self.peek_at(len).is_some_and(|c| c.is_ascii_digit()) {
                len += 1;
            }
        }

        let text = self.take(len);
        Token::new(kind, text, pos)
    }

    /// Read a character literal: one char or a backslash escape pair between quotes.
    /// The token keeps the content between the quotes, escape undecoded.
    fn read_char(&mut self, pos: Position) -> Result<Token> {
        let content_len = match (self.peek_at(1), self.peek_at(2), self.peek_at(3)) {
            (Some('\\'), Some(esc), Some('\'')) if esc != '\n' && esc != '\r' => 2,
            (Some(c), Some('\''), _) if c != '\\' && c != '\'' => 1,
            _ => return Err(Error::UnterminatedChar { pos }),
        };

        self.advance(); // opening quote
        let value = self.take(content_len);
        self.advance(); // closing quote
        Ok(Token::new(TokenKind::Char, value, pos))
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self, pos: Position) -> Token {
        let mut len = 0;
        while self.peek_at(len).is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
            len += 1;
        }

        let text = self.take(len);
        let kind = TokenKind::keyword_from_str(&text).unwrap_or(TokenKind::Id);
        Token::new(kind, text, pos)
    }

    /// Collect a string literal body up to the closing quote
    fn scan_string(&mut self) -> Result<Token> {
        let mut value = String::new();

        while let Some(c) = self.peek() {
            match c {
                '\\' if self.peek_at(1).is_some() => {
                    // Escapes are copied verbatim, not decoded
                    value.push_str(&self.take(2));
                }
                '"' => {
                    self.advance();
                    self.state = LexState::Default;
                    return Ok(Token::new(TokenKind::String, value, self.start));
                }
                _ => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        Err(Error::UnterminatedString { pos: self.start })
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        self.state = LexState::Default;
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_at(1) == Some('/') {
                self.take(2);
                self.state = LexState::Default;
                return Ok(());
            }
            self.advance();
        }

        Err(Error::UnterminatedComment { pos: self.start })
    }
}

/// Separator characters: Unicode white space minus the no-break spaces and NEL, plus the
/// ASCII information separators U+001C..U+001F
fn is_blank(c: char) -> bool {
    match c {
        '\u{1C}'..='\u{1F}' => true,
        '\u{85}' | '\u{A0}' | '\u{2007}' | '\u{202F}' => false,
        c => c.is_whitespace(),
    }
}

/// Tokenize `source` with a fresh lexer
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).tokenize()
}
