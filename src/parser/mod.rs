//! Recursive-descent parser over a [`TokenCursor`].
//!
//! Trivia skipping goes through [`Parser::skip`], which runs the heredoc
//! drain every time a newline is crossed. Speculative parses pair a cursor
//! mark with the heredoc ledger length in a [`Checkpoint`].

mod ambiguity;
mod drain;
mod expression;
mod interpolate;
mod prototype;
mod statement;

use std::collections::HashMap;

use log::debug;

pub use ambiguity::{can_start_term, is_empty_argument_start, is_infix_operator, is_list_terminator};

use crate::ast::Program;
use crate::cursor::{CursorMark, TokenCursor, Trivia};
use crate::error::{ParseError, ParseErrorKind};
use crate::heredoc::HeredocQueue;
use crate::symbols::SymbolRegistry;
use crate::token::{Token, TokenKind};

/// Parse a token stream into a [`Program`].
///
/// # Errors
///
/// Returns the first fatal error: a syntax error, an unterminated or
/// mis-indented heredoc, or a prototype violation.
pub fn parse(tokens: Vec<Token>, symbols: &dyn SymbolRegistry) -> Result<Program, ParseError> {
    Parser::new(tokens, symbols).parse_program()
}

/// Saved parser state for a speculative parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    cursor: CursorMark,
    heredocs: usize,
}

/// Parse session for one source unit.
pub struct Parser<'r> {
    cursor: TokenCursor,
    heredocs: HeredocQueue,
    symbols: &'r dyn SymbolRegistry,
    package: String,
    /// Subroutines declared so far, with their prototypes.
    subs: HashMap<String, Option<String>>,
    /// Parsers over embedded text never drain heredocs; the enclosing
    /// parser does.
    nested: bool,
}

impl<'r> Parser<'r> {
    #[must_use]
    pub fn new(tokens: Vec<Token>, symbols: &'r dyn SymbolRegistry) -> Self {
        Self {
            cursor: TokenCursor::new(tokens),
            heredocs: HeredocQueue::new(),
            symbols,
            package: "main".to_string(),
            subs: HashMap::new(),
            nested: false,
        }
    }

    /// Sets the namespace parsing starts in.
    #[must_use]
    pub fn with_package(mut self, package: &str) -> Self {
        self.package = package.to_string();
        self
    }

    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    #[must_use]
    pub const fn heredocs(&self) -> &HeredocQueue {
        &self.heredocs
    }

    #[must_use]
    pub const fn cursor(&self) -> &TokenCursor {
        &self.cursor
    }

    /// Saves cursor position and heredoc ledger length.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            cursor: self.cursor.checkpoint(),
            heredocs: self.heredocs.len(),
        }
    }

    /// Abandons a speculative parse, dropping heredocs it registered.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        if self.heredocs.len() > checkpoint.heredocs {
            debug!(
                "rollback to token {} drops {} heredoc registration(s)",
                checkpoint.cursor.position(),
                self.heredocs.len() - checkpoint.heredocs
            );
        }
        self.heredocs.truncate(checkpoint.heredocs);
        self.cursor.rollback(checkpoint.cursor);
    }

    /// Skips trivia, draining pending heredocs at every newline crossed.
    ///
    /// # Errors
    ///
    /// Propagates heredoc resolution failures.
    pub fn skip(&mut self) -> Result<(), ParseError> {
        while self.cursor.skip_trivia() == Trivia::LineEnd {
            self.after_line_end()?;
        }
        Ok(())
    }

    /// Next significant token, not consumed.
    fn peek(&mut self) -> Result<&Token, ParseError> {
        self.skip()?;
        Ok(self.cursor.current())
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip()?;
        let token = self.cursor.current().clone();
        self.cursor.advance_raw();
        Ok(token)
    }

    fn eat_operator(&mut self, text: &str) -> Result<bool, ParseError> {
        if self.peek()?.is_operator(text) {
            self.cursor.advance_raw();
            return Ok(true);
        }
        Ok(false)
    }

    fn eat_identifier(&mut self, text: &str) -> Result<bool, ParseError> {
        if self.peek()?.is_identifier(text) {
            self.cursor.advance_raw();
            return Ok(true);
        }
        Ok(false)
    }

    /// Consumes `,` or `=>`.
    fn eat_comma(&mut self) -> Result<bool, ParseError> {
        let token = self.peek()?;
        if token.is_operator(",") || token.is_operator("=>") {
            self.cursor.advance_raw();
            return Ok(true);
        }
        Ok(false)
    }

    fn expect_operator(&mut self, text: &str) -> Result<Token, ParseError> {
        self.skip()?;
        self.cursor.consume_expected(TokenKind::Operator, Some(text))
    }

    fn expect_identifier(&mut self, what: &str) -> Result<Token, ParseError> {
        let token = self.peek()?;
        if token.kind == TokenKind::Identifier {
            return self.next_token();
        }
        Err(unexpected(token, what))
    }

    fn at_list_end(&mut self) -> Result<bool, ParseError> {
        Ok(is_list_terminator(self.peek()?))
    }

    /// Joins `::`-separated identifiers following `first` (already
    /// consumed). No trivia may appear inside a qualified name.
    fn qualified_name(&mut self, first: &str) -> String {
        let mut name = first.to_string();
        while self.cursor.current().is_operator("::")
            && self.cursor.raw(1).kind == TokenKind::Identifier
        {
            name.push_str("::");
            self.cursor.advance_raw();
            name.push_str(&self.cursor.current().text);
            self.cursor.advance_raw();
        }
        name
    }
}

/// Error for a committed construct that found the wrong token.
fn unexpected(token: &Token, expected: &str) -> ParseError {
    let expected = expected.to_string();
    let kind = if token.is_eof() {
        ParseErrorKind::UnexpectedEof { expected }
    } else {
        ParseErrorKind::UnexpectedToken {
            expected,
            found: token.describe(),
        }
    };
    ParseError::new(kind, token.span)
}
