//! Positional view over the token stream with trivia skipping and
//! checkpoint/rollback.

use crate::error::{ParseError, ParseErrorKind};
use crate::token::{Token, TokenKind};

/// Identifiers that end the script; everything after them is data.
const END_MARKERS: &[&str] = &["__END__", "__DATA__"];

/// Raw control characters that end the script (`^D`, `^Z`).
const END_CHARACTERS: &[&str] = &["\x04", "\x1a"];

/// Saved cursor state. Marks nest strictly LIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorMark {
    pos: usize,
    splits: usize,
}

impl CursorMark {
    /// Token index the mark points at.
    #[must_use]
    pub const fn position(self) -> usize {
        self.pos
    }
}

/// Outcome of one [`TokenCursor::skip_trivia`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trivia {
    /// Stopped right after consuming a newline.
    LineEnd,
    /// Stopped on a significant token.
    Significant,
}

/// Cursor over an immutable token sequence.
///
/// The only mutation is [`split_operator`](Self::split_operator), which is
/// recorded in an undo log so [`rollback`](Self::rollback) reverts it.
#[derive(Debug, Clone)]
pub struct TokenCursor {
    tokens: Vec<Token>,
    pos: usize,
    splits: Vec<(usize, Token)>,
}

impl TokenCursor {
    /// Wraps a token stream, appending an `Eof` token if it lacks one.
    #[must_use]
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let span = tokens
                .last()
                .map_or(crate::token::Span::START, |last| last.span);
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                span,
            });
        }
        Self {
            tokens,
            pos: 0,
            splits: Vec::new(),
        }
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    fn eof_index(&self) -> usize {
        self.tokens.len() - 1
    }

    /// Token at the current position, without skipping anything.
    #[must_use]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    /// Token `offset` places after the current one, without skipping.
    /// Past the end this is the `Eof` token.
    #[must_use]
    pub fn raw(&self, offset: usize) -> &Token {
        let index = (self.pos + offset).min(self.eof_index());
        &self.tokens[index]
    }

    /// Moves one raw token forward; never moves past `Eof`.
    pub fn advance_raw(&mut self) {
        if self.pos < self.eof_index() {
            self.pos += 1;
        }
    }

    /// Jumps to an absolute token index, clamped to `Eof`.
    pub fn seek(&mut self, position: usize) {
        self.pos = position.min(self.eof_index());
    }

    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.current().is_eof()
    }

    /// True at the start of input or right after a newline.
    #[must_use]
    pub fn at_line_start(&self) -> bool {
        self.pos == 0 || self.tokens[self.pos - 1].kind == TokenKind::Newline
    }

    /// True when only whitespace separates the current token from the start
    /// of its line.
    fn only_indent_before(&self) -> bool {
        self.tokens[..self.pos]
            .iter()
            .rev()
            .take_while(|token| token.kind != TokenKind::Newline)
            .all(|token| token.kind == TokenKind::Whitespace)
    }

    /// Skips insignificant tokens, stopping early right after a newline.
    ///
    /// Callers that need to act at line boundaries (the heredoc drain) call
    /// this in a loop; [`peek`](Self::peek) ignores line boundaries.
    pub fn skip_trivia(&mut self) -> Trivia {
        loop {
            let token = &self.tokens[self.pos];
            match token.kind {
                TokenKind::Whitespace => self.pos += 1,
                TokenKind::Newline => {
                    self.pos += 1;
                    return Trivia::LineEnd;
                }
                TokenKind::Operator if token.text == "#" => self.skip_to_newline(),
                TokenKind::Operator
                    if token.text == "="
                        && self.at_line_start()
                        && self.raw(1).kind == TokenKind::Identifier =>
                {
                    self.skip_doc_block();
                }
                TokenKind::Identifier
                    if END_MARKERS.contains(&token.text.as_str()) && self.only_indent_before() =>
                {
                    self.pos = self.eof_index();
                    return Trivia::Significant;
                }
                TokenKind::String if END_CHARACTERS.contains(&token.text.as_str()) => {
                    self.pos = self.eof_index();
                    return Trivia::Significant;
                }
                _ => return Trivia::Significant,
            }
        }
    }

    /// Returns the next significant token without consuming it.
    pub fn peek(&mut self) -> &Token {
        while self.skip_trivia() == Trivia::LineEnd {}
        &self.tokens[self.pos]
    }

    /// Returns the next significant token and moves past it.
    pub fn consume(&mut self) -> Token {
        let token = self.peek().clone();
        self.advance_raw();
        token
    }

    /// Consumes the next significant token if it has the given kind (and
    /// text, when given).
    ///
    /// # Errors
    ///
    /// Returns a syntax error naming what was expected; the cursor does not
    /// move in that case.
    pub fn consume_expected(
        &mut self,
        kind: TokenKind,
        text: Option<&str>,
    ) -> Result<Token, ParseError> {
        let token = self.peek();
        let matches = token.kind == kind && text.is_none_or(|t| token.text == t);
        if matches {
            return Ok(self.consume());
        }

        let expected = text.map_or_else(|| format!("{kind:?}"), |t| format!("'{t}'"));
        let kind = if token.is_eof() {
            ParseErrorKind::UnexpectedEof { expected }
        } else {
            ParseErrorKind::UnexpectedToken {
                expected,
                found: token.describe(),
            }
        };
        Err(ParseError::new(kind, token.span))
    }

    #[must_use]
    pub fn checkpoint(&self) -> CursorMark {
        CursorMark {
            pos: self.pos,
            splits: self.splits.len(),
        }
    }

    /// Restores a mark, undoing operator splits made since it was taken.
    pub fn rollback(&mut self, mark: CursorMark) {
        while self.splits.len() > mark.splits {
            if let Some((index, original)) = self.splits.pop() {
                self.tokens[index] = original;
            }
        }
        self.pos = mark.pos;
    }

    /// Splits the first character off a multi-character operator at the
    /// current raw position.
    ///
    /// The returned one-character token is considered consumed; the
    /// remainder stays at the same index as a shortened token. Returns `None`
    /// when the current token is not a multi-character operator.
    pub fn split_operator(&mut self) -> Option<Token> {
        let token = &self.tokens[self.pos];
        if token.kind != TokenKind::Operator || token.text.len() < 2 {
            return None;
        }

        let original = token.clone();
        let (first, rest) = original.text.split_at(1);
        let head = Token {
            kind: TokenKind::Operator,
            text: first.to_string(),
            span: original.span,
        };

        let remainder = &mut self.tokens[self.pos];
        remainder.text = rest.to_string();
        remainder.span.column += 1;
        self.splits.push((self.pos, original));
        Some(head)
    }

    /// Reads one physical line verbatim from the raw token stream and moves
    /// past its newline. Returns `None` once input is exhausted.
    pub fn read_raw_line(&mut self) -> Option<String> {
        if self.is_at_end() {
            return None;
        }

        let mut line = String::new();
        loop {
            let token = &self.tokens[self.pos];
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Newline => {
                    self.pos += 1;
                    break;
                }
                _ => {
                    line.push_str(&token.text);
                    self.pos += 1;
                }
            }
        }
        Some(line)
    }

    fn skip_to_newline(&mut self) {
        while !matches!(
            self.tokens[self.pos].kind,
            TokenKind::Newline | TokenKind::Eof
        ) {
            self.pos += 1;
        }
    }

    /// Skips a documentation block, including its `=cut`/`=end` line.
    fn skip_doc_block(&mut self) {
        let mut first = true;
        loop {
            let closes = !first
                && self.current().is_operator("=")
                && (self.raw(1).is_identifier("cut") || self.raw(1).is_identifier("end"));
            first = false;

            self.skip_to_newline();
            if self.is_at_end() {
                return;
            }
            self.pos += 1;
            if closes {
                return;
            }
        }
    }
}
