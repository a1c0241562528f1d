//! Reference lexer producing the flat token stream the cursor consumes.
//!
//! Nothing is dropped here: whitespace, newlines, comment markers and
//! documentation lines all survive as tokens and are filtered later by
//! [`TokenCursor`](crate::cursor::TokenCursor).

use crate::token::{Span, Token, TokenKind};

/// Multi-character operators, longest first.
const OPERATORS: &[&str] = &[
    "<=>", "**=", "||=", "//=", "&&=", "<<=", ">>=", "...", "<<", ">>", "->", "=>", "==", "!=",
    "<=", ">=", "&&", "||", "//", "**", "++", "--", "+=", "-=", "*=", "/=", ".=", "%=", "|=",
    "&=", "^=", "::", "=~", "!~", "..",
];

/// Tokenize a source string into a sequence of tokens ending in `Eof`.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input, Span::START).tokenize()
}

/// Tokenize embedded text whose first character sits at `origin`.
#[must_use]
pub fn tokenize_at(input: &str, origin: Span) -> Vec<Token> {
    Lexer::new(input, origin).tokenize()
}

struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str, origin: Span) -> Self {
        let bytes = input.as_bytes();
        let start = if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
            3
        } else {
            0
        };
        Self {
            input: bytes,
            pos: start,
            line: origin.line,
            col: origin.column,
        }
    }

    fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while self.pos < self.input.len() {
            let ch = self.input[self.pos];
            let token = match ch {
                b'\n' => self.read_newline(1),
                b'\r' if self.peek_at(1) == Some(b'\n') => self.read_newline(2),
                b' ' | b'\t' | b'\r' | 0x0C => self.read_while(TokenKind::Whitespace, |b| {
                    matches!(b, b' ' | b'\t' | b'\r' | 0x0C)
                }),
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                    self.read_while(TokenKind::Identifier, |b| {
                        b.is_ascii_alphanumeric() || b == b'_'
                    })
                }
                b'0'..=b'9' => self.read_while(TokenKind::Number, |b| {
                    b.is_ascii_digit() || b == b'_'
                }),
                0x80..=0xFF => self.read_while(TokenKind::String, |b| b >= 0x80),
                _ if ch.is_ascii_punctuation() => self.read_operator(),
                _ => self.read_single(TokenKind::String),
            };
            tokens.push(token);
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            text: String::new(),
            span: self.span(),
        });
        tokens
    }

    const fn span(&self) -> Span {
        Span {
            line: self.line,
            column: self.col,
        }
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn text(&self, start: usize) -> String {
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn read_newline(&mut self, width: usize) -> Token {
        let span = self.span();
        let start = self.pos;
        self.pos += width;
        self.line += 1;
        self.col = 1;
        Token {
            kind: TokenKind::Newline,
            text: self.text(start),
            span,
        }
    }

    fn read_while(&mut self, kind: TokenKind, accept: impl Fn(u8) -> bool) -> Token {
        let span = self.span();
        let start = self.pos;
        while self.pos < self.input.len() && accept(self.input[self.pos]) {
            // A CRLF pair is a newline, never trailing whitespace.
            if self.input[self.pos] == b'\r' && self.peek_at(1) == Some(b'\n') {
                break;
            }
            // Continuation bytes don't start a new column.
            if self.input[self.pos] & 0xC0 != 0x80 {
                self.col += 1;
            }
            self.pos += 1;
        }
        Token {
            kind,
            text: self.text(start),
            span,
        }
    }

    fn read_single(&mut self, kind: TokenKind) -> Token {
        let span = self.span();
        let start = self.pos;
        self.pos += 1;
        self.col += 1;
        Token {
            kind,
            text: self.text(start),
            span,
        }
    }

    fn read_operator(&mut self) -> Token {
        let rest = &self.input[self.pos..];
        let width = OPERATORS
            .iter()
            .find(|op| rest.starts_with(op.as_bytes()))
            .map_or(1, |op| op.len());

        let span = self.span();
        let start = self.pos;
        self.pos += width;
        self.col += width;
        Token {
            kind: TokenKind::Operator,
            text: self.text(start),
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_text(input: &str) -> Vec<(TokenKind, String)> {
        tokenize(input)
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn identifiers_numbers_and_whitespace() {
        let tokens = kinds_and_text("my $x = 42;");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Identifier, "my".to_string()),
                (TokenKind::Whitespace, " ".to_string()),
                (TokenKind::Operator, "$".to_string()),
                (TokenKind::Identifier, "x".to_string()),
                (TokenKind::Whitespace, " ".to_string()),
                (TokenKind::Operator, "=".to_string()),
                (TokenKind::Whitespace, " ".to_string()),
                (TokenKind::Number, "42".to_string()),
                (TokenKind::Operator, ";".to_string()),
                (TokenKind::Eof, String::new()),
            ]
        );
    }

    #[test]
    fn longest_operator_wins() {
        let tokens = tokenize("$a <=> $b <<~EOF");
        let ops: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Operator)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(ops, vec!["$", "<=>", "$", "<<", "~"]);
    }

    #[test]
    fn crlf_is_one_newline() {
        let tokens = tokenize("a\r\nb");
        assert_eq!(tokens[1].kind, TokenKind::Newline);
        assert_eq!(tokens[1].text, "\r\n");
        assert_eq!(tokens[2].span.line, 2);
        assert_eq!(tokens[2].span.column, 1);
    }

    #[test]
    fn control_characters_are_string_tokens() {
        let tokens = tokenize("1;\x04junk");
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].text, "\x04");
    }

    #[test]
    fn non_ascii_run_is_one_token() {
        let tokens = tokenize("\"héllo\"");
        assert_eq!(tokens[1].text, "h");
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].text, "é");
        assert_eq!(tokens[3].span.column, 4);
    }

    #[test]
    fn bom_stripping() {
        let tokens = tokenize("\u{FEFF}print");
        assert_eq!(tokens[0].text, "print");
    }

    #[test]
    fn span_tracking() {
        let tokens = tokenize("a\nb c");
        assert_eq!(tokens[0].span, Span { line: 1, column: 1 });
        assert_eq!(tokens[2].span, Span { line: 2, column: 1 });
        assert_eq!(tokens[4].span, Span { line: 2, column: 3 });
    }

    #[test]
    fn embedded_text_keeps_origin() {
        let tokens = tokenize_at("$x", Span { line: 7, column: 3 });
        assert_eq!(tokens[0].span, Span { line: 7, column: 3 });
        assert_eq!(tokens[1].span, Span { line: 7, column: 4 });
    }

    #[test]
    fn always_ends_with_eof() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
    }
}
