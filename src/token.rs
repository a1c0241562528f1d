/// Source location for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    /// Position of the first character of a source unit.
    pub const START: Self = Self { line: 1, column: 1 };
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `[A-Za-z_][A-Za-z0-9_]*`.
    Identifier,
    /// Run of decimal digits (fractions are assembled by the parser).
    Number,
    /// Control characters and non-ASCII text.
    String,
    /// Punctuation, single or multi-character.
    Operator,
    /// Run of spaces, tabs, form feeds or lone carriage returns.
    Whitespace,
    /// Line break (`\n` or `\r\n`).
    Newline,
    /// End of input.
    Eof,
}

/// A single token with its kind, text, and source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    /// True for an operator token with exactly this text.
    #[must_use]
    pub fn is_operator(&self, text: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == text
    }

    /// True for an identifier token with exactly this text.
    #[must_use]
    pub fn is_identifier(&self, text: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text == text
    }

    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Text used in "found ..." diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Newline => "newline".to_string(),
            _ => self.text.clone(),
        }
    }
}
