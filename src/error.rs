use std::fmt;

use crate::token::Span;

/// How a call site violated its declared prototype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrototypeProblem {
    /// A required (pre-`;`) argument is missing.
    NotEnoughArguments,
    /// Arguments remain inside the parentheses after the prototype ran out.
    TooManyArguments,
    /// An optional argument slot holds something that is not a term.
    ExpectedScalar,
    /// Two arguments are not separated by a comma.
    ExpectedComma,
}

impl fmt::Display for PrototypeProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEnoughArguments => write!(f, "not enough arguments"),
            Self::TooManyArguments => write!(f, "too many arguments"),
            Self::ExpectedScalar => write!(f, "expected scalar argument"),
            Self::ExpectedComma => write!(f, "expected comma"),
        }
    }
}

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A committed construct found the wrong token.
    UnexpectedToken { expected: String, found: String },
    /// A committed construct ran into the end of input.
    UnexpectedEof { expected: String },
    /// Any other malformed construct.
    Syntax(String),
    /// Heredoc terminator line never appeared.
    UnterminatedHeredoc { label: String },
    /// An indented heredoc body line lacks the terminator's indentation.
    IndentationMismatch { label: String },
    /// Call site does not match the callee's prototype.
    PrototypeViolation {
        name: String,
        problem: PrototypeProblem,
    },
    /// Prototype string contains a character outside `$@;`, or `@` is not
    /// the last character.
    MalformedPrototype { name: String, character: char },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { expected, found } => {
                write!(f, "syntax error: expected {expected}, got '{found}'")
            }
            Self::UnexpectedEof { expected } => {
                write!(f, "syntax error: expected {expected}, got end of input")
            }
            Self::Syntax(message) => write!(f, "syntax error: {message}"),
            Self::UnterminatedHeredoc { label } => {
                write!(
                    f,
                    "cannot find string terminator \"{label}\" \
                     anywhere before EOF"
                )
            }
            Self::IndentationMismatch { label } => {
                write!(
                    f,
                    "indentation of here-doc body doesn't match \
                     delimiter \"{label}\""
                )
            }
            Self::PrototypeViolation { name, problem } => {
                write!(f, "{problem} for {name}")
            }
            Self::MalformedPrototype { name, character } => {
                write!(f, "malformed prototype for {name}: '{character}'")
            }
        }
    }
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", span.line, span.column)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    #[must_use]
    pub const fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    #[must_use]
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(ParseErrorKind::Syntax(message.into()), span)
    }

    /// True for the three syntax variants.
    #[must_use]
    pub const fn is_syntax(&self) -> bool {
        matches!(
            self.kind,
            ParseErrorKind::UnexpectedToken { .. }
                | ParseErrorKind::UnexpectedEof { .. }
                | ParseErrorKind::Syntax(_)
        )
    }
}
