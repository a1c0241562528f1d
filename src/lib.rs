//! Front-end parsing engine for a Perl-like language.
//!
//! The parts that make the language hard to parse live here: a token
//! cursor with checkpoint/rollback, deferred heredoc bodies resolved when
//! their line ends, lookahead heuristics for argument lists and print
//! handles, and prototype-driven argument consumption. A compact
//! recursive-descent grammar ties them together.
//!
//! # Quick start
//!
//! ```
//! use plfront::{format, parse_str};
//!
//! let program = parse_str("print STDERR <<EOT;\nhello\nEOT\n").unwrap();
//! assert_eq!(
//!     format(&program),
//!     "(print {(handle main::STDERR)} (heredoc EOT \"hello\\n\"))\n"
//! );
//! ```
//!
//! ## Declaring handles
//!
//! ```
//! use plfront::{ParseOptions, format, parse_with};
//!
//! let options = ParseOptions::new().handle("LOG");
//! let program = parse_with("print LOG 'done';", &options).unwrap();
//! assert_eq!(format(&program), "(print {(handle main::LOG)} \"done\")\n");
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod builtins;
pub mod cursor;
pub mod error;
pub mod formatter;
pub mod heredoc;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod quote;
pub mod symbols;
pub mod token;

pub use ast::{Branch, Node, Program, Sigil, Subscript};
pub use builtins::{CallShape, SpecialForm};
pub use cursor::{CursorMark, TokenCursor, Trivia};
pub use error::{ParseError, ParseErrorKind, PrototypeProblem};
pub use formatter::{format, format_node};
pub use heredoc::{Heredoc, HeredocQueue, HeredocRef, HeredocState, QuoteKind};
pub use lexer::{tokenize, tokenize_at};
pub use options::ParseOptions;
pub use parser::{Checkpoint, Parser, parse};
pub use symbols::{HandleTable, SymbolRegistry, normalize_handle_name};
pub use token::{Span, Token, TokenKind};

/// Tokenize and parse a source string with default options.
pub fn parse_str(input: &str) -> Result<Program, ParseError> {
    parse_with(input, &ParseOptions::new())
}

/// Tokenize and parse a source string with explicit options.
pub fn parse_with(input: &str, options: &ParseOptions) -> Result<Program, ParseError> {
    let handles = options.handle_table();
    Parser::new(tokenize(input), &handles)
        .with_package(options.initial_package())
        .parse_program()
}
