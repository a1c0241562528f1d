//! Lookahead heuristics for positions where the grammar alone cannot decide:
//! does a named operator take arguments, and is the token after `print` a
//! destination handle or the first value.

use log::trace;

use super::Parser;
use super::expression::{binary_precedence, is_assignment_operator};
use crate::ast::{Node, Sigil};
use crate::error::ParseError;
use crate::symbols::normalize_handle_name;
use crate::token::{Token, TokenKind};

/// Keywords that end an argument list (statement modifiers and low
/// precedence logical operators).
const TERMINATOR_WORDS: &[&str] = &[
    "if", "unless", "while", "until", "for", "foreach", "or", "and", "xor",
];

/// True when `token` ends a list: end of input, a closing bracket, `;`, `:`,
/// or a modifier keyword.
#[must_use]
pub fn is_list_terminator(token: &Token) -> bool {
    match token.kind {
        TokenKind::Eof => true,
        TokenKind::Operator => matches!(token.text.as_str(), ";" | ")" | "]" | "}" | ":"),
        TokenKind::Identifier => TERMINATOR_WORDS.contains(&token.text.as_str()),
        _ => false,
    }
}

/// True when `token` can only continue an expression, never start one.
#[must_use]
pub fn is_infix_operator(token: &Token) -> bool {
    if binary_precedence(token).is_some() {
        return true;
    }
    token.kind == TokenKind::Operator
        && (is_assignment_operator(&token.text)
            || matches!(token.text.as_str(), "?" | "," | "=>" | "**" | "->"))
}

/// Decides from the first two raw tokens whether a named operator has no
/// arguments here.
///
/// `+`, `*` and `&` read as unary when glued to a name or variable, `%` when
/// glued to a name or `$`, and `.` when it starts a number like `.5`. `-`
/// and `<` always start an argument.
#[must_use]
pub fn is_empty_argument_start(first: &Token, next: &Token) -> bool {
    if is_list_terminator(first) {
        return true;
    }
    if first.kind != TokenKind::Operator {
        return is_infix_operator(first);
    }
    let glued_to_name = next.kind == TokenKind::Identifier;
    match first.text.as_str() {
        "-" | "<" | "<<" => false,
        "+" | "*" | "&" if glued_to_name || next.is_operator("$") || next.is_operator("@") => {
            false
        }
        "%" if glued_to_name || next.is_operator("$") => false,
        "." if next.kind == TokenKind::Number => false,
        _ => is_infix_operator(first),
    }
}

/// True when `first` (followed by `next`) can begin a term.
#[must_use]
pub fn can_start_term(first: &Token, next: &Token) -> bool {
    match first.kind {
        TokenKind::Number => true,
        TokenKind::Identifier => !is_list_terminator(first) && !is_infix_operator(first),
        TokenKind::Operator => {
            matches!(
                first.text.as_str(),
                "$" | "@" | "(" | "[" | "{" | "\\" | "!" | "~" | "'" | "\"" | "`" | "++" | "--"
                    | "-" | "+" | "<" | "<<" | "::"
            ) || !is_empty_argument_start(first, next)
        }
        _ => false,
    }
}

/// Whether the token after a speculatively parsed `$var` makes the variable
/// a destination handle: the next thing must begin a term.
fn scalar_is_handle(next: &Token, after: &Token) -> bool {
    if is_list_terminator(next) {
        return false;
    }
    match next.kind {
        TokenKind::Operator => match next.text.as_str() {
            "[" | "{" | "->" | "," | "=>" => false,
            // `<<LABEL` or `<<"LABEL"` starts a heredoc term; anything else
            // is a shift.
            "<<" => {
                after.kind == TokenKind::Identifier
                    || matches!(after.text.as_str(), "\"" | "'" | "`" | "~" | "\\")
            }
            "$" | "@" | "\\" | "\"" | "'" | "`" | "(" | "!" => true,
            _ => !is_infix_operator(next),
        },
        TokenKind::Identifier => !is_infix_operator(next),
        _ => true,
    }
}

impl Parser<'_> {
    /// Peeks, without consuming anything significant, whether the named
    /// operator just consumed is followed by no arguments.
    ///
    /// # Errors
    ///
    /// Propagates heredoc failures from crossing a newline.
    pub fn looks_like_empty_argument_list(&mut self) -> Result<bool, ParseError> {
        self.skip()?;
        let empty = is_empty_argument_start(self.cursor.current(), self.cursor.raw(1));
        trace!(
            "argument lookahead at {:?}: {}",
            self.cursor.current().text,
            if empty { "empty" } else { "has arguments" }
        );
        Ok(empty)
    }

    /// Decides whether the next tokens name a destination handle for
    /// `print`/`say`/`printf`, consuming them only when they do.
    ///
    /// Recognized forms are a braced expression, a declared bareword handle
    /// (returned as [`Node::HandleRef`] with its normalized name), and a
    /// plain scalar variable followed by the start of a term. Every trial
    /// that fails rolls back cursor and heredoc queue.
    ///
    /// # Errors
    ///
    /// Only the braced form commits; errors inside it are real. A heredoc
    /// body that fails while a trial crosses a newline is also reported.
    pub fn resolve_file_handle_argument(&mut self) -> Result<Option<Node>, ParseError> {
        let token = self.peek()?.clone();

        if token.is_operator("{") {
            self.cursor.advance_raw();
            let handle = self.parse_expression()?;
            self.expect_operator("}")?;
            trace!("braced handle at {}:{}", token.span.line, token.span.column);
            return Ok(Some(handle));
        }

        if token.kind == TokenKind::Identifier && !is_list_terminator(&token) {
            let checkpoint = self.checkpoint();
            self.cursor.advance_raw();
            let name = self.qualified_name(&token.text);
            let normalized = normalize_handle_name(&name, &self.package);
            let next = self.peek()?;
            let callish = next.is_operator("(") || next.is_operator("=>") || next.is_operator("->");
            if !callish && self.symbols.exists_handle(&normalized) {
                trace!("bareword {name} is handle {normalized}");
                return Ok(Some(Node::HandleRef(normalized)));
            }
            self.rollback(checkpoint);
            return Ok(None);
        }

        if token.is_operator("$") {
            let checkpoint = self.checkpoint();
            self.cursor.advance_raw();
            match self.parse_variable(Sigil::Scalar) {
                Ok(variable @ Node::Variable { sigil: Sigil::Scalar, .. }) => {
                    self.skip()?;
                    if scalar_is_handle(self.cursor.current(), self.cursor.raw(1)) {
                        trace!("scalar {variable:?} is a handle");
                        return Ok(Some(variable));
                    }
                }
                Ok(_) => {}
                // Heredoc failures consumed their placeholder and cannot be retried.
                Err(err) if !err.is_syntax() => return Err(err),
                Err(err) => trace!("scalar handle trial abandoned: {err}"),
            }
            self.rollback(checkpoint);
        }

        Ok(None)
    }
}
