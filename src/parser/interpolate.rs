//! Double-quote interpolation.
//!
//! Variables and subscripts are picked out of the text directly. Embedded
//! expressions (`@{[ EXPR ]}`, `${\ EXPR }`, computed subscripts) are
//! re-tokenized and handed to a nested parser that borrows this parser's
//! heredoc queue, so a heredoc announced inside an interpolated string joins
//! the same FIFO as every other one.

use std::mem;

use super::{Parser, unexpected};
use crate::ast::{Node, Sigil, Subscript};
use crate::cursor::TokenCursor;
use crate::error::ParseError;
use crate::lexer::tokenize_at;
use crate::token::Span;

impl Parser<'_> {
    /// Splits interpolated text into literal and variable parts. Text with
    /// no variable parts comes back as a plain [`Node::Str`].
    pub(super) fn interpolate(&mut self, text: &str, origin: Span) -> Result<Node, ParseError> {
        let chars: Vec<char> = text.chars().collect();
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];
            if ch == '\\' && i + 1 < chars.len() {
                literal.push(escape(chars[i + 1]));
                i += 2;
                continue;
            }
            if matches!(ch, '$' | '@') {
                if let Some((node, next)) = self.interpolated_variable(&chars, i, origin)? {
                    if !literal.is_empty() {
                        parts.push(Node::Str(mem::take(&mut literal)));
                    }
                    parts.push(node);
                    i = next;
                    continue;
                }
            }
            literal.push(ch);
            i += 1;
        }

        if parts.is_empty() {
            return Ok(Node::Str(literal));
        }
        if !literal.is_empty() {
            parts.push(Node::Str(literal));
        }
        Ok(Node::Interpolated(parts))
    }

    /// Variable starting at `chars[at]` (a sigil). Returns the node and the
    /// index just past it, or `None` when the sigil is literal text.
    fn interpolated_variable(
        &mut self,
        chars: &[char],
        at: usize,
        origin: Span,
    ) -> Result<Option<(Node, usize)>, ParseError> {
        let sigil = if chars[at] == '$' {
            Sigil::Scalar
        } else {
            Sigil::Array
        };
        let mut i = at + 1;

        let mut node = match chars.get(i) {
            Some('{') => {
                let Some(close) = matching(chars, i) else {
                    return Ok(None);
                };
                let inner: String = chars[i + 1..close].iter().collect();
                i = close + 1;
                let name = inner.trim();
                if is_name(name) {
                    Node::variable(sigil, name)
                } else {
                    Node::Deref {
                        sigil,
                        target: Box::new(self.parse_embedded(&inner, origin)?),
                    }
                }
            }
            Some(&c) if c.is_ascii_alphabetic() || c == '_' => {
                let end = name_end(chars, i);
                let name: String = chars[i..end].iter().collect();
                i = end;
                Node::variable(sigil, &name)
            }
            Some(c) if sigil == Sigil::Scalar && c.is_ascii_digit() => {
                let end = i + chars[i..].iter().take_while(|c| c.is_ascii_digit()).count();
                let name: String = chars[i..end].iter().collect();
                i = end;
                Node::variable(sigil, &name)
            }
            _ => return Ok(None),
        };

        if sigil == Sigil::Array {
            return Ok(Some((node, i)));
        }

        loop {
            let arrow = chars.get(i) == Some(&'-') && chars.get(i + 1) == Some(&'>');
            let open = if arrow { i + 2 } else { i };
            let subscript = match chars.get(open) {
                Some('[') => Subscript::Array,
                Some('{') => Subscript::Hash,
                _ => break,
            };
            let Some(close) = matching(chars, open) else {
                break;
            };
            let inner: String = chars[open + 1..close].iter().collect();
            let index = match subscript {
                Subscript::Hash if is_name(inner.trim()) => Node::Str(inner.trim().to_string()),
                _ => self.parse_embedded(&inner, origin)?,
            };
            let base = if arrow {
                node
            } else {
                element_base(node, subscript)
            };
            node = Node::Index {
                base: Box::new(base),
                subscript,
                index: Box::new(index),
            };
            i = close + 1;
        }

        Ok(Some((node, i)))
    }

    /// Parses an expression embedded in string text.
    pub(super) fn parse_embedded(&mut self, text: &str, origin: Span) -> Result<Node, ParseError> {
        let mut nested = Parser {
            cursor: TokenCursor::new(tokenize_at(text, origin)),
            heredocs: mem::take(&mut self.heredocs),
            symbols: self.symbols,
            package: self.package.clone(),
            subs: mem::take(&mut self.subs),
            nested: true,
        };
        let result = nested.parse_whole_expression();
        self.heredocs = nested.heredocs;
        self.subs = nested.subs;
        result
    }

    fn parse_whole_expression(&mut self) -> Result<Node, ParseError> {
        let node = self.parse_expression()?;
        let token = self.peek()?;
        if !token.is_eof() {
            return Err(unexpected(token, "end of embedded expression"));
        }
        Ok(node)
    }
}

/// Container a bare subscript applies to: `$x[0]` indexes `@x`, `$x{k}`
/// indexes `%x`. Anything else is indexed as is.
pub(super) fn element_base(base: Node, subscript: Subscript) -> Node {
    match base {
        Node::Variable {
            sigil: Sigil::Scalar,
            name,
        } => Node::Variable {
            sigil: match subscript {
                Subscript::Array => Sigil::Array,
                Subscript::Hash => Sigil::Hash,
            },
            name,
        },
        other => other,
    }
}

const fn escape(ch: char) -> char {
    match ch {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        'f' => '\x0c',
        'a' => '\x07',
        'e' => '\x1b',
        '0' => '\0',
        other => other,
    }
}

/// End of a possibly `::`-qualified name starting at `start`.
fn name_end(chars: &[char], start: usize) -> usize {
    let mut i = start;
    loop {
        while chars
            .get(i)
            .is_some_and(|c| c.is_ascii_alphanumeric() || *c == '_')
        {
            i += 1;
        }
        let qualified = chars.get(i) == Some(&':')
            && chars.get(i + 1) == Some(&':')
            && chars
                .get(i + 2)
                .is_some_and(|c| c.is_ascii_alphabetic() || *c == '_');
        if !qualified {
            return i;
        }
        i += 2;
    }
}

fn is_name(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    chars
        .first()
        .is_some_and(|c| c.is_ascii_alphabetic() || *c == '_')
        && name_end(&chars, 0) == chars.len()
}

/// Index of the bracket closing the one at `open`, skipping escapes.
fn matching(chars: &[char], open: usize) -> Option<usize> {
    let open_char = chars[open];
    let close_char = match open_char {
        '[' => ']',
        '{' => '}',
        _ => return None,
    };
    let mut depth = 0usize;
    let mut i = open;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            c if c == open_char => depth += 1,
            c if c == close_char => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}
