//! Generic quoted-literal reader shared by string literals, `q`-style
//! operators, readline brackets, and quoted heredoc labels.

use crate::cursor::TokenCursor;
use crate::error::ParseError;
use crate::token::{Token, TokenKind};

/// Closing delimiter for an opening one; symmetric delimiters close
/// themselves.
#[must_use]
pub const fn closing_delimiter(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        '<' => '>',
        other => other,
    }
}

/// Reads raw tokens up to the delimiter matching `open`, which must already
/// be consumed. Returns the text between the delimiters with backslash
/// escapes left intact. Bracketing delimiters nest.
///
/// Multi-character operators that contain a delimiter are split so the
/// delimiter is seen on its own.
///
/// # Errors
///
/// Returns a syntax error positioned at `open` when input ends first.
pub fn read_delimited(cursor: &mut TokenCursor, open: &Token) -> Result<String, ParseError> {
    let open_char = open.text.chars().next().unwrap_or('"');
    let close_char = closing_delimiter(open_char);
    let mut depth = 0usize;
    let mut text = String::new();

    loop {
        let token = cursor.current();
        match token.kind {
            TokenKind::Eof => {
                return Err(ParseError::syntax(
                    format!("cannot find string terminator \"{close_char}\" anywhere before EOF"),
                    open.span,
                ));
            }
            TokenKind::Operator => {
                let head = if token.text.len() > 1 {
                    cursor.split_operator()
                } else {
                    let head = token.clone();
                    cursor.advance_raw();
                    Some(head)
                };
                let Some(head) = head else {
                    continue;
                };
                let ch = head.text.chars().next().unwrap_or_default();

                if ch == '\\' {
                    text.push('\\');
                    take_escaped(cursor, &mut text);
                } else if ch == close_char && depth == 0 {
                    return Ok(text);
                } else {
                    if ch == close_char {
                        depth -= 1;
                    } else if ch == open_char {
                        depth += 1;
                    }
                    text.push(ch);
                }
            }
            _ => {
                text.push_str(&token.text);
                cursor.advance_raw();
            }
        }
    }
}

/// Appends the character escaped by a backslash. Only the first character
/// of a longer operator is taken.
fn take_escaped(cursor: &mut TokenCursor, text: &mut String) {
    let token = cursor.current();
    match token.kind {
        TokenKind::Eof => {}
        TokenKind::Operator if token.text.len() > 1 => {
            if let Some(head) = cursor.split_operator() {
                text.push_str(&head.text);
            }
        }
        _ => {
            text.push_str(&token.text);
            cursor.advance_raw();
        }
    }
}

/// Processes the escapes of single-quoted text: only `\\` and an escaped
/// delimiter are special.
#[must_use]
pub fn unescape_single(text: &str, delimiter: char) -> String {
    let close = closing_delimiter(delimiter);
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '\\' || next == delimiter || next == close {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(ch);
    }
    out
}
