//! Expression grammar: low-precedence word operators, comma lists,
//! assignment, precedence climbing over binary operators, then unary,
//! postfix and primary terms.

use log::trace;

use super::interpolate::element_base;
use super::{Parser, unexpected};
use crate::ast::{Node, Sigil, Subscript};
use crate::builtins::{self, CallShape, SpecialForm};
use crate::error::ParseError;
use crate::quote::{read_delimited, unescape_single};
use crate::token::{Span, Token, TokenKind};

/// Binding power of named unary operators. Their operand only takes
/// operators binding tighter than this.
pub(super) const NAMED_UNARY: u8 = 8;

/// Punctuation that forms a variable name on its own (`$_` is an
/// identifier; these are the rest).
const PUNCTUATION_VARIABLES: &[&str] = &[
    "&", "`", "'", "+", "!", "@", "/", "\\", ",", ";", ".", "|", "-", "<", ">", "$", "\"",
];

/// Binding power of a binary operator token, higher binds tighter.
pub(super) fn binary_precedence(token: &Token) -> Option<u8> {
    let precedence = match token.kind {
        TokenKind::Operator => match token.text.as_str() {
            ".." | "..." => 1,
            "||" | "//" => 2,
            "&&" => 3,
            "|" | "^" => 4,
            "&" => 5,
            "==" | "!=" | "<=>" => 6,
            "<" | ">" | "<=" | ">=" => 7,
            "<<" | ">>" => 9,
            "+" | "-" | "." => 10,
            "*" | "/" | "%" => 11,
            "=~" | "!~" => 12,
            _ => return None,
        },
        TokenKind::Identifier => match token.text.as_str() {
            "eq" | "ne" | "cmp" => 6,
            "lt" | "gt" | "le" | "ge" => 7,
            "x" => 11,
            _ => return None,
        },
        _ => return None,
    };
    Some(precedence)
}

pub(super) fn is_assignment_operator(text: &str) -> bool {
    matches!(
        text,
        "=" | "+=" | "-=" | "*=" | "/=" | ".=" | "%=" | "**=" | "||=" | "&&=" | "//=" | "|="
            | "&=" | "^=" | "<<=" | ">>="
    )
}

/// Whether `text` may open a `q`-style literal. After whitespace `#`
/// starts a comment instead.
fn is_quote_delimiter(text: &str, spaced: bool) -> bool {
    let Some(first) = text.chars().next() else {
        return false;
    };
    if spaced && first == '#' {
        return false;
    }
    !matches!(first, '=' | ',' | ';' | ')' | ']' | '}' | '>' | ':') && text != "->"
}

impl Parser<'_> {
    /// Full expression, including `or`/`and`/`not` and comma lists.
    pub(super) fn parse_expression(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_low_and()?;
        loop {
            let token = self.peek()?;
            let op = if token.is_identifier("or") {
                "or"
            } else if token.is_identifier("xor") {
                "xor"
            } else {
                break;
            };
            self.cursor.advance_raw();
            let right = self.parse_low_and()?;
            left = Node::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_low_and(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_low_not()?;
        while self.eat_identifier("and")? {
            let right = self.parse_low_not()?;
            left = Node::binary("and", left, right);
        }
        Ok(left)
    }

    fn parse_low_not(&mut self) -> Result<Node, ParseError> {
        if self.eat_identifier("not")? {
            return Ok(Node::unary("not", self.parse_low_not()?));
        }
        self.parse_comma_list()
    }

    /// Comma-separated list; a single item comes back unwrapped.
    pub(super) fn parse_comma_list(&mut self) -> Result<Node, ParseError> {
        let first = self.parse_assign()?;
        let token = self.peek()?;
        if !token.is_operator(",") && !token.is_operator("=>") {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat_comma()? {
            if self.at_list_end()? {
                break;
            }
            items.push(self.parse_assign()?);
        }
        Ok(Node::List(items))
    }

    /// Unparenthesized argument list for list operators: one or more items
    /// up to a terminator. A trailing comma is allowed.
    pub(super) fn parse_bare_list(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut items = vec![self.parse_assign()?];
        while self.eat_comma()? {
            if self.at_list_end()? {
                break;
            }
            items.push(self.parse_assign()?);
        }
        Ok(items)
    }

    /// Items between an already consumed opener and `close`.
    pub(super) fn parse_enclosed_list(&mut self, close: &str) -> Result<Vec<Node>, ParseError> {
        if self.eat_operator(close)? {
            return Ok(Vec::new());
        }
        let inner = self.parse_expression()?;
        self.expect_operator(close)?;
        Ok(match inner {
            Node::List(items) => items,
            other => vec![other],
        })
    }

    pub(super) fn parse_assign(&mut self) -> Result<Node, ParseError> {
        let target = self.parse_ternary()?;
        let token = self.peek()?;
        if token.kind == TokenKind::Operator && is_assignment_operator(&token.text) {
            let op = token.text.clone();
            self.cursor.advance_raw();
            let value = self.parse_assign()?;
            return Ok(Node::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            });
        }
        Ok(target)
    }

    fn parse_ternary(&mut self) -> Result<Node, ParseError> {
        let condition = self.parse_binary(1)?;
        if !self.eat_operator("?")? {
            return Ok(condition);
        }
        let then = self.parse_assign()?;
        self.expect_operator(":")?;
        let otherwise = self.parse_assign()?;
        Ok(Node::Ternary {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    /// Precedence climbing over binary operators binding at least `min`.
    pub(super) fn parse_binary(&mut self, min: u8) -> Result<Node, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let token = self.peek()?;
            let Some(precedence) = binary_precedence(token) else {
                break;
            };
            if precedence < min {
                break;
            }
            let op = token.text.clone();
            self.cursor.advance_raw();
            let right = self.parse_binary(precedence + 1)?;
            left = Node::binary(&op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        let token = self.peek()?;
        if token.kind == TokenKind::Operator
            && matches!(
                token.text.as_str(),
                "!" | "-" | "+" | "\\" | "~" | "++" | "--"
            )
        {
            let op = token.text.clone();
            self.cursor.advance_raw();
            let operand = self.parse_unary()?;
            return Ok(Node::unary(&op, operand));
        }
        self.parse_power()
    }

    /// `**` is right associative and takes a unary right operand.
    fn parse_power(&mut self) -> Result<Node, ParseError> {
        let base = self.parse_postfix()?;
        if self.eat_operator("**")? {
            let exponent = self.parse_unary()?;
            return Ok(Node::binary("**", base, exponent));
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<Node, ParseError> {
        let mut node = self.parse_primary()?;
        loop {
            let token = self.peek()?;
            if token.kind != TokenKind::Operator {
                break;
            }
            let op = token.text.clone();
            match op.as_str() {
                "[" | "{" if is_subscriptable(&node) => {
                    self.cursor.advance_raw();
                    let subscript = if op == "[" {
                        Subscript::Array
                    } else {
                        Subscript::Hash
                    };
                    let index = self.parse_subscript(subscript)?;
                    node = Node::Index {
                        base: Box::new(element_base(node, subscript)),
                        subscript,
                        index: Box::new(index),
                    };
                }
                "->" => {
                    self.cursor.advance_raw();
                    node = self.parse_arrow(node)?;
                }
                "(" if is_code(&node) => {
                    self.cursor.advance_raw();
                    let args = self.parse_enclosed_list(")")?;
                    node = Node::Invoke {
                        target: Box::new(node),
                        args,
                    };
                }
                "++" | "--" => {
                    self.cursor.advance_raw();
                    node = Node::Postfix {
                        op,
                        operand: Box::new(node),
                    };
                }
                _ => break,
            }
        }
        Ok(node)
    }

    /// Subscript body after `[` or `{`, through the closing bracket. A lone
    /// bareword (or `-bareword`) hash key is a string.
    fn parse_subscript(&mut self, subscript: Subscript) -> Result<Node, ParseError> {
        let close = match subscript {
            Subscript::Array => "]",
            Subscript::Hash => "}",
        };
        if subscript == Subscript::Hash {
            let checkpoint = self.checkpoint();
            let negative = self.eat_operator("-")?;
            let token = self.peek()?.clone();
            if token.kind == TokenKind::Identifier {
                self.cursor.advance_raw();
                if self.eat_operator("}")? {
                    let key = if negative {
                        format!("-{}", token.text)
                    } else {
                        token.text
                    };
                    return Ok(Node::Str(key));
                }
            }
            self.rollback(checkpoint);
        }
        let index = self.parse_expression()?;
        self.expect_operator(close)?;
        Ok(index)
    }

    fn parse_arrow(&mut self, target: Node) -> Result<Node, ParseError> {
        let token = self.next_token()?;
        match token.kind {
            TokenKind::Operator if token.text == "[" || token.text == "{" => {
                let subscript = if token.text == "[" {
                    Subscript::Array
                } else {
                    Subscript::Hash
                };
                let index = self.parse_subscript(subscript)?;
                Ok(Node::Index {
                    base: Box::new(target),
                    subscript,
                    index: Box::new(index),
                })
            }
            TokenKind::Operator if token.text == "(" => Ok(Node::Invoke {
                target: Box::new(target),
                args: self.parse_enclosed_list(")")?,
            }),
            TokenKind::Identifier => {
                let method = self.qualified_name(&token.text);
                let args = if self.eat_operator("(")? {
                    self.parse_enclosed_list(")")?
                } else {
                    Vec::new()
                };
                Ok(Node::MethodCall {
                    invocant: Box::new(target),
                    method,
                    args,
                })
            }
            _ => Err(unexpected(&token, "subscript, arguments or method after '->'")),
        }
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let token = self.peek()?.clone();
        match token.kind {
            TokenKind::Number => {
                self.cursor.advance_raw();
                Ok(Node::Number(self.number_tail(token.text)))
            }
            TokenKind::Identifier => {
                self.cursor.advance_raw();
                self.parse_word(&token)
            }
            TokenKind::Operator => self.parse_operator_term(&token),
            _ => Err(unexpected(&token, "a term")),
        }
    }

    /// Appends a fractional part glued to an integer (`1.5`).
    fn number_tail(&mut self, mut text: String) -> String {
        if self.cursor.current().is_operator(".") && self.cursor.raw(1).kind == TokenKind::Number
        {
            self.cursor.advance_raw();
            text.push('.');
            text.push_str(&self.cursor.current().text);
            self.cursor.advance_raw();
        }
        text
    }

    fn parse_operator_term(&mut self, token: &Token) -> Result<Node, ParseError> {
        let sigil = match token.text.as_str() {
            "$" => Some(Sigil::Scalar),
            "@" => Some(Sigil::Array),
            "%" => Some(Sigil::Hash),
            "&" => Some(Sigil::Code),
            "*" => Some(Sigil::Glob),
            _ => None,
        };
        if let Some(sigil) = sigil {
            self.cursor.advance_raw();
            return self.parse_variable(sigil);
        }

        match token.text.as_str() {
            "(" => {
                self.cursor.advance_raw();
                Ok(Node::List(self.parse_enclosed_list(")")?))
            }
            "[" => {
                self.cursor.advance_raw();
                Ok(Node::AnonArray(self.parse_enclosed_list("]")?))
            }
            "{" => {
                self.cursor.advance_raw();
                Ok(Node::AnonHash(self.parse_enclosed_list("}")?))
            }
            "'" | "\"" | "`" => {
                self.cursor.advance_raw();
                let text = read_delimited(&mut self.cursor, token)?;
                match token.text.as_str() {
                    "'" => Ok(Node::Str(unescape_single(&text, '\''))),
                    "`" => Ok(Node::Command(Box::new(self.interpolate(&text, token.span)?))),
                    _ => self.interpolate(&text, token.span),
                }
            }
            "<<" => {
                self.cursor.advance_raw();
                self.register_heredoc(token)
            }
            "<" => {
                self.cursor.advance_raw();
                let text = read_delimited(&mut self.cursor, token)?;
                Ok(Node::Readline(text.trim().to_string()))
            }
            "." if self.cursor.raw(1).kind == TokenKind::Number => {
                self.cursor.advance_raw();
                let digits = self.cursor.current().text.clone();
                self.cursor.advance_raw();
                Ok(Node::Number(format!(".{digits}")))
            }
            _ => Err(unexpected(token, "a term")),
        }
    }

    /// Term starting with an identifier (already consumed).
    fn parse_word(&mut self, token: &Token) -> Result<Node, ParseError> {
        let name = self.qualified_name(&token.text);

        if matches!(name.as_str(), "q" | "qq" | "qw" | "qx") {
            if let Some(node) = self.parse_quote_like(&name, token.span)? {
                return Ok(node);
            }
        }
        if self.peek()?.is_operator("=>") {
            return Ok(Node::Str(name));
        }

        if matches!(name.as_str(), "my" | "our" | "local") {
            let target = self.parse_postfix()?;
            return Ok(Node::Declare {
                declarator: name,
                target: Box::new(target),
            });
        }
        match name.as_str() {
            "sub" => return Ok(Node::AnonSub(self.parse_block()?)),
            "do" if self.peek()?.is_operator("{") => return Ok(Node::Do(self.parse_block()?)),
            "__PACKAGE__" => return Ok(Node::Str(self.package.clone())),
            "__LINE__" => return Ok(Node::Number(token.span.line.to_string())),
            _ => {}
        }

        if let Some(shape) = builtins::lookup(&name) {
            return self.parse_builtin(&name, shape);
        }
        if let Some(prototype) = self.subs.get(&name).cloned() {
            let args = match prototype {
                Some(prototype) => self.parse_prototype_call(&name, &prototype)?,
                None => self.parse_list_operator_args()?,
            };
            return Ok(Node::call(&name, args));
        }
        if self.eat_operator("(")? {
            let args = self.parse_enclosed_list(")")?;
            return Ok(Node::call(&name, args));
        }
        Ok(Node::Bareword(name))
    }

    fn parse_builtin(&mut self, name: &str, shape: CallShape) -> Result<Node, ParseError> {
        trace!("builtin {name}: {shape:?}");
        let args = match shape {
            CallShape::NoArgs => {
                if self.eat_operator("(")? {
                    self.expect_operator(")")?;
                }
                Vec::new()
            }
            CallShape::ZeroOrOneArg => {
                if self.eat_operator("(")? {
                    self.parse_enclosed_list(")")?
                } else if self.looks_like_empty_argument_list()? {
                    Vec::new()
                } else {
                    vec![self.parse_binary(NAMED_UNARY + 1)?]
                }
            }
            CallShape::ListOp => self.parse_list_operator_args()?,
            CallShape::Prototype(prototype) => self.parse_prototype_call(name, prototype)?,
            CallShape::Special(SpecialForm::Return) => return self.parse_return(),
            CallShape::Special(_) => return self.parse_print(name),
        };
        Ok(Node::call(name, args))
    }

    /// Arguments of a list operator: parenthesized, absent, or a bare list.
    pub(super) fn parse_list_operator_args(&mut self) -> Result<Vec<Node>, ParseError> {
        if self.eat_operator("(")? {
            return self.parse_enclosed_list(")");
        }
        if self.looks_like_empty_argument_list()? {
            return Ok(Vec::new());
        }
        self.parse_bare_list()
    }

    fn parse_return(&mut self) -> Result<Node, ParseError> {
        if self.looks_like_empty_argument_list()? {
            return Ok(Node::Return(None));
        }
        let value = self.parse_comma_list()?;
        Ok(Node::Return(Some(Box::new(value))))
    }

    /// `print`, `say`, `printf`: optional parentheses, optional handle,
    /// then the value list (possibly empty).
    fn parse_print(&mut self, function: &str) -> Result<Node, ParseError> {
        let parens = self.eat_operator("(")?;
        let handle = self.resolve_file_handle_argument()?;
        let args = if parens {
            self.parse_enclosed_list(")")?
        } else if self.looks_like_empty_argument_list()? {
            Vec::new()
        } else {
            self.parse_bare_list()?
        };
        Ok(Node::Print {
            function: function.to_string(),
            handle: handle.map(Box::new),
            args,
        })
    }

    /// `q`, `qq`, `qw`, `qx` followed by a delimiter. `None` when the word is
    /// not used as a quote operator here (`q => 1`).
    fn parse_quote_like(&mut self, operator: &str, span: Span) -> Result<Option<Node>, ParseError> {
        let spaced = self.cursor.current().kind == TokenKind::Whitespace;
        let candidate = self.cursor.raw(usize::from(spaced));
        if candidate.kind != TokenKind::Operator || !is_quote_delimiter(&candidate.text, spaced) {
            return Ok(None);
        }
        if spaced {
            self.cursor.advance_raw();
        }
        let open = if let Some(head) = self.cursor.split_operator() {
            head
        } else {
            let head = self.cursor.current().clone();
            self.cursor.advance_raw();
            head
        };
        let text = read_delimited(&mut self.cursor, &open)?;
        let delimiter = open.text.chars().next().unwrap_or('\'');

        let node = match operator {
            "q" => Node::Str(unescape_single(&text, delimiter)),
            "qq" => self.interpolate(&text, span)?,
            "qw" => Node::Words(text.split_whitespace().map(str::to_string).collect()),
            _ => Node::Command(Box::new(self.interpolate(&text, span)?)),
        };
        Ok(Some(node))
    }

    /// Variable after its sigil (already consumed). No trivia is allowed
    /// between sigil and name.
    pub(super) fn parse_variable(&mut self, sigil: Sigil) -> Result<Node, ParseError> {
        let token = self.cursor.current().clone();
        match token.kind {
            TokenKind::Identifier => {
                self.cursor.advance_raw();
                let name = self.qualified_name(&token.text);
                Ok(Node::variable(sigil, &name))
            }
            TokenKind::Number => {
                self.cursor.advance_raw();
                Ok(Node::variable(sigil, &token.text))
            }
            TokenKind::Operator => self.parse_punctuation_variable(sigil, &token),
            _ => Err(unexpected(&token, "a variable name")),
        }
    }

    fn parse_punctuation_variable(&mut self, sigil: Sigil, token: &Token) -> Result<Node, ParseError> {
        let next = self.cursor.raw(1).clone();
        let names_something = next.kind == TokenKind::Identifier
            || next.is_operator("{")
            || next.is_operator("$")
            || next.is_operator("::");

        match token.text.as_str() {
            "#" if sigil == Sigil::Scalar && names_something => {
                self.cursor.advance_raw();
                self.parse_variable(Sigil::ArrayLength)
            }
            "{" => {
                self.cursor.advance_raw();
                if self.cursor.current().kind == TokenKind::Identifier
                    && self.cursor.raw(1).is_operator("}")
                {
                    let name = self.cursor.current().text.clone();
                    self.cursor.advance_raw();
                    self.cursor.advance_raw();
                    return Ok(Node::variable(sigil, &name));
                }
                let target = self.parse_expression()?;
                self.expect_operator("}")?;
                Ok(Node::Deref {
                    sigil,
                    target: Box::new(target),
                })
            }
            "$" if names_something => {
                self.cursor.advance_raw();
                let inner = self.parse_variable(Sigil::Scalar)?;
                Ok(Node::Deref {
                    sigil,
                    target: Box::new(inner),
                })
            }
            "^" if next.kind == TokenKind::Identifier => {
                self.cursor.advance_raw();
                self.cursor.advance_raw();
                Ok(Node::variable(sigil, &format!("^{}", next.text)))
            }
            "::" if next.kind == TokenKind::Identifier => {
                self.cursor.advance_raw();
                self.cursor.advance_raw();
                let name = self.qualified_name(&next.text);
                Ok(Node::variable(sigil, &format!("main::{name}")))
            }
            _ if matches!(sigil, Sigil::Scalar | Sigil::Array | Sigil::Hash) => {
                let head = if let Some(head) = self.cursor.split_operator() {
                    head
                } else {
                    self.cursor.advance_raw();
                    token.clone()
                };
                if PUNCTUATION_VARIABLES.contains(&head.text.as_str()) {
                    Ok(Node::variable(sigil, &head.text))
                } else {
                    Err(ParseError::syntax(
                        format!("unexpected '{}' after sigil", head.text),
                        head.span,
                    ))
                }
            }
            _ => Err(unexpected(token, "a variable name")),
        }
    }
}

/// Nodes a bare `[` or `{` subscripts.
const fn is_subscriptable(node: &Node) -> bool {
    matches!(
        node,
        Node::Variable {
            sigil: Sigil::Scalar,
            ..
        } | Node::Deref {
            sigil: Sigil::Scalar,
            ..
        } | Node::Index { .. }
    )
}

/// Nodes `(` invokes directly (`&name(...)`, `&$code(...)`).
const fn is_code(node: &Node) -> bool {
    matches!(
        node,
        Node::Variable {
            sigil: Sigil::Code,
            ..
        } | Node::Deref {
            sigil: Sigil::Code,
            ..
        }
    )
}
