//! Argument consumption driven by a prototype over `$`, `@` and `;`.

use log::trace;

use super::Parser;
use super::ambiguity::{can_start_term, is_list_terminator};
use super::expression::NAMED_UNARY;
use crate::ast::Node;
use crate::builtins::invalid_prototype_char;
use crate::error::{ParseError, ParseErrorKind, PrototypeProblem};

impl Parser<'_> {
    /// Consumes the arguments of a call to `name` (already consumed)
    /// according to `prototype`.
    ///
    /// Parentheses are optional. Each `$` slot takes one argument at
    /// assignment precedence wrapped in [`Node::Scalar`]; without parentheses
    /// a lone `$` or `;$` prototype takes it at named-unary precedence
    /// instead. `@` takes the rest of the list. Slots after `;` may be
    /// omitted, but only where the argument list visibly ends.
    ///
    /// # Errors
    ///
    /// `MalformedPrototype` for characters outside `$@;` (or `@` before the
    /// end); `PrototypeViolation` for too few or too many arguments, a
    /// missing comma, or a slot that cannot start a term.
    pub fn parse_prototype_call(&mut self, name: &str, prototype: &str) -> Result<Vec<Node>, ParseError> {
        if let Some(character) = invalid_prototype_char(prototype) {
            let span = self.cursor.current().span;
            return Err(ParseError::new(
                ParseErrorKind::MalformedPrototype {
                    name: name.to_string(),
                    character,
                },
                span,
            ));
        }

        let parens = self.eat_operator("(")?;
        let named_unary = !parens && matches!(prototype, "$" | ";$");
        trace!("{name}({prototype}) parens={parens}");

        let mut args = Vec::new();
        let mut optional = false;
        for slot in prototype.chars() {
            if slot == ';' {
                optional = true;
                continue;
            }
            let may_stop = optional || slot == '@';

            if !args.is_empty() && !self.eat_comma()? {
                if may_stop && self.at_argument_end(parens)? {
                    break;
                }
                if self.at_argument_end(parens)? {
                    return Err(self.violation(name, PrototypeProblem::NotEnoughArguments));
                }
                return Err(self.violation(name, PrototypeProblem::ExpectedComma));
            }

            if self.at_argument_end(parens)? {
                if may_stop {
                    break;
                }
                return Err(self.violation(name, PrototypeProblem::NotEnoughArguments));
            }
            if !can_start_term(self.cursor.current(), self.cursor.raw(1)) {
                return Err(self.violation(name, PrototypeProblem::ExpectedScalar));
            }

            if slot == '@' {
                args.extend(self.parse_bare_list()?);
                break;
            }
            let arg = if named_unary {
                self.parse_binary(NAMED_UNARY + 1)?
            } else {
                self.parse_assign()?
            };
            args.push(Node::Scalar(Box::new(arg)));
        }

        if parens {
            self.skip()?;
            let token = self.cursor.current();
            if !token.is_operator(")") {
                let extra = token.is_operator(",")
                    || token.is_operator("=>")
                    || (args.is_empty() && can_start_term(token, self.cursor.raw(1)));
                let problem = if extra {
                    PrototypeProblem::TooManyArguments
                } else {
                    PrototypeProblem::ExpectedComma
                };
                return Err(self.violation(name, problem));
            }
            self.cursor.advance_raw();
        }
        Ok(args)
    }

    /// The argument list visibly ends here: `)` inside parentheses, or a
    /// list terminator.
    fn at_argument_end(&mut self, parens: bool) -> Result<bool, ParseError> {
        let token = self.peek()?;
        Ok(if parens {
            token.is_operator(")") || token.is_eof()
        } else {
            is_list_terminator(token)
        })
    }

    fn violation(&self, name: &str, problem: PrototypeProblem) -> ParseError {
        ParseError::new(
            ParseErrorKind::PrototypeViolation {
                name: name.to_string(),
                problem,
            },
            self.cursor.current().span,
        )
    }
}
