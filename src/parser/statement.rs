use log::debug;

use super::{Parser, unexpected};
use crate::ast::{Branch, Node, Program, Sigil};
use crate::builtins::invalid_prototype_char;
use crate::error::{ParseError, ParseErrorKind};
use crate::quote::read_delimited;
use crate::token::TokenKind;

/// Keywords that turn the preceding expression into a modified statement.
const MODIFIERS: &[&str] = &["if", "unless", "while", "until", "for", "foreach"];

impl Parser<'_> {
    /// Parses the whole input.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error. A heredoc still pending when input
    /// runs out is reported as unterminated.
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let statements = self.parse_statements(false)?;
        self.resolve_all_pending()?;
        debug!(
            "parsed {} statement(s), {} heredoc(s)",
            statements.len(),
            self.heredocs.len()
        );
        Ok(Program { statements })
    }

    fn parse_statements(&mut self, in_block: bool) -> Result<Vec<Node>, ParseError> {
        let mut statements = Vec::new();
        loop {
            let token = self.peek()?;
            if token.is_eof() {
                if in_block {
                    return Err(unexpected(token, "'}'"));
                }
                break;
            }
            if in_block && token.is_operator("}") {
                break;
            }
            if let Some(statement) = self.parse_statement()? {
                statements.push(statement);
            }
        }
        Ok(statements)
    }

    /// `{ STATEMENTS }`.
    pub(super) fn parse_block(&mut self) -> Result<Vec<Node>, ParseError> {
        self.expect_operator("{")?;
        let statements = self.parse_statements(true)?;
        self.expect_operator("}")?;
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Option<Node>, ParseError> {
        let token = self.peek()?.clone();
        if token.is_operator(";") {
            self.cursor.advance_raw();
            return Ok(None);
        }
        if token.is_operator("{") {
            return Ok(Some(Node::Block(self.parse_block()?)));
        }
        if token.kind == TokenKind::Identifier {
            match token.text.as_str() {
                "package" => return self.parse_package().map(Some),
                "sub" => {
                    if let Some(declaration) = self.parse_sub_declaration()? {
                        return Ok(Some(declaration));
                    }
                }
                "if" | "unless" => return self.parse_if().map(Some),
                "while" | "until" => return self.parse_while().map(Some),
                "for" | "foreach" => return self.parse_foreach().map(Some),
                _ => {}
            }
        }

        let expression = self.parse_expression()?;
        let statement = self.parse_modifier(expression)?;
        self.end_statement()?;
        Ok(Some(statement))
    }

    fn parse_modifier(&mut self, statement: Node) -> Result<Node, ParseError> {
        let token = self.peek()?;
        if token.kind != TokenKind::Identifier || !MODIFIERS.contains(&token.text.as_str()) {
            return Ok(statement);
        }
        let keyword = token.text.clone();
        self.cursor.advance_raw();
        let condition = self.parse_expression()?;
        Ok(Node::Modified {
            keyword,
            condition: Box::new(condition),
            statement: Box::new(statement),
        })
    }

    /// A statement ends at `;`, or without one before `}` or end of input.
    fn end_statement(&mut self) -> Result<(), ParseError> {
        let token = self.peek()?;
        if token.is_operator(";") {
            self.cursor.advance_raw();
            return Ok(());
        }
        if token.is_operator("}") || token.is_eof() {
            return Ok(());
        }
        Err(unexpected(token, "';'"))
    }

    /// `package NAME;` switches the current namespace; `package NAME BLOCK`
    /// switches it for the block only.
    fn parse_package(&mut self) -> Result<Node, ParseError> {
        self.cursor.advance_raw();
        let first = self.expect_identifier("package name")?;
        let name = self.qualified_name(&first.text);

        if self.peek()?.is_operator("{") {
            let outer = std::mem::replace(&mut self.package, name.clone());
            let body = self.parse_block();
            self.package = outer;
            let mut statements = vec![Node::Package(name)];
            statements.extend(body?);
            return Ok(Node::Block(statements));
        }

        self.end_statement()?;
        debug!("package {name}");
        self.package.clone_from(&name);
        Ok(Node::Package(name))
    }

    /// `sub NAME [(PROTO)] BLOCK` or the forward declaration `sub NAME;`.
    /// Returns `None` (cursor untouched) for an anonymous `sub`.
    fn parse_sub_declaration(&mut self) -> Result<Option<Node>, ParseError> {
        let checkpoint = self.checkpoint();
        self.cursor.advance_raw();
        let token = self.peek()?.clone();
        if token.kind != TokenKind::Identifier {
            self.rollback(checkpoint);
            return Ok(None);
        }
        self.cursor.advance_raw();
        let name = self.qualified_name(&token.text);

        let prototype = if self.peek()?.is_operator("(") {
            let open = self.next_token()?;
            let text: String = read_delimited(&mut self.cursor, &open)?
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            if let Some(character) = invalid_prototype_char(&text) {
                return Err(ParseError::new(
                    ParseErrorKind::MalformedPrototype {
                        name,
                        character,
                    },
                    open.span,
                ));
            }
            Some(text)
        } else {
            None
        };
        debug!("sub {name} prototype {prototype:?}");
        self.subs.insert(name.clone(), prototype.clone());

        let body = if self.eat_operator(";")? {
            None
        } else {
            Some(self.parse_block()?)
        };
        Ok(Some(Node::SubDecl {
            name,
            prototype,
            body,
        }))
    }

    fn parse_condition(&mut self) -> Result<Node, ParseError> {
        self.expect_operator("(")?;
        let condition = self.parse_expression()?;
        self.expect_operator(")")?;
        Ok(condition)
    }

    fn parse_if(&mut self) -> Result<Node, ParseError> {
        let keyword = self.next_token()?;
        let condition = self.parse_condition()?;
        let body = self.parse_block()?;
        let mut branches = vec![Branch { condition, body }];

        while self.eat_identifier("elsif")? {
            let condition = self.parse_condition()?;
            let body = self.parse_block()?;
            branches.push(Branch { condition, body });
        }
        let otherwise = if self.eat_identifier("else")? {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Node::If {
            negated: keyword.text == "unless",
            branches,
            otherwise,
        })
    }

    fn parse_while(&mut self) -> Result<Node, ParseError> {
        let keyword = self.next_token()?;
        let condition = self.parse_condition()?;
        let body = self.parse_block()?;
        Ok(Node::While {
            until: keyword.text == "until",
            condition: Box::new(condition),
            body,
        })
    }

    /// `foreach [my] $var (LIST) BLOCK` and `foreach (LIST) BLOCK`.
    fn parse_foreach(&mut self) -> Result<Node, ParseError> {
        self.cursor.advance_raw();
        let declarator = if self.eat_identifier("my")? {
            Some("my")
        } else if self.eat_identifier("our")? {
            Some("our")
        } else {
            None
        };

        let variable = if self.peek()?.is_operator("$") {
            self.cursor.advance_raw();
            let variable = self.parse_variable(Sigil::Scalar)?;
            Some(Box::new(match declarator {
                Some(declarator) => Node::Declare {
                    declarator: declarator.to_string(),
                    target: Box::new(variable),
                },
                None => variable,
            }))
        } else {
            None
        };

        self.expect_operator("(")?;
        let list = Node::List(self.parse_enclosed_list(")")?);
        let body = self.parse_block()?;
        Ok(Node::Foreach {
            variable,
            list: Box::new(list),
            body,
        })
    }
}
