//! S-expression printer for parsed programs.
//!
//! One top-level statement per line. Heredoc placeholders print their label
//! and resolved content, or `pending` when the body has not been read.

use std::fmt::Write as _;

use crate::ast::{Node, Program, Subscript};

/// Format a `Program` as S-expressions, one statement per line.
#[must_use]
pub fn format(program: &Program) -> String {
    let mut out = String::new();
    for statement in &program.statements {
        write_node(&mut out, statement);
        out.push('\n');
    }
    out
}

/// Format a single node.
#[must_use]
pub fn format_node(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Number(n) => out.push_str(n),
        Node::Str(s) => format_str(out, s),
        Node::Interpolated(parts) => format_form(out, "interp", parts),
        Node::Command(inner) => format_form(out, "command", [&**inner]),
        Node::Heredoc(doc) => {
            let doc = doc.borrow();
            out.push_str("(heredoc ");
            out.push_str(&doc.label);
            out.push(' ');
            match &doc.content {
                Some(content) => write_node(out, content),
                None => out.push_str("pending"),
            }
            out.push(')');
        }
        Node::Words(words) => {
            out.push_str("(qw");
            for word in words {
                out.push(' ');
                format_str(out, word);
            }
            out.push(')');
        }
        Node::Variable { sigil, name } => {
            out.push_str(sigil.as_str());
            out.push_str(name);
        }
        Node::Deref { sigil, target } => {
            let head = format!("deref {}", sigil.as_str());
            format_form(out, &head, [&**target]);
        }
        Node::Bareword(name) => out.push_str(name),
        Node::HandleRef(name) => {
            let _ = write!(out, "(handle {name})");
        }
        Node::Readline(source) => {
            let _ = write!(out, "(readline {source})");
        }
        Node::List(items) => format_form(out, "list", items),
        Node::AnonArray(items) => format_form(out, "array", items),
        Node::AnonHash(items) => format_form(out, "hash", items),
        Node::AnonSub(body) => format_form(out, "anon-sub", body),
        Node::Index {
            base,
            subscript,
            index,
        } => {
            let head = match subscript {
                Subscript::Array => "elem",
                Subscript::Hash => "helem",
            };
            format_form(out, head, [&**base, &**index]);
        }
        Node::Call { name, args } => format_form(out, &format!("call {name}"), args),
        Node::Invoke { target, args } => {
            format_form(out, "invoke", std::iter::once(&**target).chain(args));
        }
        Node::MethodCall {
            invocant,
            method,
            args,
        } => {
            out.push_str("(method ");
            write_node(out, invocant);
            out.push(' ');
            out.push_str(method);
            format_items(out, args);
            out.push(')');
        }
        Node::Print {
            function,
            handle,
            args,
        } => {
            out.push('(');
            out.push_str(function);
            if let Some(handle) = handle {
                out.push_str(" {");
                write_node(out, handle);
                out.push('}');
            }
            format_items(out, args);
            out.push(')');
        }
        Node::Return(value) => format_form(out, "return", value.iter().map(|v| &**v)),
        Node::Scalar(inner) => format_form(out, "scalar", [&**inner]),
        Node::Unary { op, operand } => format_form(out, op, [&**operand]),
        Node::Postfix { op, operand } => format_form(out, &format!("post{op}"), [&**operand]),
        Node::Binary { op, left, right } => format_form(out, op, [&**left, &**right]),
        Node::Assign { op, target, value } => format_form(out, op, [&**target, &**value]),
        Node::Ternary {
            condition,
            then,
            otherwise,
        } => format_form(out, "?:", [&**condition, &**then, &**otherwise]),
        Node::Declare { declarator, target } => format_form(out, declarator, [&**target]),
        Node::Do(body) => format_form(out, "do", body),
        Node::Block(body) => format_form(out, "block", body),
        Node::If {
            negated,
            branches,
            otherwise,
        } => {
            out.push_str(if *negated { "(unless" } else { "(if" });
            for (i, branch) in branches.iter().enumerate() {
                if i > 0 {
                    out.push_str(" (elsif");
                }
                out.push(' ');
                write_node(out, &branch.condition);
                out.push(' ');
                format_form(out, "block", &branch.body);
                if i > 0 {
                    out.push(')');
                }
            }
            if let Some(body) = otherwise {
                out.push_str(" (else ");
                format_form(out, "block", body);
                out.push(')');
            }
            out.push(')');
        }
        Node::While {
            until,
            condition,
            body,
        } => {
            out.push_str(if *until { "(until " } else { "(while " });
            write_node(out, condition);
            out.push(' ');
            format_form(out, "block", body);
            out.push(')');
        }
        Node::Foreach {
            variable,
            list,
            body,
        } => {
            out.push_str("(foreach");
            if let Some(variable) = variable {
                out.push(' ');
                write_node(out, variable);
            }
            out.push(' ');
            write_node(out, list);
            out.push(' ');
            format_form(out, "block", body);
            out.push(')');
        }
        Node::SubDecl {
            name,
            prototype,
            body,
        } => {
            out.push_str("(sub ");
            out.push_str(name);
            if let Some(prototype) = prototype {
                let _ = write!(out, " ({prototype})");
            }
            if let Some(body) = body {
                out.push(' ');
                format_form(out, "block", body);
            }
            out.push(')');
        }
        Node::Package(name) => {
            let _ = write!(out, "(package {name})");
        }
        Node::Modified {
            keyword,
            condition,
            statement,
        } => {
            out.push('(');
            write_node(out, statement);
            let _ = write!(out, " {keyword} ");
            write_node(out, condition);
            out.push(')');
        }
    }
}

/// `(head item item ...)`.
fn format_form<'a>(out: &mut String, head: &str, items: impl IntoIterator<Item = &'a Node>) {
    out.push('(');
    out.push_str(head);
    format_items(out, items);
    out.push(')');
}

fn format_items<'a>(out: &mut String, items: impl IntoIterator<Item = &'a Node>) {
    for item in items {
        out.push(' ');
        write_node(out, item);
    }
}

fn format_str(out: &mut String, s: &str) {
    let _ = write!(out, "{s:?}");
}
