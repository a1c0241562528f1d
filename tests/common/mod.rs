#![allow(dead_code)]

use std::rc::Rc;

use plfront::{
    HandleTable, HeredocRef, Node, ParseError, ParseOptions, Parser, Program, format, parse_str,
    parse_with, tokenize,
};

/// Parse with default options and format, without the final newline.
pub fn dump(source: &str) -> String {
    let program = parse_str(source)
        .unwrap_or_else(|e| panic!("parse failed: {e}\n--- source ---\n{source}"));
    format(&program).trim_end_matches('\n').to_string()
}

/// Parse with explicit options and format, without the final newline.
pub fn dump_with(source: &str, options: &ParseOptions) -> String {
    let program = parse_with(source, options)
        .unwrap_or_else(|e| panic!("parse failed: {e}\n--- source ---\n{source}"));
    format(&program).trim_end_matches('\n').to_string()
}

/// Parse a source that must succeed.
pub fn program(source: &str) -> Program {
    parse_str(source).unwrap_or_else(|e| panic!("parse failed: {e}\n--- source ---\n{source}"))
}

/// Parse a source that must fail.
pub fn parse_err(source: &str) -> ParseError {
    match parse_str(source) {
        Ok(program) => panic!("expected an error, got:\n{}", format(&program)),
        Err(e) => e,
    }
}

/// Run a parser over `source` with the default handle table and hand it
/// to `check` after `parse_program`.
pub fn with_parser<T>(
    source: &str,
    check: impl FnOnce(&mut Parser<'_>, Result<Program, ParseError>) -> T,
) -> T {
    let table = HandleTable::new();
    let mut parser = Parser::new(tokenize(source), &table);
    let result = parser.parse_program();
    check(&mut parser, result)
}

/// Every heredoc placeholder reachable from the tree, in source order.
/// Placeholders announced inside another heredoc's body are not included.
pub fn heredocs(program: &Program) -> Vec<HeredocRef> {
    fn walk(node: &Node, out: &mut Vec<HeredocRef>) {
        if let Node::Heredoc(doc) = node {
            out.push(Rc::clone(doc));
        }
        for child in node.children() {
            walk(child, out);
        }
    }

    let mut out = Vec::new();
    for statement in &program.statements {
        walk(statement, &mut out);
    }
    out
}

/// Resolved content of each placeholder, as plain strings.
pub fn heredoc_texts(program: &Program) -> Vec<String> {
    heredocs(program)
        .iter()
        .map(|doc| {
            let doc = doc.borrow();
            match &doc.content {
                Some(Node::Str(text)) => text.clone(),
                other => panic!("heredoc {} has non-literal content {other:?}", doc.label),
            }
        })
        .collect()
}
