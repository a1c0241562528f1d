//! Heredoc placeholders, the pending-body queue, and body extraction.
//!
//! A heredoc is announced by `<<LABEL` somewhere in a line but its body
//! starts on the line after it. The parser registers a [`Heredoc`] when it
//! sees the operator, embeds the shared [`HeredocRef`] in the tree right
//! away, and fills its content in place once the line's newline is crossed.
//!
//! The queue is a ledger of every registration in source order. Its length
//! is what speculative parses snapshot: rolling back truncates the ledger so
//! an abandoned trial leaves no phantom registrations behind.

use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use log::debug;

use crate::ast::Node;
use crate::cursor::TokenCursor;
use crate::error::{ParseError, ParseErrorKind};
use crate::quote::read_delimited;
use crate::token::{Span, TokenKind};

/// How the body text is interpreted once found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteKind {
    /// `<<'END'` or `<<\END`: literal text.
    Raw,
    /// `<<"END"` or `<<END`: double-quote interpolation.
    Interpolated,
    /// `` <<`END` ``: interpolated, then run as a shell command.
    Command,
}

/// Lifecycle of one heredoc occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeredocState {
    /// Delimiter recognized, not yet queued.
    Announced,
    /// Waiting for the end of its line.
    Queued,
    /// Content slot filled. Terminal.
    Resolved,
    /// Body could not be read. Terminal; the content slot stays empty.
    Failed,
}

/// Placeholder for a heredoc body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heredoc {
    pub quote: QuoteKind,
    /// `<<~` form: remove the terminator's indentation from every line.
    pub strip_indent: bool,
    pub label: String,
    pub state: HeredocState,
    /// `None` until resolved.
    pub content: Option<Node>,
    /// Position of the `<<` operator.
    pub span: Span,
}

impl Heredoc {
    #[must_use]
    pub const fn new(quote: QuoteKind, strip_indent: bool, label: String, span: Span) -> Self {
        Self {
            quote,
            strip_indent,
            label,
            state: HeredocState::Announced,
            content: None,
            span,
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.state == HeredocState::Resolved
    }

    fn fail(&mut self) {
        self.state = HeredocState::Failed;
    }

    fn resolve(&mut self, content: Node) {
        self.content = Some(content);
        self.state = HeredocState::Resolved;
    }
}

/// Shared handle to a placeholder. The tree and the queue hold the same
/// allocation, so resolving through the queue is visible in the tree.
pub type HeredocRef = Rc<RefCell<Heredoc>>;

#[derive(Debug)]
struct Entry {
    doc: HeredocRef,
    /// Token index just past the terminator line, once resolved.
    body_end: Option<usize>,
}

/// One run of body extraction that started right after a newline.
#[derive(Debug)]
struct Drain {
    start: usize,
    docs: Range<usize>,
    resume: usize,
}

/// FIFO of heredocs waiting for their line to end.
#[derive(Debug, Default)]
pub struct HeredocQueue {
    entries: Vec<Entry>,
    next: usize,
    drains: Vec<Drain>,
}

impl HeredocQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a placeholder and returns the shared handle to embed.
    pub fn push(&mut self, mut doc: Heredoc) -> HeredocRef {
        doc.state = HeredocState::Queued;
        debug!(
            "heredoc #{} queued: <<{} ({:?})",
            self.entries.len(),
            doc.label,
            doc.quote
        );
        let doc = Rc::new(RefCell::new(doc));
        self.entries.push(Entry {
            doc: Rc::clone(&doc),
            body_end: None,
        });
        doc
    }

    /// Number of registrations so far, resolved or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of registrations still waiting for a body.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.entries.len() - self.next
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.next < self.entries.len()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&HeredocRef> {
        self.entries.get(index).map(|entry| &entry.doc)
    }

    /// Oldest placeholder still waiting, if any.
    #[must_use]
    pub fn front(&self) -> Option<&HeredocRef> {
        self.get(self.next)
    }

    /// Forgets every registration at or after `len`.
    ///
    /// Drains that consumed bodies of surviving registrations are kept (their
    /// resume point clamped to the last survivor) so those bodies are never
    /// scanned twice.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.entries.len() {
            return;
        }
        debug!(
            "heredoc ledger truncated from {} to {len}",
            self.entries.len()
        );
        self.entries.truncate(len);
        self.next = self.next.min(len);

        let entries = &self.entries;
        self.drains.retain_mut(|drain| {
            if drain.docs.start >= len {
                return false;
            }
            if drain.docs.end > len {
                drain.docs.end = len;
                match entries[len - 1].body_end {
                    Some(end) => drain.resume = end,
                    None => return false,
                }
            }
            true
        });
    }

    /// Pops the oldest pending placeholder with its ledger index.
    pub(crate) fn next_pending(&mut self) -> Option<(usize, HeredocRef)> {
        let entry = self.entries.get(self.next)?;
        let item = (self.next, Rc::clone(&entry.doc));
        self.next += 1;
        Some(item)
    }

    /// Where a previous drain starting at `start` left the cursor.
    pub(crate) fn resume_point(&self, start: usize) -> Option<usize> {
        self.drains
            .iter()
            .rev()
            .find(|drain| drain.start == start)
            .map(|drain| drain.resume)
    }

    /// Records that ledger entry `index` was resolved by a drain that began
    /// at `start`, with its body ending at `resume`.
    pub(crate) fn record_drain(&mut self, start: usize, index: usize, resume: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.body_end = Some(resume);
        }
        if let Some(drain) = self.drains.iter_mut().rev().find(|d| d.start == start) {
            if drain.docs.end == index {
                drain.docs.end = index + 1;
                drain.resume = resume;
                return;
            }
        }
        self.drains.push(Drain {
            start,
            docs: index..index + 1,
            resume,
        });
    }

    /// Fills a placeholder's content slot.
    pub(crate) fn resolve(doc: &HeredocRef, content: Node) {
        let mut doc = doc.borrow_mut();
        debug!("heredoc <<{} resolved", doc.label);
        doc.resolve(content);
    }

    pub(crate) fn fail(doc: &HeredocRef) {
        let mut doc = doc.borrow_mut();
        debug!("heredoc <<{} failed", doc.label);
        doc.fail();
    }
}

/// Reads the delimiter that follows a `<<` operator (already consumed) and
/// builds an announced placeholder.
///
/// # Errors
///
/// Returns a syntax error when no valid delimiter form follows.
pub fn parse_delimiter(cursor: &mut TokenCursor, span: Span) -> Result<Heredoc, ParseError> {
    let strip_indent = cursor.current().is_operator("~");
    if strip_indent {
        cursor.advance_raw();
    }

    // Whitespace is tolerated only in front of a quoted label.
    if cursor.current().kind == TokenKind::Whitespace && is_quote(&cursor.raw(1).text) {
        cursor.advance_raw();
    }

    let token = cursor.current().clone();
    let (quote, label) = match token.kind {
        TokenKind::Identifier => {
            cursor.advance_raw();
            (QuoteKind::Interpolated, token.text)
        }
        TokenKind::Operator
            if token.text == "\\" && cursor.raw(1).kind == TokenKind::Identifier =>
        {
            cursor.advance_raw();
            let label = cursor.current().text.clone();
            cursor.advance_raw();
            (QuoteKind::Raw, label)
        }
        TokenKind::Operator if is_quote(&token.text) => {
            cursor.advance_raw();
            let label = read_delimited(cursor, &token)?;
            let quote = match token.text.as_str() {
                "'" => QuoteKind::Raw,
                "`" => QuoteKind::Command,
                _ => QuoteKind::Interpolated,
            };
            (quote, label)
        }
        _ => {
            return Err(ParseError::syntax(
                "use of bare << to mean <<\"\" is forbidden",
                span,
            ));
        }
    };

    Ok(Heredoc::new(quote, strip_indent, label, span))
}

fn is_quote(text: &str) -> bool {
    matches!(text, "'" | "\"" | "`")
}

/// Reads the body of `doc` line by line from the raw stream, leaving the
/// cursor after the terminator line. Returns the body with `\n` after every
/// line and indentation removed for `<<~`.
///
/// # Errors
///
/// `UnterminatedHeredoc` when input ends before the terminator line;
/// `IndentationMismatch` when a `<<~` body line lacks the terminator's
/// indentation.
pub fn read_body(cursor: &mut TokenCursor, doc: &Heredoc) -> Result<String, ParseError> {
    let mut lines = Vec::new();
    loop {
        let Some(line) = cursor.read_raw_line() else {
            return Err(ParseError::new(
                ParseErrorKind::UnterminatedHeredoc {
                    label: doc.label.clone(),
                },
                doc.span,
            ));
        };

        let candidate = if doc.strip_indent {
            line.trim_start_matches([' ', '\t'])
        } else {
            line.as_str()
        };

        if candidate == doc.label {
            if doc.strip_indent {
                let prefix = &line[..line.len() - candidate.len()];
                lines = strip_indentation(lines, prefix, doc)?;
            }
            return Ok(lines.iter().map(|line| format!("{line}\n")).collect());
        }

        lines.push(line);
    }
}

/// Removes `prefix` from every line. Whitespace-only lines are exempt and
/// become empty when shorter than the prefix.
fn strip_indentation(
    lines: Vec<String>,
    prefix: &str,
    doc: &Heredoc,
) -> Result<Vec<String>, ParseError> {
    lines
        .into_iter()
        .map(|line| {
            if let Some(rest) = line.strip_prefix(prefix) {
                Ok(rest.to_string())
            } else if line.trim_start_matches([' ', '\t']).is_empty() {
                Ok(String::new())
            } else {
                Err(ParseError::new(
                    ParseErrorKind::IndentationMismatch {
                        label: doc.label.clone(),
                    },
                    doc.span,
                ))
            }
        })
        .collect()
}
