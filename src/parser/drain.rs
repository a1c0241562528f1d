use log::trace;

use super::Parser;
use crate::ast::Node;
use crate::error::ParseError;
use crate::heredoc::{self, HeredocQueue, QuoteKind};
use crate::token::{Span, Token};

impl Parser<'_> {
    /// Reads the delimiter after a `<<` (already consumed) and queues the
    /// placeholder.
    pub(super) fn register_heredoc(&mut self, operator: &Token) -> Result<Node, ParseError> {
        let doc = heredoc::parse_delimiter(&mut self.cursor, operator.span)?;
        Ok(Node::Heredoc(self.heredocs.push(doc)))
    }

    /// Called with the cursor just past a newline.
    pub(super) fn after_line_end(&mut self) -> Result<(), ParseError> {
        if self.nested {
            return Ok(());
        }
        let start = self.cursor.position();
        if let Some(resume) = self.heredocs.resume_point(start) {
            trace!("line end at token {start}: bodies already read, resuming at {resume}");
            self.cursor.seek(resume);
        }
        self.drain_from(start)
    }

    /// Resolves every pending heredoc from the current position. Used at end
    /// of input, where a pending body can only be unterminated.
    ///
    /// # Errors
    ///
    /// `UnterminatedHeredoc` or `IndentationMismatch` for the first body that
    /// cannot be read.
    pub fn resolve_all_pending(&mut self) -> Result<(), ParseError> {
        let start = self.cursor.position();
        self.drain_from(start)
    }

    /// Reads pending bodies in FIFO order. Heredocs registered while
    /// interpolating a body join the tail and are drained in the same pass.
    fn drain_from(&mut self, start: usize) -> Result<(), ParseError> {
        while let Some((index, doc)) = self.heredocs.next_pending() {
            let (body, quote, span) = {
                let placeholder = doc.borrow();
                let body = heredoc::read_body(&mut self.cursor, &placeholder);
                (body, placeholder.quote, placeholder.span)
            };
            let body = match body {
                Ok(body) => body,
                Err(err) => {
                    HeredocQueue::fail(&doc);
                    return Err(err);
                }
            };
            let origin = Span {
                line: span.line + 1,
                column: 1,
            };
            let content = match quote {
                QuoteKind::Raw => Ok(Node::Str(body)),
                QuoteKind::Interpolated => self.interpolate(&body, origin),
                QuoteKind::Command => self
                    .interpolate(&body, origin)
                    .map(|node| Node::Command(Box::new(node))),
            };
            let content = match content {
                Ok(content) => content,
                Err(err) => {
                    HeredocQueue::fail(&doc);
                    return Err(err);
                }
            };
            HeredocQueue::resolve(&doc, content);
            self.heredocs
                .record_drain(start, index, self.cursor.position());
        }
        Ok(())
    }
}
