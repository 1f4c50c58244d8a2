//! Line-oriented document parser.
//!
//! Drives the container stack, the line cursor and paragraph accumulation,
//! and offers every non-blank line to the configured [`BlockRule`]s in
//! order. The first rule that matches wins.

use std::fmt;
use std::sync::Arc;

use memchr::memchr2;

use super::bundle::bundle;
use super::container::{ContainerId, ContainerKind, ContainerStack, ROOT};
use super::node::Block;
use crate::cursor::Cursor;
use crate::limits::MAX_BLOCK_NESTING;
use crate::text::Text;

/// Outcome of offering a line to a block rule.
#[derive(Debug)]
pub enum BlockParse {
    /// The rule does not apply; try the next one.
    NoMatch,
    /// A complete block; the rule has advanced past its lines.
    Block(Block),
    /// Open a nested container; the rule has reset the line start past the
    /// container marker.
    Container(ContainerKind),
}

/// One block grammar rule.
///
/// Rules are stateless and shared between parses; all per-parse state lives
/// in the [`DocumentParser`] they are handed.
pub trait BlockRule: fmt::Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Whether the rule is tried on lines that would otherwise continue a
    /// paragraph.
    fn may_interrupt_paragraph(&self) -> bool {
        true
    }

    /// Whether the parser state is saved before the rule runs and restored
    /// when it returns [`BlockParse::NoMatch`].
    fn restorable(&self) -> bool {
        false
    }

    fn parse(&self, doc: &mut DocumentParser<'_>) -> BlockParse;
}

#[derive(Debug, Clone, Copy)]
struct LineState {
    /// Start of the next line, `None` once the input is exhausted.
    next: Option<usize>,
    /// Line start after the container prefixes that were consumed.
    start: usize,
    content_start: usize,
    /// End of the line, excluding the line terminator.
    content_end: usize,
    has_newline: bool,
    /// Columns of leading whitespace (a tab counts as four).
    indent: usize,
    empty: bool,
    prev_empty: bool,
}

/// Saved cursor state of a [`DocumentParser`].
#[derive(Debug, Clone, Copy)]
pub struct Snapshot {
    line: LineState,
    current: ContainerId,
}

/// Stateful single-use block parser.
pub struct DocumentParser<'a> {
    input: &'a str,
    rules: &'a [Arc<dyn BlockRule>],
    definition_lists: bool,
    stack: ContainerStack,
    /// Deepest container continued by the current line.
    current: ContainerId,
    line: LineState,
    /// Paragraph lines collected so far, while a line is offered to the
    /// rules that may interrupt a paragraph.
    pending: Option<Text>,
}

impl<'a> DocumentParser<'a> {
    pub fn new(input: &'a str, rules: &'a [Arc<dyn BlockRule>], definition_lists: bool) -> Self {
        let mut parser = Self {
            input,
            rules,
            definition_lists,
            stack: ContainerStack::new(),
            current: ROOT,
            line: LineState {
                next: Some(0),
                start: 0,
                content_start: 0,
                content_end: 0,
                has_newline: false,
                indent: 0,
                empty: true,
                prev_empty: false,
            },
            pending: None,
        };
        parser.next_line();
        parser
    }

    /// Parse the whole input into a `Block::Document`.
    pub fn parse(mut self) -> Block {
        log::debug!("block parsing {} bytes with {} rules", self.input.len(), self.rules.len());
        while !self.finished() {
            if self.line.empty {
                if let Some(enclosing) = self.stack.outermost_indent_required(self.current) {
                    self.close_to(enclosing);
                }
                self.next_line();
                continue;
            }
            self.close_to(self.current);
            self.current = self.stack.innermost();
            match self.try_rules(false) {
                BlockParse::Block(block) => {
                    self.stack.append(block);
                    continue;
                }
                BlockParse::Container(kind) => {
                    self.current = self.stack.push(kind);
                    continue;
                }
                BlockParse::NoMatch => {}
            }
            self.parse_paragraph();
        }
        let definition_lists = self.definition_lists;
        self.stack.finish(&mut |blocks| bundle(blocks, definition_lists))
    }

    fn parse_paragraph(&mut self) {
        let mut lines = Text::new();
        lines.append_line(self.trimmed_content(), self.has_hard_break());
        self.pending = Some(lines);
        self.next_line();
        while !self.finished() && !self.line.empty {
            let current = self.current;
            match self.try_rules(true) {
                BlockParse::Block(block) => {
                    self.flush_paragraph(current);
                    self.stack.append(block);
                    return;
                }
                BlockParse::Container(kind) => {
                    self.flush_paragraph(current);
                    self.current = self.stack.push(kind);
                    return;
                }
                BlockParse::NoMatch => {}
            }
            let (line, hard_break) = (self.trimmed_content(), self.has_hard_break());
            if let Some(lines) = self.pending.as_mut() {
                lines.append_line(line, hard_break);
            }
            self.next_line();
        }
        if let Some(lines) = self.pending.take() {
            self.stack.append(Block::Paragraph(lines.finalized()));
        }
    }

    /// Emit the pending paragraph into the innermost container, then close
    /// the containers the interrupting line did not continue.
    fn flush_paragraph(&mut self, current: ContainerId) {
        if let Some(lines) = self.pending.take() {
            self.stack.append(Block::Paragraph(lines.finalized()));
            self.close_to(current);
        }
    }

    fn try_rules(&mut self, interrupting: bool) -> BlockParse {
        let rules = self.rules;
        for rule in rules {
            if interrupting && !rule.may_interrupt_paragraph() {
                continue;
            }
            let result = if rule.restorable() {
                let snapshot = self.snapshot();
                let result = rule.parse(self);
                if matches!(result, BlockParse::NoMatch) {
                    log::trace!("rule {} rolled back", rule.name());
                    self.restore(snapshot);
                }
                result
            } else {
                rule.parse(self)
            };
            if !matches!(result, BlockParse::NoMatch) {
                log::trace!("rule {} matched", rule.name());
                return result;
            }
        }
        BlockParse::NoMatch
    }

    fn close_to(&mut self, target: ContainerId) {
        let definition_lists = self.definition_lists;
        self.stack.close_to(target, &mut |blocks| bundle(blocks, definition_lists));
    }

    /// Advance to the next line, matching it against the open containers.
    pub fn next_line(&mut self) {
        let Some(start) = self.line.next else {
            return;
        };
        let bytes = self.input.as_bytes();
        let prev_empty = self.line.empty;
        if start >= bytes.len() {
            let end = bytes.len();
            self.line = LineState {
                next: None,
                start: end,
                content_start: end,
                content_end: end,
                has_newline: false,
                indent: 0,
                empty: true,
                prev_empty,
            };
            return;
        }
        let (content_end, next, has_newline) = match memchr2(b'\n', b'\r', &bytes[start..]) {
            Some(offset) => {
                let i = start + offset;
                let next = if bytes[i] == b'\r' && bytes.get(i + 1) == Some(&b'\n') { i + 2 } else { i + 1 };
                (i, next, true)
            }
            None => (bytes.len(), bytes.len(), false),
        };
        let (line_start, current) = self.stack.parse_indent(&bytes[..content_end], start);
        self.current = current;
        self.line = LineState {
            next: Some(next),
            start: line_start,
            content_start: line_start,
            content_end,
            has_newline,
            indent: 0,
            empty: true,
            prev_empty,
        };
        self.reset_line_start(line_start);
    }

    /// Move the line start to `pos` and recompute indentation and blankness.
    pub fn reset_line_start(&mut self, pos: usize) {
        let bytes = self.input.as_bytes();
        if pos > self.line.start {
            self.line.start = pos.min(self.line.content_end);
        }
        let mut indent = 0;
        let mut i = self.line.start;
        let mut empty = true;
        while i < self.line.content_end {
            match bytes[i] {
                b' ' => indent += 1,
                b'\t' => indent += 4,
                _ => {
                    empty = false;
                    break;
                }
            }
            i += 1;
        }
        self.line.content_start = i;
        self.line.indent = indent;
        self.line.empty = empty;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            line: self.line,
            current: self.current,
        }
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.line = snapshot.line;
        self.current = snapshot.current;
    }

    /// The input is exhausted.
    #[inline]
    pub fn finished(&self) -> bool {
        self.line.next.is_none()
    }

    /// Columns of indentation before the line content.
    #[inline]
    pub fn line_indent(&self) -> usize {
        self.line.indent
    }

    /// Indentation below the code-block threshold.
    #[inline]
    pub fn short_line_indent(&self) -> bool {
        self.line.indent < 4
    }

    #[inline]
    pub fn line_empty(&self) -> bool {
        self.line.empty
    }

    #[inline]
    pub fn prev_line_empty(&self) -> bool {
        self.line.prev_empty
    }

    /// The line does not continue every open container.
    #[inline]
    pub fn lazy_continuation(&self) -> bool {
        self.current != self.stack.innermost()
    }

    /// A blank line at this position closes an open blockquote.
    pub fn blank_line_closes_container(&self) -> bool {
        self.stack.outermost_indent_required(self.current).is_some()
    }

    /// Whether another container may be nested at the current depth.
    pub fn can_open_container(&self) -> bool {
        self.stack.depth() <= MAX_BLOCK_NESTING
    }

    /// Full input text.
    #[inline]
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Offset of the first non-whitespace byte of the line.
    #[inline]
    pub fn content_start(&self) -> usize {
        self.line.content_start
    }

    /// Offset of the line terminator.
    #[inline]
    pub fn content_end(&self) -> usize {
        self.line.content_end
    }

    /// First content byte, if the line is not blank.
    #[inline]
    pub fn first_byte(&self) -> Option<u8> {
        if self.line.empty {
            None
        } else {
            Some(self.input.as_bytes()[self.line.content_start])
        }
    }

    /// The line content, without leading indentation or terminator.
    #[inline]
    pub fn content(&self) -> &'a str {
        &self.input[self.line.content_start..self.line.content_end]
    }

    /// Cursor over the line content.
    #[inline]
    pub fn cursor(&self) -> Cursor<'a> {
        Cursor::with_bounds(self.input.as_bytes(), self.line.content_start, self.line.content_end)
    }

    /// The line after container prefixes, with a normalized `\n` terminator.
    pub fn line_text(&self) -> String {
        self.line_text_from(self.line.start)
    }

    /// The line from `pos`, with a normalized `\n` terminator.
    pub fn line_text_from(&self, pos: usize) -> String {
        let mut line = self.input[pos..self.line.content_end].to_owned();
        if self.line.has_newline {
            line.push('\n');
        }
        line
    }

    /// The line with up to `columns` of indentation removed.
    pub fn line_text_unindented(&self, columns: usize) -> String {
        let bytes = self.input.as_bytes();
        let mut i = self.line.start;
        let mut indent = 0;
        while i < self.line.content_end && indent < columns {
            match bytes[i] {
                b' ' => indent += 1,
                b'\t' => indent += 4,
                _ => break,
            }
            i += 1;
        }
        self.line_text_from(i)
    }

    /// Content with trailing spaces and tabs removed.
    pub fn trimmed_content(&self) -> &'a str {
        self.content().trim_end_matches([' ', '\t'])
    }

    /// The line ends in two or more spaces.
    pub fn has_hard_break(&self) -> bool {
        let end = self.line.content_end;
        end >= self.line.start + 2 && self.input.as_bytes()[end - 2..end] == *b"  "
    }

    /// Paragraph lines waiting to be emitted, if a paragraph is open.
    pub fn pending_paragraph(&self) -> Option<&Text> {
        self.pending.as_ref()
    }

    /// Take ownership of the pending paragraph lines.
    pub fn take_paragraph(&mut self) -> Option<Text> {
        self.pending.take()
    }
}
