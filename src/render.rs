//! Markdown output writer.
//!
//! Renders a block tree back to Markdown text. The output is not
//! byte-for-byte the source, but parses back to the same structure.

use crate::block::{Alignment, Block, Definition, ListType, Row};
use crate::custom::Generator;
use crate::text::{Text, TextFragment};

/// Markdown writer.
///
/// # Example
/// ```
/// use markdown_tree::{MarkdownWriter, parse};
///
/// let doc = parse("Title\n=====\n\n* one\n* two");
/// assert_eq!(MarkdownWriter::render(&doc), "# Title\n\n* one\n* two\n");
/// ```
#[derive(Debug, Default)]
pub struct MarkdownWriter {
    out: String,
}

impl MarkdownWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a whole tree.
    pub fn render(block: &Block) -> String {
        let mut writer = Self::new();
        writer.write_block(block, false);
        if !writer.out.is_empty() && !writer.out.ends_with('\n') {
            writer.out.push('\n');
        }
        writer.out
    }

    pub fn into_string(self) -> String {
        self.out
    }

    pub fn write_block(&mut self, block: &Block, tight: bool) {
        match block {
            Block::Document(blocks) => self.write_blocks(blocks, false),
            Block::Blockquote(blocks) => {
                let inner = render_blocks(blocks, false);
                self.write_prefixed(&inner, "> ", ">");
            }
            Block::List { tight, items, .. } => self.write_blocks(items, *tight),
            Block::ListItem { kind, content, .. } => {
                let marker = match kind {
                    ListType::Bullet(ch) => format!("{ch} "),
                    ListType::Ordered(n, delim) => format!("{n}{delim} "),
                };
                self.write_item(&marker, content, tight);
            }
            Block::Paragraph(text) => self.write_inline(text, true),
            Block::Heading { level, text } => {
                for _ in 0..*level {
                    self.out.push('#');
                }
                if !text.is_empty() {
                    self.out.push(' ');
                    self.write_inline(text, false);
                }
            }
            Block::IndentedCode(lines) => {
                let code = lines.concat();
                for (i, line) in code.lines().enumerate() {
                    if i > 0 {
                        self.out.push('\n');
                    }
                    if !line.is_empty() {
                        self.out.push_str("    ");
                        self.out.push_str(line);
                    }
                }
            }
            Block::FencedCode { info, lines } => {
                let code = lines.concat();
                let fence = "`".repeat(longest_run(&code, '`').max(2) + 1);
                self.out.push_str(&fence);
                if let Some(info) = info {
                    self.out.push_str(info);
                }
                self.out.push('\n');
                self.out.push_str(&code);
                if !code.is_empty() && !code.ends_with('\n') {
                    self.out.push('\n');
                }
                self.out.push_str(&fence);
            }
            Block::HtmlBlock(lines) => {
                self.out.push_str(lines.concat().trim_end_matches('\n'));
            }
            Block::ReferenceDef {
                label,
                destination,
                title,
            } => {
                self.out.push('[');
                self.out.push_str(label);
                self.out.push_str("]: <");
                self.out.push_str(destination);
                self.out.push('>');
                if !title.is_empty() {
                    self.out.push_str(" \"");
                    self.out.push_str(&title.join("\n").replace('"', "\\\""));
                    self.out.push('"');
                }
            }
            Block::ThematicBreak => self.out.push_str("***"),
            Block::Table {
                header,
                alignments,
                rows,
            } => {
                self.write_row(header);
                self.out.push('\n');
                self.out.push('|');
                for alignment in alignments {
                    self.out.push_str(match alignment {
                        Alignment::Undefined => " --- |",
                        Alignment::Left => " :-- |",
                        Alignment::Right => " --: |",
                        Alignment::Center => " :-: |",
                    });
                }
                for row in rows {
                    self.out.push('\n');
                    self.write_row(row);
                }
            }
            Block::DefinitionList(defs) => {
                for (i, Definition { item, descriptions }) in defs.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str("\n\n");
                    }
                    self.write_inline(item, true);
                    for description in descriptions {
                        self.out.push('\n');
                        match description {
                            Block::ListItem { content, .. } => self.write_item(": ", content, true),
                            other => self.write_block(other, true),
                        }
                    }
                }
            }
            Block::Custom(custom) => custom.generate(self, tight),
        }
    }

    fn write_blocks(&mut self, blocks: &[Block], tight: bool) {
        for (i, block) in blocks.iter().enumerate() {
            if i > 0 {
                self.out.push_str(if tight { "\n" } else { "\n\n" });
            }
            self.write_block(block, tight);
        }
    }

    fn write_item(&mut self, marker: &str, content: &[Block], tight: bool) {
        let inner = render_blocks(content, tight);
        let indent = " ".repeat(marker.len());
        let mut lines = inner.split('\n');
        self.out.push_str(marker.trim_end());
        if let Some(first) = lines.next() {
            if !first.is_empty() {
                self.out.push(' ');
                self.out.push_str(first);
            }
        }
        for line in lines {
            self.out.push('\n');
            if !line.is_empty() {
                self.out.push_str(&indent);
                self.out.push_str(line);
            }
        }
    }

    fn write_prefixed(&mut self, inner: &str, prefix: &str, empty_prefix: &str) {
        for (i, line) in inner.split('\n').enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            if line.is_empty() {
                self.out.push_str(empty_prefix);
            } else {
                self.out.push_str(prefix);
                self.out.push_str(line);
            }
        }
    }

    fn write_row(&mut self, row: &Row) {
        self.out.push('|');
        for cell in row {
            self.out.push(' ');
            self.write_inline(cell, false);
            self.out.push_str(" |");
        }
    }

    /// Write inline content. With `breaks`, line breaks are kept;
    /// otherwise they become spaces.
    pub fn write_inline(&mut self, text: &Text, breaks: bool) {
        let mut line_start = self.out.is_empty() || self.out.ends_with('\n');
        for fragment in text {
            self.write_fragment(fragment, breaks, line_start);
            line_start = breaks && fragment.is_break();
        }
    }

    fn write_fragment(&mut self, fragment: &TextFragment, breaks: bool, line_start: bool) {
        match fragment {
            TextFragment::Text(s) => {
                if line_start {
                    self.out.push_str(&escape_line_start(s));
                } else {
                    self.out.push_str(&escape_inline(s));
                }
            }
            TextFragment::Code(code) => {
                let fence = "`".repeat(longest_run(code, '`') + 1);
                let pad = code.starts_with('`') || code.ends_with('`') || code.starts_with(' ');
                self.out.push_str(&fence);
                if pad {
                    self.out.push(' ');
                }
                self.out.push_str(code);
                if pad {
                    self.out.push(' ');
                }
                self.out.push_str(&fence);
            }
            TextFragment::Emph(inner) => {
                self.out.push('*');
                self.write_inline(inner, breaks);
                self.out.push('*');
            }
            TextFragment::Strong(inner) => {
                self.out.push_str("**");
                self.write_inline(inner, breaks);
                self.out.push_str("**");
            }
            TextFragment::Link { text, uri, title } | TextFragment::Image { text, uri, title } => {
                if matches!(fragment, TextFragment::Image { .. }) {
                    self.out.push('!');
                }
                self.out.push('[');
                self.write_inline(text, breaks);
                self.out.push_str("](<");
                self.out.push_str(uri.as_deref().unwrap_or(""));
                self.out.push('>');
                if let Some(title) = title {
                    self.out.push_str(" \"");
                    self.out.push_str(&title.replace('"', "\\\""));
                    self.out.push('"');
                }
                self.out.push(')');
            }
            TextFragment::Autolink { uri, .. } => {
                self.out.push('<');
                self.out.push_str(uri);
                self.out.push('>');
            }
            TextFragment::Html(tag) => {
                self.out.push('<');
                self.out.push_str(tag);
                self.out.push('>');
            }
            TextFragment::Delimiter { .. } => self.out.push_str(&escape_inline(&fragment.raw_text())),
            TextFragment::SoftBreak if breaks => self.out.push('\n'),
            TextFragment::HardBreak if breaks => self.out.push_str("\\\n"),
            TextFragment::SoftBreak | TextFragment::HardBreak => self.out.push(' '),
            TextFragment::Custom(custom) => custom.generate(self),
        }
    }
}

impl Generator for MarkdownWriter {
    fn output_kind(&self) -> &str {
        "markdown"
    }

    fn write_str(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn text(&mut self, text: &Text) {
        self.write_inline(text, true);
    }

    fn blocks(&mut self, blocks: &[Block], tight: bool) {
        self.write_blocks(blocks, tight);
    }
}

fn render_blocks(blocks: &[Block], tight: bool) -> String {
    let mut writer = MarkdownWriter::new();
    writer.write_blocks(blocks, tight);
    writer.out
}

fn longest_run(s: &str, ch: char) -> usize {
    let mut longest = 0;
    let mut run = 0;
    for c in s.chars() {
        if c == ch {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}

/// Backslash-escape characters that would start inline markup.
fn escape_inline(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' | '!' | '~' | '|' | '&') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Like [`escape_inline`], and also escape a character that would start a
/// block at the beginning of a line.
fn escape_line_start(s: &str) -> String {
    let trimmed = s.trim_start();
    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    let block_start = matches!(trimmed.chars().next(), Some('#' | '-' | '+' | '=' | ':'))
        || (digits > 0 && matches!(trimmed.as_bytes().get(digits), Some(b'.' | b')')));
    let escaped = escape_inline(trimmed);
    if !block_start {
        return escaped;
    }
    if digits > 0 {
        let (number, rest) = escaped.split_at(digits);
        format!("{number}\\{rest}")
    } else {
        format!("\\{escaped}")
    }
}
