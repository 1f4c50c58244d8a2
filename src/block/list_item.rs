//! List item containers.
//!
//! Items are parsed one by one; consecutive compatible items are grouped
//! into lists when their enclosing container closes.

use super::container::ContainerKind;
use super::node::ListType;
use super::parser::{BlockParse, BlockRule, DocumentParser};
use crate::limits::MAX_LIST_MARKER_DIGITS;

/// Bullet (`-`, `+`, `*` by default) and ordered (`1.`, `1)`) list items.
#[derive(Debug, Clone)]
pub struct ListItemRule {
    bullets: Vec<char>,
}

impl ListItemRule {
    pub fn new(bullets: impl IntoIterator<Item = char>) -> Self {
        Self {
            bullets: bullets.into_iter().collect(),
        }
    }

    pub fn bullets(&self) -> &[char] {
        &self.bullets
    }

    /// Parse the list marker at the start of `line`, returning its type and
    /// width in bytes.
    fn marker(&self, line: &[u8]) -> Option<(ListType, usize)> {
        let first = *line.first()?;
        if !first.is_ascii_digit() {
            return self
                .bullets
                .contains(&(first as char))
                .then_some((ListType::Bullet(first as char), 1));
        }
        let digits = line
            .iter()
            .take(MAX_LIST_MARKER_DIGITS)
            .take_while(|b| b.is_ascii_digit())
            .count();
        let delimiter = *line.get(digits)?;
        if !matches!(delimiter, b'.' | b')') {
            return None;
        }
        let number = line[..digits]
            .iter()
            .fold(0u64, |n, &b| n * 10 + u64::from(b - b'0'));
        Some((ListType::Ordered(number, delimiter as char), digits + 1))
    }
}

impl Default for ListItemRule {
    fn default() -> Self {
        Self::new(['-', '+', '*'])
    }
}

impl BlockRule for ListItemRule {
    fn name(&self) -> &str {
        "list-item"
    }

    fn parse(&self, doc: &mut DocumentParser<'_>) -> BlockParse {
        if !doc.short_line_indent() || !doc.can_open_container() {
            return BlockParse::NoMatch;
        }
        let Some((kind, width)) = self.marker(doc.content().as_bytes()) else {
            return BlockParse::NoMatch;
        };
        let mut cursor = doc.cursor();
        cursor.advance(width);
        let after_marker = cursor.pos();
        let mut spaces = 0;
        loop {
            match cursor.peek() {
                Some(b' ') => spaces += 1,
                Some(b'\t') => spaces += 4,
                _ => break,
            }
            cursor.advance(1);
        }
        if spaces == 0 && !cursor.is_eof() {
            return BlockParse::NoMatch;
        }
        // Blank after the marker, or indented code as the first block: the
        // content column is one past the marker.
        let start = if cursor.is_eof() || spaces > 4 {
            spaces = 1;
            if cursor.is_eof() { cursor.pos() } else { after_marker + 1 }
        } else {
            cursor.pos()
        };
        let indent = spaces + doc.line_indent() + width;
        let tight = !doc.prev_line_empty();
        doc.reset_line_start(start);
        BlockParse::Container(ContainerKind::ListItem { kind, tight, indent })
    }
}
