//! ATX (`## Title`) and setext (underlined) headings.

use super::node::Block;
use super::parser::{BlockParse, BlockRule, DocumentParser};
use crate::limits::MAX_HEADING_LEVEL;
use crate::text::Text;

#[derive(Debug, Default, Clone, Copy)]
pub struct AtxHeadingRule;

impl BlockRule for AtxHeadingRule {
    fn name(&self) -> &str {
        "atx-heading"
    }

    fn parse(&self, doc: &mut DocumentParser<'_>) -> BlockParse {
        if !doc.short_line_indent() {
            return BlockParse::NoMatch;
        }
        let line = doc.content().as_bytes();
        let level = line.iter().take(MAX_HEADING_LEVEL + 1).take_while(|&&b| b == b'#').count();
        if level == 0 || level > MAX_HEADING_LEVEL {
            return BlockParse::NoMatch;
        }
        if !matches!(line.get(level), None | Some(b' ' | b'\t')) {
            return BlockParse::NoMatch;
        }

        let content = heading_content(&doc.content()[level..]);
        let text = if content.is_empty() { Text::new() } else { Text::plain(content) };
        let block = Block::Heading {
            level: level as u8,
            text,
        };
        doc.next_line();
        BlockParse::Block(block)
    }
}

/// Strip surrounding whitespace and an optional closing `#` sequence.
fn heading_content(rest: &str) -> &str {
    let content = rest.trim_matches([' ', '\t']);
    let without_hashes = content.trim_end_matches('#');
    if without_hashes.is_empty() {
        return "";
    }
    if without_hashes.len() < content.len() && without_hashes.ends_with([' ', '\t']) {
        without_hashes.trim_end_matches([' ', '\t'])
    } else {
        content
    }
}

/// Turns the pending paragraph into a heading when followed by a line of
/// `=` (level 1) or `-` (level 2).
#[derive(Debug, Default, Clone, Copy)]
pub struct SetextHeadingRule;

impl BlockRule for SetextHeadingRule {
    fn name(&self) -> &str {
        "setext-heading"
    }

    fn parse(&self, doc: &mut DocumentParser<'_>) -> BlockParse {
        if !doc.short_line_indent()
            || doc.lazy_continuation()
            || doc.pending_paragraph().is_none_or(Text::is_empty)
        {
            return BlockParse::NoMatch;
        }
        let level = match doc.first_byte() {
            Some(b'=') => 1,
            Some(b'-') => 2,
            _ => return BlockParse::NoMatch,
        };
        let underline = if level == 1 { '=' } else { '-' };
        if !doc.trimmed_content().chars().all(|ch| ch == underline) {
            return BlockParse::NoMatch;
        }
        let Some(lines) = doc.take_paragraph() else {
            return BlockParse::NoMatch;
        };
        doc.next_line();
        BlockParse::Block(Block::Heading {
            level,
            text: lines.finalized(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_content() {
        assert_eq!(heading_content(" foo "), "foo");
        assert_eq!(heading_content(" foo ##  "), "foo");
        assert_eq!(heading_content(" foo#"), "foo#");
        assert_eq!(heading_content(" ###"), "");
        assert_eq!(heading_content(""), "");
        assert_eq!(heading_content(" foo \\#"), "foo \\#");
    }
}
