//! Thematic breaks (`***`, `---`, `___`).

use super::node::Block;
use super::parser::{BlockParse, BlockRule, DocumentParser};

#[derive(Debug, Default, Clone, Copy)]
pub struct ThematicBreakRule;

impl BlockRule for ThematicBreakRule {
    fn name(&self) -> &str {
        "thematic-break"
    }

    fn parse(&self, doc: &mut DocumentParser<'_>) -> BlockParse {
        if !doc.short_line_indent() {
            return BlockParse::NoMatch;
        }
        let Some(marker @ (b'-' | b'_' | b'*')) = doc.first_byte() else {
            return BlockParse::NoMatch;
        };
        if !is_thematic_break(doc.content().as_bytes(), marker) {
            return BlockParse::NoMatch;
        }
        doc.next_line();
        BlockParse::Block(Block::ThematicBreak)
    }
}

/// At least three `marker` bytes, with nothing but spaces and tabs between.
fn is_thematic_break(line: &[u8], marker: u8) -> bool {
    let mut count = 0;
    for &b in line {
        match b {
            b' ' | b'\t' => {}
            _ if b == marker => count += 1,
            _ => return false,
        }
    }
    count >= 3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_thematic_break() {
        assert!(is_thematic_break(b"***", b'*'));
        assert!(is_thematic_break(b"- - -", b'-'));
        assert!(is_thematic_break(b"_\t_ _ _  ", b'_'));
        assert!(!is_thematic_break(b"--", b'-'));
        assert!(!is_thematic_break(b"*-*", b'*'));
        assert!(!is_thematic_break(b"---a", b'-'));
    }
}
