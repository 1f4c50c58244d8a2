//! Blockquote (`>`) containers.

use super::container::ContainerKind;
use super::parser::{BlockParse, BlockRule, DocumentParser};

#[derive(Debug, Default, Clone, Copy)]
pub struct BlockquoteRule;

impl BlockRule for BlockquoteRule {
    fn name(&self) -> &str {
        "blockquote"
    }

    fn parse(&self, doc: &mut DocumentParser<'_>) -> BlockParse {
        if !doc.short_line_indent() || doc.first_byte() != Some(b'>') || !doc.can_open_container() {
            return BlockParse::NoMatch;
        }
        let mut cursor = doc.cursor();
        cursor.advance(1);
        cursor.eat(b' ');
        doc.reset_line_start(cursor.pos());
        BlockParse::Container(ContainerKind::Blockquote)
    }
}
