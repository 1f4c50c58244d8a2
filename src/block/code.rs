//! Indented and fenced code blocks.
//!
//! Both keep their lines verbatim, each with a normalized `\n` terminator
//! (the last line of the input may lack one).

use super::node::Block;
use super::parser::{BlockParse, BlockRule, DocumentParser};

/// Code indented by four or more columns.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndentedCodeRule;

impl BlockRule for IndentedCodeRule {
    fn name(&self) -> &str {
        "indented-code"
    }

    fn may_interrupt_paragraph(&self) -> bool {
        false
    }

    fn parse(&self, doc: &mut DocumentParser<'_>) -> BlockParse {
        if doc.short_line_indent() {
            return BlockParse::NoMatch;
        }
        let mut lines = vec![doc.line_text_unindented(4)];
        let mut blank = Vec::new();
        doc.next_line();
        while !doc.finished() && (!doc.short_line_indent() || doc.line_empty()) {
            if doc.line_empty() {
                if doc.blank_line_closes_container() {
                    break;
                }
                blank.push(doc.line_text_unindented(4));
            } else {
                if doc.lazy_continuation() {
                    break;
                }
                lines.append(&mut blank);
                lines.push(doc.line_text_unindented(4));
            }
            doc.next_line();
        }
        BlockParse::Block(Block::IndentedCode(lines))
    }
}

/// Code between ```` ``` ```` or `~~~` fences.
#[derive(Debug, Default, Clone, Copy)]
pub struct FencedCodeRule;

impl BlockRule for FencedCodeRule {
    fn name(&self) -> &str {
        "fenced-code"
    }

    fn parse(&self, doc: &mut DocumentParser<'_>) -> BlockParse {
        if !doc.short_line_indent() {
            return BlockParse::NoMatch;
        }
        let Some(fence @ (b'`' | b'~')) = doc.first_byte() else {
            return BlockParse::NoMatch;
        };
        let content = doc.content();
        let fence_len = content.bytes().take_while(|&b| b == fence).count();
        if fence_len < 3 {
            return BlockParse::NoMatch;
        }
        let info = content[fence_len..].trim_matches([' ', '\t']);
        if info.contains(['`', '~']) {
            return BlockParse::NoMatch;
        }
        let fence_indent = doc.line_indent();
        doc.next_line();

        let mut lines = Vec::new();
        let mut closed = false;
        while !doc.finished() {
            if doc.line_empty() {
                if doc.blank_line_closes_container() {
                    break;
                }
            } else if doc.lazy_continuation() {
                break;
            } else if doc.short_line_indent() && is_closing_fence(doc.content(), fence, fence_len) {
                closed = true;
                break;
            }
            lines.push(doc.line_text_unindented(fence_indent));
            doc.next_line();
        }
        if closed {
            doc.next_line();
        }
        BlockParse::Block(Block::FencedCode {
            info: (!info.is_empty()).then(|| info.to_owned()),
            lines,
        })
    }
}

fn is_closing_fence(line: &str, fence: u8, min_len: usize) -> bool {
    let len = line.bytes().take_while(|&b| b == fence).count();
    len >= min_len && line[len..].trim_matches([' ', '\t']).is_empty()
}
