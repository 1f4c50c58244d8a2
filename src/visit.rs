//! Read-only traversal of a parsed tree.
//!
//! Override the `visit_*` methods of interest; the defaults recurse through
//! the matching `walk_*` function. Custom nodes are leaves here, renderers
//! reach their content through [`Generator`](crate::Generator).

use crate::block::{Block, Definition, Row};
use crate::text::{Text, TextFragment};

pub trait Visitor {
    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_text(&mut self, text: &Text) {
        walk_text(self, text);
    }

    fn visit_fragment(&mut self, fragment: &TextFragment) {
        walk_fragment(self, fragment);
    }
}

pub fn walk_block<V: Visitor + ?Sized>(visitor: &mut V, block: &Block) {
    match block {
        Block::Document(blocks)
        | Block::Blockquote(blocks)
        | Block::List { items: blocks, .. }
        | Block::ListItem { content: blocks, .. } => {
            for child in blocks {
                visitor.visit_block(child);
            }
        }
        Block::Paragraph(text) | Block::Heading { text, .. } => visitor.visit_text(text),
        Block::Table { header, rows, .. } => {
            walk_row(visitor, header);
            for row in rows {
                walk_row(visitor, row);
            }
        }
        Block::DefinitionList(defs) => {
            for Definition { item, descriptions } in defs {
                visitor.visit_text(item);
                for description in descriptions {
                    visitor.visit_block(description);
                }
            }
        }
        Block::IndentedCode(_)
        | Block::FencedCode { .. }
        | Block::HtmlBlock(_)
        | Block::ReferenceDef { .. }
        | Block::ThematicBreak
        | Block::Custom(_) => {}
    }
}

fn walk_row<V: Visitor + ?Sized>(visitor: &mut V, row: &Row) {
    for cell in row {
        visitor.visit_text(cell);
    }
}

pub fn walk_text<V: Visitor + ?Sized>(visitor: &mut V, text: &Text) {
    for fragment in text {
        visitor.visit_fragment(fragment);
    }
}

pub fn walk_fragment<V: Visitor + ?Sized>(visitor: &mut V, fragment: &TextFragment) {
    match fragment {
        TextFragment::Emph(inner)
        | TextFragment::Strong(inner)
        | TextFragment::Link { text: inner, .. }
        | TextFragment::Image { text: inner, .. } => visitor.visit_text(inner),
        _ => {}
    }
}
