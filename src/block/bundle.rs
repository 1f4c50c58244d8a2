//! Post-processing of a closed container's content.
//!
//! Consecutive compatible list items are grouped into lists; with
//! definition lists enabled, a paragraph followed by a `:` list becomes a
//! definition list entry.

use super::node::{Block, Definition, ListType};

/// Group the blocks of one container.
pub(crate) fn bundle(blocks: Vec<Block>, definition_lists: bool) -> Vec<Block> {
    let lists = bundle_lists(blocks);
    if definition_lists {
        bundle_definitions(lists)
    } else {
        lists
    }
}

struct OpenList {
    kind: ListType,
    tight: bool,
    items: Vec<Block>,
}

impl OpenList {
    fn into_block(self) -> Block {
        Block::List {
            start: self.kind.start_number(),
            tight: self.tight,
            items: self.items,
        }
    }
}

fn bundle_lists(blocks: Vec<Block>) -> Vec<Block> {
    let mut out = Vec::with_capacity(blocks.len());
    let mut open: Option<OpenList> = None;
    for block in blocks {
        let Block::ListItem { kind, tight, ref content } = block else {
            if let Some(list) = open.take() {
                out.push(list.into_block());
            }
            out.push(block);
            continue;
        };
        let singleton = content.len() == 1;
        match open.as_mut() {
            Some(list) if list.kind.compatible(kind) => {
                if !tight || !singleton {
                    list.tight = false;
                }
                list.items.push(block);
            }
            _ => {
                if let Some(list) = open.take() {
                    out.push(list.into_block());
                }
                open = Some(OpenList {
                    kind,
                    tight: singleton,
                    items: vec![block],
                });
            }
        }
    }
    if let Some(list) = open {
        out.push(list.into_block());
    }
    out
}

fn is_definition_list(block: &Block) -> bool {
    matches!(
        block,
        Block::List { items, .. }
            if matches!(items.first(), Some(Block::ListItem { kind: ListType::Bullet(':'), .. }))
    )
}

fn bundle_definitions(blocks: Vec<Block>) -> Vec<Block> {
    if blocks.len() < 2 {
        return blocks;
    }
    let mut out = Vec::with_capacity(blocks.len());
    let mut definitions = Vec::new();
    let mut iter = blocks.into_iter().peekable();
    while let Some(block) = iter.next() {
        if matches!(block, Block::Paragraph(_)) && iter.peek().is_some_and(is_definition_list) {
            if let (Block::Paragraph(item), Some(Block::List { items, .. })) = (block, iter.next()) {
                definitions.push(Definition {
                    item,
                    descriptions: items,
                });
            }
            continue;
        }
        if !definitions.is_empty() {
            out.push(Block::DefinitionList(std::mem::take(&mut definitions)));
        }
        out.push(block);
    }
    if !definitions.is_empty() {
        out.push(Block::DefinitionList(definitions));
    }
    out
}
