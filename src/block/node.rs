//! Block tree types.

use std::fmt;
use std::sync::Arc;

use crate::custom::CustomBlock;
use crate::text::Text;

/// Source lines of a leaf block.
pub type Lines = Vec<String>;

/// Table cells of one row.
pub type Row = Vec<Text>;

/// Marker of a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListType {
    /// Bullet marker character (`-`, `+`, `*`, ...).
    Bullet(char),
    /// Ordered marker: start number and delimiter (`.` or `)`).
    Ordered(u64, char),
}

impl ListType {
    /// Whether items of both types belong to the same list.
    ///
    /// Bullets must share the marker character; ordered items must share
    /// the delimiter, whatever their numbers.
    pub fn compatible(self, other: ListType) -> bool {
        match (self, other) {
            (Self::Bullet(a), Self::Bullet(b)) => a == b,
            (Self::Ordered(_, a), Self::Ordered(_, b)) => a == b,
            _ => false,
        }
    }

    pub fn start_number(self) -> Option<u64> {
        match self {
            Self::Bullet(_) => None,
            Self::Ordered(n, _) => Some(n),
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullet(ch) => write!(f, "bullet({ch})"),
            Self::Ordered(n, delim) => write!(f, "ordered({n}, {delim})"),
        }
    }
}

/// Column alignment for table cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Alignment {
    /// No alignment specified (`---`).
    #[default]
    Undefined,
    /// Left-aligned (`:---`).
    Left,
    /// Right-aligned (`---:`).
    Right,
    /// Center-aligned (`:---:`).
    Center,
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Undefined => "-",
            Self::Left => "L",
            Self::Right => "R",
            Self::Center => "C",
        })
    }
}

/// Term and descriptions of a definition list entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub item: Text,
    /// `ListItem` blocks, one per `:` description.
    pub descriptions: Vec<Block>,
}

impl Definition {
    pub fn plain_text(&self) -> String {
        format!("{}: {}", self.item.raw_text(), blocks_plain_text(&self.descriptions))
    }
}

/// A node of the block tree.
///
/// Only `Document`, `Blockquote`, `List` and `ListItem` contain other blocks.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Document(Vec<Block>),
    Blockquote(Vec<Block>),
    List {
        start: Option<u64>,
        tight: bool,
        items: Vec<Block>,
    },
    ListItem {
        kind: ListType,
        /// Not preceded by a blank line.
        tight: bool,
        content: Vec<Block>,
    },
    Paragraph(Text),
    Heading {
        level: u8,
        text: Text,
    },
    IndentedCode(Lines),
    FencedCode {
        info: Option<String>,
        lines: Lines,
    },
    HtmlBlock(Lines),
    ReferenceDef {
        label: String,
        destination: String,
        title: Lines,
    },
    ThematicBreak,
    Table {
        header: Row,
        alignments: Vec<Alignment>,
        rows: Vec<Row>,
    },
    DefinitionList(Vec<Definition>),
    Custom(Arc<dyn CustomBlock>),
}

impl Block {
    /// Child blocks of a container block.
    pub fn children(&self) -> Option<&[Block]> {
        match self {
            Self::Document(blocks)
            | Self::Blockquote(blocks)
            | Self::List { items: blocks, .. }
            | Self::ListItem { content: blocks, .. } => Some(blocks),
            _ => None,
        }
    }

    pub fn is_container(&self) -> bool {
        self.children().is_some()
    }

    /// Raw text of the block, ignoring all markup.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Document(blocks)
            | Self::Blockquote(blocks)
            | Self::List { items: blocks, .. }
            | Self::ListItem { content: blocks, .. } => blocks_plain_text(blocks),
            Self::Paragraph(text) | Self::Heading { text, .. } => text.plain_text(),
            Self::IndentedCode(lines) | Self::FencedCode { lines, .. } => lines.concat(),
            Self::HtmlBlock(_) => String::new(),
            Self::ReferenceDef { title, .. } => title.join(" "),
            Self::ThematicBreak => "\n\n".to_owned(),
            Self::Table { header, rows, .. } => {
                let mut out = row_plain_text(header);
                for row in rows {
                    out.push('\n');
                    out.push_str(&row_plain_text(row));
                }
                out
            }
            Self::DefinitionList(defs) => defs
                .iter()
                .map(Definition::plain_text)
                .collect::<Vec<_>>()
                .join("\n\n"),
            Self::Custom(custom) => custom.plain_text(),
        }
    }
}

fn blocks_plain_text(blocks: &[Block]) -> String {
    blocks.iter().map(Block::plain_text).collect::<Vec<_>>().join("\n")
}

fn row_plain_text(row: &Row) -> String {
    row.iter().map(Text::plain_text).collect::<Vec<_>>().join(" | ")
}
