//! markdown-tree: CommonMark parser producing a typed document tree
//!
//! Parsing runs in two phases:
//! 1. The block phase splits the input into lines and builds a tree of
//!    [`Block`]s (headings, lists, blockquotes, code, tables, ...). Inline
//!    content is kept as raw lines.
//! 2. The inline phase collects link reference definitions, then runs a
//!    chain of [`InlineTransformer`]s over every text region, turning raw
//!    lines into [`TextFragment`]s (emphasis, code, links, ...).
//!
//! Both phases are driven by pluggable rules: block rules implement
//! [`BlockRule`], inline passes implement [`InlineTransformer`]. Which
//! built-ins run is set by a [`ParserConfig`]; host-defined node kinds
//! plug in through [`CustomBlock`] and [`CustomTextFragment`].
//!
//! Parsing never fails. Malformed Markdown degrades to literal text.
//!
//! # Example
//! ```
//! use markdown_tree::{Block, TextFragment, parse};
//!
//! let doc = parse("Hello *world*");
//! let Block::Document(blocks) = doc else { unreachable!() };
//! let Block::Paragraph(text) = &blocks[0] else { unreachable!() };
//! assert_eq!(text.get(1), Some(&TextFragment::Emph("world".into())));
//! ```

pub mod block;
mod chars;
pub mod config;
pub mod cursor;
pub mod custom;
pub mod inline;
pub mod limits;
pub mod link_ref;
mod parser;
pub mod render;
pub mod text;
pub mod visit;

pub use block::{Alignment, Block, BlockParse, BlockRule, Definition, DocumentParser, ListType};
pub use config::{BlockRuleKind, ConfigError, EmphasisSpec, ParserConfig, TransformerKind};
pub use custom::{CustomBlock, CustomTextFragment, Generator};
pub use inline::{Emphasis, EmphasisFactory, InlineParser, InlineTransformer};
pub use link_ref::{LinkRefDef, LinkRefStore};
pub use parser::{MarkdownParser, ParserBuilder};
pub use render::MarkdownWriter;
pub use text::{AutolinkKind, DelimiterRunType, Text, TextFragment};
pub use visit::Visitor;

/// Parse CommonMark input.
///
/// # Example
/// ```
/// use markdown_tree::{Block, parse};
///
/// assert_eq!(parse("***"), Block::Document(vec![Block::ThematicBreak]));
/// ```
pub fn parse(input: &str) -> Block {
    MarkdownParser::standard().parse(input)
}

/// Parse input with tables and definition lists enabled.
pub fn parse_extended(input: &str) -> Block {
    MarkdownParser::extended().parse(input)
}
