//! Block-level parser for Markdown.
//!
//! The block parser is line-oriented. Each line is first matched against
//! the open containers (blockquotes, list items); what remains is offered
//! to the block rules in order:
//! - ATX and setext headings
//! - Thematic breaks
//! - Indented and fenced code blocks
//! - HTML blocks
//! - Link reference definitions
//! - Blockquotes
//! - List items
//! - Tables (extended grammar)
//!
//! Lines no rule claims become paragraphs.

mod blockquote;
mod bundle;
mod code;
mod container;
mod heading;
mod html;
mod link_ref_def;
mod list_item;
mod node;
mod parser;
mod table;
mod thematic_break;

pub use blockquote::BlockquoteRule;
pub use code::{FencedCodeRule, IndentedCodeRule};
pub use container::{ContainerId, ContainerKind};
pub use heading::{AtxHeadingRule, SetextHeadingRule};
pub use html::HtmlBlockRule;
pub use link_ref_def::LinkRefDefRule;
pub use list_item::ListItemRule;
pub use node::{Alignment, Block, Definition, Lines, ListType, Row};
pub use parser::{BlockParse, BlockRule, DocumentParser, Snapshot};
pub use table::TableRule;
pub use thematic_break::ThematicBreakRule;
