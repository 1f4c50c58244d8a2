//! Extension points for host-defined block and inline node kinds.
//!
//! Custom nodes travel through the tree as `Block::Custom` and
//! `TextFragment::Custom`. They take part in inline parsing, equality and
//! text projection through the traits below, and render themselves into a
//! [`Generator`] supplied by the external renderer.

use std::any::Any;
use std::fmt;

use crate::block::Block;
use crate::inline::InlineParser;
use crate::text::{Text, TextFragment};

/// Output sink handed to custom nodes by a renderer.
pub trait Generator {
    /// Identifies the output format, e.g. `"html"` or `"markdown"`.
    fn output_kind(&self) -> &str;

    /// Write already-formatted output.
    fn write_str(&mut self, s: &str);

    /// Render nested standard text.
    fn text(&mut self, text: &Text);

    /// Render nested standard blocks.
    fn blocks(&mut self, blocks: &[Block], tight: bool);
}

/// A host-defined block kind.
pub trait CustomBlock: fmt::Debug + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;

    fn eq_block(&self, other: &dyn CustomBlock) -> bool;

    /// Raw text content, ignoring markup.
    fn plain_text(&self) -> String {
        String::new()
    }

    /// Run the inline phase over this block's content.
    fn parse_inline(&self, parser: &InlineParser<'_>) -> Block;

    fn generate(&self, generator: &mut dyn Generator, tight: bool);
}

/// A host-defined inline fragment kind.
pub trait CustomTextFragment: fmt::Debug + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;

    fn eq_fragment(&self, other: &dyn CustomTextFragment) -> bool;

    /// Text ignoring markup.
    fn raw_text(&self) -> String;

    fn plain_text(&self) -> String {
        self.raw_text()
    }

    /// Markdown form of the fragment.
    fn markdown(&self) -> String;

    /// Rebuild the fragment with `transform` applied to every nested text.
    fn transform(&self, transform: &mut dyn FnMut(Text) -> Text) -> TextFragment;

    fn generate(&self, generator: &mut dyn Generator);
}

impl PartialEq for dyn CustomBlock {
    fn eq(&self, other: &Self) -> bool {
        self.eq_block(other)
    }
}

impl PartialEq for dyn CustomTextFragment {
    fn eq(&self, other: &Self) -> bool {
        self.eq_fragment(other)
    }
}
