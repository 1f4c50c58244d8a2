//! Inline parser for Markdown.
//!
//! Runs after block parsing, in two passes over the block tree:
//! 1. Link reference collection: every `ReferenceDef` is entered into a
//!    [`LinkRefStore`], first definition per label wins.
//! 2. Transformation: the raw lines of every paragraph, heading, table cell
//!    and definition term are passed through the configured chain of
//!    [`InlineTransformer`]s. The standard chain is delimiter tokenizing,
//!    code spans/autolinks/HTML, links, emphasis and escapes, in this order.

mod code_span;
mod delimiter;
mod emphasis;
mod escape;
mod html;
mod links;

pub use code_span::CodeLinkHtmlTransformer;
pub use delimiter::DelimiterTransformer;
pub use emphasis::{Emphasis, EmphasisFactory, EmphasisTransformer};
pub use escape::EscapeTransformer;
pub use links::LinkTransformer;

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

use crate::block::{Block, Definition, Row};
use crate::link_ref::LinkRefStore;
use crate::text::{Text, TextFragment};

/// One step of the inline pipeline.
///
/// The default [`transform`](Self::transform) feeds each fragment to
/// [`transform_fragment`](Self::transform_fragment), whose default
/// recurses into the nested text of emphasis, links, images and custom
/// fragments. Implementations override whichever level they need.
pub trait InlineTransformer: fmt::Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn transform(&self, text: Text, owner: &InlineParser<'_>) -> Text {
        let mut out = Text::new();
        for fragment in text {
            self.transform_fragment(fragment, owner, &mut out);
        }
        out
    }

    fn transform_fragment(&self, fragment: TextFragment, owner: &InlineParser<'_>, out: &mut Text) {
        out.push(transform_nested(self, fragment, owner));
    }
}

/// Apply `transformer` to the nested text of `fragment`, if it has any.
pub fn transform_nested<T: InlineTransformer + ?Sized>(
    transformer: &T,
    fragment: TextFragment,
    owner: &InlineParser<'_>,
) -> TextFragment {
    owner.nested(1, || match fragment {
        TextFragment::Emph(inner) => TextFragment::Emph(transformer.transform(inner, owner)),
        TextFragment::Strong(inner) => TextFragment::Strong(transformer.transform(inner, owner)),
        TextFragment::Link { text, uri, title } => TextFragment::Link {
            text: transformer.transform(text, owner),
            uri,
            title,
        },
        TextFragment::Image { text, uri, title } => TextFragment::Image {
            text: transformer.transform(text, owner),
            uri,
            title,
        },
        TextFragment::Custom(custom) => custom.transform(&mut |inner| transformer.transform(inner, owner)),
        other => other,
    })
}

/// Applies a chain of inline transformers to the text of a block tree.
///
/// An inline parser is built for one document: it holds the link
/// reference definitions collected from that document.
pub struct InlineParser<'a> {
    transformers: &'a [Arc<dyn InlineTransformer>],
    link_refs: LinkRefStore,
    /// Fragments enclosing the text currently being transformed.
    depth: Cell<usize>,
}

impl<'a> InlineParser<'a> {
    /// Create an inline parser for `document`, collecting its link
    /// reference definitions.
    pub fn new(transformers: &'a [Arc<dyn InlineTransformer>], document: &Block) -> Self {
        Self {
            transformers,
            link_refs: LinkRefStore::collect(document),
            depth: Cell::new(0),
        }
    }

    /// Link reference definitions of the document.
    pub fn link_refs(&self) -> &LinkRefStore {
        &self.link_refs
    }

    /// Number of fragments enclosing the text being transformed.
    ///
    /// Transformers that wrap content stop once this reaches
    /// [`MAX_INLINE_NESTING`](crate::limits::MAX_INLINE_NESTING).
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Run `f` on text nested `levels` fragments deeper.
    pub fn nested<R>(&self, levels: usize, f: impl FnOnce() -> R) -> R {
        let depth = self.depth.get();
        self.depth.set(depth + levels);
        let result = f();
        self.depth.set(depth);
        result
    }

    /// Run every transformer over `text`, in order.
    pub fn transform(&self, text: Text) -> Text {
        self.transformers
            .iter()
            .fold(text, |text, transformer| transformer.transform(text, self))
    }

    /// Replace the raw text of `block` and its descendants with parsed
    /// inline content.
    pub fn parse(&self, block: Block) -> Block {
        match block {
            Block::Document(blocks) => Block::Document(self.parse_blocks(blocks)),
            Block::Blockquote(blocks) => Block::Blockquote(self.parse_blocks(blocks)),
            Block::List { start, tight, items } => Block::List {
                start,
                tight,
                items: self.parse_blocks(items),
            },
            Block::ListItem { kind, tight, content } => Block::ListItem {
                kind,
                tight,
                content: self.parse_blocks(content),
            },
            Block::Paragraph(text) => Block::Paragraph(self.transform(text)),
            Block::Heading { level, text } => Block::Heading {
                level,
                text: self.transform(text),
            },
            Block::Table {
                header,
                alignments,
                rows,
            } => Block::Table {
                header: self.transform_row(header),
                alignments,
                rows: rows.into_iter().map(|row| self.transform_row(row)).collect(),
            },
            Block::DefinitionList(defs) => Block::DefinitionList(
                defs.into_iter()
                    .map(|def| Definition {
                        item: self.transform(def.item),
                        descriptions: self.parse_blocks(def.descriptions),
                    })
                    .collect(),
            ),
            Block::Custom(custom) => custom.parse_inline(self),
            leaf @ (Block::IndentedCode(_)
            | Block::FencedCode { .. }
            | Block::HtmlBlock(_)
            | Block::ReferenceDef { .. }
            | Block::ThematicBreak) => leaf,
        }
    }

    pub fn parse_blocks(&self, blocks: Vec<Block>) -> Vec<Block> {
        blocks.into_iter().map(|block| self.parse(block)).collect()
    }

    fn transform_row(&self, row: Row) -> Row {
        row.into_iter().map(|cell| self.transform(cell)).collect()
    }
}

impl fmt::Debug for InlineParser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineParser")
            .field("transformers", &self.transformers.len())
            .field("link_refs", &self.link_refs.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MarkdownParser;

    fn parse(input: &str) -> Text {
        let markdown = MarkdownParser::standard();
        let doc = Block::Document(vec![]);
        let parser = InlineParser::new(markdown.transformers(), &doc);
        let mut text = Text::new();
        for line in input.split('\n') {
            text.append_line(line, false);
        }
        parser.transform(text)
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(parse("Hello, world!"), Text::plain("Hello, world!"));
    }

    #[test]
    fn test_code_span() {
        let text = parse("Use `code` here");
        assert_eq!(
            text.fragments(),
            &[
                TextFragment::text("Use "),
                TextFragment::Code("code".into()),
                TextFragment::text(" here"),
            ]
        );
    }

    #[test]
    fn test_emphasis_and_strong() {
        let text = parse("*a* **b**");
        assert_eq!(
            text.fragments(),
            &[
                TextFragment::Emph(Text::plain("a")),
                TextFragment::text(" "),
                TextFragment::Strong(Text::plain("b")),
            ]
        );
    }

    #[test]
    fn test_backslash_escape() {
        assert_eq!(parse("\\*not emphasis\\*"), Text::plain("*not emphasis*"));
    }

    #[test]
    fn test_unmatched_delimiters_become_text() {
        assert_eq!(parse("a [b (c) *d"), Text::plain("a [b (c) *d"));
    }

    #[test]
    fn test_emphasis_not_in_code() {
        let text = parse("`*a*`");
        assert_eq!(text.fragments(), &[TextFragment::Code("*a*".into())]);
    }

    #[test]
    fn test_soft_break_kept() {
        let text = parse("a\nb");
        assert_eq!(
            text.fragments(),
            &[TextFragment::text("a"), TextFragment::SoftBreak, TextFragment::text("b")]
        );
    }

    #[test]
    fn test_definition_items_parsed() {
        let markdown = MarkdownParser::standard();
        let doc = Block::DefinitionList(vec![Definition {
            item: Text::plain("*term*"),
            descriptions: vec![Block::Paragraph(Text::plain("_desc_"))],
        }]);
        let parser = InlineParser::new(markdown.transformers(), &doc);
        let Block::DefinitionList(defs) = parser.parse(doc) else {
            panic!("expected definition list");
        };
        assert_eq!(defs[0].item, Text::from_fragment(TextFragment::Emph(Text::plain("term"))));
        assert_eq!(
            defs[0].descriptions[0],
            Block::Paragraph(Text::from_fragment(TextFragment::Emph(Text::plain("desc"))))
        );
    }
}
