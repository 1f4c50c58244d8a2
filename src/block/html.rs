//! Raw HTML blocks.
//!
//! The first line decides the kind of block, which in turn decides the
//! line that ends it. Start and end conditions are matched against the
//! lowercased line content.

use super::node::Block;
use super::parser::{BlockParse, BlockRule, DocumentParser};

/// Block-level tag names that start a blank-line-terminated HTML block.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "section", "source",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HtmlKind {
    /// `<script>`, `<pre>` or `<style>`.
    Raw,
    Comment,
    ProcessingInstruction,
    Declaration,
    Cdata,
    /// One of [`BLOCK_TAGS`], opening or closing.
    Tag,
}

impl HtmlKind {
    const ALL: [HtmlKind; 6] = [
        Self::Raw,
        Self::Comment,
        Self::ProcessingInstruction,
        Self::Declaration,
        Self::Cdata,
        Self::Tag,
    ];

    fn starts(self, line: &str) -> bool {
        match self {
            Self::Raw => ["<script", "<pre", "<style"]
                .iter()
                .any(|name| starts_with_tag(line, name, false)),
            Self::Comment => line.starts_with("<!--"),
            Self::ProcessingInstruction => line.starts_with("<?"),
            Self::Declaration => line
                .strip_prefix("<!")
                .and_then(|rest| rest.bytes().next())
                .is_some_and(|b| b.is_ascii_alphabetic()),
            Self::Cdata => line.starts_with("<![cdata["),
            Self::Tag => {
                let Some(rest) = line.strip_prefix('<') else {
                    return false;
                };
                let rest = rest.strip_prefix('/').unwrap_or(rest);
                BLOCK_TAGS.iter().any(|name| starts_with_tag(rest, name, true))
            }
        }
    }

    fn ends(self, line: &str) -> bool {
        match self {
            Self::Raw => ["</script>", "</pre>", "</style>"]
                .iter()
                .any(|close| line.contains(close)),
            Self::Comment => line.contains("-->"),
            Self::ProcessingInstruction => line.contains("?>"),
            Self::Declaration => line.contains('>'),
            Self::Cdata => line.contains("]]>"),
            Self::Tag => false,
        }
    }

    fn ends_on_blank_line(self) -> bool {
        self == Self::Tag
    }
}

/// `line` starts with `name` followed by whitespace, `>`, the end of the
/// line, or `/>` when `self_closing` is allowed.
fn starts_with_tag(line: &str, name: &str, self_closing: bool) -> bool {
    let Some(rest) = line.strip_prefix(name) else {
        return false;
    };
    match rest.bytes().next() {
        None | Some(b' ' | b'\t' | b'\x0b' | b'\x0c' | b'>') => true,
        Some(_) => self_closing && rest.starts_with("/>"),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlBlockRule;

impl BlockRule for HtmlBlockRule {
    fn name(&self) -> &str {
        "html-block"
    }

    fn parse(&self, doc: &mut DocumentParser<'_>) -> BlockParse {
        if !doc.short_line_indent() || doc.first_byte() != Some(b'<') {
            return BlockParse::NoMatch;
        }
        let mut line = doc.content().to_ascii_lowercase();
        let Some(kind) = HtmlKind::ALL.into_iter().find(|kind| kind.starts(&line)) else {
            return BlockParse::NoMatch;
        };
        log::trace!("html block {kind:?}");

        let mut lines = vec![doc.line_text()];
        while !doc.finished() && !kind.ends(&line) {
            doc.next_line();
            if !doc.finished() {
                if (kind.ends_on_blank_line() && doc.line_empty()) || doc.lazy_continuation() {
                    break;
                }
                lines.push(doc.line_text());
            }
            line = doc.content().to_ascii_lowercase();
        }
        if !doc.finished() && !doc.lazy_continuation() {
            doc.next_line();
        }
        BlockParse::Block(Block::HtmlBlock(lines))
    }
}
