//! Link and image resolution.
//!
//! Handles:
//! - Inline links: `[text](url "title")`
//! - Reference links: `[text][label]`, `[label][]` and `[label]`
//! - Images: the same forms opened by `![`
//!
//! One pass over the fragments with a stack of open brackets. A `]` pops
//! the nearest opener and tries every link form after it; the description
//! is whatever the pass already produced after the opener, so nested links
//! are resolved exactly once. Forming a link deactivates every link opener
//! below it, since links may not contain links.
//!
//! Also home of the autolink grammars used by the code/HTML pass.

use super::{InlineParser, InlineTransformer, transform_nested};
use crate::chars::{is_ascii_whitespace_or_control, is_whitespace_str};
use crate::limits::{MAX_BRACKET_DEPTH, MAX_INLINE_NESTING, MAX_LINK_LABEL_LEN, MAX_LINK_PAREN_DEPTH};
use crate::link_ref::LinkRefDef;
use crate::text::{DelimiterRunType, Text, TextFragment};

#[derive(Debug, Default, Clone, Copy)]
pub struct LinkTransformer;

impl InlineTransformer for LinkTransformer {
    fn name(&self) -> &str {
        "link"
    }

    fn transform(&self, text: Text, owner: &InlineParser<'_>) -> Text {
        let fragments = text.into_fragments();
        let limit = MAX_BRACKET_DEPTH.min(MAX_INLINE_NESTING.saturating_sub(owner.depth()));
        let mut out: Vec<TextFragment> = Vec::with_capacity(fragments.len());
        let mut brackets = Brackets::default();
        let mut titles = TitleScan::default();
        let mut i = 0;
        while i < fragments.len() {
            let fragment = &fragments[i];
            i += 1;
            match fragment {
                TextFragment::Delimiter { ch: '[', run, .. } => {
                    let opener = Opener {
                        source: i - 1,
                        output: out.len(),
                        image: run.contains(DelimiterRunType::IMAGE),
                    };
                    brackets.push(opener, limit);
                    out.push(fragment.clone());
                }
                TextFragment::Delimiter { ch: ']', .. } => {
                    let Some(opener) = brackets.pop() else {
                        out.push(fragment.clone());
                        continue;
                    };
                    let description = &out[opener.output + 1..];
                    if !opener.image && contains_link(description) {
                        out.push(fragment.clone());
                        continue;
                    }
                    let Some((target, next)) = resolve(&fragments, opener.source, i - 1, &mut titles, owner) else {
                        out.push(fragment.clone());
                        continue;
                    };

                    let text: Text = out.drain(opener.output + 1..).collect();
                    out.truncate(opener.output);
                    out.push(make_link(!opener.image, text, target));
                    if !opener.image {
                        brackets.link_floor = brackets.openers.len();
                    }
                    i = next;
                }
                other => out.push(transform_nested(self, other.clone(), owner)),
            }
        }
        Text::from(out)
    }
}

/// An unresolved `[` or `![`.
#[derive(Debug, Clone, Copy)]
struct Opener {
    /// Index of the delimiter in the input fragments.
    source: usize,
    /// Index of the delimiter in the output.
    output: usize,
    image: bool,
}

#[derive(Debug, Default)]
struct Brackets {
    openers: Vec<Opener>,
    /// Link openers below this height are inactive.
    link_floor: usize,
}

impl Brackets {
    /// Push an opener. Once `limit` are open, the oldest becomes text.
    fn push(&mut self, opener: Opener, limit: usize) {
        if limit == 0 {
            return;
        }
        if self.openers.len() >= limit {
            self.openers.remove(0);
            self.link_floor = self.link_floor.saturating_sub(1);
        }
        self.openers.push(opener);
    }

    /// Pop the opener for a `]`. `None` means the `]` is literal.
    fn pop(&mut self) -> Option<Opener> {
        let opener = self.openers.pop()?;
        let active = opener.image || self.openers.len() >= self.link_floor;
        self.link_floor = self.link_floor.min(self.openers.len());
        active.then_some(opener)
    }
}

/// Destination and title of a resolved link.
#[derive(Debug)]
struct Target {
    uri: String,
    title: Option<String>,
}

impl From<&LinkRefDef> for Target {
    fn from(def: &LinkRefDef) -> Self {
        Self {
            uri: def.destination.clone(),
            title: def.title.clone(),
        }
    }
}

/// Try every link form after the `]` at `close`. Returns the target and the
/// index following the link.
fn resolve(
    fragments: &[TextFragment],
    open: usize,
    close: usize,
    titles: &mut TitleScan,
    owner: &InlineParser<'_>,
) -> Option<(Target, usize)> {
    let description = &fragments[open + 1..close];
    let after = close + 1;
    let tail = match fragments.get(after) {
        Some(TextFragment::Delimiter { ch: '(', .. }) => complete_inline(fragments, after + 1, titles),
        Some(TextFragment::Delimiter { ch: '[', .. }) => complete_ref(fragments, after + 1, description, owner),
        _ => None,
    };
    if tail.is_some() {
        return tail;
    }

    // Shortcut reference: the description is the label.
    let def = owner.link_refs().get(&label_text(description)?)?;
    Some((Target::from(def), after))
}

fn complete_inline(fragments: &[TextFragment], pos: usize, titles: &mut TitleScan) -> Option<(Target, usize)> {
    let mut i = skip_whitespace(fragments, pos)?;

    let mut uri = String::new();
    match &fragments[i] {
        TextFragment::Delimiter { ch: '<', .. } => {
            i += 1;
            loop {
                match fragments.get(i)? {
                    TextFragment::Delimiter { ch: '>', .. } => break,
                    TextFragment::Delimiter { ch: '<', .. } => return None,
                    f if f.is_break() => return None,
                    f => uri.push_str(&f.raw_text()),
                }
                i += 1;
            }
            i += 1;
        }
        TextFragment::Html(s) | TextFragment::Autolink { uri: s, .. } => {
            if s.contains('\n') {
                return None;
            }
            uri.push_str(s);
            i += 1;
        }
        _ => match bare_destination(fragments, i, &mut uri)? {
            Destination::Closed(next) => return Some((Target { uri, title: None }, next)),
            Destination::Open(next) => i = next,
        },
    }

    let i = skip_whitespace(fragments, i)?;
    let close = match &fragments[i] {
        TextFragment::Delimiter { ch: '"', .. } => '"',
        TextFragment::Delimiter { ch: '\'', .. } => '\'',
        TextFragment::Delimiter { ch: '(', .. } => ')',
        TextFragment::Delimiter { ch: ')', .. } => return Some((Target { uri, title: None }, i + 1)),
        _ => return None,
    };
    let (title, i) = titles.complete(fragments, i + 1, close)?;

    let i = skip_whitespace(fragments, i)?;
    match fragments[i] {
        TextFragment::Delimiter { ch: ')', .. } => Some((Target { uri, title: Some(title) }, i + 1)),
        _ => None,
    }
}

fn complete_ref(
    fragments: &[TextFragment],
    pos: usize,
    description: &[TextFragment],
    owner: &InlineParser<'_>,
) -> Option<(Target, usize)> {
    let start = skip_whitespace(fragments, pos)?;
    let end = start
        + fragments[start..]
            .iter()
            .take(MAX_LINK_LABEL_LEN + 1)
            .position(|f| matches!(f, TextFragment::Delimiter { ch: ']', .. }))?;
    let mut label = label_text(&fragments[start..end])?;

    // `[foo][]` uses the description as its label.
    if label.trim().is_empty() {
        label = label_text(description)?;
    }
    let def = owner.link_refs().get(&label)?;
    Some((Target::from(def), end + 1))
}

/// Source text of a link label. `None` if it holds a bracket or is too long.
fn label_text(fragments: &[TextFragment]) -> Option<String> {
    let mut label = String::new();
    let mut chars = 0usize;
    for fragment in fragments {
        let piece = match fragment {
            TextFragment::Delimiter { ch: '[' | ']', .. } => return None,
            f if f.is_break() => " ".to_owned(),
            f => f.to_string(),
        };
        chars += piece.chars().count();
        if chars > MAX_LINK_LABEL_LEN {
            return None;
        }
        label.push_str(&piece);
    }
    Some(label)
}

/// How a bare destination ended.
enum Destination {
    /// The closing `)` was consumed; the link ends before the index.
    Closed(usize),
    /// Whitespace ended the destination; a title may follow at the index.
    Open(usize),
}

/// Scan a destination that is not enclosed in `<...>`. Parentheses must
/// balance; whitespace ends the destination.
fn bare_destination(fragments: &[TextFragment], mut i: usize, destination: &mut String) -> Option<Destination> {
    if let TextFragment::Text(s) = &fragments[i] {
        destination.push_str(s.trim_start_matches(is_ascii_whitespace_or_control));
        if let Some(end) = destination.find(is_ascii_whitespace_or_control) {
            if !is_whitespace_str(&destination[end..]) {
                return None;
            }
            destination.truncate(end);
            return Some(Destination::Open(i + 1));
        }
        i += 1;
    }

    let mut depth = 0usize;
    while let Some(fragment) = fragments.get(i) {
        match fragment {
            TextFragment::Delimiter { ch: '(', .. } => {
                depth += 1;
                if depth > MAX_LINK_PAREN_DEPTH {
                    return None;
                }
            }
            TextFragment::Delimiter { ch: ')', .. } => {
                if depth == 0 {
                    return Some(Destination::Closed(i + 1));
                }
                depth -= 1;
            }
            TextFragment::Text(s) => {
                if let Some(end) = s.find(is_ascii_whitespace_or_control) {
                    if !is_whitespace_str(&s[end..]) {
                        return None;
                    }
                    destination.push_str(&s[..end]);
                    return Some(Destination::Open(i + 1));
                }
            }
            f if f.is_break() => return Some(Destination::Open(i + 1)),
            _ => {}
        }
        destination.push_str(&fragment.raw_text());
        i += 1;
    }
    None
}

/// Title scans that ran off the end, per closing delimiter. A later
/// scan for the same delimiter cannot succeed either.
#[derive(Debug)]
struct TitleScan {
    exhausted: [usize; 3],
}

impl Default for TitleScan {
    fn default() -> Self {
        Self {
            exhausted: [usize::MAX; 3],
        }
    }
}

impl TitleScan {
    /// Collect a title up to the `close` delimiter. Returns the title and
    /// the index after the delimiter.
    fn complete(&mut self, fragments: &[TextFragment], start: usize, close: char) -> Option<(String, usize)> {
        let slot = match close {
            '"' => 0,
            '\'' => 1,
            _ => 2,
        };
        if start >= self.exhausted[slot] {
            return None;
        }
        let mut title = String::new();
        for (i, fragment) in fragments.iter().enumerate().skip(start) {
            match fragment {
                TextFragment::Delimiter { ch, .. } if *ch == close => return Some((title, i + 1)),
                f => title.push_str(&f.to_string()),
            }
        }
        self.exhausted[slot] = start;
        None
    }
}

/// Index of the first fragment from `i` that is neither a line break nor
/// whitespace-only text.
fn skip_whitespace(fragments: &[TextFragment], i: usize) -> Option<usize> {
    fragments[i.min(fragments.len())..]
        .iter()
        .position(|f| match f {
            TextFragment::SoftBreak | TextFragment::HardBreak => false,
            TextFragment::Text(s) => !is_whitespace_str(s),
            _ => true,
        })
        .map(|offset| i + offset)
}

/// Whether `fragments` contain a link at any depth. Images may contain
/// links in their description; links may not.
fn contains_link(fragments: &[TextFragment]) -> bool {
    fragments.iter().any(|fragment| match fragment {
        TextFragment::Link { .. } | TextFragment::Autolink { .. } => true,
        TextFragment::Emph(inner) | TextFragment::Strong(inner) | TextFragment::Image { text: inner, .. } => {
            contains_link(inner.fragments())
        }
        _ => false,
    })
}

fn make_link(link: bool, text: Text, target: Target) -> TextFragment {
    let uri = (!target.uri.is_empty()).then_some(target.uri);
    let title = target.title.filter(|t| !t.is_empty());
    if link {
        TextFragment::Link { text, uri, title }
    } else {
        TextFragment::Image { text, uri, title }
    }
}

/// Whether `content` is a URI autolink: a scheme of 2 to 32 characters,
/// a colon, and no whitespace, control characters or angle brackets.
pub(crate) fn is_uri_autolink(content: &str) -> bool {
    let bytes = content.as_bytes();
    let Some(colon) = memchr::memchr(b':', bytes) else {
        return false;
    };
    let scheme = &bytes[..colon];
    if !(2..=32).contains(&scheme.len()) || !scheme[0].is_ascii_alphabetic() {
        return false;
    }
    if !scheme[1..]
        .iter()
        .all(|&b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
    {
        return false;
    }
    content[colon + 1..]
        .chars()
        .all(|ch| !is_ascii_whitespace_or_control(ch) && ch != '<' && ch != '>')
}

/// Whether `content` is an email autolink.
pub(crate) fn is_email_autolink(content: &str) -> bool {
    let Some((local, domain)) = content.split_once('@') else {
        return false;
    };
    let local_valid = !local.is_empty()
        && local
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b".!#$%&'*+/=?^_`{|}~-".contains(&b));
    local_valid && domain.split('.').all(is_domain_label)
}

fn is_domain_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    !bytes.is_empty()
        && bytes.len() <= 63
        && bytes.iter().all(|&b| b.is_ascii_alphanumeric() || b == b'-')
        && bytes[0] != b'-'
        && bytes[bytes.len() - 1] != b'-'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MarkdownParser;
    use crate::block::Block;

    fn parse_with(input: &str, doc: &Block) -> Text {
        let markdown = MarkdownParser::standard();
        let parser = InlineParser::new(markdown.transformers(), doc);
        parser.transform(Text::plain(input))
    }

    fn link_depth(text: &Text) -> usize {
        text.iter()
            .map(|fragment| match fragment {
                TextFragment::Link { text, .. } | TextFragment::Image { text, .. } => 1 + link_depth(text),
                _ => 0,
            })
            .max()
            .unwrap_or(0)
    }

    fn parse(input: &str) -> Text {
        parse_with(input, &Block::Document(vec![]))
    }

    fn refs() -> Block {
        Block::Document(vec![Block::ReferenceDef {
            label: "Foo".into(),
            destination: "/url".into(),
            title: vec!["t".into()],
        }])
    }

    #[test]
    fn test_inline_link() {
        assert_eq!(
            parse("[text](https://example.com)").fragments(),
            &[TextFragment::link(Text::plain("text"), Some("https://example.com"), None)]
        );
    }

    #[test]
    fn test_inline_link_with_title() {
        assert_eq!(
            parse("[a](/u \"the title\")").fragments(),
            &[TextFragment::link(Text::plain("a"), Some("/u"), Some("the title"))]
        );
        assert_eq!(
            parse("[a](/u (paren))").fragments(),
            &[TextFragment::link(Text::plain("a"), Some("/u"), Some("paren"))]
        );
    }

    #[test]
    fn test_empty_destination() {
        assert_eq!(parse("[a]()").fragments(), &[TextFragment::link(Text::plain("a"), None, None)]);
        assert_eq!(parse("[a](<>)").fragments(), &[TextFragment::link(Text::plain("a"), None, None)]);
    }

    #[test]
    fn test_balanced_parens_in_destination() {
        assert_eq!(
            parse("[a](foo(and(bar)))").fragments(),
            &[TextFragment::link(Text::plain("a"), Some("foo(and(bar))"), None)]
        );
    }

    #[test]
    fn test_pointy_destination_with_space() {
        assert_eq!(
            parse("[a](<my url>)").fragments(),
            &[TextFragment::link(Text::plain("a"), Some("my url"), None)]
        );
    }

    #[test]
    fn test_image() {
        assert_eq!(
            parse("![alt](img.png)").fragments(),
            &[TextFragment::image(Text::plain("alt"), Some("img.png"), None)]
        );
    }

    #[test]
    fn test_no_nested_links() {
        let text = parse("[a [b](/b) c](/a)");
        assert_eq!(
            text.fragments(),
            &[
                TextFragment::text("[a "),
                TextFragment::link(Text::plain("b"), Some("/b"), None),
                TextFragment::text(" c](/a)"),
            ]
        );
    }

    #[test]
    fn test_link_inside_image() {
        let text = parse("![a [b](/b)](/img)");
        assert_eq!(
            text.fragments(),
            &[TextFragment::image(
                Text::from(vec![
                    TextFragment::text("a "),
                    TextFragment::link(Text::plain("b"), Some("/b"), None),
                ]),
                Some("/img"),
                None,
            )]
        );
    }

    #[test]
    fn test_nested_images() {
        let text = parse("![a ![b](/b)](/a)");
        assert_eq!(
            text.fragments(),
            &[TextFragment::image(
                Text::from(vec![
                    TextFragment::text("a "),
                    TextFragment::image(Text::plain("b"), Some("/b"), None),
                ]),
                Some("/a"),
                None,
            )]
        );
    }

    #[test]
    fn test_inner_link_deactivates_all_outer_openers() {
        let text = parse("[[[a](/a)](/b)](/c)");
        assert_eq!(
            text.fragments(),
            &[
                TextFragment::text("[["),
                TextFragment::link(Text::plain("a"), Some("/a"), None),
                TextFragment::text("](/b)](/c)"),
            ]
        );
    }

    #[test]
    fn test_unmatched_brackets_stay_text() {
        let input = format!("{}{}", "[".repeat(200), "]".repeat(200));
        assert_eq!(parse(&input).plain_text(), input);
    }

    #[test]
    fn test_bracket_depth_is_bounded() {
        let levels = MAX_BRACKET_DEPTH + 10;
        let input = format!("{}x{}", "![".repeat(levels), "](/i)".repeat(levels));
        let text = parse(&input);
        assert_eq!(link_depth(&text), MAX_BRACKET_DEPTH);
    }

    #[test]
    fn test_unclosed_title_fails_every_link() {
        let input = "[a](/u \"t ".repeat(50);
        assert!(
            parse(&input)
                .iter()
                .all(|f| !matches!(f, TextFragment::Link { .. }))
        );
    }

    #[test]
    fn test_reference_forms() {
        let doc = refs();
        let expected = TextFragment::link(Text::plain("foo"), Some("/url"), Some("t"));
        assert_eq!(parse_with("[foo]", &doc).fragments(), std::slice::from_ref(&expected));
        assert_eq!(parse_with("[foo][]", &doc).fragments(), std::slice::from_ref(&expected));
        assert_eq!(
            parse_with("[bar][ FOO ]", &doc).fragments(),
            &[TextFragment::link(Text::plain("bar"), Some("/url"), Some("t"))]
        );
        assert_eq!(parse_with("[bar]", &doc), Text::plain("[bar]"));
    }

    #[test]
    fn test_shortcut_keeps_following_text() {
        let doc = refs();
        assert_eq!(
            parse_with("[foo] (x)", &doc).fragments(),
            &[
                TextFragment::link(Text::plain("foo"), Some("/url"), Some("t")),
                TextFragment::text(" (x)"),
            ]
        );
    }

    #[test]
    fn test_uri_autolink() {
        assert!(is_uri_autolink("https://example.com"));
        assert!(is_uri_autolink("a+b:"));
        assert!(is_uri_autolink("MAILTO:foo@bar.baz"));
        assert!(!is_uri_autolink("x:y z"));
        assert!(!is_uri_autolink("a:b"));
        assert!(!is_uri_autolink("1ab:c"));
        assert!(!is_uri_autolink("no-colon"));
    }

    #[test]
    fn test_email_autolink() {
        assert!(is_email_autolink("test@example.com"));
        assert!(is_email_autolink("foo+special@Bar.baz-bar0.com"));
        assert!(is_email_autolink("a@localhost"));
        assert!(!is_email_autolink("foo\\+@bar.example.com"));
        assert!(!is_email_autolink("@example.com"));
        assert!(!is_email_autolink("a@-bad.com"));
        assert!(!is_email_autolink("a@b..c"));
    }
}
