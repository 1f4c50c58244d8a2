//! Inline text model.
//!
//! A [`Text`] is an ordered sequence of [`TextFragment`]s. The block phase
//! fills it with raw lines separated by line breaks; the inline phase
//! replaces those with structured fragments.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

use crate::custom::CustomTextFragment;

/// Kind of an autolink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutolinkKind {
    /// `<scheme:path>`
    Uri,
    /// `<user@example.com>`
    Email,
}

impl fmt::Display for AutolinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uri => "uri",
            Self::Email => "email",
        })
    }
}

/// Classification flags of a delimiter run.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct DelimiterRunType(u8);

impl DelimiterRunType {
    pub const NONE: Self = Self(0);
    /// Not followed by whitespace, and not followed by punctuation unless
    /// preceded by whitespace or punctuation.
    pub const LEFT_FLANKING: Self = Self(1 << 0);
    /// Mirror image of `LEFT_FLANKING`.
    pub const RIGHT_FLANKING: Self = Self(1 << 1);
    /// Preceded by punctuation.
    pub const LEFT_PUNCTUATION: Self = Self(1 << 2);
    /// Followed by punctuation.
    pub const RIGHT_PUNCTUATION: Self = Self(1 << 3);
    /// Preceded by a backslash escape.
    pub const ESCAPED: Self = Self(1 << 4);
    /// `![` image opener.
    pub const IMAGE: Self = Self(1 << 5);

    const NAMES: [(Self, &'static str); 6] = [
        (Self::LEFT_FLANKING, "leftFlanking"),
        (Self::RIGHT_FLANKING, "rightFlanking"),
        (Self::LEFT_PUNCTUATION, "leftPunctuation"),
        (Self::RIGHT_PUNCTUATION, "rightPunctuation"),
        (Self::ESCAPED, "escaped"),
        (Self::IMAGE, "image"),
    ];

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x3f)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl BitOr for DelimiterRunType {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DelimiterRunType {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for DelimiterRunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(", ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        f.write_str("]")
    }
}

/// One piece of inline content.
#[derive(Clone, PartialEq)]
pub enum TextFragment {
    Text(String),
    Code(String),
    Emph(Text),
    Strong(Text),
    Link {
        text: Text,
        uri: Option<String>,
        title: Option<String>,
    },
    Autolink {
        kind: AutolinkKind,
        uri: String,
    },
    Image {
        text: Text,
        uri: Option<String>,
        title: Option<String>,
    },
    /// Raw inline HTML, stored without its enclosing angle brackets.
    Html(String),
    /// A run of `count` delimiter characters awaiting resolution.
    Delimiter {
        ch: char,
        count: usize,
        run: DelimiterRunType,
    },
    SoftBreak,
    HardBreak,
    Custom(Arc<dyn CustomTextFragment>),
}

impl TextFragment {
    /// Literal text fragment.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn delimiter(ch: char, count: usize, run: DelimiterRunType) -> Self {
        Self::Delimiter { ch, count, run }
    }

    pub fn link(text: Text, uri: Option<&str>, title: Option<&str>) -> Self {
        Self::Link {
            text,
            uri: uri.map(str::to_owned),
            title: title.map(str::to_owned),
        }
    }

    pub fn image(text: Text, uri: Option<&str>, title: Option<&str>) -> Self {
        Self::Image {
            text,
            uri: uri.map(str::to_owned),
            title: title.map(str::to_owned),
        }
    }

    pub fn autolink(kind: AutolinkKind, uri: impl Into<String>) -> Self {
        Self::Autolink {
            kind,
            uri: uri.into(),
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, Self::SoftBreak | Self::HardBreak)
    }

    /// Text as written in Markdown, ignoring all markup.
    pub fn raw_text(&self) -> String {
        let mut out = String::new();
        self.write_raw(&mut out);
        out
    }

    fn write_raw(&self, out: &mut String) {
        match self {
            Self::Text(s) | Self::Code(s) => out.push_str(s),
            Self::Emph(t) | Self::Strong(t) => t.write_raw(out),
            Self::Link { text, .. } | Self::Image { text, .. } => text.write_raw(out),
            Self::Autolink { uri, .. } => out.push_str(uri),
            Self::Html(tag) => {
                out.push('<');
                out.push_str(tag);
                out.push('>');
            }
            Self::Delimiter { ch, count, run } => {
                if run.contains(DelimiterRunType::IMAGE) {
                    out.push('!');
                }
                push_run(out, *ch, *count);
            }
            Self::SoftBreak | Self::HardBreak => out.push(' '),
            Self::Custom(custom) => out.push_str(&custom.raw_text()),
        }
    }

    /// Plain string content: like [`raw_text`](Self::raw_text), but HTML is
    /// dropped and image markers are not printed.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Html(_) => String::new(),
            Self::Delimiter { ch, count, .. } => {
                let mut out = String::new();
                push_run(&mut out, *ch, *count);
                out
            }
            Self::Emph(t) | Self::Strong(t) => t.plain_text(),
            Self::Link { text, .. } | Self::Image { text, .. } => text.plain_text(),
            Self::Custom(custom) => custom.plain_text(),
            _ => self.raw_text(),
        }
    }
}

fn push_run(out: &mut String, ch: char, count: usize) {
    for _ in 0..count.max(1) {
        out.push(ch);
    }
}

impl fmt::Display for TextFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Code(s) => write!(f, "`{s}`"),
            Self::Emph(t) => write!(f, "*{t}*"),
            Self::Strong(t) => write!(f, "**{t}**"),
            Self::Link { text, uri, title } => write!(
                f,
                "[{text}]({} {})",
                uri.as_deref().unwrap_or(""),
                title.as_deref().unwrap_or("")
            ),
            Self::Image { text, uri, title } => write!(
                f,
                "![{text}]({} {})",
                uri.as_deref().unwrap_or(""),
                title.as_deref().unwrap_or("")
            ),
            Self::Autolink { uri, .. } => write!(f, "<{uri}>"),
            Self::Html(tag) => write!(f, "<{tag}>"),
            Self::Delimiter { .. } => f.write_str(&self.raw_text()),
            Self::SoftBreak | Self::HardBreak => f.write_str("\n"),
            Self::Custom(custom) => f.write_str(&custom.markdown()),
        }
    }
}

impl fmt::Debug for TextFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "text({s:?})"),
            Self::Code(s) => write!(f, "code({s:?})"),
            Self::Emph(t) => write!(f, "emph({t:?})"),
            Self::Strong(t) => write!(f, "strong({t:?})"),
            Self::Link { text, uri, title } => {
                write!(f, "link({text:?}, {uri:?}, {title:?})")
            }
            Self::Image { text, uri, title } => {
                write!(f, "image({text:?}, {uri:?}, {title:?})")
            }
            Self::Autolink { kind, uri } => write!(f, "autolink({kind}, {uri:?})"),
            Self::Html(tag) => write!(f, "html({tag:?})"),
            Self::Delimiter { ch, count, run } => {
                write!(f, "delimiter({ch:?}, {count}, {run:?})")
            }
            Self::SoftBreak => f.write_str("softBreak"),
            Self::HardBreak => f.write_str("hardBreak"),
            Self::Custom(custom) => fmt::Debug::fmt(custom, f),
        }
    }
}

/// Ordered sequence of text fragments.
#[derive(Clone, PartialEq, Default)]
pub struct Text {
    fragments: Vec<TextFragment>,
}

impl Text {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text holding a single literal fragment.
    pub fn plain(s: impl Into<String>) -> Self {
        Self {
            fragments: vec![TextFragment::Text(s.into())],
        }
    }

    pub fn from_fragment(fragment: TextFragment) -> Self {
        Self {
            fragments: vec![fragment],
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    #[inline]
    pub fn first(&self) -> Option<&TextFragment> {
        self.fragments.first()
    }

    #[inline]
    pub fn last(&self) -> Option<&TextFragment> {
        self.fragments.last()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&TextFragment> {
        self.fragments.get(index)
    }

    #[inline]
    pub fn fragments(&self) -> &[TextFragment] {
        &self.fragments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TextFragment> {
        self.fragments.iter()
    }

    #[inline]
    pub fn push(&mut self, fragment: TextFragment) {
        self.fragments.push(fragment);
    }

    /// Append a source line.
    ///
    /// A trailing backslash on the previous line turns the separating line
    /// break into a hard break; otherwise lines are separated by a soft
    /// break. `hard_break` appends a hard break after the line (two or more
    /// trailing spaces in the source).
    pub fn append_line(&mut self, line: &str, hard_break: bool) {
        if let Some(TextFragment::Text(prev)) = self.fragments.last_mut() {
            if prev.ends_with('\\') {
                prev.pop();
                if prev.is_empty() {
                    self.fragments.pop();
                }
                self.fragments.push(TextFragment::HardBreak);
            } else {
                self.fragments.push(TextFragment::SoftBreak);
            }
        }
        self.fragments.push(TextFragment::Text(line.to_owned()));
        if hard_break {
            self.fragments.push(TextFragment::HardBreak);
        }
    }

    /// Drop a trailing line break.
    pub fn finalized(mut self) -> Self {
        if self.fragments.last().is_some_and(TextFragment::is_break) {
            self.fragments.pop();
        }
        self
    }

    /// Text as written in Markdown, ignoring all markup.
    pub fn raw_text(&self) -> String {
        let mut out = String::new();
        self.write_raw(&mut out);
        out
    }

    fn write_raw(&self, out: &mut String) {
        for fragment in &self.fragments {
            fragment.write_raw(out);
        }
    }

    /// Plain string content with all markup removed.
    pub fn plain_text(&self) -> String {
        self.fragments.iter().map(TextFragment::plain_text).collect()
    }

    pub fn into_fragments(self) -> Vec<TextFragment> {
        self.fragments
    }
}

impl From<Vec<TextFragment>> for Text {
    fn from(fragments: Vec<TextFragment>) -> Self {
        Self { fragments }
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Self::plain(s)
    }
}

impl FromIterator<TextFragment> for Text {
    fn from_iter<I: IntoIterator<Item = TextFragment>>(iter: I) -> Self {
        Self {
            fragments: iter.into_iter().collect(),
        }
    }
}

impl Extend<TextFragment> for Text {
    fn extend<I: IntoIterator<Item = TextFragment>>(&mut self, iter: I) {
        self.fragments.extend(iter);
    }
}

impl IntoIterator for Text {
    type Item = TextFragment;
    type IntoIter = std::vec::IntoIter<TextFragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.fragments.into_iter()
    }
}

impl<'a> IntoIterator for &'a Text {
    type Item = &'a TextFragment;
    type IntoIter = std::slice::Iter<'a, TextFragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.fragments.iter()
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fragment in &self.fragments {
            fmt::Display::fmt(fragment, f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, fragment) in self.fragments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt::Debug::fmt(fragment, f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_line_soft_break() {
        let mut text = Text::new();
        text.append_line("foo", false);
        text.append_line("bar", false);
        assert_eq!(
            text.fragments(),
            &[TextFragment::text("foo"), TextFragment::SoftBreak, TextFragment::text("bar")]
        );
    }

    #[test]
    fn test_append_line_backslash_break() {
        let mut text = Text::new();
        text.append_line("foo\\", false);
        text.append_line("bar", false);
        assert_eq!(
            text.fragments(),
            &[TextFragment::text("foo"), TextFragment::HardBreak, TextFragment::text("bar")]
        );

        let mut text = Text::new();
        text.append_line("\\", false);
        text.append_line("bar", false);
        assert_eq!(text.fragments(), &[TextFragment::HardBreak, TextFragment::text("bar")]);
    }

    #[test]
    fn test_append_line_after_hard_break() {
        let mut text = Text::new();
        text.append_line("foo", true);
        text.append_line("bar", false);
        assert_eq!(
            text.fragments(),
            &[TextFragment::text("foo"), TextFragment::HardBreak, TextFragment::text("bar")]
        );
    }

    #[test]
    fn test_finalized_drops_trailing_break() {
        let mut text = Text::new();
        text.append_line("foo", true);
        assert_eq!(text.finalized(), Text::plain("foo"));
    }

    #[test]
    fn test_projections() {
        let text: Text = vec![
            TextFragment::text("a "),
            TextFragment::Emph(Text::plain("b")),
            TextFragment::SoftBreak,
            TextFragment::Html("br".into()),
            TextFragment::delimiter('[', 1, DelimiterRunType::IMAGE),
        ]
        .into();
        assert_eq!(text.to_string(), "a *b*\n<br>![");
        assert_eq!(text.raw_text(), "a b <br>![");
        assert_eq!(text.plain_text(), "a b [");
    }

    #[test]
    fn test_debug_form() {
        let text: Text = vec![
            TextFragment::text("x"),
            TextFragment::delimiter('*', 2, DelimiterRunType::LEFT_FLANKING | DelimiterRunType::ESCAPED),
        ]
        .into();
        assert_eq!(format!("{text:?}"), "text(\"x\"), delimiter('*', 2, [leftFlanking, escaped])");
    }

    #[test]
    fn test_run_type_flags() {
        let mut run = DelimiterRunType::NONE;
        assert!(run.is_empty());
        run |= DelimiterRunType::RIGHT_FLANKING;
        run.insert(DelimiterRunType::RIGHT_PUNCTUATION);
        assert!(run.contains(DelimiterRunType::RIGHT_FLANKING));
        assert!(!run.contains(DelimiterRunType::LEFT_FLANKING));
        assert_eq!(run.bits(), 0b1010);
        assert_eq!(DelimiterRunType::from_bits(0xff).bits(), 0x3f);
    }
}
